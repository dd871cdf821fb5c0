// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Proxy generation for tracegen.
//!
//! This crate turns a Go interface into a tracing proxy:
//!
//! - [`extract`] / [`extract_from`] - method signatures of an interface
//! - [`resolve_imports`] - imports the generated file starts from
//! - [`TemplateRegistry`] and [`ProxyEmitter`] - rendering and writing
//! - [`TaskRunner`], [`run_single`] and [`run_batch`] - the staged task pipeline

mod batch;
mod emit;
mod error;
mod extract;
mod imports;
pub mod pipeline;
pub mod templates;

pub use batch::{BatchReport, FailurePolicy, run_batch, run_single};
pub use emit::{ProxyEmitter, TemplateData, TemplateHelpers};
pub use error::{BatchError, Error, Result, Stage, TaskError};
pub use extract::{
    ExtractOptions, Extraction, MethodSignature, Parameter, extract, extract_from,
};
pub use imports::{ImportOptions, ImportSet, ImportSpec, ResolvedImports, resolve_imports};
pub use pipeline::{Diagnostic, RunOptions, Severity, TaskOutcome, TaskRunner};
pub use templates::{DEFAULT_TEMPLATE, ImportRequirement, TemplateRegistry, TemplateSpec};
