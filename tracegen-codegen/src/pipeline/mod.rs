//! Task pipeline for proxy generation.
//!
//! A [`TaskRunner`] takes one [`GenerationTask`](tracegen_manifest::GenerationTask)
//! through explicit stages (validate → parse → extract → resolve-imports →
//! emit), carrying state in a [`TaskContext`] and collecting non-fatal
//! [`Diagnostic`]s. The first failing stage ends the task with a
//! [`TaskError`](crate::TaskError) naming it.

mod context;
mod diagnostic;
mod phase;
pub mod phases;
mod runner;

pub use context::TaskContext;
pub use diagnostic::{Diagnostic, Severity};
pub use phase::Phase;
pub use runner::{RunOptions, TaskOutcome, TaskRunner};
