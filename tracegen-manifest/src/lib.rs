// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Configuration inputs for tracegen: generation tasks, task files, and
//! `go.mod` module manifests.

mod error;
pub mod go_mod;
mod task;
mod task_file;

pub use error::{Error, Result, SourceContext};
pub use go_mod::{GoMod, find_module_root};
pub use task::GenerationTask;
pub use task_file::{TaskFile, TemplateEntry};
