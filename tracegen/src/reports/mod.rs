//! Report data structures for commands.
//!
//! This module provides data structures that separate data collection from rendering.
//! Operations build reports, then render them to an Output target.

mod generate;
mod output;
mod templates;

pub use generate::{GenerateReport, GeneratedProxy};
pub use output::{Report, TerminalOutput};
pub use templates::TemplatesReport;

#[cfg(test)]
pub(crate) use output::tests::RecordingOutput;
