//! Task stage trait.

use super::TaskContext;
use crate::{Result, Stage};

/// One stage of a generation task.
///
/// Stages run in order; each reads what earlier stages left in the
/// [`TaskContext`] and adds its own part. A returned error ends the task.
/// Non-fatal findings go into the context's diagnostics instead.
pub trait Phase {
    /// Which stage this is (used in errors and logs).
    fn stage(&self) -> Stage;

    /// A human-readable description of what this stage does.
    fn description(&self) -> &'static str;

    /// Run this stage on the task context.
    fn run(&self, ctx: &mut TaskContext<'_>) -> Result<()>;
}
