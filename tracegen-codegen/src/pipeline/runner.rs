//! Task orchestrator.

use std::path::PathBuf;

use tracegen_core::WriteResult;
use tracegen_manifest::GenerationTask;

use super::{
    Diagnostic, Phase, TaskContext,
    phases::{EmitPhase, ExtractPhase, ParsePhase, ResolveImportsPhase, ValidatePhase},
};
use crate::{TaskError, TemplateRegistry};

/// Options shared by every task a runner executes.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Render without writing; the content is returned in the outcome.
    pub dry_run: bool,
}

/// What a successful task produced.
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    /// `<source>::<interface>`
    pub task: String,
    pub interface: String,
    pub output: PathBuf,
    pub template: String,
    /// Number of methods proxied
    pub methods: usize,
    /// Set when the proxy was written (not on dry runs).
    pub write_result: Option<WriteResult>,
    /// Rendered content, kept on dry runs.
    pub rendered: Option<String>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs generation tasks through the stages in order.
///
/// ```ignore
/// let registry = TemplateRegistry::builtin();
/// let runner = TaskRunner::new(&registry, RunOptions::default());
/// let outcome = runner.run(&task)?;
/// ```
pub struct TaskRunner<'r> {
    registry: &'r TemplateRegistry,
    options: RunOptions,
}

impl<'r> TaskRunner<'r> {
    pub fn new(registry: &'r TemplateRegistry, options: RunOptions) -> Self {
        Self { registry, options }
    }

    /// Run one task: validate, parse, extract, resolve imports, emit.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure, labelled with the task and stage.
    pub fn run(&self, task: &GenerationTask) -> Result<TaskOutcome, TaskError> {
        let label = task.label();
        let span = tracing::info_span!("task", task = %label);
        let _guard = span.enter();

        let phases: [&dyn Phase; 5] = [
            &ValidatePhase::new(self.registry),
            &ParsePhase,
            &ExtractPhase,
            &ResolveImportsPhase,
            &EmitPhase::new(self.registry, self.options.dry_run),
        ];

        let mut ctx = TaskContext::new(task);
        for phase in phases {
            tracing::debug!(stage = %phase.stage(), "{}", phase.description());
            phase
                .run(&mut ctx)
                .map_err(|source| TaskError::new(&label, phase.stage(), source))?;
        }

        if ctx.warning_count() > 0 {
            tracing::debug!(warnings = ctx.warning_count(), "task finished with warnings");
        }

        Ok(TaskOutcome {
            task: label,
            interface: task.interface.clone(),
            output: task.output.clone(),
            template: task.template.clone(),
            methods: ctx.methods.len(),
            write_result: ctx.write_result,
            rendered: ctx.rendered,
            diagnostics: ctx.diagnostics,
        })
    }
}
