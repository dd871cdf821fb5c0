//! Running one task or a list of tasks.

use tracegen_manifest::GenerationTask;

use crate::{BatchError, RunOptions, TaskError, TaskOutcome, TaskRunner, TemplateRegistry};

/// What to do when a task in a batch fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop at the first failure; later tasks are not attempted.
    #[default]
    FailFast,
    /// Run every task and report all failures at the end.
    CollectAll,
}

/// Outcomes of a fully successful batch, in task order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<TaskOutcome>,
}

/// Run a single task with a fresh runner.
pub fn run_single(
    task: &GenerationTask,
    registry: &TemplateRegistry,
    options: RunOptions,
) -> Result<TaskOutcome, TaskError> {
    TaskRunner::new(registry, options).run(task)
}

/// Run tasks sequentially in order.
///
/// Outputs of tasks that succeeded stay written even when a later task fails.
pub fn run_batch(
    tasks: &[GenerationTask],
    runner: &TaskRunner<'_>,
    policy: FailurePolicy,
) -> Result<BatchReport, BatchError> {
    let mut report = BatchReport::default();
    let mut failures = Vec::new();

    for task in tasks {
        match runner.run(task) {
            Ok(outcome) => report.outcomes.push(outcome),
            Err(err) => {
                tracing::debug!(task = %err.task, stage = %err.stage, "task failed");
                failures.push(err);
                if policy == FailurePolicy::FailFast {
                    break;
                }
            }
        }
    }

    if failures.is_empty() {
        Ok(report)
    } else {
        Err(BatchError {
            completed: report.outcomes.len(),
            total: tasks.len(),
            failures,
        })
    }
}
