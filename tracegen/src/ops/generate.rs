//! Generate operation - run tasks and collect what they produced.

use tracegen_codegen::{
    BatchError, FailurePolicy, RunOptions, TaskOutcome, TaskRunner, TemplateRegistry, run_batch,
};
use tracegen_manifest::GenerationTask;

use crate::reports::{GenerateReport, GeneratedProxy};

/// Options for the generate operation.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Whether to preview without writing files.
    pub dry_run: bool,
    /// What to do when a task fails.
    pub policy: FailurePolicy,
}

/// Execute the generate operation.
///
/// Tasks run in order; with [`FailurePolicy::FailFast`] the first failure
/// ends the run, while proxies already written stay on disk.
pub fn generate(
    tasks: &[GenerationTask],
    registry: &TemplateRegistry,
    opts: GenerateOptions,
) -> Result<GenerateReport, BatchError> {
    let runner = TaskRunner::new(
        registry,
        RunOptions {
            dry_run: opts.dry_run,
        },
    );

    tracing::debug!(tasks = tasks.len(), dry_run = opts.dry_run, "generating proxies");
    let batch = run_batch(tasks, &runner, opts.policy)?;

    Ok(GenerateReport {
        dry_run: opts.dry_run,
        proxies: batch.outcomes.into_iter().map(generated_proxy).collect(),
    })
}

fn generated_proxy(outcome: TaskOutcome) -> GeneratedProxy {
    GeneratedProxy {
        interface: outcome.interface,
        output: outcome.output,
        template: outcome.template,
        warnings: outcome
            .diagnostics
            .iter()
            .filter(|d| d.severity.is_warning())
            .count(),
        content: outcome.rendered,
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    const SESSION_STORE: &str = "package session\n\nimport \"context\"\n\ntype Store interface {\n\tGet(ctx context.Context, id string) (string, error)\n\tWatch(events chan string)\n}\n";

    fn task(dir: &TempDir, output: &str) -> GenerationTask {
        let source = dir.path().join("store.go");
        fs::write(&source, SESSION_STORE).unwrap();
        GenerationTask {
            source,
            output: dir.path().join(output),
            interface: "Store".to_string(),
            package: "session".to_string(),
            template: "otel".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_dry_run_keeps_content_and_counts_warnings() {
        let dir = TempDir::new().unwrap();
        let registry = TemplateRegistry::builtin();
        let opts = GenerateOptions {
            dry_run: true,
            ..Default::default()
        };

        let report = generate(&[task(&dir, "store.gen.go")], &registry, opts).unwrap();

        assert!(report.dry_run);
        let proxy = &report.proxies[0];
        assert_eq!(proxy.warnings, 1);
        assert!(proxy.content.as_deref().unwrap().contains("type StoreProxy struct"));
        assert!(!dir.path().join("store.gen.go").exists());
    }

    #[test]
    fn test_writes_each_task() {
        let dir = TempDir::new().unwrap();
        let registry = TemplateRegistry::builtin();
        let tasks = [task(&dir, "a.gen.go"), task(&dir, "b.gen.go")];

        let report = generate(&tasks, &registry, GenerateOptions::default()).unwrap();

        assert_eq!(report.proxies.len(), 2);
        assert!(report.proxies.iter().all(|p| p.content.is_none()));
        assert!(dir.path().join("a.gen.go").exists());
        assert!(dir.path().join("b.gen.go").exists());
    }
}
