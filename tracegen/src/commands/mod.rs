mod task;

use std::path::PathBuf;

use clap::Parser;
use eyre::Result;
use task::TaskArgs;
use tracegen_codegen::{BatchError, FailurePolicy, TemplateRegistry};
use tracegen_manifest::TaskFile;

use crate::{
    ops::{self, GenerateOptions},
    reports::{Report, TemplatesReport, TerminalOutput},
};

/// Extension trait for exiting on diagnostic errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> T;
}

impl<T> UnwrapOrExit<T> for tracegen_manifest::Result<T> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => exit_with(miette::Report::new(*e)),
        }
    }
}

impl<T> UnwrapOrExit<T> for std::result::Result<T, BatchError> {
    fn unwrap_or_exit(self) -> T {
        match self {
            Ok(v) => v,
            Err(mut e) => {
                // A lone task reads better without the batch wrapper
                if e.total == 1 {
                    if let Some(failure) = e.failures.pop() {
                        exit_with(miette::Report::new(failure));
                    }
                }
                exit_with(miette::Report::new(e))
            }
        }
    }
}

fn exit_with(report: miette::Report) -> ! {
    eprintln!("{:?}", report);
    std::process::exit(1);
}

#[derive(Parser)]
#[command(name = "tracegen")]
#[command(version)]
#[command(about = "Generate OpenTelemetry tracing proxies for Go interfaces")]
pub(crate) struct Cli {
    #[command(flatten)]
    task: TaskArgs,

    /// Task file listing the proxies to generate (TOML, or JSON for *.json)
    #[arg(
        short,
        long,
        conflicts_with_all = [
            "source",
            "output",
            "package",
            "interface",
            "tracer",
            "template",
            "module_root",
            "self_import",
        ]
    )]
    config: Option<PathBuf>,

    /// Preview generated code without writing to disk
    #[arg(long)]
    dry_run: bool,

    /// Keep running the remaining tasks after one fails
    #[arg(long)]
    keep_going: bool,

    /// Print the available template kinds and exit
    #[arg(long)]
    list_templates: bool,

    /// More log output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        let mut registry = TemplateRegistry::builtin();

        let tasks = match &self.config {
            Some(path) => {
                let task_file = TaskFile::open(path).unwrap_or_exit();
                ops::register_templates(&mut registry, &task_file)?;
                task_file.tasks
            }
            None => vec![self.task.to_task()],
        };

        if self.list_templates {
            TemplatesReport::from_registry(&registry).render(&mut TerminalOutput::new());
            return Ok(());
        }

        let report = ops::generate(&tasks, &registry, self.generate_options()).unwrap_or_exit();
        report.render(&mut TerminalOutput::new());
        Ok(())
    }

    fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            dry_run: self.dry_run,
            policy: if self.keep_going {
                FailurePolicy::CollectAll
            } else {
                FailurePolicy::FailFast
            },
        }
    }
}
