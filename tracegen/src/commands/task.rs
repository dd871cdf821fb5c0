use std::path::PathBuf;

use clap::Args;
use tracegen_manifest::GenerationTask;

/// Flags describing a single generation task.
#[derive(Args)]
pub struct TaskArgs {
    /// Go file declaring the interface
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// File to write the proxy to
    #[arg(short, long, default_value = "proxy.gen.go")]
    pub output: PathBuf,

    /// Package clause of the generated file
    #[arg(short, long)]
    pub package: Option<String>,

    /// Interface to wrap
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Tracer name recorded in the generated file
    #[arg(long)]
    pub tracer: Option<String>,

    /// Template kind, e.g. otel (see --list-templates)
    #[arg(short, long)]
    pub template: Option<String>,

    /// Directory containing go.mod (discovered from --source by default)
    #[arg(long)]
    pub module_root: Option<PathBuf>,

    /// Import path of the source package, bypassing go.mod
    #[arg(long)]
    pub self_import: Option<String>,
}

impl TaskArgs {
    /// Missing flags become empty fields and are reported by validation.
    pub fn to_task(&self) -> GenerationTask {
        GenerationTask {
            source: self.source.clone().unwrap_or_default(),
            output: self.output.clone(),
            interface: self.interface.clone().unwrap_or_default(),
            package: self.package.clone().unwrap_or_default(),
            tracer: self.tracer.clone(),
            template: self.template.clone().unwrap_or_default(),
            module_root: self.module_root.clone(),
            self_import: self.self_import.clone(),
        }
    }
}
