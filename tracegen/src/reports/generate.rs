//! Generate report data structures.

use std::path::PathBuf;

use super::output::{Output, Report};

/// Report data from a generation run.
#[derive(Debug)]
pub struct GenerateReport {
    /// Whether proxies were only rendered.
    pub dry_run: bool,

    /// One entry per task, in task order.
    pub proxies: Vec<GeneratedProxy>,
}

/// A proxy produced by one task.
#[derive(Debug)]
pub struct GeneratedProxy {
    pub interface: String,
    pub output: PathBuf,
    pub template: String,
    /// Number of warnings raised while extracting.
    pub warnings: usize,
    /// Rendered content, present on dry runs.
    pub content: Option<String>,
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        if self.dry_run {
            self.render_preview(out);
        } else {
            self.render_written(out);
        }
    }
}

impl GenerateReport {
    fn render_written(&self, out: &mut dyn Output) {
        for proxy in &self.proxies {
            if proxy.warnings > 0 {
                out.warning(&format!(
                    "{} warning(s) while generating the proxy for '{}'",
                    proxy.warnings, proxy.interface
                ));
            }
            out.status(&format!(
                "Proxy for interface '{}' generated at '{}' using template '{}'",
                proxy.interface,
                proxy.output.display(),
                proxy.template
            ));
        }
    }

    fn render_preview(&self, out: &mut dyn Output) {
        for proxy in &self.proxies {
            out.divider(&proxy.output.display().to_string());
            out.preformatted(proxy.content.as_deref().unwrap_or_default());
        }

        out.divider("Summary");
        out.preformatted(&format!(
            "{} files would be generated",
            self.proxies.len()
        ));
    }
}
