//! Template listing report.

use tracegen_codegen::TemplateRegistry;

use super::output::{Output, Report};

/// Template kinds available to tasks.
#[derive(Debug)]
pub struct TemplatesReport {
    pub kinds: Vec<String>,
    /// Kinds shipped with tracegen rather than declared in a task file.
    pub builtin: Vec<String>,
}

impl TemplatesReport {
    pub fn from_registry(registry: &TemplateRegistry) -> Self {
        Self {
            kinds: registry.kinds().map(str::to_string).collect(),
            builtin: TemplateRegistry::builtin()
                .kinds()
                .map(str::to_string)
                .collect(),
        }
    }
}

impl Report for TemplatesReport {
    fn render(&self, out: &mut dyn Output) {
        out.section(&format!("Template kinds ({})", self.kinds.len()));
        for kind in &self.kinds {
            if self.builtin.contains(kind) {
                out.list_item(&format!("{kind} (built-in)"));
            } else {
                out.list_item(kind);
            }
        }
    }
}
