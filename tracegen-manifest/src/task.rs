use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One proxy to generate: which interface, from where, into which file.
///
/// Every field deserializes with a default so that incomplete entries reach
/// validation (see [`GenerationTask::missing_fields`]) instead of failing
/// inside the deserializer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationTask {
    /// Go file declaring the interface
    pub source: PathBuf,
    /// File the proxy is written to
    pub output: PathBuf,
    /// Interface to wrap
    pub interface: String,
    /// Package clause of the generated file
    pub package: String,
    /// Tracer name handed to the proxy constructor
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracer: Option<String>,
    /// Template kind, e.g. `otel`
    pub template: String,
    /// Directory containing `go.mod`, when discovery should not be used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_root: Option<PathBuf>,
    /// Import path of the source package, bypassing `go.mod` entirely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_import: Option<String>,
}

impl GenerationTask {
    /// Names of required fields that are empty.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.source.as_os_str().is_empty() {
            missing.push("source");
        }
        if self.output.as_os_str().is_empty() {
            missing.push("output");
        }
        if self.interface.trim().is_empty() {
            missing.push("interface");
        }
        if self.package.trim().is_empty() {
            missing.push("package");
        }
        if self.template.trim().is_empty() {
            missing.push("template");
        }
        missing
    }

    /// Short name for diagnostics: `<source>::<interface>`.
    pub fn label(&self) -> String {
        format!("{}::{}", self.source.display(), self.interface)
    }

    /// Resolve relative paths against `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.source, &mut self.output] {
            if !path.as_os_str().is_empty() && path.is_relative() {
                *path = base.join(&*path);
            }
        }
        if let Some(root) = self.module_root.as_mut().filter(|r| r.is_relative()) {
            *root = base.join(&*root);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> GenerationTask {
        GenerationTask {
            source: "internal/domain/repository/user.go".into(),
            output: "internal/infrastructure/tracing/user_repository.gen.go".into(),
            interface: "UserRepository".into(),
            package: "tracing".into(),
            tracer: Some("repository.user".into()),
            template: "otel".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_complete_task_has_no_missing_fields() {
        assert!(complete().missing_fields().is_empty());
    }

    #[test]
    fn test_missing_fields_are_listed_in_order() {
        let task = GenerationTask {
            source: "user.go".into(),
            interface: "  ".into(),
            ..Default::default()
        };
        assert_eq!(
            task.missing_fields(),
            vec!["output", "interface", "package", "template"]
        );
    }

    #[test]
    fn test_label() {
        assert_eq!(
            complete().label(),
            "internal/domain/repository/user.go::UserRepository"
        );
    }

    #[test]
    fn test_resolve_paths_keeps_absolute_paths() {
        let mut task = complete();
        task.output = "/tmp/out.go".into();
        task.module_root = Some(".".into());
        task.resolve_paths(Path::new("/work"));

        assert_eq!(
            task.source,
            PathBuf::from("/work/internal/domain/repository/user.go")
        );
        assert_eq!(task.output, PathBuf::from("/tmp/out.go"));
        assert_eq!(task.module_root, Some(PathBuf::from("/work/.")));
    }

    #[test]
    fn test_resolve_paths_leaves_empty_paths_empty() {
        let mut task = GenerationTask::default();
        task.resolve_paths(Path::new("/work"));
        assert!(task.source.as_os_str().is_empty());
    }
}
