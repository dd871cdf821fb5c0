//! Batch task files.
//!
//! A task file lists proxies to generate. TOML is the primary format:
//!
//! ```toml
//! [[tasks]]
//! source = "internal/domain/repository/user.go"
//! output = "internal/infrastructure/tracing/user_repository.gen.go"
//! interface = "UserRepository"
//! package = "tracing"
//! tracer = "repository.user"
//! template = "otel"
//!
//! [templates.otel-lite]
//! path = "templates/lite.go.tera"
//! imports = ["go.opentelemetry.io/otel/trace"]
//! ```
//!
//! Files ending in `.json` are read as JSON, either a bare array of tasks or
//! an object with a `tasks` key. Relative paths resolve against the task
//! file's directory.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{Error, GenerationTask, Result, SourceContext};

/// A custom template kind declared in a task file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateEntry {
    /// Template file, rendered with the same context as built-in kinds
    pub path: PathBuf,
    /// Imports every generated file needs
    #[serde(default)]
    pub imports: Vec<String>,
    /// Imports needed when some method has no `context.Context` parameter
    #[serde(default)]
    pub imports_without_context: Vec<String>,
    /// Imports needed when some method returns an error
    #[serde(default)]
    pub imports_with_error: Vec<String>,
}

/// A parsed task file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskFile {
    #[serde(default)]
    pub tasks: Vec<GenerationTask>,
    #[serde(default)]
    pub templates: IndexMap<String, TemplateEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonTaskFile {
    List(Vec<GenerationTask>),
    Object(TaskFile),
}

impl TaskFile {
    /// Read a task file, picking the format from the extension.
    ///
    /// Relative paths inside the file are resolved against its directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let ctx = SourceContext::new(content, path.display().to_string());

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let mut file = if is_json {
            Self::from_json(&ctx)?
        } else {
            Self::from_toml(&ctx)?
        };

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        file.resolve_paths(base);

        tracing::debug!(
            path = %path.display(),
            tasks = file.tasks.len(),
            templates = file.templates.len(),
            "loaded task file"
        );
        Ok(file)
    }

    /// Parse TOML task file content.
    pub fn from_toml(ctx: &SourceContext) -> Result<Self> {
        let file: Self = toml::from_str(ctx.src()).map_err(|e| ctx.toml_error(e))?;
        file.validate(ctx)?;
        Ok(file)
    }

    /// Parse JSON task file content.
    pub fn from_json(ctx: &SourceContext) -> Result<Self> {
        let parsed: JsonTaskFile =
            serde_json::from_str(ctx.src()).map_err(|e| ctx.json_error(e))?;
        let file = match parsed {
            JsonTaskFile::List(tasks) => Self {
                tasks,
                ..Default::default()
            },
            JsonTaskFile::Object(file) => file,
        };
        file.validate(ctx)?;
        Ok(file)
    }

    fn validate(&self, ctx: &SourceContext) -> Result<()> {
        if self.tasks.is_empty() {
            return Err(ctx.validation_error("task file defines no tasks", None));
        }

        for (kind, entry) in &self.templates {
            if !is_valid_kind(kind) {
                return Err(ctx.validation_error(
                    format!(
                        "invalid template kind '{kind}': use letters, digits, '-' and '_'"
                    ),
                    Some(kind),
                ));
            }
            if entry.path.as_os_str().is_empty() {
                return Err(ctx.validation_error(
                    format!("template '{kind}' has no path"),
                    Some(kind),
                ));
            }
        }
        Ok(())
    }

    fn resolve_paths(&mut self, base: &Path) {
        for task in &mut self.tasks {
            task.resolve_paths(base);
        }
        for entry in self.templates.values_mut() {
            if entry.path.is_relative() {
                entry.path = base.join(&entry.path);
            }
        }
    }
}

fn is_valid_kind(kind: &str) -> bool {
    !kind.is_empty()
        && kind
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toml(content: &str) -> Result<TaskFile> {
        TaskFile::from_toml(&SourceContext::new(content, "tracegen.toml"))
    }

    fn json(content: &str) -> Result<TaskFile> {
        TaskFile::from_json(&SourceContext::new(content, "tracegen.json"))
    }

    #[test]
    fn test_parse_toml_tasks_and_templates() {
        let file = toml(
            r#"
            [[tasks]]
            source = "internal/domain/repository/user.go"
            output = "internal/infrastructure/tracing/user_repository.gen.go"
            interface = "UserRepository"
            package = "tracing"
            tracer = "repository.user"
            template = "otel"

            [[tasks]]
            source = "internal/usecase/auth.go"
            output = "internal/usecase/auth_proxy.gen.go"
            interface = "AuthUseCase"
            package = "usecase"
            template = "otel-lite"
            self_import = "server-template/internal/usecase"

            [templates.otel-lite]
            path = "templates/lite.go.tera"
            imports = ["go.opentelemetry.io/otel/trace"]
            imports_without_context = ["context"]
            "#,
        )
        .unwrap();

        assert_eq!(file.tasks.len(), 2);
        assert_eq!(file.tasks[0].tracer.as_deref(), Some("repository.user"));
        assert_eq!(file.tasks[1].tracer, None);
        assert_eq!(
            file.tasks[1].self_import.as_deref(),
            Some("server-template/internal/usecase")
        );

        let lite = &file.templates["otel-lite"];
        assert_eq!(lite.path, PathBuf::from("templates/lite.go.tera"));
        assert_eq!(lite.imports, vec!["go.opentelemetry.io/otel/trace"]);
        assert_eq!(lite.imports_without_context, vec!["context"]);
        assert!(lite.imports_with_error.is_empty());
    }

    #[test]
    fn test_incomplete_task_is_accepted_for_later_validation() {
        let file = toml("[[tasks]]\nsource = \"user.go\"\n").unwrap();
        assert_eq!(
            file.tasks[0].missing_fields(),
            vec!["output", "interface", "package", "template"]
        );
    }

    #[test]
    fn test_parse_json_array() {
        let file = json(
            r#"[{"source": "user.go", "output": "proxy.gen.go", "interface": "UserRepository",
                 "package": "repository", "template": "otel"}]"#,
        )
        .unwrap();
        assert_eq!(file.tasks[0].interface, "UserRepository");
        assert!(file.templates.is_empty());
    }

    #[test]
    fn test_parse_json_object() {
        let file = json(r#"{"tasks": [{"source": "user.go", "interface": "UserRepository"}]}"#)
            .unwrap();
        assert_eq!(file.tasks.len(), 1);
    }

    #[test]
    fn test_error_on_unknown_task_key() {
        let err = toml("[[tasks]]\nsource = \"user.go\"\nsauce = \"x\"\n").unwrap_err();
        assert!(matches!(*err, Error::Parse { .. }));
    }

    #[test]
    fn test_error_on_invalid_json() {
        let err = json("[{\"source\": }]").unwrap_err();
        assert!(matches!(*err, Error::Json { span: Some(_), .. }));
    }

    #[test]
    fn test_error_on_empty_task_list() {
        let err = toml("").unwrap_err();
        assert_eq!(err.to_string(), "task file defines no tasks");
    }

    #[test]
    fn test_error_on_invalid_template_kind() {
        let err = toml(
            "[[tasks]]\nsource = \"a.go\"\n\n[templates.\"bad kind\"]\npath = \"x.tera\"\n",
        )
        .unwrap_err();
        assert!(err.to_string().starts_with("invalid template kind 'bad kind'"));
    }

    #[test]
    fn test_open_resolves_paths_against_file_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracegen.toml");
        std::fs::write(
            &path,
            "[[tasks]]\nsource = \"repo/user.go\"\noutput = \"/abs/out.go\"\n\n[templates.lite]\npath = \"lite.tera\"\n",
        )
        .unwrap();

        let file = TaskFile::open(&path).unwrap();
        assert_eq!(file.tasks[0].source, dir.path().join("repo/user.go"));
        assert_eq!(file.tasks[0].output, PathBuf::from("/abs/out.go"));
        assert_eq!(file.templates["lite"].path, dir.path().join("lite.tera"));
    }

    #[test]
    fn test_open_detects_json_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.JSON");
        std::fs::write(&path, r#"[{"source": "user.go"}]"#).unwrap();

        let file = TaskFile::open(&path).unwrap();
        assert_eq!(file.tasks[0].source, dir.path().join("user.go"));
    }

    #[test]
    fn test_open_missing_file() {
        let err = TaskFile::open("/nonexistent/tracegen.toml").unwrap_err();
        assert!(matches!(*err, Error::Io { .. }));
    }
}
