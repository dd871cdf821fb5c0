//! Template kinds declared in task files.

use eyre::{Context, Result};
use tracegen_codegen::{ImportRequirement, TemplateRegistry, TemplateSpec};
use tracegen_manifest::{TaskFile, TemplateEntry};

/// Register every `[templates.<kind>]` entry of `task_file`.
///
/// A kind declared in the task file replaces a built-in kind of the same name.
pub fn register_templates(registry: &mut TemplateRegistry, task_file: &TaskFile) -> Result<()> {
    for (kind, entry) in &task_file.templates {
        let spec = template_spec(entry)
            .wrap_err_with(|| format!("Failed to load template '{kind}'"))?;
        if registry.register(kind.clone(), spec).is_some() {
            tracing::info!(kind = %kind, "task file overrides a built-in template");
        }
    }
    Ok(())
}

fn template_spec(entry: &TemplateEntry) -> Result<TemplateSpec> {
    let body = std::fs::read_to_string(&entry.path)
        .wrap_err_with(|| format!("Failed to read '{}'", entry.path.display()))?;

    let always = entry.imports.iter().cloned().map(ImportRequirement::Always);
    let without_context = entry
        .imports_without_context
        .iter()
        .cloned()
        .map(ImportRequirement::WhenAnyMethodLacksContext);
    let with_error = entry
        .imports_with_error
        .iter()
        .cloned()
        .map(ImportRequirement::WhenAnyMethodReturnsError);

    Ok(always
        .chain(without_context)
        .chain(with_error)
        .fold(TemplateSpec::new(body), TemplateSpec::import))
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf};

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_registers_template_files_with_their_imports() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lite.go.tera");
        fs::write(&path, "package {{ package_name }}\n").unwrap();

        let mut task_file = TaskFile::default();
        task_file.templates.insert(
            "otel-lite".to_string(),
            TemplateEntry {
                path,
                imports: vec!["go.opentelemetry.io/otel/trace".to_string()],
                imports_with_error: vec!["go.opentelemetry.io/otel/codes".to_string()],
                ..Default::default()
            },
        );

        let mut registry = TemplateRegistry::builtin();
        register_templates(&mut registry, &task_file).unwrap();

        let kinds: Vec<_> = registry.kinds().collect();
        assert_eq!(kinds, ["otel", "otel-lite"]);

        let spec = registry.get("otel-lite").unwrap();
        assert_eq!(spec.body, "package {{ package_name }}\n");
        assert_eq!(
            spec.imports,
            [
                ImportRequirement::Always("go.opentelemetry.io/otel/trace".to_string()),
                ImportRequirement::WhenAnyMethodReturnsError(
                    "go.opentelemetry.io/otel/codes".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_missing_template_file_names_the_kind() {
        let mut task_file = TaskFile::default();
        task_file.templates.insert(
            "broken".to_string(),
            TemplateEntry {
                path: PathBuf::from("/nonexistent/broken.go.tera"),
                ..Default::default()
            },
        );

        let mut registry = TemplateRegistry::builtin();
        let err = register_templates(&mut registry, &task_file).unwrap_err();

        assert_eq!(err.to_string(), "Failed to load template 'broken'");
        assert!(!registry.contains("broken"));
    }
}
