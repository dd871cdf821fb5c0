//! Import collection for generated files.
//!
//! Imports are kept in a sorted set: paths containing an uppercase character
//! first, then the rest, each group ordered by path and then alias.

use std::{
    cmp::Ordering,
    collections::BTreeSet,
    fmt,
    path::{Component, Path, PathBuf},
};

use tracegen_manifest::{GoMod, find_module_root, go_mod::GO_MOD};
use tracegen_syntax::SourceFile;

use crate::{Error, Result};

/// One import line, e.g. `sdktrace "go.opentelemetry.io/otel/sdk/trace"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportSpec {
    pub alias: Option<String>,
    /// Unquoted import path
    pub path: String,
}

impl ImportSpec {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            alias: None,
            path: path.into(),
        }
    }

    pub fn aliased(alias: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            path: path.into(),
        }
    }

    /// Parse `"fmt"`, `fmt`, or `alias "path"`.
    pub fn parse(spec: &str) -> Self {
        let spec = spec.trim();
        match spec.split_once(char::is_whitespace) {
            Some((alias, path)) if !alias.starts_with('"') && !alias.starts_with('`') => {
                Self::aliased(alias, tracegen_core::unquote(path))
            }
            _ => Self::new(tracegen_core::unquote(spec)),
        }
    }

    fn has_uppercase(&self) -> bool {
        self.path.chars().any(char::is_uppercase)
    }
}

impl Ord for ImportSpec {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .has_uppercase()
            .cmp(&self.has_uppercase())
            .then_with(|| self.path.cmp(&other.path))
            .then_with(|| self.alias.cmp(&other.alias))
    }
}

impl PartialOrd for ImportSpec {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ImportSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) => write!(f, "{alias} \"{}\"", self.path),
            None => write!(f, "\"{}\"", self.path),
        }
    }
}

/// Deduplicated, ordered set of imports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSet {
    specs: BTreeSet<ImportSpec>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an import; returns false if it was already present.
    pub fn insert(&mut self, spec: ImportSpec) -> bool {
        self.specs.insert(spec)
    }

    /// Add an import written as `"path"`, `path` or `alias "path"`.
    pub fn add(&mut self, spec: &str) -> bool {
        self.insert(ImportSpec::parse(spec))
    }

    pub fn contains(&self, spec: &ImportSpec) -> bool {
        self.specs.contains(spec)
    }

    /// Merge another set into this one.
    pub fn merge(&mut self, other: &ImportSet) {
        self.specs.extend(other.specs.iter().cloned());
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImportSpec> {
        self.specs.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    /// Import lines ready for an `import ( ... )` block.
    pub fn render(&self) -> Vec<String> {
        self.specs.iter().map(ToString::to_string).collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for ImportSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = ImportSet::new();
        for spec in iter {
            set.add(spec.as_ref());
        }
        set
    }
}

/// How to find the source package's own import path.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Directory holding `go.mod`; discovered from the source file when unset.
    pub module_root: Option<PathBuf>,
    /// Import path of the source package; skips `go.mod` entirely.
    pub self_import: Option<String>,
    /// Whether the self-import is needed at all (proxy in another package).
    pub include_self: bool,
}

/// The imports a proxy for one source file starts from.
#[derive(Debug, Clone, Default)]
pub struct ResolvedImports {
    /// Import of the interface's own package, when requested.
    pub self_import: Option<ImportSpec>,
    /// Every import, the self-import included.
    pub set: ImportSet,
}

/// Collect the imports of `file` and, if requested, its own package import.
pub fn resolve_imports(
    source_path: &Path,
    file: &SourceFile,
    options: &ImportOptions,
) -> Result<ResolvedImports> {
    let mut resolved = ResolvedImports::default();

    for import in &file.imports {
        resolved.set.insert(ImportSpec {
            alias: import.alias.clone(),
            path: import.path.clone(),
        });
    }

    if options.include_self {
        let path = match &options.self_import {
            Some(path) => tracegen_core::unquote(path).to_string(),
            None => module_import_path(source_path, options.module_root.as_deref())?,
        };
        tracing::debug!(self_import = %path, "resolved source package import");

        let spec = ImportSpec::new(path);
        resolved.set.insert(spec.clone());
        resolved.self_import = Some(spec);
    }

    Ok(resolved)
}

/// `module/<dir relative to module root>` for the directory holding `source_path`.
fn module_import_path(source_path: &Path, module_root: Option<&Path>) -> Result<String> {
    let source = absolute(source_path)?;
    let source_dir = source.parent().unwrap_or_else(|| Path::new("/"));

    let root = match module_root {
        Some(root) => absolute(root)?,
        None => find_module_root(source_dir).ok_or_else(|| {
            Error::config_with_help(
                format!("no {GO_MOD} found above '{}'", source_dir.display()),
                "pass --module-root <dir> or --self-import <path> to locate the source package",
            )
        })?,
    };

    let go_mod = GoMod::from_file(root.join(GO_MOD))?;
    tracing::debug!(
        module = %go_mod.module,
        go = go_mod.go_version.as_deref().unwrap_or("unspecified"),
        root = %root.display(),
        "resolved go module"
    );

    let relative = source_dir.strip_prefix(&root).map_err(|_| {
        Error::config_with_help(
            format!(
                "'{}' is outside the module root '{}'",
                source.display(),
                root.display()
            ),
            "pass --module-root <dir> or --self-import <path> to locate the source package",
        )
    })?;

    let mut import_path = go_mod.module;
    for component in relative.components() {
        if let Component::Normal(part) = component {
            import_path.push('/');
            import_path.push_str(&part.to_string_lossy());
        }
    }
    Ok(import_path)
}

/// Absolute, lexically normalized form of `path`.
fn absolute(path: &Path) -> Result<PathBuf> {
    let absolute =
        std::path::absolute(path).map_err(|source| Box::new(Error::CurrentDir { source }))?;

    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn parsed(source: &str) -> SourceFile {
        tracegen_syntax::parse(source, "user.go").unwrap()
    }

    #[test]
    fn test_import_spec_parse_forms() {
        assert_eq!(ImportSpec::parse("\"fmt\""), ImportSpec::new("fmt"));
        assert_eq!(ImportSpec::parse("fmt"), ImportSpec::new("fmt"));
        assert_eq!(
            ImportSpec::parse("sdktrace \"go.opentelemetry.io/otel/sdk/trace\""),
            ImportSpec::aliased("sdktrace", "go.opentelemetry.io/otel/sdk/trace")
        );
        assert_eq!(
            ImportSpec::parse("  _ `embed` "),
            ImportSpec::aliased("_", "embed")
        );
    }

    #[test]
    fn test_import_order_and_rendering() {
        let set: ImportSet = [
            "\"fmt\"",
            "Zeta/pkg",
            "bytes",
            "\"fmt\"",
            "sdktrace \"go.opentelemetry.io/otel/sdk/trace\"",
            "go.opentelemetry.io/otel/sdk/trace",
            "github.com/Masterminds/semver",
        ]
        .into_iter()
        .collect();

        insta::assert_snapshot!(set.render().join("\n"), @r#"
        "Zeta/pkg"
        "github.com/Masterminds/semver"
        "bytes"
        "fmt"
        "go.opentelemetry.io/otel/sdk/trace"
        sdktrace "go.opentelemetry.io/otel/sdk/trace"
        "#);
    }

    #[test]
    fn test_duplicates_collapse() {
        let mut set = ImportSet::new();
        assert!(set.add("fmt"));
        assert!(!set.add("\"fmt\""));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_resolve_without_self_import() {
        let file = parsed("package p\nimport (\n\t\"context\"\n\tent \"app/entity\"\n)\n");
        let resolved =
            resolve_imports(Path::new("/nowhere/user.go"), &file, &ImportOptions::default())
                .unwrap();

        assert!(resolved.self_import.is_none());
        assert_eq!(resolved.set.render(), vec!["ent \"app/entity\"", "\"context\""]);
    }

    #[test]
    fn test_resolve_self_import_from_go_mod() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module server-template\n\ngo 1.22\n").unwrap();
        let source_dir = dir.path().join("internal/domain/repository");
        fs::create_dir_all(&source_dir).unwrap();

        let file = parsed("package repository\nimport \"context\"\n");
        let options = ImportOptions {
            include_self: true,
            ..Default::default()
        };
        let resolved = resolve_imports(&source_dir.join("user.go"), &file, &options).unwrap();

        assert_eq!(
            resolved.self_import,
            Some(ImportSpec::new("server-template/internal/domain/repository"))
        );
        assert!(resolved.set.contains(&ImportSpec::new("context")));
        assert_eq!(resolved.set.len(), 2);
    }

    #[test]
    fn test_resolve_self_import_at_module_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("go.mod"), "module example.com/app\n").unwrap();

        let file = parsed("package app\n");
        let options = ImportOptions {
            include_self: true,
            module_root: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let resolved = resolve_imports(&dir.path().join("ports.go"), &file, &options).unwrap();
        assert_eq!(resolved.self_import, Some(ImportSpec::new("example.com/app")));
    }

    #[test]
    fn test_explicit_self_import_skips_go_mod() {
        let file = parsed("package repository\n");
        let options = ImportOptions {
            include_self: true,
            self_import: Some("\"server-template/internal/domain/repository\"".into()),
            ..Default::default()
        };
        let resolved =
            resolve_imports(Path::new("/nowhere/user.go"), &file, &options).unwrap();
        assert_eq!(
            resolved.self_import,
            Some(ImportSpec::new("server-template/internal/domain/repository"))
        );
    }

    #[test]
    fn test_missing_go_mod_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = parsed("package repository\n");
        let options = ImportOptions {
            include_self: true,
            module_root: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        let err = resolve_imports(&dir.path().join("user.go"), &file, &options).unwrap_err();
        assert!(matches!(*err, Error::Manifest(tracegen_manifest::Error::Io { .. })));
    }

    #[test]
    fn test_source_outside_module_root() {
        let root = tempfile::tempdir().unwrap();
        let other = tempfile::tempdir().unwrap();
        fs::write(root.path().join("go.mod"), "module app\n").unwrap();

        let file = parsed("package repository\n");
        let options = ImportOptions {
            include_self: true,
            module_root: Some(root.path().to_path_buf()),
            ..Default::default()
        };

        let err = resolve_imports(&other.path().join("user.go"), &file, &options).unwrap_err();
        match *err {
            Error::Config { message, help } => {
                assert!(message.contains("outside the module root"));
                assert!(help.unwrap().contains("--self-import"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_absolute_normalizes_parent_components() {
        let path = absolute(Path::new("/a/b/../c/./d.go")).unwrap();
        assert_eq!(path, PathBuf::from("/a/c/d.go"));
    }
}
