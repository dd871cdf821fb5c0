//! Minimal `go.mod` reader.
//!
//! Only the `module` and `go` directives are read; everything else in the
//! file is ignored.

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// File name of a Go module manifest.
pub const GO_MOD: &str = "go.mod";

/// The parts of a `go.mod` file the generator needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoMod {
    /// Module path from the `module` directive.
    pub module: String,
    /// Version from the `go` directive, if present.
    pub go_version: Option<String>,
}

impl GoMod {
    /// Read and parse `go.mod` at the given path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse(&content).ok_or_else(|| {
            Box::new(Error::MissingModule {
                path: path.to_path_buf(),
            })
        })
    }

    /// Parse `go.mod` content; `None` when there is no `module` directive.
    pub fn parse(content: &str) -> Option<Self> {
        let mut module = None;
        let mut go_version = None;

        for line in content.lines() {
            let line = strip_comment(line).trim();
            if let Some(rest) = directive(line, "module") {
                module = Some(unquote_module(rest).to_string());
            } else if let Some(rest) = directive(line, "go") {
                go_version = Some(rest.to_string());
            }
        }

        module
            .filter(|m| !m.is_empty())
            .map(|module| Self { module, go_version })
    }
}

/// Walk up from `dir` to the nearest directory containing `go.mod`.
pub fn find_module_root(dir: &Path) -> Option<PathBuf> {
    dir.ancestors()
        .find(|candidate| candidate.join(GO_MOD).is_file())
        .map(Path::to_path_buf)
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(index) => &line[..index],
        None => line,
    }
}

/// Return the argument of `keyword arg`, or `None` if the line is another directive.
fn directive<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim())
    } else {
        None
    }
}

fn unquote_module(module: &str) -> &str {
    module
        .strip_prefix('"')
        .and_then(|m| m.strip_suffix('"'))
        .unwrap_or(module)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_module_and_go_version() {
        let go_mod = GoMod::parse(
            "// server template\nmodule server-template\n\ngo 1.22\n\nrequire (\n\tgo.opentelemetry.io/otel v1.28.0\n)\n",
        )
        .expect("module directive");

        assert_eq!(go_mod.module, "server-template");
        assert_eq!(go_mod.go_version.as_deref(), Some("1.22"));
    }

    #[test]
    fn test_parse_quoted_module_with_comment() {
        let go_mod = GoMod::parse("module \"example.com/app\" // main module\n").unwrap();
        assert_eq!(go_mod.module, "example.com/app");
        assert_eq!(go_mod.go_version, None);
    }

    #[test]
    fn test_parse_without_module() {
        assert_eq!(GoMod::parse("go 1.21\n"), None);
        assert_eq!(GoMod::parse("modules x\n"), None);
    }

    #[test]
    fn test_from_file_reports_missing_module() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(GO_MOD);
        std::fs::write(&path, "go 1.22\n").unwrap();

        let err = GoMod::from_file(&path).unwrap_err();
        assert!(matches!(*err, Error::MissingModule { .. }));
    }

    #[test]
    fn test_from_file_reports_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GoMod::from_file(dir.path().join(GO_MOD)).unwrap_err();
        assert!(matches!(*err, Error::Io { .. }));
    }

    #[test]
    fn test_find_module_root_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(GO_MOD), "module app\n").unwrap();
        let nested = dir.path().join("internal/domain/repository");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_module_root(&nested), Some(dir.path().to_path_buf()));
    }
}
