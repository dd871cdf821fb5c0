use std::{fmt, path::PathBuf};

use miette::Diagnostic;
use thiserror::Error;

/// Result type for codegen operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// A fatal error while generating one proxy.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] tracegen_syntax::ParseError),

    #[error("interface '{interface}' not found in '{file}'{}", found_suffix(.found))]
    #[diagnostic(
        code(tracegen::interface_not_found),
        help("check the interface name; only top-level interface types are considered")
    )]
    InterfaceNotFound {
        interface: String,
        file: String,
        found: Vec<String>,
    },

    #[error("{message}")]
    #[diagnostic(code(tracegen::config_error))]
    Config {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("failed to render template '{kind}'")]
    #[diagnostic(code(tracegen::template_error))]
    Template {
        kind: String,
        #[source]
        source: tera::Error,
    },

    #[error("failed to access '{path}'")]
    #[diagnostic(code(tracegen::io_error))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to resolve the current working directory")]
    #[diagnostic(code(tracegen::io_error))]
    CurrentDir {
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Manifest(#[from] tracegen_manifest::Error),

    #[error("stage '{stage}' ran before '{requires}'")]
    #[diagnostic(code(tracegen::pipeline_order))]
    StageOrder {
        stage: &'static str,
        requires: &'static str,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Box<Self> {
        Box::new(Error::Config {
            message: message.into(),
            help: None,
        })
    }

    /// Create a configuration error with a hint for the user
    pub fn config_with_help(message: impl Into<String>, help: impl Into<String>) -> Box<Self> {
        Box::new(Error::Config {
            message: message.into(),
            help: Some(help.into()),
        })
    }

    /// Create an I/O error for the given path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Box<Self> {
        Box::new(Error::Io {
            path: path.into(),
            source,
        })
    }
}

impl From<tracegen_syntax::ParseError> for Box<Error> {
    fn from(err: tracegen_syntax::ParseError) -> Self {
        Box::new(Error::Parse(err))
    }
}

impl From<Box<tracegen_manifest::Error>> for Box<Error> {
    fn from(err: Box<tracegen_manifest::Error>) -> Self {
        Box::new(Error::Manifest(*err))
    }
}

fn found_suffix(found: &[String]) -> String {
    if found.is_empty() {
        " (the file declares no interfaces)".to_string()
    } else {
        format!(" (found: {})", found.join(", "))
    }
}

/// The stages a generation task goes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Stage {
    Validate,
    Parse,
    Extract,
    ResolveImports,
    Emit,
}

impl Stage {
    /// Stable lowercase name used in logs and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Validate => "validate",
            Stage::Parse => "parse",
            Stage::Extract => "extract",
            Stage::ResolveImports => "resolve-imports",
            Stage::Emit => "emit",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task that failed, naming the task and the stage it failed in.
#[derive(Debug, Error)]
#[error("task '{task}' failed during {stage}")]
pub struct TaskError {
    /// Task label, `<source>::<interface>`
    pub task: String,
    pub stage: Stage,
    #[source]
    pub source: Box<Error>,
}

impl TaskError {
    pub fn new(task: impl Into<String>, stage: Stage, source: Box<Error>) -> Self {
        Self {
            task: task.into(),
            stage,
            source,
        }
    }
}

// Forward to the inner error so its source snippet and help are rendered.
impl Diagnostic for TaskError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new("tracegen::task_failed"))
    }

    fn diagnostic_source(&self) -> Option<&dyn Diagnostic> {
        Some(&*self.source)
    }
}

/// One or more tasks of a batch failed.
#[derive(Debug, Error, Diagnostic)]
#[error("{} of {total} task(s) failed ({completed} completed)", .failures.len())]
#[diagnostic(code(tracegen::batch_failed))]
pub struct BatchError {
    /// Tasks that finished successfully before or despite the failures
    pub completed: usize,
    /// Number of tasks in the batch
    pub total: usize,
    #[related]
    pub failures: Vec<TaskError>,
}
