//! State carried through the stages of one task.

use tracegen_core::WriteResult;
use tracegen_manifest::GenerationTask;
use tracegen_syntax::SourceFile;

use super::diagnostic::Diagnostic;
use crate::{Error, MethodSignature, ResolvedImports, Result, Stage};

/// Context passed through all stages of a task.
///
/// Each stage fills in the part later stages read.
#[derive(Debug)]
pub struct TaskContext<'t> {
    /// The task being run.
    pub task: &'t GenerationTask,
    /// Parsed source file (populated by the parse stage).
    pub file: Option<SourceFile>,
    /// Interface methods (populated by the extract stage).
    pub methods: Vec<MethodSignature>,
    /// Imports of the source file (populated by the resolve-imports stage).
    pub imports: Option<ResolvedImports>,
    /// Rendered proxy, kept on dry runs.
    pub rendered: Option<String>,
    /// Outcome of the write, when the proxy was written.
    pub write_result: Option<WriteResult>,
    /// Diagnostics collected along the way.
    pub diagnostics: Vec<Diagnostic>,
}

impl<'t> TaskContext<'t> {
    pub fn new(task: &'t GenerationTask) -> Self {
        Self {
            task,
            file: None,
            methods: Vec::new(),
            imports: None,
            rendered: None,
            write_result: None,
            diagnostics: Vec::new(),
        }
    }

    /// The parsed source, or an ordering error naming `stage`.
    pub fn file(&self, stage: Stage) -> Result<&SourceFile> {
        self.file.as_ref().ok_or_else(|| {
            Box::new(Error::StageOrder {
                stage: stage.as_str(),
                requires: Stage::Parse.as_str(),
            })
        })
    }

    /// The resolved imports, or an ordering error naming `stage`.
    pub fn imports(&self, stage: Stage) -> Result<&ResolvedImports> {
        self.imports.as_ref().ok_or_else(|| {
            Box::new(Error::StageOrder {
                stage: stage.as_str(),
                requires: Stage::ResolveImports.as_str(),
            })
        })
    }

    /// Whether the proxy is generated into a different package than the interface.
    pub fn is_cross_package(&self) -> Result<bool> {
        Ok(self.file(Stage::Extract)?.package != self.task.package)
    }

    /// Record and log a diagnostic.
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        diagnostic.log();
        self.diagnostics.push(diagnostic);
    }

    /// Count the number of warning diagnostics.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_warning())
            .count()
    }
}
