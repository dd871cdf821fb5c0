//! Non-fatal diagnostics collected while a task runs.

use serde::Serialize;

use crate::Stage;

/// Severity level for a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Severity {
    /// Something the user should look at; generation still succeeded.
    Warning,
    /// Informational message about the generation process.
    Info,
}

impl Severity {
    /// Returns true if this is a warning severity.
    pub fn is_warning(&self) -> bool {
        matches!(self, Severity::Warning)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// A diagnostic message from a task stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The stage that produced this diagnostic.
    pub stage: Stage,
    /// The diagnostic message.
    pub message: String,
    /// Optional location in the source (e.g., "UserRepository.Watch").
    pub location: Option<String>,
}

impl Diagnostic {
    /// Create a new warning diagnostic.
    pub fn warning(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            stage,
            message: message.into(),
            location: None,
        }
    }

    /// Create a new info diagnostic.
    pub fn info(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            stage,
            message: message.into(),
            location: None,
        }
    }

    /// Add a location to this diagnostic.
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Emit this diagnostic as a tracing event.
    pub fn log(&self) {
        let location = self.location.as_deref().unwrap_or("-");
        match self.severity {
            Severity::Warning => {
                tracing::warn!(stage = %self.stage, location, "{}", self.message)
            }
            Severity::Info => tracing::info!(stage = %self.stage, location, "{}", self.message),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " (at {})", loc)?;
        }
        Ok(())
    }
}
