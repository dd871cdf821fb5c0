//! Template kinds available to the emitter.
//!
//! The registry is an ordinary value: build it once (usually with
//! [`TemplateRegistry::builtin`]), add any custom kinds, and pass it by
//! reference to every task.

use std::borrow::Cow;

use indexmap::IndexMap;

use crate::{Error, ImportSet, MethodSignature, Result};

/// Template kind used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "otel";

const OTEL_PROXY: &str = include_str!("otel_proxy.go.tera");

/// An import a template needs, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportRequirement {
    /// Needed by every generated file.
    Always(String),
    /// Needed when some method has no `context.Context` parameter.
    WhenAnyMethodLacksContext(String),
    /// Needed when some method returns an error.
    WhenAnyMethodReturnsError(String),
}

impl ImportRequirement {
    /// The import spec, e.g. `"context"` or `otelcodes "go.opentelemetry.io/otel/codes"`.
    pub fn spec(&self) -> &str {
        match self {
            ImportRequirement::Always(spec)
            | ImportRequirement::WhenAnyMethodLacksContext(spec)
            | ImportRequirement::WhenAnyMethodReturnsError(spec) => spec,
        }
    }

    /// Whether a file proxying `methods` needs this import.
    pub fn applies(&self, methods: &[MethodSignature]) -> bool {
        match self {
            ImportRequirement::Always(_) => true,
            ImportRequirement::WhenAnyMethodLacksContext(_) => {
                methods.iter().any(|m| m.context_argument.is_none())
            }
            ImportRequirement::WhenAnyMethodReturnsError(_) => {
                methods.iter().any(|m| m.has_error_result)
            }
        }
    }
}

/// A template body and the imports its output refers to.
#[derive(Debug, Clone)]
pub struct TemplateSpec {
    pub body: Cow<'static, str>,
    pub imports: Vec<ImportRequirement>,
}

impl TemplateSpec {
    pub fn new(body: impl Into<Cow<'static, str>>) -> Self {
        Self {
            body: body.into(),
            imports: Vec::new(),
        }
    }

    /// Add an import requirement.
    pub fn import(mut self, requirement: ImportRequirement) -> Self {
        self.imports.push(requirement);
        self
    }

    /// Imports this template needs for the given methods.
    pub fn required_imports(&self, methods: &[MethodSignature]) -> ImportSet {
        self.imports
            .iter()
            .filter(|r| r.applies(methods))
            .map(ImportRequirement::spec)
            .collect()
    }

    /// The built-in OpenTelemetry proxy template.
    pub fn otel() -> Self {
        Self::new(OTEL_PROXY)
            .import(ImportRequirement::Always("go.opentelemetry.io/otel".into()))
            .import(ImportRequirement::Always(
                "go.opentelemetry.io/otel/trace".into(),
            ))
            .import(ImportRequirement::WhenAnyMethodLacksContext(
                "context".into(),
            ))
            .import(ImportRequirement::WhenAnyMethodReturnsError(
                "go.opentelemetry.io/otel/codes".into(),
            ))
    }
}

/// Ordered map of template kind to template.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: IndexMap<String, TemplateSpec>,
}

impl TemplateRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in kinds (`otel`).
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(DEFAULT_TEMPLATE, TemplateSpec::otel());
        registry
    }

    /// Register a kind, returning the template it replaced.
    pub fn register(&mut self, kind: impl Into<String>, spec: TemplateSpec) -> Option<TemplateSpec> {
        let kind = kind.into();
        tracing::debug!(kind = %kind, "registered template");
        self.templates.insert(kind, spec)
    }

    pub fn get(&self, kind: &str) -> Option<&TemplateSpec> {
        self.templates.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.templates.contains_key(kind)
    }

    /// Registered kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Look up a kind, failing with the list of supported kinds.
    pub fn lookup(&self, kind: &str) -> Result<&TemplateSpec> {
        self.get(kind).ok_or_else(|| {
            let supported = self.kinds().collect::<Vec<_>>().join(", ");
            Error::config_with_help(
                format!("unsupported template kind '{kind}'"),
                format!("supported kinds: {supported}"),
            )
        })
    }
}
