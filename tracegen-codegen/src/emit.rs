//! Proxy rendering and output.

use std::{collections::HashMap, path::Path};

use serde::Serialize;
use tera::{Context, Tera, Value};
use tracegen_core::{File, WriteResult};

use crate::{Error, MethodSignature, Result, TemplateRegistry};

/// Everything a template can refer to.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateData {
    /// Package clause of the generated file
    pub package_name: String,
    /// `<Interface>Proxy`
    pub proxy_name: String,
    pub interface_name: String,
    /// `srcpkg.` when the proxy lives outside the interface's package, else empty
    pub interface_prefix: String,
    pub tracer_name: Option<String>,
    pub template_kind: String,
    pub methods: Vec<MethodSignature>,
    /// Rendered import lines, already ordered
    pub imports: Vec<String>,
}

impl TemplateData {
    /// Name of the proxy type generated for `interface`.
    pub fn proxy_name_for(interface: &str) -> String {
        format!("{interface}Proxy")
    }
}

type FilterFn = fn(&Value, &HashMap<String, Value>) -> tera::Result<Value>;

/// Filters made available to every template.
#[derive(Debug, Clone, Default)]
pub struct TemplateHelpers {
    filters: Vec<(&'static str, FilterFn)>,
}

impl TemplateHelpers {
    /// No helpers at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// The standard helper set: `sub(n=...)` integer subtraction and
    /// `go_quote` for Go string literals.
    pub fn standard() -> Self {
        Self::none()
            .filter("sub", sub_filter)
            .filter("go_quote", go_quote_filter)
    }

    /// Add a filter.
    pub fn filter(mut self, name: &'static str, filter: FilterFn) -> Self {
        self.filters.push((name, filter));
        self
    }

    fn install(&self, tera: &mut Tera) {
        for (name, filter) in &self.filters {
            tera.register_filter(name, *filter);
        }
    }
}

/// `{{ value | sub(n=1) }}`
fn sub_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let value = value
        .as_i64()
        .ok_or_else(|| tera::Error::msg(format!("filter `sub` expects an integer, got {value}")))?;
    let n = match args.get("n") {
        Some(n) => n
            .as_i64()
            .ok_or_else(|| tera::Error::msg("filter `sub` argument `n` must be an integer"))?,
        None => return Err(tera::Error::msg("filter `sub` requires an argument `n`")),
    };
    Ok(Value::from(value - n))
}

/// `{{ value | go_quote }}` renders an interpreted Go string literal.
fn go_quote_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let value = value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("filter `go_quote` expects a string, got {value}")))?;
    Ok(Value::from(go_quote(value)))
}

fn go_quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            c if c.is_control() => quoted.push_str(&format!("\\u{:04x}", c as u32)),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Renders template kinds from a registry and writes the results.
#[derive(Debug)]
pub struct ProxyEmitter<'a> {
    registry: &'a TemplateRegistry,
    helpers: TemplateHelpers,
}

impl<'a> ProxyEmitter<'a> {
    /// An emitter with the standard helpers.
    pub fn new(registry: &'a TemplateRegistry) -> Self {
        Self::with_helpers(registry, TemplateHelpers::standard())
    }

    pub fn with_helpers(registry: &'a TemplateRegistry, helpers: TemplateHelpers) -> Self {
        Self { registry, helpers }
    }

    /// Render `kind` with `data` into a string.
    pub fn render(&self, kind: &str, data: &TemplateData) -> Result<String> {
        let spec = self.registry.lookup(kind)?;
        let template_error = |source| {
            Box::new(Error::Template {
                kind: kind.to_string(),
                source,
            })
        };

        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        self.helpers.install(&mut tera);
        tera.add_raw_template(kind, &spec.body)
            .map_err(template_error)?;

        let context = Context::from_serialize(data).map_err(template_error)?;
        tera.render(kind, &context).map_err(template_error)
    }

    /// Render `kind` and write it to `output` atomically.
    ///
    /// Nothing is written when rendering fails or the file already has the
    /// rendered content.
    pub fn emit(&self, kind: &str, data: &TemplateData, output: &Path) -> Result<WriteResult> {
        let content = self.render(kind, data)?;
        let file = File::new(output, content);
        let result = file.write().map_err(|e| Error::io(output, e))?;

        match result {
            WriteResult::Written => {
                tracing::info!(path = %output.display(), kind, "wrote proxy")
            }
            WriteResult::Unchanged => {
                tracing::info!(path = %output.display(), kind, "proxy unchanged")
            }
        }
        Ok(result)
    }
}
