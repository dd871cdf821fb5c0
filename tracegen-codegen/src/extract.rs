//! Interface extraction: from a parsed Go file to the method signatures a
//! proxy has to implement.

use std::collections::HashSet;

use serde::Serialize;
use tracegen_syntax::{Field, InterfaceDecl, SourceFile, TypeExpr, render, render_qualified};

use crate::{Diagnostic, Error, Result, Stage};

const CONTEXT_TYPE: &str = "context.Context";
const ERROR_TYPE: &str = "error";

/// Identifiers a wrapper body refers to besides its own locals: the receiver
/// and the packages used inside method bodies.
const RESERVED_NAMES: &[&str] = &["proxy", "context", "codes"];

/// One method parameter with its rendered type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Declared name; empty for anonymous parameters.
    pub name: String,
    /// Rendered Go type.
    pub ty: String,
    /// Identifier the generated wrapper declares and forwards: the declared
    /// name, or `argN` when the parameter is anonymous or `_`. Clashing names
    /// get a `_N` suffix.
    pub binding: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            binding: String::new(),
        }
    }
}

/// A single interface method, in the shape templates consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodSignature {
    pub name: String,
    pub parameters: Vec<Parameter>,
    /// Rendered result types, one entry per result name.
    pub results: Vec<String>,
    /// Any result renders to `error`.
    pub has_error_result: bool,
    /// Parameter names in order, anonymous parameters omitted.
    pub call_arguments: Vec<String>,
    /// Every parameter binding in order; what the wrapper forwards.
    pub forward_arguments: Vec<String>,
    /// The last parameter is `...T`.
    pub variadic: bool,
    /// Binding of the first `context.Context` parameter.
    pub context_argument: Option<String>,
    /// Local holding the span; `span` unless a parameter already uses it.
    pub span_var: String,
    /// `r0..rN`, one per result, renamed when a parameter uses the name.
    pub result_vars: Vec<String>,
    /// The result variable holding the last `error` result.
    pub error_var: Option<String>,
}

impl MethodSignature {
    /// Build a signature and compute its derived fields.
    ///
    /// Bindings, the span variable and the result variables are unique within
    /// the wrapper and never shadow the receiver or a package used in the body.
    pub fn new(name: impl Into<String>, mut parameters: Vec<Parameter>, results: Vec<String>) -> Self {
        let mut scope = Scope::new(RESERVED_NAMES);

        // Declared names win over generated ones
        for param in &mut parameters {
            param.binding.clear();
            if is_declared(&param.name) && scope.claim(&param.name) {
                param.binding = param.name.clone();
            }
        }
        for (index, param) in parameters.iter_mut().enumerate() {
            if param.binding.is_empty() {
                let base = if is_declared(&param.name) {
                    param.name.clone()
                } else {
                    format!("arg{index}")
                };
                param.binding = scope.fresh(&base);
            }
        }

        let call_arguments = parameters
            .iter()
            .filter(|p| !p.name.is_empty())
            .map(|p| p.name.clone())
            .collect();
        let forward_arguments = parameters.iter().map(|p| p.binding.clone()).collect();
        let variadic = parameters.last().is_some_and(|p| p.ty.starts_with("..."));
        let context_argument = parameters
            .iter()
            .find(|p| p.ty == CONTEXT_TYPE)
            .map(|p| p.binding.clone());

        let span_var = scope.fresh("span");
        let result_vars: Vec<String> = (0..results.len())
            .map(|i| scope.fresh(&format!("r{i}")))
            .collect();
        let error_var = results
            .iter()
            .rposition(|r| r == ERROR_TYPE)
            .and_then(|i| result_vars.get(i).cloned());

        Self {
            name: name.into(),
            has_error_result: error_var.is_some(),
            parameters,
            results,
            call_arguments,
            forward_arguments,
            variadic,
            context_argument,
            span_var,
            result_vars,
            error_var,
        }
    }
}

fn is_declared(name: &str) -> bool {
    !name.is_empty() && name != "_"
}

/// Identifiers taken inside one generated wrapper.
struct Scope {
    taken: HashSet<String>,
}

impl Scope {
    fn new(reserved: &[&str]) -> Self {
        Self {
            taken: reserved.iter().map(|r| r.to_string()).collect(),
        }
    }

    /// Take `name` if it is still free.
    fn claim(&mut self, name: &str) -> bool {
        self.taken.insert(name.to_string())
    }

    /// `base`, or `base_1`, `base_2`, ... for the first free one.
    fn fresh(&mut self, base: &str) -> String {
        if self.claim(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}_{n}"))
            .find(|candidate| self.claim(candidate))
            .unwrap_or_default()
    }
}

/// Knobs for [`extract_from`].
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Package to qualify exported unqualified types with, when the proxy is
    /// generated outside the interface's package.
    pub qualifier: Option<String>,
}

/// Methods of one interface plus the non-fatal findings.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub methods: Vec<MethodSignature>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse `source` and extract the methods of `interface`.
pub fn extract(source: &str, filename: &str, interface: &str) -> Result<Vec<MethodSignature>> {
    let file = tracegen_syntax::parse(source, filename)?;
    let extraction = extract_from(&file, filename, interface, &ExtractOptions::default())?;
    Ok(extraction.methods)
}

/// Extract the methods of `interface` from an already parsed file.
pub fn extract_from(
    file: &SourceFile,
    filename: &str,
    interface: &str,
    options: &ExtractOptions,
) -> Result<Extraction> {
    let Some(decl) = file.interface(interface) else {
        return Err(Box::new(Error::InterfaceNotFound {
            interface: interface.to_string(),
            file: filename.to_string(),
            found: file.interface_names().map(str::to_string).collect(),
        }));
    };

    let mut extraction = Extraction::default();
    check_interface_shape(decl, &mut extraction.diagnostics);

    let render_type = |ty: &TypeExpr| match &options.qualifier {
        Some(package) => render_qualified(ty, package),
        None => render(ty),
    };

    for method in decl.methods() {
        let location = format!("{}.{}", decl.name, method.name);
        for field in method.params.iter().chain(&method.results) {
            for raw in field.ty.unsupported_parts() {
                extraction.diagnostics.push(
                    Diagnostic::warning(
                        Stage::Extract,
                        format!("unsupported type '{raw}' rendered as a placeholder"),
                    )
                    .at(location.clone()),
                );
            }
        }

        let parameters = expand(&method.params)
            .map(|(name, ty)| Parameter::new(name, render_type(ty)))
            .collect();
        let results = expand(&method.results)
            .map(|(_, ty)| render_type(ty))
            .collect();

        extraction
            .methods
            .push(MethodSignature::new(&method.name, parameters, results));
    }

    tracing::debug!(
        interface,
        methods = extraction.methods.len(),
        warnings = extraction.diagnostics.len(),
        "extracted interface"
    );
    if extraction.methods.is_empty() {
        extraction.diagnostics.push(
            Diagnostic::info(
                Stage::Extract,
                "interface declares no methods, the proxy only wraps construction",
            )
            .at(decl.name.clone()),
        );
    }
    Ok(extraction)
}

/// Warn about interface features the proxy cannot carry over.
fn check_interface_shape(decl: &InterfaceDecl, diagnostics: &mut Vec<Diagnostic>) {
    for embedded in decl.embedded() {
        diagnostics.push(
            Diagnostic::warning(
                Stage::Extract,
                format!("embedded element '{embedded}' is not expanded; its methods are not proxied"),
            )
            .at(decl.name.clone()),
        );
    }
    if let Some(params) = &decl.type_params {
        diagnostics.push(
            Diagnostic::warning(
                Stage::Extract,
                format!("type parameters '{params}' are not carried over to the proxy"),
            )
            .at(decl.name.clone()),
        );
    }
}

/// One `(name, type)` pair per declared name; anonymous fields get an empty name.
fn expand(fields: &[Field]) -> impl Iterator<Item = (&str, &TypeExpr)> {
    fields.iter().flat_map(|field| {
        let names: Vec<&str> = if field.names.is_empty() {
            vec![""]
        } else {
            field.names.iter().map(String::as_str).collect()
        };
        names.into_iter().map(move |name| (name, &field.ty))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Severity;

    const REPOSITORY: &str = r#"
package repository

import (
	"context"

	"server-template/internal/domain/entity"
)

type UserRepository interface {
	Create(ctx context.Context, user *entity.User) error
	FindByEmail(ctx context.Context, email string) (*entity.User, error)
	Watch(ctx context.Context, events chan Event) error
	Count() int
}
"#;

    #[test]
    fn test_extract_methods_in_declaration_order() {
        let methods = extract(REPOSITORY, "user.go", "UserRepository").unwrap();
        let names: Vec<_> = methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Create", "FindByEmail", "Watch", "Count"]);
    }

    #[test]
    fn test_extract_signature_details() {
        let methods = extract(
            "package p\ntype Foo interface { Bar(ctx Context, id string) (*Entity, error) }",
            "foo.go",
            "Foo",
        )
        .unwrap();

        let bar = &methods[0];
        assert_eq!(
            bar.parameters,
            vec![
                Parameter {
                    name: "ctx".into(),
                    ty: "Context".into(),
                    binding: "ctx".into()
                },
                Parameter {
                    name: "id".into(),
                    ty: "string".into(),
                    binding: "id".into()
                },
            ]
        );
        assert_eq!(bar.results, vec!["*Entity", "error"]);
        assert!(bar.has_error_result);
        assert_eq!(bar.call_arguments, vec!["ctx", "id"]);
        assert_eq!(bar.result_vars, vec!["r0", "r1"]);
        assert_eq!(bar.error_var.as_deref(), Some("r1"));
        // Only `context.Context` counts as a context argument
        assert_eq!(bar.context_argument, None);
    }

    #[test]
    fn test_unsupported_type_is_placeholder_and_warning() {
        let file = tracegen_syntax::parse(REPOSITORY, "user.go").unwrap();
        let extraction =
            extract_from(&file, "user.go", "UserRepository", &ExtractOptions::default()).unwrap();

        let watch = &extraction.methods[2];
        assert_eq!(
            watch.parameters[1].ty,
            "/* unsupported type: chan Event */"
        );
        assert_eq!(extraction.methods.len(), 4);

        assert_eq!(extraction.diagnostics.len(), 1);
        let diag = &extraction.diagnostics[0];
        assert!(diag.severity.is_warning());
        assert_eq!(diag.location.as_deref(), Some("UserRepository.Watch"));
    }

    #[test]
    fn test_grouped_and_anonymous_parameters() {
        let methods = extract(
            "package p\ntype A interface {\n\tLogin(ctx context.Context, email, password string) (string, error)\n\tPing(context.Context, string)\n\tSkip(_ int)\n}",
            "a.go",
            "A",
        )
        .unwrap();

        let login = &methods[0];
        assert_eq!(login.call_arguments, vec!["ctx", "email", "password"]);
        assert_eq!(login.parameters[2].ty, "string");
        assert_eq!(login.context_argument.as_deref(), Some("ctx"));

        let ping = &methods[1];
        assert!(ping.parameters.iter().all(|p| p.name.is_empty()));
        assert!(ping.call_arguments.is_empty());
        assert_eq!(ping.forward_arguments, vec!["arg0", "arg1"]);
        assert_eq!(ping.context_argument.as_deref(), Some("arg0"));

        let skip = &methods[2];
        assert_eq!(skip.call_arguments, vec!["_"]);
        assert_eq!(skip.forward_arguments, vec!["arg0"]);
    }

    #[test]
    fn test_parameter_named_span_moves_the_span_variable() {
        let methods = extract(
            "package p\ntype Recorder interface { Record(ctx context.Context, span Span) error }",
            "a.go",
            "Recorder",
        )
        .unwrap();

        let record = &methods[0];
        assert_eq!(record.forward_arguments, vec!["ctx", "span"]);
        assert_eq!(record.span_var, "span_1");
        assert_eq!(record.error_var.as_deref(), Some("r0"));
    }

    #[test]
    fn test_parameter_named_like_the_receiver_is_renamed() {
        let methods = extract(
            "package p\ntype Recorder interface { Attach(proxy string, context int) error }",
            "a.go",
            "Recorder",
        )
        .unwrap();

        let attach = &methods[0];
        assert_eq!(attach.call_arguments, vec!["proxy", "context"]);
        assert_eq!(attach.forward_arguments, vec!["proxy_1", "context_1"]);
        assert_eq!(attach.span_var, "span");
    }

    #[test]
    fn test_generated_bindings_avoid_declared_names() {
        let methods = extract(
            "package p\ntype Recorder interface { Mix(_ int, arg0 string, r0 bool) (int, error) }",
            "a.go",
            "Recorder",
        )
        .unwrap();

        let mix = &methods[0];
        assert_eq!(mix.forward_arguments, vec!["arg0_1", "arg0", "r0"]);
        assert_eq!(mix.result_vars, vec!["r0_1", "r1"]);
        assert_eq!(mix.error_var.as_deref(), Some("r1"));
    }

    #[test]
    fn test_named_results_expand_per_name() {
        let methods = extract(
            "package p\ntype A interface { Split(s string) (head, tail string, err error) }",
            "a.go",
            "A",
        )
        .unwrap();
        assert_eq!(methods[0].results, vec!["string", "string", "error"]);
        assert_eq!(methods[0].error_var.as_deref(), Some("r2"));
    }

    #[test]
    fn test_variadic_method() {
        let methods = extract(
            "package p\ntype A interface { Log(format string, args ...interface{}) }",
            "a.go",
            "A",
        )
        .unwrap();
        assert!(methods[0].variadic);
        assert_eq!(methods[0].parameters[1].ty, "...interface{}");
        assert!(!methods[0].has_error_result);
        assert!(methods[0].error_var.is_none());
    }

    #[test]
    fn test_zero_method_interface() {
        let methods = extract("package p\ntype Marker interface{}", "a.go", "Marker").unwrap();
        assert!(methods.is_empty());
    }

    #[test]
    fn test_zero_method_interface_is_noted() {
        let file = tracegen_syntax::parse("package p\ntype Marker interface{}", "a.go").unwrap();
        let extraction =
            extract_from(&file, "a.go", "Marker", &ExtractOptions::default()).unwrap();

        assert_eq!(extraction.diagnostics.len(), 1);
        let note = &extraction.diagnostics[0];
        assert_eq!(note.severity, Severity::Info);
        assert_eq!(note.location.as_deref(), Some("Marker"));
    }

    #[test]
    fn test_interface_not_found_lists_available() {
        let err = extract(REPOSITORY, "user.go", "SessionStore").unwrap_err();
        match *err {
            Error::InterfaceNotFound { found, .. } => {
                assert_eq!(found, vec!["UserRepository"])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_interface_type_is_not_found() {
        let err = extract("package p\ntype User struct{}", "a.go", "User").unwrap_err();
        assert!(matches!(*err, Error::InterfaceNotFound { .. }));
    }

    #[test]
    fn test_parse_failure_is_reported() {
        let err = extract("package p\ntype A interface {", "a.go", "A").unwrap_err();
        assert!(matches!(*err, Error::Parse(_)));
    }

    #[test]
    fn test_qualifier_prefixes_exported_local_types() {
        let file = tracegen_syntax::parse(
            "package repository\ntype A interface { Get(id ID, opts ...Option) (*User, error) }",
            "a.go",
        )
        .unwrap();
        let options = ExtractOptions {
            qualifier: Some("repository".into()),
        };
        let extraction = extract_from(&file, "a.go", "A", &options).unwrap();

        let get = &extraction.methods[0];
        assert_eq!(get.parameters[0].ty, "repository.ID");
        assert_eq!(get.parameters[1].ty, "...repository.Option");
        assert_eq!(get.results, vec!["*repository.User", "error"]);
    }

    #[test]
    fn test_embedded_and_type_params_are_warnings() {
        let file = tracegen_syntax::parse(
            "package p\ntype Store[T any] interface {\n\tio.Closer\n\tGet(id string) (T, error)\n}",
            "a.go",
        )
        .unwrap();
        let extraction = extract_from(&file, "a.go", "Store", &ExtractOptions::default()).unwrap();

        assert_eq!(extraction.methods.len(), 1);
        let messages: Vec<_> = extraction
            .diagnostics
            .iter()
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(
            messages,
            vec![
                "embedded element 'io.Closer' is not expanded; its methods are not proxied",
                "type parameters '[T any]' are not carried over to the proxy",
            ]
        );
    }
}
