//! Neutral syntax tree for the parts of a Go file the generator reads.
//!
//! Everything downstream of the parser works on these types only; no lexer
//! tokens leak out of this crate.

use std::{fmt, ops::Range};

/// Byte range into the parsed source.
pub type Span = Range<usize>;

/// A parsed Go source file, reduced to package, imports, and interfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Name from the `package` clause.
    pub package: String,
    /// Import specs in source order.
    pub imports: Vec<ImportDecl>,
    /// Top-level interface type declarations in source order.
    pub interfaces: Vec<InterfaceDecl>,
}

impl SourceFile {
    /// Find a top-level interface by name.
    pub fn interface(&self, name: &str) -> Option<&InterfaceDecl> {
        self.interfaces.iter().find(|i| i.name == name)
    }

    /// Names of all top-level interfaces, in source order.
    pub fn interface_names(&self) -> impl Iterator<Item = &str> {
        self.interfaces.iter().map(|i| i.name.as_str())
    }
}

/// One import spec, e.g. `sdktrace "go.opentelemetry.io/otel/sdk/trace"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Explicit package name (`_` and `.` included), if any.
    pub alias: Option<String>,
    /// Unquoted import path.
    pub path: String,
    pub span: Span,
}

/// `type Name interface { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDecl {
    pub name: String,
    /// Raw type parameter list (`[T any]`) for generic interfaces.
    pub type_params: Option<String>,
    pub elements: Vec<InterfaceElem>,
    pub span: Span,
}

impl InterfaceDecl {
    /// Directly declared methods, in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.elements.iter().filter_map(|e| match e {
            InterfaceElem::Method(m) => Some(m),
            InterfaceElem::Embedded { .. } => None,
        })
    }

    /// Embedded interfaces and type-set terms, as written.
    pub fn embedded(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            InterfaceElem::Embedded { raw, .. } => Some(raw.as_str()),
            InterfaceElem::Method(_) => None,
        })
    }
}

/// An entry in an interface body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceElem {
    /// A named method.
    Method(MethodDecl),
    /// An embedded interface or type-set element (`io.Reader`, `~int | ~string`).
    Embedded { raw: String, span: Span },
}

/// A method specification inside an interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Field>,
    pub results: Vec<Field>,
    pub span: Span,
}

/// A parameter or result group: `a, b int` has two names and one type.
///
/// Anonymous fields have no names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub names: Vec<String>,
    pub ty: TypeExpr,
}

impl Field {
    /// A field without names.
    pub fn anonymous(ty: TypeExpr) -> Self {
        Self {
            names: Vec::new(),
            ty,
        }
    }

    /// A field with the given names.
    pub fn named(names: impl IntoIterator<Item = impl Into<String>>, ty: TypeExpr) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ty,
        }
    }
}

/// Syntactic type description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `T`
    Identifier(String),
    /// `*T`
    Pointer(Box<TypeExpr>),
    /// `pkg.T`
    Qualified { package: String, name: String },
    /// `[]T`
    Slice(Box<TypeExpr>),
    /// `map[K]V`
    Map { key: Box<TypeExpr>, value: Box<TypeExpr> },
    /// `interface{}`
    InterfaceAny,
    /// `...T`, only valid as the last parameter
    Variadic(Box<TypeExpr>),
    /// Anything else, kept as normalized source text.
    Unsupported(String),
}

impl TypeExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        TypeExpr::Identifier(name.into())
    }

    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Qualified {
            package: package.into(),
            name: name.into(),
        }
    }

    pub fn pointer(inner: TypeExpr) -> Self {
        TypeExpr::Pointer(Box::new(inner))
    }

    pub fn slice(elem: TypeExpr) -> Self {
        TypeExpr::Slice(Box::new(elem))
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn variadic(elem: TypeExpr) -> Self {
        TypeExpr::Variadic(Box::new(elem))
    }

    /// Raw descriptions of every unsupported node in this expression.
    pub fn unsupported_parts(&self) -> Vec<&str> {
        let mut parts = Vec::new();
        self.collect_unsupported(&mut parts);
        parts
    }

    fn collect_unsupported<'a>(&'a self, parts: &mut Vec<&'a str>) {
        match self {
            TypeExpr::Unsupported(raw) => parts.push(raw),
            TypeExpr::Pointer(inner) | TypeExpr::Slice(inner) | TypeExpr::Variadic(inner) => {
                inner.collect_unsupported(parts)
            }
            TypeExpr::Map { key, value } => {
                key.collect_unsupported(parts);
                value.collect_unsupported(parts);
            }
            TypeExpr::Identifier(_) | TypeExpr::Qualified { .. } | TypeExpr::InterfaceAny => {}
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::render(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_parts_are_collected_recursively() {
        let ty = TypeExpr::map(
            TypeExpr::ident("string"),
            TypeExpr::slice(TypeExpr::Unsupported("chan int".into())),
        );
        assert_eq!(ty.unsupported_parts(), vec!["chan int"]);
        assert!(TypeExpr::ident("error").unsupported_parts().is_empty());
    }

    #[test]
    fn test_interface_methods_skip_embedded() {
        let decl = InterfaceDecl {
            name: "ReadCloser".into(),
            type_params: None,
            elements: vec![
                InterfaceElem::Embedded {
                    raw: "io.Reader".into(),
                    span: 0..0,
                },
                InterfaceElem::Method(MethodDecl {
                    name: "Close".into(),
                    params: vec![],
                    results: vec![Field::anonymous(TypeExpr::ident("error"))],
                    span: 0..0,
                }),
            ],
            span: 0..0,
        };

        let names: Vec<_> = decl.methods().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Close"]);
        assert_eq!(decl.embedded().collect::<Vec<_>>(), vec!["io.Reader"]);
    }
}
