//! Render [`TypeExpr`] back to Go source text.

use crate::ast::TypeExpr;

/// Render a type exactly as it would be written in the declaring package.
pub fn render(ty: &TypeExpr) -> String {
    let mut out = String::new();
    write_type(&mut out, ty, None);
    out
}

/// Render a type for use outside its declaring package.
///
/// Exported unqualified identifiers (`User`, `*Option`) are prefixed with
/// `package.`; builtins and already-qualified names are left alone.
pub fn render_qualified(ty: &TypeExpr, package: &str) -> String {
    let mut out = String::new();
    write_type(&mut out, ty, Some(package));
    out
}

fn write_type(out: &mut String, ty: &TypeExpr, qualifier: Option<&str>) {
    match ty {
        TypeExpr::Identifier(name) => {
            if let Some(package) = qualifier.filter(|_| is_exported(name)) {
                out.push_str(package);
                out.push('.');
            }
            out.push_str(name);
        }
        TypeExpr::Pointer(inner) => {
            out.push('*');
            write_type(out, inner, qualifier);
        }
        TypeExpr::Qualified { package, name } => {
            out.push_str(package);
            out.push('.');
            out.push_str(name);
        }
        TypeExpr::Slice(elem) => {
            out.push_str("[]");
            write_type(out, elem, qualifier);
        }
        TypeExpr::Map { key, value } => {
            out.push_str("map[");
            write_type(out, key, qualifier);
            out.push(']');
            write_type(out, value, qualifier);
        }
        TypeExpr::InterfaceAny => out.push_str("interface{}"),
        TypeExpr::Variadic(elem) => {
            out.push_str("...");
            write_type(out, elem, qualifier);
        }
        TypeExpr::Unsupported(raw) => {
            // Keep the placeholder a single well-formed comment
            out.push_str("/* unsupported type: ");
            out.push_str(&raw.replace("*/", "* /"));
            out.push_str(" */");
        }
    }
}

fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
