// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

//! Go source front end for tracegen.
//!
//! Parses a Go file into a small syntax tree ([`SourceFile`]) covering the
//! package clause, imports, and interface declarations, and renders
//! [`TypeExpr`] values back to Go source text.

mod ast;
mod error;
mod lexer;
mod parser;
mod render;

pub use ast::{
    Field, ImportDecl, InterfaceDecl, InterfaceElem, MethodDecl, SourceFile, Span, TypeExpr,
};
pub use error::{ParseError, ParseResult};
pub use lexer::{LexError, SpannedToken, Token, tokenize};
pub use parser::{Parser, parse};
pub use render::{render, render_qualified};
