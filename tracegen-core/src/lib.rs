//! Core utilities and types for the tracegen proxy generator.
//!
//! This crate provides the file output primitives shared by the
//! generator crates.

mod file;
mod utils;

// File operations
pub use file::{File, WriteResult};
// String utilities
pub use utils::{collapse_whitespace, unquote};
