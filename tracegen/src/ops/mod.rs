//! Core operations.
//!
//! This module contains the business logic for tracegen,
//! separated from CLI argument parsing and output rendering.

pub mod generate;
pub mod templates;

pub use generate::{GenerateOptions, generate};
pub use templates::register_templates;
