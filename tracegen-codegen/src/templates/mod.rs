//! Template kinds and their import requirements.

mod registry;

pub use registry::{
    DEFAULT_TEMPLATE, ImportRequirement, TemplateRegistry, TemplateSpec,
};
