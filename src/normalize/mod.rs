//! Normalization of raw source payloads.
//!
//! - candidate-path field resolution over untyped JSON (`resolver`)
//! - identity / snapshot / foundation builders (`normalizer`)

pub mod normalizer;
pub mod resolver;

pub use normalizer::*;
pub use resolver::FieldPath;
