//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - company identity and normalized financial facts (`CompanyIdentity`, `FinancialSnapshot`)
//! - the optional affiliated foundation (`FoundationRecord`)
//! - derived metrics (`CapacityScore`, `AlignmentAssessment`) and the assembled `ProspectProfile`

pub mod types;

pub use types::*;
