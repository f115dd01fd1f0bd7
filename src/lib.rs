//! `prospect-research` library crate.
//!
//! The binary (`prospect`) is a thin wrapper around this library so that:
//!
//! - the normalization and scoring engine is testable without network access
//! - filing sources can be swapped (live HTTP vs. fixtures) behind `data::FilingSource`
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod normalize;
pub mod profile;
pub mod report;
pub mod scoring;
