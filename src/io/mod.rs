//! Input/output helpers.
//!
//! - prospect profile JSON read/write and the combined run file (`profile`)
//! - priority list CSV export (`export`)

pub mod export;
pub mod profile;

pub use export::*;
pub use profile::*;
