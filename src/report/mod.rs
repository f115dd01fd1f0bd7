//! Reporting utilities: priority ranking and formatted terminal output.

pub mod format;
pub mod rank;

pub use format::*;
pub use rank::*;
