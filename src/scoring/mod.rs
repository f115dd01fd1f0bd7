//! Derived prospect metrics.
//!
//! Both scorers consume normalized records only and are independent of each other.

pub mod alignment;
pub mod capacity;

pub use alignment::assess_alignment;
pub use capacity::score_capacity;
