//! Rating-to-category rescaling.
//!
//! Kept as a small, pure function so the form, the CLI and the tests all share
//! exactly the mapping the classifier was trained on.

pub mod rating;

pub use rating::*;
