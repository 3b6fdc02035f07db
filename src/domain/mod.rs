//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the feature catalog (`FeatureId`, `Feature`)
//! - raw and mapped per-feature values (`Rating`, `RatingSet`, `MappedInputs`)
//! - classifier output interpretation (`Verdict`)

pub mod types;

pub use types::*;
