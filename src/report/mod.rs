//! Display text and terminal formatting.
//!
//! Everything user-facing lives here so the form and client code stay free of
//! copy, and so the TUI and the line-mode commands render identically.

pub mod format;

pub use format::*;
