//! `trait-rater` library crate.
//!
//! The binary (`rater`) is a thin wrapper around this library so that:
//!
//! - the rating mapper, form state and client are testable without a terminal
//! - the TUI and the line-mode commands share one submission path

pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod form;
pub mod logging;
pub mod mapping;
pub mod report;
pub mod tui;
