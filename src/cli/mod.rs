//! Command-line parsing.
//!
//! Argument parsing and command dispatch stay separate from the form and
//! client code; this module only turns argv into typed options.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Overrides;
use crate::domain::{FeatureId, Rating};

pub mod prompt;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "rater", version, about = "Rate nine traits and ask the classifier for a verdict")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive form (default).
    Tui(TuiArgs),
    /// Submit ratings given as flags and print the verdict.
    Predict(PredictArgs),
    /// Ask each question on stdin, then submit.
    Ask(AskArgs),
    /// List the features, their questions and category counts.
    Features,
}

/// Endpoint and logging options shared by every command that talks to the classifier.
#[derive(Debug, Args, Clone, Default)]
pub struct ConnectionArgs {
    /// Prediction endpoint URL (overrides RATER_ENDPOINT).
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Append logs to this file (overrides RATER_LOG_FILE).
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl ConnectionArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            endpoint: self.endpoint.clone(),
            log_file: self.log_file.clone(),
        }
    }
}

#[derive(Debug, Parser, Clone, Default)]
pub struct TuiArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Debug, Parser, Clone, Default)]
pub struct PredictArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Rating for one feature, by name or slug (repeatable), e.g. -s "Gullible=8".
    #[arg(short = 's', long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set: Vec<RatingAssignment>,

    /// Start every feature at this rating instead of 5.
    #[arg(long, value_name = "1-10", value_parser = clap::value_parser!(u8).range(1..=10))]
    pub all: Option<u8>,

    /// Print the payload without sending it.
    #[arg(long)]
    pub dry_run: bool,

    /// Print machine-readable JSON instead of text.
    #[arg(long)]
    pub json: bool,

    /// Write a debug bundle for the submission under ./debug.
    #[arg(long)]
    pub debug: bool,
}

#[derive(Debug, Parser, Clone, Default)]
pub struct AskArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Print the payload without sending it.
    #[arg(long)]
    pub dry_run: bool,

    /// Write a debug bundle for the submission under ./debug.
    #[arg(long)]
    pub debug: bool,
}

/// One `NAME=VALUE` rating from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingAssignment {
    pub feature: FeatureId,
    pub rating: Rating,
}

/// Parse `NAME=VALUE`, where NAME is a feature label or slug.
pub fn parse_assignment(raw: &str) -> Result<RatingAssignment, String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;

    let feature = FeatureId::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = FeatureId::ALL.iter().map(|id| id.slug()).collect();
        format!("unknown feature '{}'; expected one of: {}", name.trim(), known.join(", "))
    })?;

    let rating = value
        .trim()
        .parse::<u8>()
        .ok()
        .and_then(Rating::new)
        .ok_or_else(|| format!("rating for '{feature}' must be a whole number from 1 to 10, got '{}'", value.trim()))?;

    Ok(RatingAssignment { feature, rating })
}
