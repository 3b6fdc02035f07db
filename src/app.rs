//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves settings and installs logging
//! - runs the TUI or one of the line-mode commands

use std::io;

use clap::Parser;
use serde_json::json;

use crate::cli::{AskArgs, Command, ConnectionArgs, PredictArgs, TuiArgs};
use crate::config::Settings;
use crate::data::{PredictionClient, PredictionResult};
use crate::debug::{SubmissionRecord, write_debug_bundle};
use crate::domain::Rating;
use crate::error::AppError;
use crate::form::FormController;
use crate::logging::{self, LogSink};
use crate::report;

pub mod pipeline;

/// Entry point for the `rater` binary.
pub fn run() -> Result<(), AppError> {
    // `rater` and `rater --endpoint URL` behave like `rater tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Tui(args) => handle_tui(args),
        Command::Predict(args) => handle_predict(args),
        Command::Ask(args) => handle_ask(args),
        Command::Features => {
            print!("{}", report::format_catalog());
            Ok(())
        }
    }
}

fn setup(connection: &ConnectionArgs, sink: LogSink) -> Result<(Settings, PredictionClient), AppError> {
    let settings = Settings::load(&connection.overrides())?;
    logging::init(&settings, sink)?;
    let client = PredictionClient::new(settings.endpoint.clone())?;
    Ok((settings, client))
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    let (_settings, client) = setup(&args.connection, LogSink::FileOnly)?;
    crate::tui::run(client)
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let (settings, client) = setup(&args.connection, LogSink::Stderr)?;
    let base = args.all.and_then(Rating::new);
    let mut form = pipeline::form_from_assignments(base, &args.set);

    let run = pipeline::run_prediction(&mut form, &client, args.dry_run)?;

    if args.json {
        println!("{}", render_json(&run)?);
    } else {
        print_run(&run)?;
    }

    if args.debug {
        write_bundle(&settings, &run)?;
    }
    Ok(())
}

fn handle_ask(args: AskArgs) -> Result<(), AppError> {
    let (settings, client) = setup(&args.connection, LogSink::Stderr)?;
    let mut form = FormController::new();

    println!("=== {} ===", report::TITLE);
    println!("{}", report::INTRO);
    let stdin = io::stdin();
    crate::cli::prompt::prompt_for_ratings(&mut form, &mut stdin.lock(), &mut io::stdout())?;
    println!();

    let run = pipeline::run_prediction(&mut form, &client, args.dry_run)?;
    print_run(&run)?;

    if args.debug {
        write_bundle(&settings, &run)?;
    }
    Ok(())
}

fn print_run(run: &pipeline::RunOutput) -> Result<(), AppError> {
    let submission = &run.submission;
    print!("{}", report::format_ratings(&submission.ratings, &submission.inputs));

    let Some(result) = &run.result else {
        println!("\nPayload (not sent):");
        println!("{}", report::format_payload_json(&submission.inputs)?);
        return Ok(());
    };

    match report::format_result(Some(result)) {
        Some(line) => println!("\n{line}"),
        None => eprintln!("\n{}", report::describe_outcome(result)),
    }
    Ok(())
}

fn render_json(run: &pipeline::RunOutput) -> Result<String, AppError> {
    let (prediction, error) = match &run.result {
        Some(PredictionResult::Predicted(code)) => (Some(code.0), None),
        Some(PredictionResult::NoPrediction(err)) => (None, Some(err.to_string())),
        None => (None, None),
    };
    let doc = json!({
        "inputs": run.submission.inputs,
        "sent": run.result.is_some(),
        "prediction": prediction,
        "error": error,
    });
    serde_json::to_string_pretty(&doc).map_err(|e| AppError::runtime(format!("Failed to encode output: {e}")))
}

fn write_bundle(settings: &Settings, run: &pipeline::RunOutput) -> Result<(), AppError> {
    let record = SubmissionRecord {
        submission: run.submission,
        endpoint: settings.endpoint.clone(),
        result: run.result.clone(),
    };
    let path = write_debug_bundle(&record)?;
    eprintln!("Wrote debug bundle: {}", path.display());
    Ok(())
}

/// Rewrite argv so `rater` defaults to `rater tui`.
///
/// Rules:
/// - `rater`                         -> `rater tui`
/// - `rater --endpoint URL ...`      -> `rater tui --endpoint URL ...`
/// - `rater --help/--version/-h`     -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "tui" | "predict" | "ask" | "features");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
