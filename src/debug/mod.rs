//! Debug bundle writer for inspecting a submission after the fact.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::data::PredictionResult;
use crate::error::AppError;
use crate::form::Submission;
use crate::report::{describe_outcome, format_payload_json};

/// Everything needed to reproduce one request by hand.
#[derive(Debug, Clone)]
pub struct SubmissionRecord {
    pub submission: Submission,
    pub endpoint: String,
    pub result: Option<PredictionResult>,
}

/// Write a Markdown bundle for `record` under `./debug`.
pub fn write_debug_bundle(record: &SubmissionRecord) -> Result<PathBuf, AppError> {
    write_debug_bundle_in(Path::new("debug"), record)
}

pub fn write_debug_bundle_in(dir: &Path, record: &SubmissionRecord) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::runtime(format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("rater_debug_seq{}_{ts}.md", record.submission.seq));

    let mut file = File::create(&path)
        .map_err(|e| AppError::runtime(format!("Failed to create debug file: {e}")))?;
    file.write_all(render_bundle(record)?.as_bytes())
        .map_err(|e| AppError::runtime(format!("Failed to write debug file: {e}")))?;

    Ok(path)
}

fn render_bundle(record: &SubmissionRecord) -> Result<String, AppError> {
    let submission = &record.submission;
    let mut out = String::new();

    out.push_str("# rater debug bundle\n");
    out.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    out.push_str(&format!("- endpoint: {}\n", record.endpoint));
    out.push_str(&format!("- seq: {}\n", submission.seq));
    let outcome = match &record.result {
        Some(result) => describe_outcome(result),
        None => "pending".to_string(),
    };
    out.push_str(&format!("- outcome: {outcome}\n"));

    out.push_str("\n## Ratings\n");
    out.push_str("| feature | rating | categories | mapped |\n");
    out.push_str("| - | - | - | - |\n");
    for (id, rating) in submission.ratings.iter() {
        out.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            id.name(),
            rating.value(),
            id.num_categories(),
            submission.inputs.get(id)
        ));
    }

    out.push_str("\n## Payload\n```json\n");
    out.push_str(&format_payload_json(&submission.inputs)?);
    out.push_str("\n```\n");

    Ok(out)
}
