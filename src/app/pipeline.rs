//! Shared "ratings -> payload -> prediction" flow for the line-mode commands.
//!
//! The TUI drives the same `FormController` through `SubmissionWorker`; the
//! `predict` and `ask` commands run it inline through here.

use tracing::info;

use crate::cli::RatingAssignment;
use crate::data::{PredictionResult, Predictor};
use crate::domain::{Rating, RatingSet};
use crate::error::AppError;
use crate::form::{FormController, Submission};

/// Outputs of one line-mode run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub submission: Submission,
    /// `None` for a dry run.
    pub result: Option<PredictionResult>,
}

/// Build a form from an optional uniform base rating plus per-feature overrides.
///
/// Later assignments for the same feature win.
pub fn form_from_assignments(base: Option<Rating>, assignments: &[RatingAssignment]) -> FormController {
    let mut form = FormController::with_ratings(RatingSet::uniform(base.unwrap_or_default()));
    for a in assignments {
        form.set_rating(a.feature, Some(a.rating.value()));
    }
    form
}

/// Submit the form once, or only snapshot it when `dry_run` is set.
pub fn run_prediction<P: Predictor + ?Sized>(
    form: &mut FormController,
    predictor: &P,
    dry_run: bool,
) -> Result<RunOutput, AppError> {
    if dry_run {
        let submission = Submission {
            seq: 0,
            ratings: *form.ratings(),
            inputs: form.mapped_inputs(),
        };
        return Ok(RunOutput {
            submission,
            result: None,
        });
    }

    let result = form
        .submit(predictor)
        .cloned()
        .ok_or_else(|| AppError::runtime("A submission is already in progress."))?;
    let submission = *form
        .last_submission()
        .ok_or_else(|| AppError::runtime("Submission finished without a snapshot."))?;

    info!(seq = submission.seq, "submission finished");
    Ok(RunOutput {
        submission,
        result: Some(result),
    })
}
