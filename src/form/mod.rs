//! Form state and the submission guard.
//!
//! The controller owns the current ratings, the last prediction, and the
//! in-flight flag. Only one prediction request may be outstanding at a time;
//! rating edits stay open while it runs and only affect the next submission.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::data::{PredictError, PredictionResult, Predictor};
use crate::domain::{FeatureId, MappedInputs, Rating, RatingSet};

pub mod worker;

pub use worker::SubmissionWorker;

/// Snapshot taken when a submission starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub seq: u64,
    pub ratings: RatingSet,
    pub inputs: MappedInputs,
}

#[derive(Debug, Clone, Default)]
pub struct FormController {
    ratings: RatingSet,
    in_flight: Option<u64>,
    next_seq: u64,
    last_submission: Option<Submission>,
    prediction: Option<PredictionResult>,
}

impl FormController {
    /// Every feature at the default rating, nothing submitted yet.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ratings(ratings: RatingSet) -> Self {
        Self {
            ratings,
            ..Self::default()
        }
    }

    pub fn ratings(&self) -> &RatingSet {
        &self.ratings
    }

    pub fn rating(&self, id: FeatureId) -> Rating {
        self.ratings.get(id)
    }

    /// Replace one feature's rating.
    ///
    /// A missing or out-of-range value changes nothing. Returns whether the
    /// stored value changed.
    pub fn set_rating(&mut self, id: FeatureId, value: Option<u8>) -> bool {
        let Some(rating) = value.and_then(Rating::new) else {
            return false;
        };
        if self.ratings.get(id) == rating {
            return false;
        }
        self.ratings.set(id, rating);
        true
    }

    /// Nudge one feature's rating by `delta` slider steps.
    pub fn adjust_rating(&mut self, id: FeatureId, delta: i32) -> bool {
        let next = self.ratings.get(id).step(delta);
        self.set_rating(id, Some(next.value()))
    }

    pub fn reset(&mut self) {
        self.ratings = RatingSet::default();
    }

    /// Payload the current ratings would produce.
    pub fn mapped_inputs(&self) -> MappedInputs {
        MappedInputs::from_ratings(&self.ratings)
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Snapshot sent by the most recent submission, if any.
    pub fn last_submission(&self) -> Option<&Submission> {
        self.last_submission.as_ref()
    }

    /// Result of the most recent completed submission, if any.
    pub fn prediction(&self) -> Option<&PredictionResult> {
        self.prediction.as_ref()
    }

    /// Take the in-flight slot and snapshot the payload.
    ///
    /// Returns `None` while another submission is outstanding.
    pub fn begin_submit(&mut self) -> Option<Submission> {
        if let Some(seq) = self.in_flight {
            debug!(seq, "submission already in flight; ignoring");
            return None;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight = Some(seq);

        let submission = Submission {
            seq,
            ratings: self.ratings,
            inputs: self.mapped_inputs(),
        };
        self.last_submission = Some(submission);
        Some(submission)
    }

    /// Record the outcome of the outstanding submission and release the slot.
    pub fn finish_submit(&mut self, result: PredictionResult) {
        if self.in_flight.take().is_none() {
            warn!("submission result arrived with nothing in flight");
        }
        self.prediction = Some(result);
    }

    /// Run a full submission against `predictor` on the current thread.
    ///
    /// Returns `None` if a submission is already outstanding. The in-flight
    /// slot is released on every path; a panicking predictor is recorded as
    /// `NoPrediction`.
    pub fn submit<P: Predictor + ?Sized>(&mut self, predictor: &P) -> Option<&PredictionResult> {
        let submission = self.begin_submit()?;

        let result = panic::catch_unwind(AssertUnwindSafe(|| predictor.predict(&submission.inputs)))
            .unwrap_or_else(|_| {
                PredictionResult::NoPrediction(PredictError::Aborted("predictor panicked".to_string()))
            });

        self.finish_submit(result);
        self.prediction.as_ref()
    }
}
