//! Runs the outstanding submission off the UI loop.
//!
//! The prediction client is blocking, so each submission gets a short-lived
//! thread and reports back over a channel. The UI loop calls [`poll`] on every
//! tick; the form's in-flight flag is released exactly when the result (or the
//! news that the thread died without one) is picked up.
//!
//! [`poll`]: SubmissionWorker::poll

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use tracing::{debug, warn};

use crate::data::{PredictError, PredictionResult, Predictor};
use crate::form::{FormController, Submission};

struct Pending {
    seq: u64,
    rx: Receiver<PredictionResult>,
}

pub struct SubmissionWorker {
    predictor: Arc<dyn Predictor + Send + Sync>,
    pending: Option<Pending>,
}

impl SubmissionWorker {
    pub fn new(predictor: Arc<dyn Predictor + Send + Sync>) -> Self {
        Self {
            predictor,
            pending: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Start a submission if none is outstanding.
    ///
    /// Returns the snapshot that was sent, or `None` if the form refused
    /// (already in flight) or the thread could not be started. In the latter
    /// case the form already holds a `NoPrediction`.
    pub fn dispatch(&mut self, form: &mut FormController) -> Option<Submission> {
        if self.pending.is_some() {
            return None;
        }
        let submission = form.begin_submit()?;

        let (tx, rx) = mpsc::channel();
        let predictor = Arc::clone(&self.predictor);
        let inputs = submission.inputs;
        let spawned = thread::Builder::new()
            .name(format!("rater-submit-{}", submission.seq))
            .spawn(move || {
                let result = predictor.predict(&inputs);
                // Receiver gone means the UI already quit.
                let _ = tx.send(result);
            });

        match spawned {
            Ok(_) => {
                debug!(seq = submission.seq, "submission dispatched");
                self.pending = Some(Pending {
                    seq: submission.seq,
                    rx,
                });
                Some(submission)
            }
            Err(e) => {
                warn!(error = %e, "failed to start submission thread");
                form.finish_submit(PredictionResult::NoPrediction(PredictError::Aborted(format!(
                    "failed to start request thread: {e}"
                ))));
                None
            }
        }
    }

    /// Pick up a finished submission, if there is one.
    ///
    /// Returns `true` when the form received a result on this call.
    pub fn poll(&mut self, form: &mut FormController) -> bool {
        let Some(pending) = &self.pending else {
            return false;
        };

        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => {
                warn!(seq = pending.seq, "submission thread exited without a result");
                PredictionResult::NoPrediction(PredictError::Aborted(
                    "request thread exited without a result".to_string(),
                ))
            }
        };

        debug!(seq = pending.seq, "submission completed");
        self.pending = None;
        form.finish_submit(result);
        true
    }
}
