//! Line-by-line questionnaire for `rater ask`.
//!
//! This is the no-TUI way to fill the form: each question is printed, the
//! answer is read from stdin, and an empty answer keeps the current rating.
//! `q` cancels.

use std::io::{BufRead, Write};

use crate::domain::{FeatureId, RATING_MAX, RATING_MIN, Rating};
use crate::error::AppError;
use crate::form::FormController;

/// Ask every question in catalog order, writing answers into `form`.
pub fn prompt_for_ratings<R: BufRead, W: Write>(
    form: &mut FormController,
    input: &mut R,
    output: &mut W,
) -> Result<(), AppError> {
    let total = FeatureId::COUNT;
    for (idx, id) in FeatureId::ALL.into_iter().enumerate() {
        loop {
            write!(
                output,
                "({}/{total}) {}\n  rating [{}]: ",
                idx + 1,
                id.question(),
                form.rating(id)
            )
            .and_then(|_| output.flush())
            .map_err(|e| AppError::runtime(format!("Failed to write prompt: {e}")))?;

            let mut line = String::new();
            let bytes = input
                .read_line(&mut line)
                .map_err(|e| AppError::runtime(format!("Failed to read input: {e}")))?;

            if bytes == 0 {
                return Err(AppError::usage(
                    "No input received. Provide ratings with `rater predict -s NAME=VALUE`.",
                ));
            }

            let answer = line.trim();
            if answer.eq_ignore_ascii_case("q") {
                return Err(AppError::usage("Canceled."));
            }
            if answer.is_empty() {
                break;
            }

            match answer.parse::<u8>().ok().and_then(Rating::new) {
                Some(rating) => {
                    form.set_rating(id, Some(rating.value()));
                    break;
                }
                None => {
                    writeln!(
                        output,
                        "  Enter a whole number from {RATING_MIN} to {RATING_MAX}, press Enter to keep it, or q to quit."
                    )
                    .map_err(|e| AppError::runtime(format!("Failed to write prompt: {e}")))?;
                }
            }
        }
    }
    Ok(())
}
