//! Fixed copy plus catalog/payload/result formatting.

use crate::data::PredictionResult;
use crate::domain::{FeatureId, MappedInputs, RATING_MAX, RATING_MIN, RatingSet, Verdict, catalog};
use crate::error::AppError;

pub const TITLE: &str = "Trait Classifier";
pub const INTRO: &str = "Please rate the following traits of the person on a scale of 1 to 10.";
pub const SUBMIT_LABEL: &str = "Predict";
pub const SUBMITTING_LABEL: &str = "Predicting...";

/// Shown for code `1`.
pub const POSITIVE_LABEL: &str = "Yes, this one is a certified fool.";
/// Shown for code `0`.
pub const NEGATIVE_LABEL: &str = "No, not a fool. Seems like a decent person.";

/// Verdict copy, or `None` when there is nothing agreed to show.
///
/// Unrecognized codes render nothing, the same as a missing prediction.
pub fn verdict_label(verdict: Verdict) -> Option<&'static str> {
    match verdict {
        Verdict::Positive => Some(POSITIVE_LABEL),
        Verdict::Negative => Some(NEGATIVE_LABEL),
        Verdict::Unrecognized(_) => None,
    }
}

/// The result-area line, or `None` when the area stays empty.
pub fn format_result(result: Option<&PredictionResult>) -> Option<String> {
    let label = verdict_label(result?.verdict()?)?;
    Some(format!("Prediction: {label}"))
}

/// Short diagnostic for status bars and logs.
pub fn describe_outcome(result: &PredictionResult) -> String {
    match result {
        PredictionResult::Predicted(code) => match code.verdict() {
            Verdict::Unrecognized(raw) => format!("unrecognized prediction code {raw}"),
            _ => format!("prediction code {}", code.0),
        },
        PredictionResult::NoPrediction(err) => format!("no prediction: {err}"),
    }
}

/// Catalog listing for `rater features`.
pub fn format_catalog() -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {TITLE}: features ===\n"));
    for (idx, feature) in catalog().iter().enumerate() {
        out.push_str(&format!(
            "{:>2}) {} [{}], {} categories\n    {}\n",
            idx + 1,
            feature.name,
            feature.id.slug(),
            feature.num_categories,
            feature.question
        ));
    }
    out.push_str(&format!("Ratings range {RATING_MIN}..={RATING_MAX}, default 5.\n"));
    out
}

/// Rating and mapped category per feature.
pub fn format_ratings(ratings: &RatingSet, inputs: &MappedInputs) -> String {
    let width = FeatureId::ALL
        .iter()
        .map(|id| id.name().len())
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    out.push_str(&format!("{:<width$}  rating  category\n", "feature"));
    for (id, rating) in ratings.iter() {
        out.push_str(&format!(
            "{:<width$}  {:>6}  {:>4}/{}\n",
            id.name(),
            rating.value(),
            inputs.get(id),
            id.num_categories()
        ));
    }
    out
}

/// Request body exactly as it goes over the wire, pretty-printed.
pub fn format_payload_json(inputs: &MappedInputs) -> Result<String, AppError> {
    serde_json::to_string_pretty(inputs)
        .map_err(|e| AppError::runtime(format!("Failed to encode payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PredictError, PredictionCode};

    #[test]
    fn result_line_for_known_codes() {
        let yes = PredictionResult::Predicted(PredictionCode(1.0));
        let no = PredictionResult::Predicted(PredictionCode(0.0));
        assert_eq!(format_result(Some(&yes)).as_deref(), Some("Prediction: Yes, this one is a certified fool."));
        assert_eq!(
            format_result(Some(&no)).as_deref(),
            Some("Prediction: No, not a fool. Seems like a decent person.")
        );
    }

    #[test]
    fn result_area_empty_without_prediction() {
        assert_eq!(format_result(None), None);
        let failed = PredictionResult::NoPrediction(PredictError::Status(502));
        assert_eq!(format_result(Some(&failed)), None);
        assert_eq!(describe_outcome(&failed), "no prediction: endpoint answered with status 502");
    }

    #[test]
    fn catalog_lists_every_feature() {
        let text = format_catalog();
        for id in FeatureId::ALL {
            assert!(text.contains(id.name()), "missing {id}");
            assert!(text.contains(id.question()), "missing question for {id}");
        }
    }

    #[test]
    fn ratings_table_shows_categories() {
        let ratings = RatingSet::default();
        let inputs = MappedInputs::from_ratings(&ratings);
        let text = format_ratings(&ratings, &inputs);
        assert_eq!(text.lines().count(), FeatureId::COUNT + 1);
        assert!(text.lines().nth(1).unwrap().starts_with("Intelligence Level"));
        assert!(text.lines().nth(1).unwrap().ends_with("1/4"));
    }

    #[test]
    fn payload_json_is_name_keyed() {
        let inputs = MappedInputs::from_ratings(&RatingSet::default());
        let json = format_payload_json(&inputs).unwrap();
        assert!(json.contains("\"Gullible\": 0"), "{json}");
        assert!(json.contains("\"Argument Type\": 1"), "{json}");
    }
}
