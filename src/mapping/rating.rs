//! Bucket a 1–10 rating into `n` equal-width categories.
//!
//! The ten slider positions span nine unit intervals (`[0, 9]` after shifting
//! down by one), and that span is what gets divided into buckets:
//!
//! - `step  = 9 / n`
//! - `index = floor((rating - 1) / step)`, clamped to `[0, n - 1]`
//!
//! The classifier was trained on payloads produced by exactly this formula, so
//! the 9-unit span must not be "fixed" to 10.

/// Width of the rating scale after shifting it to start at zero.
pub const RATING_SPAN: f64 = 9.0;

/// Map a raw rating in `[1, 10]` to a category index in `[0, num_categories - 1]`.
///
/// Total over its domain: `num_categories == 0` yields `0`, and the clamp
/// absorbs floating-point overshoot at `rating == 10`. Non-finite input also
/// lands on `0`.
pub fn map_rating(rating: f64, num_categories: u32) -> u32 {
    if num_categories < 1 {
        return 0;
    }

    let step = RATING_SPAN / f64::from(num_categories);
    let adjusted = rating - 1.0;
    let index = (adjusted / step).floor();

    let upper = f64::from(num_categories - 1);
    // `max` first so NaN collapses to 0.
    index.max(0.0).min(upper) as u32
}
