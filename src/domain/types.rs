//! Shared domain types.
//!
//! The feature catalog is a closed set known at compile time, so ratings and
//! mapped categories are stored in fixed arrays indexed by [`FeatureId`]
//! rather than in string-keyed maps.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::mapping::map_rating;

/// Lowest value a rating slider can take.
pub const RATING_MIN: u8 = 1;
/// Highest value a rating slider can take.
pub const RATING_MAX: u8 = 10;
/// Midpoint every rating starts at.
pub const RATING_DEFAULT: u8 = 5;

/// The nine traits the classifier was trained on.
///
/// Variant order is display order and payload order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FeatureId {
    IntelligenceLevel,
    ArgumentType,
    OverconfidentAboutUnknowns,
    SocialBehavior,
    ResponseToBeingProvenWrong,
    FallsForObviousScams,
    UsesStupidWordsOften,
    Gullible,
    DecisionsBasedOnWhatsappUniversity,
}

impl FeatureId {
    pub const COUNT: usize = 9;

    pub const ALL: [FeatureId; FeatureId::COUNT] = [
        FeatureId::IntelligenceLevel,
        FeatureId::ArgumentType,
        FeatureId::OverconfidentAboutUnknowns,
        FeatureId::SocialBehavior,
        FeatureId::ResponseToBeingProvenWrong,
        FeatureId::FallsForObviousScams,
        FeatureId::UsesStupidWordsOften,
        FeatureId::Gullible,
        FeatureId::DecisionsBasedOnWhatsappUniversity,
    ];

    /// Position in the catalog (and in every per-feature array).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Payload key and display label. Must match the classifier's training columns.
    pub fn name(self) -> &'static str {
        match self {
            FeatureId::IntelligenceLevel => "Intelligence Level",
            FeatureId::ArgumentType => "Argument Type",
            FeatureId::OverconfidentAboutUnknowns => "Overconfident About Unknowns",
            FeatureId::SocialBehavior => "Social Behavior",
            FeatureId::ResponseToBeingProvenWrong => "Response to Being Proven Wrong",
            FeatureId::FallsForObviousScams => "Falls for Obvious Scams",
            FeatureId::UsesStupidWordsOften => "Uses Stupid Words Often",
            FeatureId::Gullible => "Gullible",
            FeatureId::DecisionsBasedOnWhatsappUniversity => "Decisions Based on WhatsApp University",
        }
    }

    /// Kebab-case alias accepted on the command line.
    pub fn slug(self) -> &'static str {
        match self {
            FeatureId::IntelligenceLevel => "intelligence-level",
            FeatureId::ArgumentType => "argument-type",
            FeatureId::OverconfidentAboutUnknowns => "overconfident-about-unknowns",
            FeatureId::SocialBehavior => "social-behavior",
            FeatureId::ResponseToBeingProvenWrong => "response-to-being-proven-wrong",
            FeatureId::FallsForObviousScams => "falls-for-obvious-scams",
            FeatureId::UsesStupidWordsOften => "uses-stupid-words-often",
            FeatureId::Gullible => "gullible",
            FeatureId::DecisionsBasedOnWhatsappUniversity => "decisions-based-on-whatsapp-university",
        }
    }

    pub fn question(self) -> &'static str {
        match self {
            FeatureId::IntelligenceLevel => {
                "How unintelligent is this person? (1=Very intelligent, 10=Very unintelligent)"
            }
            FeatureId::ArgumentType => {
                "How illogical are their arguments? (1=Very logical, 10=Very illogical)"
            }
            FeatureId::OverconfidentAboutUnknowns => {
                "How overconfident are they about things they don't know? (1=Not overconfident, 10=Very overconfident)"
            }
            FeatureId::SocialBehavior => {
                "How inappropriate is their social behavior? (1=Very appropriate, 10=Very inappropriate)"
            }
            FeatureId::ResponseToBeingProvenWrong => {
                "How poorly do they respond when proven wrong? (1=Accepts and learns, 10=Starts personal attacks)"
            }
            FeatureId::FallsForObviousScams => {
                "How likely are they to fall for obvious scams? (1=Not likely, 10=Very likely)"
            }
            FeatureId::UsesStupidWordsOften => {
                "How often do they use stupid words? (1=Rarely, 10=Frequently)"
            }
            FeatureId::Gullible => "How gullible are they? (1=Not gullible, 10=Very gullible)",
            FeatureId::DecisionsBasedOnWhatsappUniversity => {
                "How much do they base their decisions on unverified information? (1=Not at all, 10=Completely)"
            }
        }
    }

    /// Number of categories the classifier expects for this feature.
    pub fn num_categories(self) -> u32 {
        match self {
            FeatureId::IntelligenceLevel
            | FeatureId::ArgumentType
            | FeatureId::SocialBehavior
            | FeatureId::ResponseToBeingProvenWrong => 4,
            FeatureId::OverconfidentAboutUnknowns | FeatureId::FallsForObviousScams => 3,
            FeatureId::UsesStupidWordsOften
            | FeatureId::Gullible
            | FeatureId::DecisionsBasedOnWhatsappUniversity => 2,
        }
    }

    pub fn feature(self) -> Feature {
        Feature {
            id: self,
            name: self.name(),
            question: self.question(),
            num_categories: self.num_categories(),
        }
    }

    /// Resolve a feature from its display name or slug (case-insensitive).
    pub fn from_name(raw: &str) -> Option<Self> {
        let wanted = raw.trim();
        FeatureId::ALL.into_iter().find(|id| {
            id.name().eq_ignore_ascii_case(wanted) || id.slug().eq_ignore_ascii_case(wanted)
        })
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    pub id: FeatureId,
    pub name: &'static str,
    pub question: &'static str,
    pub num_categories: u32,
}

/// The full catalog in display order.
pub fn catalog() -> [Feature; FeatureId::COUNT] {
    FeatureId::ALL.map(FeatureId::feature)
}

/// A raw slider value, always within `RATING_MIN..=RATING_MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rating(u8);

impl Rating {
    pub const DEFAULT: Rating = Rating(RATING_DEFAULT);

    pub fn new(value: u8) -> Option<Self> {
        (RATING_MIN..=RATING_MAX).contains(&value).then_some(Self(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Move by `delta` steps, saturating at the slider ends.
    pub fn step(self, delta: i32) -> Self {
        let next = (i32::from(self.0) + delta).clamp(i32::from(RATING_MIN), i32::from(RATING_MAX));
        Self(next as u8)
    }

    /// Category index for a feature with `num_categories` buckets.
    pub fn category(self, num_categories: u32) -> u32 {
        map_rating(f64::from(self.0), num_categories)
    }
}

impl Default for Rating {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Current raw rating for every feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RatingSet {
    values: [Rating; FeatureId::COUNT],
}

impl RatingSet {
    /// Every feature at `value`.
    pub fn uniform(value: Rating) -> Self {
        Self {
            values: [value; FeatureId::COUNT],
        }
    }

    pub fn get(&self, id: FeatureId) -> Rating {
        self.values[id.index()]
    }

    pub fn set(&mut self, id: FeatureId, value: Rating) {
        self.values[id.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, Rating)> + '_ {
        FeatureId::ALL.into_iter().map(|id| (id, self.get(id)))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Category index per feature, as sent to the classifier.
///
/// Serializes to a JSON object keyed by feature name, in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappedInputs {
    values: [u32; FeatureId::COUNT],
}

impl MappedInputs {
    pub fn from_ratings(ratings: &RatingSet) -> Self {
        Self {
            values: FeatureId::ALL.map(|id| ratings.get(id).category(id.num_categories())),
        }
    }

    pub fn get(&self, id: FeatureId) -> u32 {
        self.values[id.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (FeatureId, u32)> + '_ {
        FeatureId::ALL.into_iter().map(|id| (id, self.get(id)))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for MappedInputs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (id, category) in self.iter() {
            map.serialize_entry(id.name(), &category)?;
        }
        map.end()
    }
}

/// How a classification code is interpreted for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Code `1`.
    Positive,
    /// Code `0`.
    Negative,
    /// Anything else the endpoint sends back.
    Unrecognized(f64),
}

impl Verdict {
    pub fn from_code(code: f64) -> Self {
        if code == 1.0 {
            Verdict::Positive
        } else if code == 0.0 {
            Verdict::Negative
        } else {
            Verdict::Unrecognized(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_matches_wire_contract() {
        let expected = [
            ("Intelligence Level", 4),
            ("Argument Type", 4),
            ("Overconfident About Unknowns", 3),
            ("Social Behavior", 4),
            ("Response to Being Proven Wrong", 4),
            ("Falls for Obvious Scams", 3),
            ("Uses Stupid Words Often", 2),
            ("Gullible", 2),
            ("Decisions Based on WhatsApp University", 2),
        ];
        let catalog = catalog();
        assert_eq!(catalog.len(), expected.len());
        for (feature, (name, n)) in catalog.iter().zip(expected) {
            assert_eq!(feature.name, name);
            assert_eq!(feature.num_categories, n);
        }
    }

    #[test]
    fn feature_index_follows_display_order() {
        for (i, id) in FeatureId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn from_name_accepts_label_and_slug() {
        assert_eq!(FeatureId::from_name("gullible"), Some(FeatureId::Gullible));
        assert_eq!(
            FeatureId::from_name("Decisions Based on WhatsApp University"),
            Some(FeatureId::DecisionsBasedOnWhatsappUniversity)
        );
        assert_eq!(
            FeatureId::from_name(" falls-for-obvious-scams "),
            Some(FeatureId::FallsForObviousScams)
        );
        assert_eq!(FeatureId::from_name("Height"), None);
    }

    #[test]
    fn rating_rejects_out_of_range() {
        assert!(Rating::new(0).is_none());
        assert!(Rating::new(11).is_none());
        assert_eq!(Rating::new(1).map(Rating::value), Some(1));
        assert_eq!(Rating::new(10).map(Rating::value), Some(10));
    }

    #[test]
    fn rating_step_saturates() {
        let top = Rating::new(10).unwrap();
        let bottom = Rating::new(1).unwrap();
        assert_eq!(top.step(1), top);
        assert_eq!(bottom.step(-3), bottom);
        assert_eq!(Rating::DEFAULT.step(2).value(), 7);
    }

    #[test]
    fn default_ratings_map_to_expected_payload() {
        let mapped = MappedInputs::from_ratings(&RatingSet::default());
        assert_eq!(mapped.len(), FeatureId::COUNT);
        assert_eq!(mapped.get(FeatureId::IntelligenceLevel), 1);
        assert_eq!(mapped.get(FeatureId::UsesStupidWordsOften), 0);
        for (id, category) in mapped.iter() {
            assert!(category < id.num_categories(), "{id} out of range: {category}");
        }
    }

    #[test]
    fn mapped_inputs_serialize_as_name_keyed_object() {
        let mapped = MappedInputs::from_ratings(&RatingSet::default());
        let value = serde_json::to_value(mapped).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), FeatureId::COUNT);
        for id in FeatureId::ALL {
            assert!(object.contains_key(id.name()), "missing key {id}");
        }
        assert_eq!(object["Intelligence Level"], 1);
        assert_eq!(object["Uses Stupid Words Often"], 0);
    }

    #[test]
    fn verdict_from_known_codes() {
        assert_eq!(Verdict::from_code(1.0), Verdict::Positive);
        assert_eq!(Verdict::from_code(0.0), Verdict::Negative);
    }

    // Codes other than 0/1 have no agreed meaning. This only pins that they
    // are kept apart from the known codes, not how they should be shown.
    #[test]
    fn verdict_keeps_unknown_codes_distinct() {
        assert_eq!(Verdict::from_code(2.0), Verdict::Unrecognized(2.0));
        assert_eq!(Verdict::from_code(-1.0), Verdict::Unrecognized(-1.0));
    }
}
