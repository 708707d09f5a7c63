//! # Submission Validation
//!
//! Validation walks an untyped JSON payload field by field and records every failure
//! instead of stopping at the first one, so a client can fix a payload in one round
//! trip. Each accessor on [`Fields`] returns `Some` exactly when it recorded no error
//! for its field.
//!
//! ```rust
//! use survey_backend::{FieldErrorKind, Fields, SCREENER_SCALE};
//! use serde_json::json;
//!
//! let payload = json!({"q2_participation": 9});
//! let object = payload.as_object().unwrap();
//! let mut fields = Fields::new(object);
//!
//! assert_eq!(fields.ordinal("q2_participation", SCREENER_SCALE), None);
//! assert_eq!(fields.boolean("q1_eligible"), None);
//!
//! let rejection = fields.into_rejection();
//! assert_eq!(rejection.errors()[0].kind, FieldErrorKind::OutOfRange);
//! assert_eq!(rejection.errors()[1].kind, FieldErrorKind::Missing);
//! ```

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::category::RatedCategory;

/// Scale of the screener questions (Q2, Q3).
pub const SCREENER_SCALE: RangeInclusive<i32> = 1..=5;

/// Scale of the willingness rating (Q4) and of every concern and feature rating.
pub const RATING_SCALE: RangeInclusive<i32> = 1..=7;

/// Longest accepted single-choice answer, in characters.
pub const MAX_CHOICE_LEN: usize = 200;

/// Longest accepted open response, in characters.
pub const MAX_OPEN_RESPONSE_LEN: usize = 5000;

////////////////////////////////////////////// Errors //////////////////////////////////////////////

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// A required field or category is absent.
    Missing,
    /// The value has the wrong JSON type.
    WrongType,
    /// A number or length is outside its declared bounds.
    OutOfRange,
    /// A value is not a member of its allowed set.
    InvalidValue,
    /// A category was rated more than once.
    Duplicate,
    /// A category that is not part of the fixed set was supplied.
    Unexpected,
    /// The request body could not be parsed at all.
    Malformed,
}

impl Display for FieldErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let s = match self {
            Self::Missing => "missing",
            Self::WrongType => "wrong type",
            Self::OutOfRange => "out of range",
            Self::InvalidValue => "invalid value",
            Self::Duplicate => "duplicate",
            Self::Unexpected => "unexpected",
            Self::Malformed => "malformed",
        };
        f.write_str(s)
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Path of the failing field, e.g. `q4_willingness` or `concerns.privacy`.
    pub field: String,
    /// Failure class.
    pub kind: FieldErrorKind,
    /// Human-readable explanation.
    pub detail: String,
}

impl FieldError {
    /// Creates a new field error.
    pub fn new(field: impl Into<String>, kind: FieldErrorKind, detail: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            detail: detail.into(),
        }
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} ({}): {}", self.field, self.kind, self.detail)
    }
}

/// Every field-level failure found in one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionRejection {
    errors: Vec<FieldError>,
}

impl SubmissionRejection {
    /// Creates a rejection holding a single error.
    pub fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// The recorded errors, in the order they were found.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Consumes the rejection, returning its errors.
    pub fn into_errors(self) -> Vec<FieldError> {
        self.errors
    }

    /// Returns true if no error was recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns true if some error was recorded for `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }
}

impl Display for SubmissionRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let fields = self
            .errors
            .iter()
            .map(|e| format!("{} ({})", e.field, e.kind))
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "{} field(s) failed validation: {}",
            self.errors.len(),
            fields
        )
    }
}

impl std::error::Error for SubmissionRejection {}

////////////////////////////////////////////// Ordinal /////////////////////////////////////////////

/// An integer known to lie inside the scale it was validated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Ordinal(i32);

impl Ordinal {
    /// Returns the ordinal if `value` lies inside `scale`.
    pub fn new(value: i64, scale: &RangeInclusive<i32>) -> Option<Self> {
        let value = i32::try_from(value).ok()?;
        scale.contains(&value).then_some(Self(value))
    }

    /// The rating value.
    pub fn value(&self) -> i32 {
        self.0
    }
}

////////////////////////////////////////// CategoryRatings /////////////////////////////////////////

/// One rating for every member of a closed category set.
///
/// Values of this type only come out of validation, so they always hold exactly
/// `C::ALL.len()` entries, one per category, in questionnaire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRatings<C> {
    entries: Vec<(C, Ordinal)>,
}

impl<C: RatedCategory> CategoryRatings<C> {
    fn from_complete(mut ratings: HashMap<C, Ordinal>) -> Option<Self> {
        let entries = C::ALL
            .iter()
            .map(|c| ratings.remove(c).map(|r| (*c, r)))
            .collect::<Option<Vec<_>>>()?;
        if ratings.is_empty() {
            Some(Self { entries })
        } else {
            None
        }
    }

    /// The rating given to `category`.
    pub fn get(&self, category: C) -> Option<Ordinal> {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, r)| *r)
    }

    /// Iterates over `(category, rating)` pairs in questionnaire order.
    pub fn iter(&self) -> impl Iterator<Item = (C, Ordinal)> + '_ {
        self.entries.iter().copied()
    }

    /// Number of rated categories; always `C::ALL.len()`.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for validated ratings.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the ratings in the list form the frontend sends.
    pub fn to_payload(&self) -> Value {
        Value::Array(
            self.entries
                .iter()
                .map(|(c, r)| {
                    let mut item = Map::new();
                    item.insert(C::TYPE_FIELD.to_string(), Value::from(c.as_str()));
                    item.insert("rating".to_string(), Value::from(r.value()));
                    Value::Object(item)
                })
                .collect(),
        )
    }
}

/////////////////////////////////////////////// Fields /////////////////////////////////////////////

/// Field-by-field reader over a JSON object that accumulates validation errors.
pub struct Fields<'a> {
    object: &'a Map<String, Value>,
    rejection: SubmissionRejection,
}

impl<'a> Fields<'a> {
    /// Starts reading `object` with no recorded errors.
    pub fn new(object: &'a Map<String, Value>) -> Self {
        Self {
            object,
            rejection: SubmissionRejection::default(),
        }
    }

    /// Consumes the reader, returning whatever was recorded.
    pub fn into_rejection(self) -> SubmissionRejection {
        self.rejection
    }

    /// Returns true if no error has been recorded so far.
    pub fn is_clean(&self) -> bool {
        self.rejection.is_empty()
    }

    fn reject(&mut self, field: impl Into<String>, kind: FieldErrorKind, detail: impl Into<String>) {
        self.rejection.push(FieldError::new(field, kind, detail));
    }

    fn present(&mut self, field: &str) -> Option<&'a Value> {
        match self.object.get(field) {
            None | Some(Value::Null) => {
                self.reject(field, FieldErrorKind::Missing, "field is required");
                None
            }
            Some(value) => Some(value),
        }
    }

    /// Reads a required boolean.
    pub fn boolean(&mut self, field: &str) -> Option<bool> {
        match self.present(field)? {
            Value::Bool(b) => Some(*b),
            other => {
                self.reject(field, FieldErrorKind::WrongType, expected("a boolean", other));
                None
            }
        }
    }

    /// Reads a required integer inside `scale`.
    pub fn ordinal(&mut self, field: &str, scale: RangeInclusive<i32>) -> Option<Ordinal> {
        let value = self.present(field)?;
        self.ordinal_value(field, value, &scale)
    }

    fn ordinal_value(
        &mut self,
        field: &str,
        value: &Value,
        scale: &RangeInclusive<i32>,
    ) -> Option<Ordinal> {
        let Some(n) = value.as_i64() else {
            self.reject(field, FieldErrorKind::WrongType, expected("an integer", value));
            return None;
        };
        let ordinal = Ordinal::new(n, scale);
        if ordinal.is_none() {
            self.reject(
                field,
                FieldErrorKind::OutOfRange,
                format!(
                    "value {} is outside the scale {}..={}",
                    n,
                    scale.start(),
                    scale.end()
                ),
            );
        }
        ordinal
    }

    /// Reads a required, non-empty single-choice answer, trimmed.
    pub fn choice(&mut self, field: &str) -> Option<String> {
        let value = self.present(field)?;
        let Value::String(s) = value else {
            self.reject(field, FieldErrorKind::WrongType, expected("a string", value));
            return None;
        };
        let trimmed = s.trim();
        if trimmed.is_empty() {
            self.reject(field, FieldErrorKind::InvalidValue, "answer must not be empty");
            return None;
        }
        if trimmed.chars().count() > MAX_CHOICE_LEN {
            self.reject(
                field,
                FieldErrorKind::OutOfRange,
                format!("answer is longer than {} characters", MAX_CHOICE_LEN),
            );
            return None;
        }
        Some(trimmed.to_string())
    }

    /// Reads an optional free-text answer; blank text counts as absent.
    pub fn optional_text(&mut self, field: &str) -> Option<Option<String>> {
        match self.object.get(field) {
            None | Some(Value::Null) => Some(None),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.chars().count() > MAX_OPEN_RESPONSE_LEN {
                    self.reject(
                        field,
                        FieldErrorKind::OutOfRange,
                        format!("response is longer than {} characters", MAX_OPEN_RESPONSE_LEN),
                    );
                    None
                } else if trimmed.is_empty() {
                    Some(None)
                } else {
                    Some(Some(trimmed.to_string()))
                }
            }
            Some(other) => {
                self.reject(field, FieldErrorKind::WrongType, expected("a string or null", other));
                None
            }
        }
    }

    /// Reads a required string that must parse as `T`.
    pub fn parsed<T>(&mut self, field: &str) -> Option<T>
    where
        T: std::str::FromStr,
        T::Err: Display,
    {
        let value = self.present(field)?;
        let Value::String(s) = value else {
            self.reject(field, FieldErrorKind::WrongType, expected("a string", value));
            return None;
        };
        match s.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                self.reject(field, FieldErrorKind::InvalidValue, e.to_string());
                None
            }
        }
    }

    /// Reads a complete block of category ratings.
    ///
    /// Accepts either a list of `{<type field>: name, rating: n}` objects or an object
    /// keyed by category name. Missing, unknown, and duplicated categories are all
    /// rejected; errors on individual ratings are reported as `<field>.<category>`.
    pub fn ratings<C: RatedCategory>(&mut self, field: &str) -> Option<CategoryRatings<C>> {
        let value = self.present(field)?;
        let before = self.rejection.errors.len();

        let mut entries: Vec<(String, String, &Value)> = Vec::new();
        match value {
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    let path = format!("{}[{}]", field, index);
                    let Value::Object(item) = item else {
                        self.reject(path, FieldErrorKind::WrongType, expected("an object", item));
                        continue;
                    };
                    let name = match item.get(C::TYPE_FIELD) {
                        Some(Value::String(name)) => name.clone(),
                        None | Some(Value::Null) => {
                            self.reject(
                                format!("{}.{}", path, C::TYPE_FIELD),
                                FieldErrorKind::Missing,
                                "field is required",
                            );
                            continue;
                        }
                        Some(other) => {
                            self.reject(
                                format!("{}.{}", path, C::TYPE_FIELD),
                                FieldErrorKind::WrongType,
                                expected("a string", other),
                            );
                            continue;
                        }
                    };
                    match item.get("rating") {
                        None | Some(Value::Null) => {
                            self.reject(
                                format!("{}.rating", path),
                                FieldErrorKind::Missing,
                                "field is required",
                            );
                        }
                        Some(rating) => entries.push((path, name, rating)),
                    }
                }
            }
            Value::Object(map) => {
                for (name, rating) in map {
                    entries.push((format!("{}.{}", field, name), name.clone(), rating));
                }
            }
            other => {
                self.reject(
                    field,
                    FieldErrorKind::WrongType,
                    expected("a list or object of ratings", other),
                );
                return None;
            }
        }

        let mut ratings: HashMap<C, Ordinal> = HashMap::new();
        let mut seen: Vec<C> = Vec::new();
        for (path, name, rating) in entries {
            let category = match name.parse::<C>() {
                Ok(category) => category,
                Err(e) => {
                    self.reject(path, FieldErrorKind::Unexpected, e.to_string());
                    continue;
                }
            };
            let rating_path = format!("{}.{}", field, category.as_str());
            if seen.contains(&category) {
                self.reject(
                    rating_path,
                    FieldErrorKind::Duplicate,
                    format!("{} '{}' is rated more than once", C::LABEL, category),
                );
                continue;
            }
            seen.push(category);
            if let Some(ordinal) = self.ordinal_value(&rating_path, rating, &RATING_SCALE) {
                ratings.insert(category, ordinal);
            }
        }

        for category in C::ALL {
            if !seen.contains(category) {
                self.reject(
                    format!("{}.{}", field, category.as_str()),
                    FieldErrorKind::Missing,
                    format!("missing rating for {} '{}'", C::LABEL, category),
                );
            }
        }

        if self.rejection.errors.len() > before {
            return None;
        }
        CategoryRatings::from_complete(ratings)
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn expected(what: &str, actual: &Value) -> String {
    format!("expected {}, got {}", what, json_type_name(actual))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{ConcernCategory, FeatureCategory};
    use serde_json::json;

    fn read<T>(payload: Value, f: impl FnOnce(&mut Fields<'_>) -> Option<T>) -> (Option<T>, SubmissionRejection) {
        let object = payload.as_object().unwrap().clone();
        let mut fields = Fields::new(&object);
        let value = f(&mut fields);
        (value, fields.into_rejection())
    }

    #[test]
    fn ordinal_bounds() {
        assert_eq!(Ordinal::new(1, &RATING_SCALE).map(|o| o.value()), Some(1));
        assert_eq!(Ordinal::new(7, &RATING_SCALE).map(|o| o.value()), Some(7));
        assert!(Ordinal::new(0, &RATING_SCALE).is_none());
        assert!(Ordinal::new(8, &RATING_SCALE).is_none());
        assert!(Ordinal::new(6, &SCREENER_SCALE).is_none());
        assert!(Ordinal::new(i64::MAX, &RATING_SCALE).is_none());
    }

    #[test]
    fn ordinal_rejects_fraction_and_string() {
        let (value, rejection) = read(json!({"a": 2.5}), |f| f.ordinal("a", RATING_SCALE));
        assert!(value.is_none());
        assert_eq!(rejection.errors()[0].kind, FieldErrorKind::WrongType);

        let (value, rejection) = read(json!({"a": "3"}), |f| f.ordinal("a", RATING_SCALE));
        assert!(value.is_none());
        assert_eq!(rejection.errors()[0].kind, FieldErrorKind::WrongType);
    }

    #[test]
    fn null_counts_as_missing() {
        let (value, rejection) = read(json!({"q1_eligible": null}), |f| f.boolean("q1_eligible"));
        assert!(value.is_none());
        assert_eq!(rejection.errors()[0].kind, FieldErrorKind::Missing);
    }

    #[test]
    fn choice_is_trimmed_and_bounded() {
        let (value, rejection) = read(json!({"a": "  ZH "}), |f| f.choice("a"));
        assert_eq!(value.as_deref(), Some("ZH"));
        assert!(rejection.is_empty());

        let (value, rejection) = read(json!({"a": "   "}), |f| f.choice("a"));
        assert!(value.is_none());
        assert_eq!(rejection.errors()[0].kind, FieldErrorKind::InvalidValue);

        let long = "x".repeat(MAX_CHOICE_LEN + 1);
        let (value, rejection) = read(json!({ "a": long }), |f| f.choice("a"));
        assert!(value.is_none());
        assert_eq!(rejection.errors()[0].kind, FieldErrorKind::OutOfRange);
    }

    #[test]
    fn optional_text_treats_blank_as_absent() {
        let (value, rejection) = read(json!({}), |f| f.optional_text("q11"));
        assert_eq!(value, Some(None));
        assert!(rejection.is_empty());

        let (value, _) = read(json!({"q11": "  "}), |f| f.optional_text("q11"));
        assert_eq!(value, Some(None));

        let (value, _) = read(json!({"q11": " because "}), |f| f.optional_text("q11"));
        assert_eq!(value, Some(Some("because".to_string())));

        let (value, rejection) = read(json!({"q11": 4}), |f| f.optional_text("q11"));
        assert!(value.is_none());
        assert_eq!(rejection.errors()[0].kind, FieldErrorKind::WrongType);
    }

    #[test]
    fn ratings_accept_list_form() {
        let payload = json!({"concerns": [
            {"concern_type": "privacy", "rating": 1},
            {"concern_type": "misuse", "rating": 2},
            {"concern_type": "commercial", "rating": 3},
            {"concern_type": "trust", "rating": 4},
            {"concern_type": "security", "rating": 7},
        ]});
        let (ratings, rejection) = read(payload, |f| f.ratings::<ConcernCategory>("concerns"));
        assert!(rejection.is_empty(), "{}", rejection);
        let ratings = ratings.unwrap();
        assert_eq!(ratings.len(), 5);
        assert_eq!(
            ratings.get(ConcernCategory::Security).map(|r| r.value()),
            Some(7)
        );
    }

    #[test]
    fn ratings_accept_object_form() {
        let payload = json!({"features": {
            "anonymization": 7, "swiss_only": 6, "delete": 5,
            "impact": 4, "civic_use": 3, "time_limit": 2,
        }});
        let (ratings, rejection) = read(payload, |f| f.ratings::<FeatureCategory>("features"));
        assert!(rejection.is_empty(), "{}", rejection);
        let order: Vec<_> = ratings.unwrap().iter().map(|(c, _)| c).collect();
        assert_eq!(order, FeatureCategory::ALL.to_vec());
    }

    #[test]
    fn ratings_report_missing_category_by_name() {
        let payload = json!({"concerns": {
            "privacy": 3, "misuse": 3, "commercial": 3, "trust": 3,
        }});
        let (ratings, rejection) = read(payload, |f| f.ratings::<ConcernCategory>("concerns"));
        assert!(ratings.is_none());
        assert_eq!(rejection.errors().len(), 1);
        assert_eq!(rejection.errors()[0].field, "concerns.security");
        assert_eq!(rejection.errors()[0].kind, FieldErrorKind::Missing);
        assert!(rejection.errors()[0].detail.contains("security"));
    }

    #[test]
    fn ratings_reject_duplicates_and_unknowns() {
        let payload = json!({"concerns": [
            {"concern_type": "privacy", "rating": 1},
            {"concern_type": "privacy", "rating": 2},
            {"concern_type": "misuse", "rating": 2},
            {"concern_type": "commercial", "rating": 3},
            {"concern_type": "trust", "rating": 4},
            {"concern_type": "security", "rating": 5},
            {"concern_type": "weather", "rating": 5},
        ]});
        let (ratings, rejection) = read(payload, |f| f.ratings::<ConcernCategory>("concerns"));
        assert!(ratings.is_none());
        let kinds: Vec<_> = rejection.errors().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![FieldErrorKind::Duplicate, FieldErrorKind::Unexpected]);
        assert!(rejection.mentions("concerns.privacy"));
        assert!(rejection.mentions("concerns[6]"));
    }

    #[test]
    fn ratings_report_every_out_of_range_value() {
        let payload = json!({"features": {
            "anonymization": 0, "swiss_only": 8, "delete": 5,
            "impact": 4, "civic_use": 3, "time_limit": 2,
        }});
        let (ratings, rejection) = read(payload, |f| f.ratings::<FeatureCategory>("features"));
        assert!(ratings.is_none());
        assert_eq!(rejection.errors().len(), 2);
        assert!(rejection.mentions("features.anonymization"));
        assert!(rejection.mentions("features.swiss_only"));
        assert!(
            rejection
                .errors()
                .iter()
                .all(|e| e.kind == FieldErrorKind::OutOfRange)
        );
    }

    #[test]
    fn ratings_reject_wrong_container() {
        let (ratings, rejection) =
            read(json!({"features": "all of them"}), |f| f.ratings::<FeatureCategory>("features"));
        assert!(ratings.is_none());
        assert_eq!(rejection.errors()[0].kind, FieldErrorKind::WrongType);
    }

    #[test]
    fn rejection_display_lists_fields() {
        let rejection = SubmissionRejection::single(FieldError::new(
            "q4_willingness",
            FieldErrorKind::OutOfRange,
            "value 9 is outside the scale 1..=7",
        ));
        assert_eq!(
            rejection.to_string(),
            "1 field(s) failed validation: q4_willingness (out of range)"
        );
    }

    #[test]
    fn field_error_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FieldErrorKind::OutOfRange).unwrap();
        assert_eq!(json, "\"out_of_range\"");
    }
}
