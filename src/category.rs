//! # Closed Category Sets
//!
//! The questionnaire rates a fixed set of concerns (Q5) and a fixed set of governance
//! features (Q6), and assigns every participant to one cell of a 2x2 factorial design
//! (transparency x user control). All three are closed enumerations: a category that is
//! not listed here cannot be represented, validated, or stored.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/////////////////////////////////////////// RatedCategory ////////////////////////////////////////////

/// A category that participants rate on an ordinal scale.
///
/// Implemented by [`ConcernCategory`] and [`FeatureCategory`] so that validation and
/// persistence can treat both rating blocks uniformly.
pub trait RatedCategory:
    Copy + Eq + Hash + Display + FromStr<Err = CategoryParseError> + 'static
{
    /// Every member of the category set, in questionnaire order.
    const ALL: &'static [Self];
    /// The key naming the category inside a list-form rating entry.
    const TYPE_FIELD: &'static str;
    /// Human-readable name of the category set, used in error messages.
    const LABEL: &'static str;

    /// The wire and storage name of this category.
    fn as_str(&self) -> &'static str;

    /// Comma-separated list of every valid wire name.
    fn expected() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Error returned when a string does not name a member of a closed category set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryParseError {
    /// Name of the category set that was being parsed.
    pub label: &'static str,
    /// The rejected input.
    pub value: String,
    /// The accepted values, comma separated.
    pub expected: String,
}

impl Display for CategoryParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "unknown {} '{}'; expected one of {}",
            self.label, self.value, self.expected
        )
    }
}

impl std::error::Error for CategoryParseError {}

fn parse_category<C: RatedCategory>(s: &str) -> Result<C, CategoryParseError> {
    let needle = s.trim();
    C::ALL
        .iter()
        .copied()
        .find(|c| c.as_str().eq_ignore_ascii_case(needle))
        .ok_or_else(|| CategoryParseError {
            label: C::LABEL,
            value: s.to_string(),
            expected: C::expected(),
        })
}

////////////////////////////////////////// ConcernCategory ///////////////////////////////////////////

/// The five concerns rated in Q5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConcernCategory {
    /// Exposure of personal information.
    Privacy,
    /// Use of the data for purposes other than those stated.
    Misuse,
    /// Commercial exploitation of the data.
    Commercial,
    /// Trust in the operating institution.
    Trust,
    /// Breaches and data security.
    Security,
}

impl RatedCategory for ConcernCategory {
    const ALL: &'static [Self] = &[
        Self::Privacy,
        Self::Misuse,
        Self::Commercial,
        Self::Trust,
        Self::Security,
    ];
    const TYPE_FIELD: &'static str = "concern_type";
    const LABEL: &'static str = "concern category";

    fn as_str(&self) -> &'static str {
        match self {
            Self::Privacy => "privacy",
            Self::Misuse => "misuse",
            Self::Commercial => "commercial",
            Self::Trust => "trust",
            Self::Security => "security",
        }
    }
}

impl Display for ConcernCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConcernCategory {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_category(s)
    }
}

////////////////////////////////////////// FeatureCategory ///////////////////////////////////////////

/// The six governance features whose importance is rated in Q6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureCategory {
    /// Responses are anonymized before analysis.
    Anonymization,
    /// Data is stored on servers located in Switzerland only.
    SwissOnly,
    /// Participants may have their data deleted.
    Delete,
    /// Participants are told what impact their data had.
    Impact,
    /// Data may only be used for civic purposes.
    CivicUse,
    /// Data is retained for a limited time.
    TimeLimit,
}

impl RatedCategory for FeatureCategory {
    const ALL: &'static [Self] = &[
        Self::Anonymization,
        Self::SwissOnly,
        Self::Delete,
        Self::Impact,
        Self::CivicUse,
        Self::TimeLimit,
    ];
    const TYPE_FIELD: &'static str = "feature_type";
    const LABEL: &'static str = "feature category";

    fn as_str(&self) -> &'static str {
        match self {
            Self::Anonymization => "anonymization",
            Self::SwissOnly => "swiss_only",
            Self::Delete => "delete",
            Self::Impact => "impact",
            Self::CivicUse => "civic_use",
            Self::TimeLimit => "time_limit",
        }
    }
}

impl Display for FeatureCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureCategory {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_category(s)
    }
}

///////////////////////////////////////// ExperimentalGroup //////////////////////////////////////////

/// One cell of the 2x2 factorial design.
///
/// The canonical form is a slug such as `transparency-high/control-low`. The legacy
/// frontend labels `group1` through `group4` are accepted on input and map to the cells
/// in the order low/low, high/low, low/high, high/high (transparency varies fastest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExperimentalGroup {
    /// No transparency statement, no user-control statement.
    #[serde(rename = "transparency-low/control-low", alias = "group1")]
    TransparencyLowControlLow,
    /// Transparency statement only.
    #[serde(rename = "transparency-high/control-low", alias = "group2")]
    TransparencyHighControlLow,
    /// User-control statement only.
    #[serde(rename = "transparency-low/control-high", alias = "group3")]
    TransparencyLowControlHigh,
    /// Both statements.
    #[serde(rename = "transparency-high/control-high", alias = "group4")]
    TransparencyHighControlHigh,
}

impl ExperimentalGroup {
    /// All four cells, in legacy label order.
    pub const ALL: [Self; 4] = [
        Self::TransparencyLowControlLow,
        Self::TransparencyHighControlLow,
        Self::TransparencyLowControlHigh,
        Self::TransparencyHighControlHigh,
    ];

    /// Builds the group from its two factor levels.
    pub fn from_factors(transparency: bool, user_control: bool) -> Self {
        match (transparency, user_control) {
            (false, false) => Self::TransparencyLowControlLow,
            (true, false) => Self::TransparencyHighControlLow,
            (false, true) => Self::TransparencyLowControlHigh,
            (true, true) => Self::TransparencyHighControlHigh,
        }
    }

    /// Whether the vignette included the transparency statement.
    pub fn transparency(&self) -> bool {
        matches!(
            self,
            Self::TransparencyHighControlLow | Self::TransparencyHighControlHigh
        )
    }

    /// Whether the vignette included the user-control statement.
    pub fn user_control(&self) -> bool {
        matches!(
            self,
            Self::TransparencyLowControlHigh | Self::TransparencyHighControlHigh
        )
    }

    /// The canonical slug, as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TransparencyLowControlLow => "transparency-low/control-low",
            Self::TransparencyHighControlLow => "transparency-high/control-low",
            Self::TransparencyLowControlHigh => "transparency-low/control-high",
            Self::TransparencyHighControlHigh => "transparency-high/control-high",
        }
    }

    /// The label used by the original frontend (`group1`..`group4`).
    pub fn legacy_label(&self) -> &'static str {
        match self {
            Self::TransparencyLowControlLow => "group1",
            Self::TransparencyHighControlLow => "group2",
            Self::TransparencyLowControlHigh => "group3",
            Self::TransparencyHighControlHigh => "group4",
        }
    }
}

impl Display for ExperimentalGroup {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperimentalGroup {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|g| {
                g.as_str().eq_ignore_ascii_case(needle)
                    || g.legacy_label().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| CategoryParseError {
                label: "experimental group",
                value: s.to_string(),
                expected: Self::ALL
                    .iter()
                    .map(|g| g.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
