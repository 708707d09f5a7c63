//! # Survey Submissions
//!
//! A [`ValidatedSubmission`] is the typed form of one completed questionnaire. It can
//! only be obtained through [`ValidatedSubmission::from_value`], which enforces every
//! type, range, and category-set rule before anything reaches the database.

use serde_json::{Map, Value, json};

use crate::category::{ConcernCategory, ExperimentalGroup, FeatureCategory};
use crate::validate::{
    CategoryRatings, FieldError, FieldErrorKind, Fields, Ordinal, RATING_SCALE, SCREENER_SCALE,
    SubmissionRejection,
};

/// Section I: screener and context questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screener {
    /// Q1: eligible to vote in Switzerland.
    pub eligible: bool,
    /// Q2: frequency of ballot participation (1-5).
    pub participation: Ordinal,
    /// Q3: comfort with technology (1-5).
    pub tech_comfort: Ordinal,
}

/// Section IV: governance preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Governance {
    /// Q7: who may use the data.
    pub data_usage: String,
    /// Q8: how submitted questions may be used.
    pub question_usage: String,
    /// Q9: how long data should be kept.
    pub retention_time: String,
    /// Q10: where data should be stored.
    pub server_location: String,
    /// Q11: optional free-text reason for the decision.
    pub open_response: Option<String>,
}

/// Section V: demographics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Demographics {
    /// Q12: age group.
    pub age: String,
    /// Q13: gender identity.
    pub gender: String,
    /// Q14: canton of residence.
    pub canton: String,
    /// Q15: primary language.
    pub language: String,
    /// Q16: education level.
    pub education: String,
}

/// A questionnaire submission that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    /// Screener answers.
    pub screener: Screener,
    /// Vignette the participant was shown.
    pub group: ExperimentalGroup,
    /// Q4: willingness to share data (1-7), the dependent variable.
    pub willingness: Ordinal,
    /// Q5: one rating per concern category.
    pub concerns: CategoryRatings<ConcernCategory>,
    /// Q6: one importance rating per feature category.
    pub features: CategoryRatings<FeatureCategory>,
    /// Governance preferences.
    pub governance: Governance,
    /// Demographic answers.
    pub demographics: Demographics,
}

impl ValidatedSubmission {
    /// Validates an untyped payload.
    ///
    /// On failure the rejection lists every failing field. Unknown top-level fields are
    /// ignored.
    pub fn from_value(payload: &Value) -> Result<Self, SubmissionRejection> {
        let Value::Object(object) = payload else {
            return Err(SubmissionRejection::single(FieldError::new(
                "$",
                FieldErrorKind::WrongType,
                "submission must be a JSON object",
            )));
        };
        Self::from_object(object)
    }

    fn from_object(object: &Map<String, Value>) -> Result<Self, SubmissionRejection> {
        let mut fields = Fields::new(object);

        let eligible = fields.boolean("q1_eligible");
        let participation = fields.ordinal("q2_participation", SCREENER_SCALE);
        let tech_comfort = fields.ordinal("q3_tech_comfort", SCREENER_SCALE);
        let group = fields.parsed::<ExperimentalGroup>("experimental_group");
        let willingness = fields.ordinal("q4_willingness", RATING_SCALE);
        let concerns = fields.ratings::<ConcernCategory>("concerns");
        let features = fields.ratings::<FeatureCategory>("features");
        let data_usage = fields.choice("q7_data_usage");
        let question_usage = fields.choice("q8_question_usage");
        let retention_time = fields.choice("q9_retention_time");
        let server_location = fields.choice("q10_server_location");
        let open_response = fields.optional_text("q11_open_response");
        let age = fields.choice("q12_age");
        let gender = fields.choice("q13_gender");
        let canton = fields.choice("q14_canton");
        let language = fields.choice("q15_language");
        let education = fields.choice("q16_education");

        let screener = match (eligible, participation, tech_comfort) {
            (Some(eligible), Some(participation), Some(tech_comfort)) => Some(Screener {
                eligible,
                participation,
                tech_comfort,
            }),
            _ => None,
        };
        let governance = match (
            data_usage,
            question_usage,
            retention_time,
            server_location,
            open_response,
        ) {
            (
                Some(data_usage),
                Some(question_usage),
                Some(retention_time),
                Some(server_location),
                Some(open_response),
            ) => Some(Governance {
                data_usage,
                question_usage,
                retention_time,
                server_location,
                open_response,
            }),
            _ => None,
        };
        let demographics = match (age, gender, canton, language, education) {
            (Some(age), Some(gender), Some(canton), Some(language), Some(education)) => {
                Some(Demographics {
                    age,
                    gender,
                    canton,
                    language,
                    education,
                })
            }
            _ => None,
        };

        if !fields.is_clean() {
            return Err(fields.into_rejection());
        }
        match (
            screener,
            group,
            willingness,
            concerns,
            features,
            governance,
            demographics,
        ) {
            (
                Some(screener),
                Some(group),
                Some(willingness),
                Some(concerns),
                Some(features),
                Some(governance),
                Some(demographics),
            ) => Ok(Self {
                screener,
                group,
                willingness,
                concerns,
                features,
                governance,
                demographics,
            }),
            _ => Err(fields.into_rejection()),
        }
    }

    /// Renders the submission in the canonical wire form accepted by `POST /api/submit`.
    pub fn to_payload(&self) -> Value {
        json!({
            "q1_eligible": self.screener.eligible,
            "q2_participation": self.screener.participation.value(),
            "q3_tech_comfort": self.screener.tech_comfort.value(),
            "experimental_group": self.group.as_str(),
            "q4_willingness": self.willingness.value(),
            "concerns": self.concerns.to_payload(),
            "features": self.features.to_payload(),
            "q7_data_usage": self.governance.data_usage,
            "q8_question_usage": self.governance.question_usage,
            "q9_retention_time": self.governance.retention_time,
            "q10_server_location": self.governance.server_location,
            "q11_open_response": self.governance.open_response,
            "q12_age": self.demographics.age,
            "q13_gender": self.demographics.gender,
            "q14_canton": self.demographics.canton,
            "q15_language": self.demographics.language,
            "q16_education": self.demographics.education,
        })
    }
}
