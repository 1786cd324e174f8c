//! Feature record model
//!
//! One student's behavioral/demographic inputs. Every key is optional so that
//! partial records (hand-entered forms, sparse uploads) can still be scored.

use std::num::ParseFloatError;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Feature columns in the order the regression model consumes them.
pub const FEATURE_COLUMNS: [&str; 15] = [
    "hours_studied",
    "attendance",
    "previous_scores",
    "tutoring_sessions",
    "sleep_hours",
    "physical_activity",
    "motivation_level",
    "parental_involvement",
    "access_to_resources",
    "internet_access",
    "family_income",
    "teacher_quality",
    "peer_influence",
    "learning_disabilities",
    "distance_from_home",
];

/// Fill value for categorical cells left blank in imported data.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, Validate)]
#[serde(default)]
pub struct FeatureRecord {
    pub hours_studied: Option<i32>,
    pub attendance: Option<i32>,
    pub previous_scores: Option<i32>,
    pub tutoring_sessions: Option<i32>,
    pub sleep_hours: Option<i32>,
    pub physical_activity: Option<i32>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub motivation_level: Option<String>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub parental_involvement: Option<String>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub access_to_resources: Option<String>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub internet_access: Option<String>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub family_income: Option<String>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub teacher_quality: Option<String>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub peer_influence: Option<String>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub learning_disabilities: Option<String>,
    #[validate(length(max = 20, message = "must be at most 20 characters"))]
    pub distance_from_home: Option<String>,
}

/// A feature column value as seen by the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue<'a> {
    Numeric(Option<i32>),
    Categorical(Option<&'a str>),
}

impl FeatureRecord {
    /// Look up a column by name. Returns `None` for names outside
    /// [`FEATURE_COLUMNS`].
    pub fn value(&self, column: &str) -> Option<FeatureValue<'_>> {
        use FeatureValue::{Categorical, Numeric};

        let value = match column {
            "hours_studied" => Numeric(self.hours_studied),
            "attendance" => Numeric(self.attendance),
            "previous_scores" => Numeric(self.previous_scores),
            "tutoring_sessions" => Numeric(self.tutoring_sessions),
            "sleep_hours" => Numeric(self.sleep_hours),
            "physical_activity" => Numeric(self.physical_activity),
            "motivation_level" => Categorical(self.motivation_level.as_deref()),
            "parental_involvement" => Categorical(self.parental_involvement.as_deref()),
            "access_to_resources" => Categorical(self.access_to_resources.as_deref()),
            "internet_access" => Categorical(self.internet_access.as_deref()),
            "family_income" => Categorical(self.family_income.as_deref()),
            "teacher_quality" => Categorical(self.teacher_quality.as_deref()),
            "peer_influence" => Categorical(self.peer_influence.as_deref()),
            "learning_disabilities" => Categorical(self.learning_disabilities.as_deref()),
            "distance_from_home" => Categorical(self.distance_from_home.as_deref()),
            _ => return None,
        };
        Some(value)
    }

    pub fn is_categorical(column: &str) -> bool {
        FEATURE_COLUMNS[6..].contains(&column)
    }

    fn numeric_mut(&mut self, column: &str) -> Option<&mut Option<i32>> {
        match column {
            "hours_studied" => Some(&mut self.hours_studied),
            "attendance" => Some(&mut self.attendance),
            "previous_scores" => Some(&mut self.previous_scores),
            "tutoring_sessions" => Some(&mut self.tutoring_sessions),
            "sleep_hours" => Some(&mut self.sleep_hours),
            "physical_activity" => Some(&mut self.physical_activity),
            _ => None,
        }
    }

    fn categorical_mut(&mut self, column: &str) -> Option<&mut Option<String>> {
        match column {
            "motivation_level" => Some(&mut self.motivation_level),
            "parental_involvement" => Some(&mut self.parental_involvement),
            "access_to_resources" => Some(&mut self.access_to_resources),
            "internet_access" => Some(&mut self.internet_access),
            "family_income" => Some(&mut self.family_income),
            "teacher_quality" => Some(&mut self.teacher_quality),
            "peer_influence" => Some(&mut self.peer_influence),
            "learning_disabilities" => Some(&mut self.learning_disabilities),
            "distance_from_home" => Some(&mut self.distance_from_home),
            _ => None,
        }
    }

    /// Set a column from a text cell. Blank cells clear the field; numbers
    /// written as decimals (`7.0`) are rounded. Returns `Ok(false)` for
    /// columns that are not features.
    pub fn set_raw(&mut self, column: &str, raw: &str) -> Result<bool, ParseFloatError> {
        let raw = raw.trim();
        if let Some(slot) = self.numeric_mut(column) {
            *slot = if raw.is_empty() {
                None
            } else {
                Some(raw.parse::<f64>()?.round() as i32)
            };
            return Ok(true);
        }
        if let Some(slot) = self.categorical_mut(column) {
            *slot = (!raw.is_empty()).then(|| raw.to_string());
            return Ok(true);
        }
        Ok(false)
    }

    /// Missing numbers become 0, missing categories [`UNKNOWN_CATEGORY`].
    pub fn fill_missing(&mut self) {
        for column in FEATURE_COLUMNS {
            if let Some(slot) = self.numeric_mut(column) {
                slot.get_or_insert(0);
            } else if let Some(slot) = self.categorical_mut(column) {
                slot.get_or_insert_with(|| UNKNOWN_CATEGORY.to_string());
            }
        }
    }
}

/// Training sample: features plus the observed exam score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TrainingRow {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub features: FeatureRecord,
    pub exam_score: f64,
}
