//! Persisted patient record
//!
//! A `PatientRecord` is the loosely typed shape a document store hands back
//! after the intake form was saved: numbers may be missing and categorical
//! fields are free-form labels. `validate` turns it into `PatientAttributes`
//! or fails before any arithmetic happens.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::{
    ActivityLevel, DietType, HealthCondition, PatientAttributes, Sex, StressFactor,
};

/// Patient record as stored by the intake form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Optional display name, carried through for reports
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub age_years: Option<i64>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    pub activity_level: Option<String>,
    #[serde(default)]
    pub health_condition: Option<String>,
    #[serde(default)]
    pub stress_factor: Option<String>,
    #[serde(default)]
    pub diet_type: Option<String>,
}

impl PatientRecord {
    /// Parse a record from JSON
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validate the record into typed patient attributes
    pub fn validate(&self) -> Result<PatientAttributes, EngineError> {
        let weight_kg = positive("weight_kg", self.weight_kg)?;
        let height_cm = positive("height_cm", self.height_cm)?;

        let age_years = match self.age_years {
            Some(age) if age > 0 => u32::try_from(age)
                .map_err(|_| EngineError::validation(format!("age_years out of range: {age}")))?,
            Some(age) => {
                return Err(EngineError::validation(format!(
                    "age_years must be positive, got {age}"
                )))
            }
            None => return Err(missing("age_years")),
        };

        let sex: Sex = required("sex", &self.sex)?.parse()?;
        let activity_level: ActivityLevel =
            required("activity_level", &self.activity_level)?.parse()?;
        let health_condition: HealthCondition =
            required("health_condition", &self.health_condition)?.parse()?;
        let diet_type: DietType = required("diet_type", &self.diet_type)?.parse()?;

        // Blank labels are what an untouched select box stores
        let stress_factor: Option<StressFactor> = match self.stress_factor.as_deref().map(str::trim) {
            Some(label) if !label.is_empty() => Some(label.parse()?),
            _ => None,
        };

        if health_condition == HealthCondition::Sick && stress_factor.is_none() {
            return Err(EngineError::validation(
                "stress_factor is required when health_condition is sick",
            ));
        }

        Ok(PatientAttributes {
            weight_kg,
            height_cm,
            age_years,
            sex,
            activity_level,
            health_condition,
            stress_factor,
            diet_type,
        })
    }
}

impl From<&PatientAttributes> for PatientRecord {
    fn from(attrs: &PatientAttributes) -> Self {
        PatientRecord {
            name: None,
            weight_kg: Some(attrs.weight_kg),
            height_cm: Some(attrs.height_cm),
            age_years: Some(i64::from(attrs.age_years)),
            sex: Some(attrs.sex.as_str().to_string()),
            activity_level: Some(attrs.activity_level.as_str().to_string()),
            health_condition: Some(
                match attrs.health_condition {
                    HealthCondition::Healthy => "healthy",
                    HealthCondition::Sick => "sick",
                }
                .to_string(),
            ),
            stress_factor: attrs.stress_factor.map(|s| s.as_str().to_string()),
            diet_type: Some(attrs.diet_type.as_str().to_string()),
        }
    }
}

impl PatientAttributes {
    /// Check the numeric invariants of already-typed attributes
    pub fn validate(&self) -> Result<(), EngineError> {
        positive("weight_kg", Some(self.weight_kg))?;
        positive("height_cm", Some(self.height_cm))?;
        if self.age_years == 0 {
            return Err(EngineError::validation("age_years must be positive, got 0"));
        }
        if self.health_condition == HealthCondition::Sick && self.stress_factor.is_none() {
            return Err(EngineError::validation(
                "stress_factor is required when health_condition is sick",
            ));
        }
        Ok(())
    }
}

fn missing(field: &str) -> EngineError {
    EngineError::validation(format!("missing required field: {field}"))
}

fn positive(field: &str, value: Option<f64>) -> Result<f64, EngineError> {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v),
        Some(v) => Err(EngineError::validation(format!(
            "{field} must be a positive number, got {v}"
        ))),
        None => Err(missing(field)),
    }
}

fn required<'a>(field: &str, value: &'a Option<String>) -> Result<&'a str, EngineError> {
    match value.as_deref().map(str::trim) {
        Some(label) if !label.is_empty() => Ok(label),
        _ => Err(missing(field)),
    }
}
