//! Energy expenditure
//!
//! Basal metabolic rate (Mifflin-St Jeor), activity and stress factor lookup,
//! and total energy expenditure.

use crate::error::EngineError;
use crate::types::{ActivityLevel, HealthCondition, Sex, StressFactor};

/// Calculate BMR (kcal/day) with the Mifflin-St Jeor equation
///
/// `10 × weight + 6.25 × height − 5 × age + 5` for men, `− 161` for women.
pub fn basal_metabolic_rate(weight_kg: f64, height_cm: f64, age_years: u32, sex: Sex) -> f64 {
    let sex_constant = match sex {
        Sex::Male => 5.0,
        Sex::Female => -161.0,
    };

    10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age_years) + sex_constant
}

/// Sex-specific physical activity factor
pub fn activity_factor(level: ActivityLevel, sex: Sex) -> f64 {
    match (level, sex) {
        (ActivityLevel::Rest, _) => 1.3,
        (ActivityLevel::Light, Sex::Male) => 1.6,
        (ActivityLevel::Light, Sex::Female) => 1.5,
        (ActivityLevel::Moderate, Sex::Male) => 1.7,
        (ActivityLevel::Moderate, Sex::Female) => 1.6,
        (ActivityLevel::Heavy, Sex::Male) => 2.1,
        (ActivityLevel::Heavy, Sex::Female) => 1.9,
        (ActivityLevel::VeryHeavy, Sex::Male) => 2.4,
        (ActivityLevel::VeryHeavy, Sex::Female) => 2.2,
    }
}

impl StressFactor {
    /// Multiplier applied to energy needs of a sick patient
    pub fn multiplier(&self) -> f64 {
        match self {
            StressFactor::None => 1.3,
            StressFactor::Mild => 1.4,
            StressFactor::Moderate => 1.5,
            StressFactor::Severe => 1.6,
            StressFactor::VerySevere => 1.7,
            StressFactor::SevereBurn => 2.1,
        }
    }
}

/// Resolve the stress multiplier for a health condition.
///
/// Healthy patients get `None` whatever stress factor was supplied; sick
/// patients must supply one.
pub fn stress_multiplier(
    condition: HealthCondition,
    stress: Option<StressFactor>,
) -> Result<Option<f64>, EngineError> {
    match (condition, stress) {
        (HealthCondition::Healthy, _) => Ok(None),
        (HealthCondition::Sick, Some(factor)) => Ok(Some(factor.multiplier())),
        (HealthCondition::Sick, None) => Err(EngineError::validation(
            "stress factor is required when the patient is sick",
        )),
    }
}

/// Calculate TEE: BMR × activity factor (× stress factor when present)
pub fn total_energy_expenditure(bmr: f64, activity: f64, stress: Option<f64>) -> f64 {
    match stress {
        Some(stress) => bmr * activity * stress,
        None => bmr * activity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bmr_male() {
        // 650 + 1062.5 - 125 + 5
        assert_eq!(basal_metabolic_rate(65.0, 170.0, 25, Sex::Male), 1592.5);
    }

    #[test]
    fn test_bmr_female() {
        // 550 + 993.75 - 150 - 161
        assert_eq!(basal_metabolic_rate(55.0, 159.0, 30, Sex::Female), 1232.75);
    }

    #[test]
    fn test_activity_factor_table() {
        assert_eq!(activity_factor(ActivityLevel::Rest, Sex::Male), 1.3);
        assert_eq!(activity_factor(ActivityLevel::Rest, Sex::Female), 1.3);
        assert_eq!(activity_factor(ActivityLevel::Light, Sex::Female), 1.5);
        assert_eq!(activity_factor(ActivityLevel::Moderate, Sex::Male), 1.7);
        assert_eq!(activity_factor(ActivityLevel::Heavy, Sex::Female), 1.9);
        assert_eq!(activity_factor(ActivityLevel::VeryHeavy, Sex::Male), 2.4);
    }

    #[test]
    fn test_stress_multiplier() {
        assert_eq!(
            stress_multiplier(HealthCondition::Healthy, Some(StressFactor::SevereBurn)).unwrap(),
            None
        );
        assert_eq!(
            stress_multiplier(HealthCondition::Sick, Some(StressFactor::SevereBurn)).unwrap(),
            Some(2.1)
        );
        assert!(matches!(
            stress_multiplier(HealthCondition::Sick, None),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_total_energy_expenditure() {
        let tee = total_energy_expenditure(1592.5, 1.7, None);
        assert!((tee - 2707.25).abs() < 1e-9);

        let tee = total_energy_expenditure(1000.0, 1.3, Some(1.5));
        assert!((tee - 1950.0).abs() < 1e-9);
    }
}
