//! Nutrition profile calculator
//!
//! Turns one patient's attributes into energy and macronutrient targets:
//! BMI → ideal body weight → BMR → activity/stress adjusted TEE → gram targets
//! from the diet preset.

use tracing::debug;

use crate::anthropometry::{body_mass_index, ideal_body_weight};
use crate::diet::macro_targets;
use crate::energy::{
    activity_factor, basal_metabolic_rate, stress_multiplier, total_energy_expenditure,
};
use crate::error::EngineError;
use crate::types::{BmiCategory, NutritionTargets, PatientAttributes};

/// Compute the nutrition targets for a patient.
///
/// Inputs are validated before any arithmetic; the result is fully
/// determined by `attrs` and carries full-precision values.
///
/// # Errors
///
/// Returns `EngineError::Validation` for non-positive weight, height or age,
/// or a sick patient without a stress factor.
pub fn compute_profile(attrs: &PatientAttributes) -> Result<NutritionTargets, EngineError> {
    attrs.validate()?;

    let bmi = body_mass_index(attrs.weight_kg, attrs.height_cm);
    let ideal_body_weight_kg = ideal_body_weight(attrs.height_cm, attrs.sex);

    let bmr_kcal = basal_metabolic_rate(attrs.weight_kg, attrs.height_cm, attrs.age_years, attrs.sex);
    let activity = activity_factor(attrs.activity_level, attrs.sex);
    let stress = stress_multiplier(attrs.health_condition, attrs.stress_factor)?;
    let tee_kcal = total_energy_expenditure(bmr_kcal, activity, stress);

    let diet_composition = attrs.diet_type.composition();
    let macros = macro_targets(tee_kcal, &diet_composition);

    debug!(
        bmi,
        bmr_kcal,
        tee_kcal,
        diet = attrs.diet_type.as_str(),
        "computed nutrition profile"
    );

    Ok(NutritionTargets {
        bmi,
        bmi_category: BmiCategory::from_bmi(bmi),
        ideal_body_weight_kg,
        bmr_kcal,
        tee_kcal,
        activity_factor: activity,
        stress_factor: stress,
        carb_grams_target: macros.carb_g,
        protein_grams_target: macros.protein_g,
        fat_grams_target: macros.fat_g,
        diet_type: attrs.diet_type,
        diet_composition,
    })
}
