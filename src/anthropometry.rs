//! Anthropometric derivations
//!
//! This module derives body-size indicators from weight and height:
//! - Body mass index and its category
//! - Ideal body weight (Broca, Indonesian modification)

use crate::types::{BmiCategory, Sex};

/// Upper bound (exclusive) of the underweight band
pub const BMI_UNDERWEIGHT_BELOW: f64 = 18.5;
/// Upper bound (exclusive) of the normal band
pub const BMI_NORMAL_BELOW: f64 = 25.0;
/// Upper bound (inclusive) of the overweight band
pub const BMI_OVERWEIGHT_MAX: f64 = 27.9;

/// Calculate BMI: weight (kg) / height (m)²
pub fn body_mass_index(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

impl BmiCategory {
    /// Classify a BMI value using the Asia-Pacific cut-offs.
    ///
    /// `< 18.5` underweight, `< 25.0` normal, `<= 27.9` overweight, else obese.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < BMI_UNDERWEIGHT_BELOW {
            BmiCategory::Underweight
        } else if bmi < BMI_NORMAL_BELOW {
            BmiCategory::Normal
        } else if bmi <= BMI_OVERWEIGHT_MAX {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

/// Calculate ideal body weight (kg).
///
/// Broca's `height - 100`, reduced by 10% for men of at least 160 cm and by 15%
/// for women of at least 150 cm. Shorter patients keep the unreduced value.
pub fn ideal_body_weight(height_cm: f64, sex: Sex) -> f64 {
    let broca = height_cm - 100.0;

    let (threshold_cm, reduction) = match sex {
        Sex::Male => (160.0, 0.10),
        Sex::Female => (150.0, 0.15),
    };

    if height_cm < threshold_cm {
        broca
    } else {
        broca - reduction * broca
    }
}
