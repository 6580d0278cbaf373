//! Diet presets and macronutrient targets

use crate::types::{DietComposition, DietType};

/// Energy density of carbohydrate (kcal/g)
pub const KCAL_PER_GRAM_CARB: f64 = 4.0;
/// Energy density of protein (kcal/g)
pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
/// Energy density of fat (kcal/g)
pub const KCAL_PER_GRAM_FAT: f64 = 9.0;

const fn split(carb: u8, protein: u8, fat: u8) -> DietComposition {
    DietComposition {
        carb_percent: carb,
        protein_percent: protein,
        fat_percent: fat,
    }
}

impl DietType {
    /// Carbohydrate / protein / fat share of total energy for this preset
    pub fn composition(&self) -> DietComposition {
        match self {
            DietType::RegularDiet => split(60, 15, 25),
            DietType::DiabetesMellitus => split(55, 20, 25),
            DietType::Dyslipidemia => split(55, 15, 30),
            DietType::Dash => split(60, 15, 25),
            DietType::ChronicKidneyNonDialysis => split(65, 10, 25),
            DietType::ChronicKidneyDialysis => split(55, 20, 25),
            DietType::LiverDisease => split(55, 15, 30),
            DietType::LowProtein => split(65, 8, 27),
            DietType::LowFat => split(65, 20, 15),
            DietType::HighProtein => split(55, 25, 20),
        }
    }
}

impl DietComposition {
    pub fn total_percent(&self) -> u32 {
        u32::from(self.carb_percent) + u32::from(self.protein_percent) + u32::from(self.fat_percent)
    }
}

/// Gram targets for the three macronutrients
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacroTargets {
    pub carb_g: f64,
    pub protein_g: f64,
    pub fat_g: f64,
}

/// Split TEE into gram targets using the preset percentages
pub fn macro_targets(tee_kcal: f64, composition: &DietComposition) -> MacroTargets {
    let share = |percent: u8| f64::from(percent) / 100.0 * tee_kcal;

    MacroTargets {
        carb_g: share(composition.carb_percent) / KCAL_PER_GRAM_CARB,
        protein_g: share(composition.protein_percent) / KCAL_PER_GRAM_PROTEIN,
        fat_g: share(composition.fat_percent) / KCAL_PER_GRAM_FAT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_preset_sums_to_100() {
        for diet in DietType::ALL {
            assert_eq!(diet.composition().total_percent(), 100, "{}", diet.as_str());
        }
    }

    #[test]
    fn test_regular_diet_split() {
        let targets = macro_targets(2707.25, &DietType::RegularDiet.composition());

        assert!((targets.carb_g - 406.0875).abs() < 1e-9);
        assert!((targets.protein_g - 101.521875).abs() < 1e-9);
        assert!((targets.fat_g - 75.201_388_888_888_89).abs() < 1e-9);
    }

    #[test]
    fn test_low_protein_split() {
        let targets = macro_targets(2000.0, &DietType::LowProtein.composition());

        assert!((targets.carb_g - 325.0).abs() < 1e-9);
        assert!((targets.protein_g - 40.0).abs() < 1e-9);
        assert!((targets.fat_g - 60.0).abs() < 1e-9);
    }
}
