//! Nutrient adequacy evaluation
//!
//! Compares consumed totals against daily targets. A nutrient is adequate
//! when its rounded percentage of target lies in the closed range
//! `[85, 115]`, deficient below it and excessive above it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;
use crate::food::FoodTable;
use crate::menu::{summarize_menu, MealPlan, MenuSummary};
use crate::types::{Classification, Nutrient, NutrientTotals, NutritionTargets};

/// Lowest percentage still classified as adequate
pub const ADEQUATE_MIN_PERCENT: i64 = 85;
/// Highest percentage still classified as adequate
pub const ADEQUATE_MAX_PERCENT: i64 = 115;

/// Rounded percentage of target and its classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdequacyVerdict {
    pub percent: i64,
    pub classification: Classification,
}

impl Classification {
    pub fn from_percent(percent: i64) -> Self {
        if percent < ADEQUATE_MIN_PERCENT {
            Classification::Deficient
        } else if percent <= ADEQUATE_MAX_PERCENT {
            Classification::Adequate
        } else {
            Classification::Excessive
        }
    }
}

/// Classify a consumed total against a target.
///
/// A non-positive target yields 0 % instead of dividing by zero.
pub fn adequacy(total: f64, target: f64) -> AdequacyVerdict {
    let percent = if target > 0.0 && target.is_finite() {
        (100.0 * total / target).round() as i64
    } else {
        0
    };

    AdequacyVerdict {
        percent,
        classification: Classification::from_percent(percent),
    }
}

/// Reference daily intakes for the nutrients the profile calculator does not derive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicronutrientReference {
    pub fiber_g: f64,
    pub sodium_mg: f64,
    pub potassium_mg: f64,
    pub calcium_mg: f64,
    pub iron_mg: f64,
}

impl Default for MicronutrientReference {
    fn default() -> Self {
        Self {
            fiber_g: 25.0,
            sodium_mg: 2300.0,
            potassium_mg: 4700.0,
            calcium_mg: 1000.0,
            iron_mg: 18.0,
        }
    }
}

impl MicronutrientReference {
    /// Parse a reference from JSON; omitted fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Daily target for each tracked nutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DailyTargets(pub NutrientTotals);

impl Default for DailyTargets {
    /// Fallback targets for when no patient profile is available
    fn default() -> Self {
        Self::with_macros(2000.0, 60.0, 65.0, 300.0, &MicronutrientReference::default())
    }
}

impl DailyTargets {
    fn with_macros(
        energy_kcal: f64,
        protein_g: f64,
        fat_g: f64,
        carbohydrate_g: f64,
        micros: &MicronutrientReference,
    ) -> Self {
        DailyTargets(NutrientTotals {
            energy_kcal,
            protein_g,
            fat_g,
            carbohydrate_g,
            fiber_g: micros.fiber_g,
            sodium_mg: micros.sodium_mg,
            potassium_mg: micros.potassium_mg,
            calcium_mg: micros.calcium_mg,
            iron_mg: micros.iron_mg,
        })
    }

    /// Targets from a computed profile plus micronutrient references
    pub fn from_profile(targets: &NutritionTargets, micros: &MicronutrientReference) -> Self {
        Self::with_macros(
            targets.tee_kcal,
            targets.protein_grams_target,
            targets.fat_grams_target,
            targets.carb_grams_target,
            micros,
        )
    }

    /// Keep the energy and macronutrient targets, replace the micronutrients
    pub fn with_micronutrients(self, micros: &MicronutrientReference) -> Self {
        Self::with_macros(
            self.0.energy_kcal,
            self.0.protein_g,
            self.0.fat_g,
            self.0.carbohydrate_g,
            micros,
        )
    }

    pub fn get(&self, nutrient: Nutrient) -> f64 {
        self.0.get(nutrient)
    }
}

/// Adequacy of one nutrient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientAdequacy {
    pub nutrient: Nutrient,
    pub total_consumed: f64,
    pub target: f64,
    pub percent_of_target: i64,
    pub classification: Classification,
}

impl fmt::Display for NutrientAdequacy {
    /// One report line, e.g. `energy 1785.0/2707.3 kcal 66% deficient`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.1}/{:.1} {} {}% {}",
            self.nutrient.as_str(),
            self.total_consumed,
            self.target,
            self.nutrient.unit(),
            self.percent_of_target,
            self.classification.as_str()
        )
    }
}

/// Adequacy of all nine nutrients, in canonical nutrient order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdequacyReport {
    pub results: Vec<NutrientAdequacy>,
}

impl AdequacyReport {
    pub fn get(&self, nutrient: Nutrient) -> Option<&NutrientAdequacy> {
        self.results.iter().find(|r| r.nutrient == nutrient)
    }

    /// Nutrients with the given classification
    pub fn with_classification(&self, classification: Classification) -> Vec<Nutrient> {
        self.results
            .iter()
            .filter(|r| r.classification == classification)
            .map(|r| r.nutrient)
            .collect()
    }

    pub fn all_adequate(&self) -> bool {
        self.results
            .iter()
            .all(|r| r.classification == Classification::Adequate)
    }
}

/// Evaluate consumed totals against daily targets
pub fn evaluate_adequacy(totals: &NutrientTotals, targets: &DailyTargets) -> AdequacyReport {
    let results: Vec<NutrientAdequacy> = Nutrient::ALL
        .iter()
        .map(|&nutrient| {
            let total_consumed = totals.get(nutrient);
            let target = targets.get(nutrient);
            let verdict = adequacy(total_consumed, target);
            NutrientAdequacy {
                nutrient,
                total_consumed,
                target,
                percent_of_target: verdict.percent,
                classification: verdict.classification,
            }
        })
        .collect();

    debug!(
        adequate = results
            .iter()
            .filter(|r| r.classification == Classification::Adequate)
            .count(),
        "evaluated nutrient adequacy"
    );

    AdequacyReport { results }
}

/// Breakdown of a menu together with its adequacy against daily targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuEvaluation {
    pub summary: MenuSummary,
    pub targets: DailyTargets,
    pub adequacy: AdequacyReport,
}

/// Summarize `plan` and evaluate its daily total against `targets`.
///
/// An empty plan is valid here and comes back deficient in every nutrient.
pub fn evaluate_menu(
    plan: &MealPlan,
    table: &FoodTable,
    targets: &DailyTargets,
) -> Result<MenuEvaluation, EngineError> {
    let summary = summarize_menu(plan, table)?;
    let adequacy = evaluate_adequacy(&summary.daily_total, targets);

    Ok(MenuEvaluation {
        summary,
        targets: *targets,
        adequacy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::food::tests::sample_table;
    use crate::menu::SelectedFoodItem;
    use crate::types::MealSlot;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_adequacy_boundaries() {
        assert_eq!(
            adequacy(85.0, 100.0),
            AdequacyVerdict { percent: 85, classification: Classification::Adequate }
        );
        assert_eq!(
            adequacy(115.4, 100.0),
            AdequacyVerdict { percent: 115, classification: Classification::Adequate }
        );
        assert_eq!(
            adequacy(116.0, 100.0),
            AdequacyVerdict { percent: 116, classification: Classification::Excessive }
        );
        assert_eq!(
            adequacy(84.4, 100.0),
            AdequacyVerdict { percent: 84, classification: Classification::Deficient }
        );
        // 84.5 rounds up into the adequate band
        assert_eq!(adequacy(84.5, 100.0).classification, Classification::Adequate);
    }

    #[test]
    fn test_adequacy_zero_target() {
        assert_eq!(adequacy(500.0, 0.0).percent, 0);
        assert_eq!(adequacy(0.0, 0.0).percent, 0);
        assert_eq!(adequacy(10.0, -5.0).percent, 0);
        assert_eq!(adequacy(10.0, 0.0).classification, Classification::Deficient);
    }

    #[test]
    fn test_classification_from_percent() {
        assert_eq!(Classification::from_percent(0), Classification::Deficient);
        assert_eq!(Classification::from_percent(84), Classification::Deficient);
        assert_eq!(Classification::from_percent(85), Classification::Adequate);
        assert_eq!(Classification::from_percent(115), Classification::Adequate);
        assert_eq!(Classification::from_percent(116), Classification::Excessive);
    }

    #[test]
    fn test_default_targets() {
        let targets = DailyTargets::default();

        assert_eq!(targets.get(Nutrient::Energy), 2000.0);
        assert_eq!(targets.get(Nutrient::Carbohydrate), 300.0);
        assert_eq!(targets.get(Nutrient::Sodium), 2300.0);
        assert_eq!(targets.get(Nutrient::Iron), 18.0);
    }

    #[test]
    fn test_micronutrient_reference_partial_json() {
        let micros = MicronutrientReference::from_json(r#"{"sodium_mg": 1500}"#).unwrap();

        assert_eq!(micros.sodium_mg, 1500.0);
        assert_eq!(micros.fiber_g, 25.0);
    }

    #[test]
    fn test_evaluate_adequacy_report() {
        let totals = NutrientTotals {
            energy_kcal: 1900.0,
            protein_g: 30.0,
            fat_g: 80.0,
            carbohydrate_g: 300.0,
            fiber_g: 25.0,
            sodium_mg: 2300.0,
            potassium_mg: 4700.0,
            calcium_mg: 1000.0,
            iron_mg: 18.0,
        };
        let report = evaluate_adequacy(&totals, &DailyTargets::default());

        assert_eq!(report.results.len(), 9);
        assert_eq!(report.results[0].nutrient, Nutrient::Energy);
        assert_eq!(report.get(Nutrient::Energy).unwrap().percent_of_target, 95);
        assert_eq!(report.get(Nutrient::Protein).unwrap().percent_of_target, 50);
        assert_eq!(report.get(Nutrient::Fat).unwrap().percent_of_target, 123);
        assert_eq!(report.with_classification(Classification::Deficient), vec![Nutrient::Protein]);
        assert_eq!(report.with_classification(Classification::Excessive), vec![Nutrient::Fat]);
        assert!(!report.all_adequate());
    }

    #[test]
    fn test_nutrient_adequacy_report_line() {
        let totals = NutrientTotals {
            energy_kcal: 1900.0,
            protein_g: 30.0,
            sodium_mg: 2300.0,
            ..NutrientTotals::default()
        };
        let report = evaluate_adequacy(&totals, &DailyTargets::default());

        let lines: Vec<String> = report.results.iter().map(|r| r.to_string()).collect();
        assert_eq!(lines[0], "energy 1900.0/2000.0 kcal 95% adequate");
        assert_eq!(lines[1], "protein 30.0/60.0 g 50% deficient");
        assert_eq!(lines[5], "sodium 2300.0/2300.0 mg 100% adequate");
        assert_eq!(lines[8], "iron 0.0/18.0 mg 0% deficient");
    }

    #[test]
    fn test_evaluate_menu() {
        let table = sample_table();
        let mut plan = MealPlan::new();
        plan.add_item(&table, MealSlot::MiddayMeal, "AR001", Some(200)).unwrap();

        let evaluation = evaluate_menu(&plan, &table, &DailyTargets::default()).unwrap();
        let energy = evaluation.adequacy.get(Nutrient::Energy).unwrap();

        assert_eq!(energy.total_consumed, evaluation.summary.daily_total.energy_kcal);
        assert_eq!(energy.target, 2000.0);
        assert_eq!(evaluation.targets, DailyTargets::default());
    }

    #[test]
    fn test_evaluate_menu_unknown_food() {
        let table = sample_table();
        let mut plan = MealPlan::new();
        plan.evening_meal.push(SelectedFoodItem::new("ZZ999", 100));

        let result = evaluate_menu(&plan, &table, &DailyTargets::default());
        assert!(matches!(result, Err(EngineError::ReferenceNotFound(code)) if code == "ZZ999"));
    }

    #[test]
    fn test_empty_menu_is_deficient_everywhere() {
        let report = evaluate_adequacy(&NutrientTotals::default(), &DailyTargets::default());

        assert_eq!(
            report.with_classification(Classification::Deficient).len(),
            Nutrient::ALL.len()
        );
    }
}
