//! Pipeline orchestration
//!
//! This module provides the public API for the Gizi engine. It runs a patient
//! record through the profile calculator and a meal plan through the menu
//! evaluator, taking and returning JSON at the boundary.

use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::adequacy::{evaluate_menu, DailyTargets, MenuEvaluation, MicronutrientReference};
use crate::error::EngineError;
use crate::food::FoodTable;
use crate::menu::MealPlan;
use crate::profile::compute_profile;
use crate::record::PatientRecord;
use crate::snapshot::{MenuSnapshot, ProfileRecord, SnapshotEncoder};

/// Compute a nutrition profile from a patient record.
///
/// # Arguments
/// * `record_json` - Patient record JSON (see `PatientRecord`)
///
/// # Returns
/// `ProfileRecord` JSON with the validated attributes and computed targets
///
/// # Example
/// ```ignore
/// let profile = compute_profile_json(r#"{"weight_kg": 65, ...}"#.to_string())?;
/// ```
pub fn compute_profile_json(record_json: String) -> Result<String, EngineError> {
    let record = PatientRecord::from_json(&record_json)?;
    let encoder = SnapshotEncoder::new();
    let profile = profile_record(&encoder, &record)?;
    encoder.to_json(&profile)
}

/// Validate a patient record and compute its `ProfileRecord`
pub fn compute_profile_record(record: &PatientRecord) -> Result<ProfileRecord, EngineError> {
    profile_record(&SnapshotEncoder::new(), record)
}

/// Evaluate a meal plan against daily targets.
///
/// # Arguments
/// * `food_table_json` - JSON array of food reference entries
/// * `request_json` - `MenuRequest` JSON
///
/// # Returns
/// `MenuEvaluation` JSON with the per-slot breakdown and adequacy report
pub fn evaluate_menu_json(food_table_json: String, request_json: String) -> Result<String, EngineError> {
    NutritionPlanner::from_json(&food_table_json)?.evaluate_request_json(&request_json)
}

/// Evaluate a meal plan and save it as a `MenuSnapshot`.
///
/// Same inputs as `evaluate_menu_json`. Fails with a validation error when
/// the plan is empty.
pub fn save_menu_json(food_table_json: String, request_json: String) -> Result<String, EngineError> {
    NutritionPlanner::from_json(&food_table_json)?.save_request_json(&request_json)
}

/// A meal plan and what to evaluate it against.
///
/// Targets are taken from `targets` when given, otherwise computed from
/// `patient`, otherwise the fallback `DailyTargets::default()`. Micronutrient
/// references apply to the latter two.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuRequest {
    #[serde(default)]
    pub plan: MealPlan,
    #[serde(default)]
    pub patient: Option<PatientRecord>,
    #[serde(default)]
    pub targets: Option<DailyTargets>,
    #[serde(default)]
    pub micronutrients: Option<MicronutrientReference>,
    #[serde(default)]
    pub patient_record_id: Option<Uuid>,
}

impl MenuRequest {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn profile_record(encoder: &SnapshotEncoder, record: &PatientRecord) -> Result<ProfileRecord, EngineError> {
    let attributes = record.validate()?;
    let targets = compute_profile(&attributes)?;
    Ok(encoder.encode_profile(record.name.clone(), attributes, targets))
}

/// Stateful planner holding the food table and micronutrient references.
///
/// Use this when one food table serves many patients and menus.
pub struct NutritionPlanner {
    food_table: FoodTable,
    micronutrients: MicronutrientReference,
    encoder: SnapshotEncoder,
}

impl NutritionPlanner {
    /// Create a planner with default micronutrient references
    pub fn new(food_table: FoodTable) -> Self {
        Self {
            food_table,
            micronutrients: MicronutrientReference::default(),
            encoder: SnapshotEncoder::new(),
        }
    }

    /// Create a planner from a JSON array of food reference entries
    pub fn from_json(food_table_json: &str) -> Result<Self, EngineError> {
        Ok(Self::new(FoodTable::from_json(food_table_json)?))
    }

    /// Replace the micronutrient references
    pub fn with_micronutrients(mut self, micronutrients: MicronutrientReference) -> Self {
        self.micronutrients = micronutrients;
        self
    }

    /// Replace the micronutrient references in place
    pub fn set_micronutrients(&mut self, micronutrients: MicronutrientReference) {
        self.micronutrients = micronutrients;
    }

    pub fn food_table(&self) -> &FoodTable {
        &self.food_table
    }

    pub fn micronutrients(&self) -> &MicronutrientReference {
        &self.micronutrients
    }

    /// Validate a patient record and compute its profile
    pub fn compute_profile(&self, record: &PatientRecord) -> Result<ProfileRecord, EngineError> {
        profile_record(&self.encoder, record)
    }

    /// Daily targets for a computed profile, or the fallback when there is none
    pub fn daily_targets(&self, profile: Option<&ProfileRecord>) -> DailyTargets {
        match profile {
            Some(p) => DailyTargets::from_profile(&p.targets, &self.micronutrients),
            None => DailyTargets::default().with_micronutrients(&self.micronutrients),
        }
    }

    /// Resolve the targets a request should be evaluated against
    pub fn resolve_targets(&self, request: &MenuRequest) -> Result<DailyTargets, EngineError> {
        if let Some(targets) = request.targets {
            return Ok(targets);
        }

        let micros = request.micronutrients.unwrap_or(self.micronutrients);
        match &request.patient {
            Some(record) => {
                let attributes = record.validate()?;
                let targets = compute_profile(&attributes)?;
                Ok(DailyTargets::from_profile(&targets, &micros))
            }
            None => {
                debug!("no patient in request, using fallback targets");
                Ok(DailyTargets::default().with_micronutrients(&micros))
            }
        }
    }

    /// Summarize a plan and classify its adequacy
    pub fn evaluate(&self, plan: &MealPlan, targets: &DailyTargets) -> Result<MenuEvaluation, EngineError> {
        evaluate_menu(plan, &self.food_table, targets)
    }

    /// Evaluate a plan and save it as an immutable snapshot
    pub fn save_menu(
        &self,
        plan: &MealPlan,
        targets: &DailyTargets,
        patient_record_id: Option<Uuid>,
    ) -> Result<MenuSnapshot, EngineError> {
        let evaluation = self.evaluate(plan, targets)?;
        self.encoder.encode_menu(plan, evaluation, patient_record_id)
    }

    /// Evaluate a `MenuRequest` JSON against this planner's food table
    pub fn evaluate_request_json(&self, request_json: &str) -> Result<String, EngineError> {
        let request = MenuRequest::from_json(request_json)?;
        let targets = self.resolve_targets(&request)?;
        let evaluation = self.evaluate(&request.plan, &targets)?;
        self.encoder.to_json(&evaluation)
    }

    /// Evaluate a `MenuRequest` JSON and return it as a `MenuSnapshot` JSON
    pub fn save_request_json(&self, request_json: &str) -> Result<String, EngineError> {
        let request = MenuRequest::from_json(request_json)?;
        let targets = self.resolve_targets(&request)?;
        let snapshot = self.save_menu(&request.plan, &targets, request.patient_record_id)?;
        self.encoder.to_json(&snapshot)
    }

    /// Encode a profile or menu snapshot to JSON
    pub fn to_json<T: serde::Serialize>(&self, snapshot: &T) -> Result<String, EngineError> {
        self.encoder.to_json(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Classification, MealSlot, Nutrient};
    use pretty_assertions::assert_eq;

    fn sample_food_table_json() -> &'static str {
        r#"[
            {
                "KODE": "AR001",
                "NAMA_BAHAN": "Beras giling, mentah",
                "BDD_persen": 100,
                "ENERGI_Kal": 357,
                "PROTEIN_g": 8.4,
                "LEMAK_g": 1.7,
                "KH_g": 77.1,
                "SERAT_g": 0.2,
                "NATRIUM_mg": 27,
                "KALIUM_mg": 71,
                "KALSIUM_mg": 147,
                "BESI_mg": 1.8
            },
            {
                "KODE": "AP010",
                "NAMA_BAHAN": "Telur ayam",
                "BDD_persen": 90,
                "ENERGI_Kal": 154,
                "PROTEIN_g": 12.4,
                "LEMAK_g": 10.8,
                "KH_g": 0.7,
                "NATRIUM_mg": 142,
                "KALSIUM_mg": 86,
                "BESI_mg": 3.0
            }
        ]"#
    }

    fn sample_patient_json() -> &'static str {
        r#"{
            "name": "Budi",
            "weight_kg": 65,
            "height_cm": 170,
            "age_years": 25,
            "sex": "male",
            "activity_level": "moderate",
            "health_condition": "healthy",
            "diet_type": "regular_diet"
        }"#
    }

    #[test]
    fn test_compute_profile_json() {
        let json = compute_profile_json(sample_patient_json().to_string()).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["producer"]["name"], "gizi-engine");
        assert_eq!(payload["patient_name"], "Budi");
        assert_eq!(payload["targets"]["bmi_category"], "normal");
        assert!((payload["targets"]["tee_kcal"].as_f64().unwrap() - 2707.25).abs() < 1e-9);
    }

    #[test]
    fn test_compute_profile_json_rejects_invalid_record() {
        let result = compute_profile_json(r#"{"weight_kg": 65}"#.to_string());
        assert!(matches!(result, Err(EngineError::Validation(_))));

        let result = compute_profile_json("not valid json".to_string());
        assert!(matches!(result, Err(EngineError::Json(_))));
    }

    #[test]
    fn test_evaluate_menu_json_with_patient() {
        let request = format!(
            r#"{{
                "plan": {{
                    "morning_meal": [{{"food_code": "AR001", "raw_weight_grams": 150}}],
                    "midday_meal": [{{"food_code": "AP010", "raw_weight_grams": 60}}]
                }},
                "patient": {}
            }}"#,
            sample_patient_json()
        );

        let json = evaluate_menu_json(sample_food_table_json().to_string(), request).unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!((payload["targets"]["energy_kcal"].as_f64().unwrap() - 2707.25).abs() < 1e-9);
        assert_eq!(payload["summary"]["slots"].as_array().unwrap().len(), 5);
        assert_eq!(payload["adequacy"]["results"][0]["nutrient"], "energy");
        assert_eq!(payload["adequacy"]["results"][0]["classification"], "deficient");
    }

    #[test]
    fn test_evaluate_menu_json_fallback_targets() {
        let json = evaluate_menu_json(
            sample_food_table_json().to_string(),
            r#"{"plan": {}, "micronutrients": {"iron_mg": 8}}"#.to_string(),
        )
        .unwrap();
        let payload: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(payload["targets"]["energy_kcal"], 2000.0);
        assert_eq!(payload["targets"]["iron_mg"], 8.0);
        assert_eq!(payload["adequacy"]["results"][8]["percent_of_target"], 0);
    }

    #[test]
    fn test_evaluate_menu_json_unknown_food() {
        let result = evaluate_menu_json(
            sample_food_table_json().to_string(),
            r#"{"plan": {"evening_meal": [{"food_code": "XX000", "raw_weight_grams": 10}]}}"#
                .to_string(),
        );
        assert!(matches!(result, Err(EngineError::ReferenceNotFound(_))));
    }

    #[test]
    fn test_save_menu_json_rejects_empty_plan() {
        let result = save_menu_json(sample_food_table_json().to_string(), r#"{"plan": {}}"#.to_string());
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_planner_profile_then_menu() {
        let table = FoodTable::from_json(sample_food_table_json()).unwrap();
        let planner = NutritionPlanner::new(table);

        let record = PatientRecord::from_json(sample_patient_json()).unwrap();
        let profile = planner.compute_profile(&record).unwrap();
        let targets = planner.daily_targets(Some(&profile));

        let mut plan = MealPlan::new();
        plan.add_item(planner.food_table(), MealSlot::MorningMeal, "AR001", Some(250))
            .unwrap();
        plan.add_item(planner.food_table(), MealSlot::EveningMeal, "AR001", Some(250))
            .unwrap();

        let snapshot = planner.save_menu(&plan, &targets, Some(profile.id)).unwrap();

        assert_eq!(snapshot.patient_record_id, Some(profile.id));
        assert_eq!(snapshot.targets.get(Nutrient::Fiber), 25.0);
        // 500 g rice: 1785 kcal of 2707.25
        let energy = snapshot.adequacy.get(Nutrient::Energy).unwrap();
        assert_eq!(energy.percent_of_target, 66);
        assert_eq!(energy.classification, Classification::Deficient);
    }

    #[test]
    fn test_planner_custom_micronutrients() {
        let table = FoodTable::from_json(sample_food_table_json()).unwrap();
        let micros = MicronutrientReference {
            sodium_mg: 1500.0,
            ..MicronutrientReference::default()
        };
        let planner = NutritionPlanner::new(table).with_micronutrients(micros);
        assert_eq!(planner.micronutrients(), &micros);

        let targets = planner.daily_targets(None);
        assert_eq!(targets.get(Nutrient::Sodium), 1500.0);
        assert_eq!(targets.get(Nutrient::Energy), 2000.0);

        let resolved = planner.resolve_targets(&MenuRequest::default()).unwrap();
        assert_eq!(resolved, targets);
    }

    #[test]
    fn test_explicit_targets_take_precedence() {
        let table = FoodTable::from_json(sample_food_table_json()).unwrap();
        let planner = NutritionPlanner::new(table);
        let mut explicit = DailyTargets::default();
        explicit.0.energy_kcal = 1800.0;

        let request = MenuRequest {
            targets: Some(explicit),
            patient: Some(PatientRecord::from_json(sample_patient_json()).unwrap()),
            ..MenuRequest::default()
        };

        assert_eq!(planner.resolve_targets(&request).unwrap(), explicit);
    }

    #[test]
    fn test_planner_serves_many_requests() {
        let mut planner = NutritionPlanner::from_json(sample_food_table_json()).unwrap();
        let request = r#"{"plan": {"morning_meal": [{"food_code": "AP010", "raw_weight_grams": 100}]}}"#;

        let first: serde_json::Value =
            serde_json::from_str(&planner.evaluate_request_json(request).unwrap()).unwrap();
        assert_eq!(first["targets"]["calcium_mg"], 1000.0);

        planner.set_micronutrients(MicronutrientReference {
            calcium_mg: 1200.0,
            ..MicronutrientReference::default()
        });
        assert_eq!(planner.micronutrients().calcium_mg, 1200.0);

        let second: serde_json::Value =
            serde_json::from_str(&planner.evaluate_request_json(request).unwrap()).unwrap();
        assert_eq!(second["targets"]["calcium_mg"], 1200.0);

        let saved: serde_json::Value =
            serde_json::from_str(&planner.save_request_json(request).unwrap()).unwrap();
        assert_eq!(saved["plan"]["morning_meal"][0]["food_code"], "AP010");

        assert!(matches!(
            planner.save_request_json(r#"{"plan": {}}"#),
            Err(EngineError::Validation(_))
        ));
    }
}
