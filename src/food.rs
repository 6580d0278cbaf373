//! Food composition reference table
//!
//! Entries hold per-100 g nutrient values for one food code. The table is
//! static at runtime: callers load it once (typically from a TKPI export) and
//! pass it by reference to the menu evaluator.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::trace;

use crate::error::EngineError;
use crate::types::NutrientTotals;

/// Smallest raw weight a selected food can have (g)
pub const MIN_RAW_WEIGHT_GRAMS: u32 = 1;
/// Largest raw weight a selected food can have (g)
pub const MAX_RAW_WEIGHT_GRAMS: u32 = 10_000;
/// Edible portion assumed when an entry does not state one
pub const DEFAULT_EDIBLE_PORTION_PERCENT: f64 = 100.0;

/// One row of the food composition table (values per 100 g edible portion)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodReferenceEntry {
    #[serde(alias = "KODE")]
    pub code: String,
    #[serde(alias = "NAMA_BAHAN")]
    pub name: String,
    /// Edible portion of the raw weight (percent, 0-100]
    #[serde(default, alias = "BDD_persen")]
    pub edible_portion_percent: Option<f64>,
    #[serde(default, alias = "ENERGI_Kal")]
    pub energy_kcal: Option<f64>,
    #[serde(default, alias = "PROTEIN_g")]
    pub protein_g: Option<f64>,
    #[serde(default, alias = "LEMAK_g")]
    pub fat_g: Option<f64>,
    #[serde(default, alias = "KH_g")]
    pub carb_g: Option<f64>,
    #[serde(default, alias = "SERAT_g")]
    pub fiber_g: Option<f64>,
    #[serde(default, alias = "NATRIUM_mg")]
    pub sodium_mg: Option<f64>,
    #[serde(default, alias = "KALIUM_mg")]
    pub potassium_mg: Option<f64>,
    #[serde(default, alias = "KALSIUM_mg")]
    pub calcium_mg: Option<f64>,
    #[serde(default, alias = "BESI_mg")]
    pub iron_mg: Option<f64>,
}

impl FoodReferenceEntry {
    /// Edible portion in percent; absent or non-positive values mean 100
    pub fn edible_portion(&self) -> f64 {
        match self.edible_portion_percent {
            Some(p) if p.is_finite() && p > 0.0 => p,
            _ => DEFAULT_EDIBLE_PORTION_PERCENT,
        }
    }

    /// Nutrients per 100 g, missing fields read as zero
    pub fn per_100g(&self) -> NutrientTotals {
        NutrientTotals {
            energy_kcal: self.energy_kcal.unwrap_or(0.0),
            protein_g: self.protein_g.unwrap_or(0.0),
            fat_g: self.fat_g.unwrap_or(0.0),
            carbohydrate_g: self.carb_g.unwrap_or(0.0),
            fiber_g: self.fiber_g.unwrap_or(0.0),
            sodium_mg: self.sodium_mg.unwrap_or(0.0),
            potassium_mg: self.potassium_mg.unwrap_or(0.0),
            calcium_mg: self.calcium_mg.unwrap_or(0.0),
            iron_mg: self.iron_mg.unwrap_or(0.0),
        }
    }

    pub fn category(&self) -> FoodCategory {
        FoodCategory::from_code(&self.code)
    }
}

/// Coarse grouping of TKPI food codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    /// `AR` codes: raw cereal ingredients
    RawIngredient,
    /// `AP` codes: processed cereal products
    ProcessedProduct,
    /// `BR` codes: raw tubers
    Tuber,
    /// `BP` codes: tuber products
    TuberProduct,
    Other,
}

impl FoodCategory {
    pub fn from_code(code: &str) -> Self {
        if code.starts_with("AR") {
            FoodCategory::RawIngredient
        } else if code.starts_with("AP") {
            FoodCategory::ProcessedProduct
        } else if code.starts_with("BR") {
            FoodCategory::Tuber
        } else if code.starts_with("BP") {
            FoodCategory::TuberProduct
        } else {
            FoodCategory::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FoodCategory::RawIngredient => "raw_ingredient",
            FoodCategory::ProcessedProduct => "processed_product",
            FoodCategory::Tuber => "tuber",
            FoodCategory::TuberProduct => "tuber_product",
            FoodCategory::Other => "other",
        }
    }
}

/// Clamp a raw weight into `[1, 10000]` grams
pub fn clamp_raw_weight(raw_weight_grams: i64) -> u32 {
    raw_weight_grams.clamp(
        i64::from(MIN_RAW_WEIGHT_GRAMS),
        i64::from(MAX_RAW_WEIGHT_GRAMS),
    ) as u32
}

/// Nutrients contributed by one serving of a food
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutrientContribution {
    /// Raw weight after clamping (g)
    pub raw_weight_grams: u32,
    /// Edible weight actually served (g)
    pub serving_weight_grams: f64,
    pub nutrients: NutrientTotals,
}

/// Scale a food's per-100 g values to a raw weight.
///
/// Out-of-range weights are clamped, never rejected.
pub fn scale_food_to_serving(entry: &FoodReferenceEntry, raw_weight_grams: i64) -> NutrientContribution {
    let raw = clamp_raw_weight(raw_weight_grams);
    let serving_weight_grams = f64::from(raw) * entry.edible_portion() / 100.0;
    let factor = serving_weight_grams / 100.0;

    trace!(code = %entry.code, raw, serving_weight_grams, "scaled food serving");

    NutrientContribution {
        raw_weight_grams: raw,
        serving_weight_grams,
        nutrients: entry.per_100g().scaled(factor),
    }
}

/// Food composition table keyed by unique code
#[derive(Debug, Clone, Default)]
pub struct FoodTable {
    entries: Vec<FoodReferenceEntry>,
    index: HashMap<String, usize>,
}

impl FoodTable {
    /// Build a table, rejecting blank or duplicate codes
    pub fn new(entries: Vec<FoodReferenceEntry>) -> Result<Self, EngineError> {
        let mut index = HashMap::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            if entry.code.trim().is_empty() {
                return Err(EngineError::validation(format!(
                    "food entry at index {i} has an empty code"
                )));
            }
            if index.insert(entry.code.clone(), i).is_some() {
                return Err(EngineError::validation(format!(
                    "duplicate food code: {}",
                    entry.code
                )));
            }
        }

        Ok(Self { entries, index })
    }

    /// Load a table from a JSON array of entries
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let entries: Vec<FoodReferenceEntry> = serde_json::from_str(json)?;
        Self::new(entries)
    }

    /// Look up an entry by code
    pub fn get(&self, code: &str) -> Result<&FoodReferenceEntry, EngineError> {
        self.index
            .get(code)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| EngineError::ReferenceNotFound(code.to_string()))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.index.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive name search, optionally restricted to a category.
    /// Results keep table order; an empty term matches everything.
    pub fn search(&self, term: &str, category: Option<FoodCategory>) -> Vec<&FoodReferenceEntry> {
        let needle = term.trim().to_lowercase();

        self.entries
            .iter()
            .filter(|e| needle.is_empty() || e.name.to_lowercase().contains(&needle))
            .filter(|e| category.map_or(true, |c| e.category() == c))
            .collect()
    }

    /// Distinct categories present in the table, in first-seen order
    pub fn categories(&self) -> Vec<FoodCategory> {
        let mut seen = Vec::new();
        for category in self.entries.iter().map(FoodReferenceEntry::category) {
            if !seen.contains(&category) {
                seen.push(category);
            }
        }
        seen
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    pub(crate) fn rice() -> FoodReferenceEntry {
        FoodReferenceEntry {
            code: "AR001".to_string(),
            name: "Beras giling, mentah".to_string(),
            edible_portion_percent: Some(100.0),
            energy_kcal: Some(357.0),
            protein_g: Some(8.4),
            fat_g: Some(1.7),
            carb_g: Some(77.1),
            fiber_g: Some(0.2),
            sodium_mg: Some(27.0),
            potassium_mg: Some(71.0),
            calcium_mg: Some(147.0),
            iron_mg: Some(1.8),
        }
    }

    pub(crate) fn cassava() -> FoodReferenceEntry {
        FoodReferenceEntry {
            code: "BR010".to_string(),
            name: "Singkong, segar".to_string(),
            edible_portion_percent: Some(85.0),
            energy_kcal: Some(154.0),
            protein_g: Some(1.0),
            fat_g: Some(0.3),
            carb_g: Some(36.8),
            fiber_g: Some(0.9),
            sodium_mg: Some(2.0),
            potassium_mg: Some(394.0),
            calcium_mg: Some(77.0),
            iron_mg: Some(1.1),
        }
    }

    pub(crate) fn bread() -> FoodReferenceEntry {
        FoodReferenceEntry {
            code: "AP020".to_string(),
            name: "Roti putih".to_string(),
            edible_portion_percent: None,
            energy_kcal: Some(248.0),
            protein_g: Some(8.0),
            fat_g: Some(1.2),
            carb_g: Some(50.0),
            fiber_g: None,
            sodium_mg: Some(530.0),
            potassium_mg: None,
            calcium_mg: Some(10.0),
            iron_mg: Some(1.5),
        }
    }

    pub(crate) fn sample_table() -> FoodTable {
        FoodTable::new(vec![rice(), cassava(), bread()]).unwrap()
    }

    #[test]
    fn test_scale_applies_edible_portion() {
        // 200 g raw at 85% edible = 170 g served, factor 1.7
        let c = scale_food_to_serving(&cassava(), 200);

        assert_eq!(c.raw_weight_grams, 200);
        assert!((c.serving_weight_grams - 170.0).abs() < 1e-9);
        assert!((c.nutrients.energy_kcal - 261.8).abs() < 1e-9);
        assert!((c.nutrients.potassium_mg - 669.8).abs() < 1e-9);
    }

    #[test]
    fn test_scale_clamps_weight() {
        let low = scale_food_to_serving(&rice(), 0);
        assert_eq!(low.raw_weight_grams, 1);
        assert!((low.nutrients.energy_kcal - 3.57).abs() < 1e-9);

        let high = scale_food_to_serving(&rice(), 50_000);
        assert_eq!(high.raw_weight_grams, 10_000);
        assert!((high.nutrients.energy_kcal - 35_700.0).abs() < 1e-6);

        assert_eq!(scale_food_to_serving(&rice(), -20).raw_weight_grams, 1);
    }

    #[test]
    fn test_missing_fields_default() {
        let c = scale_food_to_serving(&bread(), 50);

        // Missing edible portion counts as 100%
        assert!((c.serving_weight_grams - 50.0).abs() < 1e-9);
        assert_eq!(c.nutrients.fiber_g, 0.0);
        assert_eq!(c.nutrients.potassium_mg, 0.0);
        assert!((c.nutrients.sodium_mg - 265.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_edible_portion_treated_as_full() {
        let mut entry = rice();
        entry.edible_portion_percent = Some(0.0);
        assert_eq!(entry.edible_portion(), 100.0);
    }

    #[test]
    fn test_table_lookup() {
        let table = sample_table();

        assert_eq!(table.len(), 3);
        assert_eq!(table.get("BR010").unwrap().name, "Singkong, segar");
        assert!(matches!(
            table.get("ZZ999"),
            Err(EngineError::ReferenceNotFound(code)) if code == "ZZ999"
        ));
    }

    #[test]
    fn test_table_rejects_duplicates_and_blank_codes() {
        assert!(matches!(
            FoodTable::new(vec![rice(), rice()]),
            Err(EngineError::Validation(_))
        ));

        let mut blank = rice();
        blank.code = "  ".to_string();
        assert!(matches!(
            FoodTable::new(vec![blank]),
            Err(EngineError::Validation(_))
        ));
    }

    #[test]
    fn test_table_from_tkpi_json() {
        let table = FoodTable::from_json(
            r#"[
                {"KODE": "AR001", "NAMA_BAHAN": "Beras giling, mentah", "BDD_persen": 100,
                 "ENERGI_Kal": 357, "PROTEIN_g": 8.4, "LEMAK_g": 1.7, "KH_g": 77.1},
                {"code": "BR010", "name": "Singkong, segar", "edible_portion_percent": 85,
                 "energy_kcal": 154}
            ]"#,
        )
        .unwrap();

        let rice = table.get("AR001").unwrap();
        assert_eq!(rice.carb_g, Some(77.1));
        assert_eq!(rice.iron_mg, None);
        assert_eq!(table.get("BR010").unwrap().edible_portion(), 85.0);
    }

    #[test]
    fn test_categories_and_search() {
        let table = sample_table();

        assert_eq!(FoodCategory::from_code("BP003"), FoodCategory::TuberProduct);
        assert_eq!(FoodCategory::from_code("DR001"), FoodCategory::Other);
        assert_eq!(
            table.categories(),
            vec![
                FoodCategory::RawIngredient,
                FoodCategory::Tuber,
                FoodCategory::ProcessedProduct
            ]
        );

        let hits: Vec<&str> = table.search("ROTI", None).iter().map(|e| e.code.as_str()).collect();
        assert_eq!(hits, vec!["AP020"]);

        assert_eq!(table.search("", None).len(), 3);
        assert_eq!(table.search("", Some(FoodCategory::Tuber)).len(), 1);
        assert!(table.search("beras", Some(FoodCategory::Tuber)).is_empty());
    }
}
