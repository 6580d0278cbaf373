//! Core types for the Gizi engine
//!
//! This module defines the data structures shared by both calculators: patient
//! attributes and their enumerations, the nutrition targets produced by the
//! profile calculator, and the nine-nutrient totals consumed by the menu
//! adequacy evaluator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use crate::error::EngineError;

/// Lowercase a label and drop everything that is not alphanumeric, so that
/// "Diet Biasa", "diet_biasa" and "DietBiasa" compare equal.
fn normalize_label(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Biological sex used by the clinical formulas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
        }
    }
}

impl FromStr for Sex {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "male" | "m" | "l" | "lakilaki" => Ok(Sex::Male),
            "female" | "f" | "p" | "perempuan" => Ok(Sex::Female),
            _ => Err(EngineError::validation(format!("unknown sex: {s:?}"))),
        }
    }
}

/// Physical activity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Rest,
    Light,
    Moderate,
    Heavy,
    VeryHeavy,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Rest => "rest",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Heavy => "heavy",
            ActivityLevel::VeryHeavy => "very_heavy",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "rest" | "istirahat" | "sangatringan" => Ok(ActivityLevel::Rest),
            "light" | "ringan" => Ok(ActivityLevel::Light),
            "moderate" | "sedang" | "moderat" => Ok(ActivityLevel::Moderate),
            "heavy" | "berat" => Ok(ActivityLevel::Heavy),
            "veryheavy" | "sangatberat" => Ok(ActivityLevel::VeryHeavy),
            _ => Err(EngineError::validation(format!(
                "unknown activity level: {s:?}"
            ))),
        }
    }
}

/// Whether the patient is healthy or sick (sick enables the stress factor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthCondition {
    Healthy,
    Sick,
}

impl FromStr for HealthCondition {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "healthy" | "sehat" => Ok(HealthCondition::Healthy),
            "sick" | "sakit" => Ok(HealthCondition::Sick),
            _ => Err(EngineError::validation(format!(
                "unknown health condition: {s:?}"
            ))),
        }
    }
}

/// Metabolic stress level applied to sick patients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressFactor {
    None,
    Mild,
    Moderate,
    Severe,
    VerySevere,
    SevereBurn,
}

impl StressFactor {
    pub fn as_str(&self) -> &'static str {
        match self {
            StressFactor::None => "none",
            StressFactor::Mild => "mild",
            StressFactor::Moderate => "moderate",
            StressFactor::Severe => "severe",
            StressFactor::VerySevere => "very_severe",
            StressFactor::SevereBurn => "severe_burn",
        }
    }
}

impl FromStr for StressFactor {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "none" | "tidakstress" | "tidakstres" => Ok(StressFactor::None),
            "mild" | "ringan" => Ok(StressFactor::Mild),
            "moderate" | "sedang" => Ok(StressFactor::Moderate),
            "severe" | "berat" => Ok(StressFactor::Severe),
            "verysevere" | "sangatberat" => Ok(StressFactor::VerySevere),
            "severeburn" | "lukabakarberat" => Ok(StressFactor::SevereBurn),
            _ => Err(EngineError::validation(format!(
                "unknown stress factor: {s:?}"
            ))),
        }
    }
}

/// Clinical diet preset that fixes the macronutrient energy split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietType {
    RegularDiet,
    DiabetesMellitus,
    Dyslipidemia,
    Dash,
    ChronicKidneyNonDialysis,
    ChronicKidneyDialysis,
    LiverDisease,
    LowProtein,
    LowFat,
    HighProtein,
}

impl DietType {
    pub const ALL: [DietType; 10] = [
        DietType::RegularDiet,
        DietType::DiabetesMellitus,
        DietType::Dyslipidemia,
        DietType::Dash,
        DietType::ChronicKidneyNonDialysis,
        DietType::ChronicKidneyDialysis,
        DietType::LiverDisease,
        DietType::LowProtein,
        DietType::LowFat,
        DietType::HighProtein,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DietType::RegularDiet => "regular_diet",
            DietType::DiabetesMellitus => "diabetes_mellitus",
            DietType::Dyslipidemia => "dyslipidemia",
            DietType::Dash => "dash",
            DietType::ChronicKidneyNonDialysis => "chronic_kidney_non_dialysis",
            DietType::ChronicKidneyDialysis => "chronic_kidney_dialysis",
            DietType::LiverDisease => "liver_disease",
            DietType::LowProtein => "low_protein",
            DietType::LowFat => "low_fat",
            DietType::HighProtein => "high_protein",
        }
    }

    /// Human-readable name as used on clinical forms
    pub fn label(&self) -> &'static str {
        match self {
            DietType::RegularDiet => "Regular Diet",
            DietType::DiabetesMellitus => "Diabetes Mellitus",
            DietType::Dyslipidemia => "Dyslipidemia",
            DietType::Dash => "DASH",
            DietType::ChronicKidneyNonDialysis => "Chronic Kidney Disease (Non-Dialysis)",
            DietType::ChronicKidneyDialysis => "Chronic Kidney Disease (Dialysis)",
            DietType::LiverDisease => "Liver Disease",
            DietType::LowProtein => "Low Protein",
            DietType::LowFat => "Low Fat",
            DietType::HighProtein => "High Protein",
        }
    }
}

impl FromStr for DietType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "regulardiet" | "regular" | "dietbiasa" => Ok(DietType::RegularDiet),
            "diabetesmellitus" | "dm" => Ok(DietType::DiabetesMellitus),
            "dyslipidemia" | "dislipidemia" => Ok(DietType::Dyslipidemia),
            "dash" => Ok(DietType::Dash),
            "chronickidneynondialysis" | "penyakitginjalkroniknondialisis" => {
                Ok(DietType::ChronicKidneyNonDialysis)
            }
            "chronickidneydialysis" | "penyakitginjalkronikdialisis" => {
                Ok(DietType::ChronicKidneyDialysis)
            }
            "liverdisease" | "penyakithati" => Ok(DietType::LiverDisease),
            "lowprotein" | "rendahprotein" => Ok(DietType::LowProtein),
            "lowfat" | "rendahlemak" => Ok(DietType::LowFat),
            "highprotein" | "tinggiprotein" => Ok(DietType::HighProtein),
            _ => Err(EngineError::validation(format!("unknown diet type: {s:?}"))),
        }
    }
}

/// Validated patient attributes, immutable per calculation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientAttributes {
    /// Body weight (kg, > 0)
    pub weight_kg: f64,
    /// Body height (cm, > 0)
    pub height_cm: f64,
    /// Age in whole years (> 0)
    pub age_years: u32,
    pub sex: Sex,
    pub activity_level: ActivityLevel,
    pub health_condition: HealthCondition,
    /// Required when `health_condition` is `Sick`, ignored otherwise
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress_factor: Option<StressFactor>,
    pub diet_type: DietType,
}

/// BMI classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

/// Energy split of a diet preset (percent of TEE, always sums to 100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietComposition {
    pub carb_percent: u8,
    pub protein_percent: u8,
    pub fat_percent: u8,
}

/// Output of the profile calculator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionTargets {
    /// Body mass index (kg/m²)
    pub bmi: f64,
    pub bmi_category: BmiCategory,
    /// Ideal body weight (kg, Broca modified)
    pub ideal_body_weight_kg: f64,
    /// Basal metabolic rate (kcal/day, Mifflin-St Jeor)
    pub bmr_kcal: f64,
    /// Total energy expenditure (kcal/day)
    pub tee_kcal: f64,
    /// Activity factor applied to the BMR
    pub activity_factor: f64,
    /// Stress factor applied to the BMR, sick patients only
    pub stress_factor: Option<f64>,
    pub carb_grams_target: f64,
    pub protein_grams_target: f64,
    pub fat_grams_target: f64,
    pub diet_type: DietType,
    pub diet_composition: DietComposition,
}

/// The nine nutrients tracked by the menu evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nutrient {
    Energy,
    Protein,
    Fat,
    Carbohydrate,
    Fiber,
    Sodium,
    Potassium,
    Calcium,
    Iron,
}

impl Nutrient {
    /// All tracked nutrients in report order
    pub const ALL: [Nutrient; 9] = [
        Nutrient::Energy,
        Nutrient::Protein,
        Nutrient::Fat,
        Nutrient::Carbohydrate,
        Nutrient::Fiber,
        Nutrient::Sodium,
        Nutrient::Potassium,
        Nutrient::Calcium,
        Nutrient::Iron,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Nutrient::Energy => "energy",
            Nutrient::Protein => "protein",
            Nutrient::Fat => "fat",
            Nutrient::Carbohydrate => "carbohydrate",
            Nutrient::Fiber => "fiber",
            Nutrient::Sodium => "sodium",
            Nutrient::Potassium => "potassium",
            Nutrient::Calcium => "calcium",
            Nutrient::Iron => "iron",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Nutrient::Energy => "kcal",
            Nutrient::Protein | Nutrient::Fat | Nutrient::Carbohydrate | Nutrient::Fiber => "g",
            Nutrient::Sodium | Nutrient::Potassium | Nutrient::Calcium | Nutrient::Iron => "mg",
        }
    }
}

/// Amounts of the nine tracked nutrients
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientTotals {
    pub energy_kcal: f64,
    pub protein_g: f64,
    pub fat_g: f64,
    pub carbohydrate_g: f64,
    pub fiber_g: f64,
    pub sodium_mg: f64,
    pub potassium_mg: f64,
    pub calcium_mg: f64,
    pub iron_mg: f64,
}

impl NutrientTotals {
    pub fn get(&self, nutrient: Nutrient) -> f64 {
        match nutrient {
            Nutrient::Energy => self.energy_kcal,
            Nutrient::Protein => self.protein_g,
            Nutrient::Fat => self.fat_g,
            Nutrient::Carbohydrate => self.carbohydrate_g,
            Nutrient::Fiber => self.fiber_g,
            Nutrient::Sodium => self.sodium_mg,
            Nutrient::Potassium => self.potassium_mg,
            Nutrient::Calcium => self.calcium_mg,
            Nutrient::Iron => self.iron_mg,
        }
    }

    /// Multiply every nutrient by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            energy_kcal: self.energy_kcal * factor,
            protein_g: self.protein_g * factor,
            fat_g: self.fat_g * factor,
            carbohydrate_g: self.carbohydrate_g * factor,
            fiber_g: self.fiber_g * factor,
            sodium_mg: self.sodium_mg * factor,
            potassium_mg: self.potassium_mg * factor,
            calcium_mg: self.calcium_mg * factor,
            iron_mg: self.iron_mg * factor,
        }
    }

    pub fn is_zero(&self) -> bool {
        Nutrient::ALL.iter().all(|n| self.get(*n) == 0.0)
    }
}

impl Add for NutrientTotals {
    type Output = NutrientTotals;

    fn add(mut self, rhs: NutrientTotals) -> NutrientTotals {
        self += rhs;
        self
    }
}

impl AddAssign for NutrientTotals {
    fn add_assign(&mut self, rhs: NutrientTotals) {
        self.energy_kcal += rhs.energy_kcal;
        self.protein_g += rhs.protein_g;
        self.fat_g += rhs.fat_g;
        self.carbohydrate_g += rhs.carbohydrate_g;
        self.fiber_g += rhs.fiber_g;
        self.sodium_mg += rhs.sodium_mg;
        self.potassium_mg += rhs.potassium_mg;
        self.calcium_mg += rhs.calcium_mg;
        self.iron_mg += rhs.iron_mg;
    }
}

impl Sum for NutrientTotals {
    fn sum<I: Iterator<Item = NutrientTotals>>(iter: I) -> Self {
        iter.fold(NutrientTotals::default(), Add::add)
    }
}

/// The five fixed meal slots of a daily menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealSlot {
    MorningMeal,
    MorningSnack,
    MiddayMeal,
    AfternoonSnack,
    EveningMeal,
}

impl MealSlot {
    /// All slots in the order they are served
    pub const ALL: [MealSlot; 5] = [
        MealSlot::MorningMeal,
        MealSlot::MorningSnack,
        MealSlot::MiddayMeal,
        MealSlot::AfternoonSnack,
        MealSlot::EveningMeal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::MorningMeal => "morning_meal",
            MealSlot::MorningSnack => "morning_snack",
            MealSlot::MiddayMeal => "midday_meal",
            MealSlot::AfternoonSnack => "afternoon_snack",
            MealSlot::EveningMeal => "evening_meal",
        }
    }
}

impl fmt::Display for MealSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealSlot {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "morningmeal" | "breakfast" | "makanpagi" => Ok(MealSlot::MorningMeal),
            "morningsnack" | "snackpagi" => Ok(MealSlot::MorningSnack),
            "middaymeal" | "lunch" | "makansiang" => Ok(MealSlot::MiddayMeal),
            "afternoonsnack" | "snacksore" => Ok(MealSlot::AfternoonSnack),
            "eveningmeal" | "dinner" | "makanmalam" => Ok(MealSlot::EveningMeal),
            _ => Err(EngineError::validation(format!("unknown meal slot: {s:?}"))),
        }
    }
}

/// Adequacy classification of a consumed amount against its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Deficient,
    Adequate,
    Excessive,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Deficient => "deficient",
            Classification::Adequate => "adequate",
            Classification::Excessive => "excessive",
        }
    }
}
