//! Daily meal plans
//!
//! A `MealPlan` maps each of the five meal slots to an ordered list of
//! selected foods. Plans are edited during a planning session and summed into
//! per-slot subtotals and a daily total against a `FoodTable`.

use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::EngineError;
use crate::food::{clamp_raw_weight, scale_food_to_serving, FoodTable};
use crate::types::{MealSlot, NutrientTotals};

/// Raw weight used when a food is added without one (g)
pub const DEFAULT_PORTION_GRAMS: i64 = 100;

/// A food chosen for a meal slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFoodItem {
    pub food_code: String,
    /// Raw (as purchased) weight, always within `[1, 10000]` g
    #[serde(deserialize_with = "deserialize_raw_weight")]
    pub raw_weight_grams: u32,
}

/// Any JSON number a stored plan may carry as a weight
#[derive(Deserialize)]
#[serde(untagged)]
enum RawWeight {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
}

impl RawWeight {
    /// Whole grams, truncating fractions and saturating at the `i64` range
    fn whole_grams(self) -> i64 {
        match self {
            RawWeight::Signed(v) => v,
            RawWeight::Unsigned(v) => i64::try_from(v).unwrap_or(i64::MAX),
            // `as` saturates and maps NaN to 0
            RawWeight::Float(v) => v.trunc() as i64,
        }
    }
}

fn deserialize_raw_weight<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = RawWeight::deserialize(deserializer)?;
    Ok(clamp_raw_weight(raw.whole_grams()))
}

impl SelectedFoodItem {
    /// Create an item, clamping the weight into range
    pub fn new(food_code: impl Into<String>, raw_weight_grams: i64) -> Self {
        Self {
            food_code: food_code.into(),
            raw_weight_grams: clamp_raw_weight(raw_weight_grams),
        }
    }
}

/// Foods selected for each meal slot of one day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPlan {
    #[serde(default)]
    pub morning_meal: Vec<SelectedFoodItem>,
    #[serde(default)]
    pub morning_snack: Vec<SelectedFoodItem>,
    #[serde(default)]
    pub midday_meal: Vec<SelectedFoodItem>,
    #[serde(default)]
    pub afternoon_snack: Vec<SelectedFoodItem>,
    #[serde(default)]
    pub evening_meal: Vec<SelectedFoodItem>,
}

impl MealPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self, slot: MealSlot) -> &[SelectedFoodItem] {
        match slot {
            MealSlot::MorningMeal => &self.morning_meal,
            MealSlot::MorningSnack => &self.morning_snack,
            MealSlot::MiddayMeal => &self.midday_meal,
            MealSlot::AfternoonSnack => &self.afternoon_snack,
            MealSlot::EveningMeal => &self.evening_meal,
        }
    }

    fn items_mut(&mut self, slot: MealSlot) -> &mut Vec<SelectedFoodItem> {
        match slot {
            MealSlot::MorningMeal => &mut self.morning_meal,
            MealSlot::MorningSnack => &mut self.morning_snack,
            MealSlot::MiddayMeal => &mut self.midday_meal,
            MealSlot::AfternoonSnack => &mut self.afternoon_snack,
            MealSlot::EveningMeal => &mut self.evening_meal,
        }
    }

    /// Append a food to a slot.
    ///
    /// A missing weight means the default 100 g portion; a given weight is
    /// clamped. The code must exist in `table`.
    pub fn add_item(
        &mut self,
        table: &FoodTable,
        slot: MealSlot,
        food_code: &str,
        raw_weight_grams: Option<i64>,
    ) -> Result<&SelectedFoodItem, EngineError> {
        table.get(food_code)?;

        let item = SelectedFoodItem::new(food_code, raw_weight_grams.unwrap_or(DEFAULT_PORTION_GRAMS));
        let items = self.items_mut(slot);
        items.push(item);
        Ok(&items[items.len() - 1])
    }

    /// Remove and return the item at `index` in `slot`
    pub fn remove_item(&mut self, slot: MealSlot, index: usize) -> Result<SelectedFoodItem, EngineError> {
        let items = self.items_mut(slot);
        if index >= items.len() {
            return Err(EngineError::ItemNotFound { slot, index });
        }
        Ok(items.remove(index))
    }

    /// Change the raw weight of an item, clamping into range
    pub fn update_weight(
        &mut self,
        slot: MealSlot,
        index: usize,
        raw_weight_grams: i64,
    ) -> Result<&SelectedFoodItem, EngineError> {
        let item = self
            .items_mut(slot)
            .get_mut(index)
            .ok_or(EngineError::ItemNotFound { slot, index })?;
        item.raw_weight_grams = clamp_raw_weight(raw_weight_grams);
        Ok(item)
    }

    pub fn item_count(&self) -> usize {
        MealSlot::ALL.iter().map(|s| self.items(*s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.item_count() == 0
    }

    pub fn clear(&mut self) {
        for slot in MealSlot::ALL {
            self.items_mut(slot).clear();
        }
    }
}

/// Sum the nutrients of the items in one meal slot.
///
/// # Errors
///
/// Returns `EngineError::ReferenceNotFound` if an item's code is not in `table`.
pub fn subtotal(items: &[SelectedFoodItem], table: &FoodTable) -> Result<NutrientTotals, EngineError> {
    items.iter().try_fold(NutrientTotals::default(), |acc, item| {
        let entry = table.get(&item.food_code)?;
        let contribution = scale_food_to_serving(entry, i64::from(item.raw_weight_grams));
        Ok(acc + contribution.nutrients)
    })
}

/// Sum of the subtotals of all five meal slots
pub fn daily_total(plan: &MealPlan, table: &FoodTable) -> Result<NutrientTotals, EngineError> {
    MealSlot::ALL
        .iter()
        .map(|slot| subtotal(plan.items(*slot), table))
        .sum()
}

/// One selected food with its resolved name and scaled nutrients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemLine {
    pub food_code: String,
    pub name: String,
    pub raw_weight_grams: u32,
    pub serving_weight_grams: f64,
    pub nutrients: NutrientTotals,
}

/// Lines and subtotal for one meal slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSummary {
    pub slot: MealSlot,
    pub items: Vec<ItemLine>,
    pub subtotal: NutrientTotals,
}

/// Per-slot breakdown of a plan plus its daily total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuSummary {
    pub slots: Vec<SlotSummary>,
    pub daily_total: NutrientTotals,
}

/// Resolve every item of `plan` against `table` into a full breakdown
pub fn summarize_menu(plan: &MealPlan, table: &FoodTable) -> Result<MenuSummary, EngineError> {
    let mut slots = Vec::with_capacity(MealSlot::ALL.len());

    for slot in MealSlot::ALL {
        let mut lines = Vec::with_capacity(plan.items(slot).len());

        for item in plan.items(slot) {
            let entry = table.get(&item.food_code)?;
            let contribution = scale_food_to_serving(entry, i64::from(item.raw_weight_grams));
            lines.push(ItemLine {
                food_code: entry.code.clone(),
                name: entry.name.clone(),
                raw_weight_grams: contribution.raw_weight_grams,
                serving_weight_grams: contribution.serving_weight_grams,
                nutrients: contribution.nutrients,
            });
        }

        let subtotal: NutrientTotals = lines.iter().map(|l| l.nutrients).sum();
        slots.push(SlotSummary {
            slot,
            items: lines,
            subtotal,
        });
    }

    let daily_total: NutrientTotals = slots.iter().map(|s| s.subtotal).sum();

    debug!(
        items = plan.item_count(),
        energy_kcal = daily_total.energy_kcal,
        "summarized menu"
    );

    Ok(MenuSummary { slots, daily_total })
}
