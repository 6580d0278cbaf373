//! Gizi Engine - Clinical nutrition profile calculator and menu adequacy evaluator
//!
//! The engine turns a patient's anthropometric and clinical attributes into
//! daily energy and macronutrient targets, and evaluates a day's menu against
//! those targets through a deterministic pipeline: record validation →
//! anthropometry → energy expenditure → diet split → food scaling → adequacy.
//!
//! ## Modules
//!
//! - **Profile Calculator**: BMI, ideal body weight, BMR, TEE and gram targets
//! - **Menu Evaluator**: food table lookup, portion scaling and adequacy classification

pub mod adequacy;
pub mod anthropometry;
pub mod diet;
pub mod energy;
pub mod error;
pub mod food;
pub mod menu;
pub mod pipeline;
pub mod profile;
pub mod record;
pub mod snapshot;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use adequacy::{adequacy, evaluate_adequacy, evaluate_menu, DailyTargets, MicronutrientReference};
pub use error::EngineError;
pub use food::{scale_food_to_serving, FoodReferenceEntry, FoodTable};
pub use menu::{daily_total, subtotal, MealPlan, SelectedFoodItem};
pub use pipeline::{compute_profile_json, evaluate_menu_json, save_menu_json, NutritionPlanner};
pub use profile::compute_profile;
pub use record::PatientRecord;

/// Engine version embedded in all snapshots
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for snapshots
pub const PRODUCER_NAME: &str = "gizi-engine";
