//! Snapshot encoding
//!
//! Wraps computed profiles and evaluated menus into immutable, identified
//! records. A snapshot is created once and never edited; recalculating
//! produces a new one with a fresh id and timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::adequacy::{AdequacyReport, DailyTargets, MenuEvaluation};
use crate::error::EngineError;
use crate::menu::{MealPlan, MenuSummary};
use crate::types::{NutritionTargets, PatientAttributes};
use crate::{ENGINE_VERSION, PRODUCER_NAME};

/// Current snapshot schema version
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Engine instance that produced a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// A patient's attributes together with the targets computed from them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub snapshot_version: String,
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub producer: Producer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    pub attributes: PatientAttributes,
    pub targets: NutritionTargets,
}

/// A saved menu with its breakdown and adequacy at the time of saving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuSnapshot {
    pub snapshot_version: String,
    pub id: Uuid,
    /// Profile the targets were derived from, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_record_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub producer: Producer,
    pub plan: MealPlan,
    pub summary: MenuSummary,
    pub targets: DailyTargets,
    pub adequacy: AdequacyReport,
}

/// Encoder that stamps snapshots with ids, timestamps and producer metadata
pub struct SnapshotEncoder {
    instance_id: String,
}

impl Default for SnapshotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    fn producer(&self) -> Producer {
        Producer {
            name: PRODUCER_NAME.to_string(),
            version: ENGINE_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        }
    }

    /// Record a computed profile
    pub fn encode_profile(
        &self,
        patient_name: Option<String>,
        attributes: PatientAttributes,
        targets: NutritionTargets,
    ) -> ProfileRecord {
        ProfileRecord {
            snapshot_version: SNAPSHOT_VERSION.to_string(),
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            producer: self.producer(),
            patient_name,
            attributes,
            targets,
        }
    }

    /// Record an evaluated menu.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Validation` when the plan has no items.
    pub fn encode_menu(
        &self,
        plan: &MealPlan,
        evaluation: MenuEvaluation,
        patient_record_id: Option<Uuid>,
    ) -> Result<MenuSnapshot, EngineError> {
        if plan.is_empty() {
            return Err(EngineError::validation("cannot save an empty menu"));
        }

        Ok(MenuSnapshot {
            snapshot_version: SNAPSHOT_VERSION.to_string(),
            id: Uuid::new_v4(),
            patient_record_id,
            created_at: Utc::now(),
            producer: self.producer(),
            plan: plan.clone(),
            summary: evaluation.summary,
            targets: evaluation.targets,
            adequacy: evaluation.adequacy,
        })
    }

    /// Encode any snapshot to pretty-printed JSON
    pub fn to_json<T: Serialize>(&self, snapshot: &T) -> Result<String, EngineError> {
        serde_json::to_string_pretty(snapshot).map_err(|e| EngineError::Encoding(e.to_string()))
    }
}
