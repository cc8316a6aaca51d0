use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::cat::Cat;
use super::target::{Target, TargetInput};
use crate::error::{Error, Result};

/// Hard cap on targets per mission, at creation and afterwards.
pub const MAX_TARGETS: usize = 3;

/// An assignment of up to one cat against a small set of targets.
///
/// Completion is terminal: a completed mission accepts no further target
/// changes or reassignment. The `cat_id` of a completed mission is kept as a
/// historical reference; the cat itself was released at completion time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mission {
    pub id: Uuid,
    pub cat_id: Option<Uuid>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Mission {
    pub fn status(&self) -> MissionStatus {
        if self.is_completed {
            MissionStatus::Completed
        } else {
            MissionStatus::Active
        }
    }
}

/// The lifecycle state of a mission.
///
/// `Active` covers both the unassigned and assigned sub-states; whether a cat
/// is attached is read from `cat_id`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    Active,
    Completed,
}

/// A mission with its assigned cat (if any) and its targets in creation
/// order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MissionWithTargets {
    #[serde(flatten)]
    pub mission: Mission,
    #[serde(default)]
    pub cat: Option<Cat>,
    pub targets: Vec<Target>,
}

/// Input for creating a mission together with its initial targets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMissionInput {
    /// Cat to attach immediately. Must exist and be available.
    #[serde(default)]
    pub cat_id: Option<Uuid>,
    pub targets: Vec<TargetInput>,
}

impl CreateMissionInput {
    pub fn validate(&self) -> Result<()> {
        if self.targets.is_empty() || self.targets.len() > MAX_TARGETS {
            return Err(Error::validation(format!(
                "a mission needs between 1 and {MAX_TARGETS} targets"
            )));
        }
        self.targets.iter().try_for_each(TargetInput::validate)
    }
}

/// Input for updating a mission. Only the assignee can change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMissionInput {
    #[serde(default)]
    pub cat_id: Option<Uuid>,
}

/// Input for assigning a cat to a mission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignCatInput {
    pub cat_id: Uuid,
}
