use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validate_length;
use crate::error::{Error, Result};

/// A person or asset a mission is after.
///
/// Notes are append-only. Once a target is completed its name, country and
/// notes are frozen.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Target {
    pub id: Uuid,
    pub mission_id: Uuid,
    pub name: String,
    pub country: String,
    pub notes: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Target {
    pub fn status(&self) -> TargetStatus {
        if self.is_completed {
            TargetStatus::Completed
        } else {
            TargetStatus::Open
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    Open,
    Completed,
}

/// Name and country of a target, used both for creation and for edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetInput {
    pub name: String,
    pub country: String,
}

impl TargetInput {
    pub fn validate(&self) -> Result<()> {
        validate_length("name", &self.name)?;
        validate_length("country", &self.country)
    }
}

/// Text to append to a target's notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateNotesInput {
    pub notes: String,
}

impl UpdateNotesInput {
    pub fn validate(&self) -> Result<()> {
        if self.notes.is_empty() {
            return Err(Error::validation("notes must not be empty"));
        }
        Ok(())
    }
}
