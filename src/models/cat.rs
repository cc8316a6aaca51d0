use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validate_length;
use crate::error::{Error, Result};

/// Longest career the agency will hire for.
pub const MAX_YEARS_EXPERIENCE: i64 = 50;

/// A field agent.
///
/// Cats are created available. Availability is owned by the mission
/// lifecycle: it flips off when the cat is attached to an active mission and
/// back on when that mission completes or the cat is reassigned away.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cat {
    pub id: Uuid,
    pub name: String,
    pub years_experience: i64,
    pub breed: String,
    pub salary: f64,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cat {
    pub fn status(&self) -> CatStatus {
        if self.is_available {
            CatStatus::Available
        } else {
            CatStatus::Assigned
        }
    }
}

/// Derived assignment state of a cat.
///
/// - `Available`: free to take a mission
/// - `Assigned`: current assignee of an active mission
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CatStatus {
    Available,
    Assigned,
}

/// Input for hiring a new cat. The breed is checked against the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCatInput {
    pub name: String,
    pub years_experience: i64,
    pub breed: String,
    pub salary: f64,
}

impl CreateCatInput {
    pub fn validate(&self) -> Result<()> {
        validate_length("name", &self.name)?;
        if !(0..=MAX_YEARS_EXPERIENCE).contains(&self.years_experience) {
            return Err(Error::validation(format!(
                "years_experience must be between 0 and {MAX_YEARS_EXPERIENCE}"
            )));
        }
        if self.breed.trim().is_empty() {
            return Err(Error::validation("breed is required"));
        }
        validate_salary(self.salary)
    }
}

/// Input for updating a cat. Salary is the only mutable field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateCatInput {
    pub salary: f64,
}

impl UpdateCatInput {
    pub fn validate(&self) -> Result<()> {
        validate_salary(self.salary)
    }
}

fn validate_salary(salary: f64) -> Result<()> {
    if !salary.is_finite() || salary < 0.0 {
        return Err(Error::validation("salary must be a non-negative number"));
    }
    Ok(())
}
