//! Domain models for the spy cat agency.
//!
//! # Entities
//!
//! - [`Cat`]: A field agent. Independent lifetime; availability is driven by
//!   the missions it is assigned to.
//! - [`Mission`]: Optionally references one cat and owns 1 to
//!   [`MAX_TARGETS`] targets. Completion is terminal.
//! - [`Target`]: Owned by exactly one mission, deleted with it. Carries
//!   append-only notes.
//!
//! Each entity exposes a derived status enum ([`CatStatus`],
//! [`MissionStatus`], [`TargetStatus`]) that the lifecycle guards match on.

mod cat;
mod mission;
mod target;

pub use cat::*;
pub use mission::*;
pub use target::*;

use crate::error::{Error, Result};

/// Shortest accepted name or country.
pub const MIN_TEXT_LEN: usize = 2;
/// Longest accepted name or country.
pub const MAX_TEXT_LEN: usize = 100;

/// Character-count check shared by every name/country field. The value is
/// measured exactly as it will be stored.
pub(crate) fn validate_length(field: &str, value: &str) -> Result<()> {
    let len = value.chars().count();
    if !(MIN_TEXT_LEN..=MAX_TEXT_LEN).contains(&len) {
        return Err(Error::validation(format!(
            "{field} must be between {MIN_TEXT_LEN} and {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(())
}
