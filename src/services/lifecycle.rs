//! Transition validation for cats, missions and targets.
//!
//! Every state-machine rejection the services produce comes from one of the
//! `check_*` functions below, so the rules can be read (and tested) in one
//! place. The functions only look at already-loaded rows; they never touch
//! storage.

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::*;

/// A mutation requested against a mission.
#[derive(Debug, Clone, Copy)]
pub enum MissionAction<'a> {
    AssignCat,
    Update,
    Delete,
    /// Adding one more target to a mission that already holds `existing`.
    AddTarget { existing: usize },
    Complete { targets: &'a [Target] },
}

/// A mutation requested against a target, addressed through a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetAction {
    Update,
    Delete,
    Complete,
    AppendNotes,
}

pub fn check_mission(mission: &Mission, action: MissionAction<'_>) -> Result<()> {
    use MissionAction as A;
    use MissionStatus::{Active, Completed};

    match (mission.status(), action) {
        (_, A::Delete) if mission.cat_id.is_some() => Err(Error::invalid(
            "cannot delete mission that is assigned to a cat",
        )),
        (_, A::Delete) => Ok(()),

        (Completed, A::AssignCat) => Err(Error::invalid("cannot assign cat to completed mission")),
        (Completed, A::Update) => Err(Error::invalid("cannot update completed mission")),
        (Completed, A::AddTarget { .. }) => {
            Err(Error::invalid("cannot add target to completed mission"))
        }
        (Completed, A::Complete { .. }) => Err(Error::invalid("mission is already completed")),

        (Active, A::AddTarget { existing }) if existing >= MAX_TARGETS => Err(Error::invalid(
            format!("mission already has maximum number of targets ({MAX_TARGETS})"),
        )),
        (Active, A::Complete { targets }) if targets.is_empty() => {
            Err(Error::invalid("mission has no targets"))
        }
        (Active, A::Complete { targets })
            if targets.iter().any(|t| t.status() == TargetStatus::Open) =>
        {
            Err(Error::invalid(
                "cannot complete mission: not all targets are completed",
            ))
        }
        (Active, _) => Ok(()),
    }
}

/// Validate a target mutation. A target that belongs to another mission is
/// reported exactly like a target that does not exist.
pub fn check_target(mission: &Mission, target: &Target, action: TargetAction) -> Result<()> {
    use MissionStatus as M;
    use TargetAction as A;
    use TargetStatus as T;

    if target.mission_id != mission.id {
        return Err(target_not_found(mission.id, target.id));
    }

    match (mission.status(), target.status(), action) {
        (M::Completed, _, A::Update) | (_, T::Completed, A::Update) => Err(Error::invalid(
            "cannot update target in completed mission or completed target",
        )),

        (_, T::Completed, A::Delete) => Err(Error::invalid("cannot delete completed target")),
        (M::Completed, _, A::Delete) => {
            Err(Error::invalid("cannot delete target from completed mission"))
        }

        (_, T::Completed, A::Complete) => Err(Error::invalid("target is already completed")),
        (M::Completed, _, A::Complete) => {
            Err(Error::invalid("cannot complete target in completed mission"))
        }

        (_, T::Completed, A::AppendNotes) => {
            Err(Error::invalid("cannot update notes for completed target"))
        }
        (M::Completed, _, A::AppendNotes) => {
            Err(Error::invalid("cannot update notes in completed mission"))
        }

        (M::Active, T::Open, _) => Ok(()),
    }
}

pub fn check_cat_assignable(cat: &Cat) -> Result<()> {
    match cat.status() {
        CatStatus::Available => Ok(()),
        CatStatus::Assigned => Err(Error::invalid("cat is not available")),
    }
}

/// A cat may only be deleted while it holds no active mission.
pub fn check_cat_deletable(active_mission: Option<Uuid>) -> Result<()> {
    match active_mission {
        Some(mission_id) => Err(Error::invalid(format!(
            "cannot delete cat assigned to an active mission ({mission_id})"
        ))),
        None => Ok(()),
    }
}

pub fn target_not_found(mission_id: Uuid, target_id: Uuid) -> Error {
    Error::not_found(format!(
        "target {target_id} not found in mission {mission_id}"
    ))
}
