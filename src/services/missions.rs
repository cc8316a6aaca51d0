use uuid::Uuid;

use super::cats;
use super::lifecycle::{self, MissionAction, TargetAction};
use crate::db::{Database, Store};
use crate::error::{Error, Result};
use crate::models::*;

/// Mission and target lifecycle.
///
/// This is the only component that writes cat availability. Every operation
/// that touches more than one row runs in a single storage transaction, so a
/// rejected or failed step leaves no partial state behind.
#[derive(Clone)]
pub struct MissionService {
    db: Database,
}

impl MissionService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    // ============================================================
    // Missions
    // ============================================================

    pub fn create(&self, input: CreateMissionInput) -> Result<MissionWithTargets> {
        input.validate()?;

        let created = self.db.transaction(|store| {
            if let Some(cat_id) = input.cat_id {
                cats::ensure_assignable(store, cat_id)?;
            }

            let mission = store.create_mission(input.cat_id)?;
            for target in &input.targets {
                store.create_target(mission.id, target)?;
            }

            if let Some(cat_id) = input.cat_id {
                cats::claim(store, cat_id)?;
            }

            load_with_targets(store, mission.id)
        })?;

        tracing::info!(
            "Created mission {} with {} target(s)",
            created.mission.id,
            created.targets.len()
        );
        Ok(created)
    }

    pub fn get(&self, id: Uuid) -> Result<MissionWithTargets> {
        self.db.read(|store| load_with_targets(store, id))
    }

    pub fn list(&self) -> Result<Vec<MissionWithTargets>> {
        self.db.read(|store| {
            store
                .list_missions()?
                .into_iter()
                .map(|mission| store.expand_mission(mission))
                .collect()
        })
    }

    /// Change the assignee. Naming the current cat, or no cat, leaves the
    /// assignment alone.
    pub fn update(&self, id: Uuid, input: UpdateMissionInput) -> Result<MissionWithTargets> {
        self.db.transaction(|store| {
            let mission = load(store, id)?;
            lifecycle::check_mission(&mission, MissionAction::Update)?;

            match input.cat_id {
                Some(cat_id) if mission.cat_id != Some(cat_id) => {
                    reassign(store, &mission, cat_id)?
                }
                _ => {}
            }

            load_with_targets(store, id)
        })
    }

    pub fn assign_cat(&self, id: Uuid, cat_id: Uuid) -> Result<MissionWithTargets> {
        self.db.transaction(|store| {
            let mission = load(store, id)?;
            lifecycle::check_mission(&mission, MissionAction::AssignCat)?;
            reassign(store, &mission, cat_id)?;
            load_with_targets(store, id)
        })
    }

    /// Close the mission and free its cat. Every target must already be
    /// completed; completing the last target never completes the mission.
    pub fn complete(&self, id: Uuid) -> Result<MissionWithTargets> {
        let completed = self.db.transaction(|store| {
            let mission = load(store, id)?;
            let targets = store.list_targets_by_mission(id)?;
            lifecycle::check_mission(&mission, MissionAction::Complete { targets: &targets })?;

            store.mark_mission_complete(id)?;
            if let Some(cat_id) = mission.cat_id {
                cats::release(store, cat_id)?;
            }

            load_with_targets(store, id)
        })?;

        tracing::info!("Completed mission {}", id);
        Ok(completed)
    }

    pub fn delete(&self, id: Uuid) -> Result<()> {
        self.db.transaction(|store| {
            let mission = load(store, id)?;
            lifecycle::check_mission(&mission, MissionAction::Delete)?;
            store.delete_mission(id)?;
            Ok(())
        })?;

        tracing::info!("Deleted mission {}", id);
        Ok(())
    }

    // ============================================================
    // Targets
    // ============================================================

    pub fn add_target(&self, mission_id: Uuid, input: TargetInput) -> Result<Target> {
        input.validate()?;

        self.db.transaction(|store| {
            let mission = load(store, mission_id)?;
            let existing = store.count_targets_by_mission(mission_id)?;
            lifecycle::check_mission(&mission, MissionAction::AddTarget { existing })?;
            store.create_target(mission_id, &input)
        })
    }

    pub fn update_target(
        &self,
        mission_id: Uuid,
        target_id: Uuid,
        input: TargetInput,
    ) -> Result<Target> {
        input.validate()?;

        self.db.transaction(|store| {
            guard_target(store, mission_id, target_id, TargetAction::Update)?;
            store.update_target(target_id, &input)?;
            reload_target(store, mission_id, target_id)
        })
    }

    pub fn delete_target(&self, mission_id: Uuid, target_id: Uuid) -> Result<()> {
        self.db.transaction(|store| {
            guard_target(store, mission_id, target_id, TargetAction::Delete)?;
            store.delete_target(target_id)?;
            Ok(())
        })
    }

    pub fn complete_target(&self, mission_id: Uuid, target_id: Uuid) -> Result<Target> {
        let target = self.db.transaction(|store| {
            guard_target(store, mission_id, target_id, TargetAction::Complete)?;
            store.mark_target_complete(target_id)?;
            reload_target(store, mission_id, target_id)
        })?;

        tracing::info!("Completed target {} of mission {}", target_id, mission_id);
        Ok(target)
    }

    /// Append to the target's notes; earlier notes are never overwritten.
    pub fn update_target_notes(
        &self,
        mission_id: Uuid,
        target_id: Uuid,
        input: UpdateNotesInput,
    ) -> Result<Target> {
        input.validate()?;

        self.db.transaction(|store| {
            guard_target(store, mission_id, target_id, TargetAction::AppendNotes)?;
            store.append_target_notes(target_id, &input.notes)?;
            reload_target(store, mission_id, target_id)
        })
    }
}

fn mission_not_found(id: Uuid) -> Error {
    Error::not_found(format!("mission {id} not found"))
}

fn load(store: &Store<'_>, id: Uuid) -> Result<Mission> {
    store.get_mission(id)?.ok_or_else(|| mission_not_found(id))
}

fn load_with_targets(store: &Store<'_>, id: Uuid) -> Result<MissionWithTargets> {
    store
        .get_mission_with_targets(id)?
        .ok_or_else(|| mission_not_found(id))
}

/// Resolve a target through its mission and run the transition guard.
fn guard_target(
    store: &Store<'_>,
    mission_id: Uuid,
    target_id: Uuid,
    action: TargetAction,
) -> Result<()> {
    let target = store
        .get_target(target_id)?
        .ok_or_else(|| lifecycle::target_not_found(mission_id, target_id))?;
    let mission = load(store, mission_id)?;
    lifecycle::check_target(&mission, &target, action)
}

fn reload_target(store: &Store<'_>, mission_id: Uuid, target_id: Uuid) -> Result<Target> {
    store
        .get_target(target_id)?
        .ok_or_else(|| lifecycle::target_not_found(mission_id, target_id))
}

/// Attach `cat_id` to an active mission, releasing the previous assignee.
fn reassign(store: &Store<'_>, mission: &Mission, cat_id: Uuid) -> Result<()> {
    cats::ensure_assignable(store, cat_id)?;

    if let Some(previous) = mission.cat_id {
        cats::release(store, previous)?;
    }
    store.assign_cat_to_mission(mission.id, cat_id)?;
    cats::claim(store, cat_id)?;

    tracing::info!(
        "Assigned cat {} to mission {} (previous: {:?})",
        cat_id,
        mission.id,
        mission.cat_id
    );
    Ok(())
}
