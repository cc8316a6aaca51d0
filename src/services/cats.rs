use std::sync::Arc;

use uuid::Uuid;

use super::lifecycle;
use crate::breeds::BreedValidator;
use crate::db::{Database, Store};
use crate::error::{Error, Result};
use crate::models::*;

/// Hiring, salary changes and dismissal of cats.
///
/// Availability is not writable from here; it belongs to the mission
/// lifecycle, which goes through [`claim`] and [`release`].
#[derive(Clone)]
pub struct CatService {
    db: Database,
    breeds: Arc<dyn BreedValidator>,
}

impl CatService {
    pub fn new(db: Database, breeds: Arc<dyn BreedValidator>) -> Self {
        Self { db, breeds }
    }

    pub async fn create(&self, input: CreateCatInput) -> Result<Cat> {
        input.validate()?;

        match self.breeds.is_known_breed(&input.breed).await {
            Ok(true) => {}
            Ok(false) => {
                return Err(Error::validation(format!(
                    "invalid breed: breed '{}' not found in breed catalog",
                    input.breed
                )))
            }
            Err(e) => {
                tracing::error!("Breed lookup for '{}' failed: {}", input.breed, e);
                return Err(Error::UpstreamUnavailable(e.to_string()));
            }
        }

        let cat = self.db.read(|store| store.create_cat(&input))?;
        tracing::info!("Hired cat {} ({})", cat.id, cat.name);
        Ok(cat)
    }

    pub fn get(&self, id: Uuid) -> Result<Cat> {
        self.db.read(|store| load(store, id))
    }

    pub fn list(&self) -> Result<Vec<Cat>> {
        self.db.read(|store| store.list_cats())
    }

    pub fn update(&self, id: Uuid, input: UpdateCatInput) -> Result<Cat> {
        input.validate()?;
        self.db
            .read(|store| store.update_cat_salary(id, input.salary))?
            .ok_or_else(|| cat_not_found(id))
    }

    /// Removes the cat. Refused while the cat holds an active mission;
    /// completed missions keep existing with their cat reference cleared.
    pub fn delete(&self, id: Uuid) -> Result<()> {
        self.db.transaction(|store| {
            lifecycle::check_cat_deletable(store.active_mission_for_cat(id)?)?;
            if !store.delete_cat(id)? {
                return Err(cat_not_found(id));
            }
            Ok(())
        })?;
        tracing::info!("Dismissed cat {}", id);
        Ok(())
    }
}

fn cat_not_found(id: Uuid) -> Error {
    Error::not_found(format!("cat {id} not found"))
}

fn load(store: &Store<'_>, id: Uuid) -> Result<Cat> {
    store.get_cat(id)?.ok_or_else(|| cat_not_found(id))
}

/// Load a cat and confirm it can take a mission.
pub(super) fn ensure_assignable(store: &Store<'_>, id: Uuid) -> Result<Cat> {
    let cat = load(store, id)?;
    lifecycle::check_cat_assignable(&cat)?;
    Ok(cat)
}

/// Flip an available cat to unavailable. Fails if another writer got there
/// first.
pub(super) fn claim(store: &Store<'_>, id: Uuid) -> Result<()> {
    if !store.claim_cat(id)? {
        return Err(Error::invalid("cat is not available"));
    }
    Ok(())
}

pub(super) fn release(store: &Store<'_>, id: Uuid) -> Result<()> {
    if !store.set_cat_availability(id, true)? {
        tracing::warn!("Released cat {} no longer exists", id);
    }
    Ok(())
}
