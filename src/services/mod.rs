//! Cat and mission lifecycle managers.
//!
//! [`CatService`] owns cat records. [`MissionService`] orchestrates missions,
//! targets and the availability of the cats assigned to them. The rules both
//! enforce live in [`lifecycle`].

mod cats;
pub mod lifecycle;
mod missions;

use std::sync::Arc;

pub use cats::CatService;
pub use missions::MissionService;

use crate::breeds::BreedValidator;
use crate::db::Database;

/// Both managers over one database, shared by the HTTP handlers.
#[derive(Clone)]
pub struct Services {
    pub cats: CatService,
    pub missions: MissionService,
}

impl Services {
    pub fn new(db: Database, breeds: Arc<dyn BreedValidator>) -> Self {
        Self {
            cats: CatService::new(db.clone(), breeds),
            missions: MissionService::new(db),
        }
    }
}
