mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{types::Type, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::*;

/// Handle to the SQLite store.
///
/// A single connection sits behind a mutex, so every [`Database::read`] or
/// [`Database::transaction`] call runs alone. Multi-entity operations get
/// their atomicity from `transaction`.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> anyhow::Result<Self> {
        Self::open(Self::default_path()?)
    }

    /// Location used when no database path is configured.
    pub fn default_path() -> anyhow::Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "spycat")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(dirs.data_dir().join("spycat.db"))
    }

    pub fn open_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> anyhow::Result<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow::anyhow!("database lock poisoned"))?;
        schema::run_migrations(&conn)
    }

    /// Run `f` against the store without opening a transaction.
    pub fn read<T>(&self, f: impl FnOnce(&Store<'_>) -> Result<T>) -> Result<T> {
        let conn = self.lock()?;
        f(&Store { conn: &*conn })
    }

    /// Run `f` inside a single transaction. Commits on `Ok`, rolls every
    /// write back on `Err`.
    pub fn transaction<T>(&self, f: impl FnOnce(&Store<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let result = f(&Store { conn: &*tx });

        match result {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                match &e {
                    Error::Storage(_) => {
                        tracing::warn!("Rolling back transaction after storage failure: {}", e)
                    }
                    _ => tracing::debug!("Rolling back transaction: {}", e),
                }
                if let Err(rollback) = tx.rollback() {
                    tracing::error!("Transaction rollback failed: {}", rollback);
                }
                Err(e)
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Storage(anyhow::anyhow!("database lock poisoned")))
    }
}

/// Row-level access to cats, missions and targets.
///
/// Lookups by id return `Ok(None)` when the row does not exist; mutations
/// return whether a row was touched. No lifecycle rules are applied here.
pub struct Store<'c> {
    conn: &'c Connection,
}

const CAT_COLUMNS: &str =
    "id, name, years_experience, breed, salary, is_available, created_at, updated_at";
const MISSION_COLUMNS: &str = "id, cat_id, is_completed, created_at, updated_at";
const TARGET_COLUMNS: &str =
    "id, mission_id, name, country, notes, is_completed, created_at, updated_at";

impl Store<'_> {
    // ============================================================
    // Cat operations
    // ============================================================

    pub fn create_cat(&self, input: &CreateCatInput) -> Result<Cat> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        self.conn.execute(
            "INSERT INTO cats (id, name, years_experience, breed, salary, is_available, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, 1, ?, ?)",
            (
                id.to_string(),
                &input.name,
                input.years_experience,
                &input.breed,
                input.salary,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Cat {
            id,
            name: input.name.clone(),
            years_experience: input.years_experience,
            breed: input.breed.clone(),
            salary: input.salary,
            is_available: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_cat(&self, id: Uuid) -> Result<Option<Cat>> {
        let cat = self
            .conn
            .query_row(
                &format!("SELECT {CAT_COLUMNS} FROM cats WHERE id = ?"),
                [id.to_string()],
                cat_from_row,
            )
            .optional()?;
        Ok(cat)
    }

    pub fn list_cats(&self) -> Result<Vec<Cat>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {CAT_COLUMNS} FROM cats ORDER BY created_at, rowid"
        ))?;
        let cats = stmt
            .query_map([], cat_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(cats)
    }

    pub fn update_cat_salary(&self, id: Uuid, salary: f64) -> Result<Option<Cat>> {
        let rows = self.conn.execute(
            "UPDATE cats SET salary = ?, updated_at = ? WHERE id = ?",
            (salary, Utc::now().to_rfc3339(), id.to_string()),
        )?;
        if rows == 0 {
            return Ok(None);
        }
        self.get_cat(id)
    }

    pub fn delete_cat(&self, id: Uuid) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM cats WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    pub fn set_cat_availability(&self, id: Uuid, available: bool) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE cats SET is_available = ?, updated_at = ? WHERE id = ?",
            (available, Utc::now().to_rfc3339(), id.to_string()),
        )?;
        Ok(rows > 0)
    }

    /// Mark an available cat unavailable. Returns `false` if the cat is
    /// missing or already taken, leaving it untouched.
    pub fn claim_cat(&self, id: Uuid) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE cats SET is_available = 0, updated_at = ? WHERE id = ? AND is_available = 1",
            (Utc::now().to_rfc3339(), id.to_string()),
        )?;
        Ok(rows > 0)
    }

    // ============================================================
    // Mission operations
    // ============================================================

    pub fn create_mission(&self, cat_id: Option<Uuid>) -> Result<Mission> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        self.conn.execute(
            "INSERT INTO missions (id, cat_id, is_completed, created_at, updated_at)
             VALUES (?, ?, 0, ?, ?)",
            (
                id.to_string(),
                cat_id.map(|u| u.to_string()),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Mission {
            id,
            cat_id,
            is_completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_mission(&self, id: Uuid) -> Result<Option<Mission>> {
        let mission = self
            .conn
            .query_row(
                &format!("SELECT {MISSION_COLUMNS} FROM missions WHERE id = ?"),
                [id.to_string()],
                mission_from_row,
            )
            .optional()?;
        Ok(mission)
    }

    pub fn list_missions(&self) -> Result<Vec<Mission>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {MISSION_COLUMNS} FROM missions ORDER BY created_at, rowid"
        ))?;
        let missions = stmt
            .query_map([], mission_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(missions)
    }

    pub fn assign_cat_to_mission(&self, id: Uuid, cat_id: Uuid) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE missions SET cat_id = ?, updated_at = ? WHERE id = ?",
            (cat_id.to_string(), Utc::now().to_rfc3339(), id.to_string()),
        )?;
        Ok(rows > 0)
    }

    pub fn mark_mission_complete(&self, id: Uuid) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE missions SET is_completed = 1, updated_at = ? WHERE id = ?",
            (Utc::now().to_rfc3339(), id.to_string()),
        )?;
        Ok(rows > 0)
    }

    /// Deletes the mission; its targets go with it.
    pub fn delete_mission(&self, id: Uuid) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM missions WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    /// The non-completed mission currently holding `cat_id`, if any.
    pub fn active_mission_for_cat(&self, cat_id: Uuid) -> Result<Option<Uuid>> {
        let id = self
            .conn
            .query_row(
                "SELECT id FROM missions WHERE cat_id = ? AND is_completed = 0 LIMIT 1",
                [cat_id.to_string()],
                |row| uuid_column(row, 0),
            )
            .optional()?;
        Ok(id)
    }

    pub fn get_mission_with_targets(&self, id: Uuid) -> Result<Option<MissionWithTargets>> {
        match self.get_mission(id)? {
            Some(mission) => self.expand_mission(mission).map(Some),
            None => Ok(None),
        }
    }

    /// Attach the assigned cat and the targets to an already-loaded mission.
    pub fn expand_mission(&self, mission: Mission) -> Result<MissionWithTargets> {
        let cat = match mission.cat_id {
            Some(cat_id) => self.get_cat(cat_id)?,
            None => None,
        };
        let targets = self.list_targets_by_mission(mission.id)?;
        Ok(MissionWithTargets {
            mission,
            cat,
            targets,
        })
    }

    // ============================================================
    // Target operations
    // ============================================================

    pub fn create_target(&self, mission_id: Uuid, input: &TargetInput) -> Result<Target> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        self.conn.execute(
            "INSERT INTO targets (id, mission_id, name, country, notes, is_completed, created_at, updated_at)
             VALUES (?, ?, ?, ?, '', 0, ?, ?)",
            (
                id.to_string(),
                mission_id.to_string(),
                &input.name,
                &input.country,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Target {
            id,
            mission_id,
            name: input.name.clone(),
            country: input.country.clone(),
            notes: String::new(),
            is_completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn get_target(&self, id: Uuid) -> Result<Option<Target>> {
        let target = self
            .conn
            .query_row(
                &format!("SELECT {TARGET_COLUMNS} FROM targets WHERE id = ?"),
                [id.to_string()],
                target_from_row,
            )
            .optional()?;
        Ok(target)
    }

    /// Targets of a mission in creation order.
    pub fn list_targets_by_mission(&self, mission_id: Uuid) -> Result<Vec<Target>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {TARGET_COLUMNS} FROM targets WHERE mission_id = ? ORDER BY created_at, rowid"
        ))?;
        let targets = stmt
            .query_map([mission_id.to_string()], target_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(targets)
    }

    pub fn count_targets_by_mission(&self, mission_id: Uuid) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM targets WHERE mission_id = ?",
            [mission_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    pub fn update_target(&self, id: Uuid, input: &TargetInput) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE targets SET name = ?, country = ?, updated_at = ? WHERE id = ?",
            (
                &input.name,
                &input.country,
                Utc::now().to_rfc3339(),
                id.to_string(),
            ),
        )?;
        Ok(rows > 0)
    }

    pub fn delete_target(&self, id: Uuid) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM targets WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    pub fn mark_target_complete(&self, id: Uuid) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE targets SET is_completed = 1, updated_at = ? WHERE id = ?",
            (Utc::now().to_rfc3339(), id.to_string()),
        )?;
        Ok(rows > 0)
    }

    /// Append `addition` after the existing notes, newline separated.
    /// Empty notes are replaced rather than prefixed with a blank line.
    pub fn append_target_notes(&self, id: Uuid, addition: &str) -> Result<bool> {
        let rows = self.conn.execute(
            "UPDATE targets
             SET notes = CASE WHEN notes = '' THEN ?1 ELSE notes || char(10) || ?1 END,
                 updated_at = ?2
             WHERE id = ?3",
            (addition, Utc::now().to_rfc3339(), id.to_string()),
        )?;
        Ok(rows > 0)
    }
}

fn cat_from_row(row: &Row<'_>) -> rusqlite::Result<Cat> {
    Ok(Cat {
        id: uuid_column(row, 0)?,
        name: row.get(1)?,
        years_experience: row.get(2)?,
        breed: row.get(3)?,
        salary: row.get(4)?,
        is_available: row.get(5)?,
        created_at: datetime_column(row, 6)?,
        updated_at: datetime_column(row, 7)?,
    })
}

fn mission_from_row(row: &Row<'_>) -> rusqlite::Result<Mission> {
    let cat_id = match row.get::<_, Option<String>>(1)? {
        Some(s) => Some(parse_uuid(1, &s)?),
        None => None,
    };
    Ok(Mission {
        id: uuid_column(row, 0)?,
        cat_id,
        is_completed: row.get(2)?,
        created_at: datetime_column(row, 3)?,
        updated_at: datetime_column(row, 4)?,
    })
}

fn target_from_row(row: &Row<'_>) -> rusqlite::Result<Target> {
    Ok(Target {
        id: uuid_column(row, 0)?,
        mission_id: uuid_column(row, 1)?,
        name: row.get(2)?,
        country: row.get(3)?,
        notes: row.get(4)?,
        is_completed: row.get(5)?,
        created_at: datetime_column(row, 6)?,
        updated_at: datetime_column(row, 7)?,
    })
}

fn uuid_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    parse_uuid(idx, &row.get::<_, String>(idx)?)
}

fn parse_uuid(idx: usize, s: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(s)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn datetime_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
