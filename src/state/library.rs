use chrono::Utc;
use rusqlite::{Connection, Result as SqlResult};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::data::FitRecord;
use super::tags::TagSet;
use crate::collab::{FitStore, FormFields, Pending};
use crate::error::FitResult;

/// The Library manages the SQLite fit catalog.
///
/// It also acts as the persistence collaborator for the composer. Each
/// `create_fit` call opens its own connection on a blocking task, because
/// `rusqlite::Connection` is not `Send`.
pub struct Library {
    conn: Connection,
    db_path: PathBuf,
}

impl Library {
    /// Open (or create) the catalog at `db_path` and initialize the schema.
    pub fn open(db_path: impl Into<PathBuf>) -> FitResult<Self> {
        let db_path = db_path.into();

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                error!(dir = %parent.display(), error = %e, "cannot create data directory");
            }
        }

        let conn = Connection::open(&db_path)?;
        init_schema(&conn)?;
        info!(path = %db_path.display(), "catalog opened");

        Ok(Library { conn, db_path })
    }

    pub fn fit_count(&self) -> SqlResult<i64> {
        self.conn
            .query_row("SELECT COUNT(*) FROM fits", [], |row| row.get(0))
    }

    /// Most recent fits first
    pub fn recent_fits(&self, limit: usize) -> SqlResult<Vec<FitRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, description, image, tags_json, created_at
             FROM fits
             ORDER BY created_at DESC, id DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let tags_json: String = row.get(3)?;
            Ok(FitRecord {
                id: row.get(0)?,
                description: row.get(1)?,
                image: row.get(2)?,
                // A corrupt tags column should not hide the fit itself
                tags: TagSet::from_json(&tags_json).unwrap_or_default(),
                created_at: row.get(4)?,
            })
        })?;

        rows.collect()
    }
}

/// Create the fits table and its index if they don't exist
fn init_schema(conn: &Connection) -> SqlResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS fits (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            description     TEXT NOT NULL,
            image           TEXT NOT NULL,
            tags_json       TEXT NOT NULL,
            created_at      INTEGER NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_fits_created_at
         ON fits(created_at DESC)",
        [],
    )?;

    Ok(())
}

/// Insert one fit from submitted form fields. Returns the new row ID.
fn insert_fit(db_path: &Path, fields: &FormFields) -> Result<i64, String> {
    let description = fields.get("description").unwrap_or_default();
    let image = fields.get("image").unwrap_or_default();
    let tags_json = fields.get("tags").unwrap_or("[]");

    // Reject payloads whose tags are not a JSON string array
    TagSet::from_json(tags_json).map_err(|e| format!("Invalid tags field: {}", e))?;

    let conn = Connection::open(db_path).map_err(|e| format!("Failed to open catalog: {}", e))?;
    init_schema(&conn).map_err(|e| format!("Failed to prepare catalog: {}", e))?;
    conn.execute(
        "INSERT INTO fits (description, image, tags_json, created_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![description, image, tags_json, Utc::now().timestamp()],
    )
    .map_err(|e| format!("Failed to save fit: {}", e))?;

    Ok(conn.last_insert_rowid())
}

impl FitStore for Library {
    fn create_fit(&self, fields: FormFields) -> Pending<Result<(), String>> {
        let db_path = self.db_path.clone();
        Box::pin(async move {
            let id = tokio::task::spawn_blocking(move || insert_fit(&db_path, &fields))
                .await
                .map_err(|e| format!("Task join error: {}", e))??;
            info!(id, "fit saved");
            Ok(())
        })
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}
