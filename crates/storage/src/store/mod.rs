#![forbid(unsafe_code)]

mod config;
mod error;
mod projects;
mod requests;
mod support;
mod types;

pub use config::StoreConfig;
pub use error::StoreError;
pub use pf_core::keys::MoveMode;
pub use requests::*;
pub use types::*;

use pf_core::ids::{OwnerId, ProjectId, ProjectName, SystemProject};
use rusqlite::{Connection, ErrorCode};
use support::*;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DB_FILE_NAME: &str = "projforest.db";

#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
    config: StoreConfig,
}

impl SqliteStore {
    pub fn open(storage_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with(StoreConfig::new(storage_dir.as_ref()))
    }

    pub fn open_with(config: StoreConfig) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&config.storage_dir)?;
        let conn = Connection::open(config.storage_dir.join(DB_FILE_NAME))?;
        Self::from_connection(conn, config)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn, StoreConfig::new(":memory:"))
    }

    /// Adopts an existing connection.
    ///
    /// Fails with `StoreCapabilityError` when the connection cannot take a write lock
    /// (read-only file, `query_only`), since no structural mutation could ever succeed on it.
    pub fn from_connection(mut conn: Connection, config: StoreConfig) -> Result<Self, StoreError> {
        conn.busy_timeout(config.busy_timeout)?;

        preflight_gate(&conn)?;
        ensure_write_capability(&mut conn)?;
        install_schema(&conn)?;

        tracing::debug!(
            storage_dir = %config.storage_dir.display(),
            max_retries = config.max_retries,
            "project store opened"
        );
        Ok(Self { conn, config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn storage_dir(&self) -> &Path {
        &self.config.storage_dir
    }

    pub fn db_path(&self) -> PathBuf {
        self.config.storage_dir.join(DB_FILE_NAME)
    }

    /// Runs `op` and re-runs it from scratch after `TransactionAborted`.
    ///
    /// Every operation re-reads keys inside its own transaction, so a retry never reuses shifts
    /// computed by a failed attempt.
    pub fn with_retry<T>(
        &mut self,
        mut op: impl FnMut(&mut Self) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut attempt = 0u32;
        loop {
            match op(self) {
                Err(err) if err.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(attempt, error = %err, "project mutation aborted; retrying");
                    std::thread::sleep(Duration::from_millis(25 * u64::from(attempt)));
                }
                other => return other,
            }
        }
    }
}

fn map_insert_conflict(err: rusqlite::Error) -> StoreError {
    if is_constraint_violation(&err) {
        return StoreError::DuplicateRecord;
    }
    StoreError::from(err)
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.code == ErrorCode::ConstraintViolation
                || message.as_deref().is_some_and(|value| {
                    value.contains("UNIQUE constraint failed")
                        || value.contains("PRIMARY KEY constraint failed")
                })
        }
        _ => false,
    }
}

fn canonicalize_owner(value: &str) -> Result<OwnerId, StoreError> {
    OwnerId::try_new(value.trim()).map_err(|err| StoreError::InvalidInput(err.message()))
}

fn canonicalize_project(value: &str) -> Result<ProjectId, StoreError> {
    ProjectId::try_new(value.trim()).map_err(|err| StoreError::InvalidInput(err.message()))
}

/// Like `canonicalize_project`, but also accepts the reserved ids of system projects.
fn canonicalize_project_ref(owner: &OwnerId, value: &str) -> Result<ProjectId, StoreError> {
    let value = value.trim();
    for kind in [SystemProject::Root, SystemProject::Archive] {
        let system = ProjectId::system(owner, kind);
        if system.as_str() == value {
            return Ok(system);
        }
    }
    canonicalize_project(value)
}

fn canonicalize_name(value: &str) -> Result<ProjectName, StoreError> {
    ProjectName::try_new(value).map_err(|err| StoreError::InvalidInput(err.message()))
}

fn canonicalize_color(value: Option<&str>) -> Result<Option<String>, StoreError> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(None);
    };
    if raw.len() > 64 || raw.chars().any(|c| c.is_control()) {
        return Err(StoreError::InvalidInput("invalid color"));
    }
    Ok(Some(raw.to_string()))
}
