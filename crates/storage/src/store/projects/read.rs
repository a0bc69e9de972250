#![forbid(unsafe_code)]

use super::super::*;
use rusqlite::{OptionalExtension, params};

impl SqliteStore {
    /// Looks up a live project of `owner_id`. Rows of other owners are reported as absent.
    pub fn find_project(
        &self,
        owner_id: &str,
        project_id: &str,
    ) -> Result<Option<ProjectRow>, StoreError> {
        let owner = canonicalize_owner(owner_id)?;
        let project_id = canonicalize_project_ref(&owner, project_id)?;
        Ok(live_project_tx(&self.conn, &project_id)?.filter(|row| row.owner == owner.as_str()))
    }

    /// First live project with exactly this name, in tree order.
    pub fn find_project_by_name(
        &self,
        owner_id: &str,
        name: &str,
    ) -> Result<Option<ProjectRow>, StoreError> {
        let owner = canonicalize_owner(owner_id)?;
        let name = canonicalize_name(name)?;
        let id = self
            .conn
            .query_row(
                "SELECT id FROM projects \
                 WHERE owner=?1 AND name=?2 AND deleted_at_ms IS NULL \
                 ORDER BY lft ASC LIMIT 1",
                params![owner.as_str(), name.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        match id {
            Some(id) => {
                let id = canonicalize_project_ref(&owner, &id)?;
                live_project_tx(&self.conn, &id)
            }
            None => Ok(None),
        }
    }

    /// The owner's live forest in pre-order (ascending left key).
    pub fn list_projects(
        &self,
        request: ListProjectsRequest,
    ) -> Result<Vec<ProjectRow>, StoreError> {
        let owner = canonicalize_owner(&request.owner_id)?;
        let mut rows = live_projects_tx(&self.conn, &owner)?;
        if !request.include_system {
            rows.retain(|row| !row.is_system);
        }
        Ok(rows)
    }

    pub fn count_projects(&self, owner_id: &str) -> Result<usize, StoreError> {
        let owner = canonicalize_owner(owner_id)?;
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM projects WHERE owner=?1 AND deleted_at_ms IS NULL",
            params![owner.as_str()],
            |row| row.get::<_, i64>(0),
        )?;
        usize::try_from(count).map_err(|_| StoreError::InvalidInput("numeric overflow"))
    }

    /// Journal entries of the owner, newest first.
    pub fn list_project_events(
        &self,
        owner_id: &str,
        limit: usize,
    ) -> Result<Vec<ProjectEventRow>, StoreError> {
        let owner = canonicalize_owner(owner_id)?;
        list_events_tx(&self.conn, &owner, limit)
    }
}
