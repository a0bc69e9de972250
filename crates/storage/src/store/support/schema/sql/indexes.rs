#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE INDEX IF NOT EXISTS idx_projects_owner_lft ON projects(owner, lft);
        CREATE INDEX IF NOT EXISTS idx_projects_owner_rgt ON projects(owner, rgt);
        CREATE INDEX IF NOT EXISTS idx_projects_owner_name ON projects(owner, name);
        CREATE INDEX IF NOT EXISTS idx_project_events_owner_seq ON project_events(owner, seq);
"#;
