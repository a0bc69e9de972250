#![forbid(unsafe_code)]

// No UNIQUE or CHECK on `lft`/`rgt`: SQLite enforces them per row, and the range shifts pass
// through transient duplicate or inverted keys. `verify_forest` checks the finished state.
pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS projects (
          id TEXT PRIMARY KEY,
          owner TEXT NOT NULL,
          lft INTEGER NOT NULL,
          rgt INTEGER NOT NULL,
          name TEXT NOT NULL,
          color TEXT,
          is_completed INTEGER NOT NULL DEFAULT 0,
          level INTEGER NOT NULL,
          path TEXT NOT NULL,
          is_system INTEGER NOT NULL DEFAULT 0,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          deleted_at_ms INTEGER
        );
"#;
