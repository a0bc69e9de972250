#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS project_events (
          seq INTEGER PRIMARY KEY AUTOINCREMENT,
          owner TEXT NOT NULL,
          ts_ms INTEGER NOT NULL,
          project_id TEXT,
          type TEXT NOT NULL,
          payload_json TEXT NOT NULL
        );
"#;
