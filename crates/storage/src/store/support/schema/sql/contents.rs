#![forbid(unsafe_code)]

// `seq` doubles as the insertion ordinal used to break sibling ties.
pub(super) const SQL: &str = r#"

        CREATE TABLE IF NOT EXISTS contents (
          seq INTEGER PRIMARY KEY AUTOINCREMENT,
          id TEXT NOT NULL UNIQUE,
          owner_id TEXT NOT NULL,
          parent_id TEXT,
          root_id TEXT NOT NULL,
          slug TEXT,
          title TEXT,
          body TEXT NOT NULL,
          status TEXT NOT NULL,
          children_deep_count INTEGER NOT NULL DEFAULT 0,
          created_at_ms INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          published_at_ms INTEGER,
          deleted_at_ms INTEGER,
          FOREIGN KEY(parent_id) REFERENCES contents(id) ON DELETE RESTRICT,
          CHECK(status IN ('draft', 'published', 'deleted')),
          CHECK(children_deep_count >= 0),
          CHECK(parent_id IS NULL OR parent_id <> id),
          CHECK(parent_id IS NOT NULL OR root_id = id),
          CHECK(parent_id IS NULL OR slug IS NULL)
        );
"#;
