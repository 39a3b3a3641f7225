#![forbid(unsafe_code)]

pub(super) const SQL: &str = r#"

        CREATE UNIQUE INDEX IF NOT EXISTS idx_contents_owner_slug
          ON contents(owner_id, slug) WHERE slug IS NOT NULL;

        CREATE INDEX IF NOT EXISTS idx_contents_root_created
          ON contents(root_id, created_at_ms, seq);

        CREATE INDEX IF NOT EXISTS idx_contents_parent_created
          ON contents(parent_id, created_at_ms, seq);
"#;
