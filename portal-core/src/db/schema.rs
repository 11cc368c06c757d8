pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS cached_notifications (
    employee_id TEXT NOT NULL,
    id TEXT NOT NULL,
    title TEXT NOT NULL,
    detail TEXT NOT NULL,
    created_at TEXT NOT NULL,
    read INTEGER NOT NULL DEFAULT 0,
    category TEXT NOT NULL CHECK (category IN ('shift-published', 'shift-removed', 'shift-schedule', 'admin', 'general')),
    metadata JSON,
    target_path TEXT,
    cached_at TEXT NOT NULL,
    PRIMARY KEY (employee_id, id)
);

CREATE INDEX IF NOT EXISTS idx_cached_notifications_created
    ON cached_notifications(employee_id, created_at);
"#;
