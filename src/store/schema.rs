//! Database schema.

use rusqlite::Connection;

/// Table definitions. Every statement is `IF NOT EXISTS`, so applying the
/// schema to an existing database leaves its data alone.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS transcripts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    date TEXT NOT NULL,
    participants TEXT NOT NULL DEFAULT '[]',
    content TEXT NOT NULL,
    source TEXT NOT NULL,
    source_file_path TEXT,
    metadata TEXT NOT NULL DEFAULT '{}',
    processed INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_transcripts_processed ON transcripts(processed);

CREATE TABLE IF NOT EXISTS action_items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    transcript_id INTEGER NOT NULL REFERENCES transcripts(id),
    assignee TEXT NOT NULL,
    description TEXT NOT NULL,
    task_type TEXT NOT NULL,
    urgency_level TEXT NOT NULL,
    estimated_deadline TEXT,
    actual_deadline TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    automation_level TEXT NOT NULL DEFAULT 'manual',
    context TEXT NOT NULL DEFAULT '{}',
    entities TEXT NOT NULL DEFAULT '{}',
    confidence_score REAL NOT NULL DEFAULT 0.0,
    created_at TEXT NOT NULL,
    completed_at TEXT
);

CREATE INDEX IF NOT EXISTS idx_action_items_transcript ON action_items(transcript_id);
CREATE INDEX IF NOT EXISTS idx_action_items_status ON action_items(status, assignee);

CREATE TABLE IF NOT EXISTS document_templates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    type TEXT NOT NULL,
    content TEXT NOT NULL,
    placeholders TEXT NOT NULL DEFAULT '{}',
    usage_count INTEGER NOT NULL DEFAULT 0,
    success_rate REAL NOT NULL DEFAULT 0.0,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS task_execution_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    action_item_id INTEGER REFERENCES action_items(id),
    execution_type TEXT NOT NULL,
    status TEXT NOT NULL,
    result TEXT NOT NULL DEFAULT '{}',
    error_message TEXT,
    executed_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
"#;

/// Tables the store expects to find.
pub const TABLES: &[&str] = &[
    "transcripts",
    "action_items",
    "document_templates",
    "task_execution_log",
];

/// Create any missing tables and indexes.
pub fn apply(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}

/// Names of the expected tables that are missing from the database.
pub fn missing_tables(conn: &Connection) -> rusqlite::Result<Vec<&'static str>> {
    let mut stmt = conn.prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    let mut missing = Vec::new();
    for table in TABLES {
        if !stmt.exists([table])? {
            missing.push(*table);
        }
    }
    Ok(missing)
}
