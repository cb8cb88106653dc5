//! Persistence for transcripts and action items.
//!
//! SQLite through rusqlite and an r2d2 pool, so concurrent callers each get
//! their own connection. Every operation runs on tokio's blocking thread pool.
//! There is no caching layer: every write is visible to the next read. Errors
//! propagate unchanged and nothing is retried.

mod codec;
mod pool;
mod schema;

pub use pool::{ConnectionPool, PooledConnection};
pub use schema::TABLES;

use crate::error::{ReferatError, Result};
use crate::model::{ActionItem, TaskStatus, Transcript};
use chrono::{DateTime, Utc};
use codec::{
    encode_json, encode_optional_time, encode_time, json_column, optional_time_column, time_column,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

const TRANSCRIPT_COLUMNS: &str = "id, title, date, participants, content, source, \
     source_file_path, metadata, processed, created_at";

const ACTION_ITEM_COLUMNS: &str = "id, transcript_id, assignee, description, task_type, \
     urgency_level, estimated_deadline, actual_deadline, status, automation_level, context, \
     entities, confidence_score, created_at, completed_at";

/// SQLite-backed store for transcripts and action items.
pub struct SqliteStore {
    pool: ConnectionPool,
}

impl SqliteStore {
    /// Open a pooled store on a database file and make sure the schema exists.
    ///
    /// Fails if the database cannot be opened.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub async fn connect(path: &Path, pool_size: usize, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let path = path.to_path_buf();
        let store = tokio::task::spawn_blocking(move || Self::open(&path, pool_size, busy_timeout))
            .await
            .map_err(|e| ReferatError::Store(format!("Store task failed: {}", e)))??;
        store.initialize().await?;

        info!("Opened store ({} connections)", pool_size);
        Ok(store)
    }

    /// Open a pooled store without touching the schema.
    ///
    /// Blocks while the connections are opened.
    pub fn open(path: &Path, pool_size: usize, busy_timeout: Duration) -> Result<Self> {
        Ok(Self {
            pool: pool::open(path, pool_size, busy_timeout)?,
        })
    }

    /// Create an in-memory store (useful for testing).
    pub async fn in_memory() -> Result<Self> {
        let store = Self {
            pool: pool::in_memory()?,
        };
        store.initialize().await?;
        Ok(store)
    }

    /// Run `f` with a pooled connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            f(&mut conn)
        })
        .await
        .map_err(|e| ReferatError::Store(format!("Store task failed: {}", e)))?
    }

    /// Create any missing tables. Safe to call on every start.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<()> {
        self.with_conn(|conn| Ok(schema::apply(conn)?)).await?;
        debug!("Schema ensured");
        Ok(())
    }

    /// Expected tables that are absent from the database.
    pub async fn missing_tables(&self) -> Result<Vec<&'static str>> {
        self.with_conn(|conn| Ok(schema::missing_tables(conn)?)).await
    }

    /// Store a new transcript and return its ID.
    ///
    /// The stored record always starts unprocessed.
    #[instrument(skip(self, transcript), fields(title = %transcript.title))]
    pub async fn insert_transcript(&self, transcript: &Transcript) -> Result<i64> {
        let participants = encode_json(&transcript.participants)?;
        let metadata = encode_json(&transcript.metadata)?;
        let date = encode_time(&transcript.date)?;
        let created_at = encode_time(&transcript.created_at)?;
        let title = transcript.title.clone();
        let content = transcript.content.clone();
        let source = transcript.source.clone();
        let source_file_path = transcript.source_file_path.clone();

        let id = self
            .with_conn(move |conn| {
                conn.execute(
                    r#"
                    INSERT INTO transcripts
                    (title, date, participants, content, source, source_file_path, metadata, processed, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)
                    "#,
                    params![
                        title,
                        date,
                        participants,
                        content,
                        source,
                        source_file_path,
                        metadata,
                        created_at,
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;

        info!("Stored transcript {}", id);
        Ok(id)
    }

    /// Fetch a transcript by ID.
    pub async fn get_transcript(&self, id: i64) -> Result<Option<Transcript>> {
        self.with_conn(move |conn| {
            let transcript = conn
                .query_row(
                    &format!("SELECT {} FROM transcripts WHERE id = ?1", TRANSCRIPT_COLUMNS),
                    params![id],
                    transcript_from_row,
                )
                .optional()?;
            Ok(transcript)
        })
        .await
    }

    /// List transcripts, newest first, optionally only those with the given processed flag.
    pub async fn list_transcripts(&self, processed: Option<bool>) -> Result<Vec<Transcript>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM transcripts
                 WHERE (?1 IS NULL OR processed = ?1)
                 ORDER BY created_at DESC, id DESC",
                TRANSCRIPT_COLUMNS
            ))?;

            let rows = stmt.query_map(params![processed], transcript_from_row)?;
            let transcripts = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(transcripts)
        })
        .await
    }

    /// Flag a transcript as processed. Flagging it again is a no-op.
    #[instrument(skip(self))]
    pub async fn mark_transcript_processed(&self, id: i64) -> Result<()> {
        self.with_conn(move |conn| {
            let updated =
                conn.execute("UPDATE transcripts SET processed = 1 WHERE id = ?1", params![id])?;
            if updated == 0 {
                return Err(ReferatError::NotFound(format!("transcript {}", id)));
            }
            Ok(())
        })
        .await
    }

    /// Store a new action item and return its ID.
    ///
    /// The item must already carry its transcript ID.
    #[instrument(skip(self, item), fields(assignee = %item.assignee))]
    pub async fn insert_action_item(&self, item: &ActionItem) -> Result<i64> {
        let item = item.clone();
        let id = self.with_conn(move |conn| insert_item(conn, &item)).await?;
        debug!("Stored action item {}", id);
        Ok(id)
    }

    /// Fetch an action item by ID.
    pub async fn get_action_item(&self, id: i64) -> Result<Option<ActionItem>> {
        self.with_conn(move |conn| {
            let item = conn
                .query_row(
                    &format!("SELECT {} FROM action_items WHERE id = ?1", ACTION_ITEM_COLUMNS),
                    params![id],
                    action_item_from_row,
                )
                .optional()?;
            Ok(item)
        })
        .await
    }

    /// All action items of one transcript, in insertion order.
    pub async fn get_action_items_for_transcript(&self, transcript_id: i64) -> Result<Vec<ActionItem>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM action_items WHERE transcript_id = ?1 ORDER BY id",
                ACTION_ITEM_COLUMNS
            ))?;

            let rows = stmt.query_map(params![transcript_id], action_item_from_row)?;
            let items = rows.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(items)
        })
        .await
    }

    /// Pending action items, most urgent first.
    ///
    /// Within one urgency level the soonest estimated deadline comes first and
    /// items without a deadline come last.
    #[instrument(skip(self))]
    pub async fn get_pending_action_items(&self, assignee: Option<&str>) -> Result<Vec<ActionItem>> {
        let assignee = assignee.map(str::to_string);
        let items = self
            .with_conn(move |conn| {
                let mut stmt = conn.prepare(&format!(
                    r#"
                    SELECT {} FROM action_items
                    WHERE status = 'pending' AND (?1 IS NULL OR assignee = ?1)
                    ORDER BY
                        CASE urgency_level
                            WHEN 'urgent' THEN 3
                            WHEN 'high' THEN 2
                            WHEN 'medium' THEN 1
                            ELSE 0
                        END DESC,
                        estimated_deadline IS NULL,
                        estimated_deadline ASC,
                        id ASC
                    "#,
                    ACTION_ITEM_COLUMNS
                ))?;

                let rows = stmt.query_map(params![assignee], action_item_from_row)?;
                let items = rows.collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(items)
            })
            .await?;

        debug!("Found {} pending action items", items.len());
        Ok(items)
    }

    /// Move an action item to a new status.
    ///
    /// Completing requires a completion time. Any other status clears it.
    #[instrument(skip(self))]
    pub async fn update_action_item_status(
        &self,
        id: i64,
        status: TaskStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let completed_at = match (status, completed_at) {
            (TaskStatus::Completed, Some(at)) => Some(encode_time(&at)?),
            (TaskStatus::Completed, None) => {
                return Err(ReferatError::InvalidInput(
                    "A completion time is required when completing an action item".to_string(),
                ));
            }
            _ => None,
        };

        self.with_conn(move |conn| {
            let updated = conn.execute(
                "UPDATE action_items SET status = ?1, completed_at = ?2 WHERE id = ?3",
                params![status, completed_at, id],
            )?;
            if updated == 0 {
                return Err(ReferatError::NotFound(format!("action item {}", id)));
            }
            Ok(())
        })
        .await?;

        info!("Action item {} is now {}", id, status);
        Ok(())
    }

    /// Store a transcript's extracted items and flag it processed, atomically.
    ///
    /// Returns the items with their IDs and transcript ID filled in. Either
    /// all items are stored and the flag is set, or nothing changes. A
    /// transcript that is already processed is refused, so two concurrent
    /// extractions of one transcript cannot both record their items.
    #[instrument(skip(self, items), fields(count = items.len()))]
    pub async fn record_extraction(
        &self,
        transcript_id: i64,
        items: Vec<ActionItem>,
    ) -> Result<Vec<ActionItem>> {
        let stored = self
            .with_conn(move |conn| {
                let tx = conn.transaction()?;
                claim_unprocessed(&tx, transcript_id)?;

                let mut stored = Vec::with_capacity(items.len());
                for mut item in items {
                    item.transcript_id = Some(transcript_id);
                    item.id = Some(insert_item(&tx, &item)?);
                    stored.push(item);
                }

                tx.commit()?;
                Ok(stored)
            })
            .await?;

        info!("Recorded {} action items for transcript {}", stored.len(), transcript_id);
        Ok(stored)
    }
}

fn insert_item(conn: &Connection, item: &ActionItem) -> Result<i64> {
    let transcript_id = item.transcript_id.ok_or_else(|| {
        ReferatError::InvalidInput("Action item is not attached to a transcript".to_string())
    })?;

    conn.execute(
        r#"
        INSERT INTO action_items
        (transcript_id, assignee, description, task_type, urgency_level, estimated_deadline,
         actual_deadline, status, automation_level, context, entities, confidence_score,
         created_at, completed_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
        "#,
        params![
            transcript_id,
            item.assignee,
            item.description,
            item.task_type,
            item.urgency_level,
            encode_optional_time(item.estimated_deadline.as_ref())?,
            encode_optional_time(item.actual_deadline.as_ref())?,
            item.status,
            item.automation_level,
            encode_json(&item.context)?,
            encode_json(&item.entities)?,
            item.confidence_score,
            encode_time(&item.created_at)?,
            encode_optional_time(item.completed_at.as_ref())?,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

/// Flip a transcript from unprocessed to processed, failing if it is unknown
/// or already processed.
fn claim_unprocessed(conn: &Connection, id: i64) -> Result<()> {
    let updated = conn.execute(
        "UPDATE transcripts SET processed = 1 WHERE id = ?1 AND processed = 0",
        params![id],
    )?;
    if updated == 1 {
        return Ok(());
    }

    let exists = conn
        .query_row("SELECT 1 FROM transcripts WHERE id = ?1", params![id], |_| Ok(()))
        .optional()?
        .is_some();
    if exists {
        Err(ReferatError::InvalidInput(format!(
            "Transcript {} is already processed",
            id
        )))
    } else {
        Err(ReferatError::NotFound(format!("transcript {}", id)))
    }
}

fn transcript_from_row(row: &Row<'_>) -> rusqlite::Result<Transcript> {
    Ok(Transcript {
        id: Some(row.get(0)?),
        title: row.get(1)?,
        date: time_column(row, 2)?,
        participants: json_column(row, 3)?,
        content: row.get(4)?,
        source: row.get(5)?,
        source_file_path: row.get(6)?,
        metadata: json_column(row, 7)?,
        processed: row.get(8)?,
        created_at: time_column(row, 9)?,
    })
}

fn action_item_from_row(row: &Row<'_>) -> rusqlite::Result<ActionItem> {
    Ok(ActionItem {
        id: Some(row.get(0)?),
        transcript_id: Some(row.get(1)?),
        assignee: row.get(2)?,
        description: row.get(3)?,
        task_type: row.get(4)?,
        urgency_level: row.get(5)?,
        estimated_deadline: optional_time_column(row, 6)?,
        actual_deadline: optional_time_column(row, 7)?,
        status: row.get(8)?,
        automation_level: row.get(9)?,
        context: json_column(row, 10)?,
        entities: json_column(row, 11)?,
        confidence_score: row.get(12)?,
        created_at: time_column(row, 13)?,
        completed_at: optional_time_column(row, 14)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Metadata, TaskType, UrgencyLevel};
    use chrono::{Duration as ChronoDuration, TimeZone};
    use serde_json::json;

    async fn store_with_transcript() -> (SqliteStore, i64) {
        let store = SqliteStore::in_memory().await.unwrap();
        let id = store
            .insert_transcript(&Transcript::new("Weekly Sync", "John: I'll send it."))
            .await
            .unwrap();
        (store, id)
    }

    fn metadata(value: serde_json::Value) -> Metadata {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_transcript_roundtrip() {
        let store = SqliteStore::in_memory().await.unwrap();

        let transcript = Transcript::new("Client Onboarding", "Sarah: NDA by Wednesday.")
            .with_date(Utc.timestamp_opt(1_705_309_200, 987_654_321).unwrap())
            .with_participants(vec!["John Smith".into(), "Sarah Johnson".into(), "Mike Chen".into()])
            .with_source("tactiq")
            .with_source_file_path("/tmp/onboarding.txt")
            .with_metadata(metadata(json!({"team": "sales", "recorded": true, "duration_minutes": 42})));

        let id = store.insert_transcript(&transcript).await.unwrap();
        let loaded = store.get_transcript(id).await.unwrap().unwrap();

        let mut expected = transcript.clone();
        expected.id = Some(id);
        assert_eq!(loaded, expected);
    }

    #[tokio::test]
    async fn test_transcript_roundtrip_with_empty_collections() {
        let store = SqliteStore::in_memory().await.unwrap();
        let transcript = Transcript::new("", "");

        let id = store.insert_transcript(&transcript).await.unwrap();
        let loaded = store.get_transcript(id).await.unwrap().unwrap();

        assert!(loaded.participants.is_empty());
        assert!(loaded.metadata.is_empty());
        assert_eq!(loaded.source_file_path, None);
        assert_eq!(loaded.created_at, transcript.created_at);
    }

    #[tokio::test]
    async fn test_duplicate_transcripts_allowed() {
        let store = SqliteStore::in_memory().await.unwrap();
        let transcript = Transcript::new("Standup", "same text");

        let first = store.insert_transcript(&transcript).await.unwrap();
        let second = store.insert_transcript(&transcript).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(store.list_transcripts(None).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_insert_always_unprocessed() {
        let store = SqliteStore::in_memory().await.unwrap();
        let mut transcript = Transcript::new("Retro", "text");
        transcript.processed = true;

        let id = store.insert_transcript(&transcript).await.unwrap();
        assert!(!store.get_transcript(id).await.unwrap().unwrap().processed);

        store.mark_transcript_processed(id).await.unwrap();
        assert!(store.get_transcript(id).await.unwrap().unwrap().processed);

        assert_eq!(store.list_transcripts(Some(true)).await.unwrap().len(), 1);
        assert!(store.list_transcripts(Some(false)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_unknown_transcript_fails() {
        let store = SqliteStore::in_memory().await.unwrap();
        let err = store.mark_transcript_processed(99).await.unwrap_err();
        assert!(matches!(err, ReferatError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_action_item_roundtrip() {
        let (store, transcript_id) = store_with_transcript().await;

        let mut item = ActionItem::new("Mike", "Research the client's tech stack")
            .with_task_type(TaskType::Research)
            .with_urgency(UrgencyLevel::High)
            .with_estimated_deadline(Some(Utc.with_ymd_and_hms(2024, 1, 22, 17, 0, 0).unwrap()))
            .with_confidence(0.75)
            .for_transcript(transcript_id);
        item.entities = metadata(json!({"company": "Acme Corp"}));
        item.context = metadata(json!({"summary": "Integration discussion"}));

        let id = store.insert_action_item(&item).await.unwrap();
        let loaded = store.get_action_item(id).await.unwrap().unwrap();

        let mut expected = item.clone();
        expected.id = Some(id);
        assert_eq!(loaded, expected);

        let items = store.get_action_items_for_transcript(transcript_id).await.unwrap();
        assert_eq!(items, vec![expected]);
    }

    #[tokio::test]
    async fn test_labels_stored_as_strings() {
        let (store, transcript_id) = store_with_transcript().await;
        let item = ActionItem::new("John", "Call legal")
            .with_task_type(TaskType::PhoneCall)
            .with_urgency(UrgencyLevel::Urgent)
            .for_transcript(transcript_id);
        let id = store.insert_action_item(&item).await.unwrap();

        let conn = store.pool.get().unwrap();
        let (task_type, urgency, status, automation): (String, String, String, String) = conn
            .query_row(
                "SELECT task_type, urgency_level, status, automation_level FROM action_items WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .unwrap();

        assert_eq!(task_type, "phone_call");
        assert_eq!(urgency, "urgent");
        assert_eq!(status, "pending");
        assert_eq!(automation, "manual");
    }

    #[tokio::test]
    async fn test_action_item_requires_transcript() {
        let store = SqliteStore::in_memory().await.unwrap();

        let unattached = ActionItem::new("John", "Send proposal");
        let err = store.insert_action_item(&unattached).await.unwrap_err();
        assert!(matches!(err, ReferatError::InvalidInput(_)));

        let dangling = ActionItem::new("John", "Send proposal").for_transcript(404);
        let err = store.insert_action_item(&dangling).await.unwrap_err();
        assert!(matches!(err, ReferatError::Database(_)));
    }

    #[tokio::test]
    async fn test_pending_items_ordering() {
        let (store, transcript_id) = store_with_transcript().await;
        let day = |d: u32| Some(Utc.with_ymd_and_hms(2024, 2, d, 12, 0, 0).unwrap());

        let fixtures = [
            ("medium-late", UrgencyLevel::Medium, day(20)),
            ("low-early", UrgencyLevel::Low, day(1)),
            ("urgent-none", UrgencyLevel::Urgent, None),
            ("medium-none", UrgencyLevel::Medium, None),
            ("urgent-late", UrgencyLevel::Urgent, day(10)),
            ("high-early", UrgencyLevel::High, day(2)),
            ("medium-early", UrgencyLevel::Medium, day(3)),
            ("urgent-early", UrgencyLevel::Urgent, day(5)),
        ];
        for (name, urgency, deadline) in fixtures {
            let item = ActionItem::new("John", name)
                .with_urgency(urgency)
                .with_estimated_deadline(deadline)
                .for_transcript(transcript_id);
            store.insert_action_item(&item).await.unwrap();
        }

        let pending = store.get_pending_action_items(None).await.unwrap();
        let order: Vec<&str> = pending.iter().map(|i| i.description.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "urgent-early",
                "urgent-late",
                "urgent-none",
                "high-early",
                "medium-early",
                "medium-late",
                "medium-none",
                "low-early",
            ]
        );

        for pair in pending.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.urgency_level >= b.urgency_level);
            if a.urgency_level == b.urgency_level {
                match (a.estimated_deadline, b.estimated_deadline) {
                    (Some(x), Some(y)) => assert!(x <= y),
                    (None, Some(_)) => panic!("null deadline sorted before a real one"),
                    _ => {}
                }
            }
        }
    }

    #[tokio::test]
    async fn test_pending_items_filter_status_and_assignee() {
        let (store, transcript_id) = store_with_transcript().await;

        let john = store
            .insert_action_item(&ActionItem::new("John", "Send proposal").for_transcript(transcript_id))
            .await
            .unwrap();
        store
            .insert_action_item(&ActionItem::new("Sarah", "Create timeline").for_transcript(transcript_id))
            .await
            .unwrap();
        let done = store
            .insert_action_item(&ActionItem::new("John", "Review pricing").for_transcript(transcript_id))
            .await
            .unwrap();
        store
            .update_action_item_status(done, TaskStatus::Completed, Some(Utc::now()))
            .await
            .unwrap();

        let all = store.get_pending_action_items(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|i| i.is_pending()));

        let johns = store.get_pending_action_items(Some("John")).await.unwrap();
        assert_eq!(johns.len(), 1);
        assert_eq!(johns[0].id, Some(john));

        assert!(store.get_pending_action_items(Some("Nobody")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_status_completed_sets_time() {
        let (store, transcript_id) = store_with_transcript().await;
        let id = store
            .insert_action_item(&ActionItem::new("John", "Send proposal").for_transcript(transcript_id))
            .await
            .unwrap();

        let at = Utc.timestamp_opt(1_705_400_000, 42).unwrap();
        store.update_action_item_status(id, TaskStatus::Completed, Some(at)).await.unwrap();

        let item = store.get_action_item(id).await.unwrap().unwrap();
        assert_eq!(item.status, TaskStatus::Completed);
        assert_eq!(item.completed_at, Some(at));
    }

    #[tokio::test]
    async fn test_update_status_other_leaves_completed_at_unset() {
        let (store, transcript_id) = store_with_transcript().await;
        let id = store
            .insert_action_item(&ActionItem::new("John", "Send proposal").for_transcript(transcript_id))
            .await
            .unwrap();

        store
            .update_action_item_status(id, TaskStatus::InProgress, Some(Utc::now()))
            .await
            .unwrap();
        let item = store.get_action_item(id).await.unwrap().unwrap();
        assert_eq!(item.status, TaskStatus::InProgress);
        assert_eq!(item.completed_at, None);

        // Reopening a completed item clears its completion time.
        store.update_action_item_status(id, TaskStatus::Completed, Some(Utc::now())).await.unwrap();
        store.update_action_item_status(id, TaskStatus::Pending, None).await.unwrap();
        let item = store.get_action_item(id).await.unwrap().unwrap();
        assert_eq!(item.completed_at, None);
    }

    #[tokio::test]
    async fn test_update_status_errors() {
        let (store, transcript_id) = store_with_transcript().await;
        let id = store
            .insert_action_item(&ActionItem::new("John", "Send proposal").for_transcript(transcript_id))
            .await
            .unwrap();

        let err = store.update_action_item_status(id, TaskStatus::Completed, None).await.unwrap_err();
        assert!(matches!(err, ReferatError::InvalidInput(_)));
        assert!(store.get_action_item(id).await.unwrap().unwrap().is_pending());

        let err = store
            .update_action_item_status(9999, TaskStatus::Cancelled, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ReferatError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_record_extraction_is_atomic() {
        let (store, transcript_id) = store_with_transcript().await;

        let items = vec![
            ActionItem::new("John", "Send proposal"),
            ActionItem::new("Sarah", "Schedule follow-up").with_task_type(TaskType::MeetingScheduling),
        ];
        let stored = store.record_extraction(transcript_id, items).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|i| i.id.is_some() && i.transcript_id == Some(transcript_id)));
        assert!(store.get_transcript(transcript_id).await.unwrap().unwrap().processed);

        // Unknown transcript: nothing is stored.
        let other = store
            .insert_transcript(&Transcript::new("Other", "text"))
            .await
            .unwrap();
        let err = store
            .record_extraction(other + 100, vec![ActionItem::new("Mike", "Research")])
            .await
            .unwrap_err();
        assert!(matches!(err, ReferatError::NotFound(_)));
        assert_eq!(store.get_pending_action_items(Some("Mike")).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_record_extraction_refuses_processed_transcript() {
        let (store, transcript_id) = store_with_transcript().await;

        store
            .record_extraction(transcript_id, vec![ActionItem::new("John", "Send proposal")])
            .await
            .unwrap();
        let err = store
            .record_extraction(transcript_id, vec![ActionItem::new("John", "Send proposal")])
            .await
            .unwrap_err();
        assert!(matches!(err, ReferatError::InvalidInput(_)));
        assert_eq!(store.get_action_items_for_transcript(transcript_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unstorable_deadline_leaves_pending_query_working() {
        let (store, transcript_id) = store_with_transcript().await;
        store
            .insert_action_item(&ActionItem::new("Sarah", "Create timeline").for_transcript(transcript_id))
            .await
            .unwrap();

        let far = Utc.with_ymd_and_hms(10240, 1, 1, 0, 0, 0).unwrap();
        let item = ActionItem::new("John", "Send proposal")
            .with_estimated_deadline(Some(far))
            .for_transcript(transcript_id);
        let err = store.insert_action_item(&item).await.unwrap_err();
        assert!(matches!(err, ReferatError::InvalidInput(_)));

        let err = store
            .record_extraction(transcript_id, vec![item.clone()])
            .await
            .unwrap_err();
        assert!(matches!(err, ReferatError::InvalidInput(_)));
        assert!(!store.get_transcript(transcript_id).await.unwrap().unwrap().processed);

        let pending = store.get_pending_action_items(None).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].assignee, "Sarah");
    }

    #[tokio::test]
    async fn test_record_extraction_with_no_items_marks_processed() {
        let (store, transcript_id) = store_with_transcript().await;
        let stored = store.record_extraction(transcript_id, Vec::new()).await.unwrap();
        assert!(stored.is_empty());
        assert!(store.get_transcript(transcript_id).await.unwrap().unwrap().processed);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("referat.db");

        let store = SqliteStore::connect(&path, 2, Duration::from_millis(500)).await.unwrap();
        let id = store
            .insert_transcript(&Transcript::new("Kickoff", "text"))
            .await
            .unwrap();
        store
            .insert_action_item(&ActionItem::new("John", "Send agenda").for_transcript(id))
            .await
            .unwrap();

        store.initialize().await.unwrap();
        store.initialize().await.unwrap();
        drop(store);

        let reopened = SqliteStore::connect(&path, 2, Duration::from_millis(500)).await.unwrap();
        assert!(reopened.missing_tables().await.unwrap().is_empty());
        assert_eq!(reopened.list_transcripts(None).await.unwrap().len(), 1);
        assert_eq!(reopened.get_action_items_for_transcript(id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_writes_visible_across_pooled_connections() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::connect(&dir.path().join("pool.db"), 3, Duration::from_millis(500))
            .await
            .unwrap();

        let id = store
            .insert_transcript(&Transcript::new("Sync", "text"))
            .await
            .unwrap();
        let item = ActionItem::new("Sarah", "Send NDA")
            .for_transcript(id)
            .with_estimated_deadline(Some(Utc::now() + ChronoDuration::days(2)));
        store.insert_action_item(&item).await.unwrap();

        let (a, b) = tokio::join!(
            store.get_pending_action_items(Some("Sarah")),
            store.get_transcript(id)
        );
        assert_eq!(a.unwrap().len(), 1);
        assert!(b.unwrap().is_some());
    }
}
