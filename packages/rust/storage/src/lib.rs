//! libSQL storage layer (local file mode).
//!
//! The [`Storage`] struct wraps a libSQL database holding research results
//! and generated content. Topic lookups go through a normalized `topic_key`
//! column so they are case-insensitive and exact; when several records share
//! a topic the newest one wins.

mod migrations;

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Connection, Database, Row, params};
use topiclens_shared::{
    ContentRecord, ContentStatus, RecordId, ResearchRecord, Result, TopicLensError, topic_key,
};

const RESEARCH_COLUMNS: &str = "id, topic, title, summary, comprehensive_response, \
     key_points_json, diagram_ideas_json, related_topics_json, source_urls_json, created_at";

const CONTENT_COLUMNS: &str = "id, topic, title, article_text, summary, diagram_ideas_json, \
     key_insights_json, related_topics_json, source_urls_json, status, created_at, updated_at";

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl Storage {
    /// Open or create a database at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TopicLensError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| TopicLensError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| TopicLensError::Storage(e.to_string()))?;

        let storage = Self { db, conn };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.get_schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    TopicLensError::Storage(format!("migration v{} failed: {e}", migration.version))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn get_schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // Research results
    // -----------------------------------------------------------------------

    /// Insert a research record.
    pub async fn save_research(&self, record: &ResearchRecord) -> Result<()> {
        let sql = format!(
            "INSERT INTO research_results ({RESEARCH_COLUMNS}, topic_key)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
        );
        self.conn
            .execute(
                &sql,
                params![
                    record.id.to_string(),
                    record.topic.as_str(),
                    record.title.as_str(),
                    record.summary.as_str(),
                    record.comprehensive_response.as_str(),
                    encode_list(&record.key_points)?,
                    encode_list(&record.diagram_ideas)?,
                    encode_list(&record.related_topics)?,
                    encode_list(&record.source_urls)?,
                    encode_time(&record.created_at),
                    topic_key(&record.topic),
                ],
            )
            .await
            .map_err(|e| TopicLensError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Newest research record whose topic matches `topic` ignoring case.
    pub async fn find_research_by_topic(&self, topic: &str) -> Result<Option<ResearchRecord>> {
        let sql = format!(
            "SELECT {RESEARCH_COLUMNS} FROM research_results
             WHERE topic_key = ?1 ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        let mut rows = self
            .conn
            .query(&sql, params![topic_key(topic)])
            .await
            .map_err(|e| TopicLensError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(research_from_row(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(TopicLensError::Storage(e.to_string())),
        }
    }

    /// Get a research record by ID.
    pub async fn get_research(&self, id: &RecordId) -> Result<Option<ResearchRecord>> {
        let sql = format!("SELECT {RESEARCH_COLUMNS} FROM research_results WHERE id = ?1");
        let mut rows = self
            .conn
            .query(&sql, params![id.to_string()])
            .await
            .map_err(|e| TopicLensError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(research_from_row(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(TopicLensError::Storage(e.to_string())),
        }
    }

    /// All research records, newest first.
    pub async fn list_research(&self) -> Result<Vec<ResearchRecord>> {
        let sql = format!(
            "SELECT {RESEARCH_COLUMNS} FROM research_results ORDER BY created_at DESC, id DESC"
        );
        let mut rows = self
            .conn
            .query(&sql, params![])
            .await
            .map_err(|e| TopicLensError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| TopicLensError::Storage(e.to_string()))?
        {
            results.push(research_from_row(&row)?);
        }
        Ok(results)
    }

    // -----------------------------------------------------------------------
    // Generated content
    // -----------------------------------------------------------------------

    /// Insert or update (by ID) a content record.
    pub async fn save_content(&self, record: &ContentRecord) -> Result<()> {
        let sql = format!(
            "INSERT INTO generated_content ({CONTENT_COLUMNS}, topic_key)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT(id) DO UPDATE SET
                topic = excluded.topic,
                topic_key = excluded.topic_key,
                title = excluded.title,
                article_text = excluded.article_text,
                summary = excluded.summary,
                diagram_ideas_json = excluded.diagram_ideas_json,
                key_insights_json = excluded.key_insights_json,
                related_topics_json = excluded.related_topics_json,
                source_urls_json = excluded.source_urls_json,
                status = excluded.status,
                updated_at = excluded.updated_at"
        );
        self.conn
            .execute(
                &sql,
                params![
                    record.id.to_string(),
                    record.topic.as_str(),
                    record.title.as_str(),
                    record.article_text.as_str(),
                    record.summary.as_str(),
                    encode_list(&record.diagram_ideas)?,
                    encode_list(&record.key_insights)?,
                    encode_list(&record.related_topics)?,
                    encode_list(&record.source_urls)?,
                    record.status.as_str(),
                    encode_time(&record.created_at),
                    encode_time(&record.updated_at),
                    topic_key(&record.topic),
                ],
            )
            .await
            .map_err(|e| TopicLensError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Newest content record whose topic matches `topic` ignoring case.
    pub async fn find_content_by_topic(&self, topic: &str) -> Result<Option<ContentRecord>> {
        let sql = format!(
            "SELECT {CONTENT_COLUMNS} FROM generated_content
             WHERE topic_key = ?1 ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        let mut rows = self
            .conn
            .query(&sql, params![topic_key(topic)])
            .await
            .map_err(|e| TopicLensError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(content_from_row(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(TopicLensError::Storage(e.to_string())),
        }
    }

    /// Get a content record by ID.
    pub async fn get_content(&self, id: &RecordId) -> Result<Option<ContentRecord>> {
        let sql = format!("SELECT {CONTENT_COLUMNS} FROM generated_content WHERE id = ?1");
        let mut rows = self
            .conn
            .query(&sql, params![id.to_string()])
            .await
            .map_err(|e| TopicLensError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(content_from_row(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(TopicLensError::Storage(e.to_string())),
        }
    }

    /// All content records, newest first.
    pub async fn list_content(&self) -> Result<Vec<ContentRecord>> {
        let sql = format!(
            "SELECT {CONTENT_COLUMNS} FROM generated_content ORDER BY created_at DESC, id DESC"
        );
        let mut rows = self
            .conn
            .query(&sql, params![])
            .await
            .map_err(|e| TopicLensError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| TopicLensError::Storage(e.to_string()))?
        {
            results.push(content_from_row(&row)?);
        }
        Ok(results)
    }

    /// Delete a content record. Returns whether a row was removed.
    pub async fn delete_content(&self, id: &RecordId) -> Result<bool> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM generated_content WHERE id = ?1",
                params![id.to_string()],
            )
            .await
            .map_err(|e| TopicLensError::Storage(e.to_string()))?;
        Ok(affected > 0)
    }
}

// ---------------------------------------------------------------------------
// Row decoding
// ---------------------------------------------------------------------------

fn research_from_row(row: &Row) -> Result<ResearchRecord> {
    Ok(ResearchRecord {
        id: decode_id(&text(row, 0)?)?,
        topic: text(row, 1)?,
        title: text(row, 2)?,
        summary: text(row, 3)?,
        comprehensive_response: text(row, 4)?,
        key_points: decode_list(&text(row, 5)?)?,
        diagram_ideas: decode_list(&text(row, 6)?)?,
        related_topics: decode_list(&text(row, 7)?)?,
        source_urls: decode_list(&text(row, 8)?)?,
        created_at: decode_time(&text(row, 9)?)?,
    })
}

fn content_from_row(row: &Row) -> Result<ContentRecord> {
    let status = text(row, 9)?;
    Ok(ContentRecord {
        id: decode_id(&text(row, 0)?)?,
        topic: text(row, 1)?,
        title: text(row, 2)?,
        article_text: text(row, 3)?,
        summary: text(row, 4)?,
        diagram_ideas: decode_list(&text(row, 5)?)?,
        key_insights: decode_list(&text(row, 6)?)?,
        related_topics: decode_list(&text(row, 7)?)?,
        source_urls: decode_list(&text(row, 8)?)?,
        status: status
            .parse::<ContentStatus>()
            .map_err(TopicLensError::Storage)?,
        created_at: decode_time(&text(row, 10)?)?,
        updated_at: decode_time(&text(row, 11)?)?,
    })
}

fn text(row: &Row, idx: i32) -> Result<String> {
    row.get::<String>(idx)
        .map_err(|e| TopicLensError::Storage(e.to_string()))
}

fn decode_id(raw: &str) -> Result<RecordId> {
    raw.parse()
        .map_err(|e| TopicLensError::Storage(format!("invalid record id '{raw}': {e}")))
}

fn encode_list(items: &[String]) -> Result<String> {
    serde_json::to_string(items).map_err(|e| TopicLensError::Storage(e.to_string()))
}

fn decode_list(raw: &str) -> Result<Vec<String>> {
    serde_json::from_str(raw).map_err(|e| TopicLensError::Storage(e.to_string()))
}

/// Fixed-width RFC 3339 so lexical order matches time order.
fn encode_time(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode_time(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| TopicLensError::Storage(format!("invalid timestamp '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn test_storage() -> Storage {
        let tmp = std::env::temp_dir().join(format!("tl_test_{}.db", Uuid::now_v7()));
        Storage::open(&tmp).await.expect("open test db")
    }

    fn research(topic: &str) -> ResearchRecord {
        ResearchRecord {
            id: RecordId::new(),
            topic: topic.into(),
            title: format!("About {topic}"),
            summary: "short".into(),
            comprehensive_response: "long".into(),
            key_points: vec!["a".into(), "b".into()],
            diagram_ideas: vec!["flow".into()],
            related_topics: vec![],
            source_urls: vec!["https://example.com/1".into()],
            created_at: Utc::now(),
        }
    }

    fn content(topic: &str) -> ContentRecord {
        let now = Utc::now();
        ContentRecord {
            id: RecordId::new(),
            topic: topic.into(),
            title: format!("Understanding {topic}"),
            article_text: "article".into(),
            summary: "summary".into(),
            diagram_ideas: vec!["Timeline".into()],
            key_insights: vec!["insight".into()],
            related_topics: vec!["other".into()],
            source_urls: vec!["https://a.example".into(), "https://b.example".into()],
            status: ContentStatus::Generated,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let storage = test_storage().await;
        assert_eq!(storage.get_schema_version().await, 1);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let tmp = std::env::temp_dir().join(format!("tl_test_{}.db", Uuid::now_v7()));
        let s1 = Storage::open(&tmp).await.expect("first open");
        drop(s1);
        let s2 = Storage::open(&tmp).await.expect("second open");
        assert_eq!(s2.get_schema_version().await, 1);
    }

    #[tokio::test]
    async fn research_lookup_ignores_case() {
        let storage = test_storage().await;
        let record = research("Quantum Computing");
        storage.save_research(&record).await.expect("save");

        let found = storage
            .find_research_by_topic("quantum COMPUTING")
            .await
            .expect("find")
            .expect("present");
        assert_eq!(found.id, record.id);
        assert_eq!(found.topic, "Quantum Computing");
        assert_eq!(found.key_points, record.key_points);
        assert_eq!(found.source_urls, record.source_urls);

        let missing = storage
            .find_research_by_topic("quantum")
            .await
            .expect("find");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn research_get_and_list() {
        let storage = test_storage().await;
        let first = research("one");
        let second = research("two");
        storage.save_research(&first).await.unwrap();
        storage.save_research(&second).await.unwrap();

        let listed = storage.list_research().await.expect("list");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second.id);

        let fetched = storage.get_research(&first.id).await.unwrap().expect("stored");
        assert_eq!(fetched.topic, "one");
        assert!(storage.get_research(&RecordId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn content_upsert_updates_in_place() {
        let storage = test_storage().await;
        let mut record = content("Rust");
        storage.save_content(&record).await.expect("insert");

        record.status = ContentStatus::Approved;
        record.title = "Rust, approved".into();
        storage.save_content(&record).await.expect("update");

        let all = storage.list_content().await.unwrap();
        assert_eq!(all.len(), 1);
        let stored = storage.get_content(&record.id).await.unwrap().unwrap();
        assert_eq!(stored.status, ContentStatus::Approved);
        assert_eq!(stored.title, "Rust, approved");
        assert_eq!(stored.source_urls.len(), 2);
    }

    #[tokio::test]
    async fn content_topic_lookup_prefers_newest() {
        let storage = test_storage().await;
        let older = content("cloud native");
        storage.save_content(&older).await.unwrap();
        let mut newer = content("Cloud Native");
        newer.created_at = older.created_at + chrono::Duration::seconds(5);
        storage.save_content(&newer).await.unwrap();

        let found = storage
            .find_content_by_topic("CLOUD NATIVE")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, newer.id);

        assert!(storage.delete_content(&newer.id).await.unwrap());
        let found = storage
            .find_content_by_topic("cloud native")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, older.id);
    }
}
