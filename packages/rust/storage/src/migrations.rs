//! SQL migration definitions for the TopicLens database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a batch of SQL statements.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: research_results, generated_content",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version    INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Research pipeline output (immutable once written)
CREATE TABLE IF NOT EXISTS research_results (
    id                     TEXT PRIMARY KEY,
    topic                  TEXT NOT NULL,
    topic_key              TEXT NOT NULL,
    title                  TEXT NOT NULL,
    summary                TEXT NOT NULL,
    comprehensive_response TEXT NOT NULL,
    key_points_json        TEXT NOT NULL,
    diagram_ideas_json     TEXT NOT NULL,
    related_topics_json    TEXT NOT NULL,
    source_urls_json       TEXT NOT NULL,
    created_at             TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_research_topic_key ON research_results(topic_key);

-- Content pipeline output
CREATE TABLE IF NOT EXISTS generated_content (
    id                  TEXT PRIMARY KEY,
    topic               TEXT NOT NULL,
    topic_key           TEXT NOT NULL,
    title               TEXT NOT NULL,
    article_text        TEXT NOT NULL,
    summary             TEXT NOT NULL,
    diagram_ideas_json  TEXT NOT NULL,
    key_insights_json   TEXT NOT NULL,
    related_topics_json TEXT NOT NULL,
    source_urls_json    TEXT NOT NULL,
    status              TEXT NOT NULL,
    created_at          TEXT NOT NULL,
    updated_at          TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_content_topic_key ON generated_content(topic_key);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
