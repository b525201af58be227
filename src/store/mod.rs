//! Persistent link and exclusion store using SQLite.
//!
//! This module tracks:
//! - Internal link records, one per (source, target, anchor text)
//! - Exclusion rules consulted before discovery
//!
//! Inserts are explicit idempotent upserts: a racing writer that hits the
//! identity key gets the existing row back instead of an error.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::content::{ContentKey, ContentKind};
use crate::error::{InterlinkError, InterlinkResult};
use crate::links::{
    ExclusionRule, ExclusionScope, ExclusionType, InternalLinkRecord, LinkFilter, LinkOrigin,
    LinkStatus, NewLink, UpsertOutcome,
};

/// SQL schema for the link store
const SCHEMA_SQL: &str = r#"
-- Link records: the durable state of every discovered or curated link
CREATE TABLE IF NOT EXISTS internal_links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    source_id INTEGER NOT NULL,
    source_type TEXT NOT NULL,
    target_id INTEGER NOT NULL,
    target_type TEXT NOT NULL,
    anchor_text TEXT NOT NULL,
    target_url TEXT NOT NULL,
    relevance INTEGER NOT NULL,
    status TEXT NOT NULL,
    origin TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    UNIQUE(source_id, source_type, target_id, target_type, anchor_text)
);

-- Outbound queries (what does item X link to?)
CREATE INDEX IF NOT EXISTS idx_links_source ON internal_links(source_id, source_type);

-- Inbound queries (who links to item X?) - used by rename and delete flows
CREATE INDEX IF NOT EXISTS idx_links_target ON internal_links(target_id, target_type);

CREATE INDEX IF NOT EXISTS idx_links_status ON internal_links(status);

-- Exclusion rules; unused key columns hold NULL
CREATE TABLE IF NOT EXISTS exclusion_rules (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    rule_type TEXT NOT NULL,
    phrase TEXT,
    source_id INTEGER,
    source_type TEXT,
    target_id INTEGER,
    target_type TEXT,
    reason TEXT,
    created_at INTEGER NOT NULL
);
"#;

const LINK_COLUMNS: &str = "id, source_id, source_type, target_id, target_type, anchor_text, \
     target_url, relevance, status, origin, created_at, updated_at";

/// Statuses whose records still describe a live or pending link.
const LIVE_STATUSES: &str = "('active', 'approved', 'suggested')";

/// SQLite-backed store for link records and exclusion rules.
///
/// Uses WAL mode for file databases so readers never block the writer.
#[derive(Clone)]
pub struct LinkStore {
    pool: SqlitePool,
}

impl LinkStore {
    /// Open an existing store or create a new one at `path`.
    pub async fn open(path: &Path) -> InterlinkResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?;

        Self::initialize(pool).await
    }

    /// Private in-memory store. A single connection that is never recycled
    /// keeps the database alive for the life of the pool.
    pub async fn open_in_memory() -> InterlinkResult<Self> {
        let options = SqliteConnectOptions::new().in_memory(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::initialize(pool).await
    }

    async fn initialize(pool: SqlitePool) -> InterlinkResult<Self> {
        // Idempotent - CREATE IF NOT EXISTS
        sqlx::query(SCHEMA_SQL).execute(&pool).await?;
        Ok(Self { pool })
    }

    // ----------------------------------------------------------------------
    // Link records
    // ----------------------------------------------------------------------

    /// Insert a record unless one with the same identity exists.
    pub async fn insert_link(&self, link: &NewLink) -> InterlinkResult<UpsertOutcome> {
        let now = Utc::now().timestamp();
        let anchor = normalize_anchor(&link.anchor_text);

        let inserted: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO internal_links
                (source_id, source_type, target_id, target_type, anchor_text,
                 target_url, relevance, status, origin, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(source_id, source_type, target_id, target_type, anchor_text) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(link.source.id)
        .bind(link.source.kind.as_str())
        .bind(link.target.id)
        .bind(link.target.kind.as_str())
        .bind(&anchor)
        .bind(&link.target_url)
        .bind(i64::from(link.relevance))
        .bind(link.status.as_str())
        .bind(link.origin.as_str())
        .bind(now)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if let Some((id,)) = inserted {
            return Ok(UpsertOutcome::Inserted(id));
        }

        let existing = self
            .find_by_identity(link.source, link.target, &anchor)
            .await?
            .ok_or_else(|| {
                InterlinkError::Other(format!(
                    "Link {} -> {} '{anchor}' conflicted but could not be read back",
                    link.source, link.target
                ))
            })?;
        Ok(UpsertOutcome::Existing(existing.id))
    }

    /// Record a link as injected: insert it ACTIVE, or move an existing
    /// non-terminal record with the same identity to ACTIVE.
    ///
    /// Terminal records are left untouched and reported as `Existing`.
    pub async fn activate_link(&self, link: &NewLink) -> InterlinkResult<UpsertOutcome> {
        let now = Utc::now().timestamp();
        let anchor = normalize_anchor(&link.anchor_text);

        let inserted: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO internal_links
                (source_id, source_type, target_id, target_type, anchor_text,
                 target_url, relevance, status, origin, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'active', ?, ?, ?)
            ON CONFLICT(source_id, source_type, target_id, target_type, anchor_text) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(link.source.id)
        .bind(link.source.kind.as_str())
        .bind(link.target.id)
        .bind(link.target.kind.as_str())
        .bind(&anchor)
        .bind(&link.target_url)
        .bind(i64::from(link.relevance))
        .bind(link.origin.as_str())
        .bind(now)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if let Some((id,)) = inserted {
            return Ok(UpsertOutcome::Inserted(id));
        }

        sqlx::query(
            r#"
            UPDATE internal_links
            SET status = 'active', target_url = ?, relevance = ?, updated_at = ?
            WHERE source_id = ? AND source_type = ? AND target_id = ? AND target_type = ?
              AND anchor_text = ? AND status IN ('suggested', 'approved', 'broken')
            "#,
        )
        .bind(&link.target_url)
        .bind(i64::from(link.relevance))
        .bind(now)
        .bind(link.source.id)
        .bind(link.source.kind.as_str())
        .bind(link.target.id)
        .bind(link.target.kind.as_str())
        .bind(&anchor)
        .execute(&self.pool)
        .await?;

        let existing = self
            .find_by_identity(link.source, link.target, &anchor)
            .await?
            .ok_or_else(|| {
                InterlinkError::Other(format!(
                    "Link {} -> {} '{anchor}' conflicted but could not be read back",
                    link.source, link.target
                ))
            })?;
        Ok(UpsertOutcome::Existing(existing.id))
    }

    pub async fn get_link(&self, id: i64) -> InterlinkResult<Option<InternalLinkRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {LINK_COLUMNS} FROM internal_links WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(record_from_row).transpose()
    }

    async fn find_by_identity(
        &self,
        source: ContentKey,
        target: ContentKey,
        anchor_text: &str,
    ) -> InterlinkResult<Option<InternalLinkRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {LINK_COLUMNS} FROM internal_links \
             WHERE source_id = ? AND source_type = ? AND target_id = ? AND target_type = ? \
             AND anchor_text = ?"
        ))
        .bind(source.id)
        .bind(source.kind.as_str())
        .bind(target.id)
        .bind(target.kind.as_str())
        .bind(anchor_text)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(record_from_row).transpose()
    }

    /// Records matching `filter`, oldest first.
    pub async fn list_links(&self, filter: &LinkFilter) -> InterlinkResult<Vec<InternalLinkRecord>> {
        let mut query: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {LINK_COLUMNS} FROM internal_links WHERE 1 = 1"));

        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(origin) = filter.origin {
            query.push(" AND origin = ").push_bind(origin.as_str());
        }
        if let Some(source) = filter.source {
            query
                .push(" AND source_id = ")
                .push_bind(source.id)
                .push(" AND source_type = ")
                .push_bind(source.kind.as_str());
        }
        if let Some(target) = filter.target {
            query
                .push(" AND target_id = ")
                .push_bind(target.id)
                .push(" AND target_type = ")
                .push_bind(target.kind.as_str());
        }

        query.push(" ORDER BY id");
        if filter.limit.is_some() || filter.offset.is_some() {
            // SQLite requires LIMIT before OFFSET; -1 means unbounded
            let limit = filter.limit.map_or(-1, |l| l as i64);
            query.push(" LIMIT ").push_bind(limit);
            query
                .push(" OFFSET ")
                .push_bind(filter.offset.unwrap_or(0) as i64);
        }

        let rows = query.build().fetch_all(&self.pool).await?;
        rows.iter().map(record_from_row).collect()
    }

    /// Move a record to `status`, enforcing allowed transitions.
    ///
    /// Returns `None` if the record does not exist.
    pub async fn set_status(
        &self,
        id: i64,
        status: LinkStatus,
    ) -> InterlinkResult<Option<InternalLinkRecord>> {
        let Some(mut record) = self.get_link(id).await? else {
            return Ok(None);
        };
        if record.status == status {
            return Ok(Some(record));
        }
        if !record.status.can_transition_to(status) {
            return Err(InterlinkError::InvalidTransition {
                id,
                from: record.status,
                to: status,
            });
        }

        let now = Utc::now();
        sqlx::query("UPDATE internal_links SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(now.timestamp())
            .bind(id)
            .execute(&self.pool)
            .await?;

        record.status = status;
        record.updated_at = from_timestamp(now.timestamp())?;
        Ok(Some(record))
    }

    /// Point every record targeting `target` at `url`.
    pub async fn update_target_url(&self, target: ContentKey, url: &str) -> InterlinkResult<u64> {
        let result = sqlx::query(
            "UPDATE internal_links SET target_url = ?, updated_at = ? \
             WHERE target_id = ? AND target_type = ? AND target_url != ?",
        )
        .bind(url)
        .bind(Utc::now().timestamp())
        .bind(target.id)
        .bind(target.kind.as_str())
        .bind(url)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Mark every live record targeting `target` as BROKEN.
    pub async fn mark_broken_for_target(&self, target: ContentKey) -> InterlinkResult<u64> {
        let result = sqlx::query(&format!(
            "UPDATE internal_links SET status = 'broken', updated_at = ? \
             WHERE target_id = ? AND target_type = ? AND status IN {LIVE_STATUSES}"
        ))
        .bind(Utc::now().timestamp())
        .bind(target.id)
        .bind(target.kind.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Mark live records from `source` whose target URL is in `urls` as BROKEN.
    pub async fn mark_broken_from_source(
        &self,
        source: ContentKey,
        urls: &[String],
    ) -> InterlinkResult<u64> {
        if urls.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let now = Utc::now().timestamp();
        let mut affected = 0;
        for url in urls {
            let result = sqlx::query(&format!(
                "UPDATE internal_links SET status = 'broken', updated_at = ? \
                 WHERE source_id = ? AND source_type = ? AND target_url = ? \
                 AND status IN {LIVE_STATUSES}"
            ))
            .bind(now)
            .bind(source.id)
            .bind(source.kind.as_str())
            .bind(url)
            .execute(&mut *tx)
            .await?;
            affected += result.rows_affected();
        }
        tx.commit().await?;
        Ok(affected)
    }

    /// Delete every record sourced by `source`.
    pub async fn delete_for_source(&self, source: ContentKey) -> InterlinkResult<u64> {
        let result =
            sqlx::query("DELETE FROM internal_links WHERE source_id = ? AND source_type = ?")
                .bind(source.id)
                .bind(source.kind.as_str())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Delete records sourced by `source` except REJECTED and REMOVED ones,
    /// which keep suppressing their pairs.
    pub async fn delete_live_for_source(&self, source: ContentKey) -> InterlinkResult<u64> {
        let result = sqlx::query(
            "DELETE FROM internal_links \
             WHERE source_id = ? AND source_type = ? AND status NOT IN ('rejected', 'removed')",
        )
        .bind(source.id)
        .bind(source.kind.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete SUGGESTED records sourced by `source`.
    pub async fn delete_suggested_for_source(&self, source: ContentKey) -> InterlinkResult<u64> {
        let result = sqlx::query(
            "DELETE FROM internal_links \
             WHERE source_id = ? AND source_type = ? AND status = 'suggested'",
        )
        .bind(source.id)
        .bind(source.kind.as_str())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// (source, target) pairs with a REJECTED or REMOVED record.
    pub async fn suppressed_pairs(&self) -> InterlinkResult<Vec<(ContentKey, ContentKey)>> {
        let rows = sqlx::query(
            "SELECT DISTINCT source_id, source_type, target_id, target_type \
             FROM internal_links WHERE status IN ('rejected', 'removed')",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> InterlinkResult<(ContentKey, ContentKey)> {
                Ok((
                    key_from_row(row, "source_id", "source_type")?,
                    key_from_row(row, "target_id", "target_type")?,
                ))
            })
            .collect()
    }

    /// Distinct stored URLs of records targeting `target`.
    pub async fn target_urls_for(&self, target: ContentKey) -> InterlinkResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT target_url FROM internal_links \
             WHERE target_id = ? AND target_type = ? ORDER BY target_url",
        )
        .bind(target.id)
        .bind(target.kind.as_str())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(url,)| url).collect())
    }

    pub async fn count_by_status(&self) -> InterlinkResult<HashMap<LinkStatus, u64>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM internal_links GROUP BY status")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter()
            .map(|(status, count)| -> InterlinkResult<(LinkStatus, u64)> {
                Ok((parse_column(&status)?, count as u64))
            })
            .collect()
    }

    pub async fn count_by_origin(&self) -> InterlinkResult<HashMap<LinkOrigin, u64>> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT origin, COUNT(*) FROM internal_links GROUP BY origin")
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter()
            .map(|(origin, count)| -> InterlinkResult<(LinkOrigin, u64)> {
                Ok((parse_column(&origin)?, count as u64))
            })
            .collect()
    }

    /// Outbound and inbound ACTIVE link counts per content item.
    ///
    /// Items with no active links in either direction are absent.
    pub async fn active_link_counts(&self) -> InterlinkResult<HashMap<ContentKey, (u64, u64)>> {
        let mut counts: HashMap<ContentKey, (u64, u64)> = HashMap::new();

        let outbound = sqlx::query(
            "SELECT source_id AS id, source_type AS kind, COUNT(*) AS n FROM internal_links \
             WHERE status = 'active' GROUP BY source_id, source_type",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in &outbound {
            let key = key_from_row(row, "id", "kind")?;
            counts.entry(key).or_default().0 = row.try_get::<i64, _>("n")? as u64;
        }

        let inbound = sqlx::query(
            "SELECT target_id AS id, target_type AS kind, COUNT(*) AS n FROM internal_links \
             WHERE status = 'active' GROUP BY target_id, target_type",
        )
        .fetch_all(&self.pool)
        .await?;
        for row in &inbound {
            let key = key_from_row(row, "id", "kind")?;
            counts.entry(key).or_default().1 = row.try_get::<i64, _>("n")? as u64;
        }

        Ok(counts)
    }

    /// Get total number of link records.
    pub async fn link_count(&self) -> InterlinkResult<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM internal_links")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 as u64)
    }

    // ----------------------------------------------------------------------
    // Exclusion rules
    // ----------------------------------------------------------------------

    /// Persist a rule. Phrases are stored lowercased.
    pub async fn add_exclusion(
        &self,
        scope: &ExclusionScope,
        reason: Option<&str>,
    ) -> InterlinkResult<ExclusionRule> {
        let created_at = Utc::now();
        let (phrase, source, target) = match scope {
            ExclusionScope::Phrase { phrase } => {
                let phrase = phrase.split_whitespace().collect::<Vec<_>>().join(" ");
                if phrase.is_empty() {
                    return Err(InterlinkError::InvalidRequest(
                        "Exclusion phrase must not be empty".to_string(),
                    ));
                }
                (Some(phrase.to_lowercase()), None, None)
            }
            ExclusionScope::Target { target } => (None, None, Some(*target)),
            ExclusionScope::Source { source } => (None, Some(*source), None),
            ExclusionScope::Pair { source, target } => (None, Some(*source), Some(*target)),
        };

        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO exclusion_rules
                (rule_type, phrase, source_id, source_type, target_id, target_type, reason, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(scope.rule_type().as_str())
        .bind(phrase.as_deref())
        .bind(source.map(|k| k.id))
        .bind(source.map(|k| k.kind.as_str()))
        .bind(target.map(|k| k.id))
        .bind(target.map(|k| k.kind.as_str()))
        .bind(reason)
        .bind(created_at.timestamp())
        .fetch_one(&self.pool)
        .await?;

        let scope = match (scope, phrase) {
            (ExclusionScope::Phrase { .. }, Some(phrase)) => ExclusionScope::Phrase { phrase },
            (other, _) => other.clone(),
        };
        Ok(ExclusionRule {
            id,
            scope,
            reason: reason.map(str::to_string),
            created_at: from_timestamp(created_at.timestamp())?,
        })
    }

    /// Delete a rule. Returns whether it existed.
    pub async fn remove_exclusion(&self, id: i64) -> InterlinkResult<bool> {
        let result = sqlx::query("DELETE FROM exclusion_rules WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Every rule, oldest first.
    pub async fn list_exclusions(&self) -> InterlinkResult<Vec<ExclusionRule>> {
        let rows = sqlx::query(
            "SELECT id, rule_type, phrase, source_id, source_type, target_id, target_type, \
             reason, created_at FROM exclusion_rules ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(rule_from_row).collect()
    }

    pub async fn exclusion_count(&self) -> InterlinkResult<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM exclusion_rules")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 as u64)
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn normalize_anchor(anchor: &str) -> String {
    anchor
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn decode_error(message: String) -> InterlinkError {
    InterlinkError::Store(sqlx::Error::Decode(message.into()))
}

fn parse_column<T: std::str::FromStr<Err = String>>(value: &str) -> InterlinkResult<T> {
    value.parse().map_err(decode_error)
}

fn from_timestamp(secs: i64) -> InterlinkResult<DateTime<Utc>> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .ok_or_else(|| decode_error(format!("invalid timestamp {secs}")))
}

fn key_from_row(row: &SqliteRow, id_col: &str, kind_col: &str) -> InterlinkResult<ContentKey> {
    let id: i64 = row.try_get(id_col)?;
    let kind: String = row.try_get(kind_col)?;
    Ok(ContentKey::new(id, parse_column::<ContentKind>(&kind)?))
}

fn optional_key(
    row: &SqliteRow,
    id_col: &str,
    kind_col: &str,
) -> InterlinkResult<Option<ContentKey>> {
    let id: Option<i64> = row.try_get(id_col)?;
    let kind: Option<String> = row.try_get(kind_col)?;
    match (id, kind) {
        (Some(id), Some(kind)) => Ok(Some(ContentKey::new(id, parse_column(&kind)?))),
        _ => Ok(None),
    }
}

fn record_from_row(row: &SqliteRow) -> InterlinkResult<InternalLinkRecord> {
    let status: String = row.try_get("status")?;
    let origin: String = row.try_get("origin")?;
    let relevance: i64 = row.try_get("relevance")?;

    Ok(InternalLinkRecord {
        id: row.try_get("id")?,
        source: key_from_row(row, "source_id", "source_type")?,
        target: key_from_row(row, "target_id", "target_type")?,
        anchor_text: row.try_get("anchor_text")?,
        target_url: row.try_get("target_url")?,
        relevance: relevance.clamp(0, 100) as u8,
        status: parse_column(&status)?,
        origin: parse_column(&origin)?,
        created_at: from_timestamp(row.try_get("created_at")?)?,
        updated_at: from_timestamp(row.try_get("updated_at")?)?,
    })
}

fn rule_from_row(row: &SqliteRow) -> InterlinkResult<ExclusionRule> {
    let rule_type: String = row.try_get("rule_type")?;
    let source = optional_key(row, "source_id", "source_type")?;
    let target = optional_key(row, "target_id", "target_type")?;
    let missing = |what: &str| decode_error(format!("exclusion rule is missing its {what}"));

    let scope = match parse_column::<ExclusionType>(&rule_type)? {
        ExclusionType::Phrase => ExclusionScope::Phrase {
            phrase: row
                .try_get::<Option<String>, _>("phrase")?
                .ok_or_else(|| missing("phrase"))?,
        },
        ExclusionType::Target => ExclusionScope::Target {
            target: target.ok_or_else(|| missing("target"))?,
        },
        ExclusionType::Source => ExclusionScope::Source {
            source: source.ok_or_else(|| missing("source"))?,
        },
        ExclusionType::Pair => ExclusionScope::Pair {
            source: source.ok_or_else(|| missing("source"))?,
            target: target.ok_or_else(|| missing("target"))?,
        },
    };

    Ok(ExclusionRule {
        id: row.try_get("id")?,
        scope,
        reason: row.try_get("reason")?,
        created_at: from_timestamp(row.try_get("created_at")?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_link(source: i64, target: i64, anchor: &str, status: LinkStatus) -> NewLink {
        NewLink {
            source: ContentKey::article(source),
            target: ContentKey::article(target),
            anchor_text: anchor.to_string(),
            target_url: format!("/blog/post-{target}"),
            relevance: 60,
            status,
            origin: LinkOrigin::Auto,
        }
    }

    #[tokio::test]
    async fn test_insert_is_idempotent() -> InterlinkResult<()> {
        let store = LinkStore::open_in_memory().await?;
        let link = new_link(1, 2, "Cache Layer", LinkStatus::Suggested);

        let first = store.insert_link(&link).await?;
        let second = store.insert_link(&link).await?;

        assert!(first.is_inserted());
        assert_eq!(second, UpsertOutcome::Existing(first.id()));
        assert_eq!(store.link_count().await?, 1);

        let record = store.get_link(first.id()).await?.unwrap();
        assert_eq!(record.anchor_text, "cache layer");
        assert_eq!(record.status, LinkStatus::Suggested);
        Ok(())
    }

    #[tokio::test]
    async fn test_activate_promotes_but_never_resurrects() -> InterlinkResult<()> {
        let store = LinkStore::open_in_memory().await?;
        let suggested = store
            .insert_link(&new_link(1, 2, "cache layer", LinkStatus::Suggested))
            .await?;
        let rejected = store
            .insert_link(&new_link(1, 3, "write path", LinkStatus::Rejected))
            .await?;

        store
            .activate_link(&new_link(1, 2, "cache layer", LinkStatus::Active))
            .await?;
        store
            .activate_link(&new_link(1, 3, "write path", LinkStatus::Active))
            .await?;

        let promoted = store.get_link(suggested.id()).await?.unwrap();
        assert_eq!(promoted.status, LinkStatus::Active);
        let untouched = store.get_link(rejected.id()).await?.unwrap();
        assert_eq!(untouched.status, LinkStatus::Rejected);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_status_enforces_transitions() -> InterlinkResult<()> {
        let store = LinkStore::open_in_memory().await?;
        let id = store
            .insert_link(&new_link(1, 2, "cache layer", LinkStatus::Suggested))
            .await?
            .id();

        let rejected = store.set_status(id, LinkStatus::Rejected).await?.unwrap();
        assert_eq!(rejected.status, LinkStatus::Rejected);
        // Same-state retry is a no-op
        assert!(store.set_status(id, LinkStatus::Rejected).await?.is_some());

        let err = store.set_status(id, LinkStatus::Approved).await.unwrap_err();
        assert!(matches!(err, InterlinkError::InvalidTransition { .. }));
        assert!(store.set_status(9999, LinkStatus::Approved).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_list_links_filters() -> InterlinkResult<()> {
        let store = LinkStore::open_in_memory().await?;
        store.insert_link(&new_link(1, 2, "alpha", LinkStatus::Suggested)).await?;
        store.insert_link(&new_link(1, 3, "beta", LinkStatus::Active)).await?;
        store.insert_link(&new_link(4, 2, "gamma", LinkStatus::Active)).await?;

        let active = store
            .list_links(&LinkFilter::default().with_status(LinkStatus::Active))
            .await?;
        assert_eq!(active.len(), 2);

        let from_one = store
            .list_links(&LinkFilter::default().with_source(ContentKey::article(1)))
            .await?;
        assert_eq!(from_one.len(), 2);

        let to_two_limited = store
            .list_links(&LinkFilter::default().with_target(ContentKey::article(2)).with_limit(1))
            .await?;
        assert_eq!(to_two_limited.len(), 1);
        assert_eq!(to_two_limited[0].anchor_text, "alpha");

        let paged = store
            .list_links(&LinkFilter {
                offset: Some(2),
                ..LinkFilter::default()
            })
            .await?;
        assert_eq!(paged.len(), 1);
        assert_eq!(paged[0].anchor_text, "gamma");
        Ok(())
    }

    #[tokio::test]
    async fn test_target_lifecycle_queries() -> InterlinkResult<()> {
        let store = LinkStore::open_in_memory().await?;
        store.insert_link(&new_link(1, 2, "alpha", LinkStatus::Active)).await?;
        store.insert_link(&new_link(3, 2, "beta", LinkStatus::Suggested)).await?;
        store.insert_link(&new_link(4, 2, "gamma", LinkStatus::Rejected)).await?;

        assert_eq!(store.update_target_url(ContentKey::article(2), "/blog/renamed").await?, 3);
        assert_eq!(store.target_urls_for(ContentKey::article(2)).await?, vec!["/blog/renamed"]);

        assert_eq!(store.mark_broken_for_target(ContentKey::article(2)).await?, 2);
        // Retry touches nothing
        assert_eq!(store.mark_broken_for_target(ContentKey::article(2)).await?, 0);

        let by_status = store.count_by_status().await?;
        assert_eq!(by_status.get(&LinkStatus::Broken), Some(&2));
        assert_eq!(by_status.get(&LinkStatus::Rejected), Some(&1));

        let pairs = store.suppressed_pairs().await?;
        assert_eq!(pairs, vec![(ContentKey::article(4), ContentKey::article(2))]);
        Ok(())
    }

    #[tokio::test]
    async fn test_source_cleanup_and_counts() -> InterlinkResult<()> {
        let store = LinkStore::open_in_memory().await?;
        store.insert_link(&new_link(1, 2, "alpha", LinkStatus::Active)).await?;
        store.insert_link(&new_link(1, 3, "beta", LinkStatus::Suggested)).await?;
        store.insert_link(&new_link(3, 2, "gamma", LinkStatus::Active)).await?;

        let counts = store.active_link_counts().await?;
        assert_eq!(counts.get(&ContentKey::article(1)), Some(&(1, 0)));
        assert_eq!(counts.get(&ContentKey::article(2)), Some(&(0, 2)));
        assert_eq!(counts.get(&ContentKey::article(3)), Some(&(1, 0)));

        assert_eq!(store.delete_suggested_for_source(ContentKey::article(1)).await?, 1);
        assert_eq!(
            store
                .mark_broken_from_source(ContentKey::article(1), &["/blog/post-2".to_string()])
                .await?,
            1
        );
        assert_eq!(store.delete_for_source(ContentKey::article(1)).await?, 1);
        assert_eq!(store.link_count().await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_live_cleanup_keeps_decisions() -> InterlinkResult<()> {
        let store = LinkStore::open_in_memory().await?;
        store.insert_link(&new_link(1, 2, "alpha", LinkStatus::Rejected)).await?;
        store.insert_link(&new_link(1, 3, "beta", LinkStatus::Removed)).await?;
        store.insert_link(&new_link(1, 4, "gamma", LinkStatus::Active)).await?;
        store.insert_link(&new_link(1, 5, "delta", LinkStatus::Suggested)).await?;

        assert_eq!(store.delete_live_for_source(ContentKey::article(1)).await?, 2);
        assert_eq!(store.link_count().await?, 2);
        assert_eq!(
            store.suppressed_pairs().await?.len(),
            2,
            "rejected and removed pairs stay suppressed"
        );

        assert_eq!(store.delete_for_source(ContentKey::article(1)).await?, 2);
        assert!(store.suppressed_pairs().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_exclusion_rules_round_trip() -> InterlinkResult<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("links.sqlite");

        {
            let store = LinkStore::open(&path).await?;
            store
                .add_exclusion(&ExclusionScope::Phrase { phrase: " Click  HERE ".into() }, Some("noise"))
                .await?;
            store
                .add_exclusion(
                    &ExclusionScope::Pair {
                        source: ContentKey::article(1),
                        target: ContentKey::page(2),
                    },
                    None,
                )
                .await?;
            store.close().await;
        }

        let store = LinkStore::open(&path).await?;
        let rules = store.list_exclusions().await?;
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].scope, ExclusionScope::Phrase { phrase: "click here".into() });
        assert_eq!(rules[0].reason.as_deref(), Some("noise"));
        assert_eq!(
            rules[1].scope,
            ExclusionScope::Pair {
                source: ContentKey::article(1),
                target: ContentKey::page(2),
            }
        );

        assert!(store.remove_exclusion(rules[0].id).await?);
        assert!(!store.remove_exclusion(rules[0].id).await?);
        assert_eq!(store.exclusion_count().await?, 1);

        let empty = store
            .add_exclusion(&ExclusionScope::Phrase { phrase: "   ".into() }, None)
            .await;
        assert!(matches!(empty, Err(InterlinkError::InvalidRequest(_))));
        store.close().await;
        Ok(())
    }
}
