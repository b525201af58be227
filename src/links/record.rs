//! Persisted link records and the shapes used to create and query them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::{LinkOrigin, LinkStatus};
use crate::content::ContentKey;
use crate::matching::LinkCandidate;

/// The durable unit of truth for one internal link.
///
/// At most one record exists per (source, target, anchor text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalLinkRecord {
    pub id: i64,
    pub source: ContentKey,
    pub target: ContentKey,
    pub anchor_text: String,
    pub target_url: String,
    pub relevance: u8,
    pub status: LinkStatus,
    pub origin: LinkOrigin,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A record about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub source: ContentKey,
    pub target: ContentKey,
    /// Stored lowercased and trimmed
    pub anchor_text: String,
    pub target_url: String,
    pub relevance: u8,
    pub status: LinkStatus,
    pub origin: LinkOrigin,
}

impl NewLink {
    pub fn from_candidate(candidate: &LinkCandidate, status: LinkStatus, origin: LinkOrigin) -> Self {
        Self {
            source: candidate.source,
            target: candidate.target,
            anchor_text: candidate.anchor_text.clone(),
            target_url: candidate.target_url.clone(),
            relevance: candidate.relevance,
            status,
            origin,
        }
    }
}

/// Result of an idempotent insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new row was created
    Inserted(i64),
    /// A row with the same identity already existed and was left alone
    Existing(i64),
}

impl UpsertOutcome {
    #[must_use]
    pub fn id(self) -> i64 {
        match self {
            UpsertOutcome::Inserted(id) | UpsertOutcome::Existing(id) => id,
        }
    }

    #[must_use]
    pub fn is_inserted(self) -> bool {
        matches!(self, UpsertOutcome::Inserted(_))
    }
}

/// Filters for listing link records. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkFilter {
    pub status: Option<LinkStatus>,
    pub origin: Option<LinkOrigin>,
    pub source: Option<ContentKey>,
    pub target: Option<ContentKey>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl LinkFilter {
    #[must_use]
    pub fn with_status(mut self, status: LinkStatus) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: LinkOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: ContentKey) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: ContentKey) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
