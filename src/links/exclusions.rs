//! Exclusion rules and the per-operation lookup set built from them.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::ContentKey;

/// Kind of suppression a rule applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExclusionType {
    Phrase,
    Target,
    Source,
    Pair,
}

impl ExclusionType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExclusionType::Phrase => "phrase",
            ExclusionType::Target => "target",
            ExclusionType::Source => "source",
            ExclusionType::Pair => "pair",
        }
    }
}

impl fmt::Display for ExclusionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExclusionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "phrase" => Ok(ExclusionType::Phrase),
            "target" => Ok(ExclusionType::Target),
            "source" => Ok(ExclusionType::Source),
            "pair" => Ok(ExclusionType::Pair),
            other => Err(format!("unknown exclusion type '{other}'")),
        }
    }
}

/// What a rule suppresses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExclusionScope {
    /// Never use this phrase as anchor text
    Phrase { phrase: String },
    /// Never link to this item
    Target { target: ContentKey },
    /// Never auto-link from this item
    Source { source: ContentKey },
    /// Never link from `source` to `target`
    Pair { source: ContentKey, target: ContentKey },
}

impl ExclusionScope {
    #[must_use]
    pub fn rule_type(&self) -> ExclusionType {
        match self {
            ExclusionScope::Phrase { .. } => ExclusionType::Phrase,
            ExclusionScope::Target { .. } => ExclusionType::Target,
            ExclusionScope::Source { .. } => ExclusionType::Source,
            ExclusionScope::Pair { .. } => ExclusionType::Pair,
        }
    }
}

/// A persisted exclusion rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
    pub id: i64,
    pub scope: ExclusionScope,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ExclusionRule {
    #[must_use]
    pub fn new(id: i64, scope: ExclusionScope) -> Self {
        Self {
            id,
            scope,
            reason: None,
            created_at: Utc::now(),
        }
    }
}

/// All rules for one operation, split into four lookup sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    phrases: HashSet<String>,
    targets: HashSet<ContentKey>,
    sources: HashSet<ContentKey>,
    pairs: HashSet<(ContentKey, ContentKey)>,
}

impl ExclusionSet {
    pub fn from_rules(rules: &[ExclusionRule]) -> Self {
        let mut set = Self::default();
        for rule in rules {
            match &rule.scope {
                ExclusionScope::Phrase { phrase } => {
                    set.phrases.insert(normalize(phrase));
                }
                ExclusionScope::Target { target } => {
                    set.targets.insert(*target);
                }
                ExclusionScope::Source { source } => {
                    set.sources.insert(*source);
                }
                ExclusionScope::Pair { source, target } => {
                    set.pairs.insert((*source, *target));
                }
            }
        }
        set
    }

    /// Merge pairs that persisted records have suppressed (rejected or
    /// removed links) for the duration of an operation.
    #[must_use]
    pub fn with_suppressed_pairs(
        mut self,
        pairs: impl IntoIterator<Item = (ContentKey, ContentKey)>,
    ) -> Self {
        self.pairs.extend(pairs);
        self
    }

    #[must_use]
    pub fn is_phrase_excluded(&self, phrase: &str) -> bool {
        !self.phrases.is_empty() && self.phrases.contains(&normalize(phrase))
    }

    #[must_use]
    pub fn is_source_excluded(&self, source: ContentKey) -> bool {
        self.sources.contains(&source)
    }

    #[must_use]
    pub fn is_target_excluded(&self, target: ContentKey) -> bool {
        self.targets.contains(&target)
    }

    #[must_use]
    pub fn is_pair_excluded(&self, source: ContentKey, target: ContentKey) -> bool {
        self.pairs.contains(&(source, target))
    }

    /// Target-level or pair-level suppression for a link.
    #[must_use]
    pub fn blocks(&self, source: ContentKey, target: ContentKey) -> bool {
        self.is_target_excluded(target) || self.is_pair_excluded(source, target)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
            && self.targets.is_empty()
            && self.sources.is_empty()
            && self.pairs.is_empty()
    }
}

fn normalize(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
