//! Link record status and origin.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where a persisted link stands.
///
/// ```text
/// SUGGESTED ──approve──▶ APPROVED ──inject──▶ ACTIVE
///     │                      │                  │
///     └──────────────────────┴─── target gone ──┴──▶ BROKEN ──re-inject──▶ ACTIVE
/// any non-terminal ──reject──▶ REJECTED   (terminal)
/// SUGGESTED/APPROVED/ACTIVE ──remove──▶ REMOVED   (terminal)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Active,
    Suggested,
    Approved,
    Rejected,
    Broken,
    Removed,
}

impl LinkStatus {
    pub const ALL: [LinkStatus; 6] = [
        LinkStatus::Active,
        LinkStatus::Suggested,
        LinkStatus::Approved,
        LinkStatus::Rejected,
        LinkStatus::Broken,
        LinkStatus::Removed,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LinkStatus::Active => "active",
            LinkStatus::Suggested => "suggested",
            LinkStatus::Approved => "approved",
            LinkStatus::Rejected => "rejected",
            LinkStatus::Broken => "broken",
            LinkStatus::Removed => "removed",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, LinkStatus::Rejected | LinkStatus::Removed)
    }

    /// Whether a record may move from `self` to `next`.
    ///
    /// Staying in the same status is always allowed so retries are no-ops.
    #[must_use]
    pub fn can_transition_to(self, next: LinkStatus) -> bool {
        use LinkStatus::*;

        if self == next {
            return true;
        }
        match self {
            Suggested | Approved => matches!(next, Approved | Active | Rejected | Broken | Removed),
            Active => matches!(next, Broken | Rejected | Removed),
            // Re-injection after the target comes back
            Broken => matches!(next, Active | Rejected),
            Rejected | Removed => false,
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LinkStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown link status '{s}'"))
    }
}

/// Who created a link record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkOrigin {
    /// Discovered by a single-item scan or lifecycle hook
    Auto,
    /// Created by an editor
    Manual,
    /// Inserted by a batch run
    Cron,
}

impl LinkOrigin {
    pub const ALL: [LinkOrigin; 3] = [LinkOrigin::Auto, LinkOrigin::Manual, LinkOrigin::Cron];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LinkOrigin::Auto => "auto",
            LinkOrigin::Manual => "manual",
            LinkOrigin::Cron => "cron",
        }
    }
}

impl fmt::Display for LinkOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LinkOrigin::ALL
            .into_iter()
            .find(|origin| origin.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown link origin '{s}'"))
    }
}
