//! Link records, their lifecycle states, and exclusion rules.

pub mod exclusions;
pub mod record;
pub mod status;

pub use exclusions::{ExclusionRule, ExclusionScope, ExclusionSet, ExclusionType};
pub use record::{InternalLinkRecord, LinkFilter, NewLink, UpsertOutcome};
pub use status::{LinkOrigin, LinkStatus};
