//! Content records and the repository seam the engine reads them through.

pub mod memory;
pub mod model;
pub mod repository;

pub use memory::MemoryContentRepository;
pub use model::{Article, ContentItem, ContentKey, ContentKind, ContentStatus, Page};
pub use repository::ContentRepository;
