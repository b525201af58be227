//! Configuration module for interlinking
//!
//! This module provides the `InterlinkConfig` struct and its builder
//! for configuring discovery, injection and reporting with validation
//! and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::InterlinkConfigBuilder;
pub use types::InterlinkConfig;
