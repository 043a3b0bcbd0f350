//! app-usage - Storage usage breakdown of installed application packages
//!
//! This crate provides functionality for:
//! - Building a size-annotated tree of installed packages plus free and
//!   unattributed system space
//! - Re-filtering that tree by package component without rescanning
//! - Reporting the tree as text or JSON

pub mod apps;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod filter;
pub mod report;
pub mod space;
pub mod tree;

// Re-export commonly used types
pub use apps::{AppUsage, FilterUpdate, PackageRecord, PackageSource};
pub use config::Config;
pub use error::{Result, UsageError};
pub use filter::{AppFilter, Component};
pub use space::{VolumeStats, VolumeStatsProvider};
pub use tree::{EntryTree, TreeBuilder};
