//! Extension directory service for Streamsight.
//!
//! The directory is the reconciliation and caching layer between the
//! operator-facing frontends and the platform: it lists, enriches,
//! uploads, deletes, and monitors analytics extensions.

mod directory;
mod monitor;

pub use directory::{ExtensionDirectory, PlatformServices, StatusSubscription};
pub use monitor::MonitorFeed;
