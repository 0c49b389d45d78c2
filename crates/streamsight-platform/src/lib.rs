//! Reqwest-backed implementations of the Streamsight platform seams.
//!
//! [`PlatformClient`] implements the inventory, binary-store, engine,
//! alarm, and event traits from `streamsight-core`; [`PollingPushChannel`]
//! provides the push channel and [`SampleCatalog`] the community sample
//! listing.

mod alarms;
mod binaries;
mod client;
mod engine;
mod events;
mod inventory;
mod paging;
mod realtime;
mod samples;

pub use client::PlatformClient;
pub use realtime::PollingPushChannel;
pub use samples::SampleCatalog;
