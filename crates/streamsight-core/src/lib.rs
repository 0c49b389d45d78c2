//! Core traits and types for Streamsight.
//!
//! This crate defines the domain model, the platform seam traits, and the
//! caching/eventing primitives shared by the gateway, the directory, and
//! the CLI.

pub mod api;
pub mod bus;
pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod naming;

pub use error::{Error, Result};

pub use bus::{DirectoryEvent, EventBus, EventBusReceiver, DEFAULT_CHANNEL_CAPACITY};
pub use cache::CacheCell;
pub use config::{EngineIdStrategy, PlatformConfig};
pub use model::{
    Alarm, BlockDescriptor, EngineId, EngineStatus, Event, ExtensionDetail,
    ExtensionMetadataDocument, ExtensionRecord, ManagedObject, PagedResult, PageStatistics,
    SampleBlock, SourceRef,
};

/// Re-exports commonly used types.
pub mod prelude {
    pub use crate::api::{
        AlarmApi, BinaryStore, ConfirmationGate, DynAlarmApi, DynBinaryStore,
        DynConfirmationGate, DynEngineApi, DynEventApi, DynInventory, DynNotifier,
        DynPushChannel, EngineApi, EventApi, Inventory, InventoryFilter, InventoryQuery,
        Notifier, PageFilter, PushChannel, PushSubscription,
    };
    pub use crate::bus::{DirectoryEvent, EventBus, EventBusReceiver};
    pub use crate::cache::CacheCell;
    pub use crate::config::{EngineIdStrategy, PlatformConfig};
    pub use crate::error::{Error, Result};
    pub use crate::model::{
        Alarm, BlockDescriptor, EngineId, EngineStatus, Event, ExtensionDetail,
        ExtensionMetadataDocument, ExtensionRecord, ManagedObject, PagedResult,
        PageStatistics, SampleBlock,
    };
    pub use crate::naming::{is_custom_block, is_loaded, metadata_key, strip_file_extension};
}
