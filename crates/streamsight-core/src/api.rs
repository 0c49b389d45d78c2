//! Seam traits between the directory and the platform.
//!
//! The directory only ever talks to these traits; the reqwest-backed
//! implementations live in `streamsight-platform`, and tests substitute
//! in-memory fakes.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

use crate::error::Result;
use crate::model::{
    Alarm, EngineId, EngineStatus, Event, ExtensionDetail, ExtensionMetadataDocument,
    ManagedObject, PagedResult,
};

/// Filter for inventory listings.
#[derive(Debug, Clone)]
pub struct InventoryFilter {
    pub page_size: u32,
    pub fragment_type: Option<String>,
    pub with_total_pages: bool,
}

impl Default for InventoryFilter {
    fn default() -> Self {
        Self {
            page_size: 100,
            fragment_type: None,
            with_total_pages: true,
        }
    }
}

impl InventoryFilter {
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_fragment_type(mut self, fragment_type: impl Into<String>) -> Self {
        self.fragment_type = Some(fragment_type.into());
        self
    }
}

/// Attribute query for inventory lookups.
#[derive(Debug, Clone, Default)]
pub struct InventoryQuery {
    pub name: Option<String>,
    pub application_id: Option<String>,
}

/// Filter for alarm/event pages.
#[derive(Debug, Clone)]
pub struct PageFilter {
    pub page_size: u32,
    pub current_page: u32,
    pub source: Option<String>,
    pub status: Option<String>,
    pub with_total_pages: bool,
}

impl Default for PageFilter {
    fn default() -> Self {
        Self {
            page_size: crate::config::MONITOR_PAGE_SIZE,
            current_page: 1,
            source: None,
            status: None,
            with_total_pages: true,
        }
    }
}

/// Managed-object inventory access.
#[async_trait]
pub trait Inventory: Send + Sync {
    /// List inventory entries matching the filter.
    async fn list(&self, filter: &InventoryFilter) -> Result<PagedResult<ManagedObject>>;

    /// Query inventory entries by attributes.
    async fn query(
        &self,
        query: &InventoryQuery,
        filter: &InventoryFilter,
    ) -> Result<PagedResult<ManagedObject>>;

    /// Fetch a single managed object by id.
    async fn get(&self, id: &str) -> Result<ManagedObject>;
}

/// Binary store holding uploaded extension archives.
#[async_trait]
pub trait BinaryStore: Send + Sync {
    /// Upload an archive, returning its inventory representation.
    async fn upload(&self, name: &str, data: Vec<u8>) -> Result<ManagedObject>;

    /// Download an archive by managed-object id.
    async fn download(&self, id: &str) -> Result<Vec<u8>>;

    /// Delete an archive by managed-object id.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Engine-facing endpoints (metadata, details, id, status, restart).
#[async_trait]
pub trait EngineApi: Send + Sync {
    /// Metadata document listing loaded extension files.
    async fn metadata(&self) -> Result<ExtensionMetadataDocument>;

    /// Per-extension detail document.
    ///
    /// HTTP failures surface as [`crate::Error::Http`]; the caller decides
    /// which statuses mean "absent".
    async fn extension_detail(&self, name: &str) -> Result<ExtensionDetail>;

    /// Engine id from the companion microservice endpoint.
    async fn engine_id(&self) -> Result<EngineId>;

    /// Engine diagnostic status document.
    async fn status(&self) -> Result<EngineStatus>;

    /// Submit an engine restart. Does not wait for completion.
    async fn restart(&self) -> Result<()>;
}

/// Alarm collection access.
#[async_trait]
pub trait AlarmApi: Send + Sync {
    async fn alarms(&self, filter: &PageFilter) -> Result<PagedResult<Alarm>>;
}

/// Event collection access.
#[async_trait]
pub trait EventApi: Send + Sync {
    async fn events(&self, filter: &PageFilter) -> Result<PagedResult<Event>>;
}

/// Push-notification channel to the platform.
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// Open a subscription on the given channel path.
    async fn subscribe(&self, channel: &str) -> Result<PushSubscription>;
}

/// A live push subscription.
///
/// Scoped resource: dropping the subscription stops the underlying feed.
pub struct PushSubscription {
    channel: String,
    rx: mpsc::Receiver<Value>,
    stop: Option<oneshot::Sender<()>>,
}

impl PushSubscription {
    /// Wrap a message stream plus its stop handle.
    pub fn new(
        channel: impl Into<String>,
        rx: mpsc::Receiver<Value>,
        stop: oneshot::Sender<()>,
    ) -> Self {
        Self {
            channel: channel.into(),
            rx,
            stop: Some(stop),
        }
    }

    /// Channel path this subscription listens on.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Next message, or `None` once the feed has stopped.
    pub async fn recv(&mut self) -> Option<Value> {
        self.rx.recv().await
    }
}

impl Drop for PushSubscription {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

/// Operator yes/no confirmation before destructive actions.
#[async_trait]
pub trait ConfirmationGate: Send + Sync {
    async fn confirm(&self, message: &str) -> bool;
}

/// Operator-facing notifications (success banners, warnings).
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn warning(&self, message: &str);
}

/// Shared trait-object handles used by service constructors.
pub type DynInventory = Arc<dyn Inventory>;
pub type DynBinaryStore = Arc<dyn BinaryStore>;
pub type DynEngineApi = Arc<dyn EngineApi>;
pub type DynAlarmApi = Arc<dyn AlarmApi>;
pub type DynEventApi = Arc<dyn EventApi>;
pub type DynPushChannel = Arc<dyn PushChannel>;
pub type DynConfirmationGate = Arc<dyn ConfirmationGate>;
pub type DynNotifier = Arc<dyn Notifier>;
