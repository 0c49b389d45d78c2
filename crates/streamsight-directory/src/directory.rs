//! Cache-and-reconcile layer over the platform's extension resources.
//!
//! [`ExtensionDirectory`] composes three remote resources — the inventory
//! of extension binaries, the engine's metadata document of loaded
//! extension files, and the per-extension detail documents — into the
//! enriched extension list shown to operators. Results are memoized until
//! explicitly invalidated.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use streamsight_core::api::{
    DynBinaryStore, DynConfirmationGate, DynEngineApi, DynInventory, DynNotifier,
    DynPushChannel, InventoryFilter, InventoryQuery,
};
use streamsight_core::bus::{DirectoryEvent, EventBus, EventBusReceiver};
use streamsight_core::cache::CacheCell;
use streamsight_core::config::{
    paths, EngineIdStrategy, ENGINE_STATUS_DOWN, EXTENSION_FRAGMENT, EXTENSION_PAGE_SIZE,
};
use streamsight_core::error::{Error, Result};
use streamsight_core::model::{
    BlockDescriptor, EngineId, EngineStatus, ExtensionDetail, ExtensionRecord, ManagedObject,
    PagedResult,
};
use streamsight_core::naming::{is_custom_block, is_loaded, strip_file_extension};

/// Platform seams the directory operates on.
pub struct PlatformServices {
    pub inventory: DynInventory,
    pub binaries: DynBinaryStore,
    pub engine: DynEngineApi,
    pub push: DynPushChannel,
    pub confirm: DynConfirmationGate,
    pub notifier: DynNotifier,
}

/// Service facade for managing analytics extensions.
pub struct ExtensionDirectory {
    services: PlatformServices,
    bus: EventBus,
    id_strategy: EngineIdStrategy,
    extensions: CacheCell<Arc<Vec<ExtensionRecord>>>,
    blocks: CacheCell<Arc<Vec<BlockDescriptor>>>,
    engine_id: CacheCell<EngineId>,
}

impl ExtensionDirectory {
    /// Create a directory over the given platform seams.
    pub fn new(services: PlatformServices) -> Self {
        Self {
            services,
            bus: EventBus::new(),
            id_strategy: EngineIdStrategy::default(),
            extensions: CacheCell::new(),
            blocks: CacheCell::new(),
            engine_id: CacheCell::new(),
        }
    }

    /// Choose how the engine id is resolved.
    pub fn with_engine_id_strategy(mut self, strategy: EngineIdStrategy) -> Self {
        self.id_strategy = strategy;
        self
    }

    /// Subscribe to domain events published by this directory.
    pub fn subscribe_events(&self) -> EventBusReceiver {
        self.bus.subscribe()
    }

    /// Raw inventory page of extension binaries.
    ///
    /// Fetches up to [`EXTENSION_PAGE_SIZE`] entries carrying the extension
    /// fragment; never cached.
    pub async fn list_raw(&self) -> Result<PagedResult<ManagedObject>> {
        let filter = InventoryFilter::default()
            .with_page_size(EXTENSION_PAGE_SIZE)
            .with_fragment_type(EXTENSION_FRAGMENT);
        self.services.inventory.list(&filter).await
    }

    /// Enriched extension list, memoized until [`Self::invalidate`].
    ///
    /// Reconciles the inventory against the engine metadata document:
    /// names are normalized, the loaded flag is computed, and loaded
    /// extensions get their block count from the detail document. Repeat
    /// calls return the identical `Arc` without touching the platform.
    pub async fn list_enriched(&self) -> Result<Arc<Vec<ExtensionRecord>>> {
        self.extensions.get_or_fill(|| self.fetch_enriched()).await
    }

    async fn fetch_enriched(&self) -> Result<Arc<Vec<ExtensionRecord>>> {
        let raw = self.list_raw().await?;
        let metadata = self.services.engine.metadata().await?;
        let mut records = Vec::with_capacity(raw.items.len());
        for object in &raw.items {
            let raw_name = object.name.as_deref().unwrap_or(&object.id);
            let name = strip_file_extension(raw_name).to_string();
            let loaded = is_loaded(&name, &metadata.metadatas);
            let block_count = if loaded {
                self.get_detail(&name).await?.map(|d| d.analytics.len())
            } else {
                None
            };
            records.push(ExtensionRecord {
                id: object.id.clone(),
                name,
                loaded,
                block_count,
            });
        }
        tracing::debug!(count = records.len(), "reconciled extension list");
        Ok(Arc::new(records))
    }

    /// Detail document of a single extension.
    ///
    /// Any HTTP error status from the engine means the document is absent,
    /// not that the operation failed.
    pub async fn get_detail(&self, name: &str) -> Result<Option<ExtensionDetail>> {
        match self.services.engine.extension_detail(name).await {
            Ok(detail) => Ok(Some(detail)),
            Err(e) if e.http_status().is_some_and(|s| s >= 400) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// All blocks of the currently loaded extensions, memoized.
    ///
    /// Each block is tagged with its owning extension and whether it is a
    /// custom block.
    pub async fn loaded_blocks(&self) -> Result<Arc<Vec<BlockDescriptor>>> {
        self.blocks.get_or_fill(|| self.fetch_loaded_blocks()).await
    }

    async fn fetch_loaded_blocks(&self) -> Result<Arc<Vec<BlockDescriptor>>> {
        let metadata = self.services.engine.metadata().await?;
        let mut blocks = Vec::new();
        for entry in &metadata.metadatas {
            let extension_name = strip_file_extension(entry).to_string();
            if let Some(detail) = self.get_detail(&extension_name).await? {
                for mut block in detail.analytics {
                    block.custom = is_custom_block(&block.id);
                    block.extension = extension_name.clone();
                    blocks.push(block);
                }
            }
        }
        Ok(Arc::new(blocks))
    }

    /// Drop all memoized state: extension list, block list, engine id.
    pub fn invalidate(&self) {
        self.extensions.invalidate();
        self.blocks.invalidate();
        self.engine_id.invalidate();
    }

    /// Delete an extension binary after operator confirmation.
    ///
    /// A declined confirmation aborts with [`Error::Cancelled`] and leaves
    /// the binary untouched.
    pub async fn delete(&self, record: &ExtensionRecord) -> Result<()> {
        let message = format!(
            "You are about to delete extension \"{}\". Do you want to proceed?",
            record.name
        );
        if !self.services.confirm.confirm(&message).await {
            return Err(Error::Cancelled);
        }
        self.services.binaries.delete(&record.id).await?;
        self.services.notifier.success("Extension deleted.");
        self.bus.publish(DirectoryEvent::ExtensionDeleted {
            id: record.id.clone(),
            name: record.name.clone(),
        });
        Ok(())
    }

    /// Upload an extension archive to the binary store.
    pub async fn upload(&self, name: &str, data: Vec<u8>) -> Result<ManagedObject> {
        let object = self.services.binaries.upload(name, data).await?;
        self.bus.publish(DirectoryEvent::ExtensionUploaded {
            id: object.id.clone(),
            name: name.to_string(),
        });
        Ok(object)
    }

    /// Download an extension archive.
    pub async fn download(&self, record: &ExtensionRecord) -> Result<Vec<u8>> {
        self.services.binaries.download(&record.id).await
    }

    /// The engine's managed-object id, memoized once resolved.
    ///
    /// With [`EngineIdStrategy::InventoryLookup`], an ambiguous lookup
    /// (zero or several matches) produces an operator warning and `None`,
    /// and nothing is memoized.
    pub async fn engine_id(&self) -> Result<Option<EngineId>> {
        match self.id_strategy {
            EngineIdStrategy::DirectEndpoint => {
                let id = self
                    .engine_id
                    .get_or_fill(|| self.services.engine.engine_id())
                    .await?;
                Ok(Some(id))
            }
            EngineIdStrategy::InventoryLookup => {
                if let Some(id) = self.engine_id.peek() {
                    return Ok(Some(id));
                }
                match self.lookup_engine_id().await? {
                    Some(id) => {
                        let cached = self
                            .engine_id
                            .get_or_fill(|| {
                                let id = id.clone();
                                async move { Ok(id) }
                            })
                            .await?;
                        Ok(Some(cached))
                    }
                    None => Ok(None),
                }
            }
        }
    }

    async fn lookup_engine_id(&self) -> Result<Option<EngineId>> {
        let status = self.services.engine.status().await?;
        let query = InventoryQuery {
            name: status.microservice_name.clone(),
            application_id: status.microservice_application_id.clone(),
        };
        let filter = InventoryFilter::default().with_page_size(EXTENSION_PAGE_SIZE);
        let page = self.services.inventory.query(&query, &filter).await?;
        if page.items.len() != 1 {
            tracing::warn!(matches = page.items.len(), "engine inventory lookup was ambiguous");
            self.services
                .notifier
                .warning("Cannot identify the engine microservice in the inventory. Please report this issue.");
            return Ok(None);
        }
        Ok(Some(EngineId(page.items[0].id.clone())))
    }

    /// Engine diagnostic status document.
    pub async fn engine_status(&self) -> Result<EngineStatus> {
        self.services.engine.status().await
    }

    /// Submit an engine restart.
    ///
    /// Does not wait for the restart to complete. Every memoized value is
    /// dropped whether or not the submission succeeded; the engine state
    /// is unknown either way once a restart has been attempted.
    pub async fn restart(&self) -> Result<()> {
        let outcome = self.services.engine.restart().await;
        self.invalidate();
        if outcome.is_ok() {
            self.bus.publish(DirectoryEvent::RestartRequested);
        }
        outcome
    }

    /// Watch the engine's availability through the push channel.
    ///
    /// Resolves the engine id, subscribes on its managed-object channel,
    /// and returns a [`StatusSubscription`] whose `restarting` flag tracks
    /// status messages. Dropping the subscription tears everything down.
    pub async fn subscribe_status(&self) -> Result<StatusSubscription> {
        let id = self
            .engine_id()
            .await?
            .ok_or_else(|| Error::NotFound("engine id".to_string()))?;
        let channel = paths::managed_object_channel(&id.0);
        let mut subscription = self.services.push.subscribe(&channel).await?;
        tracing::info!(%channel, "watching engine status");

        let (tx, rx) = watch::channel(false);
        let pump = tokio::spawn(async move {
            while let Some(message) = subscription.recv().await {
                if let Some(status) = message
                    .pointer("/data/data/c8y_Status/status")
                    .and_then(Value::as_str)
                {
                    let _ = tx.send(status == ENGINE_STATUS_DOWN);
                }
            }
        });

        Ok(StatusSubscription {
            restarting: rx,
            pump,
        })
    }
}

/// Scoped handle on the engine status feed.
///
/// Owns the push subscription and its pump task; dropping the handle
/// aborts the pump, which in turn closes the channel subscription.
pub struct StatusSubscription {
    restarting: watch::Receiver<bool>,
    pump: JoinHandle<()>,
}

impl StatusSubscription {
    /// Whether the engine currently reports itself as down.
    pub fn is_restarting(&self) -> bool {
        *self.restarting.borrow()
    }

    /// A shareable watch on the restarting flag.
    pub fn restarting(&self) -> watch::Receiver<bool> {
        self.restarting.clone()
    }

    /// Wait for the flag to change, returning its new value.
    ///
    /// `None` once the feed has ended.
    pub async fn changed(&mut self) -> Option<bool> {
        self.restarting.changed().await.ok()?;
        Some(*self.restarting.borrow())
    }
}

impl Drop for StatusSubscription {
    fn drop(&mut self) {
        self.pump.abort();
    }
}
