//! Domain records and wire documents.
//!
//! Field names with `rename` attributes mirror the platform's camelCase
//! JSON; everything else is local enrichment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Addressable id of the engine's managed-object representation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EngineId(pub String);

impl std::fmt::Display for EngineId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EngineId {
    fn from(value: &str) -> Self {
        EngineId(value.to_string())
    }
}

/// Generic inventory entity.
///
/// Only the fields this workspace reads are typed; vendor fragments stay in
/// `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManagedObject {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "applicationId", default, skip_serializing_if = "Option::is_none")]
    pub application_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An uploaded extension as presented to the operator.
///
/// `name` is the inventory name with the package file extension stripped;
/// `block_count` is only known for loaded extensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRecord {
    pub id: String,
    pub name: String,
    pub loaded: bool,
    #[serde(default)]
    pub block_count: Option<usize>,
}

/// Engine document listing the currently active extension files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionMetadataDocument {
    #[serde(default)]
    pub metadatas: Vec<String>,
}

/// A stream-processing block contained in an extension.
///
/// `custom` and `extension` are filled in locally after the detail fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockDescriptor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub extension: String,
}

/// Per-extension detail document (block manifest).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtensionDetail {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub analytics: Vec<BlockDescriptor>,
}

/// Page bookkeeping returned alongside platform collections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStatistics {
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

/// One page of a platform collection.
#[derive(Debug, Clone)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub statistics: PageStatistics,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, statistics: PageStatistics) -> Self {
        Self { items, statistics }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Source reference carried by alarms and events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceRef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Alarm raised by the engine (read-only view).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alarm {
    pub id: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub text: String,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub source: SourceRef,
}

/// Event emitted by the engine (read-only view).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub text: String,
    pub time: DateTime<Utc>,
    #[serde(default)]
    pub source: SourceRef,
}

/// Diagnostic status payload of the engine.
///
/// The document is engine-owned and loosely typed; only the microservice
/// identification fields are read by the inventory-lookup strategy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineStatus {
    #[serde(default)]
    pub microservice_name: Option<String>,
    #[serde(default)]
    pub microservice_application_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Community sample block listed from the sample catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleBlock {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_managed_object_keeps_fragments() {
        let mo: ManagedObject = serde_json::from_value(json!({
            "id": "815",
            "name": "Math_AB_Extension.zip",
            "pas_extension": "Math_AB_Extension",
            "c8y_Status": { "status": "Up" }
        }))
        .unwrap();
        assert_eq!(mo.id, "815");
        assert_eq!(mo.name.as_deref(), Some("Math_AB_Extension.zip"));
        assert!(mo.extra.contains_key("pas_extension"));
        assert!(mo.extra.contains_key("c8y_Status"));
    }

    #[test]
    fn test_detail_document_parses() {
        let detail: ExtensionDetail = serde_json::from_value(json!({
            "analytics": [
                { "id": "apama.analyticsbuilder.blocks.Threshold", "name": "Threshold" },
                { "id": "custom.MovingAverage", "name": "Moving Average" }
            ]
        }))
        .unwrap();
        assert_eq!(detail.analytics.len(), 2);
        assert_eq!(detail.analytics[1].name, "Moving Average");
        assert!(!detail.analytics[0].custom);
    }

    #[test]
    fn test_engine_status_identification_fields() {
        let status: EngineStatus = serde_json::from_value(json!({
            "microservice_name": "cep-ctrl",
            "microservice_application_id": "99",
            "user_status": "Running"
        }))
        .unwrap();
        assert_eq!(status.microservice_name.as_deref(), Some("cep-ctrl"));
        assert_eq!(status.microservice_application_id.as_deref(), Some("99"));
        assert!(status.extra.contains_key("user_status"));
    }
}
