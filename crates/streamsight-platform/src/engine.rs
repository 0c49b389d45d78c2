//! Engine endpoints: metadata, extension details, id, status, restart.

use async_trait::async_trait;
use serde::Deserialize;

use streamsight_core::api::EngineApi;
use streamsight_core::config::paths;
use streamsight_core::error::Result;
use streamsight_core::model::{EngineId, EngineStatus, ExtensionDetail, ExtensionMetadataDocument};

use crate::client::PlatformClient;

/// Response of the companion microservice id endpoint.
#[derive(Debug, Deserialize)]
struct IdDocument {
    id: String,
}

/// Path of a localized per-extension detail document.
fn detail_path(name: &str) -> String {
    format!("{}/{name}.json", paths::ENGINE_LOCALE_BASE)
}

#[async_trait]
impl EngineApi for PlatformClient {
    async fn metadata(&self) -> Result<ExtensionMetadataDocument> {
        self.get_json(paths::ENGINE_METADATA, &[]).await
    }

    async fn extension_detail(&self, name: &str) -> Result<ExtensionDetail> {
        let mut detail: ExtensionDetail = self.get_json(&detail_path(name), &[]).await?;
        // The document itself does not repeat the extension name.
        detail.name = name.to_string();
        Ok(detail)
    }

    async fn engine_id(&self) -> Result<EngineId> {
        let path = format!("{}/{}/id", paths::BACKEND_BASE, paths::ENGINE_ENDPOINT);
        let doc: IdDocument = self.get_json(&path, &[]).await?;
        Ok(EngineId(doc.id))
    }

    async fn status(&self) -> Result<EngineStatus> {
        self.get_json(paths::ENGINE_STATUS, &[]).await
    }

    async fn restart(&self) -> Result<()> {
        self.put_empty(paths::ENGINE_RESTART).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_path() {
        assert_eq!(
            detail_path("Math_AB_Extension"),
            "/service/cep/apamacorrelator/EN/Math_AB_Extension.json"
        );
    }
}
