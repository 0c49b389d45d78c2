//! Binary store for extension archives over `/inventory/binaries`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::json;

use streamsight_core::api::BinaryStore;
use streamsight_core::config::paths;
use streamsight_core::error::{Error, Result};
use streamsight_core::model::ManagedObject;

use crate::client::PlatformClient;

#[async_trait]
impl BinaryStore for PlatformClient {
    async fn upload(&self, name: &str, data: Vec<u8>) -> Result<ManagedObject> {
        // Tag the binary with the extension fragment so it shows up in the
        // filtered inventory listing.
        let mut object = json!({
            "name": name,
            "type": "application/zip",
        });
        object[streamsight_core::config::EXTENSION_FRAGMENT] = json!({});
        let form = Form::new()
            .text("object", object.to_string())
            .text("filesize", data.len().to_string())
            .part(
                "file",
                Part::bytes(data)
                    .file_name(name.to_string())
                    .mime_str("application/zip")
                    .map_err(|e| Error::Config(e.to_string()))?,
            );
        self.post_multipart(paths::BINARIES, form).await
    }

    async fn download(&self, id: &str) -> Result<Vec<u8>> {
        self.get_bytes(&format!("{}/{id}", paths::BINARIES)).await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        PlatformClient::delete(self, &format!("{}/{id}", paths::BINARIES)).await
    }
}
