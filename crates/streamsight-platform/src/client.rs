//! HTTP client shared by the platform API implementations.

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

use streamsight_core::config::PlatformConfig;
use streamsight_core::error::{Error, Result};

/// Reqwest-backed gateway to the platform.
///
/// One instance serves all API surfaces (inventory, binaries, engine,
/// alarms, events); wrap it in an `Arc` and hand the same handle to every
/// seam.
pub struct PlatformClient {
    config: PlatformConfig,
    client: Client,
}

impl PlatformClient {
    /// Build a client from the connection settings.
    pub fn new(config: PlatformConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { config, client })
    }

    /// The connection settings this client was built from.
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Absolute URL for a platform path.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Attach the configured credentials to a request.
    pub(crate) fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.config.token {
            request.bearer_auth(token)
        } else if let Some(username) = &self.config.username {
            request.basic_auth(username, self.config.password.as_deref())
        } else {
            request
        }
    }

    /// Send a request, mapping transport and status failures into [`Error`].
    pub(crate) async fn send(&self, request: RequestBuilder, url: &str) -> Result<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%url, status = status.as_u16(), "platform request failed");
            return Err(Error::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    /// GET a JSON document.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path);
        let request = self.client.get(&url).query(query);
        let response = self.send(request, &url).await?;
        response
            .json()
            .await
            .map_err(|e| Error::Decode(e.to_string()))
    }

    /// GET a raw body.
    pub(crate) async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let url = self.url(path);
        let response = self.send(self.client.get(&url), &url).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    /// PUT with an empty body, discarding the response.
    pub(crate) async fn put_empty(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        self.send(self.client.put(&url), &url).await?;
        Ok(())
    }

    /// DELETE a resource.
    pub(crate) async fn delete(&self, path: &str) -> Result<()> {
        let url = self.url(path);
        self.send(self.client.delete(&url), &url).await?;
        Ok(())
    }

    /// POST a multipart form, decoding the JSON response.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T> {
        let url = self.url(path);
        let request = self.client.post(&url).multipart(form);
        let response = self.send(request, &url).await?;
        response
            .json()
            .await
            .map_err(|e| Error::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client =
            PlatformClient::new(PlatformConfig::new("https://tenant.example.com/")).unwrap();
        assert_eq!(
            client.url("/service/cep/restart"),
            "https://tenant.example.com/service/cep/restart"
        );
    }
}
