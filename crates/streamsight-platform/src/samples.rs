//! Community sample catalog.
//!
//! Lists `.mon` sample blocks from a repository contents endpoint. The
//! endpoint and an optional access token come from the platform
//! configuration.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use streamsight_core::error::{Error, Result};
use streamsight_core::model::SampleBlock;
use streamsight_core::naming::strip_file_extension;

const SAMPLE_FILE_SUFFIX: &str = ".mon";
const USER_AGENT: &str = concat!("streamsight/", env!("CARGO_PKG_VERSION"));

/// Entry of a repository contents listing.
#[derive(Debug, Deserialize)]
struct ContentsEntry {
    name: String,
    path: String,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(rename = "type", default)]
    entry_type: String,
}

/// Read-only catalog of community sample blocks.
pub struct SampleCatalog {
    client: Client,
    repo_url: String,
    token: Option<String>,
}

impl SampleCatalog {
    /// Create a catalog for the given contents endpoint.
    pub fn new(repo_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self {
            client,
            repo_url: repo_url.into(),
            token,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// List the sample blocks available in the catalog.
    pub async fn list(&self) -> Result<Vec<SampleBlock>> {
        let response = self
            .authorize(self.client.get(&self.repo_url))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url: self.repo_url.clone(),
            });
        }
        let entries: Vec<ContentsEntry> = response
            .json()
            .await
            .map_err(|e| Error::Decode(e.to_string()))?;
        Ok(entries
            .into_iter()
            .filter(|entry| entry.entry_type == "file" && entry.name.ends_with(SAMPLE_FILE_SUFFIX))
            .map(|entry| SampleBlock {
                name: strip_file_extension(&entry.name).to_string(),
                path: entry.path,
                download_url: entry.download_url,
            })
            .collect())
    }

    /// Fetch the source of a sample block.
    pub async fn fetch(&self, sample: &SampleBlock) -> Result<String> {
        let url = sample
            .download_url
            .as_deref()
            .ok_or_else(|| Error::NotFound(format!("no download url for {}", sample.name)))?;
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_contents_listing_filters_sample_files() {
        let entries: Vec<ContentsEntry> = serde_json::from_value(json!([
            { "name": "CreateEvent.mon", "path": "samples/blocks/CreateEvent.mon",
              "download_url": "https://raw.example.com/CreateEvent.mon", "type": "file" },
            { "name": "README.md", "path": "samples/blocks/README.md",
              "download_url": "https://raw.example.com/README.md", "type": "file" },
            { "name": "util", "path": "samples/blocks/util", "type": "dir" }
        ]))
        .unwrap();

        let samples: Vec<SampleBlock> = entries
            .into_iter()
            .filter(|e| e.entry_type == "file" && e.name.ends_with(SAMPLE_FILE_SUFFIX))
            .map(|e| SampleBlock {
                name: strip_file_extension(&e.name).to_string(),
                path: e.path,
                download_url: e.download_url,
            })
            .collect();

        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].name, "CreateEvent");
    }
}
