//! HTTP transport for the Open Media API.
//!
//! A thin wrapper over [`reqwest::Client`] that performs the three request
//! shapes the provider needs (GET, POST, multipart file POST) and decodes
//! every response body into the uniform [`Envelope`].

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

use crate::error::Result;
use crate::models::Envelope;

/// Default timeout for plain API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Extended timeout for media uploads (payloads up to ~100 MB).
pub const UPLOAD_TIMEOUT: Duration = Duration::from_secs(180);

/// HTTP client for Open Media endpoints.
#[derive(Debug)]
pub struct OmHttpClient {
    client: Client,
}

impl OmHttpClient {
    /// Creates a client with the default timeout.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!("omqq-pub-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// Performs a GET request and decodes the envelope.
    pub async fn get(&self, url: &str) -> Result<Envelope> {
        debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        Ok(response.json().await?)
    }

    /// Performs a POST request (all parameters live in the URL) and
    /// decodes the envelope.
    pub async fn post(&self, url: &str) -> Result<Envelope> {
        debug!("POST {url}");
        let response = self.client.post(url).send().await?;
        Ok(response.json().await?)
    }

    /// Performs a multipart POST attaching `bytes` under `field_name`,
    /// with the upload timeout override, and decodes the envelope.
    pub async fn post_file(
        &self,
        url: &str,
        field_name: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Envelope> {
        debug!("POST {url} (multipart, {} bytes)", bytes.len());
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part(field_name.to_string(), part);
        let response = self
            .client
            .post(url)
            .multipart(form)
            .timeout(UPLOAD_TIMEOUT)
            .send()
            .await?;
        Ok(response.json().await?)
    }
}
