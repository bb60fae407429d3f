//! Main Open Media client implementation.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::api::{ApiClient, ApiEndpoints};
use crate::auth::{AuthEndpoints, TokenManager, TokenRecord};
use crate::config::Config;
use crate::error::Result;
use crate::http::OmHttpClient;
use crate::models::Envelope;
use crate::store::{MemoryTokenStore, TokenStore};

/// Main Open Media publishing client.
///
/// Wires the credential [`Config`], a [`TokenStore`], the HTTP transport
/// and the [`TokenManager`] together and exposes every endpoint wrapper.
///
/// One client serves one authorized account at a time: bind the account
/// with [`set_openid`](OmClient::set_openid) (returning user with a
/// persisted token) or run the authorization-code flow via
/// [`authorize_url`](OmClient::authorize_url) and
/// [`exchange_code`](OmClient::exchange_code).
#[derive(Debug)]
pub struct OmClient {
    http_client: Arc<OmHttpClient>,
    token_manager: Arc<TokenManager>,
    api: ApiClient,
}

impl OmClient {
    /// Creates a client with an in-memory token store.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Self::with_store(client_id, client_secret, Arc::new(MemoryTokenStore::new()))
    }

    /// Creates a client with a caller-provided token store.
    pub fn with_store(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self> {
        let config = Arc::new(Config::new(client_id, client_secret));
        debug!("creating Open Media client for client_id {}", config.client_id());

        let http_client = Arc::new(OmHttpClient::new()?);

        let token_manager = Arc::new(TokenManager::new(
            Arc::clone(&config),
            store,
            Arc::clone(&http_client),
        ));

        let api = ApiClient::new(Arc::clone(&token_manager), Arc::clone(&http_client));

        Ok(Self {
            http_client,
            token_manager,
            api,
        })
    }

    /// Creates a client against custom endpoint templates.
    pub fn with_endpoints(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        store: Arc<dyn TokenStore>,
        auth_endpoints: AuthEndpoints,
        api_endpoints: ApiEndpoints,
    ) -> Result<Self> {
        let config = Arc::new(Config::new(client_id, client_secret));
        let http_client = Arc::new(OmHttpClient::new()?);

        let token_manager = Arc::new(TokenManager::with_endpoints(
            config,
            store,
            Arc::clone(&http_client),
            auth_endpoints,
        ));

        let api = ApiClient::with_endpoints(
            Arc::clone(&token_manager),
            Arc::clone(&http_client),
            api_endpoints,
        );

        Ok(Self {
            http_client,
            token_manager,
            api,
        })
    }

    // ----- authorization -----

    /// Builds the authorization-code redirect URL for the end user.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> String {
        self.token_manager.authorize_url(redirect_uri, state)
    }

    /// Exchanges an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<Envelope> {
        self.token_manager.exchange_code(code).await
    }

    /// Probes the provider for the validity of a token.
    pub async fn check_token(&self, access_token: &str, openid: &str) -> Result<Envelope> {
        self.token_manager.check_token(access_token, openid).await
    }

    /// Binds a returning account so its persisted token can be reused.
    pub async fn set_openid(&self, openid: impl Into<String>) {
        self.token_manager.set_openid(openid).await;
    }

    /// Returns the current in-memory credential, for debugging.
    pub async fn token_snapshot(&self) -> TokenRecord {
        self.token_manager.token_snapshot().await
    }

    // ----- publishing endpoints -----

    /// Publishes a live-stream article.
    pub async fn pub_live(
        &self,
        title: &str,
        start_time: &str,
        end_time: &str,
        cover_pic: &str,
        rtmp_url: &str,
    ) -> Result<Envelope> {
        self.api
            .pub_live(title, start_time, end_time, cover_pic, rtmp_url)
            .await
    }

    /// Publishes a picture article.
    pub async fn pub_pic(&self, title: &str, content: &str, cover_pic: &str) -> Result<Envelope> {
        self.api.pub_pic(title, content, cover_pic).await
    }

    /// Publishes a video article, uploading the media file.
    pub async fn pub_vid(
        &self,
        title: &str,
        tags: &str,
        cat: &str,
        desc: &str,
        media: impl AsRef<Path>,
        apply: bool,
    ) -> Result<Envelope> {
        self.api.pub_vid(title, tags, cat, desc, media, apply).await
    }

    /// Uploads a cover image for a published video.
    pub async fn pub_video_pic(&self, media: impl AsRef<Path>, vid: &str) -> Result<Envelope> {
        self.api.pub_video_pic(media, vid).await
    }

    /// Queries the status of a publishing transaction.
    pub async fn transaction_info(&self, transaction_id: &str) -> Result<Envelope> {
        self.api.transaction_info(transaction_id).await
    }

    /// Fetches basic account info.
    pub async fn media_basic_info(&self) -> Result<Envelope> {
        self.api.media_basic_info().await
    }

    /// Lists published articles with pagination.
    pub async fn article_list(&self, page: u32, limit: u32) -> Result<Envelope> {
        self.api.article_list(page, limit).await
    }

    // ----- accessors -----

    /// Returns the token manager for advanced usage.
    pub fn token_manager(&self) -> &Arc<TokenManager> {
        &self.token_manager
    }

    /// Returns the endpoint client.
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Returns the underlying HTTP client.
    pub fn http_client(&self) -> &OmHttpClient {
        &self.http_client
    }
}
