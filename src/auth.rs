//! OAuth2 token lifecycle: authorization URL construction, code exchange,
//! refresh, validity checks, and the cached-token guarantee behind every
//! authenticated call.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::{substitute, Config};
use crate::error::{OmError, Result};
use crate::http::OmHttpClient;
use crate::models::Envelope;
use crate::store::TokenStore;

/// Placeholder for the bearer token in URL templates.
pub const ACCESS_TOKEN: &str = "{ACCESS_TOKEN}";
/// Placeholder for the account openid in URL templates.
pub const OPENID: &str = "{OPENID}";

/// The provider's OAuth2 endpoint templates.
///
/// Overridable so tests can point the manager at a local server.
#[derive(Debug, Clone)]
pub struct AuthEndpoints {
    pub authorize: String,
    pub access_token: String,
    pub refresh_token: String,
    pub check_token: String,
}

impl Default for AuthEndpoints {
    fn default() -> Self {
        Self {
            authorize: "https://auth.om.qq.com/omoauth2/authorize?response_type=code&client_id={CLIENT_ID}&redirect_uri={REDIRECT_URI}&state={STATE}".to_string(),
            access_token: "https://auth.om.qq.com/omoauth2/accesstoken?grant_type=authorization_code&client_id={CLIENT_ID}&client_secret={CLIENT_SECRET}&code={CODE}".to_string(),
            refresh_token: "https://auth.om.qq.com/omoauth2/refreshtoken?grant_type=refreshtoken&client_id={CLIENT_ID}&refresh_token={REFRESH_TOKEN}".to_string(),
            check_token: "https://auth.om.qq.com/omoauth2/checktoken?access_token={ACCESS_TOKEN}&openid={OPENID}".to_string(),
        }
    }
}

/// The cached credential for one authorized account.
///
/// Persisted to the [`TokenStore`] as a JSON object under the `openid`
/// key. An empty `openid` means "never authorized".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenRecord {
    pub access_token: String,
    /// Expiry instant in epoch seconds.
    pub expires_at: u64,
    pub refresh_token: String,
    pub openid: String,
    pub scope: String,
}

impl TokenRecord {
    /// Whether the access token is still usable at `now` (epoch seconds).
    pub fn is_valid(&self, now: u64) -> bool {
        now < self.expires_at
    }

    /// Merges a serialized store record into this one.
    ///
    /// Only recognized keys are applied; unrecognized keys and malformed
    /// JSON are ignored.
    fn merge_json(&mut self, json: &str) {
        let Ok(value) = serde_json::from_str::<Value>(json) else {
            return;
        };
        if let Some(v) = value.get("accessToken").and_then(Value::as_str) {
            self.access_token = v.to_string();
        }
        if let Some(v) = value.get("expiresAt").and_then(Value::as_u64) {
            self.expires_at = v;
        }
        if let Some(v) = value.get("refreshToken").and_then(Value::as_str) {
            self.refresh_token = v.to_string();
        }
        if let Some(v) = value.get("openid").and_then(Value::as_str) {
            self.openid = v.to_string();
        }
        if let Some(v) = value.get("scope").and_then(Value::as_str) {
            self.scope = v.to_string();
        }
    }
}

fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Owns the OAuth2 state machine for one account.
///
/// States are unauthorized, stale-but-refreshable and valid; transitions
/// are driven by wall-clock expiry and the outcome of a single refresh
/// attempt per [`fetch`](TokenManager::fetch) call.
#[derive(Debug)]
pub struct TokenManager {
    config: Arc<Config>,
    store: Arc<dyn TokenStore>,
    http: Arc<OmHttpClient>,
    endpoints: AuthEndpoints,
    state: RwLock<TokenRecord>,
}

impl TokenManager {
    /// Creates a manager with the production endpoints.
    pub fn new(config: Arc<Config>, store: Arc<dyn TokenStore>, http: Arc<OmHttpClient>) -> Self {
        Self::with_endpoints(config, store, http, AuthEndpoints::default())
    }

    /// Creates a manager against custom endpoint templates.
    pub fn with_endpoints(
        config: Arc<Config>,
        store: Arc<dyn TokenStore>,
        http: Arc<OmHttpClient>,
        endpoints: AuthEndpoints,
    ) -> Self {
        Self {
            config,
            store,
            http,
            endpoints,
            state: RwLock::new(TokenRecord::default()),
        }
    }

    /// Binds the account key so a previously persisted record can be
    /// loaded on the next [`fetch`](TokenManager::fetch).
    pub async fn set_openid(&self, openid: impl Into<String>) {
        self.state.write().await.openid = openid.into();
    }

    /// Returns a copy of the current in-memory credential, for debugging.
    pub async fn token_snapshot(&self) -> TokenRecord {
        self.state.read().await.clone()
    }

    /// Builds the authorization-code redirect URL. Pure, no network.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> String {
        self.config.api_url(
            &self.endpoints.authorize,
            &[
                ("{REDIRECT_URI}", redirect_uri.to_string()),
                ("{STATE}", state.to_string()),
            ],
        )
    }

    /// Exchanges an authorization code for an access token.
    ///
    /// On a structurally valid success payload the internal state is
    /// overwritten and persisted. The decoded envelope is returned in all
    /// cases so callers can inspect provider-level error codes.
    pub async fn exchange_code(&self, code: &str) -> Result<Envelope> {
        let url = self
            .config
            .api_url(&self.endpoints.access_token, &[("{CODE}", code.to_string())]);
        let envelope = self.http.post(&url).await?;
        if self.apply_envelope(&envelope).await {
            info!("authorization code exchanged for a new access token");
        }
        Ok(envelope)
    }

    /// Mints a new access token from a refresh token. Same persistence
    /// contract as [`exchange_code`](TokenManager::exchange_code).
    pub async fn refresh(&self, refresh_token: &str) -> Result<Envelope> {
        let url = self.config.api_url(
            &self.endpoints.refresh_token,
            &[("{REFRESH_TOKEN}", refresh_token.to_string())],
        );
        let envelope = self.http.post(&url).await?;
        if self.apply_envelope(&envelope).await {
            info!("access token refreshed");
        } else {
            debug!("refresh response was not a valid token payload");
        }
        Ok(envelope)
    }

    /// Read-only validity probe against the provider. Does not touch
    /// local state.
    pub async fn check_token(&self, access_token: &str, openid: &str) -> Result<Envelope> {
        let url = self.config.api_url(
            &self.endpoints.check_token,
            &[
                (ACCESS_TOKEN, access_token.to_string()),
                (OPENID, openid.to_string()),
            ],
        );
        self.http.get(&url).await
    }

    /// Guarantees a valid access token or fails explicitly.
    ///
    /// Algorithm: empty openid fails immediately; otherwise the persisted
    /// record is merged in, and if the token is expired exactly one
    /// refresh is attempted. Transport errors from the refresh call
    /// propagate as themselves.
    pub async fn fetch(&self) -> Result<TokenRecord> {
        let openid = self.state.read().await.openid.clone();
        if openid.is_empty() {
            return Err(OmError::not_yet_authorized("not yet authorized"));
        }

        if let Some(json) = self.store.get(&openid) {
            self.state.write().await.merge_json(&json);
        }

        let snapshot = self.state.read().await.clone();
        if snapshot.is_valid(now_epoch()) {
            return Ok(snapshot);
        }

        debug!("access token for {openid} is stale, attempting refresh");
        self.refresh(&snapshot.refresh_token).await?;

        let snapshot = self.state.read().await.clone();
        if snapshot.is_valid(now_epoch()) {
            return Ok(snapshot);
        }

        Err(OmError::not_yet_authorized("needs re-authorization"))
    }

    /// Substitutes a valid token into an endpoint template.
    ///
    /// Calls [`fetch`](TokenManager::fetch) first, propagating its
    /// failure, then applies `{ACCESS_TOKEN}`/`{OPENID}` (merged last,
    /// overriding caller pairs under those keys) and the caller's
    /// replacements.
    pub async fn api_url(&self, template: &str, replacements: &[(&str, String)]) -> Result<String> {
        let record = self.fetch().await?;

        let mut merged: BTreeMap<&str, &str> = BTreeMap::new();
        for (key, value) in replacements {
            merged.insert(*key, value.as_str());
        }
        merged.insert(ACCESS_TOKEN, record.access_token.as_str());
        merged.insert(OPENID, record.openid.as_str());

        Ok(substitute(template, &merged))
    }

    /// Applies a token payload if it is structurally complete, persisting
    /// the new record. Returns whether state was updated.
    ///
    /// Provider-level error codes are deliberately not inspected here;
    /// the shape of `data` alone decides.
    async fn apply_envelope(&self, envelope: &Envelope) -> bool {
        let Some(data) = envelope.data.as_ref() else {
            return false;
        };
        let (Some(access_token), Some(expires_in), Some(refresh_token), Some(openid)) = (
            data.get("access_token").and_then(Value::as_str),
            data.get("expires_in").and_then(Value::as_u64),
            data.get("refresh_token").and_then(Value::as_str),
            data.get("openid").and_then(Value::as_str),
        ) else {
            return false;
        };
        let scope = data.get("scope").and_then(Value::as_str).unwrap_or("");

        let record = TokenRecord {
            access_token: access_token.to_string(),
            expires_at: now_epoch() + expires_in,
            refresh_token: refresh_token.to_string(),
            openid: openid.to_string(),
            scope: scope.to_string(),
        };

        if let Ok(serialized) = serde_json::to_string(&record) {
            self.store.put(&record.openid, &serialized);
        }
        *self.state.write().await = record;
        true
    }
}
