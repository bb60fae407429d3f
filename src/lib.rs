//! # Open Media Publishing Rust SDK
//!
//! A client SDK for the Tencent Open Media (om.qq.com) OAuth2 publishing
//! API: authorization-code flows, cached and auto-refreshed bearer tokens,
//! and typed wrappers for the publishing endpoints (live/picture/video
//! articles, video cover upload, transaction status, article listing,
//! account info).
//!
//! ## Architecture
//!
//! - [`OmClient`] - Main client wiring every collaborator together
//! - [`config`] - Client credentials and `{PLACEHOLDER}` URL templating
//! - [`auth`] - OAuth2 token lifecycle with transparent refresh
//! - [`store`] - Pluggable token persistence keyed by openid
//! - [`api`] - Authenticated endpoint wrappers
//! - [`models`] - The `{code, msg, data}` envelope and listing records
//! - [`error`] - Error types; [`OmError::NotYetAuthorized`] is the one
//!   condition the SDK raises itself
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use omqq_pub_rs::{OmClient, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let client = OmClient::new("your_client_id", "your_client_secret")?;
//!
//!     // First visit: send the user through the authorization flow...
//!     let url = client.authorize_url("https://example.com/callback", "state123");
//!     println!("redirect the user to {url}");
//!
//!     // ...then exchange the code your callback received.
//!     let envelope = client.exchange_code("CODE_FROM_CALLBACK").await?;
//!     println!("exchange result: {} {}", envelope.code, envelope.msg);
//!
//!     // Returning visit: bind the cached account instead.
//!     client.set_openid("OPENID").await;
//!
//!     let listing = client.article_list(1, 10).await?;
//!     if listing.is_success() {
//!         println!("articles: {:?}", listing.data);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Only transport failures and the missing-credential condition are Rust
//! errors; provider-level business errors come back inside the envelope:
//!
//! ```rust,no_run
//! use omqq_pub_rs::{OmClient, OmError, Result};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let client = OmClient::new("client_id", "client_secret")?;
//!
//! match client.media_basic_info().await {
//!     Ok(envelope) if envelope.is_success() => println!("{:?}", envelope.data),
//!     Ok(envelope) => eprintln!("provider error {}: {}", envelope.code, envelope.msg),
//!     Err(OmError::NotYetAuthorized { reason }) => {
//!         eprintln!("re-run the authorization flow: {reason}");
//!     }
//!     Err(err) => eprintln!("transport error: {err}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod store;

// Re-export main types for convenience
pub use api::{ApiClient, ApiEndpoints};
pub use auth::{AuthEndpoints, TokenManager, TokenRecord};
pub use client::OmClient;
pub use config::Config;
pub use error::{OmError, Result};
pub use models::{Article, ArticleListPage, Envelope, VideoInfo};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
