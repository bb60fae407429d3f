//! Authenticated endpoint wrappers for the Open Media publishing API.
//!
//! Every method is a thin composition: build a replacement map, let the
//! [`TokenManager`] substitute a valid token into the endpoint template,
//! perform the request and return the decoded envelope as-is. Provider
//! business errors (`code != "0"`) are never turned into Rust errors.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::auth::TokenManager;
use crate::error::Result;
use crate::http::OmHttpClient;
use crate::models::Envelope;

/// The provider's REST endpoint templates.
///
/// Placeholder names are part of the wire contract. Overridable so tests
/// can point the client at a local server.
#[derive(Debug, Clone)]
pub struct ApiEndpoints {
    pub pub_live: String,
    pub pub_pic: String,
    pub pub_vid: String,
    pub video_pic: String,
    pub transaction_info: String,
    pub media_basic_info: String,
    pub article_list: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            pub_live: "https://api.om.qq.com/article/authpublive?access_token={ACCESS_TOKEN}&openid={OPENID}&title={TITLE}&start_time={START_TIME}&end_time={END_TIME}&cover_pic={COVER_PIC}&rtmp_url={RTMP_URL}".to_string(),
            pub_pic: "https://api.om.qq.com/article/authpubpic?access_token={ACCESS_TOKEN}&openid={OPENID}&title={TITLE}&content={CONTENT}&cover_pic={COVER_PIC}".to_string(),
            pub_vid: "http://api.om.qq.com/article/authpubvid?access_token={ACCESS_TOKEN}&openid={OPENID}&title={TITLE}&tags={TAGS}&cat={CAT}&md5={MD5}&desc={DESC}&apply={APPLY}".to_string(),
            video_pic: "https://api.om.qq.com/video/authvideopic?access_token={ACCESS_TOKEN}&openid={OPENID}&md5={MD5}&vid={VID}".to_string(),
            transaction_info: "https://api.om.qq.com/transaction/infoauth?access_token={ACCESS_TOKEN}&openid={OPENID}&transaction_id={TRANSACTION_ID}".to_string(),
            media_basic_info: "https://api.om.qq.com/media/basicinfoauth?access_token={ACCESS_TOKEN}&openid={OPENID}".to_string(),
            article_list: "https://api.om.qq.com/article/authlist?access_token={ACCESS_TOKEN}&openid={OPENID}&page={PAGE}&limit={LIMIT}".to_string(),
        }
    }
}

/// Client for the authenticated publishing endpoints.
#[derive(Debug)]
pub struct ApiClient {
    token_manager: Arc<TokenManager>,
    http: Arc<OmHttpClient>,
    endpoints: ApiEndpoints,
}

impl ApiClient {
    /// Creates a client with the production endpoints.
    pub fn new(token_manager: Arc<TokenManager>, http: Arc<OmHttpClient>) -> Self {
        Self::with_endpoints(token_manager, http, ApiEndpoints::default())
    }

    /// Creates a client against custom endpoint templates.
    pub fn with_endpoints(
        token_manager: Arc<TokenManager>,
        http: Arc<OmHttpClient>,
        endpoints: ApiEndpoints,
    ) -> Self {
        Self {
            token_manager,
            http,
            endpoints,
        }
    }

    /// Publishes a live-stream article.
    ///
    /// `start_time`/`end_time` are epoch-second strings; `rtmp_url` is the
    /// stream source. Success payload carries a `transaction_id`.
    pub async fn pub_live(
        &self,
        title: &str,
        start_time: &str,
        end_time: &str,
        cover_pic: &str,
        rtmp_url: &str,
    ) -> Result<Envelope> {
        let url = self
            .token_manager
            .api_url(
                &self.endpoints.pub_live,
                &[
                    ("{TITLE}", title.to_string()),
                    ("{START_TIME}", start_time.to_string()),
                    ("{END_TIME}", end_time.to_string()),
                    ("{COVER_PIC}", cover_pic.to_string()),
                    ("{RTMP_URL}", rtmp_url.to_string()),
                ],
            )
            .await?;
        self.http.post(&url).await
    }

    /// Publishes a picture article.
    pub async fn pub_pic(&self, title: &str, content: &str, cover_pic: &str) -> Result<Envelope> {
        let url = self
            .token_manager
            .api_url(
                &self.endpoints.pub_pic,
                &[
                    ("{TITLE}", title.to_string()),
                    ("{CONTENT}", content.to_string()),
                    ("{COVER_PIC}", cover_pic.to_string()),
                ],
            )
            .await?;
        self.http.post(&url).await
    }

    /// Publishes a video article, uploading the media file (max ~100 MB).
    ///
    /// The file's MD5 is computed locally and sent as the `md5` parameter;
    /// the file itself goes up as the multipart field `media` with the
    /// extended upload timeout. `apply` requests immediate review.
    pub async fn pub_vid(
        &self,
        title: &str,
        tags: &str,
        cat: &str,
        desc: &str,
        media: impl AsRef<Path>,
        apply: bool,
    ) -> Result<Envelope> {
        let media = media.as_ref();
        let bytes = tokio::fs::read(media).await?;
        let md5 = format!("{:x}", md5::compute(&bytes));
        debug!("uploading {} ({} bytes, md5 {md5})", media.display(), bytes.len());

        let url = self
            .token_manager
            .api_url(
                &self.endpoints.pub_vid,
                &[
                    ("{TITLE}", title.to_string()),
                    ("{TAGS}", tags.to_string()),
                    ("{CAT}", cat.to_string()),
                    ("{MD5}", md5),
                    ("{DESC}", desc.to_string()),
                    ("{APPLY}", if apply { "1" } else { "0" }.to_string()),
                ],
            )
            .await?;
        self.http
            .post_file(&url, "media", &file_name_of(media), bytes)
            .await
    }

    /// Uploads a cover image for an already published video.
    ///
    /// Minimum 640x360, max 5 MB, jpg/jpeg/png.
    pub async fn pub_video_pic(&self, media: impl AsRef<Path>, vid: &str) -> Result<Envelope> {
        let media = media.as_ref();
        let bytes = tokio::fs::read(media).await?;
        let md5 = format!("{:x}", md5::compute(&bytes));

        let url = self
            .token_manager
            .api_url(
                &self.endpoints.video_pic,
                &[("{MD5}", md5), ("{VID}", vid.to_string())],
            )
            .await?;
        self.http
            .post_file(&url, "media", &file_name_of(media), bytes)
            .await
    }

    /// Queries the status of a publishing transaction.
    pub async fn transaction_info(&self, transaction_id: &str) -> Result<Envelope> {
        let url = self
            .token_manager
            .api_url(
                &self.endpoints.transaction_info,
                &[("{TRANSACTION_ID}", transaction_id.to_string())],
            )
            .await?;
        self.http.get(&url).await
    }

    /// Fetches basic account info (avatar and nickname).
    pub async fn media_basic_info(&self) -> Result<Envelope> {
        let url = self
            .token_manager
            .api_url(&self.endpoints.media_basic_info, &[])
            .await?;
        self.http.get(&url).await
    }

    /// Lists published articles. `limit` supports 1-10.
    pub async fn article_list(&self, page: u32, limit: u32) -> Result<Envelope> {
        let url = self
            .token_manager
            .api_url(
                &self.endpoints.article_list,
                &[
                    ("{PAGE}", page.to_string()),
                    ("{LIMIT}", limit.to_string()),
                ],
            )
            .await?;
        self.http.get(&url).await
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("media")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthEndpoints, TokenManager};
    use crate::config::Config;
    use crate::store::{MemoryTokenStore, TokenStore};
    use serde_json::json;
    use std::io::Write;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn now_epoch() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    /// A client whose token manager already holds a valid token for "u1".
    async fn authorized_client(endpoints: ApiEndpoints) -> ApiClient {
        let store = Arc::new(MemoryTokenStore::new());
        store.put(
            "u1",
            &json!({
                "accessToken": "tok",
                "expiresAt": now_epoch() + 3600,
                "refreshToken": "r",
                "openid": "u1",
                "scope": ""
            })
            .to_string(),
        );
        let config = Arc::new(Config::new("cid", "csecret"));
        let http = Arc::new(OmHttpClient::new().unwrap());
        let token_manager = Arc::new(TokenManager::with_endpoints(
            config,
            store,
            Arc::clone(&http),
            AuthEndpoints::default(),
        ));
        token_manager.set_openid("u1").await;
        ApiClient::with_endpoints(token_manager, http, endpoints)
    }

    const SUCCESS_BODY: &str = r#"{"code":"0","msg":"success","data":{"transaction_id":"t1"}}"#;

    #[tokio::test]
    async fn test_article_list_builds_paginated_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/article/authlist")
            .match_query(mockito::Matcher::Regex(
                "access_token=tok&openid=u1&page=2&limit=5".to_string(),
            ))
            .with_body(
                json!({
                    "code": "0",
                    "msg": "success",
                    "data": { "articles": [], "page": "2", "limit": "5", "total": "0" }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let endpoints = ApiEndpoints {
            article_list: format!(
                "{}/article/authlist?access_token={{ACCESS_TOKEN}}&openid={{OPENID}}&page={{PAGE}}&limit={{LIMIT}}",
                server.url()
            ),
            ..ApiEndpoints::default()
        };
        let client = authorized_client(endpoints).await;

        let envelope = client.article_list(2, 5).await.unwrap();
        mock.assert_async().await;
        assert!(envelope.is_success());

        let page = crate::models::ArticleListPage::from_envelope(&envelope).unwrap();
        assert_eq!(page.page, "2");
        assert_eq!(page.limit, "5");
    }

    #[tokio::test]
    async fn test_pub_live_substitutes_every_parameter() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/article/authpublive")
            .match_query(mockito::Matcher::Regex(
                "title=Show&start_time=100&end_time=200&cover_pic=http://c/p.jpg&rtmp_url=rtmp://s"
                    .to_string(),
            ))
            .with_body(SUCCESS_BODY)
            .create_async()
            .await;

        let endpoints = ApiEndpoints {
            pub_live: format!(
                "{}/article/authpublive?access_token={{ACCESS_TOKEN}}&openid={{OPENID}}&title={{TITLE}}&start_time={{START_TIME}}&end_time={{END_TIME}}&cover_pic={{COVER_PIC}}&rtmp_url={{RTMP_URL}}",
                server.url()
            ),
            ..ApiEndpoints::default()
        };
        let client = authorized_client(endpoints).await;

        let envelope = client
            .pub_live("Show", "100", "200", "http://c/p.jpg", "rtmp://s")
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(envelope.data.unwrap()["transaction_id"], "t1");
    }

    #[tokio::test]
    async fn test_pub_vid_computes_md5_and_attaches_media() {
        // md5("hello world") = 5eb63bbbe01eeed093cb22bb8f5acdc3
        let mut media = tempfile::Builder::new().suffix(".mp4").tempfile().unwrap();
        media.write_all(b"hello world").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/article/authpubvid")
            .match_query(mockito::Matcher::Regex(
                "md5=5eb63bbbe01eeed093cb22bb8f5acdc3&desc=d&apply=1".to_string(),
            ))
            .match_body(mockito::Matcher::Regex("name=\"media\"".to_string()))
            .with_body(SUCCESS_BODY)
            .create_async()
            .await;

        let endpoints = ApiEndpoints {
            pub_vid: format!(
                "{}/article/authpubvid?access_token={{ACCESS_TOKEN}}&openid={{OPENID}}&title={{TITLE}}&tags={{TAGS}}&cat={{CAT}}&md5={{MD5}}&desc={{DESC}}&apply={{APPLY}}",
                server.url()
            ),
            ..ApiEndpoints::default()
        };
        let client = authorized_client(endpoints).await;

        let envelope = client
            .pub_vid("t", "tag1", "cat1", "d", media.path(), true)
            .await
            .unwrap();
        mock.assert_async().await;
        assert!(envelope.is_success());
    }

    #[tokio::test]
    async fn test_pub_video_pic_uploads_cover() {
        let mut media = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        media.write_all(b"jpeg bytes").unwrap();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/video/authvideopic")
            .match_query(mockito::Matcher::Regex("vid=v123".to_string()))
            .match_body(mockito::Matcher::Regex("name=\"media\"".to_string()))
            .with_body(SUCCESS_BODY)
            .create_async()
            .await;

        let endpoints = ApiEndpoints {
            video_pic: format!(
                "{}/video/authvideopic?access_token={{ACCESS_TOKEN}}&openid={{OPENID}}&md5={{MD5}}&vid={{VID}}",
                server.url()
            ),
            ..ApiEndpoints::default()
        };
        let client = authorized_client(endpoints).await;

        let envelope = client.pub_video_pic(media.path(), "v123").await.unwrap();
        mock.assert_async().await;
        assert!(envelope.is_success());
    }

    #[tokio::test]
    async fn test_media_basic_info_uses_token_params_only() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/media/basicinfoauth")
            .match_query(mockito::Matcher::Regex(
                "access_token=tok&openid=u1".to_string(),
            ))
            .with_body(r#"{"code":"0","msg":"success","data":{"nick":"测试","header":"http://h"}}"#)
            .create_async()
            .await;

        let endpoints = ApiEndpoints {
            media_basic_info: format!(
                "{}/media/basicinfoauth?access_token={{ACCESS_TOKEN}}&openid={{OPENID}}",
                server.url()
            ),
            ..ApiEndpoints::default()
        };
        let client = authorized_client(endpoints).await;

        let envelope = client.media_basic_info().await.unwrap();
        mock.assert_async().await;
        assert_eq!(envelope.data.unwrap()["nick"], "测试");
    }

    #[tokio::test]
    async fn test_provider_error_envelope_is_returned_not_raised() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/transaction/infoauth")
            .match_query(mockito::Matcher::Any)
            .with_body(r#"{"code":"10010","msg":"no such transaction","data":null}"#)
            .create_async()
            .await;

        let endpoints = ApiEndpoints {
            transaction_info: format!(
                "{}/transaction/infoauth?access_token={{ACCESS_TOKEN}}&openid={{OPENID}}&transaction_id={{TRANSACTION_ID}}",
                server.url()
            ),
            ..ApiEndpoints::default()
        };
        let client = authorized_client(endpoints).await;

        let envelope = client.transaction_info("missing").await.unwrap();
        assert!(!envelope.is_success());
        assert_eq!(envelope.code, "10010");
    }

    #[tokio::test]
    async fn test_endpoint_fails_with_not_yet_authorized_when_unbound() {
        let config = Arc::new(Config::new("cid", "csecret"));
        let http = Arc::new(OmHttpClient::new().unwrap());
        let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
        let token_manager = Arc::new(TokenManager::new(config, store, Arc::clone(&http)));
        let client = ApiClient::new(token_manager, http);

        let err = client.article_list(1, 10).await.unwrap_err();
        assert!(err.is_not_yet_authorized());
    }
}
