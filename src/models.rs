//! Wire-format models for the Open Media API.
//!
//! Every endpoint answers with the same JSON envelope `{code, msg, data}`.
//! The SDK decodes the envelope but never interprets `code`; provider-level
//! errors are the caller's to branch on.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The provider's uniform response wrapper.
///
/// `code == "0"` conventionally signals success. The SDK returns envelopes
/// unchanged even when `code` indicates a provider-level error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope {
    /// Provider status code as a string, `"0"` on success.
    #[serde(default)]
    pub code: String,
    /// Human-readable status message.
    #[serde(default)]
    pub msg: String,
    /// Endpoint-specific payload, absent on some errors.
    #[serde(default)]
    pub data: Option<Value>,
}

impl Envelope {
    /// Caller convenience: whether `code` is the conventional success value.
    pub fn is_success(&self) -> bool {
        self.code == "0"
    }
}

/// Video metadata nested inside an [`Article`] listing entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub vid: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default, rename = "type")]
    pub video_type: String,
}

/// One entry of the published-article listing.
///
/// Purely a deserialization target: missing keys keep their defaults and
/// unrecognized keys in the source mapping are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub article_title: String,
    #[serde(default)]
    pub article_type: String,
    #[serde(default)]
    pub article_abstract: String,
    #[serde(default)]
    pub article_imgurl: String,
    #[serde(default)]
    pub article_pub_flag: String,
    #[serde(default)]
    pub article_pub_time: String,
    #[serde(default)]
    pub article_id: u64,
    #[serde(default)]
    pub article_url: String,
    #[serde(default)]
    pub article_video_info: VideoInfo,
    #[serde(default)]
    pub article_pid: u64,
}

impl VideoInfo {
    fn from_value(value: &Value) -> Self {
        Self {
            vid: string_field(value, "vid"),
            title: string_field(value, "title"),
            desc: string_field(value, "desc"),
            video_type: string_field(value, "type"),
        }
    }
}

impl Article {
    /// Decodes an article from a raw JSON mapping, field by field:
    /// missing or wrong-typed keys keep their defaults without affecting
    /// the rest of the record, and unknown keys are ignored.
    pub fn from_value(value: &Value) -> Self {
        Self {
            article_title: string_field(value, "article_title"),
            article_type: string_field(value, "article_type"),
            article_abstract: string_field(value, "article_abstract"),
            article_imgurl: string_field(value, "article_imgurl"),
            article_pub_flag: string_field(value, "article_pub_flag"),
            article_pub_time: string_field(value, "article_pub_time"),
            article_id: u64_field(value, "article_id"),
            article_url: string_field(value, "article_url"),
            article_video_info: value
                .get("article_video_info")
                .map(VideoInfo::from_value)
                .unwrap_or_default(),
            article_pid: u64_field(value, "article_pid"),
        }
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn u64_field(value: &Value, key: &str) -> u64 {
    value.get(key).and_then(Value::as_u64).unwrap_or_default()
}

/// One page of the article listing, as returned under `data` by the
/// list endpoint. The provider sends `page`/`limit`/`total` as strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleListPage {
    #[serde(default)]
    pub articles: Vec<Article>,
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub limit: String,
    #[serde(default)]
    pub total: String,
}

impl ArticleListPage {
    /// Extracts the listing page from a list-endpoint envelope, if its
    /// `data` payload is present. Articles are decoded individually, so
    /// one malformed entry does not discard the rest of the page.
    pub fn from_envelope(envelope: &Envelope) -> Option<Self> {
        let data = envelope.data.as_ref()?;
        let articles = data
            .get("articles")
            .and_then(Value::as_array)
            .map(|list| list.iter().map(Article::from_value).collect())
            .unwrap_or_default();
        Some(Self {
            articles,
            page: string_field(data, "page"),
            limit: string_field(data, "limit"),
            total: string_field(data, "total"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_envelope() {
        let envelope: Envelope = serde_json::from_value(json!({
            "code": "0",
            "msg": "success",
            "data": { "transaction_id": "t123" }
        }))
        .unwrap();

        assert!(envelope.is_success());
        assert_eq!(envelope.msg, "success");
        assert_eq!(envelope.data.unwrap()["transaction_id"], "t123");
    }

    #[test]
    fn test_deserialize_envelope_without_data() {
        let envelope: Envelope =
            serde_json::from_value(json!({ "code": "10001", "msg": "invalid token" })).unwrap();

        assert!(!envelope.is_success());
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_article_defaults_missing_fields() {
        let article = Article::from_value(&json!({
            "article_title": "广场舞《故乡是北京》",
            "article_type": "视频文章",
            "article_pub_flag": "发布成功"
        }));

        assert_eq!(article.article_title, "广场舞《故乡是北京》");
        assert_eq!(article.article_abstract, "");
        assert_eq!(article.article_id, 0);
        assert_eq!(article.article_video_info, VideoInfo::default());
    }

    #[test]
    fn test_article_ignores_unknown_fields() {
        let article = Article::from_value(&json!({
            "article_title": "t",
            "not_a_real_field": 42,
            "another_unknown": { "nested": true }
        }));

        assert_eq!(article.article_title, "t");
    }

    #[test]
    fn test_article_keeps_other_fields_when_one_is_mistyped() {
        let article = Article::from_value(&json!({
            "article_title": "t",
            "article_id": "not-a-number",
            "article_url": "http://kuaibao.qq.com/s/x"
        }));

        assert_eq!(article.article_title, "t");
        assert_eq!(article.article_id, 0);
        assert_eq!(article.article_url, "http://kuaibao.qq.com/s/x");
    }

    #[test]
    fn test_article_nested_video_info() {
        let article = Article::from_value(&json!({
            "article_title": "海南琼海加详文艺队广场舞",
            "article_video_info": {
                "desc": "DESC",
                "title": "海南琼海加详文艺队广场舞",
                "type": "video",
                "vid": "p0380p4aku7"
            }
        }));

        assert_eq!(article.article_video_info.vid, "p0380p4aku7");
        assert_eq!(article.article_video_info.video_type, "video");
    }

    #[test]
    fn test_article_list_page_from_envelope() {
        let envelope: Envelope = serde_json::from_value(json!({
            "code": "0",
            "msg": "success",
            "data": {
                "articles": [
                    { "article_title": "first", "article_type": "视频文章" },
                    { "article_title": "second" }
                ],
                "limit": "2",
                "page": "1",
                "total": "28"
            }
        }))
        .unwrap();

        let page = ArticleListPage::from_envelope(&envelope).unwrap();
        assert_eq!(page.articles.len(), 2);
        assert_eq!(page.articles[0].article_title, "first");
        assert_eq!(page.page, "1");
        assert_eq!(page.total, "28");
    }

    #[test]
    fn test_article_list_page_absent_data() {
        let envelope = Envelope {
            code: "10002".to_string(),
            msg: "error".to_string(),
            data: None,
        };
        assert!(ArticleListPage::from_envelope(&envelope).is_none());
    }
}
