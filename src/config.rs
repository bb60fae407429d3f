//! Application credentials and URL template substitution.

use std::collections::BTreeMap;

/// Placeholder for the client id in URL templates.
pub const CLIENT_ID: &str = "{CLIENT_ID}";
/// Placeholder for the client secret in URL templates.
pub const CLIENT_SECRET: &str = "{CLIENT_SECRET}";

/// Open Media application credentials.
///
/// Immutable after construction; shared by reference with
/// [`TokenManager`](crate::auth::TokenManager).
#[derive(Debug, Clone)]
pub struct Config {
    client_id: String,
    client_secret: String,
}

impl Config {
    /// Creates a config from the application's client credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Returns the client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Substitutes `{PLACEHOLDER}` tokens into a URL template.
    ///
    /// Every pair in `replacements` is applied as a literal substring
    /// replacement, plus `{CLIENT_ID}` and `{CLIENT_SECRET}` from this
    /// config. The config's own values are merged last, so caller-supplied
    /// pairs under those two keys are overridden.
    ///
    /// No percent-encoding is performed; callers must pre-encode values
    /// that contain URL-breaking characters.
    pub fn api_url(&self, template: &str, replacements: &[(&str, String)]) -> String {
        let mut merged: BTreeMap<&str, &str> = BTreeMap::new();
        for (key, value) in replacements {
            merged.insert(*key, value.as_str());
        }
        merged.insert(CLIENT_ID, self.client_id.as_str());
        merged.insert(CLIENT_SECRET, self.client_secret.as_str());

        substitute(template, &merged)
    }
}

/// Replaces every occurrence of each key in `pairs` with its value.
///
/// Single left-to-right scan: replacement values are emitted verbatim and
/// never re-scanned for further keys.
pub(crate) fn substitute(template: &str, pairs: &BTreeMap<&str, &str>) -> String {
    let mut url = String::with_capacity(template.len());
    let mut rest = template;
    'scan: while !rest.is_empty() {
        for (key, value) in pairs {
            if rest.starts_with(key) {
                url.push_str(value);
                rest = &rest[key.len()..];
                continue 'scan;
            }
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            url.push(c);
            rest = chars.as_str();
        }
    }
    url
}
