use super::KeyValueStore;
use crate::error::{Error, OotoResult};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

/// Bearer token lifted from client storage.
///
/// Never cached; callers look it up again for every submission.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for the `authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Key predicate: a token key must contain every marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenQuery {
    markers: Vec<String>,
}

impl TokenQuery {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers.into_iter().map(Into::into).collect(),
        }
    }

    pub fn matches(&self, key: &str) -> bool {
        self.markers.iter().all(|marker| key.contains(marker.as_str()))
    }
}

/// Pull the secret out of a stored token entry.
///
/// MSAL stores a JSON envelope with a `secret` field; older clients store the raw token.
fn secret_from_entry(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(parsed) => parsed
            .get("secret")
            .and_then(|s| s.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string()),
        Err(_) => Some(raw.to_string()),
    }
}

/// Scan `store` for the first usable access token whose key satisfies `query`
pub fn find_token(store: &dyn KeyValueStore, query: &TokenQuery) -> OotoResult<Credential> {
    for index in 0..store.key_count() {
        let Some(key) = store.key_at(index) else {
            continue;
        };
        if !query.matches(&key) {
            continue;
        }

        match store.get_value(&key).as_deref().and_then(secret_from_entry) {
            Some(secret) => {
                info!("Found Outlook API token");
                return Ok(Credential::new(secret));
            }
            None => debug!("Token entry {} holds no usable secret, skipping", key),
        }
    }

    Err(Error::CredentialNotFound)
}
