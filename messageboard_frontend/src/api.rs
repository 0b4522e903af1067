use std::sync::Arc;

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::FrontendConfig;
use crate::error::BoardError;
use crate::identity::Identity;
use crate::logutil::escape_log;
use crate::models::{CreatedPost, Post, TOP_LEVEL};
use crate::transport::{HttpTransport, RawResponse, Transport};

pub const FRONT_PAGE_ENDPOINT: &str = "getFrontPage.php";
pub const REPLIES_ENDPOINT: &str = "getReplies.php";
pub const NEW_POST_ENDPOINT: &str = "newPost.php";

#[derive(Clone)]
pub struct BoardClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
    identity: Identity,
}

impl BoardClient {
    pub fn new(base_url: Url, transport: Arc<dyn Transport>, identity: Identity) -> Self {
        Self {
            base_url,
            transport,
            identity,
        }
    }

    /// Builds a client speaking real HTTP to the configured host.
    pub fn connect(config: &FrontendConfig, identity: Identity) -> Result<Self> {
        let base_url = config.base_url()?;
        let transport = HttpTransport::new(&config.user_agent, config.request_timeout())
            .context("failed to build HTTP client")?;
        Ok(Self::new(base_url, Arc::new(transport), identity))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// `offset` is passed through untouched; the board gives it no meaning yet.
    pub fn fetch_front_page(&self, offset: i64) -> Result<Vec<Post>, BoardError> {
        let url = self.url(FRONT_PAGE_ENDPOINT, &[("offset", offset.to_string())]);
        let raw = self.transport.request(&url, Method::GET, false)?;
        decode(FRONT_PAGE_ENDPOINT, raw)
    }

    pub fn fetch_replies(&self, post_id: i64) -> Result<Vec<Post>, BoardError> {
        let url = self.url(REPLIES_ENDPOINT, &[("rowid", post_id.to_string())]);
        let raw = self.transport.request(&url, Method::GET, false)?;
        decode(REPLIES_ENDPOINT, raw)
    }

    pub fn submit_top_level(&self, content: &str) -> Result<i64, BoardError> {
        self.submit_post(content, TOP_LEVEL)
    }

    /// Creates a post and returns its row id. `content` is sent exactly as given.
    pub fn submit_post(&self, content: &str, reply_to: i64) -> Result<i64, BoardError> {
        let url = self.url(NEW_POST_ENDPOINT, &[]);
        let reply = reply_to.to_string();
        let form = [
            ("content", content),
            ("reply", reply.as_str()),
            ("tripcode", self.identity.tripcode()),
        ];
        debug!(
            "submitting post (reply to {reply_to}): \"{}\"",
            escape_log(content)
        );
        let raw = self.transport.post_request(&url, &form)?;
        let created: CreatedPost = decode(NEW_POST_ENDPOINT, raw)?;
        Ok(created.rowid)
    }

    fn url(&self, endpoint: &str, query: &[(&str, String)]) -> Url {
        let mut url = self.base_url.clone();
        let path = format!("{}/{}", url.path().trim_end_matches('/'), endpoint);
        url.set_path(&path);
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}

/// Unwraps the board's `{"response": ..}` / `{"error": ..}` envelope.
///
/// An `error` key wins over everything else in the body, so a failure is never
/// reported together with partial data.
fn decode<T: DeserializeOwned>(endpoint: &str, raw: RawResponse) -> Result<T, BoardError> {
    if !raw.is_success() {
        debug!("{endpoint} answered HTTP {}", raw.status);
    }
    let value: Value = serde_json::from_str(&raw.body).map_err(|err| {
        warn!("{endpoint} returned a non-JSON body: {err}");
        BoardError::Malformed(format!("{endpoint}: {err}"))
    })?;
    let Value::Object(mut object) = value else {
        return Err(BoardError::Malformed(format!(
            "{endpoint}: expected a JSON object"
        )));
    };
    if let Some(error) = object.remove("error") {
        let message = match error {
            Value::String(message) => message,
            other => other.to_string(),
        };
        warn!("{endpoint} reported an error: {}", escape_log(&message));
        return Err(BoardError::Server(message));
    }
    let response = object
        .remove("response")
        .ok_or_else(|| BoardError::Malformed(format!("{endpoint}: missing `response`")))?;
    serde_json::from_value(response)
        .map_err(|err| BoardError::Malformed(format!("{endpoint}: {err}")))
}
