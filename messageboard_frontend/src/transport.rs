use std::io;
use std::time::Duration;

use log::debug;
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
pub use reqwest::{Method, Url};
use thiserror::Error;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// Status and full text body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to read response from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("connection failed: {0}")]
    Io(#[from] io::Error),
}

/// Moves bytes between the board client and the API host.
///
/// Implementations report a [`RawResponse`] for every exchange that produced
/// a response, whatever its status code, and only fail on I/O-level problems.
pub trait Transport: Send + Sync {
    fn request(
        &self,
        url: &Url,
        method: Method,
        follow_redirects: bool,
    ) -> Result<RawResponse, TransportError>;

    /// POSTs `form` as an urlencoded body, keeping the field order.
    fn post_request(&self, url: &Url, form: &[(&str, &str)])
        -> Result<RawResponse, TransportError>;
}

/// Blocking reqwest transport. Cloning shares the underlying connection pools.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    no_redirect_client: Client,
}

impl HttpTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(timeout)
            .build()
            .map_err(TransportError::Build)?;
        let no_redirect_client = Client::builder()
            .user_agent(user_agent.to_string())
            .timeout(timeout)
            .redirect(Policy::none())
            .build()
            .map_err(TransportError::Build)?;
        Ok(Self {
            client,
            no_redirect_client,
        })
    }

    fn client_for(&self, follow_redirects: bool) -> &Client {
        if follow_redirects {
            &self.client
        } else {
            &self.no_redirect_client
        }
    }
}

impl Transport for HttpTransport {
    fn request(
        &self,
        url: &Url,
        method: Method,
        follow_redirects: bool,
    ) -> Result<RawResponse, TransportError> {
        debug!("{method} {url}");
        let response = self
            .client_for(follow_redirects)
            .request(method, url.clone())
            .send()
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;
        read_response(url, response)
    }

    fn post_request(
        &self,
        url: &Url,
        form: &[(&str, &str)],
    ) -> Result<RawResponse, TransportError> {
        let body = encode_form(form);
        debug!("POST {url} ({} bytes)", body.len());
        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .map_err(|source| TransportError::Request {
                url: url.to_string(),
                source,
            })?;
        read_response(url, response)
    }
}

// Consumes the response so the connection goes back to the pool on every path.
fn read_response(url: &Url, response: Response) -> Result<RawResponse, TransportError> {
    let status = response.status().as_u16();
    let body = response.text().map_err(|source| TransportError::Body {
        url: url.to_string(),
        source,
    })?;
    debug!("{url} answered {status} ({} bytes)", body.len());
    Ok(RawResponse { status, body })
}

/// Percent-encodes each key and value as UTF-8 and joins the pairs with `&`.
pub fn encode_form(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}
