//! Request executor shared by every endpoint.
//!
//! # Design
//! `Client` owns one ureq agent and the API key and never mutates either after
//! construction, so a single instance can serve any number of threads. Each
//! call goes through `build_request`, which produces a plain `HttpRequest`,
//! and `send`, which performs the round-trip and classifies the status.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::encode::build_query_string;
use crate::error::{Error, RequestError, Result};
use crate::http::{HttpMethod, HttpRequest, RequestOptions, Response};
use crate::{BASE_URL, DEFAULT_TIMEOUT, USER_AGENT};

const USER_AGENT_HEADER: &str = "User-Agent";

/// Blocking client for the AbuseIPDB v2 API.
#[derive(Clone)]
pub struct Client {
    agent: ureq::Agent,
    api_key: String,
    base_url: String,
}

impl Client {
    /// Create a client for the public API.
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Create a client for an alternative origin such as a proxy or a local
    /// stub. `base_url` must include the `/api/v2`-style prefix if the origin
    /// expects one.
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(DEFAULT_TIMEOUT))
            .http_status_as_error(false)
            .build()
            .new_agent();

        Self {
            agent,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Timeout applied to every call made through this client, as configured
    /// on the underlying agent.
    pub fn timeout(&self) -> Option<Duration> {
        self.agent.config().timeouts().global
    }

    /// Describe a request without sending it.
    ///
    /// `Accept`, `Key` and `User-Agent` are always set. A caller header named
    /// `User-Agent` (any case) replaces the default; any other caller header
    /// is appended, so repeated names are all sent.
    pub fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        options: RequestOptions,
    ) -> HttpRequest {
        let url = format!(
            "{}{}{}",
            self.base_url,
            endpoint,
            build_query_string(&options.params)
        );

        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("Key".to_string(), self.api_key.clone()),
            (USER_AGENT_HEADER.to_string(), USER_AGENT.to_string()),
        ];

        for (name, value) in options.headers {
            if name.eq_ignore_ascii_case(USER_AGENT_HEADER) {
                headers.retain(|(k, _)| !k.eq_ignore_ascii_case(USER_AGENT_HEADER));
            }
            headers.push((name, value));
        }

        HttpRequest {
            method,
            url,
            headers,
            body: options.body,
        }
    }

    /// Build and send a request against `endpoint`.
    pub fn make_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<Response> {
        self.send(self.build_request(method, endpoint, options))
    }

    /// Send a previously built request.
    ///
    /// Transport failures are returned as `Error::Transport` unchanged. A
    /// status outside 200-299 has its body read and becomes
    /// `Error::Request`. On success the body is left unread.
    pub fn send(&self, request: HttpRequest) -> Result<Response> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let response = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()?
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(request.url.as_str());
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(&body[..])?,
                    None => builder.send_empty()?,
                }
            }
        };

        let status = response.status().as_u16();
        debug!(status, url = %request.url, "received response");

        if !(200..=299).contains(&status) {
            return Err(unwrap_error(response).into());
        }

        Ok(response)
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout())
            .finish()
    }
}

/// Read a failed response in full and turn it into a `RequestError`.
fn unwrap_error(response: Response) -> RequestError {
    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();

    let mut body = response.into_body();
    let bytes = body
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()
        .unwrap_or_else(|e| {
            warn!(status, error = %e, "failed to read error response body");
            Vec::new()
        });
    let raw = String::from_utf8_lossy(&bytes).into_owned();

    let err = RequestError::from_body(status, headers, raw);
    warn!(status, details = ?err.details, "api request failed");
    err
}

/// Read a successful response body and decode it as JSON.
pub(crate) fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let mut body = response.into_body();
    let bytes = body.with_config().limit(u64::MAX).read_to_vec()?;
    serde_json::from_slice(&bytes).map_err(Error::Decode)
}
