//! HTTP transport types shared by the request executor and the endpoints.
//!
//! # Design
//! Endpoint operations first describe their request as plain data
//! (`HttpRequest`) and only then hand it to `Client::send`. Everything that can
//! fail before the network is touched (parameter validation, query and form
//! encoding, reading a CSV file) happens while building the description, so a
//! rejected call never reaches the transport.

use std::collections::HashMap;
use std::fmt;

/// Response handle returned by the executor. The body is an unread,
/// single-use stream.
pub type Response = ureq::http::Response<ureq::Body>;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-call options for `Client::make_request`.
///
/// `params` are encoded into the query string, `headers` are merged over the
/// client's default headers and `body` is sent verbatim.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub params: HashMap<String, String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// A fully addressed request described as plain data.
///
/// Headers keep their insertion order and may repeat a name; the executor
/// sends every entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// All values sent for `name`, compared case-insensitively.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// The first value sent for `name`, if any.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_values(name).into_iter().next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_options_builder_collects_everything() {
        let options = RequestOptions::new()
            .param("ipAddress", "1.1.1.1")
            .header("X-Trace", "a")
            .header("X-Trace", "b")
            .body("ip=1.1.1.1");

        assert_eq!(options.params.get("ipAddress").map(String::as_str), Some("1.1.1.1"));
        assert_eq!(options.headers.len(), 2);
        assert_eq!(options.body.as_deref(), Some(&b"ip=1.1.1.1"[..]));
    }

    #[test]
    fn header_lookup_is_case_insensitive() {
        let req = HttpRequest {
            method: HttpMethod::Get,
            url: "http://localhost/check".to_string(),
            headers: vec![
                ("Accept".to_string(), "application/json".to_string()),
                ("x-trace".to_string(), "1".to_string()),
                ("X-Trace".to_string(), "2".to_string()),
            ],
            body: None,
        };

        assert_eq!(req.header("accept"), Some("application/json"));
        assert_eq!(req.header_values("X-TRACE"), vec!["1", "2"]);
        assert!(req.header("Key").is_none());
    }

    #[test]
    fn method_renders_uppercase() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
    }
}
