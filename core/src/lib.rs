//! Blocking client for the AbuseIPDB v2 API.
//!
//! # Overview
//! `Client` wraps one ureq agent and an API key. Each endpoint has a
//! `build_*` method that validates options and describes the request as an
//! `HttpRequest`, and an executing method (`check`, `report`, ...) that sends
//! it and decodes the JSON payload into a typed response.
//!
//! ```no_run
//! use abuseipdb::{CheckOptions, Client};
//!
//! let client = Client::new("my-api-key");
//! let response = client.check("1.1.1.1", &CheckOptions::default().max_age_in_days(90))?;
//! println!("score: {}", response.data.abuse_confidence_score);
//! # Ok::<(), abuseipdb::Error>(())
//! ```
//!
//! # Design
//! - Validation runs before anything is sent; rejected options never reach
//!   the network.
//! - Responses outside 200-299 become `RequestError`, which keeps the raw body
//!   alongside any `detail` strings from the error envelope.
//! - No retries, rate limiting or caching.

use std::time::Duration;

pub mod blacklist;
pub mod category;
pub mod check;
pub mod client;
pub mod encode;
pub mod error;
pub mod http;
pub mod report;
pub mod types;

pub use blacklist::{BlacklistOptions, NO_BLACKLIST_LIMIT};
pub use category::Category;
pub use check::CheckOptions;
pub use client::Client;
pub use error::{Error, RequestError, Result};
pub use http::{HttpMethod, HttpRequest, RequestOptions, Response};
pub use report::ReportOptions;
pub use types::{
    BlacklistResponse, BulkReportResponse, CheckBlockResponse, CheckResponse, ReportResponse,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const BASE_URL: &str = "https://api.abuseipdb.com/api/v2";

pub const USER_AGENT: &str = concat!(
    "AbuseIPDB-Rust-Client/",
    env!("CARGO_PKG_VERSION"),
    " (+",
    env!("CARGO_PKG_REPOSITORY"),
    ")"
);

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
