//! `GET /blacklist`.

use crate::client::{decode, Client};
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, RequestOptions};
use crate::types::BlacklistResponse;

/// A limit high enough to return the whole blacklist.
/// See <https://docs.abuseipdb.com/#blacklist-ip-truncation>.
pub const NO_BLACKLIST_LIMIT: u32 = 9_999_999;

/// Optional parameters for `Client::blacklist`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlacklistOptions {
    /// Lowest abuse confidence score to include, 25 to 100. Subscriber-only;
    /// `None` leaves the parameter out and the API applies its default of 100.
    pub confidence_minimum: Option<u8>,
    /// Number of addresses to return. At least 1; standard users are capped
    /// at 10,000.
    pub limit: u32,
}

impl Default for BlacklistOptions {
    fn default() -> Self {
        Self {
            confidence_minimum: None,
            limit: 10_000,
        }
    }
}

impl BlacklistOptions {
    pub fn confidence_minimum(mut self, score: u8) -> Self {
        self.confidence_minimum = Some(score);
        self
    }

    pub fn limit(mut self, count: u32) -> Self {
        self.limit = count;
        self
    }

    fn validate(&self) -> Result<()> {
        if let Some(score) = self.confidence_minimum {
            if !(25..=100).contains(&score) {
                return Err(Error::validation(
                    "confidenceMinimum must be between 25 and 100 as a premium user, or -1 otherwise",
                ));
            }
        }
        if self.limit < 1 {
            return Err(Error::validation("limit must be greater than 1"));
        }
        Ok(())
    }
}

impl Client {
    pub fn build_blacklist(&self, options: &BlacklistOptions) -> Result<HttpRequest> {
        options.validate()?;

        let mut params = RequestOptions::new().param("limit", options.limit.to_string());
        if let Some(score) = options.confidence_minimum {
            params = params.param("confidenceMinimum", score.to_string());
        }

        Ok(self.build_request(HttpMethod::Get, "/blacklist", params))
    }

    /// Fetch the most reported IP addresses.
    pub fn blacklist(&self, options: &BlacklistOptions) -> Result<BlacklistResponse> {
        let request = self.build_blacklist(options)?;
        decode(self.send(request)?)
    }
}
