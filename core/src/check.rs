//! `GET /check` and `GET /check-block`.

use crate::client::{decode, Client};
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, RequestOptions};
use crate::types::{CheckBlockResponse, CheckResponse};

/// Optional parameters for `Client::check` and `Client::check_block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOptions {
    /// Include the country name and individual reports. Ignored by
    /// `check_block`, which has no verbose mode.
    pub verbose: bool,
    /// Only consider reports newer than this, between 1 and 365.
    ///
    /// For `check_block`, values above 30 require a paid plan (Basic up to 60,
    /// Premium up to 365).
    pub max_age_in_days: u32,
}

impl Default for CheckOptions {
    fn default() -> Self {
        Self {
            verbose: true,
            max_age_in_days: 30,
        }
    }
}

impl CheckOptions {
    pub fn verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    pub fn max_age_in_days(mut self, days: u32) -> Self {
        self.max_age_in_days = days;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(1..=365).contains(&self.max_age_in_days) {
            return Err(Error::validation("maxAgeInDays must be between 1 and 365"));
        }
        Ok(())
    }
}

impl Client {
    pub fn build_check(&self, ip_address: &str, options: &CheckOptions) -> Result<HttpRequest> {
        options.validate()?;

        let mut params = RequestOptions::new()
            .param("ipAddress", ip_address)
            .param("maxAgeInDays", options.max_age_in_days.to_string());
        if options.verbose {
            params = params.param("verbose", "true");
        }

        Ok(self.build_request(HttpMethod::Get, "/check", params))
    }

    /// Look up what AbuseIPDB knows about a single IPv4 or IPv6 address.
    pub fn check(&self, ip_address: &str, options: &CheckOptions) -> Result<CheckResponse> {
        let request = self.build_check(ip_address, options)?;
        decode(self.send(request)?)
    }

    pub fn build_check_block(&self, network: &str, options: &CheckOptions) -> Result<HttpRequest> {
        options.validate()?;

        let params = RequestOptions::new()
            .param("network", network)
            .param("maxAgeInDays", options.max_age_in_days.to_string());

        Ok(self.build_request(HttpMethod::Get, "/check-block", params))
    }

    /// Look up a subnet in CIDR notation.
    ///
    /// Free plans may check up to a /24, Basic up to a /20 and Premium up to a
    /// /16.
    pub fn check_block(&self, network: &str, options: &CheckOptions) -> Result<CheckBlockResponse> {
        let request = self.build_check_block(network, options)?;
        decode(self.send(request)?)
    }
}
