//! Response payloads returned by the AbuseIPDB endpoints.
//!
//! Fields the API may send as `null` or only in verbose mode are `Option` or
//! default to empty collections. Everything else is required, so a payload
//! missing one of them fails to decode instead of producing a half-filled
//! value.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub type Timestamp = DateTime<FixedOffset>;

/// Response of `GET /check`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub data: CheckData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckData {
    pub ip_address: String,
    pub is_public: bool,
    pub ip_version: u8,
    #[serde(default)]
    pub is_whitelisted: Option<bool>,
    pub abuse_confidence_score: u8,
    #[serde(default)]
    pub country_code: Option<String>,
    /// Only present in verbose mode.
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub usage_type: Option<String>,
    #[serde(default)]
    pub isp: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub hostnames: Vec<String>,
    pub total_reports: u32,
    pub num_distinct_users: u32,
    #[serde(default)]
    pub last_reported_at: Option<Timestamp>,
    /// Only present in verbose mode.
    #[serde(default)]
    pub reports: Vec<Report>,
}

/// A single report filed against an IP address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub reported_at: Timestamp,
    #[serde(default)]
    pub comment: Option<String>,
    pub categories: Vec<u8>,
    pub reporter_id: u64,
    #[serde(default)]
    pub reporter_country_code: Option<String>,
    #[serde(default)]
    pub reporter_country_name: Option<String>,
}

/// Response of `GET /check-block`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckBlockResponse {
    pub data: CheckBlockData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckBlockData {
    pub network_address: String,
    pub netmask: String,
    pub min_address: String,
    pub max_address: String,
    pub num_possible_hosts: u64,
    pub address_space_desc: String,
    #[serde(default)]
    pub reported_address: Vec<ReportedAddress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportedAddress {
    pub ip_address: String,
    pub num_reports: u32,
    pub most_recent_report: Timestamp,
    pub abuse_confidence_score: u8,
    #[serde(default)]
    pub country_code: Option<String>,
}

/// Response of `POST /report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportResponse {
    pub data: ReportData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub ip_address: String,
    pub abuse_confidence_score: u8,
}

/// Response of `POST /bulk-report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkReportResponse {
    pub data: BulkReportData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReportData {
    pub saved_reports: u32,
    #[serde(default)]
    pub invalid_reports: Vec<InvalidReport>,
}

/// A CSV row the bulk-report endpoint refused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidReport {
    pub error: String,
    pub input: String,
    pub row_number: u32,
}

/// Response of `GET /blacklist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlacklistResponse {
    pub meta: BlacklistMeta,
    pub data: Vec<BlacklistEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlacklistMeta {
    pub generated_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlacklistEntry {
    pub ip_address: String,
    pub abuse_confidence_score: u8,
    pub last_reported_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_response_decodes_verbose_payload() {
        let body = r#"{
            "data": {
                "ipAddress": "118.25.6.39",
                "isPublic": true,
                "ipVersion": 4,
                "isWhitelisted": false,
                "abuseConfidenceScore": 100,
                "countryCode": "CN",
                "countryName": "China",
                "usageType": "Data Center/Web Hosting/Transit",
                "isp": "Tencent Cloud Computing (Beijing) Co. Ltd",
                "domain": "tencent.com",
                "hostnames": [],
                "totalReports": 1,
                "numDistinctUsers": 1,
                "lastReportedAt": "2018-12-20T20:55:14+00:00",
                "reports": [
                    {
                        "reportedAt": "2018-12-20T20:55:14+00:00",
                        "comment": "Dec 20 20:55:14 srv206 sshd[13937]: Invalid user oracle",
                        "categories": [18, 22],
                        "reporterId": 1,
                        "reporterCountryCode": "US",
                        "reporterCountryName": "United States"
                    }
                ]
            }
        }"#;

        let response: CheckResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.data.ip_address, "118.25.6.39");
        assert_eq!(response.data.country_name.as_deref(), Some("China"));
        assert_eq!(response.data.reports.len(), 1);
        assert_eq!(response.data.reports[0].categories, vec![18, 22]);
        assert!(response.data.last_reported_at.is_some());
    }

    #[test]
    fn check_response_tolerates_nulls_for_unreported_ip() {
        let body = r#"{"data":{"ipAddress":"127.0.0.1","isPublic":false,"ipVersion":4,
            "isWhitelisted":null,"abuseConfidenceScore":0,"countryCode":null,
            "usageType":"Reserved","isp":"Loopback","domain":null,"hostnames":["localhost"],
            "totalReports":0,"numDistinctUsers":0,"lastReportedAt":null}}"#;

        let response: CheckResponse = serde_json::from_str(body).unwrap();
        assert!(response.data.last_reported_at.is_none());
        assert!(response.data.reports.is_empty());
        assert_eq!(response.data.hostnames, vec!["localhost"]);
    }

    #[test]
    fn check_response_rejects_missing_required_field() {
        let body = r#"{"data":{"ipAddress":"1.1.1.1"}}"#;
        assert!(serde_json::from_str::<CheckResponse>(body).is_err());
    }

    #[test]
    fn blacklist_response_decodes() {
        let body = r#"{
            "meta": {"generatedAt": "2020-09-24T19:54:11+00:00"},
            "data": [
                {"ipAddress": "5.188.10.179", "abuseConfidenceScore": 100, "lastReportedAt": "2020-09-24T19:17:02+00:00"}
            ]
        }"#;

        let response: BlacklistResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.data.len(), 1);
        assert_eq!(response.data[0].abuse_confidence_score, 100);
    }

    #[test]
    fn bulk_report_response_decodes_invalid_rows() {
        let body = r#"{"data":{"savedReports":60,"invalidReports":[
            {"error":"Duplicate IP","input":"41.188.138.68","rowNumber":5}
        ]}}"#;

        let response: BulkReportResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.data.saved_reports, 60);
        assert_eq!(response.data.invalid_reports[0].row_number, 5);
    }
}
