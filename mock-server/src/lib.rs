//! In-memory stub of the AbuseIPDB v2 API.
//!
//! Serves the same paths and payload shapes as the real service under
//! `/api/v2`, backed by a report store that lives for the lifetime of the
//! router. Every route except the `/api/v2` banner requires the `Key` header
//! to match the key the router was built with.

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    net::{IpAddr, Ipv4Addr},
    sync::Arc,
};

use axum::{
    extract::{Form, Multipart, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

pub const DEFAULT_API_KEY: &str = "mock-api-key";
pub const BANNER: &str = "AbuseIPDB APIv2 Server.";

const AUTH_FAILED: &str = "Authentication failed. Your API key is either missing, incorrect, or revoked. Note: The APIv2 key differs from the APIv1 key.";
const REPORTER_ID: u64 = 1;

/// A report held by the stub.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StoredReport {
    pub ip: IpAddr,
    pub categories: Vec<u8>,
    pub comment: Option<String>,
    pub reported_at: DateTime<Utc>,
    pub reporter_id: u64,
}

pub struct AppState {
    api_key: String,
    reports: RwLock<Vec<StoredReport>>,
}

pub type Db = Arc<AppState>;

/// Error response in the AbuseIPDB envelope format.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: String,
}

impl ApiError {
    fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    fn unprocessable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "errors": [{ "detail": self.detail, "status": self.status.as_u16() }]
        });
        (self.status, Json(body)).into_response()
    }
}

pub fn app(api_key: &str) -> Router {
    let state: Db = Arc::new(AppState {
        api_key: api_key.to_string(),
        reports: RwLock::new(Vec::new()),
    });

    let authenticated = Router::new()
        .route("/api/v2/check", get(check))
        .route("/api/v2/check-block", get(check_block))
        .route("/api/v2/report", post(report))
        .route("/api/v2/bulk-report", post(bulk_report))
        .route("/api/v2/blacklist", get(blacklist))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_key));

    Router::new()
        .route("/api/v2", get(banner))
        .merge(authenticated)
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock AbuseIPDB server listening");
    }
    axum::serve(listener, app(api_key)).await
}

async fn require_key(State(db): State<Db>, request: Request, next: Next) -> Response {
    let key = request
        .headers()
        .get("Key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if key.is_empty() || key != db.api_key {
        debug!(path = %request.uri().path(), "rejecting request with bad key");
        return ApiError::new(StatusCode::UNAUTHORIZED, AUTH_FAILED).into_response();
    }
    next.run(request).await
}

async fn banner() -> &'static str {
    BANNER
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn confidence(num_reports: usize) -> u8 {
    (num_reports.saturating_mul(25)).min(100) as u8
}

fn is_public(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => !(v6.is_loopback() || v6.is_unspecified()),
    }
}

fn parse_ip(raw: Option<&String>) -> Result<IpAddr, ApiError> {
    let raw = raw.ok_or_else(|| ApiError::unprocessable("The ip address field is required."))?;
    raw.parse().map_err(|_| {
        ApiError::unprocessable(
            "The ip address must be a valid IPv4 or IPv6 address (e.g. 8.8.8.8 or 2001:4860:4860::8888).",
        )
    })
}

fn parse_max_age(params: &HashMap<String, String>) -> Result<i64, ApiError> {
    let days = match params.get("maxAgeInDays") {
        Some(raw) => raw.parse::<i64>().unwrap_or(0),
        None => 30,
    };
    if !(1..=365).contains(&days) {
        return Err(ApiError::unprocessable(
            "The max age in days must be between 1 and 365.",
        ));
    }
    Ok(days)
}

fn parse_categories(raw: &str) -> Result<Vec<u8>, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("The categories field is required.".to_string());
    }
    raw.split(',')
        .map(|part| match part.trim().parse::<u8>() {
            Ok(id @ 1..=23) => Ok(id),
            _ => Err(format!("Category \"{}\" is invalid.", part.trim())),
        })
        .collect()
}

async fn check(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let ip = parse_ip(params.get("ipAddress"))?;
    let max_age = parse_max_age(&params)?;
    let verbose = params.contains_key("verbose");
    let since = Utc::now() - Duration::days(max_age);

    let store = db.reports.read().await;
    let matching: Vec<&StoredReport> = store
        .iter()
        .filter(|r| r.ip == ip && r.reported_at >= since)
        .collect();
    let distinct_users: HashSet<u64> = matching.iter().map(|r| r.reporter_id).collect();
    let last_reported_at = matching.iter().map(|r| r.reported_at).max();

    let mut data = json!({
        "ipAddress": ip.to_string(),
        "isPublic": is_public(&ip),
        "ipVersion": if ip.is_ipv4() { 4 } else { 6 },
        "isWhitelisted": false,
        "abuseConfidenceScore": confidence(matching.len()),
        "countryCode": null,
        "usageType": null,
        "isp": null,
        "domain": null,
        "hostnames": [],
        "totalReports": matching.len(),
        "numDistinctUsers": distinct_users.len(),
        "lastReportedAt": last_reported_at.as_ref().map(timestamp),
    });

    if verbose {
        let reports: Vec<Value> = matching
            .iter()
            .map(|r| {
                json!({
                    "reportedAt": timestamp(&r.reported_at),
                    "comment": r.comment,
                    "categories": r.categories,
                    "reporterId": r.reporter_id,
                    "reporterCountryCode": null,
                    "reporterCountryName": null,
                })
            })
            .collect();
        data["countryName"] = Value::Null;
        data["reports"] = Value::Array(reports);
    }

    Ok(Json(json!({ "data": data })))
}

/// First and last usable host of `net` and how many there are, saturated to
/// `u64`. IPv4 blocks larger than a /31 exclude the network and broadcast
/// addresses.
pub fn host_range(net: &IpNet) -> (IpAddr, IpAddr, u64) {
    match net {
        IpNet::V4(v4) => {
            let (network, broadcast) = (u32::from(v4.network()), u32::from(v4.broadcast()));
            let (first, last) = if v4.prefix_len() >= 31 {
                (network, broadcast)
            } else {
                (network + 1, broadcast - 1)
            };
            (
                IpAddr::V4(Ipv4Addr::from(first)),
                IpAddr::V4(Ipv4Addr::from(last)),
                u64::from(last - first) + 1,
            )
        }
        IpNet::V6(v6) => {
            let span = 1u128
                .checked_shl(u32::from(v6.max_prefix_len() - v6.prefix_len()))
                .and_then(|n| u64::try_from(n).ok())
                .unwrap_or(u64::MAX);
            (IpAddr::V6(v6.network()), IpAddr::V6(v6.broadcast()), span)
        }
    }
}

fn address_space_desc(net: &IpNet) -> &'static str {
    match net.network() {
        IpAddr::V4(a) if a.is_loopback() => "Loopback",
        IpAddr::V4(a) if a.is_private() => "Private Use",
        IpAddr::V6(a) if a.is_loopback() => "Loopback",
        IpAddr::V6(a) if a.segments()[0] & 0xfe00 == 0xfc00 => "Unique Local",
        _ => "Internet",
    }
}

async fn check_block(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let raw = params
        .get("network")
        .ok_or_else(|| ApiError::unprocessable("The network field is required."))?;
    let block = raw
        .parse::<IpNet>()
        .map_err(|_| ApiError::unprocessable("The network must be a valid subnet in CIDR notation."))?
        .trunc();
    let max_age = parse_max_age(&params)?;
    let since = Utc::now() - Duration::days(max_age);

    let store = db.reports.read().await;
    let mut by_ip: BTreeMap<IpAddr, Vec<&StoredReport>> = BTreeMap::new();
    for r in store.iter().filter(|r| block.contains(&r.ip) && r.reported_at >= since) {
        by_ip.entry(r.ip).or_default().push(r);
    }

    let reported: Vec<Value> = by_ip
        .iter()
        .map(|(ip, reports)| {
            let most_recent = reports.iter().map(|r| r.reported_at).max().unwrap_or_else(Utc::now);
            json!({
                "ipAddress": ip.to_string(),
                "numReports": reports.len(),
                "mostRecentReport": timestamp(&most_recent),
                "abuseConfidenceScore": confidence(reports.len()),
                "countryCode": null,
            })
        })
        .collect();

    let (min_address, max_address, num_possible_hosts) = host_range(&block);
    Ok(Json(json!({
        "data": {
            "networkAddress": block.network().to_string(),
            "netmask": block.netmask().to_string(),
            "minAddress": min_address.to_string(),
            "maxAddress": max_address.to_string(),
            "numPossibleHosts": num_possible_hosts,
            "addressSpaceDesc": address_space_desc(&block),
            "reportedAddress": reported,
        }
    })))
}

async fn report(
    State(db): State<Db>,
    Form(fields): Form<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let ip = parse_ip(fields.get("ip"))?;
    let categories = parse_categories(fields.get("categories").map(String::as_str).unwrap_or_default())
        .map_err(ApiError::unprocessable)?;
    let comment = fields.get("comment").filter(|c| !c.is_empty()).cloned();

    let mut store = db.reports.write().await;
    store.push(StoredReport {
        ip,
        categories,
        comment,
        reported_at: Utc::now(),
        reporter_id: REPORTER_ID,
    });
    let total = store.iter().filter(|r| r.ip == ip).count();
    debug!(%ip, total, "stored report");

    Ok(Json(json!({
        "data": { "ipAddress": ip.to_string(), "abuseConfidenceScore": confidence(total) }
    })))
}

/// Split one CSV line, honouring double-quoted fields and `""` escapes.
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            other => current.push(other),
        }
    }
    fields.push(current);
    fields
}

fn parse_bulk_row(line: &str) -> Result<StoredReport, String> {
    let fields = split_csv_line(line);
    if fields.len() < 3 {
        return Err("Row must have IP, Categories and ReportDate columns.".to_string());
    }
    let ip: IpAddr = fields[0]
        .trim()
        .parse()
        .map_err(|_| "The ip address must be a valid IPv4 or IPv6 address.".to_string())?;
    let categories = parse_categories(&fields[1])?;
    let reported_at = DateTime::parse_from_rfc3339(fields[2].trim())
        .map_err(|_| "The report date must be a valid ISO 8601 date.".to_string())?
        .with_timezone(&Utc);
    let comment = fields.get(3).filter(|c| !c.is_empty()).cloned();

    Ok(StoredReport {
        ip,
        categories,
        comment,
        reported_at,
        reporter_id: REPORTER_ID,
    })
}

async fn bulk_report(State(db): State<Db>, mut multipart: Multipart) -> Result<Json<Value>, ApiError> {
    let mut csv = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.body_text()))?
    {
        if field.name() == Some("csv") {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::new(StatusCode::BAD_REQUEST, e.body_text()))?;
            csv = Some(text);
        }
    }
    let csv = csv.ok_or_else(|| ApiError::unprocessable("The csv field is required."))?;

    let mut saved = Vec::new();
    let mut invalid = Vec::new();
    // Row 1 is the header.
    for (index, line) in csv.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        match parse_bulk_row(line) {
            Ok(report) => saved.push(report),
            Err(error) => invalid.push(json!({
                "error": error,
                "input": split_csv_line(line).first().cloned().unwrap_or_default(),
                "rowNumber": index + 1,
            })),
        }
    }

    let saved_reports = saved.len();
    db.reports.write().await.extend(saved);
    debug!(saved_reports, invalid = invalid.len(), "processed bulk report");

    Ok(Json(json!({
        "data": { "savedReports": saved_reports, "invalidReports": invalid }
    })))
}

async fn blacklist(
    State(db): State<Db>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, ApiError> {
    let limit = match params.get("limit") {
        Some(raw) => raw.parse::<usize>().unwrap_or(0),
        None => 10_000,
    };
    if limit < 1 {
        return Err(ApiError::unprocessable("The limit must be at least 1."));
    }
    let minimum = match params.get("confidenceMinimum") {
        Some(raw) => raw.parse::<u8>().unwrap_or(0),
        None => 100,
    };
    if !(25..=100).contains(&minimum) {
        return Err(ApiError::unprocessable(
            "The confidence minimum must be between 25 and 100.",
        ));
    }

    let store = db.reports.read().await;
    let mut by_ip: HashMap<IpAddr, (usize, DateTime<Utc>)> = HashMap::new();
    for r in store.iter() {
        let entry = by_ip.entry(r.ip).or_insert((0, r.reported_at));
        entry.0 += 1;
        entry.1 = entry.1.max(r.reported_at);
    }

    let mut entries: Vec<(IpAddr, u8, DateTime<Utc>)> = by_ip
        .into_iter()
        .map(|(ip, (count, last))| (ip, confidence(count), last))
        .filter(|(_, score, _)| *score >= minimum)
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)).then(a.0.cmp(&b.0)));
    entries.truncate(limit);

    let data: Vec<Value> = entries
        .iter()
        .map(|(ip, score, last)| {
            json!({
                "ipAddress": ip.to_string(),
                "abuseConfidenceScore": score,
                "lastReportedAt": timestamp(last),
            })
        })
        .collect();

    Ok(Json(json!({
        "meta": { "generatedAt": timestamp(&Utc::now()) },
        "data": data,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_grows_with_reports_and_caps_at_100() {
        assert_eq!(confidence(0), 0);
        assert_eq!(confidence(1), 25);
        assert_eq!(confidence(3), 75);
        assert_eq!(confidence(10), 100);
    }

    fn net(raw: &str) -> IpNet {
        raw.parse::<IpNet>().unwrap().trunc()
    }

    #[test]
    fn host_range_for_slash_24() {
        let block = net("1.1.1.77/24");
        assert_eq!(block.network(), "1.1.1.0".parse::<IpAddr>().unwrap());
        assert_eq!(block.netmask(), "255.255.255.0".parse::<IpAddr>().unwrap());
        assert_eq!(
            host_range(&block),
            ("1.1.1.1".parse().unwrap(), "1.1.1.254".parse().unwrap(), 254)
        );
        assert!(block.contains(&"1.1.1.200".parse::<IpAddr>().unwrap()));
        assert!(!block.contains(&"1.1.2.1".parse::<IpAddr>().unwrap()));
    }

    #[test]
    fn host_range_ipv4_edges() {
        assert_eq!(host_range(&net("10.0.0.1/32")).2, 1);
        assert_eq!(host_range(&net("10.0.0.0/31")).2, 2);
        assert_eq!(host_range(&net("0.0.0.0/0")).2, (1u64 << 32) - 2);
        assert!("10.0.0.0/33".parse::<IpNet>().is_err());
        assert!("10.0.0.0".parse::<IpNet>().is_err());
    }

    #[test]
    fn host_range_ipv6() {
        assert_eq!(
            host_range(&net("::1/128")),
            ("::1".parse().unwrap(), "::1".parse().unwrap(), 1)
        );

        let (first, last, count) = host_range(&net("2001:db8::/120"));
        assert_eq!(first, "2001:db8::".parse::<IpAddr>().unwrap());
        assert_eq!(last, "2001:db8::ff".parse::<IpAddr>().unwrap());
        assert_eq!(count, 256);

        assert_eq!(host_range(&net("2001:db8::/64")).2, u64::MAX);
        assert_eq!(host_range(&net("::/0")).2, u64::MAX);
    }

    #[test]
    fn address_space_descriptions() {
        assert_eq!(address_space_desc(&net("127.0.0.0/8")), "Loopback");
        assert_eq!(address_space_desc(&net("192.168.1.0/24")), "Private Use");
        assert_eq!(address_space_desc(&net("::1/128")), "Loopback");
        assert_eq!(address_space_desc(&net("fd00::/8")), "Unique Local");
        assert_eq!(address_space_desc(&net("2001:db8::/64")), "Internet");
    }

    #[test]
    fn csv_line_splitting_respects_quotes() {
        assert_eq!(
            split_csv_line(r#"1.2.3.4,"18,22",2024-01-01T00:00:00+00:00,"said ""hi""""#),
            vec!["1.2.3.4", "18,22", "2024-01-01T00:00:00+00:00", r#"said "hi""#]
        );
        assert_eq!(split_csv_line("a,,b"), vec!["a", "", "b"]);
    }

    #[test]
    fn categories_parse_and_validate() {
        assert_eq!(parse_categories("18, 22"), Ok(vec![18, 22]));
        assert!(parse_categories("").is_err());
        assert!(parse_categories("0").is_err());
        assert!(parse_categories("24").is_err());
        assert!(parse_categories("ssh").is_err());
    }

    #[test]
    fn bulk_row_requires_valid_date() {
        assert!(parse_bulk_row("1.2.3.4,18,yesterday").is_err());
        let report = parse_bulk_row("1.2.3.4,18,2024-01-15T10:15:30+00:00,note").unwrap();
        assert_eq!(report.categories, vec![18]);
        assert_eq!(report.comment.as_deref(), Some("note"));
    }

    #[test]
    fn private_addresses_are_not_public() {
        assert!(!is_public(&"10.1.2.3".parse().unwrap()));
        assert!(!is_public(&"127.0.0.1".parse().unwrap()));
        assert!(!is_public(&"::1".parse().unwrap()));
        assert!(is_public(&"1.1.1.1".parse().unwrap()));
    }
}
