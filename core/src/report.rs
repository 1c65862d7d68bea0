//! `POST /report` and `POST /bulk-report`.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use ureq::unversioned::multipart::{Form, Part};

use crate::category::{build_category_string, Category};
use crate::client::{decode, Client};
use crate::encode::encode_form;
use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, RequestOptions};
use crate::types::{BulkReportResponse, ReportResponse};

/// Optional parameters for `Client::report`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Free-form evidence such as log lines, timestamps or packet samples.
    /// Not sent when empty.
    pub comment: String,
}

impl ReportOptions {
    pub fn comment(mut self, content: impl Into<String>) -> Self {
        self.comment = content.into();
        self
    }
}

impl Client {
    pub fn build_report(
        &self,
        ip: &str,
        categories: &[Category],
        options: &ReportOptions,
    ) -> Result<HttpRequest> {
        let categories = build_category_string(categories);
        let mut fields = vec![("ip", ip), ("categories", categories.as_str())];
        if !options.comment.is_empty() {
            fields.push(("comment", options.comment.as_str()));
        }

        let request = RequestOptions::new()
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(encode_form(fields));

        Ok(self.build_request(HttpMethod::Post, "/report", request))
    }

    /// Report `ip` for abuse under the given categories.
    pub fn report(
        &self,
        ip: &str,
        categories: &[Category],
        options: &ReportOptions,
    ) -> Result<ReportResponse> {
        let request = self.build_report(ip, categories, options)?;
        decode(self.send(request)?)
    }

    /// Read `csv_path` into a multipart upload. The file is closed before this
    /// returns.
    pub fn build_bulk_report(&self, csv_path: &Path) -> Result<HttpRequest> {
        let filename = csv_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} has no file name", csv_path.display()),
                )
            })?;

        let mut body = Vec::new();
        let content_type = {
            let mut file = File::open(csv_path)?;
            let part = Part::reader(&mut file)
                .file_name(&filename)
                .mime_str("application/octet-stream")?;
            let mut form = Form::new().part("csv", part);
            let content_type = format!("multipart/form-data; boundary={}", form.boundary());
            form.read_to_end(&mut body)?;
            content_type
        };

        let request = RequestOptions::new()
            .header("Content-Type", content_type)
            .body(body);

        Ok(self.build_request(HttpMethod::Post, "/bulk-report", request))
    }

    /// Submit many reports at once from a CSV file in the AbuseIPDB bulk
    /// format (`IP,Categories,ReportDate,Comment`).
    pub fn bulk_report(&self, csv_path: impl AsRef<Path>) -> Result<BulkReportResponse> {
        let request = self.build_bulk_report(csv_path.as_ref())?;
        decode(self.send(request)?)
    }
}
