use serde_json::Value;
use std::collections::BTreeMap;
use tracing::info;

use super::{json_body, FemsqApi};
use crate::error::Result;
use crate::transport::{ApiRequest, Query};
use crate::types::{ParameterOption, ReportGenerationRequest, ReportInfo, ReportMetadata, ReportParameter};

const REPORTS: &str = "v1/reports";

impl FemsqApi {
    /// Catalog, optionally narrowed by category and tag.
    pub async fn available_reports(
        &self,
        category: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Vec<ReportInfo>> {
        let query = Query::new()
            .with_opt("category", category)
            .with_opt("tag", tag);
        self.send_json(ApiRequest::get(format!("{}/available", REPORTS)).with_query(query))
            .await
    }

    pub async fn report_metadata(&self, report_id: &str) -> Result<ReportMetadata> {
        self.send_json(ApiRequest::get(format!("{}/{}/metadata", REPORTS, report_id)))
            .await
    }

    /// Parameter definitions, resolved against the caller's context.
    pub async fn report_parameters(
        &self,
        report_id: &str,
        context: &BTreeMap<String, String>,
    ) -> Result<Vec<ReportParameter>> {
        let request = ApiRequest::get(format!("{}/{}/parameters", REPORTS, report_id))
            .with_query(Query::from(context));
        self.send_json(request).await
    }

    pub async fn report_categories(&self) -> Result<Vec<String>> {
        self.send_json(ApiRequest::get(format!("{}/categories", REPORTS)))
            .await
    }

    pub async fn report_tags(&self) -> Result<Vec<String>> {
        self.send_json(ApiRequest::get(format!("{}/tags", REPORTS)))
            .await
    }

    /// Options of a parameter backed by a remote source.
    pub async fn parameter_source_options(
        &self,
        report_id: &str,
        parameter: &str,
    ) -> Result<Vec<ParameterOption>> {
        self.send_json(ApiRequest::get(format!(
            "{}/parameters/source/{}/{}",
            REPORTS, report_id, parameter
        )))
        .await
    }

    /// Render a report; returns the document bytes.
    pub async fn generate_report(&self, request: &ReportGenerationRequest) -> Result<Vec<u8>> {
        let path = format!("{}/{}/generate", REPORTS, request.report_id);
        let body = json_body(&path, request)?;
        info!(report_id = %request.report_id, format = ?request.format, "Generating report");
        self.send_bytes(ApiRequest::post(path, body)).await
    }

    /// Render the first page of a report as PDF.
    pub async fn generate_preview(
        &self,
        report_id: &str,
        parameters: &BTreeMap<String, Value>,
    ) -> Result<Vec<u8>> {
        let path = format!("{}/{}/preview", REPORTS, report_id);
        let body = json_body(&path, parameters)?;
        self.send_bytes(ApiRequest::post(path, body)).await
    }
}
