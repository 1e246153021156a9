use super::{json_body, FemsqApi};
use crate::error::Result;
use crate::transport::ApiRequest;
use crate::types::{AuditDto, AuditRequest, AuditTypeDto, DirectoryDto};

const AUDITS: &str = "ra/audits";

impl FemsqApi {
    pub async fn list_audits(&self) -> Result<Vec<AuditDto>> {
        self.send_json(ApiRequest::get(AUDITS)).await
    }

    pub async fn get_audit(&self, id: i64) -> Result<AuditDto> {
        self.send_json(ApiRequest::get(format!("{}/{}", AUDITS, id)))
            .await
    }

    pub async fn create_audit(&self, request: &AuditRequest) -> Result<AuditDto> {
        let body = json_body(AUDITS, request)?;
        self.send_json(ApiRequest::post(AUDITS, body)).await
    }

    pub async fn update_audit(&self, id: i64, request: &AuditRequest) -> Result<AuditDto> {
        let path = format!("{}/{}", AUDITS, id);
        let body = json_body(&path, request)?;
        self.send_json(ApiRequest::put(path, body)).await
    }

    pub async fn delete_audit(&self, id: i64) -> Result<()> {
        self.send_unit(ApiRequest::delete(format!("{}/{}", AUDITS, id)))
            .await
    }

    /// Directory an audit works on.
    pub async fn audit_directory(&self, audit_id: i64) -> Result<DirectoryDto> {
        self.send_json(ApiRequest::get(format!("{}/{}/directory", AUDITS, audit_id)))
            .await
    }

    pub async fn audit_types(&self) -> Result<Vec<AuditTypeDto>> {
        self.send_json(ApiRequest::get("ra/audit-types")).await
    }
}
