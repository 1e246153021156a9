use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Audit ("revision") record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct AuditDto {
    pub adt_key: i64,
    pub adt_name: String,
    #[serde(default)]
    pub adt_date: Option<String>,
    #[serde(default)]
    pub adt_results: Option<String>,
    /// Directory key
    pub adt_dir: i64,
    /// Audit type key
    pub adt_type: i64,
    #[serde(rename = "adtAddRA")]
    pub adt_add_ra: bool,
    #[serde(default)]
    pub adt_created: Option<String>,
    #[serde(default)]
    pub adt_updated: Option<String>,
}

/// Body of audit create and update requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct AuditRequest {
    pub adt_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adt_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adt_results: Option<String>,
    pub adt_dir: i64,
    pub adt_type: i64,
    #[serde(rename = "adtAddRA")]
    pub adt_add_ra: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct AuditTypeDto {
    pub at_key: i64,
    pub at_name: String,
    #[serde(default)]
    pub at_created: Option<String>,
    #[serde(default)]
    pub at_updated: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_ra_flag_keeps_wire_casing() {
        let audit: AuditDto = serde_json::from_value(json!({
            "adtKey": 3,
            "adtName": "Q1",
            "adtDir": 1,
            "adtType": 2,
            "adtAddRA": true
        }))
        .unwrap();
        assert!(audit.adt_add_ra);

        let body = serde_json::to_value(AuditRequest {
            adt_name: "Q1".into(),
            adt_date: None,
            adt_results: None,
            adt_dir: 1,
            adt_type: 2,
            adt_add_ra: false,
        })
        .unwrap();
        assert_eq!(body["adtAddRA"], json!(false));
        assert!(body.get("adtDate").is_none());
    }
}
