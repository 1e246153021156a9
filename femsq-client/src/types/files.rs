use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Audit directory (`ra_dir`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct DirectoryDto {
    pub key: i64,
    pub dir_name: String,
    /// Filesystem path
    pub dir: String,
    #[serde(default, alias = "dirCreated")]
    pub created: Option<String>,
    #[serde(default, alias = "dirUpdated")]
    pub updated: Option<String>,
}

/// File under review (`ra_f`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct FileDto {
    pub af_key: i64,
    pub af_name: String,
    pub af_dir: i64,
    pub af_type: i64,
    pub af_execute: bool,
    /// Read data from the spreadsheet (true) or from the staging table (false)
    #[serde(default)]
    pub af_source: Option<bool>,
    #[serde(default)]
    pub af_created: Option<String>,
    #[serde(default)]
    pub af_updated: Option<String>,
    /// Sender organization key
    #[serde(default)]
    pub ra_org_sender: Option<i64>,
    /// Display order
    #[serde(default)]
    pub af_num: Option<i64>,
}

/// Body of file create and update requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct FileRequest {
    pub af_name: String,
    pub af_dir: i64,
    pub af_type: i64,
    pub af_execute: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub af_source: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ra_org_sender: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub af_num: Option<i64>,
}

/// File type (`ra_ft`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct FileTypeDto {
    pub ft_key: i64,
    pub ft_name: String,
}
