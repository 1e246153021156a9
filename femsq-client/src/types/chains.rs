use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Investment-program chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct IpgChainDto {
    pub chain_key: i64,
    pub name: String,
    #[serde(default)]
    pub st_net_key: Option<i64>,
    #[serde(default)]
    pub st_net_name: Option<String>,
    #[serde(default)]
    pub latest_ipg_key: Option<i64>,
    #[serde(default)]
    pub year: Option<i32>,
}

/// Link between a chain and an investment program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct IpgChainRelationDto {
    pub relation_key: i64,
    pub chain_key: i64,
    pub investment_program_key: i64,
    #[serde(default)]
    pub investment_program_name: Option<String>,
    #[serde(default)]
    pub plan_group_key: Option<i64>,
    #[serde(default)]
    pub plan_group_name: Option<String>,
}
