use serde::{Deserialize, Serialize};

#[cfg(feature = "typescript")]
use ts_rs::TS;

/// Organization record (`og`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct OrganizationDto {
    pub og_key: i64,
    pub og_name: String,
    #[serde(default)]
    pub og_official_name: Option<String>,
    #[serde(default)]
    pub og_full_name: Option<String>,
    #[serde(default)]
    pub og_description: Option<String>,
    #[serde(default)]
    pub inn: Option<i64>,
    #[serde(default)]
    pub kpp: Option<i64>,
    #[serde(default)]
    pub ogrn: Option<i64>,
    #[serde(default)]
    pub okpo: Option<i64>,
    /// Economic sector code
    #[serde(default)]
    pub oe: Option<i64>,
    #[serde(default)]
    pub registration_tax_type: Option<String>,
}

/// Agent organization attached to an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct AgentDto {
    pub og_ag_key: i64,
    #[serde(default)]
    pub code: Option<String>,
    pub organization_key: i64,
    #[serde(default)]
    pub legacy_oid: Option<String>,
}

/// Organization reduced to key and display name, for select controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "typescript", derive(TS))]
#[cfg_attr(feature = "typescript", ts(export))]
#[serde(rename_all = "camelCase")]
pub struct OrganizationLookup {
    pub og_key: i64,
    pub og_nm: String,
}

impl From<OrganizationDto> for OrganizationLookup {
    fn from(dto: OrganizationDto) -> Self {
        Self {
            og_key: dto.og_key,
            og_nm: dto.og_name,
        }
    }
}
