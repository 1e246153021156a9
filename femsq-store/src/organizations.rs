//! Organizations with their agents.

use async_trait::async_trait;
use femsq_client::{AgentDto, FemsqApi, OrganizationDto, Page, Query, Result as ApiResult};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::paged::{PagedSource, PagedStore};

/// Organization row as shown in the list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub og_key: i64,
    pub og_name: String,
    pub og_full_name: Option<String>,
    pub og_official_name: Option<String>,
    pub og_description: Option<String>,
    /// Registry numbers kept as text for display
    pub inn: Option<String>,
    pub kpp: Option<String>,
    pub ogrn: Option<String>,
    pub okpo: Option<String>,
    pub oe: Option<i64>,
    pub registration_tax_type: Option<String>,
    /// Agents counted when they were last loaded
    pub og_ag_count: usize,
}

impl From<OrganizationDto> for Organization {
    fn from(dto: OrganizationDto) -> Self {
        Self {
            og_key: dto.og_key,
            og_name: dto.og_name,
            og_full_name: dto.og_full_name,
            og_official_name: dto.og_official_name,
            og_description: dto.og_description,
            inn: dto.inn.map(|n| n.to_string()),
            kpp: dto.kpp.map(|n| n.to_string()),
            ogrn: dto.ogrn.map(|n| n.to_string()),
            okpo: dto.okpo.map(|n| n.to_string()),
            oe: dto.oe,
            registration_tax_type: dto.registration_tax_type,
            og_ag_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub og_ag_key: i64,
    pub code: String,
    pub organization_key: i64,
    pub legacy_oid: Option<String>,
}

impl From<AgentDto> for Agent {
    fn from(dto: AgentDto) -> Self {
        Self {
            og_ag_key: dto.og_ag_key,
            code: dto.code.unwrap_or_default(),
            organization_key: dto.organization_key,
            legacy_oid: dto.legacy_oid,
        }
    }
}

/// `v1/organizations` list with agents as dependents
#[derive(Debug, Clone, Default)]
pub struct OrganizationsSource;

pub const NAME_FILTER: &str = "ogName";

#[async_trait]
impl PagedSource for OrganizationsSource {
    type Item = Organization;
    type Dependent = Agent;
    type Key = i64;

    const NAME: &'static str = "organizations";
    const DEFAULT_SORT: &'static str = "ogName,asc";
    const FILTERS: &'static [&'static str] = &[NAME_FILTER];

    fn key(item: &Organization) -> i64 {
        item.og_key
    }

    /// The backend sorts on `ogNm`.
    fn wire_sort(sort: &str) -> String {
        match sort.strip_prefix("ogName") {
            Some(rest) => format!("ogNm{}", rest),
            None => sort.to_string(),
        }
    }

    fn record_dependents(item: &mut Organization, agents: &[Agent]) {
        item.og_ag_count = agents.len();
    }

    async fn fetch_page(&self, api: &FemsqApi, query: Query) -> ApiResult<Page<Organization>> {
        let page = api.list_organizations(query).await?;
        Ok(page.map(Organization::from))
    }

    async fn fetch_dependents(&self, api: &FemsqApi, og_key: i64) -> ApiResult<Vec<Agent>> {
        let agents = api.organization_agents(og_key).await?;
        Ok(agents.into_iter().map(Agent::from).collect())
    }
}

pub type OrganizationsStore = PagedStore<OrganizationsSource>;

impl PagedStore<OrganizationsSource> {
    pub async fn fetch_organizations(&self, keep_selection: bool) -> StoreResult<()> {
        self.fetch_list(keep_selection).await
    }

    pub async fn fetch_agents_for(&self, og_key: i64, force: bool) {
        self.fetch_dependents(og_key, force).await
    }

    pub async fn select_organization(&self, og_key: i64) {
        self.select_entity(og_key).await
    }

    pub async fn update_name_filter(&self, value: impl Into<String>) -> StoreResult<()> {
        self.update_filter(NAME_FILTER, value.into()).await
    }

    pub async fn organizations(&self) -> Vec<Organization> {
        self.items().await
    }

    pub async fn selected_organization(&self) -> Option<Organization> {
        self.selected().await
    }

    pub async fn agents(&self) -> Vec<Agent> {
        self.dependents().await
    }
}
