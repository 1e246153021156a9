use tracing::debug;

use super::FemsqApi;
use crate::error::Result;
use crate::page::Page;
use crate::transport::{ApiRequest, Query};
use crate::types::{AgentDto, OrganizationDto, OrganizationLookup};

impl FemsqApi {
    /// `GET v1/organizations` with `ogName`, `page`, `size`, `sort`.
    pub async fn list_organizations(&self, query: Query) -> Result<Page<OrganizationDto>> {
        debug!(params = query.len(), "Listing organizations");
        self.send_list(ApiRequest::get("v1/organizations").with_query(query))
            .await
    }

    /// Agents of one organization.
    pub async fn organization_agents(&self, og_key: i64) -> Result<Vec<AgentDto>> {
        let page: Page<AgentDto> = self
            .send_list(ApiRequest::get(format!("v1/organizations/{}/agents", og_key)))
            .await?;
        Ok(page.content)
    }

    /// Every organization, unpaged (`og`).
    pub async fn list_og(&self) -> Result<Vec<OrganizationDto>> {
        self.send_json(ApiRequest::get("og")).await
    }

    pub async fn get_og(&self, og_key: i64) -> Result<OrganizationDto> {
        self.send_json(ApiRequest::get(format!("og/{}", og_key))).await
    }

    /// Organizations reduced to key and name.
    pub async fn organization_lookups(&self) -> Result<Vec<OrganizationLookup>> {
        let organizations = self.list_og().await?;
        Ok(organizations.into_iter().map(OrganizationLookup::from).collect())
    }
}
