use super::FemsqApi;
use crate::error::Result;
use crate::page::Page;
use crate::transport::{ApiRequest, Query};
use crate::types::{IpgChainDto, IpgChainRelationDto};

impl FemsqApi {
    /// `GET v1/ipg-chains` with `name`, `year`, `page`, `size`, `sort`.
    pub async fn list_ipg_chains(&self, query: Query) -> Result<Page<IpgChainDto>> {
        self.send_list(ApiRequest::get("v1/ipg-chains").with_query(query))
            .await
    }

    pub async fn ipg_chain_relations(&self, chain_key: i64) -> Result<Vec<IpgChainRelationDto>> {
        let page: Page<IpgChainRelationDto> = self
            .send_list(ApiRequest::get(format!("v1/ipg-chains/{}/relations", chain_key)))
            .await?;
        Ok(page.content)
    }
}
