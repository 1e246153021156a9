//! Investment-program chains with their relations.

use async_trait::async_trait;
use femsq_client::{FemsqApi, IpgChainDto, IpgChainRelationDto, Page, Query, Result as ApiResult};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;
use crate::paged::{PagedSource, PagedStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentChain {
    pub chain_key: i64,
    pub name: String,
    pub st_net_key: Option<i64>,
    pub st_net_name: Option<String>,
    pub latest_ipg_key: Option<i64>,
    pub year: Option<i32>,
    pub relations_count: usize,
}

impl From<IpgChainDto> for InvestmentChain {
    fn from(dto: IpgChainDto) -> Self {
        Self {
            chain_key: dto.chain_key,
            name: dto.name,
            st_net_key: dto.st_net_key,
            st_net_name: dto.st_net_name,
            latest_ipg_key: dto.latest_ipg_key,
            year: dto.year,
            relations_count: 0,
        }
    }
}

pub type InvestmentChainRelation = IpgChainRelationDto;

pub const NAME_FILTER: &str = "name";
pub const YEAR_FILTER: &str = "year";

/// `v1/ipg-chains` list with relations as dependents
#[derive(Debug, Clone, Default)]
pub struct InvestmentChainsSource;

#[async_trait]
impl PagedSource for InvestmentChainsSource {
    type Item = InvestmentChain;
    type Dependent = InvestmentChainRelation;
    type Key = i64;

    const NAME: &'static str = "investment-chains";
    const DEFAULT_SORT: &'static str = "ipgcKey,asc";
    const FILTERS: &'static [&'static str] = &[NAME_FILTER, YEAR_FILTER];

    fn key(item: &InvestmentChain) -> i64 {
        item.chain_key
    }

    fn wire_sort(sort: &str) -> String {
        if let Some(rest) = sort.strip_prefix("name") {
            format!("ipgcName{}", rest)
        } else if let Some(rest) = sort.strip_prefix("chainKey") {
            format!("ipgcKey{}", rest)
        } else {
            sort.to_string()
        }
    }

    fn record_dependents(item: &mut InvestmentChain, relations: &[InvestmentChainRelation]) {
        item.relations_count = relations.len();
    }

    async fn fetch_page(&self, api: &FemsqApi, query: Query) -> ApiResult<Page<InvestmentChain>> {
        let page = api.list_ipg_chains(query).await?;
        Ok(page.map(InvestmentChain::from))
    }

    async fn fetch_dependents(
        &self,
        api: &FemsqApi,
        chain_key: i64,
    ) -> ApiResult<Vec<InvestmentChainRelation>> {
        api.ipg_chain_relations(chain_key).await
    }
}

pub type InvestmentChainsStore = PagedStore<InvestmentChainsSource>;

impl PagedStore<InvestmentChainsSource> {
    pub async fn fetch_chains(&self, keep_selection: bool) -> StoreResult<()> {
        self.fetch_list(keep_selection).await
    }

    pub async fn fetch_relations_for(&self, chain_key: i64, force: bool) {
        self.fetch_dependents(chain_key, force).await
    }

    pub async fn select_chain(&self, chain_key: i64) {
        self.select_entity(chain_key).await
    }

    pub async fn update_name_filter(&self, value: impl Into<String>) -> StoreResult<()> {
        self.update_filter(NAME_FILTER, value.into()).await
    }

    pub async fn update_year_filter(&self, year: Option<i32>) -> StoreResult<()> {
        self.update_filter(YEAR_FILTER, year).await
    }

    pub async fn chains(&self) -> Vec<InvestmentChain> {
        self.items().await
    }

    pub async fn selected_chain(&self) -> Option<InvestmentChain> {
        self.selected().await
    }

    pub async fn relations(&self) -> Vec<InvestmentChainRelation> {
        self.dependents().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_sort_fields() {
        assert_eq!(InvestmentChainsSource::wire_sort("name,desc"), "ipgcName,desc");
        assert_eq!(InvestmentChainsSource::wire_sort("chainKey,asc"), "ipgcKey,asc");
        assert_eq!(InvestmentChainsSource::wire_sort("ipgcKey,asc"), "ipgcKey,asc");
        assert_eq!(InvestmentChainsSource::wire_sort("year,asc"), "year,asc");
    }
}
