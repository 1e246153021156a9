use super::FemsqApi;
use crate::error::Result;
use crate::transport::ApiRequest;
use crate::types::{InvestmentProgramLookupDto, PlanGroupLookupDto, StNetworkLookupDto};

impl FemsqApi {
    pub async fn investment_programs(&self) -> Result<Vec<InvestmentProgramLookupDto>> {
        self.send_json(ApiRequest::get("v1/lookups/investment-programs"))
            .await
    }

    pub async fn plan_groups(&self) -> Result<Vec<PlanGroupLookupDto>> {
        self.send_json(ApiRequest::get("v1/lookups/plan-groups")).await
    }

    pub async fn st_networks(&self) -> Result<Vec<StNetworkLookupDto>> {
        self.send_json(ApiRequest::get("v1/lookups/st-networks")).await
    }
}
