//! Composition root.

use femsq_client::{ClientConfig, ConfigError, FemsqApi, Transport};
use std::sync::Arc;
use tracing::info;

use crate::audits::AuditsStore;
use crate::connection::ConnectionStore;
use crate::directories::DirectoriesStore;
use crate::files::FilesStore;
use crate::investment_chains::InvestmentChainsStore;
use crate::lookups::{
    AuditTypesStore, InvestmentProgramsStore, LookupsStore, PlanGroupsStore, StNetworksStore,
};
use crate::organizations::OrganizationsStore;
use crate::reports::ReportsStore;

/// Every store of the application over one shared API client
pub struct FemsqApp {
    pub api: Arc<FemsqApi>,
    pub organizations: OrganizationsStore,
    pub investment_chains: InvestmentChainsStore,
    pub audits: AuditsStore,
    pub directories: DirectoriesStore,
    pub files: FilesStore,
    pub lookups: LookupsStore,
    pub investment_programs: InvestmentProgramsStore,
    pub plan_groups: PlanGroupsStore,
    pub st_networks: StNetworksStore,
    pub audit_types: AuditTypesStore,
    pub reports: ReportsStore,
    pub connection: ConnectionStore,
}

impl FemsqApp {
    /// Build over a reqwest client for `config`.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let api = FemsqApi::from_config(config)?;
        Ok(Self::with_api(Arc::new(api)))
    }

    /// Build from `FEMSQ_API_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(ClientConfig::from_env())
    }

    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::with_api(Arc::new(FemsqApi::new(transport)))
    }

    pub fn with_api(api: Arc<FemsqApi>) -> Self {
        info!("Creating FEMSQ stores");
        Self {
            organizations: OrganizationsStore::new(api.clone()),
            investment_chains: InvestmentChainsStore::new(api.clone()),
            audits: AuditsStore::new(api.clone()),
            directories: DirectoriesStore::new(api.clone()),
            files: FilesStore::new(api.clone()),
            lookups: LookupsStore::new(api.clone()),
            investment_programs: InvestmentProgramsStore::new(api.clone()),
            plan_groups: PlanGroupsStore::new(api.clone()),
            st_networks: StNetworksStore::new(api.clone()),
            audit_types: AuditTypesStore::new(api.clone()),
            reports: ReportsStore::new(api.clone()),
            connection: ConnectionStore::new(api.clone()),
            api,
        }
    }

    /// Drop all loaded data, for example after switching databases.
    ///
    /// The saved connection form survives.
    pub async fn reset_all(&self) {
        tokio::join!(
            self.organizations.reset(),
            self.investment_chains.reset(),
            self.audits.reset(),
            self.directories.clear(),
            self.files.clear(),
            self.lookups.clear_all(),
            self.investment_programs.reset(),
            self.plan_groups.reset(),
            self.st_networks.reset(),
            self.audit_types.reset(),
            self.reports.reset(),
            self.connection.reset_connection(),
        );
        info!("All stores reset");
    }
}
