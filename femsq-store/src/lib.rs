//! FEMSQ presentation-state stores
//!
//! State for the FEMSQ front end, kept as plain structs behind
//! `tokio::sync::RwLock` and fed by [`femsq_client::FemsqApi`].
//!
//! - [`PagedStore`]: paginated master-detail lists (organizations with
//!   agents, investment chains with relations)
//! - entity stores for audits, directories and files
//! - lookup stores for select controls
//! - [`ReportsStore`] and the [`context`] resolver for report parameters
//! - [`ConnectionStore`] for the database connection and view gating
//!
//! Every store broadcasts [`StoreEvent`]s on change. [`FemsqApp`] builds all
//! of them over one shared client.
//!
//! # Example
//!
//! ```rust,no_run
//! use femsq_client::ClientConfig;
//! use femsq_store::FemsqApp;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = FemsqApp::new(ClientConfig::default())?;
//!
//! app.organizations.fetch_organizations(false).await?;
//! for org in app.organizations.organizations().await {
//!     println!("{} ({} agents)", org.og_name, org.og_ag_count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod audits;
pub mod connection;
pub mod context;
pub mod directories;
pub mod error;
pub mod events;
pub mod files;
pub mod investment_chains;
pub mod lookups;
pub mod organizations;
pub mod paged;
pub mod reports;

pub use app::FemsqApp;
pub use audits::{AuditsState, AuditsStore};
pub use connection::{
    ActiveView, ConnectionForm, ConnectionState, ConnectionStatus, ConnectionStore, StatusTone,
    StatusUpdate,
};
pub use directories::{DirectoriesState, DirectoriesStore};
pub use error::{StoreError, StoreResult};
pub use events::{EventBus, StoreEvent};
pub use files::{FilesState, FilesStore};
pub use investment_chains::{InvestmentChain, InvestmentChainRelation, InvestmentChainsStore};
pub use lookups::{
    AuditTypesStore, InvestmentProgramsStore, KeyedLookupSource, KeyedLookupStore, LookupsStore,
    PlanGroupsStore, SelectOption, StNetworksStore,
};
pub use organizations::{Agent, Organization, OrganizationsStore};
pub use paged::{FilterValue, PagedSource, PagedState, PagedStore, Pagination};
pub use reports::{ReportFilters, ReportsState, ReportsStore};
