//! FEMSQ API client
//!
//! Typed access to the FEMSQ records REST API: organizations, audits,
//! directories, files, investment-program chains, lookups and the report
//! catalog.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │               FemsqApi                  │
//! │  (typed endpoint methods, DTO decode)   │
//! └────────────────┬────────────────────────┘
//!                  │ ApiRequest / Response
//!      ┌───────────┴───────────┐
//!      ▼                       ▼
//! ┌─────────────┐       ┌─────────────┐
//! │ HttpClient  │       │ MockTransport│
//! │ (reqwest)   │       │ (tests)     │
//! └─────────────┘       └─────────────┘
//! ```
//!
//! Every failure is classified once, at the transport boundary, into an
//! [`ApiError`] variant: `Http`, `Network`, `Timeout` or `Decode`.
//!
//! # Example
//!
//! ```rust,no_run
//! use femsq_client::{ClientConfig, FemsqApi, Query};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let api = FemsqApi::from_config(ClientConfig {
//!     base_url: "http://localhost:8080/api/".into(),
//!     ..Default::default()
//! })?;
//!
//! let page = api
//!     .list_organizations(Query::new().with("page", 0).with("size", 10))
//!     .await?;
//! println!("{} organizations", page.content.len());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod mock;
pub mod page;
pub mod transport;
pub mod types;

// Re-export main types
pub use api::FemsqApi;
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, Result};
pub use http::HttpClient;
pub use mock::{MockReply, MockTransport};
pub use page::{ListResponse, Page, PageResponse};
pub use transport::{ApiRequest, Body, Method, Query, Response, ResponseKind, Transport};
pub use types::*;
