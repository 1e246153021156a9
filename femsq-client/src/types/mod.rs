//! Wire DTOs for the FEMSQ REST API.
//!
//! Field names follow the backend's camelCase JSON. With the `typescript`
//! feature enabled, these types can be exported with ts-rs.

mod audits;
mod chains;
mod connection;
mod files;
mod lookups;
mod organizations;
mod reports;

pub use audits::*;
pub use chains::*;
pub use connection::*;
pub use files::*;
pub use lookups::*;
pub use organizations::*;
pub use reports::*;
