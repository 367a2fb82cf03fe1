//! Stop catalog and nearest-stop lookup.
//!
//! The full catalog of stop areas is fetched from OVapi once per process
//! and held in memory for distance queries, code lookup and name search.

mod client;
mod error;
mod index;

pub use client::{
    CatalogClientConfig, StopAreaDto, StopAreaListResponse, StopCatalogClient, StopCatalogSource,
};
pub use error::CatalogError;
pub use index::{StaticCatalog, StopIndex, rank_nearest};
