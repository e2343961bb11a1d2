//! Port contracts for the task client.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod cache_store;
pub mod resource_client;
pub mod wire;

pub use cache_store::TaskCacheStore;
pub use resource_client::{CommonQuery, Listing, ResourceClient, ResourceError, ResourceResult};
