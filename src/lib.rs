//! Typed client for the diretto Task API.
//!
//! The crate turns the JSON resources of the Task API into immutable domain
//! entities (tasks, submissions, comments and tags), pages through listings
//! and query results, and keeps a local cache of tasks so that repeated
//! lookups do not reach the network.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: entities, identifiers and value types with no
//!   infrastructure dependencies
//! - **Ports**: trait interfaces for the remote service and the cache store
//! - **Adapters**: an HTTP transport and in-memory implementations
//! - **Services**: the gateway, its freshness policy and result paging
//!
//! # Modules
//!
//! - [`config`]: client configuration loading and validation
//! - [`task`]: the task bounded context

pub mod config;
pub mod task;
