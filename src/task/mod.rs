//! Task bounded context of the diretto client.
//!
//! Tasks are the only root entities; submissions, comments and tags belong
//! to a task and are reachable only through its complete snapshot. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
