//! In-memory adapters: the task store behind the entity cache and a
//! process-local stand-in for the remote service.

mod cache;
mod service;

pub use cache::{CacheRetention, InMemoryTaskCache};
pub use service::{InMemoryTaskService, ServiceCalls};
