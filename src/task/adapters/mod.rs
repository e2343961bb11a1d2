//! Adapters for the task client ports.
//!
//! - [`memory::InMemoryTaskCache`]: concurrent task store with expiry and
//!   capacity bounds, backing the entity cache
//! - [`memory::InMemoryTaskService`]: process-local Task API used in tests
//!   and offline demos
//! - [`http::HttpResourceClient`]: `reqwest` client for a remote Task API

pub mod http;
pub mod memory;
