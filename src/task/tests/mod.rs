//! Unit tests for the task client.
//!
//! Tests are organised by component: domain values, wire assembly, the
//! cache, result paging and the gateway's freshness policy.

mod assembler_tests;
mod cache_tests;
mod fixtures;
mod mutation_tests;
mod pager_tests;
