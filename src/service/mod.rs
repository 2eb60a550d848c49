//! Query service
//!
//! Facade over the dataset cache and the query pipeline. This is the surface
//! the CLI (or any embedding host) talks to.

mod query_service;

pub use query_service::QueryService;
