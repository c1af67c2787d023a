//! Shared building blocks for the brain atlas services.
//!
//! - `config`: environment-driven service configuration
//! - `errors`: the application error taxonomy and its HTTP mapping
//! - `middleware`: request id propagation
//! - `models`: wire models shared between crates
//! - `response`: the uniform JSON response envelope

pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod response;
