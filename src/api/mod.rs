//! REST API layer for HTTP request/response handling.
//!
//! # Modules
//!
//! - [`dto`] - Query parameters and health response shapes
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Request tracing
//! - [`routes`] - Route configuration

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
