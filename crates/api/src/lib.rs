//! HTTP API layer for foodgram-rs.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: recipes, tags, ingredients, users, subscriptions
//! - **Extractors**: authentication
//! - **Middleware**: bearer-token resolution
//! - **Responses**: uniform JSON envelopes and pagination
//!
//! Built on Axum 0.8 with Tower middleware stack.

// Allow dead_code for API compatibility fields in request structs
#![allow(dead_code)]

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
