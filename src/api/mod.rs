//! API Module
//!
//! HTTP handlers and routing for the tag cache REST API.
//!
//! # Endpoints
//! - `PUT /:namespace/set` - Store a value
//! - `GET /:namespace/get/:key` - Retrieve a value by key
//! - `DELETE /:namespace/del/:key` - Delete a key
//! - `POST /:namespace/tagrm` - Invalidate a tag
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
