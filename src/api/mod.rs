//! API Module
//!
//! HTTP handlers and routing that expose the product cache to the
//! storefront front end.
//!
//! # Endpoints
//! - `GET|PUT /consent` - Caching consent
//! - `GET|PUT|DELETE /products/:key` - One cached product list
//! - `DELETE /products` - Clear every cached list
//! - `POST /clear-product-cache` - Manual purge
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
