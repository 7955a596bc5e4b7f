//! Request and Response models for the product cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{SetConsentRequest, SetProductsRequest};
pub use responses::{
    ClearProductCacheResponse, ClearResponse, ConsentResponse, DeleteResponse, ErrorResponse,
    HealthResponse, ProductsResponse, SetResponse, StatsResponse,
};
