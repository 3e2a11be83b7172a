//! Laptop Store REST API access
//!
//! Typed client for the storefront backend, built on reqwest.
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /auth/login` - Exchange credentials for a bearer token
//! - `POST /auth/register` - Create an account
//! - `GET /auth/me` - Current user (bearer)
//!
//! ## Laptops
//! - `GET /laptops` - Paginated, filtered listing
//! - `GET /laptops/:id` - A single laptop
//! - `POST /laptops` - Create a laptop (bearer, admin)
//! - `PUT /laptops/:id` - Update a laptop (bearer, admin)
//! - `DELETE /laptops/:id` - Delete a laptop (bearer, admin)
//!
//! Every failure, whether the server was unreachable or answered with an
//! error status, comes back as a single [`ApiError`].
//!
//! # Example
//!
//! ```rust,ignore
//! use laptop_store::api::{LaptopFilter, StoreClient};
//! use laptop_store::config::ApiConfig;
//! use laptop_store::session::MemoryTokenStore;
//! use std::sync::Arc;
//!
//! let client = StoreClient::new(&ApiConfig::default(), Arc::new(MemoryTokenStore::new()))?;
//! let page = client.list_laptops(&LaptopFilter::new().brand("Dell")).await?;
//! ```

pub mod client;
pub mod dto;
pub mod error;

pub use client::{Auth, StoreClient};
pub use dto::{
    Laptop, LaptopFilter, LaptopPayload, LoginCredentials, Meta, Paginated, RegisterPayload,
    Role, TokenResponse, User,
};
pub use error::{ApiError, ApiResult, ErrorItem, ValidationErrors};
