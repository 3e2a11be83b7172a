//! # Laptop Store
//!
//! Client library and terminal storefront for the Laptop Store Deluxe REST
//! backend.
//!
//! ## Features
//!
//! - **Catalog browsing**: filtered, paginated laptop listings and detail views
//! - **Accounts**: login, registration and a persisted bearer-token session
//! - **Inventory admin**: create, edit and delete laptops with form normalization
//! - **Assistant**: streamed chat with a laptop-focused language model
//!
//! ## Modules
//!
//! - [`api`]: HTTP access layer with error-shape normalization
//! - [`session`]: Session holder and durable token storage
//! - [`pagination`]: Page-window calculator for pagination controls
//! - [`form`]: Laptop draft state for the admin create/edit forms
//! - [`chat`]: Chat widget and Gemini streaming assistant
//! - [`views`]: Terminal renderings of every page
//! - [`catalog`]: Option lists and page sizes
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use laptop_store::api::{LaptopFilter, StoreClient};
//! use laptop_store::config::Config;
//! use laptop_store::session::{FileTokenStore, Session};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default()?;
//!     let tokens = Arc::new(FileTokenStore::new(config.session.token_path()));
//!     let client = StoreClient::new(&config.api, tokens)?;
//!
//!     // Pick up a token left by a previous run
//!     let mut session = Session::new(client);
//!     session.restore().await;
//!
//!     let filter = LaptopFilter::new().ram("16GB").price_range(500.0, 1500.0);
//!     let page = session.client().list_laptops(&filter).await?;
//!
//!     println!("Found {} laptops", page.meta.total_items);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod form;
pub mod pagination;
pub mod session;
pub mod views;

// Re-export top-level types for convenience
pub use api::{
    ApiError, ApiResult, Auth, Laptop, LaptopFilter, LaptopPayload, LoginCredentials, Meta,
    Paginated, RegisterPayload, Role, StoreClient, User, ValidationErrors,
};

pub use session::{
    FileTokenStore, MemoryTokenStore, Session, SessionError, SessionState, StoreError, TokenStore,
};

pub use pagination::{page_window, PageWindow, WINDOW_SIZE};

pub use form::{clamp_rating, coerce_number, parse_tags, DraftField, FormMode, LaptopDraft};

pub use chat::{
    Assistant, AssistantError, AssistantSession, ChatMessage, ChatRole, ChatWidget,
    GeminiAssistant, SendOutcome,
};

pub use config::{
    ApiConfig, AssistantConfig, Config, ConfigError, LoggingConfig, SessionConfig,
};
