//! HTTP client SDK for the ENSPM Hub API.
//!
//! This crate provides a typed client for the ENSPM Hub REST API, with
//! bearer-token injection and transparent access-token refresh.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use enspm_client::{EnspmClient, PageRequest, Result, UserFilter};
//!
//! # async fn example() -> Result<()> {
//! // Sessions survive restarts when backed by a file
//! let store = enspm_client::session::create_session_store(Path::new("/tmp/enspm"));
//!
//! let client = EnspmClient::builder()
//!     .base_url("http://localhost:8000")
//!     .session_store(store)
//!     .build()?;
//!
//! client.auth().login("ada@enspm.cm", "secret").await?;
//!
//! // Expired access tokens are refreshed once, behind the scenes
//! let filter = UserFilter {
//!     roles: vec!["admin".into(), "user".into()],
//!     ..Default::default()
//! };
//! let page = client.users().list(&filter, PageRequest::default()).await?;
//! println!("{} users", page.meta.total_items);
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Auth**: Login, logout, current user, password recovery
//! - **Users**: Admin listing with filters, status toggling, passwords
//! - **Organisations**: CRUD, moderation, members, followers
//! - **Opportunities**: Internships, jobs and trainings boards
//! - **Info**: API root document and reachability

pub mod api;
pub mod client;
pub mod error;
pub mod request;
pub mod session;
pub mod types;

pub use client::{ClientBuilder, EnspmClient};
pub use error::{Error, FieldError, Result};
pub use request::{ApiRequest, Query};
pub use session::{
    FileSessionStore, InMemorySessionStore, Session, SessionStore, SharedSessionStore, TokenPair,
};
pub use types::*;
