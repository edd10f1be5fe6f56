//! # session-auth
//!
//! Client-side authentication session lifecycle for the profile portal:
//! - Cookie-style bearer token storage with a fixed expiry
//! - Local decoding of identity claims from the stored token
//! - Google sign-in through the backend (login URL, code exchange)
//! - A shared session controller that publishes state changes to every view
//! - A route guard deciding what protected views may render
//! - Profile fetch and save against the backend
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use session_auth::{
//!     session::SessionController,
//!     token::{FileCookieStore, TokenStore},
//! };
//!
//! let store: Arc<dyn TokenStore> = Arc::new(FileCookieStore::new("auth_token.json"));
//! let session = Arc::new(SessionController::new(store));
//! ```
//!
//! Identity decoded here is never authoritative: every profile call re-sends the
//! token and the backend decides.

pub mod decoder;
pub mod error;
pub mod gateway;
pub mod guard;
pub mod http;
pub mod liveness;
pub mod profile;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use decoder::{decode, Identity};
pub use error::{Error, ErrorKind};
