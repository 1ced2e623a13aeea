//! Shared utilities, configuration, and error handling for Relume
//!
//! This crate provides common functionality used across the Relume application:
//! - Configuration management following 12-factor principles
//! - Error types and handling
//! - State machine error types
//! - Credential and session store contracts

pub mod config;
pub mod error;
pub mod state;
pub mod stores;

pub use config::Config;
pub use error::{Error, Result};
pub use state::StateError;
pub use stores::{
    CredentialStore, InMemoryCredentialStore, InMemorySessionStore, SessionStore,
    LAST_CHECK_IN_DATE,
};
