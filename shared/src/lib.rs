//! Shared utilities and common types for the Eau credential services
//!
//! This crate provides common functionality used across all workspace crates:
//! - Configuration types and environment loaders
//! - Utility functions (email address validation)

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, EmailTokenConfig, Environment, KeyStoreBackend, KeyStoreConfig,
    LogFormat, LoggingConfig, SessionTokenConfig, MAX_EMAIL_TOKEN_LIFE_HOURS,
    MAX_TOKEN_LIFE_MINUTES,
};
pub use utils::validation;
