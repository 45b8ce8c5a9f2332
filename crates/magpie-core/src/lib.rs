//! Core types, configuration, and error handling for the magpie bot.
//!
//! This crate provides the shared foundation used by the integration
//! crates:
//! - [`MagpieError`] — unified error type using `thiserror`
//! - [`MagpieConfig`] — configuration loaded from `.magpie.toml` or the
//!   process environment
//! - Shared types: [`Change`], [`ChangeStatus`]

mod config;
mod error;
mod types;

pub use config::{GiteaConfig, LlmConfig, MagpieConfig, ReviewConfig};
pub use error::MagpieError;
pub use types::{Change, ChangeStatus};

/// A convenience `Result` type for magpie operations.
pub type Result<T> = std::result::Result<T, MagpieError>;
