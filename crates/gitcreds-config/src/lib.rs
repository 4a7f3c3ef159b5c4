//! Configuration parsing for gitcreds
//!
//! This crate handles parsing of:
//! - Git auth configuration (servers and their user identities, YAML or JSON)
//! - Global configuration (`~/.config/gitcreds/config.toml`)

mod auth;
mod error;
mod global;

pub use auth::*;
pub use error::*;
pub use global::*;
