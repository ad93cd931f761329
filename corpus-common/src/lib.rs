//! # Score Corpus Common Library
//!
//! Shared code for the score corpus crates:
//! - Error type and result alias
//! - TOML configuration loading and atomic writing
//! - Root folder resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
