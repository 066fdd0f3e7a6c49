//! # LeadDesk Common Library
//!
//! Shared code for LeadDesk crates:
//! - Error taxonomy and crate-wide `Result` alias
//! - Configuration loading and data directory resolution

pub mod config;
pub mod error;

pub use error::{Error, Result};
