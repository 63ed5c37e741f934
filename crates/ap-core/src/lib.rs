//! # ap-core
//!
//! Foundational types for the auth-platform client crates:
//! - Client configuration (`ClientConfig`)
//! - The shared error taxonomy (`Error`) and `Result` alias

pub mod config;
pub mod error;

pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::{Error, Result};
