//! # Trackmart Common Library
//!
//! Shared code for the trackmart services including:
//! - Error types
//! - Configuration loading and credential resolution
//! - Track/artist record models and search partitions

pub mod config;
pub mod error;
pub mod models;

pub use error::{Error, Result};
