//! # MyLook Common Library
//!
//! Shared code for the MyLook wardrobe engine:
//! - Data model (wardrobe items, history entries, ambient context)
//! - Remote row shapes and conversions
//! - Data-sanitization helpers
//! - Calendar/time derivation
//! - TOML configuration loading

pub mod config;
pub mod error;
pub mod models;
pub mod rows;
pub mod sanitize;
pub mod time;

pub use error::{Error, Result};
