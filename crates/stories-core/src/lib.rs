//! Domain types shared by every Stories Dashboard crate.
//!
//! Holds the metric and comparison models, the error type, CLI settings,
//! period bucketing, brand rules and number formatting.

pub mod brands;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{DashboardError, ErrorKind, Result};
