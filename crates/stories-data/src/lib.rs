//! Data layer for the Stories Dashboard.
//!
//! Reads the two uploaded exports, aggregates them into period buckets,
//! joins the current year against the prior year and derives the filtered
//! view and its KPIs.

pub mod aggregator;
pub mod analysis;
pub mod comparison;
pub mod filter;
pub mod kpi;
pub mod reader;

pub use stories_core as core;
