//! Runtime layer for the Stories Dashboard.
//!
//! Holds per-visitor sessions with their uploaded datasets and turns a
//! filter request into a [`view::DashboardView`] or an exported report.

pub mod dashboard;
pub mod session;
pub mod view;

pub use stories_core as core;
pub use stories_data as data;
