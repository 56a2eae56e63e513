//! Presentation layer for the Stories Dashboard.
//!
//! Renders a [`stories_runtime::view::DashboardView`] as the interactive
//! dashboard page, as plotly charts, and as the downloadable HTML and XLSX
//! reports.

pub mod charts;
pub mod components;
pub mod excel;
pub mod html_report;
pub mod page;
pub mod table_view;
pub mod themes;

pub use html_report::Reports;
pub use stories_core as core;

#[cfg(test)]
mod test_support;
