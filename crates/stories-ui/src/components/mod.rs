//! Reusable page fragments.

pub mod banner;
pub mod kpi_cards;
