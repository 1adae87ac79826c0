//! JPX-listed MSCI ETF performance dashboard
//!
//! Core pipeline: price acquisition with an on-disk cache ([`pricing`]),
//! date-indexed per-instrument series ([`series`]), multi-window return
//! computation and rebasing ([`returns`]), and catalog-joined display rows
//! ([`reports`]). The CLI layers on top and owns all terminal output.

pub mod catalog;
pub mod cli;
pub mod dispatcher;
pub mod error;
pub mod pricing;
pub mod reports;
pub mod returns;
pub mod series;
pub mod utils;
