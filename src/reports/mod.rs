//! Report assembly
//!
//! Joins computed numbers with catalog metadata into display-ready rows.
//! Formatting (tables, colors, JSON) lives in the CLI layer; this module
//! only decides what goes in a row and in what order.

pub mod dashboard;
