//! ts-catalog
//!
//! Loader, lookup engine and checker for Qt Linguist `.ts` translation catalogs.

pub mod catalog;
pub mod check;
pub mod config;
pub mod indexer;
pub mod types;
