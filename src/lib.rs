//! Content back office for a furniture and sanitary-ware storefront.
//!
//! Editors submit whole lists of page content (slides, sections, categories,
//! collections, catalog entries) and the store reconciles them against what
//! is persisted in SQLite.

pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod server;
