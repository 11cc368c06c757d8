//! Core library for the employee portal.
//!
//! Normalizes loosely typed backend rows into shifts and notifications,
//! deduplicates realtime change events, and provides localized copy and a
//! local cache, independent of any transport.
//!
//! # Usage
//!
//! ```no_run
//! use portal_core::db::Database;
//! use portal_core::models::Language;
//!
//! let db = Database::open_default()?;
//! db.migrate()?;
//!
//! let language = db.load_language(Some("employee-1"), Language::En)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod calendar;
pub mod config;
pub mod db;
pub mod i18n;
pub mod models;
pub mod notifications;
pub mod realtime;
pub mod rows;
pub mod shifts;
pub mod time;

// Re-export commonly used types at crate root
pub use db::Database;
pub use rows::Row;
