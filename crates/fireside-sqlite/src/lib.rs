//! SQLite storage backend for Fireside Archive
//!
//! Implements the `fireside-core` storage traits on a single SQLite file.
//!
//! ## Features
//!
//! - **Documents**: every record type lives in one `documents` table as a JSON
//!   body, queried with `json_extract`
//! - **Tags**: a `tags` table with a unique case-folded name key; counters
//!   move by single `UPDATE` statements
//! - **Transactions**: each unit of work runs in an `IMMEDIATE` transaction
//!   and rolls back on any error
//! - **WAL Mode**: write-ahead logging for file databases
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fireside_core::Archive;
//! use fireside_sqlite::{SqliteBackend, SqliteConfig};
//!
//! let backend = SqliteBackend::open(SqliteConfig::new("./fireside.db"))?;
//! let archive = Archive::new(backend);
//! # Ok::<(), fireside_sqlite::SqliteError>(())
//! ```

pub mod backend;
pub mod config;
pub mod connection;
pub mod error;
pub mod schema;
pub mod session;

// Re-exports
pub use backend::SqliteBackend;
pub use config::SqliteConfig;
pub use connection::SqlitePool;
pub use error::{SqliteError, SqliteResult};
pub use session::SqliteSession;
