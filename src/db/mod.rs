//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: the storage handle used by the handlers

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{Colgado, NewColgado, RackCounts, User};
pub use schema::SQLITE_INIT;
pub use sqlite::{ColgadosStorage, SqlitePool};
