//! SQL DDL for initializing the application database.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema with:
/// - `users`: unique `email`, salted `password` hash, display `name`
/// - `colgados`: one row per part/rack configuration, all columns NOT NULL
pub const SQLITE_INIT: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    password TEXT NOT NULL,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS colgados (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    part_key INTEGER NOT NULL,
    part_no TEXT NOT NULL,
    pieza_rack INTEGER NOT NULL,
    rack_eslabon INTEGER NOT NULL
);
"#;
