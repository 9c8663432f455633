use crate::db::models::{Colgado, NewColgado, RackCounts, User};
use crate::db::schema::SQLITE_INIT;
use crate::error::ColgadosError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::{debug, info};

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct ColgadosStorage {
    pool: SqlitePool,
}

impl ColgadosStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database and make sure the schema exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, ColgadosError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(connect_opts)
            .await?;
        let storage = Self::new(pool);
        storage.init_schema().await?;
        info!(database_url = %database_url, "database ready");
        Ok(storage)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Initialize the schema by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), ColgadosError> {
        // sqlx::query runs a single statement at a time
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, ColgadosError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password, name FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ColgadosError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password, name FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    /// Insert a user unless the email is taken. Returns `None` when it is.
    pub async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
    ) -> Result<Option<User>, ColgadosError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            return Ok(None);
        }

        let inserted = sqlx::query("INSERT INTO users (email, password, name) VALUES (?, ?, ?)")
            .bind(email)
            .bind(password_hash)
            .bind(name)
            .execute(&mut *tx)
            .await;
        let id = match inserted {
            Ok(done) => done.last_insert_rowid(),
            // Lost a race with a concurrent registration for the same email.
            Err(e) if is_unique_violation(&e) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        tx.commit().await?;
        debug!(user_id = id, "user created");
        Ok(Some(User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            name: name.to_string(),
        }))
    }

    pub async fn list_colgados(&self) -> Result<Vec<Colgado>, ColgadosError> {
        let rows = sqlx::query_as::<_, Colgado>(
            r#"SELECT id, part_key, part_no, pieza_rack, rack_eslabon
               FROM colgados ORDER BY id"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn get_colgado(&self, id: i64) -> Result<Option<Colgado>, ColgadosError> {
        let row = sqlx::query_as::<_, Colgado>(
            r#"SELECT id, part_key, part_no, pieza_rack, rack_eslabon
               FROM colgados WHERE id = ?"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn insert_colgado(&self, new: NewColgado) -> Result<Colgado, ColgadosError> {
        let mut tx = self.pool.begin().await?;
        let done = sqlx::query(
            r#"INSERT INTO colgados (part_key, part_no, pieza_rack, rack_eslabon)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(new.part_key)
        .bind(&new.part_no)
        .bind(new.pieza_rack)
        .bind(new.rack_eslabon)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(new.into_colgado(done.last_insert_rowid()))
    }

    /// Update `pieza_rack`/`rack_eslabon` only. Returns whether the row existed.
    pub async fn update_rack_counts(
        &self,
        id: i64,
        counts: RackCounts,
    ) -> Result<bool, ColgadosError> {
        let mut tx = self.pool.begin().await?;
        let done = sqlx::query("UPDATE colgados SET pieza_rack = ?, rack_eslabon = ? WHERE id = ?")
            .bind(counts.pieza_rack)
            .bind(counts.rack_eslabon)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(done.rows_affected() > 0)
    }

    /// Returns whether a row was removed.
    pub async fn delete_colgado(&self, id: i64) -> Result<bool, ColgadosError> {
        let mut tx = self.pool.begin().await?;
        let done = sqlx::query("DELETE FROM colgados WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(done.rows_affected() > 0)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}
