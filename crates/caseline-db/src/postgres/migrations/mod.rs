use chrono::Utc;
use sqlx::{PgConnection, PgPool};

use super::pg_err;
use crate::DbError;

/// Key for the session-scoped advisory lock that serialises migration runs
/// across replicas. "caseline" as hex.
pub const MIGRATION_LOCK_KEY: i64 = 0x6361_7365_6C69_6E65;

pub async fn run(pool: &PgPool) -> Result<(), DbError> {
    // Lock, migrate and unlock on one session; the lock belongs to it.
    let mut conn = pool.acquire().await.map_err(pg_err)?;

    sqlx::query("SELECT pg_advisory_lock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .execute(&mut *conn)
        .await
        .map_err(pg_err)?;

    let result = run_inner(&mut conn).await;

    match sqlx::query_scalar::<_, bool>("SELECT pg_advisory_unlock($1)")
        .bind(MIGRATION_LOCK_KEY)
        .fetch_one(&mut *conn)
        .await
    {
        Ok(true) => {}
        Ok(false) => tracing::warn!("migration lock was not held at unlock"),
        Err(e) => tracing::warn!("releasing migration lock failed: {e}"),
    }

    result
}

async fn run_inner(conn: &mut PgConnection) -> Result<(), DbError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(&mut *conn)
    .await
    .map_err(pg_err)?;

    let current: i32 = sqlx::query_scalar("SELECT COALESCE(MAX(version), 0) FROM schema_version")
        .fetch_one(&mut *conn)
        .await
        .map_err(pg_err)?;

    if current < 1 {
        apply(conn, 1, include_str!("sql/V1__initial.sql")).await?;
    }

    if current < 2 {
        apply(conn, 2, include_str!("sql/V2__lookup_indexes.sql")).await?;
    }

    Ok(())
}

async fn apply(conn: &mut PgConnection, version: i32, sql: &str) -> Result<(), DbError> {
    sqlx::raw_sql(sql)
        .execute(&mut *conn)
        .await
        .map_err(|e| DbError::Internal(format!("migration V{version}: {e}")))?;
    sqlx::query("INSERT INTO schema_version (version, applied_at) VALUES ($1, $2)")
        .bind(version)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await
        .map_err(pg_err)?;
    Ok(())
}
