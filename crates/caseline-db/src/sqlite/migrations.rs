use chrono::Utc;
use rusqlite::{params, Connection};

use super::SqliteResultExt;
use crate::DbError;

pub(crate) const LATEST_VERSION: i64 = 2;

pub fn run(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );",
    )
    .to_db()?;

    let current: i64 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .to_db()?;

    if current < 1 {
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS cases (
                case_id        TEXT PRIMARY KEY,
                po_number      TEXT NOT NULL,
                line_id        TEXT NOT NULL,
                supplier_name  TEXT,
                state          TEXT NOT NULL,
                status         TEXT NOT NULL,
                missing_fields TEXT,
                next_check_at  INTEGER,
                updated_at     INTEGER NOT NULL,
                meta           TEXT
            );

            CREATE TABLE IF NOT EXISTS confirmation_attachments (
                attachment_id      TEXT PRIMARY KEY,
                case_id            TEXT,
                binary_data_base64 TEXT,
                filename           TEXT,
                mime_type          TEXT,
                created_at         INTEGER NOT NULL
            );
            ",
        )
        .to_db()?;
        record_version(conn, 1)?;
    }

    if current < 2 {
        conn.execute_batch(
            "CREATE INDEX IF NOT EXISTS idx_cases_po_line ON cases(po_number, line_id);
             CREATE INDEX IF NOT EXISTS idx_attachments_case ON confirmation_attachments(case_id);",
        )
        .to_db()?;
        record_version(conn, 2)?;
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i64) -> Result<(), DbError> {
    conn.execute(
        "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
        params![version, Utc::now()],
    )
    .to_db()?;
    Ok(())
}
