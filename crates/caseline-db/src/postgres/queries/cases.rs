use serde_json::Value;

use caseline_core::case::Case;

use super::super::{pg_err, PostgresDatabase};
use crate::DbError;

#[derive(sqlx::FromRow)]
struct CaseRow {
    case_id: String,
    po_number: String,
    line_id: String,
    supplier_name: Option<String>,
    state: String,
    status: String,
    missing_fields: Option<Value>,
    next_check_at: Option<i64>,
    updated_at: i64,
    meta: Option<Value>,
}

impl From<CaseRow> for Case {
    fn from(r: CaseRow) -> Self {
        Case {
            case_id: r.case_id,
            po_number: r.po_number,
            line_id: r.line_id,
            supplier_name: r.supplier_name,
            state: r.state,
            status: r.status,
            missing_fields: r.missing_fields.and_then(missing_fields_from_json),
            next_check_at: r.next_check_at,
            updated_at: r.updated_at,
            meta: r.meta,
        }
    }
}

/// A JSONB value that is not an array of strings reads as absent.
fn missing_fields_from_json(value: Value) -> Option<Vec<String>> {
    match serde_json::from_value(value) {
        Ok(fields) => Some(fields),
        Err(e) => {
            tracing::warn!("ignoring malformed missing_fields: {e}");
            None
        }
    }
}

impl PostgresDatabase {
    pub(crate) async fn pg_get_case(&self, case_id: &str) -> Result<Option<Case>, DbError> {
        let row = sqlx::query_as::<_, CaseRow>("SELECT * FROM cases WHERE case_id = $1")
            .bind(case_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(pg_err)?;

        Ok(row.map(Case::from))
    }

    pub(crate) async fn pg_put_case(&self, case: &Case) -> Result<(), DbError> {
        let missing_fields = case
            .missing_fields
            .as_ref()
            .map(|fields| Value::from(fields.clone()));

        sqlx::query(
            "INSERT INTO cases (case_id, po_number, line_id, supplier_name, state, status,
                                missing_fields, next_check_at, updated_at, meta)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (case_id) DO UPDATE SET
                po_number = EXCLUDED.po_number,
                line_id = EXCLUDED.line_id,
                supplier_name = EXCLUDED.supplier_name,
                state = EXCLUDED.state,
                status = EXCLUDED.status,
                missing_fields = EXCLUDED.missing_fields,
                next_check_at = EXCLUDED.next_check_at,
                updated_at = EXCLUDED.updated_at,
                meta = EXCLUDED.meta",
        )
        .bind(&case.case_id)
        .bind(&case.po_number)
        .bind(&case.line_id)
        .bind(&case.supplier_name)
        .bind(&case.state)
        .bind(&case.status)
        .bind(missing_fields)
        .bind(case.next_check_at)
        .bind(case.updated_at)
        .bind(&case.meta)
        .execute(&self.pool)
        .await
        .map_err(pg_err)?;

        Ok(())
    }
}
