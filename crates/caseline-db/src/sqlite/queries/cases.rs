use rusqlite::{params, OptionalExtension, Row};

use caseline_core::case::Case;

use super::super::{parse_json_column, to_json_column, SqliteDatabase, SqliteResultExt};
use crate::DbError;

fn row_to_case(row: &Row) -> rusqlite::Result<Case> {
    let missing_fields: Option<String> = row.get("missing_fields")?;
    let meta: Option<String> = row.get("meta")?;
    Ok(Case {
        case_id: row.get("case_id")?,
        po_number: row.get("po_number")?,
        line_id: row.get("line_id")?,
        supplier_name: row.get("supplier_name")?,
        state: row.get("state")?,
        status: row.get("status")?,
        missing_fields: parse_json_column("missing_fields", missing_fields),
        next_check_at: row.get("next_check_at")?,
        updated_at: row.get("updated_at")?,
        meta: parse_json_column("meta", meta),
    })
}

impl SqliteDatabase {
    pub fn get_case_sync(&self, case_id: &str) -> Result<Option<Case>, DbError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT * FROM cases WHERE case_id = ?1",
                params![case_id],
                row_to_case,
            )
            .optional()
            .to_db()
        })
    }

    pub fn put_case_sync(&self, case: &Case) -> Result<(), DbError> {
        let missing_fields = to_json_column(case.missing_fields.as_ref())?;
        let meta = to_json_column(case.meta.as_ref())?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO cases (case_id, po_number, line_id, supplier_name, state, status,
                                    missing_fields, next_check_at, updated_at, meta)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(case_id) DO UPDATE SET
                    po_number = excluded.po_number,
                    line_id = excluded.line_id,
                    supplier_name = excluded.supplier_name,
                    state = excluded.state,
                    status = excluded.status,
                    missing_fields = excluded.missing_fields,
                    next_check_at = excluded.next_check_at,
                    updated_at = excluded.updated_at,
                    meta = excluded.meta",
                params![
                    case.case_id,
                    case.po_number,
                    case.line_id,
                    case.supplier_name,
                    case.state,
                    case.status,
                    missing_fields,
                    case.next_check_at,
                    case.updated_at,
                    meta,
                ],
            )
            .to_db()?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use caseline_core::case::Case;
    use rusqlite::params;
    use serde_json::json;

    use crate::SqliteDatabase;

    fn sample(case_id: &str) -> Case {
        Case {
            case_id: case_id.into(),
            po_number: "PO-4410".into(),
            line_id: "3".into(),
            supplier_name: Some("Northwind Castings".into()),
            state: "awaiting_supplier".into(),
            status: "pending".into(),
            missing_fields: Some(vec!["ship_date".into()]),
            next_check_at: Some(1_700_000_360_000),
            updated_at: 1_700_000_000_000,
            meta: Some(json!({ "agent_queue": "chase", "attempts": 2 })),
        }
    }

    #[test]
    fn test_case_put_and_get() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        let case = sample("C-1");
        db.put_case_sync(&case).unwrap();
        assert_eq!(db.get_case_sync("C-1").unwrap(), Some(case));
    }

    #[test]
    fn test_missing_case_is_none() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        assert!(db.get_case_sync("nope").unwrap().is_none());
    }

    #[test]
    fn test_put_replaces_existing() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        db.put_case_sync(&sample("C-1")).unwrap();

        let mut changed = sample("C-1");
        changed.status = "confirmed".into();
        changed.missing_fields = None;
        changed.meta = None;
        db.put_case_sync(&changed).unwrap();

        let fetched = db.get_case_sync("C-1").unwrap().unwrap();
        assert_eq!(fetched.status, "confirmed");
        assert!(fetched.missing_fields.is_none());
        assert!(fetched.meta.is_none());
    }

    #[test]
    fn test_malformed_meta_reads_as_absent() {
        let db = SqliteDatabase::open_in_memory().unwrap();
        db.put_case_sync(&sample("C-1")).unwrap();
        db.with_conn(|conn| {
            conn.execute(
                "UPDATE cases SET meta = ?1, missing_fields = ?2 WHERE case_id = 'C-1'",
                params!["{broken", "\"not a list\""],
            )
            .map_err(crate::sqlite::map_sqlite_err)?;
            Ok(())
        })
        .unwrap();

        let fetched = db.get_case_sync("C-1").unwrap().unwrap();
        assert!(fetched.meta.is_none());
        assert!(fetched.missing_fields.is_none());
    }
}
