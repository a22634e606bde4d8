// Backend-agnostic integration tests for the Database trait.
//
// Each public async function accepts `&dyn Database` so that the same logic
// can be exercised against both the SQLite and Postgres backends.

use caseline_core::attachment::CreateAttachment;
use caseline_core::case::Case;
use caseline_db::Database;
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_case(case_id: &str) -> Case {
    Case {
        case_id: case_id.to_string(),
        po_number: "PO-1001".to_string(),
        line_id: "10".to_string(),
        supplier_name: Some("Globex Fasteners".to_string()),
        state: "awaiting_confirmation".to_string(),
        status: "pending".to_string(),
        missing_fields: Some(vec!["delivery_date".to_string(), "unit_price".to_string()]),
        next_check_at: Some(1_700_003_600_000),
        updated_at: 1_700_000_000_000,
        meta: Some(json!({
            "parsed_best_fields_v1": { "delivery_date": "2024-03-01" },
            "agent_queue": { "name": "followup", "priority": 2 },
            "trace_id": "abc"
        })),
    }
}

// ---------------------------------------------------------------------------
// Case tests
// ---------------------------------------------------------------------------

/// A stored case comes back field for field, including its open metadata.
pub async fn test_case_round_trip(db: &dyn Database) {
    let case = make_case("case-rt");
    db.put_case(&case).await.unwrap();
    let fetched = db.get_case("case-rt").await.unwrap().unwrap();
    assert_eq!(fetched, case);
}

/// Nullable columns stay null.
pub async fn test_case_with_nulls(db: &dyn Database) {
    let case = Case {
        case_id: "case-null".to_string(),
        po_number: "PO1".to_string(),
        line_id: "L1".to_string(),
        supplier_name: None,
        state: "open".to_string(),
        status: "pending".to_string(),
        missing_fields: None,
        next_check_at: None,
        updated_at: 100,
        meta: None,
    };
    db.put_case(&case).await.unwrap();
    assert_eq!(db.get_case("case-null").await.unwrap(), Some(case));
}

pub async fn test_case_missing(db: &dyn Database) {
    assert!(db.get_case("does-not-exist").await.unwrap().is_none());
}

/// `put_case` on an existing id replaces the row.
pub async fn test_case_upsert(db: &dyn Database) {
    db.put_case(&make_case("case-up")).await.unwrap();

    let mut changed = make_case("case-up");
    changed.state = "confirmed".to_string();
    changed.missing_fields = Some(Vec::new());
    changed.meta = Some(json!("not-an-object"));
    changed.updated_at += 1;
    db.put_case(&changed).await.unwrap();

    let fetched = db.get_case("case-up").await.unwrap().unwrap();
    assert_eq!(fetched, changed);
}

// ---------------------------------------------------------------------------
// Attachment tests
// ---------------------------------------------------------------------------

pub async fn test_attachment_blob(db: &dyn Database) {
    let created = db
        .insert_attachment(&CreateAttachment {
            attachment_id: Some("att-1".to_string()),
            case_id: Some("case-rt".to_string()),
            binary_data_base64: Some("aGVsbG8=".to_string()),
            filename: Some("a.pdf".to_string()),
            mime_type: None,
        })
        .await
        .unwrap();
    assert_eq!(created.attachment_id, "att-1");
    assert_eq!(created.case_id.as_deref(), Some("case-rt"));
    assert!(created.has_binary_data);

    let blob = db.get_attachment_blob("att-1").await.unwrap().unwrap();
    assert_eq!(blob.binary_data_base64.as_deref(), Some("aGVsbG8="));
    assert_eq!(blob.filename.as_deref(), Some("a.pdf"));
    assert_eq!(blob.mime_type, None);
    assert_eq!(blob.decode().unwrap().unwrap(), b"hello");
}

pub async fn test_attachment_without_payload(db: &dyn Database) {
    let created = db
        .insert_attachment(&CreateAttachment {
            attachment_id: Some("att-empty".to_string()),
            filename: Some("scan.pdf".to_string()),
            mime_type: Some("application/pdf".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(!created.has_binary_data);

    let blob = db.get_attachment_blob("att-empty").await.unwrap().unwrap();
    assert!(blob.binary_data_base64.is_none());
    assert!(blob.decode().unwrap().is_none());
}

pub async fn test_attachment_generated_id(db: &dyn Database) {
    let created = db
        .insert_attachment(&CreateAttachment {
            binary_data_base64: Some("AAEC".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(!created.attachment_id.is_empty());
    let blob = db
        .get_attachment_blob(&created.attachment_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(blob.decode().unwrap().unwrap(), vec![0u8, 1, 2]);
}

pub async fn test_attachment_missing(db: &dyn Database) {
    assert!(db.get_attachment_blob("nope").await.unwrap().is_none());
}
