//! Integration tests for HttpService against a real server.
//!
//! Each test spawns an in-process axum server on 127.0.0.1:0 with in-memory SQLite,
//! then exercises the HTTP client layer through the full request/response cycle.

use caseline_core::attachment::{encode_payload, CreateAttachment};
use caseline_server::test_helpers::{
    sample_case, spawn_test_server, spawn_test_server_with_auth, TEST_API_KEY,
};
use caseline_service::{HttpService, ServiceError};
use serde_json::json;

#[tokio::test]
async fn health_check_via_http() {
    let server = spawn_test_server().await;
    let svc = HttpService::new(&server.base_url);
    svc.health_check().await.unwrap();
}

#[tokio::test]
async fn get_case_via_http() {
    let server = spawn_test_server().await;
    let mut case = sample_case("PO-2231-4");
    case.meta = Some(json!({
        "parsed_best_fields_v1": { "ship_date": "2026-11-02" },
        "agent_queue": "followup",
        "raw_email": "dropped"
    }));
    server.db.put_case(&case).await.unwrap();

    let svc = HttpService::new(&server.base_url);
    let view = svc.get_case("PO-2231-4").await.unwrap();
    assert_eq!(view.case_id, "PO-2231-4");
    assert_eq!(view.po_number, "PO-2231");
    assert_eq!(view.supplier_name.as_deref(), Some("Initech Supply"));
    assert_eq!(view.missing_fields, vec!["ship_date".to_string()]);
    assert_eq!(view.updated_at, 1_700_000_000_000);
    assert_eq!(
        view.meta.parsed_best_fields_v1,
        json!({ "ship_date": "2026-11-02" })
    );
    assert_eq!(view.meta.agent_queue, json!("followup"));
}

#[tokio::test]
async fn missing_case_maps_to_not_found() {
    let server = spawn_test_server().await;
    let svc = HttpService::new(&server.base_url);
    match svc.get_case("nope").await {
        Err(ServiceError::NotFound(msg)) => assert_eq!(msg, "Case nope not found"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_case_id_maps_to_invalid_input() {
    let server = spawn_test_server().await;
    let svc = HttpService::new(&server.base_url);
    match svc.get_case("").await {
        Err(ServiceError::InvalidInput(msg)) => assert_eq!(msg, "Missing caseId parameter"),
        other => panic!("expected InvalidInput, got {other:?}"),
    }
}

#[tokio::test]
async fn download_attachment_via_http() {
    let server = spawn_test_server().await;
    let payload = b"%PDF-1.4\n\x00\xff binary".to_vec();
    let att = server
        .db
        .insert_attachment(&CreateAttachment {
            case_id: Some("PO-2231-4".into()),
            binary_data_base64: Some(encode_payload(&payload)),
            filename: Some("confirmation.pdf".into()),
            mime_type: Some("application/pdf".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let svc = HttpService::new(&server.base_url);
    let download = svc.download_attachment(&att.attachment_id).await.unwrap();
    assert_eq!(download.bytes.as_ref(), payload.as_slice());
    assert_eq!(download.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(download.filename.as_deref(), Some("confirmation.pdf"));
}

#[tokio::test]
async fn download_without_payload_maps_to_not_found() {
    let server = spawn_test_server().await;
    server
        .db
        .insert_attachment(&CreateAttachment {
            attachment_id: Some("meta-only".into()),
            filename: Some("po.pdf".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let svc = HttpService::new(&server.base_url);
    assert!(matches!(
        svc.download_attachment("meta-only").await,
        Err(ServiceError::NotFound(_))
    ));
    assert!(matches!(
        svc.download_attachment("never-stored").await,
        Err(ServiceError::NotFound(_))
    ));
}

#[tokio::test]
async fn auth_required_when_key_configured() {
    let server = spawn_test_server_with_auth().await;
    server.db.put_case(&sample_case("C1")).await.unwrap();

    let anonymous = HttpService::new(&server.base_url);
    // Health stays open.
    anonymous.health_check().await.unwrap();
    match anonymous.get_case("C1").await {
        Err(ServiceError::Internal(msg)) => assert_eq!(msg, "missing or invalid API key"),
        other => panic!("expected auth failure, got {other:?}"),
    }

    let authed = HttpService::with_api_key(&server.base_url, TEST_API_KEY.to_string());
    assert_eq!(authed.get_case("C1").await.unwrap().case_id, "C1");
}

#[tokio::test]
async fn ids_with_reserved_characters_reach_the_right_record() {
    let server = spawn_test_server().await;
    let ids = ["PO1", "PO1#L2", "PO1/L2", "PO1?L2", "PO1 L2"];
    for id in ids {
        server.db.put_case(&sample_case(id)).await.unwrap();
    }

    let svc = HttpService::new(&server.base_url);
    for id in ids {
        assert_eq!(svc.get_case(id).await.unwrap().case_id, id);
    }
    match svc.get_case("PO9#missing").await {
        Err(ServiceError::NotFound(msg)) => assert_eq!(msg, "Case PO9#missing not found"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn attachment_ids_with_reserved_characters_download() {
    let server = spawn_test_server().await;
    let svc = HttpService::new(&server.base_url);
    for id in ["scan#1", "2026/11/po.pdf", "a?b", "with space"] {
        server
            .db
            .insert_attachment(&CreateAttachment {
                attachment_id: Some(id.into()),
                binary_data_base64: Some(encode_payload(id.as_bytes())),
                ..Default::default()
            })
            .await
            .unwrap();

        let download = svc.download_attachment(id).await.unwrap();
        assert_eq!(download.bytes.as_ref(), id.as_bytes());
    }
}
