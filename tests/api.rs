//! HTTP API tests against a temporary SQLite database

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use axum_test::TestServer;
use base64::{engine::general_purpose::STANDARD, Engine};
use lopdf::{dictionary, Document, Object, StringFormat};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use pdf_form_editor::config::Config;
use pdf_form_editor::state::AppState;
use pdf_form_editor::{build_router, db, forms};

const BOUNDARY: &str = "pdf-form-editor-boundary";

struct TestApp {
    router: Router,
    server: TestServer,
    _dir: TempDir,
}

async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("api.db").display());
    let pool = db::create_pool(&url, 2).await.unwrap();
    let state = AppState::new(Config::default(), pool);

    TestApp {
        router: build_router(state.clone()),
        server: TestServer::new(build_router(state)).unwrap(),
        _dir: dir,
    }
}

fn literal(s: &str) -> Object {
    Object::String(s.as_bytes().to_vec(), StringFormat::Literal)
}

/// One-page form with a text field, a date field and a checked checkbox
fn sample_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let name = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => literal("full_name"),
        "TU" => literal("Full name"),
        "Rect" => vec![72.into(), 700.into(), 300.into(), 720.into()],
    });
    let birth = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => literal("date_naissance"),
        "Rect" => vec![72.into(), 650.into(), 200.into(), 670.into()],
    });
    let agree = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Btn",
        "T" => literal("agree"),
        "Rect" => vec![72.into(), 600.into(), 84.into(), 612.into()],
        "AS" => "Yes",
        "AP" => dictionary! {
            "N" => dictionary! { "Yes" => Object::Null, "Off" => Object::Null },
        },
    });

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        "Annots" => vec![name.into(), birth.into(), agree.into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

fn multipart_body(filename: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/pdf\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn upload(app: &TestApp, filename: &str, bytes: &[u8]) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/pdf/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(filename, bytes)))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn upload_sample(app: &TestApp) -> String {
    let (status, body) = upload(app, "sample.pdf", &sample_pdf()).await;
    assert_eq!(status, StatusCode::OK);
    body["pdf_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_and_index() {
    let app = test_app().await;

    let health = app.server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(health.json::<Value>()["status"], "healthy");

    let index = app.server.get("/").await;
    index.assert_status_ok();
    assert_eq!(index.json::<Value>()["endpoints"]["upload"], "/api/pdf/upload");
}

#[tokio::test]
async fn test_upload_extracts_fields() {
    let app = test_app().await;
    let (status, body) = upload(&app, "sample.pdf", &sample_pdf()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["filename"], "sample.pdf");
    assert_eq!(body["num_pages"], 1);

    let fields = body["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[0]["id"], "field_0_0");
    assert_eq!(fields[0]["field_type"], "text");
    assert_eq!(fields[0]["label"], "Full name");
    assert_eq!(fields[1]["field_type"], "date");
    assert_eq!(fields[2]["field_type"], "checkbox");
    assert_eq!(fields[2]["checked"], true);
    assert_eq!(fields[2]["value"], "Yes");
}

#[tokio::test]
async fn test_upload_rejects_non_pdf_names_and_bad_bytes() {
    let app = test_app().await;

    let (status, body) = upload(&app, "notes.txt", b"hello").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");

    let (status, body) = upload(&app, "broken.pdf", b"not really a pdf").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_pdf");
}

#[tokio::test]
async fn test_get_list_content_and_delete() {
    let app = test_app().await;
    let original = sample_pdf();
    let (_, body) = upload(&app, "sample.pdf", &original).await;
    let pdf_id = body["pdf_id"].as_str().unwrap().to_string();

    let detail = app.server.get(&format!("/api/pdf/{}", pdf_id)).await;
    detail.assert_status_ok();
    let detail = detail.json::<Value>();
    assert_eq!(detail["fields"].as_array().unwrap().len(), 3);
    assert_eq!(detail["file_hash"].as_str().unwrap().len(), 64);

    let list = app.server.get("/api/pdf/list").await.json::<Value>();
    assert_eq!(list["pdfs"][0]["pdf_id"], pdf_id.as_str());
    assert_eq!(list["pdfs"][0]["num_fields"], 3);

    let content = app
        .server
        .get(&format!("/api/pdf/{}/content", pdf_id))
        .await
        .json::<Value>();
    assert_eq!(content["content_type"], "application/pdf");
    let decoded = STANDARD.decode(content["content"].as_str().unwrap()).unwrap();
    assert_eq!(decoded, original);

    app.server
        .delete(&format!("/api/pdf/{}", pdf_id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server
        .get(&format!("/api/pdf/{}", pdf_id))
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_pdf_is_not_found() {
    let app = test_app().await;
    for path in [
        "/api/pdf/missing",
        "/api/pdf/missing/content",
        "/api/pdf/missing/download",
    ] {
        let response = app.server.get(path).expect_failure().await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert_eq!(response.json::<Value>()["error"], "not_found");
    }

    app.server
        .post("/api/pdf/missing/field")
        .json(&json!({"field": {"name": "x", "field_type": "text", "x": 0, "y": 0, "width": 10, "height": 10, "page": 0}}))
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_field_editing_flow() {
    let app = test_app().await;
    let pdf_id = upload_sample(&app).await;

    // Partial update by id, with a legacy camelCase key
    let updated = app
        .server
        .patch(&format!("/api/pdf/{}/field/field_0_0", pdf_id))
        .json(&json!({"name": "applicant_name", "fontSize": 10}))
        .await;
    updated.assert_status_ok();
    let updated = updated.json::<Value>();
    assert_eq!(updated["name"], "applicant_name");
    assert_eq!(updated["original_name"], "full_name");
    assert_eq!(updated["font_size"], 10.0);

    // Unknown keys are rejected
    app.server
        .patch(&format!("/api/pdf/{}/field/field_0_0", pdf_id))
        .json(&json!({"colour": "red"}))
        .expect_failure()
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    // Invalid values are rejected and nothing changes
    app.server
        .patch(&format!("/api/pdf/{}/field/field_0_0", pdf_id))
        .json(&json!({"font_size": 200}))
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    // Add a new field
    let saved = app
        .server
        .post(&format!("/api/pdf/{}/field", pdf_id))
        .json(&json!({"field": {
            "name": "signature",
            "field_type": "signature",
            "x": 72, "y": 300, "width": 200, "height": 40, "page": 0
        }}))
        .await;
    saved.assert_status_ok();
    let saved = saved.json::<Value>();
    assert_eq!(saved["message"], "Field added successfully");
    assert!(saved["field"]["id"].as_str().unwrap().starts_with("field_"));

    // Bulk update by name and id
    let bulk = app
        .server
        .post(&format!("/api/pdf/{}/fields/bulk-update", pdf_id))
        .json(&json!({
            "field_ids": ["applicant_name", "field_0_1"],
            "updates": {"borderStyle": "dashed", "border_color": [1, 0, 0]}
        }))
        .await;
    bulk.assert_status_ok();
    assert_eq!(bulk.json::<Value>()["updated"], 2);

    // Delete by name, then bulk delete
    app.server
        .delete(&format!("/api/pdf/{}/field/agree", pdf_id))
        .await
        .assert_status_ok();
    app.server
        .delete(&format!("/api/pdf/{}/field/agree", pdf_id))
        .expect_failure()
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let deleted = app
        .server
        .post(&format!("/api/pdf/{}/fields/bulk-delete", pdf_id))
        .json(&json!({"field_ids": ["signature", "nothing"]}))
        .await;
    assert_eq!(deleted.json::<Value>()["deleted"], 1);

    let detail = app
        .server
        .get(&format!("/api/pdf/{}", pdf_id))
        .await
        .json::<Value>();
    let fields = detail["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0]["border_style"], "dashed");
    assert_eq!(fields[1]["border_style"], "dashed");

    // The download carries the edited form
    let download = app
        .server
        .get(&format!("/api/pdf/{}/download", pdf_id))
        .await;
    download.assert_status_ok();
    assert_eq!(download.header(header::CONTENT_TYPE), "application/pdf");
    assert!(download
        .header(header::CONTENT_DISPOSITION)
        .to_str()
        .unwrap()
        .contains("edited_sample.pdf"));

    let rebuilt = forms::extract_fields(download.as_bytes()).unwrap();
    let names: Vec<&str> = rebuilt.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["applicant_name", "date_naissance"]);
    assert_eq!(rebuilt.fields[0].font_size, 10.0);
    assert_eq!(rebuilt.fields[0].border_color, [1.0, 0.0, 0.0]);
}

#[tokio::test]
async fn test_bulk_update_requires_changes() {
    let app = test_app().await;
    let pdf_id = upload_sample(&app).await;

    app.server
        .post(&format!("/api/pdf/{}/fields/bulk-update", pdf_id))
        .json(&json!({"field_ids": ["field_0_0"], "updates": {}}))
        .expect_failure()
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_rejects_field_on_missing_page() {
    let app = test_app().await;
    let pdf_id = upload_sample(&app).await;

    app.server
        .patch(&format!("/api/pdf/{}/field/field_0_0", pdf_id))
        .json(&json!({"page": 5}))
        .await
        .assert_status_ok();

    let response = app
        .server
        .get(&format!("/api/pdf/{}/download", pdf_id))
        .expect_failure()
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["error"], "invalid_field");
}
