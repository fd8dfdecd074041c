//! Integration tests for docfinder-admin HTTP endpoints
//!
//! Each test runs the full router over a fresh SQLite root folder seeded
//! with the two sample doctors and one administrator account.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use docfinder_admin::bootstrap::initialize_database;
use docfinder_admin::{build_router, AppState, BLOB_URL_PREFIX};
use docfinder_common::blob::FsBlobStore;
use docfinder_common::db::init_database;
use docfinder_common::identity::SqliteIdentity;
use docfinder_common::store::{RecordStore, SqliteRecordStore};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use futures::StreamExt;
use tower::util::ServiceExt; // for `oneshot` method

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "s3cret";
const BOUNDARY: &str = "docfinder-test-boundary";

struct TestApp {
    _dir: tempfile::TempDir,
    state: AppState,
    router: Router,
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> axum::response::Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Sign in and return the `dfa_session=...` cookie pair
    async fn login(&self) -> String {
        let response = self
            .send(json_request(
                "POST",
                "/api/auth/login",
                json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("login sets a cookie")
            .to_str()
            .unwrap()
            .to_string();
        set_cookie.split(';').next().unwrap().to_string()
    }

    /// Wait until the roster projection has caught up with the store
    async fn wait_for_doctor_count(&self, expected: usize) {
        for _ in 0..200 {
            if self.state.roster.view().doctor_count == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "roster stuck at {} doctors, expected {}",
            self.state.roster.view().doctor_count,
            expected
        );
    }
}

/// Test helper: router over a seeded temporary root folder
async fn setup_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let pool = init_database(&dir.path().join("docfinder.db")).await.unwrap();

    let store = Arc::new(SqliteRecordStore::open(pool.clone()).await.unwrap());
    let identity = Arc::new(SqliteIdentity::new(pool, Duration::from_secs(3600)));
    identity.create_user(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

    let blob_dir = dir.path().join("blobs");
    std::fs::create_dir_all(&blob_dir).unwrap();
    let blobs = Arc::new(FsBlobStore::new(blob_dir.clone(), BLOB_URL_PREFIX));

    initialize_database(store.as_ref()).await;

    let state = AppState::new(store, identity, blobs, blob_dir, 3600);
    let router = build_router(state.clone());
    let app = TestApp {
        _dir: dir,
        state,
        router,
    };
    app.wait_for_doctor_count(2).await;
    app
}

fn test_request(method: &str, uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(
    uri: &str,
    cookie: &str,
    fields: &[(&str, &str)],
    photo: Option<(&str, &[u8])>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = photo {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{}\"\r\nContent-Type: image/png\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

const NEW_DOCTOR: &[(&str, &str)] = &[
    ("name", "Dr. Naledi Sebina"),
    ("specialty", "Pediatrician"),
    ("email", "naledi@example.com"),
    ("phone", "+267 7222 3333"),
    ("address", "Plot 44, Maun"),
    ("city", "Maun"),
    ("latitude", "-19.98"),
    ("longitude", "23.42"),
    ("experience", "6"),
    ("isAvailable", "false"),
    ("acceptsInsurance", "true"),
];

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

/// Test helper: read the next complete SSE event as (event name, JSON data)
async fn next_sse_event(
    frames: &mut axum::body::BodyDataStream,
    buffer: &mut String,
) -> (String, Value) {
    loop {
        if let Some(end) = buffer.find("\n\n") {
            let raw: String = buffer.drain(..end + 2).collect();
            let mut name = String::new();
            let mut data = String::new();
            for line in raw.lines() {
                if let Some(v) = line.strip_prefix("event:") {
                    name = v.trim().to_string();
                } else if let Some(v) = line.strip_prefix("data:") {
                    data.push_str(v.trim_start());
                }
            }
            // Keep-alive comments carry no data
            if !data.is_empty() {
                return (name, serde_json::from_str(&data).expect("SSE data is JSON"));
            }
            continue;
        }

        let chunk = tokio::time::timeout(Duration::from_secs(5), frames.next())
            .await
            .expect("SSE event should arrive")
            .expect("SSE stream still open")
            .expect("SSE chunk readable");
        buffer.push_str(std::str::from_utf8(&chunk).unwrap());
    }
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .expect("redirect has a location")
        .to_str()
        .unwrap()
}

// =============================================================================
// Health and build info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let app = setup_app().await;

    let response = app.send(test_request("GET", "/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "docfinder-admin");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo() {
    let app = setup_app().await;
    let response = app.send(test_request("GET", "/api/buildinfo", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

// =============================================================================
// Page access and sessions
// =============================================================================

#[tokio::test]
async fn test_pages_redirect_to_login_without_session() {
    let app = setup_app().await;

    for path in ["/", "/doctors", "/doctors/add", "/doctors/edit/abc", "/reports"] {
        let response = app.send(test_request("GET", path, None)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{}", path);
        assert_eq!(location(&response), "/login", "{}", path);
    }

    let response = app.send(test_request("GET", "/login", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_pages_with_session() {
    let app = setup_app().await;
    let cookie = app.login().await;

    let response = app.send(test_request("GET", "/doctors", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.send(test_request("GET", "/login", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");

    let response = app.send(test_request("GET", "/no/such/page", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_api_requires_session() {
    let app = setup_app().await;

    let response = app.send(test_request("GET", "/api/doctors", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());

    let response = app
        .send(test_request("GET", "/api/doctors", Some("dfa_session=forged")))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = setup_app().await;
    let response = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            json!({ "email": ADMIN_EMAIL, "password": "wrong" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_logout_ends_session() {
    let app = setup_app().await;
    let cookie = app.login().await;

    let response = app
        .send(test_request("POST", "/api/auth/logout", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let response = app.send(test_request("GET", "/api/dashboard", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Roster reads
// =============================================================================

#[tokio::test]
async fn test_list_and_filter_seeded_doctors() {
    let app = setup_app().await;
    let cookie = app.login().await;

    let response = app.send(test_request("GET", "/api/doctors", Some(&cookie))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["specialties"], json!(["Cardiologist", "Dentist"]));

    let response = app
        .send(test_request("GET", "/api/doctors?q=SMITH", Some(&cookie)))
        .await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["doctors"][0]["name"], "Dr. John Smith");
    assert_eq!(body["doctors"][0]["id"], "john_smith@example_com");

    let response = app
        .send(test_request("GET", "/api/doctors?specialty=Dentist", Some(&cookie)))
        .await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["doctors"][0]["name"], "Dr. Sarah Johnson");
}

#[tokio::test]
async fn test_dashboard_reports_and_specialties() {
    let app = setup_app().await;
    let cookie = app.login().await;

    let response = app.send(test_request("GET", "/api/dashboard", Some(&cookie))).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body, json!({ "doctorCount": 2, "specialtyCount": 2 }));

    let response = app.send(test_request("GET", "/api/reports", Some(&cookie))).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["summary"]["total"], 2);
    assert_eq!(body["summary"]["available"], 2);
    assert_eq!(body["byExperience"][1], json!({ "range": "6-10", "count": 2 }));

    let response = app.send(test_request("GET", "/api/specialties", Some(&cookie))).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 20);
    assert_eq!(body[0], "General Practitioner");
}

// =============================================================================
// Add / edit
// =============================================================================

#[tokio::test]
async fn test_create_doctor_with_photo() {
    let app = setup_app().await;
    let cookie = app.login().await;

    let response = app
        .send(multipart_request(
            "/api/doctors",
            &cookie,
            NEW_DOCTOR,
            Some(("face shot.png", b"fake-png")),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let doctor = extract_json(response.into_body()).await;
    assert_eq!(doctor["name"], "Dr. Naledi Sebina");
    assert_eq!(doctor["isAvailable"], false);
    assert_eq!(doctor["acceptsInsurance"], true);
    assert_eq!(doctor["experience"], 6);
    assert_eq!(doctor["location"]["latitude"], -19.98);

    let photo_url = doctor["photoUrl"].as_str().unwrap().to_string();
    assert!(photo_url.starts_with("/blobs/doctors/"));
    assert!(photo_url.ends_with("_face_shot.png"));

    let response = app.send(test_request("GET", &photo_url, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"fake-png");

    app.wait_for_doctor_count(3).await;
}

#[tokio::test]
async fn test_create_doctor_validation_errors() {
    let app = setup_app().await;
    let cookie = app.login().await;

    let response = app
        .send(multipart_request(
            "/api/doctors",
            &cookie,
            &[("specialty", "Herbalist"), ("experience", "-2")],
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = extract_json(response.into_body()).await;
    let fields: Vec<_> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap().to_string())
        .collect();
    for field in ["name", "specialty", "email", "phone", "address", "experience"] {
        assert!(fields.contains(&field.to_string()), "missing {}", field);
    }

    let stored = app.state.store.list_doctors().await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_edit_without_photo_keeps_photo() {
    let app = setup_app().await;
    let cookie = app.login().await;

    let response = app
        .send(multipart_request(
            "/api/doctors",
            &cookie,
            NEW_DOCTOR,
            Some(("portrait.png", b"png")),
        ))
        .await;
    let created = extract_json(response.into_body()).await;
    let id = created["id"].as_str().unwrap().to_string();

    let response = app
        .send(multipart_request(
            &format!("/api/doctors/{}", id),
            &cookie,
            &[("name", "Dr. Naledi Sebina-Kgari"), ("longitude", "")],
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let patch = extract_json(response.into_body()).await;
    assert!(patch["photoUrl"].is_null());

    let response = app
        .send(test_request("GET", &format!("/api/doctors/{}", id), Some(&cookie)))
        .await;
    let loaded = extract_json(response.into_body()).await;
    assert_eq!(loaded["form"]["name"], "Dr. Naledi Sebina-Kgari");
    assert_eq!(loaded["photoUrl"], created["photoUrl"]);
    // Incomplete coordinates leave the stored location alone
    assert_eq!(loaded["form"]["longitude"], "23.42");
}

#[tokio::test]
async fn test_edit_missing_doctor_is_not_found() {
    let app = setup_app().await;
    let cookie = app.login().await;

    let response = app
        .send(test_request("GET", "/api/doctors/ghost", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Doctor not found");
    assert_eq!(body["redirect"], "/doctors");
    assert_eq!(body["redirect_after_ms"], 2000);

    let response = app
        .send(multipart_request("/api/doctors/ghost", &cookie, NEW_DOCTOR, None))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Two-phase delete
// =============================================================================

async fn request_delete(app: &TestApp, cookie: &str, id: &str) -> Value {
    let response = app
        .send(test_request("POST", &format!("/api/doctors/{}/delete", id), Some(cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    extract_json(response.into_body()).await
}

#[tokio::test]
async fn test_delete_cancel_then_confirm() {
    let app = setup_app().await;
    let cookie = app.login().await;
    let id = "sarah_johnson@example_com";

    let intent = request_delete(&app, &cookie, id).await;
    assert_eq!(intent["prompt"], "Are you sure you want to delete Dr. Sarah Johnson?");
    let token = intent["token"].as_str().unwrap().to_string();

    let response = app
        .send(test_request("POST", &format!("/api/deletions/{}/cancel", token), Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.state.store.list_doctors().await.unwrap().len(), 2);

    // A cancelled token cannot be confirmed
    let response = app
        .send(test_request("POST", &format!("/api/deletions/{}/confirm", token), Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let intent = request_delete(&app, &cookie, id).await;
    let token = intent["token"].as_str().unwrap().to_string();
    let response = app
        .send(test_request("POST", &format!("/api/deletions/{}/confirm", token), Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["deleted"], id);

    assert!(app.state.store.get_doctor(id).await.unwrap().is_none());
    app.wait_for_doctor_count(1).await;
}

#[tokio::test]
async fn test_delete_unknown_doctor() {
    let app = setup_app().await;
    let cookie = app.login().await;

    let response = app
        .send(test_request("POST", "/api/doctors/ghost/delete", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Live updates
// =============================================================================

#[tokio::test]
async fn test_events_require_session() {
    let app = setup_app().await;

    let response = app.send(test_request("GET", "/api/events", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_events_push_roster_after_write() {
    let app = setup_app().await;
    let cookie = app.login().await;

    let response = app
        .send(test_request("GET", "/api/events", Some(&cookie)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let mut frames = response.into_body().into_data_stream();
    let mut buffer = String::new();

    let (name, initial) = next_sse_event(&mut frames, &mut buffer).await;
    assert_eq!(name, "RosterChanged");
    assert_eq!(initial["doctorCount"], 2);

    let created = app
        .send(multipart_request("/api/doctors", &cookie, NEW_DOCTOR, None))
        .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let (name, updated) = next_sse_event(&mut frames, &mut buffer).await;
    assert_eq!(name, "RosterChanged");
    assert_eq!(updated["doctorCount"], 3);
    assert_eq!(updated["specialtyCount"], 3);
    assert!(updated["doctors"]
        .as_array()
        .unwrap()
        .iter()
        .any(|d| d["name"] == "Dr. Naledi Sebina"));
}
