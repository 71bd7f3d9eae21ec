//! Integration tests driving the workflows against a mock slot service.
//!
//! Spins up an axum server on an ephemeral port with the four endpoints the
//! client talks to, then exercises bootstrap, save, template upload, test
//! run, and the auth failure path end to end.

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use bytes::Bytes;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use slotbox::auth::{MemoryTokenStore, TokenStore};
use slotbox::client::SlotClient;
use slotbox::config::Config;
use slotbox::mapping::Control;
use slotbox::media::{BindingState, MediaFile};
use slotbox::observability::Metrics;
use slotbox::workflow::{SlotWorkflow, WorkflowError};

/// Requests the mock service captured, for assertions after the fact.
#[derive(Debug, Default)]
struct Received {
    authorization: Option<String>,
    save_payload: Option<Value>,
    upload_parts: Vec<(String, String)>,
    test_payload: Option<Value>,
    test_image_name: Option<String>,
}

#[derive(Clone, Default)]
struct ServerState {
    received: Arc<Mutex<Received>>,
}

async fn get_slot(State(state): State<ServerState>, headers: HeaderMap) -> Json<Value> {
    state.received.lock().unwrap().authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    Json(json!({
        "slot": {
            "slot_id": "slot-000",
            "display_name": "Persisted slot",
            "provider": "gemini-3-pro",
            "operation": "image_edit",
            "settings": {
                "prompt": "persisted prompt",
                "output": {"mime_type": "image/png", "size": "2752x1536"}
            },
            "template_media": [],
            "recent_results": [
                {
                    "thumbnail_url": "https://svc.example.com/thumbs/r-1.png",
                    "download_url": "https://svc.example.com/results/r-1.png",
                    "mime": "image/png"
                }
            ]
        }
    }))
}

async fn put_slot(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    state.received.lock().unwrap().save_payload = Some(body.clone());

    if body["settings"]["prompt"] == "bad prompt" {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "detail": [
                    {"loc": ["body", "slot_payload", "settings", "prompt"], "msg": "prompt is too short"},
                    {"loc": ["body", "mystery"], "msg": "no such field"}
                ]
            })),
        );
    }

    if body["settings"]["prompt"] == "echo garbage" {
        return (StatusCode::OK, Json(Value::Null));
    }

    // Echo the slot back with a server-assigned display name suffix.
    let echoed = json!({
        "slot": {
            "slot_id": body["slot_id"],
            "display_name": body["display_name"],
            "provider": body["provider"],
            "operation": body["operation"],
            "settings": body["settings"],
            "template_media": body["template_media"]
        }
    });
    (StatusCode::OK, Json(echoed))
}

async fn upload_media(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Json<Value> {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let value = match field.file_name() {
            Some(file_name) => file_name.to_string(),
            None => field.text().await.unwrap_or_default(),
        };
        state.received.lock().unwrap().upload_parts.push((name, value));
    }
    Json(json!({"media_object_id": "m-123"}))
}

async fn run_test(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> Json<Value> {
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "slot_payload" => {
                let text = field.text().await.unwrap();
                state.received.lock().unwrap().test_payload =
                    Some(serde_json::from_str(&text).unwrap());
            }
            "test_image" => {
                state.received.lock().unwrap().test_image_name =
                    field.file_name().map(String::from);
            }
            _ => {}
        }
    }
    Json(json!({"status": "queued", "job_id": "job-1"}))
}

async fn start_mock_service(state: ServerState) -> String {
    let app = Router::new()
        .route("/api/slot", get(get_slot).put(put_slot))
        .route("/api/media", post(upload_media))
        .route("/api/test", post(run_test))
        .with_state(state);
    serve(app).await
}

async fn start_unauthorized_service() -> String {
    let app = Router::new().fallback(|| async { StatusCode::UNAUTHORIZED });
    serve(app).await
}

async fn serve(app: Router) -> String {
    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    let bound_addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", bound_addr)
}

fn config_for(base: &str) -> Config {
    let mut config = Config::default();
    config.service.slot_api = format!("{base}/api/slot");
    config.service.template_upload = format!("{base}/api/media");
    config.service.test_run = format!("{base}/api/test");
    config
}

fn workflow_for(config: &Config, tokens: Arc<MemoryTokenStore>) -> SlotWorkflow {
    let client = SlotClient::new(config, tokens).unwrap();
    SlotWorkflow::new(config, client, Arc::new(Metrics::new()))
}

fn png(name: &str) -> MediaFile {
    MediaFile::new(
        name,
        Some("image/png".to_string()),
        Bytes::from_static(b"\x89PNG fake bytes"),
    )
}

#[tokio::test]
async fn bootstrap_hydrates_the_session_and_sends_the_bearer_token() {
    let state = ServerState::default();
    let base = start_mock_service(state.clone()).await;
    let config = config_for(&base);
    let mut workflow = workflow_for(&config, Arc::new(MemoryTokenStore::with_token("tok-1")));

    let details = workflow.bootstrap().await.unwrap();

    assert_eq!(workflow.session.meta.provider, "gemini-3-pro");
    assert_eq!(workflow.session.meta.operation, "image_edit");
    assert_eq!(workflow.session.draft.title, "Persisted slot");
    assert_eq!(workflow.session.draft.prompt, "persisted prompt");
    // 2752x1536 maps back to its aspect/resolution pair.
    assert_eq!(workflow.session.draft.aspect_ratio, "16:9");
    assert_eq!(workflow.session.draft.resolution, "2K");
    assert_eq!(
        details.latest_result().unwrap().download_url.as_deref(),
        Some("https://svc.example.com/results/r-1.png")
    );

    let received = state.received.lock().unwrap();
    assert_eq!(received.authorization.as_deref(), Some("Bearer tok-1"));
}

#[tokio::test]
async fn save_sends_the_mapped_settings_and_applies_the_server_echo() {
    let state = ServerState::default();
    let base = start_mock_service(state.clone()).await;
    let config = config_for(&base);
    let mut workflow = workflow_for(&config, Arc::new(MemoryTokenStore::with_token("tok-1")));

    workflow.bootstrap().await.unwrap();
    workflow.session.draft.title = "Edited slot".to_string();
    workflow.session.draft.prompt = "make it dramatic".to_string();
    workflow.session.draft.aspect_ratio = "9:16".to_string();
    workflow.session.draft.resolution = "4K".to_string();

    workflow.save().await.unwrap();

    {
        let received = state.received.lock().unwrap();
        let payload = received.save_payload.as_ref().unwrap();
        assert_eq!(payload["slot_id"], "slot-000");
        assert_eq!(payload["display_name"], "Edited slot");
        assert_eq!(payload["is_active"], true);
        assert_eq!(payload["size_limit_mb"], 15);
        assert_eq!(payload["sync_response_seconds"], 48);
        assert_eq!(payload["settings"]["output"]["size"], "3072x5504");
        assert_eq!(payload["settings"]["output"]["mime_type"], "image/png");
    }

    // The echo is authoritative and round-trips through hydration.
    assert_eq!(workflow.session.draft.title, "Edited slot");
    assert_eq!(workflow.session.draft.aspect_ratio, "9:16");
    assert_eq!(workflow.session.draft.resolution, "4K");

    // A second save from the hydrated state keeps working.
    workflow.session.draft.resolution = "1K".to_string();
    workflow.save().await.unwrap();
    assert_eq!(workflow.session.draft.resolution, "1K");
    assert_eq!(workflow.metrics().snapshot().saves_completed, 2);
}

#[tokio::test]
async fn rejected_save_attributes_issues_and_leaves_the_meta_untouched() {
    let state = ServerState::default();
    let base = start_mock_service(state.clone()).await;
    let config = config_for(&base);
    let mut workflow = workflow_for(&config, Arc::new(MemoryTokenStore::with_token("tok-1")));

    workflow.bootstrap().await.unwrap();
    workflow.session.draft.prompt = "bad prompt".to_string();
    let meta_before = workflow.session.meta.clone();

    let err = workflow.save().await.unwrap_err();
    let WorkflowError::Fields(fields) = err else {
        panic!("expected field errors, got {err:?}");
    };
    assert_eq!(fields.len(), 2);
    assert_eq!(fields[0].control, Some(Control::Prompt));
    assert_eq!(fields[0].issue.field_path, "slot_payload.settings.prompt");
    assert_eq!(fields[0].issue.message, "prompt is too short");
    assert_eq!(fields[1].control, None);

    assert_eq!(workflow.session.meta, meta_before);
    assert_eq!(workflow.metrics().snapshot().saves_rejected, 1);
}

#[tokio::test]
async fn malformed_save_echo_errors_and_keeps_the_local_draft() {
    let state = ServerState::default();
    let base = start_mock_service(state.clone()).await;
    let config = config_for(&base);
    let mut workflow = workflow_for(&config, Arc::new(MemoryTokenStore::with_token("tok-1")));

    workflow.bootstrap().await.unwrap();
    workflow.session.draft.title = "Edited title".to_string();
    workflow.session.draft.prompt = "echo garbage".to_string();

    let err = workflow.save().await.unwrap_err();
    assert!(matches!(err, WorkflowError::Transport(_)));

    // A 2xx response without a slot body must not blank the draft.
    assert_eq!(workflow.session.draft.title, "Edited title");
    assert_eq!(workflow.session.draft.prompt, "echo garbage");
    assert_eq!(workflow.metrics().snapshot().saves_completed, 0);
}

#[tokio::test]
async fn save_uploads_a_pending_template_and_binds_the_returned_id() {
    let state = ServerState::default();
    let base = start_mock_service(state.clone()).await;
    let config = config_for(&base);
    let mut workflow = workflow_for(&config, Arc::new(MemoryTokenStore::with_token("tok-1")));

    workflow.bootstrap().await.unwrap();
    workflow
        .session
        .template
        .attach(png("style.png"), config.slot.upload_limit)
        .unwrap();

    workflow.save().await.unwrap();

    {
        let received = state.received.lock().unwrap();
        assert!(received.upload_parts.contains(&("slot_id".to_string(), "slot-000".to_string())));
        assert!(received
            .upload_parts
            .contains(&("media_kind".to_string(), "style_reference".to_string())));
        assert!(received.upload_parts.contains(&("file".to_string(), "style.png".to_string())));

        let payload = received.save_payload.as_ref().unwrap();
        assert_eq!(payload["template_media"][0]["media_object_id"], "m-123");
        assert_eq!(payload["template_media"][0]["media_kind"], "style_reference");
    }

    assert_eq!(
        workflow.session.template.state(),
        &BindingState::Bound("m-123".to_string())
    );
    assert_eq!(workflow.metrics().snapshot().uploads_completed, 1);
}

#[tokio::test]
async fn test_run_submits_multipart_without_mutating_the_slot() {
    let state = ServerState::default();
    let base = start_mock_service(state.clone()).await;
    let config = config_for(&base);
    let mut workflow = workflow_for(&config, Arc::new(MemoryTokenStore::with_token("tok-1")));

    workflow.bootstrap().await.unwrap();
    workflow
        .session
        .test_image
        .attach(png("probe.png"), config.slot.upload_limit)
        .unwrap();
    let meta_before = workflow.session.meta.clone();

    let ack = workflow.test_run().await.unwrap();
    assert_eq!(ack["status"], "queued");

    {
        let received = state.received.lock().unwrap();
        let payload = received.test_payload.as_ref().unwrap();
        assert_eq!(payload["provider"], "gemini-3-pro");
        assert_eq!(payload["operation"], "image_edit");
        assert_eq!(payload["settings"]["prompt"], "persisted prompt");
        assert_eq!(received.test_image_name.as_deref(), Some("probe.png"));
    }

    // A test run never changes the confirmed slot, and the file stays
    // attached for a retry.
    assert_eq!(workflow.session.meta, meta_before);
    assert!(workflow.session.test_image.pending_file().is_some());
    assert_eq!(workflow.metrics().snapshot().test_runs_submitted, 1);
}

#[tokio::test]
async fn unauthorized_responses_clear_the_stored_token() {
    let base = start_unauthorized_service().await;
    let config = config_for(&base);
    let tokens = Arc::new(MemoryTokenStore::with_token("expired"));
    let mut workflow = workflow_for(&config, tokens.clone());

    let err = workflow.bootstrap().await.unwrap_err();
    assert!(matches!(err, WorkflowError::AuthRequired));
    assert!(tokens.token().is_none());
}
