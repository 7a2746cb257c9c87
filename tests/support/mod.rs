//! In-process stub of the rubric backend.
//!
//! Records every multipart field it receives and answers with canned replies,
//! so tests can drive the real `HttpRubricApi` over loopback.

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use rubric_client::{ClientConfig, ImageFile};
use serde_json::Value;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Debug)]
pub enum Reply {
    Json(StatusCode, Value),
    Text(StatusCode, &'static str),
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Json(status, body) => (status, Json(body)).into_response(),
            Reply::Text(status, body) => (status, body).into_response(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ReceivedField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl ReceivedField {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

#[derive(Clone, Debug)]
pub struct ReceivedCall {
    pub path: &'static str,
    pub fields: Vec<ReceivedField>,
}

impl ReceivedCall {
    pub fn named(&self, name: &str) -> Vec<&ReceivedField> {
        self.fields.iter().filter(|f| f.name == name).collect()
    }
}

#[derive(Clone)]
struct StubState {
    generate: Reply,
    next: Reply,
    calls: Arc<Mutex<Vec<ReceivedCall>>>,
}

pub struct StubBackend {
    pub base_url: String,
    pub calls: Arc<Mutex<Vec<ReceivedCall>>>,
}

impl StubBackend {
    pub async fn start(generate: Reply, next: Reply) -> Self {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let state = StubState { generate, next, calls: calls.clone() };
        let app = Router::new()
            .route("/api/generate", post(generate_handler))
            .route("/api/next", post(next_handler))
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
        let addr = listener.local_addr().expect("stub addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub server");
        });
        Self { base_url: format!("http://{addr}"), calls }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig { base_url: self.base_url.clone(), ..ClientConfig::default() }
    }

    pub async fn calls(&self) -> Vec<ReceivedCall> {
        self.calls.lock().await.clone()
    }
}

/// A base URL nothing listens on.
pub async fn dead_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

pub fn success(request_id: &str, rubric: Value) -> Reply {
    Reply::Json(
        StatusCode::OK,
        serde_json::json!({ "request_id": request_id, "rubric": rubric, "subject": "math" }),
    )
}

pub fn cleared(request_id: &str) -> Reply {
    Reply::Json(
        StatusCode::OK,
        serde_json::json!({ "message": "Session cleared successfully", "request_id": request_id }),
    )
}

pub fn failure(status: StatusCode, detail: &str) -> Reply {
    Reply::Json(status, serde_json::json!({ "detail": detail }))
}

pub fn png(name: &str) -> ImageFile {
    ImageFile::new(name, "image/png", name.as_bytes().to_vec())
}

async fn record(calls: &Mutex<Vec<ReceivedCall>>, path: &'static str, mut multipart: Multipart) {
    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        fields.push(ReceivedField { name, file_name, content_type, data });
    }
    calls.lock().await.push(ReceivedCall { path, fields });
}

async fn generate_handler(State(state): State<StubState>, multipart: Multipart) -> Reply {
    record(&state.calls, "/api/generate", multipart).await;
    state.generate.clone()
}

async fn next_handler(State(state): State<StubState>, multipart: Multipart) -> Reply {
    record(&state.calls, "/api/next", multipart).await;
    state.next.clone()
}
