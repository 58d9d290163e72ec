//! Test server for exercising the client over real HTTP.
//!
//! Routes:
//! - `GET /search` echoes the query string as a list of pairs.
//! - `ANY /echo` echoes method, content type and body.
//! - `GET /text`, `/bytes`, `/malformed`, `/empty` return fixed bodies with
//!   specific content types.
//! - `GET /big` returns an 11 MiB octet stream.
//! - `GET /moved` redirects to `/malformed`.
//! - `/notes` is a small in-memory JSON resource.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct NewNote {
    pub title: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize)]
pub struct UpdateNote {
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// What `/echo` saw.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub content_type: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
    pub body_len: usize,
}

/// What `/search` saw.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pairs {
    pub pairs: Vec<(String, String)>,
}

#[derive(Default)]
pub struct Store {
    next_id: AtomicU64,
    notes: RwLock<HashMap<u64, Note>>,
}

pub type Db = Arc<Store>;

/// Length of the `/big` body: past common 10 MiB client read caps.
pub const BIG_BODY_LEN: usize = 11 * 1024 * 1024;

/// Byte `i` of the `/big` body.
pub fn big_body_byte(i: usize) -> u8 {
    (i % 251) as u8
}

pub fn app() -> Router {
    let db: Db = Arc::new(Store::default());
    Router::new()
        .route("/search", get(search))
        .route("/echo", any(echo))
        .route("/text", get(text))
        .route("/bytes", get(raw_bytes))
        .route("/big", get(big))
        .route("/moved", get(moved))
        .route("/malformed", get(malformed))
        .route("/empty", get(empty))
        .route("/notes", post(create_note))
        .route("/notes/{id}", get(get_note).put(update_note).delete(delete_note))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn search(Query(pairs): Query<Vec<(String, String)>>) -> Json<Pairs> {
    Json(Pairs { pairs })
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    tracing::debug!(%method, len = body.len(), "echo");
    Json(Echo {
        method: method.to_string(),
        content_type: header_text(header::CONTENT_TYPE),
        authorization: header_text(header::AUTHORIZATION),
        body: String::from_utf8_lossy(&body).into_owned(),
        body_len: body.len(),
    })
}

async fn text() -> &'static str {
    "hello"
}

async fn raw_bytes() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        vec![0u8, 1, 2, 254, 255],
    )
}

async fn big() -> impl IntoResponse {
    let body: Vec<u8> = (0..BIG_BODY_LEN).map(big_body_byte).collect();
    ([(header::CONTENT_TYPE, "application/octet-stream")], body)
}

async fn moved() -> Redirect {
    Redirect::temporary("/malformed")
}

async fn malformed() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], r#"{"a":"#)
}

async fn empty() -> Json<serde_json::Value> {
    Json(serde_json::json!({}))
}

async fn create_note(State(db): State<Db>, Json(input): Json<NewNote>) -> (StatusCode, Json<Note>) {
    let note = Note {
        id: db.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        title: input.title,
        tags: input.tags,
    };
    db.notes.write().await.insert(note.id, note.clone());
    (StatusCode::CREATED, Json(note))
}

async fn get_note(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Note>, StatusCode> {
    let notes = db.notes.read().await;
    notes.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_note(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateNote>,
) -> Result<Json<Note>, StatusCode> {
    let mut notes = db.notes.write().await;
    let note = notes.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = input.title {
        note.title = title;
    }
    if let Some(tags) = input.tags {
        note.tags = tags;
    }
    Ok(Json(note.clone()))
}

async fn delete_note(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Note>, StatusCode> {
    let mut notes = db.notes.write().await;
    notes.remove(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}
