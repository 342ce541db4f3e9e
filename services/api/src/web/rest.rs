//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use notes_core::domain::{DisplayOption, ExpirationOffset, Note};
use notes_core::gateway::{CreateNote, GatewayError};
use notes_core::ports::NotePatch;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        create_note_handler,
        list_notes_handler,
        get_note_handler,
        update_note_handler,
        delete_note_handler,
    ),
    components(
        schemas(
            CreateNoteRequest,
            DisplayRequest,
            UpdateNoteRequest,
            CreateNoteResponse,
            NoteResponse,
            StatusResponse,
            ErrorResponse,
        )
    ),
    tags(
        (name = "Expirable Notes API", description = "API endpoints for scheduled, self-expiring notes.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// When a new note should become visible.
#[derive(Deserialize, Default, ToSchema)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DisplayRequest {
    /// Visible as soon as it is created.
    #[default]
    Now,
    /// Visible from a chosen instant onwards.
    Later { at: DateTime<Utc> },
}

/// The request payload for creating a note.
#[derive(Deserialize, ToSchema)]
pub struct CreateNoteRequest {
    pub content: String,
    #[serde(default)]
    pub display: DisplayRequest,
    /// How long the note stays visible: "1h", "1d" or "1w".
    pub expiration: String,
    #[serde(default)]
    pub auto_delete_after_reading: bool,
}

/// The request payload for a partial update. Absent fields are left unchanged.
#[derive(Deserialize, Default, ToSchema)]
pub struct UpdateNoteRequest {
    pub content: Option<String>,
    pub display_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_read: Option<bool>,
    pub auto_delete_after_reading: Option<bool>,
}

/// The response payload sent after successfully creating a note.
#[derive(Serialize, ToSchema)]
pub struct CreateNoteResponse {
    pub id: Uuid,
}

/// A note as returned to clients.
#[derive(Serialize, ToSchema)]
pub struct NoteResponse {
    pub id: Uuid,
    pub content: String,
    pub display_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_read: bool,
    pub auto_delete_after_reading: bool,
}

impl From<Note> for NoteResponse {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            content: note.content,
            display_at: note.display_at,
            expires_at: note.expires_at,
            is_read: note.is_read,
            auto_delete_after_reading: note.auto_delete_after_reading,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct StatusResponse {
    pub success: bool,
}

/// The body attached to every refusal and failure.
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Set on "not yet available" refusals so clients can show when the
    /// note opens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_at: Option<DateTime<Utc>>,
}

/// Maps a gateway refusal onto an HTTP status and JSON body.
fn gateway_error_response(e: GatewayError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, display_at) = match &e {
        GatewayError::Validation(_) => (StatusCode::BAD_REQUEST, None),
        GatewayError::NotFound => (StatusCode::NOT_FOUND, None),
        GatewayError::NotYetVisible { display_at } => (StatusCode::FORBIDDEN, Some(*display_at)),
        GatewayError::Expired | GatewayError::AlreadyConsumed => (StatusCode::GONE, None),
        GatewayError::StorageUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, None),
        GatewayError::Storage(_) => {
            error!("Store failure: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, None)
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
            display_at,
        }),
    )
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Create a new note.
///
/// The note becomes visible immediately or at the requested instant, and
/// expires a fixed offset after that.
#[utoipa::path(
    post,
    path = "/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = CreateNoteResponse),
        (status = 400, description = "Invalid content, display time or expiration", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn create_note_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateNoteRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let expiration = payload
        .expiration
        .parse::<ExpirationOffset>()
        .map_err(|msg| gateway_error_response(GatewayError::Validation(msg)))?;

    let request = CreateNote {
        content: payload.content,
        display: match payload.display {
            DisplayRequest::Now => DisplayOption::Now,
            DisplayRequest::Later { at } => DisplayOption::Later(at),
        },
        expiration,
        auto_delete_after_reading: payload.auto_delete_after_reading,
    };

    let id = app_state
        .gateway
        .create(request, Utc::now())
        .await
        .map_err(gateway_error_response)?;

    Ok((StatusCode::CREATED, Json(CreateNoteResponse { id })))
}

/// List every stored note.
///
/// No lifecycle filtering is applied; clients decide what to show. This is
/// an explicit contract, not an oversight.
#[utoipa::path(
    get,
    path = "/notes",
    responses(
        (status = 200, description = "All stored notes, unfiltered", body = [NoteResponse]),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_notes_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let notes = app_state
        .gateway
        .list()
        .await
        .map_err(gateway_error_response)?;

    let body: Vec<NoteResponse> = notes.into_iter().map(NoteResponse::from).collect();
    Ok(Json(body))
}

/// Fetch a single note by id.
///
/// Returns the content only while the note is visible; the first successful
/// fetch marks it as read. Outside the visibility window the handler answers
/// with a typed refusal instead.
#[utoipa::path(
    get,
    path = "/notes/{id}",
    responses(
        (status = 200, description = "The note is visible", body = NoteResponse),
        (status = 403, description = "Not yet available; `display_at` says when", body = ErrorResponse),
        (status = 404, description = "Unknown id", body = ErrorResponse),
        (status = 410, description = "Expired, or already read and deleted", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "The note id from the share link.")
    )
)]
pub async fn get_note_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let note = app_state
        .gateway
        .fetch(id, Utc::now())
        .await
        .map_err(gateway_error_response)?;

    Ok(Json(NoteResponse::from(note)))
}

/// Partially update a note.
#[utoipa::path(
    patch,
    path = "/notes/{id}",
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Fields merged into the stored note", body = StatusResponse),
        (status = 400, description = "Invalid update", body = ErrorResponse),
        (status = 404, description = "Unknown id", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "The note id.")
    )
)]
pub async fn update_note_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateNoteRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    let patch = NotePatch {
        content: payload.content,
        display_at: payload.display_at,
        expires_at: payload.expires_at,
        is_read: payload.is_read,
        auto_delete_after_reading: payload.auto_delete_after_reading,
    };

    app_state
        .gateway
        .update(id, patch)
        .await
        .map_err(gateway_error_response)?;

    Ok(Json(StatusResponse { success: true }))
}

/// Delete a note.
#[utoipa::path(
    delete,
    path = "/notes/{id}",
    responses(
        (status = 200, description = "Note deleted", body = StatusResponse),
        (status = 404, description = "Unknown id", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse)
    ),
    params(
        ("id" = Uuid, Path, description = "The note id.")
    )
)]
pub async fn delete_note_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, (StatusCode, Json<ErrorResponse>)> {
    app_state
        .gateway
        .delete(id)
        .await
        .map_err(gateway_error_response)?;

    Ok(Json(StatusResponse { success: true }))
}
