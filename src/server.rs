//! HTTP API consumed by the site and the admin panel.

use crate::admin::{upload_and_persist, AdminEditor, AdminError, Slot, UploadTarget};
use crate::config::Config;
use crate::content::{ContentDocument, ContentError, Language};
use crate::media::{ImageUpload, MediaService, UploadError, MAX_UPLOAD_BYTES};
use crate::session::{verify_password, Clock, SystemClock};
use crate::store::{ContentService, SaveError, SaveOutcome};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, DefaultBodyLimit, Multipart, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Multipart framing overhead allowed on top of the largest accepted image.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

/// Shared state for all handlers.
pub struct AppState {
    pub content: ContentService,
    pub media: MediaService,
    pub admin_password: Option<String>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            content: ContentService::from_config(config),
            media: MediaService::from_config(config),
            admin_password: config.admin_password.clone(),
            clock: Arc::new(SystemClock),
        }
    }
}

/// Error response rendered as `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<ContentError> for ApiError {
    fn from(e: ContentError) -> Self {
        ApiError::bad_request(e.to_string())
    }
}

impl From<SaveError> for ApiError {
    fn from(e: SaveError) -> Self {
        match e {
            SaveError::Invalid(e) => e.into(),
            SaveError::AllBackendsFailed(source) => {
                error!("Content save failed on every backend: {}", source);
                ApiError::internal("Failed to save content")
            }
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(e: UploadError) -> Self {
        let status = match &e {
            UploadError::MissingFile | UploadError::InvalidType(_) => StatusCode::BAD_REQUEST,
            UploadError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Local(_) | UploadError::Hosted(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError::new(status, e.to_string())
    }
}

impl From<AdminError> for ApiError {
    fn from(e: AdminError) -> Self {
        match e {
            AdminError::Upload(e) => e.into(),
            AdminError::Content(e) => e.into(),
            AdminError::Save(e) => e.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SaveResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

impl From<SaveOutcome> for SaveResponse {
    fn from(outcome: SaveOutcome) -> Self {
        match outcome {
            SaveOutcome::Saved => Self {
                success: true,
                message: None,
                warning: None,
            },
            SaveOutcome::SavedToFallback { warning } => Self {
                success: true,
                message: Some("Saved to backup storage".to_string()),
                warning: Some(warning),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    success: bool,
    url: String,
    filename: String,
    hosted: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

/// Optional destination for persisting an upload straight into the content.
#[derive(Debug, Deserialize)]
struct UploadQuery {
    language: Option<String>,
    section: Option<String>,
    field: Option<String>,
    index: Option<usize>,
}

impl UploadQuery {
    fn target(&self) -> Result<Option<UploadTarget>, ApiError> {
        match (&self.language, &self.section, &self.field) {
            (None, None, None) => Ok(None),
            (Some(language), Some(section), Some(field)) => Ok(Some(UploadTarget {
                language: Language::from_code(language)?,
                section: section.clone(),
                field: field.clone(),
                slot: self.index.map_or(Slot::Append, Slot::At),
            })),
            _ => Err(ApiError::bad_request(
                "language, section and field must be given together",
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    password: String,
}

/// Build the API router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/content", get(get_content).post(post_content))
        .route(
            "/api/upload",
            post(upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/admin/login", post(admin_login))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process exits.
pub async fn serve(config: &Config, state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn get_content(State(state): State<Arc<AppState>>) -> Json<ContentDocument> {
    Json(state.content.load().await)
}

async fn post_content(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SaveResponse>, ApiError> {
    let value: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejected content payload: {}", e);
        ApiError::bad_request("Invalid content structure")
    })?;

    let outcome = state.content.save_value(value).await.map_err(|e| {
        if let SaveError::Invalid(reason) = &e {
            warn!("Rejected content payload: {}", reason);
        }
        e
    })?;

    Ok(Json(outcome.into()))
}

async fn read_upload(mut multipart: Multipart) -> Result<ImageUpload, ApiError> {
    let multipart_error = |e: axum::extract::multipart::MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::from(UploadError::TooLarge(UPLOAD_BODY_LIMIT))
        } else {
            ApiError::bad_request(e.body_text())
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let declared_mime_type = field.content_type().unwrap_or_default().to_string();
        let original_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        return Ok(ImageUpload {
            bytes: bytes.to_vec(),
            declared_mime_type,
            original_name,
        });
    }

    Err(UploadError::MissingFile.into())
}

async fn upload(
    State(state): State<Arc<AppState>>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let target = query.target()?;
    let file = read_upload(multipart).await?;

    let Some(target) = target else {
        let stored = state.media.upload(&file).await?;
        return Ok(Json(UploadResponse {
            success: true,
            url: stored.url,
            filename: stored.filename,
            hosted: stored.hosted,
            persisted: false,
            warning: None,
        }));
    };

    let mut editor = AdminEditor::open(&state.content, target.language).await;
    let persisted =
        upload_and_persist(&mut editor, &state.media, &state.content, &file, &target).await?;

    Ok(Json(UploadResponse {
        success: true,
        warning: persisted.outcome.warning().map(str::to_string),
        url: persisted.media.url,
        filename: persisted.media.filename,
        hosted: persisted.media.hosted,
        persisted: true,
    }))
}

async fn admin_login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    if state.admin_password.is_none() {
        return Err(ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "Admin login is not configured",
        ));
    }
    if !verify_password(state.admin_password.as_deref(), &request.password) {
        warn!("Rejected admin login");
        return Err(ApiError::new(StatusCode::UNAUTHORIZED, "Invalid password"));
    }

    info!("Admin logged in");
    Ok(Json(json!({
        "success": true,
        "loginTime": state.clock.now().timestamp_millis(),
    })))
}
