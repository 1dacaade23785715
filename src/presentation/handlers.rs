use crate::application::auth_service::AuthService;
use crate::application::note_service::NoteService;
use crate::domain::error::DomainError;
use crate::domain::note::{CreateNote, Page};
use crate::presentation::middleware::{CurrentUser, bearer_token};
use actix_web::error::{JsonPayloadError, QueryPayloadError, UrlencodedError};
use actix_web::http::{StatusCode, header};
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::Serialize;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub note_service: Arc<NoteService>,
}

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Spelling errors found")]
    Spelling {
        title_errors: Vec<String>,
        content_errors: Vec<String>,
    },
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Spelling { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        let details = match self {
            ApiError::Validation(msg) | ApiError::Unauthorized(msg) => {
                serde_json::json!({ "message": msg })
            }
            ApiError::Spelling {
                title_errors,
                content_errors,
            } => serde_json::json!({
                "message": "Spelling errors found",
                "title_errors": title_errors,
                "content_errors": content_errors,
            }),
            // store and internal failures are logged, not echoed
            ApiError::Database(_) | ApiError::Internal(_) => {
                serde_json::json!({ "message": "Internal server error" })
            }
        };

        match self {
            ApiError::Validation(_) | ApiError::Spelling { .. } => {
                warn!(error = %error_msg, status = %status, "Validation error")
            }
            ApiError::Unauthorized(_) => {
                warn!(error = %error_msg, status = %status, "Unauthorized")
            }
            ApiError::Database(_) => {
                error!(error = %error_msg, status = %status, "Database error")
            }
            ApiError::Internal(_) => {
                error!(error = %error_msg, status = %status, "Internal error")
            }
        }

        let error_response = ErrorResponse {
            error: match self {
                ApiError::Database(_) | ApiError::Internal(_) => {
                    "Internal server error".to_string()
                }
                _ => error_msg,
            },
            details,
        };

        let mut builder = HttpResponse::build(status);
        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(error_response)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::AlreadyExists) => {
                ApiError::Validation("Username already registered".to_string())
            }
            Some(DomainError::InvalidCredentials) => {
                ApiError::Unauthorized("Incorrect username or password".to_string())
            }
            Some(DomainError::NotAuthenticated) => {
                ApiError::Unauthorized("Could not validate credentials".to_string())
            }
            Some(DomainError::Spelling {
                title_errors,
                content_errors,
            }) => ApiError::Spelling {
                title_errors: title_errors.clone(),
                content_errors: content_errors.clone(),
            },
            Some(DomainError::Internal(msg)) => ApiError::Internal(msg.clone()),
            None => ApiError::Database(err.to_string()),
        }
    }
}

// Body and query extraction failures render through `ApiError` like every other 400
pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(err.to_string()).into()
}

pub fn form_error_handler(err: UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(err.to_string()).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    ApiError::Validation(err.to_string()).into()
}

// Resolves the caller from `Authorization: Bearer <token>` on every protected request
impl FromRequest for CurrentUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(
        req: &HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);
        Box::pin(async move {
            let state = state
                .ok_or_else(|| ApiError::Internal("Application state not configured".to_string()))?;
            let token = token.ok_or_else(|| {
                warn!("Missing or malformed bearer token");
                ApiError::Unauthorized("Not authenticated".to_string())
            })?;
            let user = state.auth_service.resolve(&token).await?;
            Ok(CurrentUser(user))
        })
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[instrument(skip(state, user, req), fields(owner_id = user.0.id))]
pub async fn create_note(
    state: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<CreateNote>,
) -> Result<HttpResponse, ApiError> {
    info!(title = %req.title, "Creating note");
    let note = state
        .note_service
        .create_note(&user.0, req.into_inner())
        .await?;
    info!(note_id = note.id, "Note created successfully");
    Ok(HttpResponse::Ok().json(note))
}

#[instrument(skip(state, user), fields(owner_id = user.0.id))]
pub async fn list_notes(
    state: web::Data<AppState>,
    user: CurrentUser,
    page: web::Query<Page>,
) -> Result<HttpResponse, ApiError> {
    let page = page.into_inner();
    let notes = state
        .note_service
        .list_notes(&user.0, page)
        .await?;
    info!(count = notes.len(), skip = page.skip, limit = page.limit, "Notes listed");
    Ok(HttpResponse::Ok().json(notes))
}
