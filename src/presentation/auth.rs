use crate::domain::user::{CreateUser, LoginRequest, UserOut};
use crate::presentation::handlers::{ApiError, AppState};
use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

pub const TOKEN_TYPE: &str = "bearer";

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[instrument(skip(state, req), fields(username = %req.username))]
pub async fn register(
    state: web::Data<AppState>,
    req: web::Json<CreateUser>,
) -> Result<HttpResponse, ApiError> {
    info!("Registration request received");

    let user = state
        .auth_service
        .register_user(req.into_inner())
        .await?;

    let response = UserOut::from(user);

    info!(user_id = response.id, "User registered successfully");
    Ok(HttpResponse::Ok().json(response))
}

/// `POST /token` takes the OAuth2 password form (`username`, `password`).
#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    let token = state
        .auth_service
        .login(form.into_inner())
        .await?;

    let response = TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE.to_string(),
    };

    info!("Login successful");
    Ok(HttpResponse::Ok().json(response))
}
