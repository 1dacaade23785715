use crate::domain::error::DomainError;
use crate::domain::repository::UserRepository;
use crate::domain::user::{CreateUser, LoginRequest, User};
use crate::infrastructure::security::{TokenIssuer, hash_password, verify_password};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, trace, warn};

pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    token_issuer: TokenIssuer,
}

impl AuthService {
    pub fn new(user_repository: Arc<dyn UserRepository>, token_issuer: TokenIssuer) -> Self {
        Self {
            user_repository,
            token_issuer,
        }
    }

    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn register_user(&self, req: CreateUser) -> Result<User> {
        trace!("Starting user registration");

        if self
            .user_repository
            .find_user_by_username(&req.username)
            .await?
            .is_some()
        {
            warn!(username = %req.username, "User already exists");
            return Err(DomainError::AlreadyExists.into());
        }

        let password_hash = hash_password(&req.password).map_err(|e| {
            error!(error = %e, "Failed to hash password");
            DomainError::Internal(format!("Failed to hash password: {}", e))
        })?;

        // A concurrent registration can still win between the check above and
        // this insert; the store reports that as AlreadyExists.
        debug!(username = %req.username, "Saving user to repository");
        let user = self
            .user_repository
            .insert_user(&req.username, &password_hash)
            .await?;

        info!(
            user_id = user.id,
            username = %user.username,
            "User registered successfully"
        );

        Ok(user)
    }

    /// Returns a fresh access token. Unknown user and wrong password are
    /// reported identically.
    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn login(&self, req: LoginRequest) -> Result<String> {
        trace!("Starting login");

        let user = self
            .user_repository
            .find_user_by_username(&req.username)
            .await?
            .ok_or_else(|| {
                warn!(username = %req.username, "User not found during login");
                DomainError::InvalidCredentials
            })?;

        if !verify_password(&req.password, &user.password_hash) {
            warn!(user_id = user.id, "Invalid password during login");
            return Err(DomainError::InvalidCredentials.into());
        }

        let token = self.token_issuer.issue(&user.username).map_err(|e| {
            error!(error = %e, "Failed to generate token");
            DomainError::Internal(format!("Failed to generate token: {}", e))
        })?;

        info!(user_id = user.id, username = %user.username, "Login successful");

        Ok(token)
    }

    /// Maps a raw bearer token to the user it names. Every failure is
    /// `NotAuthenticated`; the underlying reason is only logged.
    #[instrument(skip(self, token))]
    pub async fn resolve(&self, token: &str) -> Result<User> {
        let username = self.token_issuer.verify(token).map_err(|e| {
            warn!(reason = %e, "Bearer token rejected");
            DomainError::NotAuthenticated
        })?;

        let user = self
            .user_repository
            .find_user_by_username(&username)
            .await?
            .ok_or_else(|| {
                warn!(username = %username, "Token subject no longer exists");
                DomainError::NotAuthenticated
            })?;

        debug!(user_id = user.id, "Identity resolved");
        Ok(user)
    }
}
