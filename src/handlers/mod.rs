use axum::Json;
use serde::Serialize;

use crate::state::AppState;
use crate::services::identity::TokenClaims;
use crate::utils::error::AppError;

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod profile;
pub mod tickets;
pub mod webhook;

#[derive(Serialize)]
pub struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check() -> Json<HealthPayload> {
    Json(HealthPayload {
        status: "ok",
        service: "impulso-api",
    })
}

/// Verifies a bearer token with the identity provider. A provider rejection
/// is a 403; only the missing/malformed header case (handled by the
/// `BearerToken` extractor) is a 401.
pub(crate) async fn authenticate(state: &AppState, token: &str) -> Result<TokenClaims, AppError> {
    state.identity.verify_token(token).await.map_err(|err| {
        tracing::warn!(error = %err, "Token verification failed");
        AppError::Forbidden("Token inválido ou expirado.".to_string())
    })
}
