use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db;
use crate::services::identity::IdentityError;
use crate::state::AppState;
use crate::utils::error::AppError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub uid: Uuid,
    pub email: String,
    pub token: String,
}

/// `POST /auth/register` — creates the user at the identity provider,
/// mirrors it as a local account (profile still incomplete) and hands back a
/// login token.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    let (email, password) = validate_credentials(&body)?;

    let user = state
        .identity
        .create_user(email, password)
        .await
        .map_err(map_registration_error)?;

    let account = db::accounts::insert(&state.pool, user.uid, &user.email).await?;

    tracing::info!(account_id = %account.id, "Account registered");

    let token = state.identity.mint_token(user.uid).await.map_err(|err| {
        tracing::error!(error = %err, "Failed to mint login token");
        AppError::InternalServerError("Ocorreu um erro ao registrar o usuário.".to_string())
    })?;

    Ok(Json(RegisterResponse {
        uid: account.id,
        email: account.email,
        token,
    }))
}

fn validate_credentials(body: &RegisterRequest) -> Result<(&str, &str), AppError> {
    match (body.email.as_deref(), body.password.as_deref()) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
            Ok((email, password))
        }
        _ => Err(AppError::ValidationError(
            "Email e senha são obrigatórios.".to_string(),
        )),
    }
}

fn map_registration_error(err: IdentityError) -> AppError {
    match err {
        IdentityError::EmailExists => {
            AppError::InternalServerError("Este endereço de e-mail já está em uso.".to_string())
        }
        IdentityError::WeakPassword => AppError::InternalServerError(
            "A senha deve ter no mínimo 6 caracteres.".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "User creation failed");
            AppError::InternalServerError(
                "Ocorreu um erro ao registrar o usuário.".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_are_rejected() {
        let missing_password = RegisterRequest {
            email: Some("ana@example.com".to_string()),
            password: None,
        };
        assert!(matches!(
            validate_credentials(&missing_password),
            Err(AppError::ValidationError(_))
        ));

        let empty_email = RegisterRequest {
            email: Some(String::new()),
            password: Some("segredo1".to_string()),
        };
        assert!(matches!(
            validate_credentials(&empty_email),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn test_valid_credentials_pass_through() {
        let body = RegisterRequest {
            email: Some("ana@example.com".to_string()),
            password: Some("segredo1".to_string()),
        };
        let (email, password) = validate_credentials(&body).unwrap();
        assert_eq!(email, "ana@example.com");
        assert_eq!(password, "segredo1");
    }

    #[test]
    fn test_provider_rejections_keep_localized_messages() {
        let email = map_registration_error(IdentityError::EmailExists);
        match email {
            AppError::InternalServerError(msg) => {
                assert_eq!(msg, "Este endereço de e-mail já está em uso.")
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let weak = map_registration_error(IdentityError::WeakPassword);
        match weak {
            AppError::InternalServerError(msg) => {
                assert_eq!(msg, "A senha deve ter no mínimo 6 caracteres.")
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
