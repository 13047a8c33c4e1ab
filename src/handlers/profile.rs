use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::db;
use crate::extractors::BearerToken;
use crate::handlers::authenticate;
use crate::models::account::ProfileFields;
use crate::services::asaas::NewCustomer;
use crate::state::AppState;
use crate::utils::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub message: String,
    /// Null when gateway registration failed; the reconciler retries it and
    /// the id shows up once the link heals.
    pub asaas_customer_id: Option<String>,
}

/// `POST /user/profile` — persists the buyer's full profile, then registers
/// them as a gateway customer. The gateway call is best-effort: a failure is
/// recorded on the account and the request still succeeds, with the
/// background reconciler retrying until the link is made.
pub async fn update_profile(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Json(fields): Json<ProfileFields>,
) -> Result<Json<ProfileResponse>, AppError> {
    let claims = authenticate(&state, &token).await?;

    if let Some(field) = fields.first_missing_field() {
        return Err(AppError::ValidationError(format!(
            "O campo {} é obrigatório.",
            field
        )));
    }

    let account =
        db::accounts::update_profile(&state.pool, claims.uid, &claims.email, &fields).await?;

    // Resubmissions keep the customer already registered at the gateway.
    if let Some(existing) = account.gateway_customer_id.clone() {
        return Ok(Json(ProfileResponse {
            message: "Perfil atualizado com sucesso!".to_string(),
            asaas_customer_id: Some(existing),
        }));
    }

    let mut customer_id = None;
    if let Some(payload) = NewCustomer::from_account(&account) {
        match state.asaas.create_customer(&payload).await {
            Ok(id) => {
                db::accounts::link_customer(&state.pool, account.id, &id).await?;
                tracing::info!(account_id = %account.id, customer_id = %id, "Gateway customer linked");
                customer_id = Some(id);
            }
            Err(err) => {
                tracing::error!(
                    account_id = %account.id,
                    error = %err,
                    "Gateway customer registration failed, deferring to reconciler"
                );
                db::accounts::mark_link_failed(&state.pool, account.id).await?;
            }
        }
    }

    Ok(Json(ProfileResponse {
        message: "Perfil atualizado com sucesso!".to_string(),
        asaas_customer_id: customer_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message_names_the_field() {
        let fields = ProfileFields {
            full_name: Some("Ana Souza".to_string()),
            ..ProfileFields::default()
        };

        let field = fields.first_missing_field().unwrap();
        let message = format!("O campo {} é obrigatório.", field);
        assert_eq!(message, "O campo phone é obrigatório.");
    }

    #[test]
    fn test_response_serializes_null_customer_id() {
        let response = ProfileResponse {
            message: "Perfil atualizado com sucesso!".to_string(),
            asaas_customer_id: None,
        };
        let encoded = serde_json::to_value(&response).unwrap();
        assert!(encoded["asaasCustomerId"].is_null());
    }
}
