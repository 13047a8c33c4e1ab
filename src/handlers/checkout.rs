use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db;
use crate::extractors::BearerToken;
use crate::handlers::authenticate;
use crate::models::account::Account;
use crate::models::order::CartItem;
use crate::services::asaas::{
    AsaasError, ChargeRequest, CreditCard, CreditCardHolderInfo, BILLING_CREDIT_CARD, BILLING_PIX,
};
use crate::state::AppState;
use crate::utils::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub payment_method: Option<String>,
    pub total_value: Option<Decimal>,
    #[serde(default)]
    pub cart: Vec<CartItem>,
    pub credit_card: Option<CreditCard>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PixCheckoutResponse {
    pub qr_code: String,
    pub payload: String,
    pub expiration_date: Option<String>,
}

/// `POST /checkout` — creates the charge at the gateway and persists the
/// pending order the webhook will later confirm. PIX answers with the QR
/// payload; card answers with the gateway's raw charge object.
pub async fn checkout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
    Json(body): Json<CheckoutRequest>,
) -> Result<Response, AppError> {
    let claims = authenticate(&state, &token).await?;

    let account = db::accounts::find(&state.pool, claims.uid)
        .await?
        .ok_or_else(missing_customer)?;
    let Some(customer_id) = account.gateway_customer_id.clone() else {
        return Err(missing_customer());
    };

    let (Some(method), Some(total)) = (body.payment_method.as_deref(), body.total_value) else {
        return Err(AppError::ValidationError(
            "Método de pagamento e valor total são obrigatórios.".to_string(),
        ));
    };
    if total <= Decimal::ZERO {
        return Err(AppError::ValidationError(
            "O valor total deve ser maior que zero.".to_string(),
        ));
    }

    match method {
        BILLING_PIX => pix_checkout(&state, &account, customer_id, total, &body.cart)
            .await
            .map(IntoResponse::into_response),
        BILLING_CREDIT_CARD => {
            card_checkout(
                &state,
                &account,
                customer_id,
                total,
                &body.cart,
                body.credit_card,
            )
            .await
        }
        _ => Err(AppError::ValidationError(
            "Método de pagamento não suportado.".to_string(),
        )),
    }
}

async fn pix_checkout(
    state: &AppState,
    account: &Account,
    customer_id: String,
    total: Decimal,
    cart: &[CartItem],
) -> Result<Json<PixCheckoutResponse>, AppError> {
    let request = ChargeRequest {
        customer: customer_id,
        billing_type: BILLING_PIX.to_string(),
        value: total,
        due_date: due_date_one_day_ahead(Utc::now()),
        description: order_description(account),
        credit_card: None,
        credit_card_holder_info: None,
    };

    let charge = state
        .asaas
        .create_charge(&request)
        .await
        .map_err(|err| charge_error(err, "Falha ao gerar cobrança PIX."))?;

    let qr = state
        .asaas
        .pix_qr_code(&charge.id)
        .await
        .map_err(|err| charge_error(err, "Falha ao obter QR Code do PIX."))?;

    let order = db::orders::insert_pending(
        &state.pool,
        account.id,
        cart,
        total,
        &charge.id,
        charge.status.as_deref(),
    )
    .await?;

    tracing::info!(
        order_id = %order.id,
        charge_id = %charge.id,
        "PIX charge created, awaiting confirmation"
    );

    Ok(Json(PixCheckoutResponse {
        qr_code: qr.encoded_image,
        payload: qr.payload,
        expiration_date: charge.due_date,
    }))
}

async fn card_checkout(
    state: &AppState,
    account: &Account,
    customer_id: String,
    total: Decimal,
    cart: &[CartItem],
    card: Option<CreditCard>,
) -> Result<Response, AppError> {
    let Some(card) = card else {
        return Err(AppError::ValidationError(
            "Dados do cartão de crédito são obrigatórios.".to_string(),
        ));
    };

    let holder_info = CreditCardHolderInfo {
        name: account.full_name.clone().unwrap_or_default(),
        email: account.email.clone(),
        cpf_cnpj: account.cpf_cnpj.clone().unwrap_or_default(),
        postal_code: account.postal_code.clone().unwrap_or_default(),
        address_number: account.address_number.clone().unwrap_or_default(),
        phone: account.phone.clone().unwrap_or_default(),
    };

    let request = ChargeRequest {
        customer: customer_id,
        billing_type: BILLING_CREDIT_CARD.to_string(),
        value: total,
        due_date: due_date_one_day_ahead(Utc::now()),
        description: order_description(account),
        credit_card: Some(card),
        credit_card_holder_info: Some(holder_info),
    };

    let charge = state
        .asaas
        .create_charge(&request)
        .await
        .map_err(|err| charge_error(err, "Falha ao processar pagamento com cartão."))?;

    let order = db::orders::insert_pending(
        &state.pool,
        account.id,
        cart,
        total,
        &charge.id,
        charge.status.as_deref(),
    )
    .await?;

    tracing::info!(
        order_id = %order.id,
        charge_id = %charge.id,
        status = ?charge.status,
        "Card charge created, awaiting confirmation"
    );

    Ok(Json(charge.raw).into_response())
}

fn order_description(account: &Account) -> String {
    let buyer = account
        .full_name
        .clone()
        .unwrap_or_else(|| account.email.clone());
    format!("Pedido de {}", buyer)
}

fn missing_customer() -> AppError {
    AppError::NotFound("Perfil de usuário ou ID de cliente Asaas não encontrado.".to_string())
}

/// Charges fall due one day after checkout, in the gateway's date format.
fn due_date_one_day_ahead(now: DateTime<Utc>) -> String {
    (now + Duration::days(1)).format("%Y-%m-%d").to_string()
}

fn charge_error(err: AsaasError, message: &str) -> AppError {
    match err {
        AsaasError::Rejected { details, .. } => AppError::UpstreamError {
            message: message.to_string(),
            details: Some(details),
        },
        AsaasError::MissingId => AppError::InternalServerError(
            "ID do pagamento não retornado pelo Asaas.".to_string(),
        ),
        AsaasError::Request(_) => AppError::UpstreamError {
            message: message.to_string(),
            details: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_due_date_is_one_day_ahead() {
        let now = Utc.with_ymd_and_hms(2026, 8, 8, 15, 30, 0).unwrap();
        assert_eq!(due_date_one_day_ahead(now), "2026-08-09");

        let month_end = Utc.with_ymd_and_hms(2026, 8, 31, 23, 0, 0).unwrap();
        assert_eq!(due_date_one_day_ahead(month_end), "2026-09-01");
    }

    #[test]
    fn test_request_accepts_storefront_body() {
        let body: CheckoutRequest = serde_json::from_value(json!({
            "paymentMethod": "PIX",
            "totalValue": 129.90,
            "cart": [{"id": "3", "name": "Pulseira Day Pass", "quantity": 1}]
        }))
        .unwrap();

        assert_eq!(body.payment_method.as_deref(), Some("PIX"));
        assert_eq!(body.cart.len(), 1);
        assert!(body.credit_card.is_none());
    }

    #[test]
    fn test_request_tolerates_missing_fields() {
        let body: CheckoutRequest = serde_json::from_value(json!({})).unwrap();
        assert!(body.payment_method.is_none());
        assert!(body.total_value.is_none());
        assert!(body.cart.is_empty());
    }

    #[test]
    fn test_gateway_rejection_forwards_details() {
        let rejection = AsaasError::Rejected {
            status: 400,
            details: json!({"errors": [{"code": "invalid_creditCard", "description": "ccv inválido"}]}),
        };

        match charge_error(rejection, "Falha ao processar pagamento com cartão.") {
            AppError::UpstreamError { message, details } => {
                assert_eq!(message, "Falha ao processar pagamento com cartão.");
                let details = details.unwrap();
                assert_eq!(details["errors"][0]["code"], json!("invalid_creditCard"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_missing_charge_id_is_internal() {
        let err = charge_error(AsaasError::MissingId, "Falha ao gerar cobrança PIX.");
        assert!(matches!(err, AppError::InternalServerError(_)));
    }
}
