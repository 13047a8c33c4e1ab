use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use crate::db;
use crate::models::ticket::expand_cart;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{message, ApiMessage};

pub const EVENT_PAYMENT_CONFIRMED: &str = "PAYMENT_CONFIRMED";
pub const EVENT_PAYMENT_RECEIVED: &str = "PAYMENT_RECEIVED";

/// Header the gateway echoes the configured shared secret in.
const ACCESS_TOKEN_HEADER: &str = "asaas-access-token";

const ACK_RECEIVED: &str = "Webhook recebido com sucesso.";
const ACK_UNKNOWN_CHARGE: &str = "Pagamento não encontrado, mas webhook recebido.";

#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    pub event: Option<String>,
    pub payment: Option<WebhookPayment>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayment {
    pub id: String,
    pub status: Option<String>,
}

impl WebhookEnvelope {
    /// The embedded payment, but only for confirmation events. Everything
    /// else is acknowledged without touching storage.
    pub fn confirmation(&self) -> Option<&WebhookPayment> {
        match self.event.as_deref() {
            Some(EVENT_PAYMENT_CONFIRMED) | Some(EVENT_PAYMENT_RECEIVED) => self.payment.as_ref(),
            _ => None,
        }
    }
}

/// `POST /webhook/asaas` — turns a confirmed charge into redeemable tickets.
/// Responds 200 for every authenticated, readable delivery so the gateway
/// stops retrying; the PENDING→CONFIRMED conditional update makes a retried
/// confirmation a no-op instead of a double issuance.
pub async fn asaas_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ApiMessage>, AppError> {
    let presented = headers
        .get(ACCESS_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    if presented != Some(state.config.asaas_webhook_token.as_str()) {
        tracing::warn!("Webhook delivery with invalid access token");
        return Err(AppError::AuthError("Token de webhook inválido.".to_string()));
    }

    let envelope: WebhookEnvelope = serde_json::from_slice(&body).map_err(|err| {
        tracing::error!(error = %err, "Unreadable webhook body");
        AppError::InternalServerError("Erro interno no processamento do webhook.".to_string())
    })?;

    let Some(payment) = envelope.confirmation() else {
        tracing::info!(event = ?envelope.event, "Webhook event ignored");
        return Ok(message(ACK_RECEIVED));
    };

    tracing::info!(
        charge_id = %payment.id,
        gateway_status = ?payment.status,
        "Payment confirmation received"
    );

    let confirmed =
        db::orders::confirm_by_charge_id(&state.pool, &payment.id, payment.status.as_deref())
            .await?;

    let Some(order) = confirmed else {
        return match db::orders::status_by_charge_id(&state.pool, &payment.id).await? {
            Some(status) => {
                tracing::info!(
                    charge_id = %payment.id,
                    status = %status,
                    "Order already processed, skipping ticket issuance"
                );
                Ok(message(ACK_RECEIVED))
            }
            None => {
                tracing::warn!(charge_id = %payment.id, "No order matches this charge");
                Ok(message(ACK_UNKNOWN_CHARGE))
            }
        };
    };

    if order.cart.is_empty() {
        tracing::error!(order_id = %order.id, "Confirmed order has no cart items to issue");
        return Ok(message(ACK_RECEIVED));
    }

    let drafts = expand_cart(order.id, order.account_id, order.cart.as_slice(), Utc::now());
    for draft in &drafts {
        let ticket = db::tickets::insert_issued(&state.pool, draft).await?;
        tracing::info!(
            ticket_id = %ticket.id,
            code = %ticket.code,
            item = %ticket.item_name,
            "Ticket issued"
        );
    }

    tracing::info!(
        order_id = %order.id,
        tickets = drafts.len(),
        "Order confirmed and tickets issued"
    );

    Ok(message(ACK_RECEIVED))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(body: serde_json::Value) -> WebhookEnvelope {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn test_confirmation_events_expose_the_payment() {
        for event in [EVENT_PAYMENT_CONFIRMED, EVENT_PAYMENT_RECEIVED] {
            let envelope = envelope(json!({
                "event": event,
                "payment": {"id": "pay_123", "status": "CONFIRMED"}
            }));
            let payment = envelope.confirmation().expect("confirmation event");
            assert_eq!(payment.id, "pay_123");
        }
    }

    #[test]
    fn test_other_events_are_ignored() {
        let overdue = envelope(json!({
            "event": "PAYMENT_OVERDUE",
            "payment": {"id": "pay_123"}
        }));
        assert!(overdue.confirmation().is_none());

        let missing_event = envelope(json!({"payment": {"id": "pay_123"}}));
        assert!(missing_event.confirmation().is_none());
    }

    #[test]
    fn test_confirmation_without_payment_is_ignored() {
        let envelope = envelope(json!({"event": "PAYMENT_CONFIRMED"}));
        assert!(envelope.confirmation().is_none());
    }

    #[test]
    fn test_envelope_tolerates_extra_gateway_fields() {
        let envelope = envelope(json!({
            "id": "evt_05b708f59d7ed10b",
            "event": "PAYMENT_RECEIVED",
            "dateCreated": "2026-08-08 11:32:45",
            "payment": {
                "id": "pay_080225913252",
                "customer": "cus_000005219613",
                "status": "RECEIVED",
                "billingType": "PIX",
                "value": 129.90
            }
        }));
        let payment = envelope.confirmation().unwrap();
        assert_eq!(payment.status.as_deref(), Some("RECEIVED"));
    }
}
