use reqwest::header;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::account::Account;

pub const BILLING_PIX: &str = "PIX";
pub const BILLING_CREDIT_CARD: &str = "CREDIT_CARD";

/// Asaas authenticates with a bare `access_token` header.
const ACCESS_TOKEN_HEADER: &str = "access_token";

#[derive(Debug, Error)]
pub enum AsaasError {
    #[error("request to payment gateway failed: {0}")]
    Request(String),

    /// The gateway answered with a non-success status; `details` is its
    /// structured error payload, forwarded verbatim to API clients.
    #[error("payment gateway rejected the call (status {status})")]
    Rejected { status: u16, details: Value },

    #[error("payment gateway response carried no id")]
    MissingId,
}

/// Thin client for the gateway's REST API: customer creation, charge
/// creation, PIX QR retrieval.
#[derive(Clone)]
pub struct AsaasClient {
    http: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub mobile_phone: String,
    pub cpf_cnpj: String,
    pub address: String,
    pub address_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complement: Option<String>,
    pub province: String,
    pub postal_code: String,
}

impl NewCustomer {
    /// Builds the registration payload from a stored account. Returns `None`
    /// while the profile is still incomplete.
    pub fn from_account(account: &Account) -> Option<Self> {
        Some(Self {
            name: account.full_name.clone()?,
            email: account.email.clone(),
            mobile_phone: account.phone.clone()?,
            cpf_cnpj: account.cpf_cnpj.clone()?,
            address: account.address.clone()?,
            address_number: account.address_number.clone()?,
            complement: account.complement.clone(),
            province: account.province.clone()?,
            postal_code: account.postal_code.clone()?,
        })
    }
}

/// Card data as typed by the buyer. Fields are passed through as-is; the
/// gateway owns validation and its rejection is surfaced to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCard {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_month: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ccv: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditCardHolderInfo {
    pub name: String,
    pub email: String,
    pub cpf_cnpj: String,
    pub postal_code: String,
    pub address_number: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeRequest {
    pub customer: String,
    pub billing_type: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
    pub due_date: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_card: Option<CreditCard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_card_holder_info: Option<CreditCardHolderInfo>,
}

/// A created charge. `raw` is the gateway's full response object, returned
/// untouched to card-paying clients.
#[derive(Debug, Clone)]
pub struct Charge {
    pub id: String,
    pub status: Option<String>,
    pub due_date: Option<String>,
    pub raw: Value,
}

impl Charge {
    fn from_raw(raw: Value) -> Result<Self, AsaasError> {
        let id = raw
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(AsaasError::MissingId)?;
        let status = raw
            .get("status")
            .and_then(Value::as_str)
            .map(str::to_owned);
        let due_date = raw
            .get("dueDate")
            .and_then(Value::as_str)
            .map(str::to_owned);

        Ok(Self {
            id,
            status,
            due_date,
            raw,
        })
    }
}

/// QR payload for a PIX charge: the base64 image plus the copy-paste string.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PixQrCode {
    pub encoded_image: String,
    pub payload: String,
}

impl AsaasClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
            api_key,
        }
    }

    pub async fn create_customer(&self, customer: &NewCustomer) -> Result<String, AsaasError> {
        let payload = self.post_json("/customers", customer).await?;

        payload
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(AsaasError::MissingId)
    }

    pub async fn create_charge(&self, charge: &ChargeRequest) -> Result<Charge, AsaasError> {
        let raw = self.post_json("/payments", charge).await?;
        Charge::from_raw(raw)
    }

    pub async fn pix_qr_code(&self, charge_id: &str) -> Result<PixQrCode, AsaasError> {
        let response = self
            .http
            .get(format!("{}/payments/{}/pixQrCode", self.base_url, charge_id))
            .header(header::ACCEPT, "application/json")
            .header(ACCESS_TOKEN_HEADER, &self.api_key)
            .send()
            .await
            .map_err(|e| AsaasError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let details: Value = response.json().await.unwrap_or(Value::Null);
            return Err(AsaasError::Rejected {
                status: status.as_u16(),
                details,
            });
        }

        response
            .json::<PixQrCode>()
            .await
            .map_err(|e| AsaasError::Request(e.to_string()))
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, AsaasError> {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .header(header::ACCEPT, "application/json")
            .header(ACCESS_TOKEN_HEADER, &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AsaasError::Request(e.to_string()))?;

        let status = response.status();
        let payload: Value = response
            .json()
            .await
            .map_err(|e| AsaasError::Request(e.to_string()))?;

        if status.is_success() {
            Ok(payload)
        } else {
            Err(AsaasError::Rejected {
                status: status.as_u16(),
                details: payload,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_charge_value_serializes_as_number() {
        let charge = ChargeRequest {
            customer: "cus_000001".to_string(),
            billing_type: BILLING_PIX.to_string(),
            value: Decimal::new(12990, 2),
            due_date: "2026-08-09".to_string(),
            description: "Pedido de Ana Souza".to_string(),
            credit_card: None,
            credit_card_holder_info: None,
        };

        let encoded = serde_json::to_value(&charge).unwrap();
        assert_eq!(encoded["billingType"], json!("PIX"));
        assert!(encoded["value"].is_number());
        assert_eq!(encoded.get("creditCard"), None);
    }

    #[test]
    fn test_card_payload_omits_missing_ccv() {
        let card = CreditCard {
            holder_name: Some("ANA S SOUZA".to_string()),
            number: Some("5162306219378829".to_string()),
            expiry_month: Some("05".to_string()),
            expiry_year: Some("2028".to_string()),
            ccv: None,
        };

        let encoded = serde_json::to_value(&card).unwrap();
        assert_eq!(encoded.get("ccv"), None);
        assert_eq!(encoded["holderName"], json!("ANA S SOUZA"));
    }

    #[test]
    fn test_charge_requires_gateway_id() {
        let missing = Charge::from_raw(json!({"status": "PENDING"}));
        assert!(matches!(missing, Err(AsaasError::MissingId)));

        let charge = Charge::from_raw(json!({
            "id": "pay_123",
            "status": "PENDING",
            "dueDate": "2026-08-09"
        }))
        .unwrap();
        assert_eq!(charge.id, "pay_123");
        assert_eq!(charge.due_date.as_deref(), Some("2026-08-09"));
    }

    #[test]
    fn test_customer_payload_needs_complete_profile() {
        use crate::models::account::Account;
        use chrono::Utc;
        use uuid::Uuid;

        let mut account = Account {
            id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
            profile_complete: true,
            full_name: Some("Ana Souza".to_string()),
            cpf_cnpj: Some("39053344705".to_string()),
            phone: Some("11999990000".to_string()),
            birth_date: None,
            address: Some("Rua das Amoreiras".to_string()),
            address_number: Some("120".to_string()),
            complement: None,
            province: Some("Centro".to_string()),
            postal_code: Some("13010-001".to_string()),
            gateway_customer_id: None,
            gateway_customer_status: "pending".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(NewCustomer::from_account(&account).is_some());

        account.cpf_cnpj = None;
        assert!(NewCustomer::from_account(&account).is_none());
    }
}
