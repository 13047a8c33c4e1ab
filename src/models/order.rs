use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

pub const ORDER_PENDING: &str = "PENDING";
pub const ORDER_CONFIRMED: &str = "CONFIRMED";

/// One line of the declared cart, as submitted by the storefront at checkout
/// and stored verbatim on the order. Quantity, name and description are
/// optional on the wire; ticket issuance fills in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub quantity: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub account_id: Uuid,
    pub cart: Json<Vec<CartItem>>,
    pub total_value: Decimal,
    /// `PENDING` until the webhook observes a confirmation event.
    pub status: String,
    pub gateway_charge_id: Option<String>,
    /// Status string as reported by the gateway, stored for audit.
    pub gateway_status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
