use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::order::{CartItem, Order, ORDER_CONFIRMED, ORDER_PENDING};

/// Records a checkout attempt right after the gateway accepted the charge.
/// The webhook later finds this row by the gateway charge id.
pub async fn insert_pending(
    pool: &PgPool,
    account_id: Uuid,
    cart: &[CartItem],
    total_value: Decimal,
    gateway_charge_id: &str,
    gateway_status: Option<&str>,
) -> Result<Order, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders (account_id, cart, total_value, status, gateway_charge_id, gateway_status)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(account_id)
    .bind(Json(cart))
    .bind(total_value)
    .bind(ORDER_PENDING)
    .bind(gateway_charge_id)
    .bind(gateway_status)
    .fetch_one(pool)
    .await
}

/// Conditionally flips the order matched by the gateway charge id from
/// PENDING to CONFIRMED. Returns the confirmed order exactly once: a second
/// delivery of the same event finds no PENDING row and gets `None`, which is
/// what keeps ticket issuance idempotent under the gateway's retries.
pub async fn confirm_by_charge_id(
    pool: &PgPool,
    gateway_charge_id: &str,
    gateway_status: Option<&str>,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as::<_, Order>(
        r#"
        UPDATE orders
        SET status = $3, gateway_status = $2, updated_at = now()
        WHERE gateway_charge_id = $1 AND status = $4
        RETURNING *
        "#,
    )
    .bind(gateway_charge_id)
    .bind(gateway_status)
    .bind(ORDER_CONFIRMED)
    .bind(ORDER_PENDING)
    .fetch_optional(pool)
    .await
}

/// Current status of the order holding this charge id, if any. Lets the
/// webhook tell "unknown charge" apart from "already confirmed".
pub async fn status_by_charge_id(
    pool: &PgPool,
    gateway_charge_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT status FROM orders WHERE gateway_charge_id = $1")
        .bind(gateway_charge_id)
        .fetch_optional(pool)
        .await
}
