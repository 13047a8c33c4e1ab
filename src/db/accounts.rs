use sqlx::PgPool;
use uuid::Uuid;

use crate::models::account::{
    Account, ProfileFields, CUSTOMER_LINK_FAILED, CUSTOMER_LINK_LINKED,
};

/// Upper bound of accounts handled per reconciler pass.
const SYNC_BATCH_SIZE: i64 = 50;

pub async fn insert(pool: &PgPool, id: Uuid, email: &str) -> Result<Account, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "INSERT INTO accounts (id, email) VALUES ($1, $2) RETURNING *",
    )
    .bind(id)
    .bind(email)
    .fetch_one(pool)
    .await
}

pub async fn find(pool: &PgPool, id: Uuid) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Persists the submitted profile and flips `profile_complete`. The gateway
/// customer link is untouched here; `link_customer` / `mark_link_failed`
/// record the outcome of the registration attempt separately.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    email: &str,
    profile: &ProfileFields,
) -> Result<Account, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        r#"
        UPDATE accounts
        SET email = $2,
            full_name = $3,
            phone = $4,
            birth_date = $5,
            cpf_cnpj = $6,
            address = $7,
            address_number = $8,
            complement = $9,
            province = $10,
            postal_code = $11,
            profile_complete = TRUE,
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(&profile.full_name)
    .bind(&profile.phone)
    .bind(&profile.birth_date)
    .bind(&profile.cpf_cnpj)
    .bind(&profile.address)
    .bind(&profile.address_number)
    .bind(&profile.complement)
    .bind(&profile.province)
    .bind(&profile.postal_code)
    .fetch_one(pool)
    .await
}

pub async fn link_customer(
    pool: &PgPool,
    id: Uuid,
    customer_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE accounts
         SET gateway_customer_id = $2, gateway_customer_status = $3, updated_at = now()
         WHERE id = $1",
    )
    .bind(id)
    .bind(customer_id)
    .bind(CUSTOMER_LINK_LINKED)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn mark_link_failed(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE accounts
         SET gateway_customer_status = $2, updated_at = now()
         WHERE id = $1",
    )
    .bind(id)
    .bind(CUSTOMER_LINK_FAILED)
    .execute(pool)
    .await?;

    Ok(())
}

/// Accounts with a complete profile but no gateway customer yet — the rows
/// the reconciler retries. Oldest first, so a persistently failing account
/// cannot starve the rest of the batch.
pub async fn with_unlinked_customer(pool: &PgPool) -> Result<Vec<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        "SELECT * FROM accounts
         WHERE profile_complete AND gateway_customer_id IS NULL
         ORDER BY updated_at
         LIMIT $1",
    )
    .bind(SYNC_BATCH_SIZE)
    .fetch_all(pool)
    .await
}
