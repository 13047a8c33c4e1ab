use sqlx::PgPool;
use uuid::Uuid;

use crate::models::ticket::{Ticket, TicketDraft};
use crate::utils::codes;

const CODE_RETRY_LIMIT: u32 = 5;
const CODE_UNIQUE_CONSTRAINT: &str = "tickets_code_key";

/// Writes one issued ticket. On a redemption-code collision the draft's code
/// is swapped for a fresh one and the insert retried, bounded by
/// `CODE_RETRY_LIMIT`; any other database error propagates immediately.
pub async fn insert_issued(pool: &PgPool, draft: &TicketDraft) -> Result<Ticket, sqlx::Error> {
    let mut code = draft.code.clone();
    let mut attempts = 0;

    loop {
        match insert_once(pool, draft, &code).await {
            Ok(ticket) => return Ok(ticket),
            Err(err) if is_code_collision(&err) && attempts < CODE_RETRY_LIMIT => {
                attempts += 1;
                tracing::debug!(
                    code = %code,
                    attempts,
                    "Redemption code collision, regenerating"
                );
                code = codes::redemption_code(&draft.product_id);
            }
            Err(err) => return Err(err),
        }
    }
}

async fn insert_once(
    pool: &PgPool,
    draft: &TicketDraft,
    code: &str,
) -> Result<Ticket, sqlx::Error> {
    sqlx::query_as::<_, Ticket>(
        r#"
        INSERT INTO tickets
            (order_id, account_id, product_id, item_name, item_description, code, expires_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(draft.order_id)
    .bind(draft.account_id)
    .bind(&draft.product_id)
    .bind(&draft.item_name)
    .bind(&draft.item_description)
    .bind(code)
    .bind(draft.expires_at)
    .fetch_one(pool)
    .await
}

fn is_code_collision(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.constraint() == Some(CODE_UNIQUE_CONSTRAINT),
        _ => false,
    }
}

pub async fn for_account(pool: &PgPool, account_id: Uuid) -> Result<Vec<Ticket>, sqlx::Error> {
    sqlx::query_as::<_, Ticket>(
        "SELECT * FROM tickets WHERE account_id = $1 ORDER BY created_at DESC",
    )
    .bind(account_id)
    .fetch_all(pool)
    .await
}
