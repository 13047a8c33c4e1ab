use axum::extract::State;
use axum::Json;

use crate::db;
use crate::extractors::BearerToken;
use crate::handlers::authenticate;
use crate::models::ticket::Ticket;
use crate::state::AppState;
use crate::utils::error::AppError;

/// `GET /user/tickets` — the caller's tickets, newest first.
pub async fn list_my_tickets(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<Vec<Ticket>>, AppError> {
    let claims = authenticate(&state, &token).await?;
    let tickets = db::tickets::for_account(&state.pool, claims.uid).await?;
    Ok(Json(tickets))
}
