use axum::extract::State;
use axum::Json;

use crate::db;
use crate::models::catalog::{Combo, Product};
use crate::state::AppState;
use crate::utils::error::AppError;

/// `GET /products` — the wristband catalog, cheapest first.
pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, AppError> {
    let products = db::catalog::products(&state.pool).await?;
    Ok(Json(products))
}

/// `GET /combos` — promotional bundles.
pub async fn list_combos(State(state): State<AppState>) -> Result<Json<Vec<Combo>>, AppError> {
    let combos = db::catalog::combos(&state.pool).await?;
    Ok(Json(combos))
}
