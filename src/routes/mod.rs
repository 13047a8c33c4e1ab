use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{auth, catalog, checkout, health_check, profile, tickets, webhook};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(auth::register))
        .route("/user/profile", post(profile::update_profile))
        .route("/user/tickets", get(tickets::list_my_tickets))
        .route("/checkout", post(checkout::checkout))
        .route("/webhook/asaas", post(webhook::asaas_webhook))
        .route("/products", get(catalog::list_products))
        .route("/combos", get(catalog::list_combos))
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
