use std::env;
use std::net::SocketAddr;
use std::time::Duration;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3001";
const DEFAULT_CUSTOMER_SYNC_INTERVAL_SECS: u64 = 300;

pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Base URL of the payment gateway's REST API, e.g. the Asaas sandbox.
    pub asaas_api_url: String,
    pub asaas_api_key: String,
    /// Shared secret the gateway echoes back in the `Asaas-Access-Token`
    /// header of every webhook delivery.
    pub asaas_webhook_token: String,
    pub identity_api_url: String,
    pub identity_api_key: String,
    /// Period of the background pass that retries gateway customer
    /// registration for accounts left unlinked by a gateway outage.
    pub customer_sync_interval: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            bind_addr: env::var("BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
                .parse()
                .expect("BIND_ADDR must be a valid socket address"),
            asaas_api_url: env::var("ASAAS_API_URL").expect("ASAAS_API_URL must be set"),
            asaas_api_key: env::var("ASAAS_API_KEY").expect("ASAAS_API_KEY must be set"),
            asaas_webhook_token: env::var("ASAAS_WEBHOOK_TOKEN")
                .expect("ASAAS_WEBHOOK_TOKEN must be set"),
            identity_api_url: env::var("IDENTITY_API_URL").expect("IDENTITY_API_URL must be set"),
            identity_api_key: env::var("IDENTITY_API_KEY").expect("IDENTITY_API_KEY must be set"),
            customer_sync_interval: Duration::from_secs(
                env::var("CUSTOMER_SYNC_INTERVAL_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_CUSTOMER_SYNC_INTERVAL_SECS),
            ),
        }
    }
}
