use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::services::asaas::AsaasClient;
use crate::services::identity::IdentityClient;

/// Shared handler state: the connection pool plus the clients for the two
/// external collaborators (payment gateway and identity provider).
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub asaas: AsaasClient,
    pub identity: IdentityClient,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Self {
        let asaas = AsaasClient::new(config.asaas_api_url.clone(), config.asaas_api_key.clone());
        let identity = IdentityClient::new(
            config.identity_api_url.clone(),
            config.identity_api_key.clone(),
        );

        Self {
            pool,
            config: Arc::new(config),
            asaas,
            identity,
        }
    }
}
