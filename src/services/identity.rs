use reqwest::header;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Error codes the identity provider uses for registration rejections.
const CODE_EMAIL_EXISTS: &str = "EMAIL_EXISTS";
const CODE_WEAK_PASSWORD: &str = "WEAK_PASSWORD";

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("request to identity provider failed: {0}")]
    Request(String),

    #[error("email is already registered")]
    EmailExists,

    #[error("password rejected by the provider")]
    WeakPassword,

    #[error("token rejected by the provider")]
    InvalidToken,

    #[error("identity provider rejected the call (status {status})")]
    Rejected { status: u16, message: String },
}

impl IdentityError {
    fn from_rejection(status: u16, payload: &Value) -> Self {
        let code = payload.get("code").and_then(Value::as_str).unwrap_or("");
        match code {
            CODE_EMAIL_EXISTS => Self::EmailExists,
            CODE_WEAK_PASSWORD => Self::WeakPassword,
            _ => Self::Rejected {
                status,
                message: payload
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown error")
                    .to_string(),
            },
        }
    }
}

/// A user record at the identity provider.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityUser {
    pub uid: Uuid,
    pub email: String,
}

/// Claims extracted from a verified login token.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenClaims {
    pub uid: Uuid,
    pub email: String,
}

#[derive(Debug, Deserialize)]
struct MintedToken {
    token: String,
}

/// Client for the managed authentication service. Mirrors the three admin
/// operations the flow needs: create user, mint a login token, verify a
/// presented token.
#[derive(Clone)]
pub struct IdentityClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl IdentityClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: Client::new(),
            base_url,
            api_key,
        }
    }

    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<IdentityUser, IdentityError> {
        #[derive(Serialize)]
        struct Body<'a> {
            email: &'a str,
            password: &'a str,
        }

        let response = self
            .http
            .post(format!("{}/users", self.base_url))
            .header(header::ACCEPT, "application/json")
            .bearer_auth(&self.api_key)
            .json(&Body { email, password })
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let payload: Value = response.json().await.unwrap_or(Value::Null);
            return Err(IdentityError::from_rejection(status.as_u16(), &payload));
        }

        response
            .json::<IdentityUser>()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))
    }

    pub async fn mint_token(&self, uid: Uuid) -> Result<String, IdentityError> {
        #[derive(Serialize)]
        struct Body {
            uid: Uuid,
        }

        let response = self
            .http
            .post(format!("{}/tokens", self.base_url))
            .header(header::ACCEPT, "application/json")
            .bearer_auth(&self.api_key)
            .json(&Body { uid })
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let payload: Value = response.json().await.unwrap_or(Value::Null);
            return Err(IdentityError::from_rejection(status.as_u16(), &payload));
        }

        response
            .json::<MintedToken>()
            .await
            .map(|minted| minted.token)
            .map_err(|e| IdentityError::Request(e.to_string()))
    }

    /// Verifies a login token presented by a storefront request. Any
    /// provider-side rejection maps to `InvalidToken`; only transport
    /// failures surface as `Request`.
    pub async fn verify_token(&self, token: &str) -> Result<TokenClaims, IdentityError> {
        #[derive(Serialize)]
        struct Body<'a> {
            token: &'a str,
        }

        let response = self
            .http
            .post(format!("{}/tokens/verify", self.base_url))
            .header(header::ACCEPT, "application/json")
            .bearer_auth(&self.api_key)
            .json(&Body { token })
            .send()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IdentityError::InvalidToken);
        }

        response
            .json::<TokenClaims>()
            .await
            .map_err(|e| IdentityError::Request(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registration_rejections_map_to_specific_errors() {
        let email = IdentityError::from_rejection(409, &json!({"code": "EMAIL_EXISTS"}));
        assert!(matches!(email, IdentityError::EmailExists));

        let weak = IdentityError::from_rejection(400, &json!({"code": "WEAK_PASSWORD"}));
        assert!(matches!(weak, IdentityError::WeakPassword));
    }

    #[test]
    fn test_unknown_rejection_keeps_status_and_message() {
        let err = IdentityError::from_rejection(503, &json!({"message": "maintenance"}));
        match err {
            IdentityError::Rejected { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("unexpected variant: {:?}", other),
        }
    }
}
