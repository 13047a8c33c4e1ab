use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use crate::utils::error::AppError;

const BEARER_PREFIX: &str = "Bearer ";

const MISSING_TOKEN_MESSAGE: &str = "Token de autorização ausente ou mal formatado.";

/// The raw login token from the `Authorization: Bearer <token>` header.
/// Rejects with 401 when the header is absent or malformed; verifying the
/// token against the identity provider is the handler's job (403 on
/// rejection).
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::AuthError(MISSING_TOKEN_MESSAGE.to_string()))?;

        let token = header_value
            .strip_prefix(BEARER_PREFIX)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::AuthError(MISSING_TOKEN_MESSAGE.to_string()))?;

        Ok(Self(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(authorization: Option<&str>) -> Result<BearerToken, AppError> {
        let mut builder = Request::builder().uri("/checkout");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();

        BearerToken::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_extracts_token() {
        let BearerToken(token) = extract(Some("Bearer abc.def.ghi")).await.unwrap();
        assert_eq!(token, "abc.def.ghi");
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthorized() {
        let err = extract(None).await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));
    }

    #[tokio::test]
    async fn test_wrong_scheme_is_unauthorized() {
        let err = extract(Some("Basic abc")).await.unwrap_err();
        assert!(matches!(err, AppError::AuthError(_)));

        let empty = extract(Some("Bearer ")).await.unwrap_err();
        assert!(matches!(empty, AppError::AuthError(_)));
    }
}
