use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

/// Wire shape of every error response: `{"error": "...", "details": ...}`,
/// with `details` carrying an upstream gateway payload when there is one.
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Wire shape of informational acknowledgements: `{"message": "..."}`.
#[derive(Serialize)]
pub struct ApiMessage {
    pub message: String,
}

pub fn message(text: impl Into<String>) -> Json<ApiMessage> {
    Json(ApiMessage {
        message: text.into(),
    })
}

pub fn error(status: StatusCode, message: impl Into<String>, details: Option<Value>) -> Response {
    let body = ApiErrorBody {
        error: message.into(),
        details,
    };

    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_body_omits_empty_details() {
        let body = ApiErrorBody {
            error: "Campo ausente.".to_string(),
            details: None,
        };
        let encoded = serde_json::to_value(&body).unwrap();
        assert_eq!(encoded, json!({"error": "Campo ausente."}));
    }

    #[test]
    fn test_error_body_forwards_details() {
        let body = ApiErrorBody {
            error: "Falha ao processar pagamento com cartão.".to_string(),
            details: Some(json!({"errors": [{"code": "invalid_creditCard"}]})),
        };
        let encoded = serde_json::to_value(&body).unwrap();
        assert_eq!(
            encoded["details"]["errors"][0]["code"],
            json!("invalid_creditCard")
        );
    }
}
