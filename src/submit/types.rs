use serde::{Deserialize, Serialize};

/// Body returned by the endpoint for both transports.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EndpointResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Reachability probe answer (`GET` without `data`).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SubmissionReceipt {
    pub message: Option<String>,
    /// Server-side write time, `yyyy-MM-dd HH:mm:ss` in Bogotá time.
    pub timestamp: Option<String>,
}

pub const GENERIC_FAILURE: &str = "Error desconocido al guardar datos";

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("submission endpoint is not configured")]
    NotConfigured,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("HTTP error! status: {status}{}", detail_suffix(.message))]
    Status { status: u16, message: Option<String> },
    #[error("{0}")]
    Rejected(String),
    #[error("Unable to parse endpoint response: {0}")]
    InvalidResponse(String),
    #[error("Unable to encode answers: {0}")]
    Encode(#[from] serde_json::Error),
}

fn detail_suffix(message: &Option<String>) -> String {
    match message {
        Some(m) => format!(" ({m})"),
        None => String::new(),
    }
}

impl SubmitError {
    /// Text for the error banner. Configuration problems stay generic.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotConfigured => {
                "No fue posible enviar el formulario. Intenta de nuevo más tarde.".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl EndpointResponse {
    pub fn into_receipt(self) -> Result<SubmissionReceipt, SubmitError> {
        if !self.success {
            return Err(SubmitError::Rejected(
                self.error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            ));
        }
        Ok(SubmissionReceipt {
            message: self.message,
            timestamp: self.timestamp,
        })
    }
}

/// Pulls a readable message out of an error body: `error`, then `message`, then raw text.
pub fn message_from_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for key in ["error", "message"] {
            if let Some(text) = value.get(key).and_then(serde_json::Value::as_str) {
                if !text.trim().is_empty() {
                    return Some(text.trim().to_string());
                }
            }
        }
    }
    let mut text = trimmed.chars().take(200).collect::<String>();
    if trimmed.chars().count() > 200 {
        text.push_str("...");
    }
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsuccessful_body_becomes_rejection() {
        let body: EndpointResponse =
            serde_json::from_str(r#"{"success":false,"error":"boom"}"#).expect("parse");
        let err = body.into_receipt().expect_err("rejected");
        assert_eq!(err.to_string(), "boom");

        let body: EndpointResponse = serde_json::from_str(r#"{"success":false}"#).expect("parse");
        let err = body.into_receipt().expect_err("rejected");
        assert_eq!(err.to_string(), GENERIC_FAILURE);
    }

    #[test]
    fn successful_body_keeps_server_timestamp() {
        let body: EndpointResponse = serde_json::from_str(
            r#"{"success":true,"message":"Datos guardados correctamente","timestamp":"2024-01-01 10:00:00"}"#,
        )
        .expect("parse");
        let receipt = body.into_receipt().expect("receipt");
        assert_eq!(receipt.timestamp.as_deref(), Some("2024-01-01 10:00:00"));
    }

    #[test]
    fn message_extraction_prefers_json_fields() {
        assert_eq!(
            message_from_body(r#"{"error":"Sheet missing"}"#).as_deref(),
            Some("Sheet missing")
        );
        assert_eq!(
            message_from_body(r#"{"message":"quota"}"#).as_deref(),
            Some("quota")
        );
        assert_eq!(
            message_from_body("Service Unavailable").as_deref(),
            Some("Service Unavailable")
        );
        assert_eq!(message_from_body("   "), None);
    }

    #[test]
    fn status_error_mentions_code_and_detail() {
        let err = SubmitError::Status {
            status: 502,
            message: Some("Bad Gateway".to_string()),
        };
        assert_eq!(err.to_string(), "HTTP error! status: 502 (Bad Gateway)");
        assert_eq!(err.user_message(), err.to_string());
        assert!(!SubmitError::NotConfigured.user_message().contains("configur"));
    }
}
