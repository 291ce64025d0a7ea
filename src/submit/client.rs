use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, USER_AGENT};

use crate::config::{SurveySettings, Transport};
use crate::survey::AnswerSet;
use crate::util::text::encode_uri_component;

use super::types::{
    message_from_body, EndpointResponse, HealthStatus, SubmissionReceipt, SubmitError,
};

const CLIENT_AGENT: &str = "quipu/0.1";

/// Sends a finished answer set to the backing store.
///
/// One call is one attempt. Retrying is up to the caller.
pub trait Submitter {
    fn submit(&self, answers: &AnswerSet) -> Result<SubmissionReceipt, SubmitError>;

    /// Reachability check only; never writes a row.
    fn test_connection(&self) -> bool;
}

/// Client for the spreadsheet script endpoint.
pub struct SheetsClient {
    endpoint: Option<String>,
    transport: Transport,
    client: Client,
}

impl SheetsClient {
    pub fn new(endpoint: Option<String>, transport: Transport) -> Result<Self, SubmitError> {
        // No timeout: a submission runs until the transport itself gives up.
        let client = Client::builder()
            .timeout(None::<std::time::Duration>)
            .build()
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        Ok(Self {
            endpoint,
            transport,
            client,
        })
    }

    pub fn from_settings(settings: &SurveySettings) -> Result<Self, SubmitError> {
        Self::new(
            settings.endpoint().map(str::to_string),
            settings.transport,
        )
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    fn endpoint(&self) -> Result<&str, SubmitError> {
        self.endpoint
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(SubmitError::NotConfigured)
    }

    fn send(&self, url: &str, answers: &AnswerSet) -> Result<Response, SubmitError> {
        let body = serde_json::to_string(answers)?;
        let request = match self.transport {
            Transport::Post => self
                .client
                .post(url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body),
            // The script decodes `data` once more after the query string is parsed.
            Transport::Get => self
                .client
                .get(url)
                .query(&[("data", encode_uri_component(&body))]),
        };
        request
            .header(USER_AGENT, CLIENT_AGENT)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| SubmitError::Transport(e.to_string()))
    }

    pub fn health(&self) -> Result<HealthStatus, SubmitError> {
        let url = self.endpoint()?;
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, CLIENT_AGENT)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SubmitError::Status {
                status: status.as_u16(),
                message: message_from_body(&body),
            });
        }
        response
            .json::<HealthStatus>()
            .map_err(|e| SubmitError::InvalidResponse(e.to_string()))
    }
}

impl Submitter for SheetsClient {
    fn submit(&self, answers: &AnswerSet) -> Result<SubmissionReceipt, SubmitError> {
        let url = self.endpoint()?;
        log::info!(
            "[api] sending survey via {} (steps {:?})",
            self.transport.as_str(),
            answers.completed_steps()
        );
        let response = self.send(url, answers)?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SubmitError::Transport(e.to_string()))?;
        if !status.is_success() {
            log::error!("[api] endpoint answered {status}");
            return Err(SubmitError::Status {
                status: status.as_u16(),
                message: message_from_body(&body),
            });
        }
        let parsed: EndpointResponse = serde_json::from_str(&body)
            .map_err(|e| SubmitError::InvalidResponse(e.to_string()))?;
        let receipt = parsed.into_receipt()?;
        log::info!(
            "[api] survey stored at {}",
            receipt.timestamp.as_deref().unwrap_or("unknown time")
        );
        Ok(receipt)
    }

    fn test_connection(&self) -> bool {
        match self.health() {
            Ok(health) => {
                log::info!("[api] connection test ok: {}", health.status);
                true
            }
            Err(e) => {
                log::error!("[api] connection test failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_endpoint_fails_before_any_request() {
        let client = SheetsClient::new(None, Transport::Post).expect("client");
        let err = client
            .submit(&AnswerSet::default())
            .expect_err("not configured");
        assert!(matches!(err, SubmitError::NotConfigured));
        assert!(!client.test_connection());
    }

    #[test]
    fn blank_endpoint_counts_as_unconfigured() {
        let client = SheetsClient::new(Some("   ".to_string()), Transport::Get).expect("client");
        assert!(matches!(
            client.submit(&AnswerSet::default()),
            Err(SubmitError::NotConfigured)
        ));
    }

    #[test]
    fn settings_choose_endpoint_and_transport() {
        let mut settings = SurveySettings::default_for(std::path::Path::new("/tmp/quipu"));
        settings.transport = Transport::Get;
        let client = SheetsClient::from_settings(&settings).expect("client");
        assert_eq!(client.transport(), Transport::Get);
        assert!(matches!(client.endpoint(), Err(SubmitError::NotConfigured)));
    }
}
