//! HTTP client for the plan-generation backend.

use bytes::Bytes;
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::debug;

use crate::error::PlanError;
use crate::model::{RunConfig, TravelRequest};

/// Shape of the backend's failure payload. Anything that does not decode
/// falls back to the raw body text.
#[derive(Debug, Deserialize)]
struct ErrorPayload {
    error: String,
}

#[derive(Clone)]
pub struct PlannerClient {
    pub http: Client,
    base_url: String,
}

impl PlannerClient {
    pub fn new(cfg: &RunConfig) -> Result<Self, PlanError> {
        // Only the connect phase is bounded: a total request timeout would
        // cut off long-running plan streams.
        let http = Client::builder()
            .user_agent(cfg.user_agent.clone())
            .connect_timeout(cfg.connect_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// POST the request and hand back the raw response with its body
    /// still unread, ready for chunked consumption.
    pub async fn generate_plan(&self, request: &TravelRequest) -> Result<Response, PlanError> {
        let url = format!("{}/generate-plan", self.base_url);
        debug!(%url, destination = %request.destination, "requesting plan");

        let response = self.http.post(&url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlanError::Transport {
                status: Some(status.as_u16()),
                message: error_message_from_body(&body),
            });
        }
        Ok(response)
    }

    /// Fetch the finalized plan rendered as a PDF document.
    pub async fn download_pdf(&self, plan_text: &str) -> Result<Bytes, PlanError> {
        let url = format!("{}/download-plan", self.base_url);
        debug!(%url, "requesting pdf");

        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "plan": plan_text }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlanError::Transport {
                status: Some(status.as_u16()),
                message: error_message_from_body(&body),
            });
        }
        Ok(response.bytes().await?)
    }
}

/// Extract the message from a structured `{"error": ...}` failure body,
/// falling back to the raw text, then to a generic message.
fn error_message_from_body(body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ErrorPayload>(body) {
        return payload.error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "the server could not generate a plan".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_error_body_is_unwrapped() {
        let msg = error_message_from_body(r#"{"error": "quota exceeded"}"#);
        assert_eq!(msg, "quota exceeded");
    }

    #[test]
    fn plain_text_body_is_kept() {
        assert_eq!(
            error_message_from_body("  upstream timed out \n"),
            "upstream timed out"
        );
    }

    #[test]
    fn empty_body_gets_a_generic_message() {
        assert_eq!(
            error_message_from_body(""),
            "the server could not generate a plan"
        );
    }

    #[test]
    fn unrelated_json_falls_back_to_raw_text() {
        let msg = error_message_from_body(r#"{"detail": "not found"}"#);
        assert_eq!(msg, r#"{"detail": "not found"}"#);
    }
}
