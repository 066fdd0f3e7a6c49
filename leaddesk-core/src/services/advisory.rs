//! Advisory AI client
//!
//! Consumes an opaque external service for lead summaries and next-action
//! suggestions. Every failure mode (network, provider error, rate limit,
//! unparsable response) degrades to a fixed human-readable fallback; this
//! client never surfaces an error to its caller and never retries — a
//! newer request simply supersedes whatever the caller was displaying.

use leaddesk_common::config::AdvisoryConfig;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

use crate::models::{Lead, Touch};

const NO_HISTORY_SUMMARY: &str = "No interaction history recorded for this lead yet.";
const DEGRADED_SUMMARY: &str =
    "AI summary is temporarily unavailable. Review the touch history manually.";
const RATE_LIMITED_SUMMARY: &str =
    "AI summary is rate limited right now. Try again in a minute.";
const FALLBACK_ACTION: &str = "Review Required";

/// How many recent touches ride along in the request context
const CONTEXT_TOUCH_LIMIT: usize = 5;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Internal failure taxonomy; callers only ever see fallback values
#[derive(Debug, Error)]
enum AdvisoryError {
    #[error("network error: {0}")]
    Network(String),

    #[error("rate limited by provider")]
    RateLimited,

    #[error("provider error {0}: {1}")]
    Provider(u16, String),

    #[error("unparsable response: {0}")]
    Parse(String),
}

/// Structured next-action suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextAction {
    pub action: String,
    pub rationale: String,
}

#[derive(Debug, Clone)]
pub struct AdvisoryClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl AdvisoryClient {
    pub fn new(config: &AdvisoryConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Summarize a lead's interaction history. Empty history short-circuits
    /// to a fixed string without calling the provider.
    pub async fn summarize(&self, lead: &Lead, touches: &[Touch]) -> String {
        if touches.is_empty() {
            return NO_HISTORY_SUMMARY.to_string();
        }
        match self.request_summary(lead, touches).await {
            Ok(text) => text,
            Err(AdvisoryError::RateLimited) => {
                warn!(lead_id = %lead.id, "Advisory summarize rate limited");
                RATE_LIMITED_SUMMARY.to_string()
            }
            Err(err) => {
                warn!(lead_id = %lead.id, %err, "Advisory summarize failed, degrading");
                DEGRADED_SUMMARY.to_string()
            }
        }
    }

    /// Suggest the next action for a lead; falls back to a fixed action
    /// with the error description as rationale
    pub async fn suggest_next_action(&self, lead: &Lead, touches: &[Touch]) -> NextAction {
        match self.request_suggestion(lead, touches).await {
            Ok(action) => action,
            Err(err) => {
                warn!(lead_id = %lead.id, %err, "Advisory suggestion failed, degrading");
                NextAction {
                    action: FALLBACK_ACTION.to_string(),
                    rationale: err.to_string(),
                }
            }
        }
    }

    async fn request_summary(
        &self,
        lead: &Lead,
        touches: &[Touch],
    ) -> Result<String, AdvisoryError> {
        #[derive(Deserialize)]
        struct SummaryResponse {
            summary: String,
        }
        let response: SummaryResponse = self
            .post("summarize", lead, touches)
            .await?;
        Ok(response.summary)
    }

    async fn request_suggestion(
        &self,
        lead: &Lead,
        touches: &[Touch],
    ) -> Result<NextAction, AdvisoryError> {
        self.post("suggest_next_action", lead, touches).await
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        task: &str,
        lead: &Lead,
        touches: &[Touch],
    ) -> Result<T, AdvisoryError> {
        let body = json!({
            "task": task,
            "context": request_context(lead, touches),
        });

        let mut request = self
            .http
            .post(format!("{}/v1/advise", self.base_url))
            .json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AdvisoryError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AdvisoryError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AdvisoryError::Provider(status.as_u16(), text));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AdvisoryError::Parse(e.to_string()))
    }
}

/// Compact JSON context sent to the provider: pipeline position plus the
/// most recent few touches, never the full change log
fn request_context(lead: &Lead, touches: &[Touch]) -> serde_json::Value {
    let recent: Vec<_> = touches
        .iter()
        .take(CONTEXT_TOUCH_LIMIT)
        .map(|t| {
            json!({
                "type": t.touch_type,
                "outcome": t.outcome,
                "content": t.content,
                "timestamp": t.timestamp,
            })
        })
        .collect();

    json!({
        "status": lead.status,
        "loanPurpose": lead.loan_params.loan_purpose,
        "loanAmount": lead.loan_params.loan_amount,
        "totalTouches": lead.total_touches,
        "recentTouches": recent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Borrower, LeadStatus, LoanParams, TouchOutcome, TouchType};
    use chrono::Utc;
    use uuid::Uuid;

    fn unreachable_client() -> AdvisoryClient {
        // Nothing listens here; requests fail fast with a connection error
        AdvisoryClient::new(&AdvisoryConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: None,
        })
    }

    fn test_lead() -> Lead {
        let now = Utc::now();
        Lead {
            id: Uuid::new_v4(),
            assigned_to: None,
            processor_id: None,
            borrowers: vec![Borrower {
                id: Uuid::new_v4(),
                first_name: "Ana".to_string(),
                last_name: "Reyes".to_string(),
                email: "ana@x.com".to_string(),
                phone: "555-0100".to_string(),
                is_primary: true,
            }],
            status: LeadStatus::AttemptedContact,
            created_at: now,
            updated_at: now,
            last_touch_at: Some(now),
            last_touch_type: Some(TouchType::Call),
            total_touches: 1,
            next_follow_up: None,
            loan_params: LoanParams::default(),
            change_log: Vec::new(),
        }
    }

    fn test_touch(lead_id: Uuid) -> Touch {
        Touch {
            id: Uuid::new_v4(),
            lead_id,
            touch_type: TouchType::Call,
            outcome: TouchOutcome::Spoke,
            content: "Discussed rate options".to_string(),
            timestamp: Utc::now(),
            author: "Dana Whitfield".to_string(),
        }
    }

    #[tokio::test]
    async fn empty_history_returns_fixed_string_without_a_request() {
        let client = unreachable_client();
        let summary = client.summarize(&test_lead(), &[]).await;
        assert_eq!(summary, NO_HISTORY_SUMMARY);
    }

    #[tokio::test]
    async fn unreachable_provider_degrades_summary() {
        let client = unreachable_client();
        let lead = test_lead();
        let touches = vec![test_touch(lead.id)];
        let summary = client.summarize(&lead, &touches).await;
        assert_eq!(summary, DEGRADED_SUMMARY);
    }

    #[tokio::test]
    async fn unreachable_provider_falls_back_to_review_required() {
        let client = unreachable_client();
        let lead = test_lead();
        let suggestion = client.suggest_next_action(&lead, &[]).await;
        assert_eq!(suggestion.action, FALLBACK_ACTION);
        assert!(!suggestion.rationale.is_empty());
    }

    #[test]
    fn context_trims_to_recent_touches() {
        let lead = test_lead();
        let touches: Vec<Touch> = (0..8).map(|_| test_touch(lead.id)).collect();
        let context = request_context(&lead, &touches);
        assert_eq!(
            context["recentTouches"].as_array().unwrap().len(),
            CONTEXT_TOUCH_LIMIT
        );
        assert_eq!(context["status"], json!("ATTEMPTED_CONTACT"));
    }
}
