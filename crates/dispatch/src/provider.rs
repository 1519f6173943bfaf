//! Delivery provider client — one bounded HTTP call per batch.
//!
//! A provider call either yields a parsed outcome or degrades to an all-zero
//! one. Timeouts, transport errors, non-2xx statuses, and response bodies
//! that don't match the expected shape are all absorbed and logged here; a
//! broken provider costs its own batches and nothing else, and is not
//! retried within the run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use herald_common::types::BroadcastMessage;

/// Hard per-request timeout. On expiry the in-flight request is aborted and
/// its connection released, not left dangling.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Outcome of one batch call. All-zero when the provider was unreachable or
/// returned something unintelligible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub successful: usize,
    pub invalid_tokens: Vec<String>,
    pub rate_limited: usize,
}

/// Seam between the coordinator and the outbound HTTP call.
pub trait BatchSender: Send + Sync {
    /// Deliver one batch. Must not fail: provider trouble is reported as a
    /// zero-valued outcome, never as an error.
    fn send_batch(
        &self,
        url: &str,
        tokens: &[String],
        message: &BroadcastMessage,
        notification_id: &str,
    ) -> impl Future<Output = BatchOutcome> + Send;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProviderRequest<'a> {
    notification_id: &'a str,
    title: &'a str,
    body: &'a str,
    target_url: &'a str,
    tokens: &'a [String],
}

/// Expected success-response shape. Every field is optional on the wire;
/// whatever is missing reads as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProviderResponse {
    result: ProviderResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ProviderResult {
    successful_tokens: Vec<String>,
    invalid_tokens: Vec<String>,
    rate_limited_tokens: Vec<String>,
}

impl From<ProviderResponse> for BatchOutcome {
    fn from(response: ProviderResponse) -> Self {
        Self {
            successful: response.result.successful_tokens.len(),
            invalid_tokens: response.result.invalid_tokens,
            rate_limited: response.result.rate_limited_tokens.len(),
        }
    }
}

/// Reqwest-backed provider client, shared by every batch of a run.
#[derive(Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    target_url: String,
}

impl ProviderClient {
    pub fn new(target_url: String) -> anyhow::Result<Self> {
        Self::with_timeout(target_url, REQUEST_TIMEOUT)
    }

    /// Client with a custom timeout. Production code goes through [`new`];
    /// tests shrink the timeout to keep the slow-provider path fast.
    ///
    /// [`new`]: ProviderClient::new
    pub fn with_timeout(target_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http, target_url })
    }
}

impl BatchSender for ProviderClient {
    async fn send_batch(
        &self,
        url: &str,
        tokens: &[String],
        message: &BroadcastMessage,
        notification_id: &str,
    ) -> BatchOutcome {
        let payload = ProviderRequest {
            notification_id,
            title: &message.title,
            body: &message.body,
            target_url: &self.target_url,
            tokens,
        };

        let response = match self.http.post(url).json(&payload).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::error!(url, tokens = tokens.len(), error = %err, "Batch request failed");
                return BatchOutcome::default();
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(url, %status, body, "Provider returned error status");
            return BatchOutcome::default();
        }

        match response.json::<ProviderResponse>().await {
            Ok(parsed) => parsed.into(),
            Err(err) => {
                tracing::error!(url, error = %err, "Provider response did not match expected shape");
                BatchOutcome::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_response_counts_by_array_length() {
        let raw = r#"{
            "result": {
                "successfulTokens": ["t1", "t2", "t3"],
                "invalidTokens": ["t4"],
                "rateLimitedTokens": ["t5", "t6"]
            }
        }"#;

        let outcome: BatchOutcome = serde_json::from_str::<ProviderResponse>(raw).unwrap().into();
        assert_eq!(outcome.successful, 3);
        assert_eq!(outcome.invalid_tokens, vec!["t4"]);
        assert_eq!(outcome.rate_limited, 2);
    }

    #[test]
    fn test_missing_rate_limited_field_reads_as_empty() {
        let raw = r#"{"result": {"successfulTokens": ["t1"], "invalidTokens": []}}"#;

        let outcome: BatchOutcome = serde_json::from_str::<ProviderResponse>(raw).unwrap().into();
        assert_eq!(outcome.successful, 1);
        assert!(outcome.invalid_tokens.is_empty());
        assert_eq!(outcome.rate_limited, 0);
    }

    #[test]
    fn test_missing_result_reads_as_all_empty() {
        let outcome: BatchOutcome = serde_json::from_str::<ProviderResponse>("{}").unwrap().into();
        assert_eq!(outcome, BatchOutcome::default());
    }

    #[test]
    fn test_request_payload_is_camel_case() {
        let tokens = vec!["t1".to_string()];
        let payload = ProviderRequest {
            notification_id: "broadcast-1",
            title: "Title",
            body: "Body",
            target_url: "https://app.example",
            tokens: &tokens,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["notificationId"], "broadcast-1");
        assert_eq!(value["targetUrl"], "https://app.example");
        assert_eq!(value["tokens"], serde_json::json!(["t1"]));
    }
}
