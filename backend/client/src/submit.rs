//! # Submit Orchestration
//!
//! One attempt walks `Idle -> Validating -> {RejectedLocally | RateLimited
//! | Sending} -> {Succeeded | Failed}`. Rejections and rate limits are
//! terminal per attempt only; the user can fix the draft or wait out the
//! window and try again. Success clears the draft, failure preserves it
//! for resubmission.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use flags::FlagSubmission;
use reqwest::StatusCode;
use serde::Deserialize;

use crate::{
    error::SubmitError,
    ledger::RateLimiter,
    storage::KeyValueStore,
    validate::{ValidationResult, validate},
};

pub const SUBMIT_PATH: &str = "/api/submit-flags";
pub const TOKEN_PATH: &str = "/api/csrf-token";
pub const TOKEN_HEADER: &str = "x-csrf-token";

const NO_FLAGS_MESSAGE: &str = "Submit at least one flag";
const NETWORK_FAILED_MESSAGE: &str = "Could not reach the server. Please try again.";
const SUBMIT_FAILED_MESSAGE: &str = "Submission failed. Please try again.";

/// Cancellation handle for an in-flight submission.
///
/// The hosting view holds one and cancels it on teardown; a late response
/// is then dropped instead of applied.
#[derive(Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Advisory delivery token from `/api/csrf-token`.
#[derive(Deserialize, Debug, Clone)]
pub struct DeliveryToken {
    pub token: String,
    pub expires: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Per-field validation failed; nothing was sent.
    Rejected(ValidationResult),
    /// Every flag field was empty; nothing was sent.
    NoFlags { message: String },
    /// Out of capacity, locally or server-reported.
    RateLimited { remaining: usize },
    /// Delivered; the draft has been cleared.
    Sent { message_id: String },
    /// Delivery failed; the draft is preserved for resubmission.
    Failed { message: String },
    /// The token was cancelled while the request was in flight.
    Cancelled,
}

#[derive(Deserialize)]
struct SubmitResponse {
    #[serde(rename = "messageId")]
    message_id: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

pub struct SubmitClient<S: KeyValueStore> {
    http: reqwest::Client,
    base_url: String,
    store: S,
}

impl<S: KeyValueStore> SubmitClient<S> {
    pub fn new(base_url: impl Into<String>, store: S) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn fetch_token(&self) -> Result<DeliveryToken, SubmitError> {
        let response = self
            .http
            .get(format!("{}{}", self.base_url, TOKEN_PATH))
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(SubmitError::Status(response.status()));
        }

        Ok(response.json().await?)
    }

    /// Run one submission attempt end to end.
    ///
    /// Local checks short-circuit without a network call. The rate-limit
    /// slot is consumed before the request goes out, so a failed send
    /// still counts against the window.
    pub async fn submit(&self, draft: &mut FlagSubmission, cancel: &CancelToken) -> SubmitOutcome {
        let result = validate(draft);
        if !result.is_valid() {
            return SubmitOutcome::Rejected(result);
        }

        if !draft.has_flags() {
            return SubmitOutcome::NoFlags {
                message: NO_FLAGS_MESSAGE.to_string(),
            };
        }

        let check = RateLimiter::new(&self.store).check();
        if !check.allowed {
            return SubmitOutcome::RateLimited { remaining: 0 };
        }

        let token = self.fetch_token().await;

        if cancel.is_cancelled() {
            return SubmitOutcome::Cancelled;
        }

        let token = match token {
            Ok(token) => token,
            Err(_) => {
                return SubmitOutcome::Failed {
                    message: NETWORK_FAILED_MESSAGE.to_string(),
                };
            }
        };

        let response = self
            .http
            .post(format!("{}{}", self.base_url, SUBMIT_PATH))
            .header(TOKEN_HEADER, &token.token)
            .json(draft)
            .send()
            .await;

        if cancel.is_cancelled() {
            return SubmitOutcome::Cancelled;
        }

        let response = match response {
            Ok(response) => response,
            Err(_) => {
                return SubmitOutcome::Failed {
                    message: NETWORK_FAILED_MESSAGE.to_string(),
                };
            }
        };

        match response.status() {
            StatusCode::OK => {
                let body: Result<SubmitResponse, _> = response.json().await;
                match body {
                    Ok(body) => {
                        draft.clear();
                        SubmitOutcome::Sent {
                            message_id: body.message_id,
                        }
                    }
                    Err(_) => SubmitOutcome::Failed {
                        message: SUBMIT_FAILED_MESSAGE.to_string(),
                    },
                }
            }
            StatusCode::TOO_MANY_REQUESTS => SubmitOutcome::RateLimited { remaining: 0 },
            _ => {
                let message = response
                    .json::<ErrorResponse>()
                    .await
                    .map(|body| body.error)
                    .unwrap_or_else(|_| SUBMIT_FAILED_MESSAGE.to_string());

                SubmitOutcome::Failed { message }
            }
        }
    }
}
