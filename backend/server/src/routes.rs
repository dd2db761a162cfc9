use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use flags::FlagSubmission;
use serde_json::json;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    error::AppError,
    mailer::deliver,
    message::{RequestMeta, render},
    state::AppState,
};

/// Advisory token lifetime, one hour.
const TOKEN_TTL_MS: i64 = 60 * 60 * 1000;

/// Parsing happens inside the handler so a malformed body still reaches
/// the fallback log instead of dying in an extractor.
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let submission: FlagSubmission = match serde_json::from_slice(&body) {
        Ok(submission) => submission,
        Err(err) => {
            error!("Error parsing submission: {err}");
            log_unsent_raw(&body);

            return AppError::Parse(err).into_response();
        }
    };

    if submission.name.is_empty() {
        return AppError::MissingName.into_response();
    }

    match dispatch(&state, &headers, &submission).await {
        Ok(message_id) => {
            info!("Email sent successfully: {message_id}");

            (
                StatusCode::OK,
                Json(json!({
                    "message": "Flags submitted successfully",
                    "messageId": message_id,
                })),
            )
                .into_response()
        }
        Err(err) => {
            error!("Error submitting flags: {err}");
            log_unsent(&submission);

            err.into_response()
        }
    }
}

async fn dispatch(
    state: &AppState,
    headers: &HeaderMap,
    submission: &FlagSubmission,
) -> Result<String, AppError> {
    let smtp = state.config.smtp.as_ref().ok_or(AppError::NotConfigured)?;

    let meta = RequestMeta::from_headers(headers);
    let notification = render(submission, &meta);

    deliver(smtp, &state.config.recipient, &notification).await
}

/// The fallback path: when the mailbox is unreachable the payload must
/// still land somewhere an organizer can recover it from.
fn log_unsent(submission: &FlagSubmission) {
    warn!("=== FLAG SUBMISSION (EMAIL FAILED) ===");
    warn!(
        "{}",
        serde_json::to_string_pretty(submission).unwrap_or_default()
    );
    warn!("=== END SUBMISSION ===");
}

fn log_unsent_raw(body: &[u8]) {
    warn!("=== FLAG SUBMISSION (EMAIL FAILED) ===");
    warn!("{}", String::from_utf8_lossy(body));
    warn!("=== END SUBMISSION ===");
}

/// Advisory delivery token. Not tracked server-side; real CSRF protection
/// would need token storage and verification on submit.
pub async fn csrf_token_handler() -> impl IntoResponse {
    let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());

    Json(json!({
        "token": token,
        "expires": Utc::now().timestamp_millis() + TOKEN_TTL_MS,
    }))
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use axum::body::to_bytes;
    use tracing::instrument::WithSubscriber;

    use super::*;
    use crate::config::Config;

    fn unconfigured_state() -> Arc<AppState> {
        Arc::new(AppState {
            config: Config {
                port: 8080,
                recipient: "organizers@example.com".to_string(),
                smtp: None,
            },
        })
    }

    fn encoded(submission: &FlagSubmission) -> Bytes {
        Bytes::from(serde_json::to_vec(submission).unwrap())
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Collects formatted log output so tests can assert on the fallback
    /// path.
    #[derive(Clone, Default)]
    struct CaptureWriter(Arc<Mutex<Vec<u8>>>);

    impl CaptureWriter {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl io::Write for CaptureWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CaptureWriter {
        type Writer = CaptureWriter;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capturing_subscriber(capture: CaptureWriter) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_writer(capture)
            .with_ansi(false)
            .finish()
    }

    #[tokio::test]
    async fn test_missing_name_is_bad_request() {
        let response = submit_handler(
            State(unconfigured_state()),
            HeaderMap::new(),
            encoded(&FlagSubmission {
                flag1: "CTF{abc}".to_string(),
                ..Default::default()
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Name is required");
    }

    #[tokio::test]
    async fn test_unconfigured_smtp_is_server_error_with_payload_logged_once() {
        let capture = CaptureWriter::default();

        let response = submit_handler(
            State(unconfigured_state()),
            HeaderMap::new(),
            encoded(&FlagSubmission {
                name: "Alice".to_string(),
                flag1: "CTF{log-check}".to_string(),
                ..Default::default()
            }),
        )
        .with_subscriber(capturing_subscriber(capture.clone()))
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "SMTP not configured. Check server logs.");

        let logged = capture.contents();
        assert_eq!(logged.matches("CTF{log-check}").count(), 1);
        assert_eq!(
            logged.matches("=== FLAG SUBMISSION (EMAIL FAILED) ===").count(),
            1
        );
    }

    #[tokio::test]
    async fn test_malformed_body_is_server_error_with_raw_payload_logged() {
        let capture = CaptureWriter::default();

        let response = submit_handler(
            State(unconfigured_state()),
            HeaderMap::new(),
            Bytes::from_static(br#"{"name": "Alice", "flag1":"#),
        )
        .with_subscriber(capturing_subscriber(capture.clone()))
        .await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(
            body["error"],
            "Failed to send email. Submission logged to server."
        );

        let logged = capture.contents();
        assert_eq!(logged.matches(r#"{"name": "Alice", "flag1":"#).count(), 1);
    }

    #[tokio::test]
    async fn test_csrf_token_shape() {
        let before = Utc::now().timestamp_millis();
        let response = csrf_token_handler().await.into_response();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        let token = body["token"].as_str().unwrap();

        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(body["expires"].as_i64().unwrap() >= before + TOKEN_TTL_MS);
    }
}
