//! # Notification Rendering
//!
//! Turns an accepted submission into the email the organizers receive.
//!
//! - Every flag field is listed, present or not, so a partial submission
//!   reads the same as a full one
//! - Request metadata rides along for manual triage: forwarded address,
//!   user agent, UTC timestamp
//! - Header lookups take the first present value and default to "Unknown"

use axum::http::HeaderMap;
use chrono::{DateTime, SecondsFormat, Utc};
use flags::{FLAG_FIELDS, FlagSubmission};

const PLATFORM_NAME: &str = "CTF Platform";
const NOT_SUBMITTED: &str = "Not submitted";

pub struct RequestMeta {
    pub ip: String,
    pub user_agent: String,
    pub timestamp: DateTime<Utc>,
}

impl RequestMeta {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            ip: first_header(headers, &["x-forwarded-for", "x-real-ip"]),
            user_agent: first_header(headers, &["user-agent"]),
            timestamp: Utc::now(),
        }
    }
}

pub struct NotificationMessage {
    pub subject: String,
    pub text: String,
    pub html: String,
}

fn first_header(headers: &HeaderMap, names: &[&str]) -> String {
    names
        .iter()
        .find_map(|name| headers.get(*name))
        .and_then(|value| value.to_str().ok())
        .unwrap_or("Unknown")
        .to_string()
}

pub fn render(submission: &FlagSubmission, meta: &RequestMeta) -> NotificationMessage {
    NotificationMessage {
        subject: format!("CTF Flag Submission - {}", submission.name),
        text: render_text(submission, meta),
        html: render_html(submission, meta),
    }
}

fn render_text(submission: &FlagSubmission, meta: &RequestMeta) -> String {
    let timestamp = meta.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut body = format!(
        "CTF Flag Submission\n\n\
         Participant: {}\n\
         Submission Time: {}\n\n\
         === SUBMITTED FLAGS ===\n\n",
        submission.name, timestamp
    );

    for (field, value) in FLAG_FIELDS.iter().zip(submission.flags()) {
        let shown = if value.is_empty() { NOT_SUBMITTED } else { value };
        body.push_str(&format!("{}: {}\n", field.label, shown));
    }

    body.push_str(&format!(
        "\n=== SUBMISSION DETAILS ===\n\n\
         IP Address: {}\n\
         User Agent: {}\n\
         Timestamp: {}\n\n\
         ---\n\
         This submission was sent automatically from the {PLATFORM_NAME}.\n",
        meta.ip, meta.user_agent, timestamp
    ));

    body
}

fn render_html(submission: &FlagSubmission, meta: &RequestMeta) -> String {
    let timestamp = meta.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut fields = String::new();
    for (field, value) in FLAG_FIELDS.iter().zip(submission.flags()) {
        // Green block when present, red when absent.
        let (background, shown) = if value.is_empty() {
            ("#f8d7da", format!("<em>{NOT_SUBMITTED}</em>"))
        } else {
            ("#d4edda", value.to_string())
        };

        fields.push_str(&format!(
            r#"<div style="margin: 15px 0;">
    <h3 style="margin: 10px 0 5px 0; font-size: 16px;">{}: {}</h3>
    <div style="background: {background}; padding: 10px; border-radius: 4px; font-family: monospace;">{shown}</div>
</div>
"#,
            field.label, field.description
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>CTF Flag Submission</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1>CTF Flag Submission</h1>
    <p><strong>Name:</strong> {}</p>
    <p><strong>Submission Time:</strong> {timestamp}</p>
    <h2>Submitted Flags</h2>
{fields}
    <h3>Submission Details</h3>
    <p><strong>IP Address:</strong> {}</p>
    <p><strong>User Agent:</strong> {}</p>
    <p style="color: #666; font-size: 14px;">This email was sent automatically from the {PLATFORM_NAME}.</p>
</body>
</html>
"#,
        submission.name, meta.ip, meta.user_agent
    )
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn meta() -> RequestMeta {
        RequestMeta {
            ip: "203.0.113.7".to_string(),
            user_agent: "curl/8.0".to_string(),
            timestamp: Utc::now(),
        }
    }

    fn submission() -> FlagSubmission {
        FlagSubmission {
            name: "Alice".to_string(),
            flag1: "CTF{abc}".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_text_lists_every_field() {
        let rendered = render(&submission(), &meta());

        assert_eq!(rendered.subject, "CTF Flag Submission - Alice");
        assert!(rendered.text.contains("Participant: Alice"));
        assert!(rendered.text.contains("Network/DNS: CTF{abc}"));
        assert!(rendered.text.contains("Crypto/XOR: Not submitted"));
        assert!(rendered.text.contains("Steganography: Not submitted"));
        assert!(rendered.text.contains("IP Address: 203.0.113.7"));
    }

    #[test]
    fn test_html_marks_present_and_absent() {
        let rendered = render(&submission(), &meta());

        assert!(rendered.html.contains("#d4edda"));
        assert!(rendered.html.contains("#f8d7da"));
        assert!(rendered.html.contains("CTF{abc}"));
        assert!(rendered.html.contains("<em>Not submitted</em>"));
        assert!(rendered.html.contains("curl/8.0"));
    }

    #[test]
    fn test_forwarded_address_wins_over_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("198.51.100.1"));
        headers.insert("x-real-ip", HeaderValue::from_static("192.0.2.9"));
        headers.insert("user-agent", HeaderValue::from_static("curl/8.0"));

        let meta = RequestMeta::from_headers(&headers);

        assert_eq!(meta.ip, "198.51.100.1");
        assert_eq!(meta.user_agent, "curl/8.0");
    }

    #[test]
    fn test_missing_headers_default_unknown() {
        let meta = RequestMeta::from_headers(&HeaderMap::new());

        assert_eq!(meta.ip, "Unknown");
        assert_eq!(meta.user_agent, "Unknown");
    }
}
