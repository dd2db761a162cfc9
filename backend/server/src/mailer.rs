//! # Mailer
//!
//! Hands a rendered notification to the SMTP relay.
//!
//! - One transport per request, verified with a connection test before the
//!   send so a dead relay fails fast with a diagnostic
//! - Implicit TLS on port 465, STARTTLS on everything else
//! - No send timeout is configured; a hung relay holds that one request
//!   until the platform's own timeout intervenes

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};
use tracing::info;
use uuid::Uuid;

use crate::{config::SmtpConfig, error::AppError, message::NotificationMessage};

const SENDER_NAME: &str = "CTF Platform";
const SMTPS_PORT: u16 = 465;

/// Send the notification, returning the delivery identifier.
pub async fn deliver(
    smtp: &SmtpConfig,
    recipient: &str,
    notification: &NotificationMessage,
) -> Result<String, AppError> {
    let message_id = generate_message_id();
    let email = build_email(smtp, recipient, notification, &message_id)?;

    let transport = build_transport(smtp)?;

    if !transport.test_connection().await? {
        return Err(AppError::Verification);
    }
    info!("SMTP connection verified");

    transport.send(email).await?;
    Ok(message_id)
}

fn generate_message_id() -> String {
    format!("<{}@ctf-platform>", Uuid::new_v4())
}

fn build_email(
    smtp: &SmtpConfig,
    recipient: &str,
    notification: &NotificationMessage,
    message_id: &str,
) -> Result<Message, AppError> {
    let from = Mailbox::new(Some(SENDER_NAME.to_string()), smtp.user.parse()?);

    Ok(Message::builder()
        .from(from)
        .to(recipient.parse()?)
        .subject(notification.subject.clone())
        .message_id(Some(message_id.to_string()))
        .multipart(MultiPart::alternative_plain_html(
            notification.text.clone(),
            notification.html.clone(),
        ))?)
}

fn build_transport(smtp: &SmtpConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, AppError> {
    let builder = if smtp.port == SMTPS_PORT {
        AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)?
    } else {
        AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
    };

    Ok(builder
        .port(smtp.port)
        .credentials(Credentials::new(smtp.user.clone(), smtp.password.clone()))
        .build())
}
