use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Fallback recipient when `SUBMISSION_EMAIL` is unset.
pub const DEFAULT_RECIPIENT: &str = "organizers@example.com";

pub struct Config {
    pub port: u16,
    pub recipient: String,
    pub smtp: Option<SmtpConfig>,
}

pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "8080"),
            recipient: var("SUBMISSION_EMAIL").unwrap_or_else(|_| {
                info!("SUBMISSION_EMAIL not set, using default: {DEFAULT_RECIPIENT}");
                DEFAULT_RECIPIENT.to_string()
            }),
            smtp: SmtpConfig::load(),
        }
    }
}

impl SmtpConfig {
    /// Missing relay credentials disable delivery instead of aborting
    /// startup; submissions then fail per-request with the payload logged.
    fn load() -> Option<Self> {
        match (var("SMTP_HOST"), var("SMTP_USER"), var("SMTP_PASSWORD")) {
            (Ok(host), Ok(user), Ok(password)) => Some(Self {
                host,
                port: try_load("SMTP_PORT", "587"),
                user,
                password,
            }),
            _ => {
                warn!("SMTP disabled. Required variables: SMTP_HOST, SMTP_USER, SMTP_PASSWORD");
                None
            }
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
