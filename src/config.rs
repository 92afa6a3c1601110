//! Startup configuration, read once from the environment (and `.env`).

use crate::errors::ConfigError;
use crate::model::UserId;
use chrono::Duration as ChronoDuration;
use log::LevelFilter;
use std::time::Duration;

const DEFAULT_INVITE_EXPIRY_MINUTES: i64 = 60;
const DEFAULT_OUTBOUND_TIMEOUT_SECS: u64 = 15;
const DEFAULT_AMOUNT: &str = "499";
const DEFAULT_LOG_FILE: &str = "logs/proofgate.log";

/// Load environment variables from a .env file, if there is one.
pub fn load_env() {
    dotenvy::dotenv().ok();
}

/// What `/pay` tells a prospective payer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDetails {
    pub upi_id: Option<String>,
    pub amount: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    /// Chat where proofs are posted for review.
    pub moderation_chat_id: i64,
    /// Channel a payer is invited to on approval.
    pub restricted_channel_id: i64,
    /// When set, only this user may press decision buttons.
    pub authorizer: Option<UserId>,
    pub invite_expiry: ChronoDuration,
    pub outbound_timeout: Duration,
    pub payment: PaymentDetails,
    pub log_file: String,
    pub log_level: LevelFilter,
}

impl Config {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup. Empty values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let bot_token = require("BOT_TOKEN")?;
        let moderation_chat_id = parse_value("CHANNEL_ID", require("CHANNEL_ID")?)?;
        let restricted_channel_id =
            parse_value("TARGET_CHANNEL_ID", require("TARGET_CHANNEL_ID")?)?;
        let authorizer = get("ADMIN_USER_ID")
            .map(|v| parse_value::<UserId>("ADMIN_USER_ID", v))
            .transpose()?;

        let invite_expiry = match get("INVITE_EXPIRY_MINUTES") {
            Some(v) => {
                let minutes = parse_positive("INVITE_EXPIRY_MINUTES", v.clone())?;
                ChronoDuration::try_minutes(minutes).ok_or(ConfigError::Invalid {
                    key: "INVITE_EXPIRY_MINUTES",
                    value: v,
                })?
            }
            None => ChronoDuration::minutes(DEFAULT_INVITE_EXPIRY_MINUTES),
        };
        let timeout_secs = match get("OUTBOUND_TIMEOUT_SECS") {
            Some(v) => parse_positive("OUTBOUND_TIMEOUT_SECS", v)?,
            None => DEFAULT_OUTBOUND_TIMEOUT_SECS as i64,
        };

        let log_level = match get("LOG_LEVEL") {
            Some(v) => v
                .parse::<LevelFilter>()
                .map_err(|_| ConfigError::Invalid {
                    key: "LOG_LEVEL",
                    value: v,
                })?,
            None => LevelFilter::Info,
        };

        Ok(Config {
            bot_token,
            moderation_chat_id,
            restricted_channel_id,
            authorizer,
            invite_expiry,
            outbound_timeout: Duration::from_secs(timeout_secs as u64),
            payment: PaymentDetails {
                upi_id: get("UPI_ID"),
                amount: get("AMOUNT").unwrap_or_else(|| DEFAULT_AMOUNT.to_string()),
            },
            log_file: get("LOG_FILE_PATH").unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            log_level,
        })
    }

    /// Non-fatal problems the operator should hear about at startup.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.authorizer.is_none() {
            warnings.push(
                "ADMIN_USER_ID is not set: ANY user who can see the moderation chat can approve payments"
                    .to_string(),
            );
        }
        if self.payment.upi_id.is_none() {
            warnings.push("UPI_ID is not set: /pay will not show payment details".to_string());
        }
        warnings
    }
}

fn parse_value<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid { key, value })
}

fn parse_positive(key: &'static str, value: String) -> Result<i64, ConfigError> {
    match value.parse::<i64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}
