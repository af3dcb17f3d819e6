//! Application configuration loaded from environment variables.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use domain::{Amount, CampaignSettings};
use gateway::GatewayConfig;

/// Server, campaign, and gateway configuration with sensible defaults
/// for local development.
///
/// Reads from environment variables:
/// - `HOST` / `PORT` — bind address (default `0.0.0.0:3000`)
/// - `RUST_LOG` — tracing filter directive (default `"info"`)
/// - `DATABASE_URL` — Postgres URL; absent means the in-memory store
/// - `CAMPAIGN_TARGET_KES`, `CAMPAIGN_START`, `CAMPAIGN_END`,
///   `CAMPAIGN_ACTIVE`, `MAX_CONTRIBUTION_KES` — campaign settings
/// - `MPESA_CONSUMER_KEY`, `MPESA_CONSUMER_SECRET`, `MPESA_SHORT_CODE`,
///   `MPESA_PASSKEY`, `MPESA_ACCOUNT_REFERENCE`, `CALLBACK_URL`,
///   `GATEWAY_TIMEOUT_SECS` — provider settings
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub database_url: Option<String>,

    pub campaign_target_kes: i64,
    pub campaign_start: DateTime<Utc>,
    pub campaign_end: DateTime<Utc>,
    pub campaign_active: bool,
    pub max_contribution_kes: i64,

    pub consumer_key: String,
    pub consumer_secret: String,
    pub short_code: String,
    pub passkey: String,
    pub account_reference: String,
    pub callback_url: String,
    pub gateway_timeout_secs: u64,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_datetime(name: &str, default: DateTime<Utc>) -> DateTime<Utc> {
    std::env::var(name)
        .ok()
        .and_then(|v| DateTime::parse_from_rfc3339(&v).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(default)
}

impl Config {
    /// Loads configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse("PORT", 3000),
            log_level: env_or("RUST_LOG", "info"),
            database_url: std::env::var("DATABASE_URL").ok(),

            campaign_target_kes: env_parse("CAMPAIGN_TARGET_KES", 2_300_000),
            campaign_start: env_datetime(
                "CAMPAIGN_START",
                Utc.with_ymd_and_hms(2026, 12, 5, 8, 0, 0).unwrap(),
            ),
            campaign_end: env_datetime(
                "CAMPAIGN_END",
                Utc.with_ymd_and_hms(2026, 12, 7, 18, 0, 0).unwrap(),
            ),
            campaign_active: env_parse("CAMPAIGN_ACTIVE", true),
            max_contribution_kes: env_parse("MAX_CONTRIBUTION_KES", 1_000_000),

            consumer_key: env_or("MPESA_CONSUMER_KEY", "sandbox-key"),
            consumer_secret: env_or("MPESA_CONSUMER_SECRET", "sandbox-secret"),
            short_code: env_or("MPESA_SHORT_CODE", "174379"),
            passkey: env_or("MPESA_PASSKEY", "sandbox-passkey"),
            account_reference: env_or("MPESA_ACCOUNT_REFERENCE", "Camp2025"),
            callback_url: env_or("CALLBACK_URL", "http://localhost:3000/payments/callback"),
            gateway_timeout_secs: env_parse("GATEWAY_TIMEOUT_SECS", 30),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// The campaign settings injected into the engine and stats
    /// services.
    pub fn campaign_settings(&self) -> CampaignSettings {
        CampaignSettings {
            target_amount: Amount::from_kes(self.campaign_target_kes),
            event_start: self.campaign_start,
            event_end: self.campaign_end,
            account_reference: self.account_reference.clone(),
            max_contribution: Amount::from_kes(self.max_contribution_kes),
            is_active: self.campaign_active,
        }
    }

    /// The provider configuration injected into the gateway client.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            consumer_key: self.consumer_key.clone(),
            consumer_secret: self.consumer_secret.clone(),
            short_code: self.short_code.clone(),
            passkey: self.passkey.clone(),
            callback_url: self.callback_url.clone(),
            timeout: self.gateway_timeout(),
        }
    }

    /// Upper bound for any single gateway call.
    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_secs(self.gateway_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            database_url: None,
            campaign_target_kes: 2_300_000,
            campaign_start: Utc.with_ymd_and_hms(2026, 12, 5, 8, 0, 0).unwrap(),
            campaign_end: Utc.with_ymd_and_hms(2026, 12, 7, 18, 0, 0).unwrap(),
            campaign_active: true,
            max_contribution_kes: 1_000_000,
            consumer_key: "sandbox-key".to_string(),
            consumer_secret: "sandbox-secret".to_string(),
            short_code: "174379".to_string(),
            passkey: "sandbox-passkey".to_string(),
            account_reference: "Camp2025".to_string(),
            callback_url: "http://localhost:3000/payments/callback".to_string(),
            gateway_timeout_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.addr(), "0.0.0.0:3000");
        assert!(config.database_url.is_none());
        assert_eq!(config.gateway_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_campaign_settings_mapping() {
        let settings = Config::default().campaign_settings();
        assert_eq!(settings.target_amount, Amount::from_kes(2_300_000));
        assert_eq!(settings.max_contribution, Amount::from_kes(1_000_000));
        assert_eq!(settings.account_reference, "Camp2025");
        assert!(settings.is_active);
    }

    #[test]
    fn test_gateway_config_mapping() {
        let gateway = Config::default().gateway_config();
        assert_eq!(gateway.short_code, "174379");
        assert_eq!(gateway.timeout, Duration::from_secs(30));
    }
}
