//! API configuration

use chrono_tz::Tz;
use serde::Deserialize;

use core_kernel::{Currency, Timezone};
use domain_audit::AuditConfig;

/// API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Log level
    pub log_level: String,
    /// IANA name of the portal's operating timezone
    pub timezone: String,
    /// Currency the scheme settles in
    pub currency: Currency,
    /// Optional path to a JSON file overriding the audit thresholds
    pub audit_config_path: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: "info".to_string(),
            timezone: "Africa/Lagos".to_string(),
            currency: Currency::NGN,
            audit_config_path: None,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("NHIS"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parses the configured timezone, falling back to Lagos when the
    /// name is unknown
    pub fn portal_timezone(&self) -> Timezone {
        match self.timezone.parse::<Tz>() {
            Ok(tz) => Timezone::new(tz),
            Err(_) => {
                tracing::warn!(
                    timezone = %self.timezone,
                    "unknown timezone name, falling back to Africa/Lagos"
                );
                Timezone::lagos()
            }
        }
    }

    /// Loads the audit thresholds, from the override file when one is
    /// configured and readable, otherwise the scheme defaults
    pub fn load_audit_config(&self) -> AuditConfig {
        let defaults = AuditConfig {
            timezone: self.portal_timezone(),
            ..AuditConfig::default()
        };
        let Some(path) = &self.audit_config_path else {
            return defaults;
        };

        match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str::<AuditConfig>(&raw).map_err(|e| e.to_string()))
        {
            Ok(audit) => {
                tracing::info!(path = %path, "audit thresholds loaded from override file");
                audit
            }
            Err(error) => {
                tracing::warn!(
                    path = %path,
                    error = %error,
                    "audit threshold override unreadable, using defaults"
                );
                defaults
            }
        }
    }
}
