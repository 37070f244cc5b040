use crate::error::{config_error, env_error, OotoResult};
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::str::FromStr;

/// Default Outlook web endpoint
pub const DEFAULT_ENDPOINT: &str = "https://outlook.office.com";

/// Server version marker sent in every request header
pub const DEFAULT_SERVER_VERSION: &str = "Exchange2013";

/// Optional file overriding parts of the configuration
pub const CONFIG_FILE: &str = "config/ooto.toml";

/// Key fragments an MSAL access token entry must contain
pub const DEFAULT_TOKEN_KEY_MARKERS: [&str; 4] = [
    "msal",
    "accesstoken",
    "outlook.office.com",
    "calendars.readwrite",
];

/// Who, besides the owner, sits on the self block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecipientMode {
    /// The self block carries no attendees
    #[default]
    NoInvite,
    /// The acting user is invited to their own block
    SelfInvite,
}

impl FromStr for RecipientMode {
    type Err = crate::error::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "no_invite" => Ok(RecipientMode::NoInvite),
            "self" | "self_invite" => Ok(RecipientMode::SelfInvite),
            other => Err(config_error(&format!(
                "Invalid OOTO_RECIPIENT_MODE '{}', expected 'none' or 'self'",
                other
            ))),
        }
    }
}

impl fmt::Display for RecipientMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipientMode::NoInvite => write!(f, "none"),
            RecipientMode::SelfInvite => write!(f, "self"),
        }
    }
}

/// Recipient settings for the meeting pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipientConfig {
    /// Distribution address that receives the notification meeting
    pub notification_address: String,
    /// Self block variant
    pub mode: RecipientMode,
}

/// Overrides read from `config/ooto.toml`
#[derive(Debug, Default, Deserialize)]
struct FileOverrides {
    token_key_markers: Option<Vec<String>>,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Outlook web endpoint the writes go to
    pub endpoint: String,
    /// RequestServerVersion header value
    pub server_version: String,
    /// Organization email domain, e.g. `org.example`
    pub org_domain: String,
    /// Canonical zone id of the user's clock
    pub timezone: String,
    /// Meeting pair recipients
    pub recipients: RecipientConfig,
    /// Fragments every token key in client storage must contain
    pub token_key_markers: Vec<String>,
}

impl Config {
    /// Build a configuration with defaults for everything but the two required values
    pub fn new(notification_address: &str, org_domain: &str) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            server_version: DEFAULT_SERVER_VERSION.to_string(),
            org_domain: org_domain.to_string(),
            timezone: String::from("UTC"),
            recipients: RecipientConfig {
                notification_address: notification_address.to_string(),
                mode: RecipientMode::NoInvite,
            },
            token_key_markers: DEFAULT_TOKEN_KEY_MARKERS
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }

    /// Load configuration from environment and config file
    pub fn load() -> OotoResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Required environment variables
        let notification_address = env::var("OOTO_NOTIFICATION_ADDRESS")
            .map_err(|_| env_error("OOTO_NOTIFICATION_ADDRESS"))?;
        let org_domain = env::var("OOTO_ORG_DOMAIN").map_err(|_| env_error("OOTO_ORG_DOMAIN"))?;

        let mut config = Config::new(&notification_address, &org_domain);

        if let Ok(endpoint) = env::var("OUTLOOK_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Ok(version) = env::var("OOTO_SERVER_VERSION") {
            config.server_version = version;
        }
        if let Ok(timezone) = env::var("TIMEZONE") {
            config.timezone = timezone;
        }
        if let Ok(mode) = env::var("OOTO_RECIPIENT_MODE") {
            config.recipients.mode = mode.parse()?;
        }

        // Load overrides from file if it exists
        if let Ok(content) = fs::read_to_string(CONFIG_FILE) {
            config.apply_overrides(&content)?;
        }

        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, content: &str) -> OotoResult<()> {
        let overrides: FileOverrides = toml::from_str(content)?;
        if let Some(markers) = overrides.token_key_markers {
            if markers.is_empty() {
                return Err(config_error("token_key_markers must not be empty"));
            }
            self.token_key_markers = markers;
        }
        Ok(())
    }

    /// Check the values a request cannot do without
    pub fn validate(&self) -> OotoResult<()> {
        if !self.recipients.notification_address.contains('@') {
            return Err(config_error(&format!(
                "Notification address '{}' is not an email address",
                self.recipients.notification_address
            )));
        }
        if self.org_domain.trim().is_empty() || self.org_domain.contains('@') {
            return Err(config_error(&format!(
                "Organization domain '{}' must be a bare domain",
                self.org_domain
            )));
        }
        url::Url::parse(&self.endpoint)
            .map_err(|e| config_error(&format!("Invalid endpoint '{}': {}", self.endpoint, e)))?;
        Ok(())
    }
}
