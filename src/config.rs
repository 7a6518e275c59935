// Gateway configuration, read from the environment
//
// Every credential is required. The error names the missing variable so it
// can be logged; callers must not show it to visitors.

use thiserror::Error;

use crate::submission::FormFieldMap;

pub const FORM_SERVICE_API_KEY: &str = "FORM_SERVICE_API_KEY";
pub const FORM_SERVICE_FORM_ID: &str = "FORM_SERVICE_FORM_ID";
pub const FORM_SERVICE_BASE_URL: &str = "FORM_SERVICE_BASE_URL";
pub const FORM_SERVICE_TIMEOUT_MS: &str = "FORM_SERVICE_TIMEOUT_MS";
pub const MESSAGING_INSTANCE_ID: &str = "MESSAGING_INSTANCE_ID";
pub const MESSAGING_API_TOKEN: &str = "MESSAGING_API_TOKEN";
pub const MESSAGING_DESTINATION: &str = "MESSAGING_DESTINATION";
pub const MESSAGING_BASE_URL: &str = "MESSAGING_BASE_URL";
pub const MESSAGING_TIMEOUT_MS: &str = "MESSAGING_TIMEOUT_MS";

pub const DEFAULT_FORM_SERVICE_BASE_URL: &str = "https://api.jotform.com";
pub const DEFAULT_MESSAGING_BASE_URL: &str = "https://api.green-api.com";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("HTTP client initialization failed: {0}")]
    HttpClient(String),
}

#[derive(Debug, Clone)]
pub struct FormServiceConfig {
    pub base_url: String,
    pub api_key: String,
    pub form_id: String,
    pub timeout_ms: u64,
    pub fields: FormFieldMap,
}

impl FormServiceConfig {
    pub fn new(base_url: &str, api_key: &str, form_id: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: api_key.to_string(),
            form_id: form_id.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            fields: FormFieldMap::default(),
        }
    }

    pub fn submission_url(&self) -> String {
        format!(
            "{}/form/{}/submissions",
            self.base_url.trim_end_matches('/'),
            self.form_id
        )
    }
}

#[derive(Debug, Clone)]
pub struct MessagingConfig {
    pub base_url: String,
    pub instance_id: String,
    pub api_token: String,
    /// Operator number, with or without `+` and the chat suffix.
    pub destination: String,
    pub timeout_ms: u64,
}

impl MessagingConfig {
    pub fn new(base_url: &str, instance_id: &str, api_token: &str, destination: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            instance_id: instance_id.to_string(),
            api_token: api_token.to_string(),
            destination: destination.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn send_message_url(&self) -> String {
        format!(
            "{}/waInstance{}/sendMessage/{}",
            self.base_url.trim_end_matches('/'),
            self.instance_id,
            self.api_token
        )
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub form: FormServiceConfig,
    pub messaging: MessagingConfig,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any name → value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &str, default: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };
        let timeout = |name: &str| {
            lookup(name)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .filter(|ms| *ms > 0)
                .unwrap_or(DEFAULT_TIMEOUT_MS)
        };

        let form = FormServiceConfig {
            base_url: optional(FORM_SERVICE_BASE_URL, DEFAULT_FORM_SERVICE_BASE_URL),
            api_key: required(FORM_SERVICE_API_KEY)?,
            form_id: required(FORM_SERVICE_FORM_ID)?,
            timeout_ms: timeout(FORM_SERVICE_TIMEOUT_MS),
            fields: FormFieldMap::default(),
        };

        let messaging = MessagingConfig {
            base_url: optional(MESSAGING_BASE_URL, DEFAULT_MESSAGING_BASE_URL),
            instance_id: required(MESSAGING_INSTANCE_ID)?,
            api_token: required(MESSAGING_API_TOKEN)?,
            destination: required(MESSAGING_DESTINATION)?,
            timeout_ms: timeout(MESSAGING_TIMEOUT_MS),
        };

        Ok(Self { form, messaging })
    }
}
