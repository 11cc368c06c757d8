//! Environment and runtime configuration checks.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::Language;
use crate::rows::Row;

pub const REQUIRED_ENV: [&str; 4] = ["SUPABASE_URL", "SUPABASE_ANON_KEY", "DATABASE_URL", "DIRECT_URL"];
const URL_ENV: [&str; 3] = ["SUPABASE_URL", "DATABASE_URL", "DIRECT_URL"];
const KEY_PREFIXES: [&str; 3] = ["sb_publishable_", "sb_secret_", "eyJ"];

const REQUIRED_RUNTIME_KEYS: [&str; 3] = ["supabaseUrl", "supabaseAnonKey", "apiBaseUrl"];

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Settings the portal needs to talk to the hosted backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub api_base_url: Option<String>,
    pub db_path: Option<PathBuf>,
    pub language: Language,
    pub request_timeout: Duration,
}

impl PortalConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let supabase_url = read("SUPABASE_URL").ok_or(ConfigError::MissingVar("SUPABASE_URL"))?;
        let supabase_anon_key =
            read("SUPABASE_ANON_KEY").ok_or(ConfigError::MissingVar("SUPABASE_ANON_KEY"))?;

        let language = match read("PORTAL_LANGUAGE") {
            Some(value) => Language::from_str(&value.to_lowercase()).ok_or(
                ConfigError::InvalidValue {
                    key: "PORTAL_LANGUAGE",
                    value,
                },
            )?,
            None => Language::default(),
        };

        let request_timeout = match read("PORTAL_REQUEST_TIMEOUT_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "PORTAL_REQUEST_TIMEOUT_SECS",
                        value,
                    })
                }
            },
            None => DEFAULT_REQUEST_TIMEOUT,
        };

        Ok(Self {
            supabase_url,
            supabase_anon_key,
            api_base_url: read("API_BASE_URL"),
            db_path: read("PORTAL_DB_PATH").map(PathBuf::from),
            language,
            request_timeout,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvCheck {
    pub key: &'static str,
    pub found: bool,
    pub note: Option<&'static str>,
}

/// Result of the standalone database configuration check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvReport {
    pub expected_host: Option<String>,
    pub checks: Vec<EnvCheck>,
    pub missing: Vec<&'static str>,
    pub urls_match_host: bool,
}

impl EnvReport {
    pub fn passed(&self) -> bool {
        self.missing.is_empty() && self.urls_match_host
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed() {
            0
        } else {
            1
        }
    }

    pub fn render(&self) -> String {
        let mut lines = vec![
            "Supabase/Postgres configuration check".to_string(),
            "-------------------------------------".to_string(),
        ];
        for check in &self.checks {
            lines.push(format!(
                "{}: {}{}",
                check.key,
                if check.found { "FOUND" } else { "MISSING" },
                check.note.unwrap_or("")
            ));
        }

        lines.push(String::new());
        if !self.missing.is_empty() {
            lines.push(format!("Missing required env vars: {}", self.missing.join(", ")));
        } else if !self.urls_match_host {
            lines.push(
                "Warning: one or more URL values do not reference the shared Supabase host."
                    .to_string(),
            );
        } else {
            lines.push(
                "All required env vars are present and URL values point to the Supabase project."
                    .to_string(),
            );
        }
        lines.join("\n")
    }
}

fn looks_like_backend_key(value: &str) -> bool {
    KEY_PREFIXES.iter().any(|prefix| value.starts_with(prefix))
}

fn host_of(value: &str) -> Option<String> {
    url::Url::parse(value)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
}

/// Check the backend environment. Without `expected_host` the host of
/// `SUPABASE_URL` is used.
pub fn check_environment<F>(lookup: F, expected_host: Option<&str>) -> EnvReport
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| lookup(key).filter(|value| !value.is_empty());

    let expected_host = expected_host
        .map(str::to_string)
        .filter(|host| !host.trim().is_empty())
        .or_else(|| read("SUPABASE_URL").as_deref().and_then(host_of));

    let references_host = |value: Option<&str>| match (value, expected_host.as_deref()) {
        (Some(value), Some(host)) => value.contains(host),
        _ => false,
    };

    let checks: Vec<EnvCheck> = REQUIRED_ENV
        .iter()
        .map(|&key| {
            let value = read(key);
            let note = match value.as_deref() {
                None => None,
                Some(value) if URL_ENV.contains(&key) => (!references_host(Some(value)))
                    .then_some(" (not pointing to shared Supabase host)"),
                Some(value) if key.ends_with("_KEY") => {
                    (!looks_like_backend_key(value)).then_some(" (unexpected key format)")
                }
                Some(_) => None,
            };
            EnvCheck {
                key,
                found: value.is_some(),
                note,
            }
        })
        .collect();

    let missing = checks
        .iter()
        .filter(|check| !check.found)
        .map(|check| check.key)
        .collect();
    let urls_match_host = URL_ENV
        .iter()
        .all(|key| references_host(read(key).as_deref()));

    EnvReport {
        expected_host,
        checks,
        missing,
        urls_match_host,
    }
}

/// One message per required runtime key that is absent or blank.
pub fn runtime_config_issues(extra: &Row) -> Vec<String> {
    REQUIRED_RUNTIME_KEYS
        .iter()
        .filter(|key| {
            !matches!(extra.get(**key), Some(Value::String(value)) if !value.trim().is_empty())
        })
        .map(|key| format!("Missing required runtime config: {key}"))
        .collect()
}

pub fn parse_boolean_extra(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => *flag,
        Value::String(text) => matches!(
            text.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        _ => false,
    }
}

pub fn notifications_health_endpoint(base_url: &str) -> String {
    format!(
        "{}/rest/v1/notifications?select=id&limit=1",
        base_url.trim_end_matches('/')
    )
}

pub fn is_missing_table_response(status: u16, body: &str) -> bool {
    status == 404 && body.contains("PGRST205")
}

/// Outcome of the notifications table probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            ok: true,
            issue: None,
        }
    }

    pub fn failing(issue: impl Into<String>) -> Self {
        Self {
            ok: false,
            issue: Some(issue.into()),
        }
    }

    pub fn missing_config() -> Self {
        Self::failing("Cannot check notifications table: missing Supabase config.")
    }

    pub fn network_failure() -> Self {
        Self::failing("Notifications health check failed due to network or timeout.")
    }

    /// Classify a completed probe response.
    pub fn from_response(status: u16, body: &str) -> Self {
        if (200..300).contains(&status) {
            Self::healthy()
        } else if is_missing_table_response(status, body) {
            Self::failing("notifications table is missing. Apply supabase/notifications-table.sql.")
        } else if status == 401 || status == 403 {
            Self::failing("Notifications health check unauthorized. Verify Supabase API keys.")
        } else {
            Self::failing(format!("Notifications health check failed ({status})."))
        }
    }
}
