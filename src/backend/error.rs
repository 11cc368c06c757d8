use portal_core::config::ConfigError;
use portal_core::models::PostgrestErrorBody;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to backend failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Api {
        status: u16,
        message: String,
        body: PostgrestErrorBody,
    },

    #[error("could not decode backend response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl BackendError {
    /// Builds an API error from a non-2xx response body.
    pub fn from_response(status: u16, text: &str) -> Self {
        let body: PostgrestErrorBody = serde_json::from_str(text).unwrap_or_default();
        let message = body
            .message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if text.trim().is_empty() {
                    "no response body".to_string()
                } else {
                    text.trim().to_string()
                }
            });
        Self::Api {
            status,
            message,
            body,
        }
    }

    pub fn is_missing_column(&self) -> bool {
        matches!(self, Self::Api { body, .. } if body.is_missing_column())
    }

    pub fn is_missing_table(&self) -> bool {
        matches!(self, Self::Api { body, .. } if body.is_missing_notifications_table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_reads_postgrest_body() {
        let err = BackendError::from_response(
            400,
            r#"{"code":"42703","message":"column shift_assignments.employeeId does not exist"}"#,
        );
        assert!(err.is_missing_column());
        assert!(!err.is_missing_table());
        assert_eq!(
            err.to_string(),
            "backend returned 400: column shift_assignments.employeeId does not exist"
        );
    }

    #[test]
    fn test_from_response_detects_missing_table() {
        let err = BackendError::from_response(
            404,
            r#"{"code":"PGRST205","message":"Could not find the table 'public.notifications' in the schema cache"}"#,
        );
        assert!(err.is_missing_table());
    }

    #[test]
    fn test_from_response_keeps_plain_text() {
        let err = BackendError::from_response(502, "Bad gateway");
        assert_eq!(err.to_string(), "backend returned 502: Bad gateway");
        assert!(!err.is_missing_column());
    }
}
