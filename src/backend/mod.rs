//! REST client for the hosted backend (PostgREST under `/rest/v1`).

mod error;

pub use error::BackendError;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde_json::json;

use portal_core::config::{notifications_health_endpoint, HealthStatus, PortalConfig};
use portal_core::models::{
    NotificationDefaults, NotificationInsertRow, NotificationRecord, Shift, ShiftAssignment,
};
use portal_core::notifications::normalize_notification_rows;
use portal_core::realtime::build_shift_filter_value;
use portal_core::shifts::{map_shift_array, map_shift_record};
use portal_core::Row;

/// Employee-id column names tried in order on `shift_assignments`.
const ASSIGNMENT_EMPLOYEE_COLUMNS: [&str; 2] = ["employeeId", "employee_id"];

/// What the change processor needs from the backend.
#[async_trait]
pub trait PortalBackend: Send + Sync {
    /// Shift detail for a notification. Lookup failures yield `None`.
    async fn shift_by_id(&self, shift_id: &str) -> Option<Shift>;

    async fn insert_notification(&self, row: &NotificationInsertRow) -> Result<(), BackendError>;
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl BackendClient {
    pub fn new(config: &PortalConfig) -> Result<Self, BackendError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            http,
            base_url: config.supabase_url.trim().trim_end_matches('/').to_string(),
            anon_key: config.supabase_anon_key.trim().to_string(),
            access_token: None,
        })
    }

    /// Authenticate requests as a signed-in employee instead of the anon role.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into()).filter(|t: &String| !t.trim().is_empty());
        self
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        self.http
            .request(method, format!("{}/rest/v1/{}", self.base_url, table))
            .header("apikey", &self.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
            .header(header::CONTENT_TYPE, "application/json")
    }

    async fn checked(response: Response) -> Result<String, BackendError> {
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            Ok(text)
        } else {
            Err(BackendError::from_response(status.as_u16(), &text))
        }
    }

    async fn fetch_rows(&self, request: RequestBuilder) -> Result<Vec<Row>, BackendError> {
        let text = Self::checked(request.send().await?).await?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    // ============================================================
    // Shifts
    // ============================================================

    /// Assignment rows for an employee. Falls back to the snake_case column
    /// when the camelCase one does not exist.
    pub async fn shift_assignments(
        &self,
        employee_id: &str,
    ) -> Result<Vec<ShiftAssignment>, BackendError> {
        for column in ASSIGNMENT_EMPLOYEE_COLUMNS {
            let request = self
                .request(Method::GET, "shift_assignments")
                .query(&[("select", "*".to_string()), (column, format!("eq.{employee_id}"))]);
            match self.fetch_rows(request).await {
                Ok(rows) => return Ok(rows.iter().map(ShiftAssignment::from_row).collect()),
                Err(err) if err.is_missing_column() => {
                    tracing::debug!("shift_assignments has no {} column", column);
                }
                Err(err) => return Err(err),
            }
        }
        tracing::warn!("shift_assignments has no employee column; returning no shifts");
        Ok(Vec::new())
    }

    pub async fn shifts_by_ids(&self, shift_ids: &[String]) -> Result<Vec<Row>, BackendError> {
        let filter = build_shift_filter_value(shift_ids);
        if filter.is_empty() {
            return Ok(Vec::new());
        }
        let request = self
            .request(Method::GET, "shifts")
            .query(&[("select", "*".to_string()), ("id", format!("in.({filter})"))]);
        self.fetch_rows(request).await
    }

    /// Visible shifts of an employee, sorted by start.
    pub async fn shifts_for_employee(&self, employee_id: &str) -> Result<Vec<Shift>, BackendError> {
        let assignments = self.shift_assignments(employee_id).await?;
        let shift_ids: Vec<String> = assignments
            .iter()
            .filter_map(|a| a.shift_id.clone())
            .collect();
        if shift_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self.shifts_by_ids(&shift_ids).await?;
        let shifts = map_shift_array(&rows, Some(assignments.as_slice()));
        tracing::info!("Loaded {} shifts for {}", shifts.len(), employee_id);
        Ok(shifts)
    }

    async fn fetch_shift(&self, shift_id: &str) -> Result<Option<Shift>, BackendError> {
        let request = self
            .request(Method::GET, "shifts")
            .query(&[("select", "*".to_string()), ("id", format!("eq.{shift_id}"))])
            .header(header::ACCEPT, "application/json");
        let rows = self.fetch_rows(request).await?;
        Ok(rows.first().map(map_shift_record))
    }

    // ============================================================
    // Notifications
    // ============================================================

    /// Notifications for an employee, newest first. A missing table reads as
    /// an empty list.
    pub async fn notifications(
        &self,
        employee_id: &str,
        defaults: &NotificationDefaults,
    ) -> Result<Vec<NotificationRecord>, BackendError> {
        let request = self.request(Method::GET, "notifications").query(&[
            ("select", "*".to_string()),
            ("employee_id", format!("eq.{employee_id}")),
            ("order", "created_at.desc".to_string()),
        ]);
        match self.fetch_rows(request).await {
            Ok(rows) => Ok(normalize_notification_rows(&rows, defaults, chrono::Utc::now())),
            Err(err) if err.is_missing_table() => {
                tracing::warn!("notifications table is missing; showing no notifications");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }

    pub async fn mark_notification_read(
        &self,
        employee_id: &str,
        notification_id: &str,
    ) -> Result<(), BackendError> {
        let request = self
            .request(Method::PATCH, "notifications")
            .query(&[
                ("id", format!("eq.{notification_id}")),
                ("employee_id", format!("eq.{employee_id}")),
            ])
            .header("Prefer", "return=minimal")
            .json(&json!({ "is_read": true }));
        Self::checked(request.send().await?).await?;
        Ok(())
    }

    pub async fn mark_all_notifications_read(&self, employee_id: &str) -> Result<(), BackendError> {
        let request = self
            .request(Method::PATCH, "notifications")
            .query(&[
                ("employee_id", format!("eq.{employee_id}")),
                ("is_read", "eq.false".to_string()),
            ])
            .header("Prefer", "return=minimal")
            .json(&json!({ "is_read": true }));
        Self::checked(request.send().await?).await?;
        Ok(())
    }

    /// Probe the notifications table. Never fails; problems are reported in
    /// the returned status.
    pub async fn check_notifications_table(&self) -> HealthStatus {
        if self.base_url.is_empty() || self.anon_key.is_empty() {
            return HealthStatus::missing_config();
        }

        let request = self
            .http
            .get(notifications_health_endpoint(&self.base_url))
            .header("apikey", &self.anon_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.anon_key))
            .header(header::CONTENT_TYPE, "application/json");

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!("Notifications health check failed: {}", err);
                return HealthStatus::network_failure();
            }
        };
        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => HealthStatus::from_response(status, &body),
            Err(_) => HealthStatus::network_failure(),
        }
    }
}

#[async_trait]
impl PortalBackend for BackendClient {
    async fn shift_by_id(&self, shift_id: &str) -> Option<Shift> {
        match self.fetch_shift(shift_id).await {
            Ok(shift) => shift,
            Err(err) => {
                tracing::warn!("Shift detail fetch failed for {}: {}", shift_id, err);
                None
            }
        }
    }

    async fn insert_notification(&self, row: &NotificationInsertRow) -> Result<(), BackendError> {
        let request = self
            .request(Method::POST, "notifications")
            .header("Prefer", "return=minimal")
            .json(row);
        Self::checked(request.send().await?).await?;
        Ok(())
    }
}
