use serde::{Deserialize, Serialize};

use crate::rows::Row;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: String,
    pub title: String,
    pub detail: String,
    pub created_at: String,
    pub read: bool,
    pub category: NotificationCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_path: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationCategory {
    ShiftPublished,
    ShiftRemoved,
    ShiftSchedule,
    Admin,
    General,
}

impl NotificationCategory {
    pub const ALL: [Self; 5] = [
        Self::ShiftPublished,
        Self::ShiftRemoved,
        Self::ShiftSchedule,
        Self::Admin,
        Self::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShiftPublished => "shift-published",
            Self::ShiftRemoved => "shift-removed",
            Self::ShiftSchedule => "shift-schedule",
            Self::Admin => "admin",
            Self::General => "general",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "shift-published" => Some(Self::ShiftPublished),
            "shift-removed" => Some(Self::ShiftRemoved),
            "shift-schedule" => Some(Self::ShiftSchedule),
            "admin" => Some(Self::Admin),
            "general" => Some(Self::General),
            _ => None,
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            Self::ShiftPublished => "notificationCategoryShiftPublished",
            Self::ShiftRemoved => "notificationCategoryShiftRemoved",
            Self::ShiftSchedule => "notificationCategoryScheduleChanged",
            Self::Admin => "notificationCategoryAdminMessage",
            Self::General => "notificationCategoryGeneral",
        }
    }
}

/// Copy used when a row has no usable title or detail.
#[derive(Debug, Clone)]
pub struct NotificationDefaults {
    pub title: String,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSectionKey {
    Today,
    Yesterday,
    Earlier,
}

impl NotificationSectionKey {
    pub fn label_key(&self) -> &'static str {
        match self {
            Self::Today => "notificationsSectionToday",
            Self::Yesterday => "notificationsSectionYesterday",
            Self::Earlier => "notificationsSectionEarlier",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SectionLabels {
    pub today: String,
    pub yesterday: String,
    pub earlier: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationSection {
    pub key: NotificationSectionKey,
    pub title: String,
    pub items: Vec<NotificationRecord>,
}

/// Row written to the `notifications` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationInsertRow {
    pub employee_id: String,
    pub title: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Row>,
}

impl NotificationInsertRow {
    /// Empty metadata is dropped rather than stored as `{}`.
    pub fn new(employee_id: &str, title: String, detail: String, metadata: Option<Row>) -> Self {
        Self {
            employee_id: employee_id.to_string(),
            title,
            detail,
            metadata: metadata.filter(|m| !m.is_empty()),
        }
    }
}

/// Error body returned by the backend's REST layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostgrestErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl PostgrestErrorBody {
    pub fn is_missing_column(&self) -> bool {
        self.code.as_deref() == Some("42703")
    }

    pub fn is_missing_notifications_table(&self) -> bool {
        self.code.as_deref() == Some("PGRST205")
            || self
                .message
                .as_deref()
                .is_some_and(|m| m.contains("Could not find the table 'public.notifications'"))
    }
}
