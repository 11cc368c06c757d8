use serde::{Deserialize, Serialize};

use super::ShiftConfirmationStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: String,
    pub title: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_address: Option<String>,
    /// ISO-8601 start. Kept as text because backend rows may carry values
    /// that do not parse.
    pub start: String,
    pub end: String,
    pub status: ShiftStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_status: Option<ShiftConfirmationStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ShiftStatus {
    Scheduled,
    InProgress,
    Completed,
    Blocked,
}

impl ShiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Blocked => "blocked",
        }
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            Self::Scheduled => "shiftStatusScheduled",
            Self::InProgress => "shiftStatusInProgress",
            Self::Completed => "shiftStatusCompleted",
            Self::Blocked => "shiftStatusBlocked",
        }
    }

    /// Free-text status from the backend. Matching is by substring, anything
    /// unrecognised counts as scheduled.
    pub fn normalize(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::Scheduled;
        };
        let normalized = value.to_lowercase();
        if normalized.contains("progress") {
            Self::InProgress
        } else if normalized.contains("complete") {
            Self::Completed
        } else if normalized.contains("block") {
            Self::Blocked
        } else {
            Self::Scheduled
        }
    }
}

/// Link between an employee and a shift, as read from `shift_assignments`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftAssignment {
    pub assignment_id: Option<String>,
    pub shift_id: Option<String>,
    pub confirmation_status: Option<String>,
    pub confirmed_at: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShiftPhase {
    Upcoming,
    Live,
    Past,
}

impl ShiftPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Live => "live",
            Self::Past => "past",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Live => "Live now",
            Self::Past => "Past shift",
        }
    }

    /// Translation key for the label.
    pub fn label_key(&self) -> &'static str {
        match self {
            Self::Upcoming => "shiftPhaseUpcoming",
            Self::Live => "shiftPhaseLive",
            Self::Past => "shiftPhasePast",
        }
    }
}
