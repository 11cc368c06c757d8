use serde::{Deserialize, Serialize};

/// Employee acknowledgement state of an assigned shift. Separate from the
/// shift's own scheduling status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ShiftConfirmationStatus {
    #[serde(rename = "not published")]
    NotPublished,
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "scheduled")]
    Scheduled,
    #[serde(rename = "assigned")]
    Assigned,
    #[serde(rename = "published")]
    Published,
    #[serde(rename = "confirmed")]
    Confirmed,
    #[serde(rename = "confirmed by employee")]
    ConfirmedByEmployee,
}

impl ShiftConfirmationStatus {
    pub const ALL: [Self; 7] = [
        Self::NotPublished,
        Self::Pending,
        Self::Scheduled,
        Self::Assigned,
        Self::Published,
        Self::Confirmed,
        Self::ConfirmedByEmployee,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotPublished => "not published",
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Assigned => "assigned",
            Self::Published => "published",
            Self::Confirmed => "confirmed",
            Self::ConfirmedByEmployee => "confirmed by employee",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not published" => Some(Self::NotPublished),
            "pending" => Some(Self::Pending),
            "scheduled" => Some(Self::Scheduled),
            "assigned" => Some(Self::Assigned),
            "published" => Some(Self::Published),
            "confirmed" => Some(Self::Confirmed),
            "confirmed by employee" => Some(Self::ConfirmedByEmployee),
            _ => None,
        }
    }

    /// Canonicalizes whatever the backend stored. Case and surrounding
    /// whitespace are ignored and runs of `_`/`-` read as a space; anything
    /// unrecognised, including an absent value, is `NotPublished`.
    pub fn normalize(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::NotPublished;
        };
        let lowered = value.trim().to_lowercase();
        let mut collapsed = String::with_capacity(lowered.len());
        let mut in_separator = false;
        for c in lowered.chars() {
            if c == '_' || c == '-' {
                if !in_separator {
                    collapsed.push(' ');
                }
                in_separator = true;
            } else {
                collapsed.push(c);
                in_separator = false;
            }
        }
        Self::from_str(&collapsed).unwrap_or(Self::NotPublished)
    }

    pub fn label_key(&self) -> &'static str {
        match self {
            Self::NotPublished => "shiftConfirmationNotPublished",
            Self::Pending => "shiftConfirmationPending",
            Self::Scheduled => "shiftConfirmationScheduled",
            Self::Assigned => "shiftConfirmationAssigned",
            Self::Published => "shiftConfirmationPublished",
            Self::Confirmed => "shiftConfirmationConfirmed",
            Self::ConfirmedByEmployee => "shiftConfirmationConfirmedByEmployee",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NotPublished => "Not published",
            Self::Pending => "Pending",
            Self::Scheduled => "Scheduled",
            Self::Assigned => "Assigned",
            Self::Published => "Published",
            Self::Confirmed => "Confirmed",
            Self::ConfirmedByEmployee => "Confirmed by employee",
        }
    }

    /// Shifts in these states are not shown to the employee yet.
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::NotPublished | Self::Pending)
    }
}
