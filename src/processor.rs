//! Turns change-feed events on `shift_assignments` and `shifts` into
//! notification rows for one employee.

use serde::Serialize;

use portal_core::models::{ChangeEvent, NotificationInsertRow, RealtimePayload};
use portal_core::realtime::{
    build_event_key, build_shift_detail, build_shift_notification_payload, shift_id_of,
    should_notify_schedule_update, EventDeduplicator, ShiftNotificationCopy,
    ShiftNotificationPayload,
};
use portal_core::Row;

use crate::backend::PortalBackend;

/// Table a change event was emitted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeTable {
    ShiftAssignments,
    Shifts,
}

impl ChangeTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShiftAssignments => "shift_assignments",
            Self::Shifts => "shifts",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "shift_assignments" => Some(Self::ShiftAssignments),
            "shifts" => Some(Self::Shifts),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    MissingShiftId,
    Duplicate,
    MissingEventType,
    AssignmentUpdate,
    NoScheduleChange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum EventOutcome {
    Notified {
        payload: ShiftNotificationPayload,
        persisted: bool,
    },
    Skipped {
        reason: SkipReason,
    },
}

impl EventOutcome {
    fn skipped(reason: SkipReason) -> Self {
        tracing::debug!(?reason, "Skipping change event");
        Self::Skipped { reason }
    }
}

pub struct ShiftEventProcessor<B> {
    backend: B,
    employee_id: String,
    copy: ShiftNotificationCopy,
    assignments: EventDeduplicator,
    shifts: EventDeduplicator,
}

impl<B: PortalBackend> ShiftEventProcessor<B> {
    pub fn new(backend: B, employee_id: impl Into<String>, copy: ShiftNotificationCopy) -> Self {
        Self {
            backend,
            employee_id: employee_id.into(),
            copy,
            assignments: EventDeduplicator::new(),
            shifts: EventDeduplicator::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn employee_id(&self) -> &str {
        &self.employee_id
    }

    /// Switch employees. Seen-event caches belong to the previous employee
    /// and are dropped.
    pub fn set_employee(&mut self, employee_id: impl Into<String>) {
        self.employee_id = employee_id.into();
        self.assignments.clear();
        self.shifts.clear();
    }

    pub async fn handle(&mut self, table: ChangeTable, payload: &RealtimePayload) -> EventOutcome {
        match table {
            ChangeTable::ShiftAssignments => self.handle_assignment_event(payload).await,
            ChangeTable::Shifts => self.handle_shift_event(payload).await,
        }
    }

    /// An assignment was added or removed: the shift was published to or
    /// removed from the employee.
    pub async fn handle_assignment_event(&mut self, payload: &RealtimePayload) -> EventOutcome {
        let Some(shift_id) =
            shift_id_of(payload.new_row.as_ref()).or_else(|| shift_id_of(payload.old_row.as_ref()))
        else {
            return EventOutcome::skipped(SkipReason::MissingShiftId);
        };

        let key = build_event_key(&shift_id, payload);
        if !self.assignments.observe(&shift_id, &key) {
            return EventOutcome::skipped(SkipReason::Duplicate);
        }

        let event = match payload.event() {
            None => return EventOutcome::skipped(SkipReason::MissingEventType),
            Some(ChangeEvent::Update) => return EventOutcome::skipped(SkipReason::AssignmentUpdate),
            Some(event) => event,
        };

        self.notify(&shift_id, event.as_str(), payload).await
    }

    /// A shift row changed. Only moves of start, end or location notify.
    pub async fn handle_shift_event(&mut self, payload: &RealtimePayload) -> EventOutcome {
        if payload.event().is_none() {
            return EventOutcome::skipped(SkipReason::MissingEventType);
        }
        if !should_notify_schedule_update(payload) {
            return EventOutcome::skipped(SkipReason::NoScheduleChange);
        }

        let Some(shift_id) = changed_shift_id(payload) else {
            return EventOutcome::skipped(SkipReason::MissingShiftId);
        };

        let key = build_event_key(&shift_id, payload);
        if !self.shifts.observe(&shift_id, &key) {
            return EventOutcome::skipped(SkipReason::Duplicate);
        }

        self.notify(&shift_id, ChangeEvent::Update.as_str(), payload).await
    }

    async fn notify(&self, shift_id: &str, event: &str, payload: &RealtimePayload) -> EventOutcome {
        let shift = self.backend.shift_by_id(shift_id).await;
        let fallback_row = payload.new_row.as_ref().or(payload.old_row.as_ref());
        let detail = build_shift_detail(shift.as_ref(), fallback_row, &self.copy);
        let notification = build_shift_notification_payload(event, shift_id, &detail, &self.copy);

        let row = NotificationInsertRow::new(
            &self.employee_id,
            notification.title.clone(),
            notification.detail.clone(),
            Some(notification.metadata_row()),
        );
        let persisted = match self.backend.insert_notification(&row).await {
            Ok(()) => {
                tracing::info!(shift_id, event, "Created shift notification");
                true
            }
            Err(err) => {
                tracing::warn!("Failed to create shift notification: {}", err);
                false
            }
        };

        EventOutcome::Notified {
            payload: notification,
            persisted,
        }
    }
}

/// `new.id`, `old.id`, `new.shiftId`, `old.shiftId`, first string wins.
fn changed_shift_id(payload: &RealtimePayload) -> Option<String> {
    let field = |row: Option<&Row>, key: &str| {
        row.and_then(|r| r.get(key))
            .and_then(|v| v.as_str())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
    };
    let new = payload.new_row.as_ref();
    let old = payload.old_row.as_ref();
    field(new, "id")
        .or_else(|| field(old, "id"))
        .or_else(|| field(new, "shiftId"))
        .or_else(|| field(old, "shiftId"))
}
