use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use speculate2::speculate;

use employee_portal::backend::{BackendError, PortalBackend};
use portal_core::models::{NotificationInsertRow, PostgrestErrorBody, Shift, ShiftStatus};

#[derive(Default)]
struct RecordingBackend {
    shifts: HashMap<String, Shift>,
    inserted: Mutex<Vec<NotificationInsertRow>>,
    fail_inserts: bool,
}

impl RecordingBackend {
    fn with_shift(mut self, shift: Shift) -> Self {
        self.shifts.insert(shift.id.clone(), shift);
        self
    }

    fn inserted(&self) -> Vec<NotificationInsertRow> {
        self.inserted.lock().unwrap().clone()
    }
}

#[async_trait]
impl PortalBackend for RecordingBackend {
    async fn shift_by_id(&self, shift_id: &str) -> Option<Shift> {
        self.shifts.get(shift_id).cloned()
    }

    async fn insert_notification(&self, row: &NotificationInsertRow) -> Result<(), BackendError> {
        if self.fail_inserts {
            return Err(BackendError::Api {
                status: 403,
                message: "permission denied for table notifications".to_string(),
                body: PostgrestErrorBody::default(),
            });
        }
        self.inserted.lock().unwrap().push(row.clone());
        Ok(())
    }
}

fn shift(id: &str) -> Shift {
    Shift {
        id: id.to_string(),
        title: "Lobby".to_string(),
        location: "Main Lobby".to_string(),
        object_name: Some("HQ Building".to_string()),
        object_address: None,
        start: "2026-03-02T08:00:00Z".to_string(),
        end: "2026-03-02T12:00:00Z".to_string(),
        status: ShiftStatus::Scheduled,
        description: None,
        assignment_id: None,
        confirmation_status: None,
        confirmed_at: None,
    }
}

speculate! {
    use employee_portal::{ChangeTable, EventOutcome, ShiftEventProcessor, SkipReason};
    use portal_core::i18n::dictionary;
    use portal_core::models::{Language, RealtimePayload};
    use portal_core::realtime::ShiftNotificationCopy;
    use serde_json::json;

    fn payload(value: serde_json::Value) -> RealtimePayload {
        serde_json::from_value(value).unwrap()
    }

    fn processor(backend: RecordingBackend) -> ShiftEventProcessor<RecordingBackend> {
        ShiftEventProcessor::new(
            backend,
            "emp-1",
            ShiftNotificationCopy::from_dictionary(dictionary(Language::En)),
        )
    }

    fn skipped(outcome: &EventOutcome) -> Option<SkipReason> {
        match outcome {
            EventOutcome::Skipped { reason } => Some(*reason),
            EventOutcome::Notified { .. } => None,
        }
    }

    describe "assignment events" {
        it "notifies a published shift once" {
            let mut processor = processor(RecordingBackend::default().with_shift(shift("s-1")));
            let insert = payload(json!({
                "eventType": "INSERT",
                "commit_timestamp": "2026-03-01T10:00:00Z",
                "new": { "shiftId": "s-1", "employeeId": "emp-1" }
            }));

            let first = tokio_test::block_on(processor.handle_assignment_event(&insert));
            let second = tokio_test::block_on(processor.handle_assignment_event(&insert));

            assert!(matches!(first, EventOutcome::Notified { persisted: true, .. }));
            assert_eq!(skipped(&second), Some(SkipReason::Duplicate));

            let rows = processor.backend().inserted();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].employee_id, "emp-1");
            assert_eq!(rows[0].title, "Shift published");
            assert_eq!(rows[0].detail, "Mon, Mar 2 · 8:00 AM – 12:00 PM · HQ Building");
            assert_eq!(
                rows[0].metadata.clone().map(serde_json::Value::Object),
                Some(json!({ "shiftId": "s-1", "target": "/shift-details/s-1", "event": "INSERT" }))
            );
        }

        it "notifies a removed shift from the old row" {
            let mut processor = processor(RecordingBackend::default());
            let delete = payload(json!({
                "eventType": "delete",
                "old": { "shift_id": "s-2", "location": "Dock 4", "updated_at": "2026-03-01T11:00:00Z" }
            }));

            let outcome = tokio_test::block_on(processor.handle(ChangeTable::ShiftAssignments, &delete));
            assert!(matches!(outcome, EventOutcome::Notified { persisted: true, .. }));

            let rows = processor.backend().inserted();
            assert_eq!(rows[0].title, "Shift removed");
            assert_eq!(rows[0].detail, "Dock 4");
        }

        it "skips updates and events without a type" {
            let mut processor = processor(RecordingBackend::default());
            let update = payload(json!({ "eventType": "UPDATE", "new": { "shiftId": "s-1" } }));
            let untyped = payload(json!({ "new": { "shiftId": "s-3" } }));
            let anonymous = payload(json!({ "eventType": "INSERT", "new": { "title": "x" } }));

            assert_eq!(
                skipped(&tokio_test::block_on(processor.handle_assignment_event(&update))),
                Some(SkipReason::AssignmentUpdate)
            );
            assert_eq!(
                skipped(&tokio_test::block_on(processor.handle_assignment_event(&untyped))),
                Some(SkipReason::MissingEventType)
            );
            assert_eq!(
                skipped(&tokio_test::block_on(processor.handle_assignment_event(&anonymous))),
                Some(SkipReason::MissingShiftId)
            );
            assert!(processor.backend().inserted().is_empty());
        }

        it "treats a blank event type as missing" {
            let mut processor = processor(RecordingBackend::default().with_shift(shift("s-1")));
            let blank = payload(json!({ "eventType": "", "new": { "shiftId": "s-1" } }));
            let spaces = payload(json!({ "eventType": "  ", "new": { "shiftId": "s-4" } }));
            let moved = payload(json!({
                "eventType": "",
                "old": { "id": "s-1", "location": "A" },
                "new": { "id": "s-1", "location": "B" }
            }));

            assert_eq!(
                skipped(&tokio_test::block_on(processor.handle_assignment_event(&blank))),
                Some(SkipReason::MissingEventType)
            );
            assert_eq!(
                skipped(&tokio_test::block_on(processor.handle_assignment_event(&spaces))),
                Some(SkipReason::MissingEventType)
            );
            assert_eq!(
                skipped(&tokio_test::block_on(processor.handle_shift_event(&moved))),
                Some(SkipReason::MissingEventType)
            );
            assert!(processor.backend().inserted().is_empty());
        }

        it "keeps going when the insert fails" {
            let backend = RecordingBackend {
                fail_inserts: true,
                ..Default::default()
            };
            let mut processor = processor(backend);
            let insert = payload(json!({ "eventType": "INSERT", "new": { "shiftId": "s-1" } }));

            let outcome = tokio_test::block_on(processor.handle_assignment_event(&insert));
            assert!(matches!(outcome, EventOutcome::Notified { persisted: false, .. }));
        }
    }

    describe "shift events" {
        it "notifies a moved shift" {
            let mut processor = processor(RecordingBackend::default());
            let moved = payload(json!({
                "eventType": "UPDATE",
                "commit_timestamp": "2026-03-01T12:00:00Z",
                "old": { "id": "s-1", "start": "2026-03-02T08:00:00Z", "end": "2026-03-02T12:00:00Z" },
                "new": { "id": "s-1", "start": "2026-03-02T09:00:00Z", "end": "2026-03-02T12:00:00Z" }
            }));

            let outcome = tokio_test::block_on(processor.handle(ChangeTable::Shifts, &moved));
            assert!(matches!(outcome, EventOutcome::Notified { persisted: true, .. }));
            assert_eq!(
                skipped(&tokio_test::block_on(processor.handle_shift_event(&moved))),
                Some(SkipReason::Duplicate)
            );

            let rows = processor.backend().inserted();
            assert_eq!(rows.len(), 1);
            assert_eq!(rows[0].title, "Schedule changed");
            assert_eq!(rows[0].detail, "2026-03-02T09:00:00Z – 2026-03-02T12:00:00Z");
            assert_eq!(
                rows[0].metadata.as_ref().and_then(|m| m.get("event")),
                Some(&json!("UPDATE"))
            );
        }

        it "ignores updates that do not move the shift" {
            let mut processor = processor(RecordingBackend::default());
            let renamed = payload(json!({
                "eventType": "UPDATE",
                "old": { "id": "s-1", "title": "Old" },
                "new": { "id": "s-1", "title": "New" }
            }));
            let inserted = payload(json!({ "eventType": "INSERT", "new": { "id": "s-1" } }));

            assert_eq!(
                skipped(&tokio_test::block_on(processor.handle_shift_event(&renamed))),
                Some(SkipReason::NoScheduleChange)
            );
            assert_eq!(
                skipped(&tokio_test::block_on(processor.handle_shift_event(&inserted))),
                Some(SkipReason::NoScheduleChange)
            );
        }

        it "forgets seen events when the employee changes" {
            let mut processor = processor(RecordingBackend::default());
            let moved = payload(json!({
                "eventType": "UPDATE",
                "commit_timestamp": "2026-03-01T12:00:00Z",
                "old": { "id": "s-1", "location": "A" },
                "new": { "id": "s-1", "location": "B" }
            }));

            tokio_test::block_on(processor.handle_shift_event(&moved));
            processor.set_employee("emp-2");
            let again = tokio_test::block_on(processor.handle_shift_event(&moved));

            assert!(matches!(again, EventOutcome::Notified { .. }));
            assert_eq!(processor.employee_id(), "emp-2");
            assert_eq!(processor.backend().inserted()[1].employee_id, "emp-2");
        }
    }
}
