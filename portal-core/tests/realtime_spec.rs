use speculate2::speculate;

speculate! {
    use portal_core::i18n::dictionary;
    use portal_core::models::{ChangeEvent, Language, RealtimePayload};
    use portal_core::realtime::{
        build_event_key, build_shift_detail, build_shift_notification_payload, should_notify_schedule_update,
        EventDeduplicator, ShiftNotificationCopy,
    };
    use serde_json::json;

    fn payload(value: serde_json::Value) -> RealtimePayload {
        serde_json::from_value(value).unwrap()
    }

    describe "schedule update detection" {
        it "ignores anything but updates" {
            let insert = payload(json!({ "eventType": "INSERT", "old": { "start": "a" }, "new": { "start": "b" } }));
            assert!(!should_notify_schedule_update(&insert));
            assert!(!should_notify_schedule_update(&payload(json!({}))));
        }

        it "flags a moved start under any alias" {
            let update = payload(json!({
                "eventType": "update",
                "old": { "shiftStartingDate": "2026-03-02T08:00:00Z", "title": "A" },
                "new": { "shiftStartingDate": "2026-03-02T09:00:00Z", "title": "A" }
            }));
            assert!(should_notify_schedule_update(&update));
        }

        it "flags a new location" {
            let update = payload(json!({
                "eventType": "UPDATE",
                "old": { "address": "Dock 4" },
                "new": { "address": "Dock 5" }
            }));
            assert!(should_notify_schedule_update(&update));
        }

        it "ignores changes outside start, end and location" {
            let update = payload(json!({
                "eventType": "UPDATE",
                "old": { "start": "2026-03-02T08:00:00Z", "title": "Old" },
                "new": { "start": "2026-03-02T08:00:00Z", "title": "New" }
            }));
            assert!(!should_notify_schedule_update(&update));
        }
    }

    describe "replayed events" {
        it "are processed once per entity key" {
            let event = payload(json!({ "eventType": "INSERT", "commit_timestamp": "2026-03-02T08:00:00Z" }));
            let key = build_event_key("as-1", &event);
            let mut dedup = EventDeduplicator::new();
            assert!(dedup.observe("as-1", &key));
            assert!(!dedup.observe("as-1", &build_event_key("as-1", &event)));
            assert_eq!(dedup.len(), 1);
        }
    }

    describe "notification copy" {
        it "is localized from the dictionary" {
            let copy = ShiftNotificationCopy::from_dictionary(dictionary(Language::De));
            let payload = build_shift_notification_payload("INSERT", "s-1", "Lager Nord", &copy);
            assert_eq!(payload.title, "Schicht veröffentlicht");
            assert_eq!(payload.metadata.event, ChangeEvent::Insert.as_str());
            assert_eq!(build_shift_detail(None, None, &copy), "Aktuelles Schicht-Update");
        }
    }
}
