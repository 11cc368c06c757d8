//! Change-feed helpers: idempotency keys, schedule-change detection and the
//! notification copy generated for shift events.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::i18n::Dictionary;
use crate::models::{ChangeEvent, RealtimePayload, Shift};
use crate::rows::{has_row_change, pick_first, read_row_value, value_to_string, Row};
use crate::time::parse_instant;

pub const SHIFT_START_KEYS: &[&str] = &["shiftStartingDate", "shiftstartingdate", "start_date", "start", "start_at"];

pub const SHIFT_END_KEYS: &[&str] = &["shiftEndingDate", "shiftendingdate", "end_date", "end", "end_at"];

pub const SHIFT_LOCATION_KEYS: &[&str] = &[
    "location",
    "address",
    "shiftLocation",
    "shift_location",
    "objectAddress",
    "shiftAddress",
    "object_address",
];

const SHIFT_ID_KEYS: &[&str] = &["id", "shiftId", "shift_id", "assignmentId", "assignment_id"];

/// Shift or assignment id carried by a change-feed row.
pub fn shift_id_of(row: Option<&Row>) -> Option<String> {
    match pick_first(row?, SHIFT_ID_KEYS)? {
        Value::String(id) if !id.trim().is_empty() => Some(id.clone()),
        _ => None,
    }
}

/// `{entity}:{event}:{timestamp}`. The timestamp falls back through the
/// commit time and the row timestamps to an empty string.
pub fn build_event_key(entity_id: &str, payload: &RealtimePayload) -> String {
    let row_timestamp = |row: Option<&Row>, key: &str| {
        row.and_then(|r| r.get(key))
            .filter(|v| !v.is_null())
            .map(value_to_string)
    };
    let timestamp = payload
        .commit_timestamp
        .clone()
        .or_else(|| row_timestamp(payload.new_row.as_ref(), "created_at"))
        .or_else(|| row_timestamp(payload.new_row.as_ref(), "updated_at"))
        .or_else(|| row_timestamp(payload.old_row.as_ref(), "updated_at"))
        .unwrap_or_default();
    let event = payload.event_type.as_deref().unwrap_or("unknown");
    format!("{entity_id}:{event}:{timestamp}")
}

/// True only for UPDATEs that move the start, the end or the location.
pub fn should_notify_schedule_update(payload: &RealtimePayload) -> bool {
    if payload.event() != Some(ChangeEvent::Update) {
        return false;
    }
    let old = payload.old_row.as_ref();
    let new = payload.new_row.as_ref();
    [SHIFT_START_KEYS, SHIFT_END_KEYS, SHIFT_LOCATION_KEYS]
        .iter()
        .any(|keys| has_row_change(old, new, keys))
}

/// Value for an `id=in.(...)` filter: unique non-empty ids, quoted, with
/// embedded quotes escaped.
pub fn build_shift_filter_value<S: AsRef<str>>(shift_ids: &[S]) -> String {
    let mut seen = HashSet::new();
    shift_ids
        .iter()
        .map(|id| -> &str { id.as_ref() })
        .filter(|id| !id.is_empty() && seen.insert(*id))
        .map(|id| format!("\"{}\"", id.replace('"', "\\\"")))
        .collect::<Vec<_>>()
        .join(",")
}

/// Remembers the last event key seen per entity so replays of the same
/// change are processed once.
#[derive(Debug, Default)]
pub struct EventDeduplicator {
    last_seen: HashMap<String, String>,
}

impl EventDeduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `key` for `entity_id`. Returns false when it matches the key
    /// already recorded.
    pub fn observe(&mut self, entity_id: &str, key: &str) -> bool {
        if self.last_seen.get(entity_id).map(String::as_str) == Some(key) {
            return false;
        }
        self.last_seen.insert(entity_id.to_string(), key.to_string());
        true
    }

    pub fn last_key(&self, entity_id: &str) -> Option<&str> {
        self.last_seen.get(entity_id).map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.last_seen.clear();
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }
}

/// Localized titles for generated shift notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftNotificationCopy {
    pub shift_published: String,
    pub shift_removed: String,
    pub shift_schedule_changed: String,
    pub recent_shift_update: String,
}

impl ShiftNotificationCopy {
    pub fn from_dictionary(dictionary: &Dictionary) -> Self {
        Self {
            shift_published: dictionary.get("notificationCategoryShiftPublished").to_string(),
            shift_removed: dictionary.get("notificationCategoryShiftRemoved").to_string(),
            shift_schedule_changed: dictionary.get("notificationCategoryScheduleChanged").to_string(),
            recent_shift_update: dictionary.get("notificationRecentShiftUpdate").to_string(),
        }
    }
}

pub fn shift_notification_title<'a>(event: &ChangeEvent, copy: &'a ShiftNotificationCopy) -> &'a str {
    match event {
        ChangeEvent::Delete => &copy.shift_removed,
        ChangeEvent::Update => &copy.shift_schedule_changed,
        _ => &copy.shift_published,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftNotificationMetadata {
    pub shift_id: String,
    pub target: String,
    pub event: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftNotificationPayload {
    pub title: String,
    pub detail: String,
    pub metadata: ShiftNotificationMetadata,
}

impl ShiftNotificationPayload {
    pub fn metadata_row(&self) -> Row {
        let mut row = Map::new();
        row.insert("shiftId".into(), Value::String(self.metadata.shift_id.clone()));
        row.insert("target".into(), Value::String(self.metadata.target.clone()));
        row.insert("event".into(), Value::String(self.metadata.event.clone()));
        row
    }
}

pub fn shift_details_path(shift_id: &str) -> String {
    format!("/shift-details/{shift_id}")
}

pub fn build_shift_notification_payload(
    event_type: &str,
    shift_id: &str,
    detail: &str,
    copy: &ShiftNotificationCopy,
) -> ShiftNotificationPayload {
    let event = ChangeEvent::parse(event_type);
    ShiftNotificationPayload {
        title: shift_notification_title(&event, copy).to_string(),
        detail: detail.to_string(),
        metadata: ShiftNotificationMetadata {
            shift_id: shift_id.to_string(),
            target: shift_details_path(shift_id),
            event: event.as_str().to_string(),
        },
    }
}

/// `Mon, Mar 2 · 8:00 AM – 12:00 PM`, or just the start time when the end
/// does not parse.
fn format_shift_window(shift: &Shift) -> Option<String> {
    let start = parse_instant(&shift.start)?;
    let date_label = start.format("%a, %b %-d");
    let start_label = start.format("%-I:%M %p").to_string();
    let range = match parse_instant(&shift.end) {
        Some(end) => format!("{start_label} – {}", end.format("%-I:%M %p")),
        None => start_label,
    };
    Some(format!("{date_label} · {range}"))
}

/// Detail line for a generated shift notification.
pub fn build_shift_detail(
    shift: Option<&Shift>,
    fallback_row: Option<&Row>,
    copy: &ShiftNotificationCopy,
) -> String {
    let location = shift
        .map(|s| s.object_name.clone().unwrap_or_else(|| s.location.clone()))
        .or_else(|| read_row_value(fallback_row, SHIFT_LOCATION_KEYS));

    let mut parts: Vec<String> = Vec::new();
    if let Some(window) = shift.and_then(format_shift_window) {
        parts.push(window);
    }
    if let Some(location) = location {
        parts.push(location);
    }
    if !parts.is_empty() {
        return parts.join(" · ");
    }

    // No shift and no location: show the raw times from the change row.
    let range: Vec<String> = [
        read_row_value(fallback_row, SHIFT_START_KEYS),
        read_row_value(fallback_row, SHIFT_END_KEYS),
    ]
    .into_iter()
    .flatten()
    .collect();
    if range.is_empty() {
        copy.recent_shift_update.clone()
    } else {
        range.join(" – ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> RealtimePayload {
        serde_json::from_value(value).unwrap()
    }

    fn copy() -> ShiftNotificationCopy {
        ShiftNotificationCopy {
            shift_published: "Shift published".into(),
            shift_removed: "Shift removed".into(),
            shift_schedule_changed: "Schedule changed".into(),
            recent_shift_update: "Recent shift update".into(),
        }
    }

    #[test]
    fn key_groups_cover_common_columns() {
        assert!(SHIFT_START_KEYS.contains(&"start"));
        assert!(SHIFT_END_KEYS.contains(&"end"));
        assert!(SHIFT_LOCATION_KEYS.contains(&"address"));
    }

    #[test]
    fn shift_id_lookup() {
        let row = |v: Value| v.as_object().cloned().unwrap();
        assert_eq!(shift_id_of(None), None);
        assert_eq!(shift_id_of(Some(&row(json!({ "id": "s1" })))).as_deref(), Some("s1"));
        assert_eq!(shift_id_of(Some(&row(json!({ "shiftId": "s2" })))).as_deref(), Some("s2"));
        assert_eq!(shift_id_of(Some(&row(json!({ "shift_id": "s3" })))).as_deref(), Some("s3"));
        assert_eq!(shift_id_of(Some(&row(json!({ "assignmentId": "s4" })))).as_deref(), Some("s4"));
        assert_eq!(shift_id_of(Some(&row(json!({ "assignment_id": "s5" })))).as_deref(), Some("s5"));
        assert_eq!(shift_id_of(Some(&row(json!({ "id": "   " })))), None);
    }

    #[test]
    fn event_key_timestamp_fallbacks() {
        assert_eq!(
            build_event_key(
                "shift-1",
                &payload(json!({ "eventType": "UPDATE", "commit_timestamp": "2026-03-10T12:00:00Z" }))
            ),
            "shift-1:UPDATE:2026-03-10T12:00:00Z"
        );
        assert_eq!(
            build_event_key(
                "shift-1",
                &payload(json!({ "eventType": "INSERT", "new": { "created_at": "2026-03-10T13:00:00Z" } }))
            ),
            "shift-1:INSERT:2026-03-10T13:00:00Z"
        );
        assert_eq!(
            build_event_key(
                "shift-1",
                &payload(json!({ "eventType": "DELETE", "old": { "updated_at": "2026-03-10T14:00:00Z" } }))
            ),
            "shift-1:DELETE:2026-03-10T14:00:00Z"
        );
        assert_eq!(build_event_key("shift-1", &payload(json!({}))), "shift-1:unknown:");
    }

    #[test]
    fn filter_value_dedups_and_escapes() {
        let empty: [&str; 0] = [];
        assert_eq!(build_shift_filter_value(&empty), "");
        assert_eq!(build_shift_filter_value(&["a"]), "\"a\"");
        assert_eq!(build_shift_filter_value(&["a", "a", "b"]), "\"a\",\"b\"");
        assert_eq!(build_shift_filter_value(&["", "b", "a", "b"]), "\"b\",\"a\"");
        assert_eq!(build_shift_filter_value(&["a\"b"]), "\"a\\\"b\"");
    }

    #[test]
    fn deduplicator_skips_repeated_keys_per_entity() {
        let mut dedup = EventDeduplicator::new();
        assert!(dedup.observe("s1", "s1:INSERT:t1"));
        assert!(!dedup.observe("s1", "s1:INSERT:t1"));
        assert!(dedup.observe("s2", "s2:INSERT:t1"));
        assert!(dedup.observe("s1", "s1:UPDATE:t2"));
        // Only the most recent key is remembered.
        assert!(dedup.observe("s1", "s1:INSERT:t1"));
        assert_eq!(dedup.last_key("s1"), Some("s1:INSERT:t1"));
        dedup.clear();
        assert!(dedup.is_empty());
    }

    #[test]
    fn titles_by_event() {
        let copy = copy();
        assert_eq!(shift_notification_title(&ChangeEvent::Insert, &copy), "Shift published");
        assert_eq!(shift_notification_title(&ChangeEvent::parse("delete"), &copy), "Shift removed");
        assert_eq!(shift_notification_title(&ChangeEvent::Update, &copy), "Schedule changed");
    }

    #[test]
    fn payload_metadata_points_at_shift_details() {
        let payload = build_shift_notification_payload("delete", "shift-123", "Recent shift update", &copy());
        assert_eq!(payload.title, "Shift removed");
        assert_eq!(payload.metadata.target, "/shift-details/shift-123");
        assert_eq!(payload.metadata.event, "DELETE");
        assert_eq!(
            Value::Object(payload.metadata_row()),
            json!({ "shiftId": "shift-123", "target": "/shift-details/shift-123", "event": "DELETE" })
        );
    }

    #[test]
    fn detail_from_shift_window_and_location() {
        let shift = Shift {
            id: "s".into(),
            title: "Lobby".into(),
            location: "Main Lobby".into(),
            object_name: Some("HQ Building".into()),
            object_address: None,
            start: "2026-03-02T08:00:00Z".into(),
            end: "2026-03-02T12:00:00Z".into(),
            status: crate::models::ShiftStatus::Scheduled,
            description: None,
            assignment_id: None,
            confirmation_status: None,
            confirmed_at: None,
        };
        assert_eq!(
            build_shift_detail(Some(&shift), None, &copy()),
            "Mon, Mar 2 · 8:00 AM – 12:00 PM · HQ Building"
        );
    }

    #[test]
    fn detail_from_fallback_row() {
        let with_location = json!({ "start": "08:00", "end": "12:00", "address": "Dock 4" });
        assert_eq!(
            build_shift_detail(None, with_location.as_object(), &copy()),
            "Dock 4"
        );
        let times_only = json!({ "start": "08:00", "end": "12:00" });
        assert_eq!(
            build_shift_detail(None, times_only.as_object(), &copy()),
            "08:00 – 12:00"
        );
        assert_eq!(build_shift_detail(None, None, &copy()), "Recent shift update");
    }
}
