//! Normalization of `notifications` rows, deep-link resolution and the list
//! helpers behind the notifications screen.

use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use percent_encoding::percent_decode_str;
use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::i18n::Dictionary;
use crate::models::{
    NotificationCategory, NotificationDefaults, NotificationRecord, NotificationSection,
    NotificationSectionKey, SectionLabels,
};
use crate::rows::{is_truthy, pick_first, value_to_string, Row};
use crate::time::{iso_from_value, parse_instant, to_iso, RelativeTimeLabels};

static URL_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z][a-z0-9+\-.]*://").expect("valid scheme pattern"));
static ROUTE_GROUP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/\([^/]+\)(/|$)").expect("valid route group pattern"));
static REPEATED_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/{2,}").expect("valid slash pattern"));

const EXPO_PATH_MARKER: &str = "/--/";
const EXPO_DEV_CLIENT: &str = "expo-development-client";
const MAX_DECODE_ITERATIONS: usize = 3;

const PUBLISHED_KEYWORDS: &[&str] = &[
    "published",
    "assigned",
    "new shift",
    "veröffentlicht",
    "zugewiesen",
    "neue schicht",
];
const REMOVED_KEYWORDS: &[&str] = &[
    "removed",
    "canceled",
    "cancelled",
    "entfernt",
    "abgesagt",
    "storniert",
];
const SCHEDULE_KEYWORDS: &[&str] = &["schedule", "updated", "changed", "plan", "aktualisiert", "geändert"];
const ADMIN_KEYWORDS: &[&str] = &[
    "admin",
    "policy",
    "message",
    "announcement",
    "richtlinie",
    "nachricht",
    "ankündigung",
];

/// Keyword buckets in priority order. The first bucket with a hit wins.
const CATEGORY_RULES: &[(NotificationCategory, &[&str])] = &[
    (NotificationCategory::ShiftPublished, PUBLISHED_KEYWORDS),
    (NotificationCategory::ShiftRemoved, REMOVED_KEYWORDS),
    (NotificationCategory::ShiftSchedule, SCHEDULE_KEYWORDS),
    (NotificationCategory::Admin, ADMIN_KEYWORDS),
];

pub fn determine_category(title: &str, detail: &str) -> NotificationCategory {
    let haystack = format!("{title} {detail}").to_lowercase();
    CATEGORY_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| haystack.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(NotificationCategory::General)
}

/// A `%` not followed by two hex digits makes the whole value undecodable.
fn has_malformed_escape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.iter().enumerate().any(|(index, byte)| {
        *byte == b'%'
            && !(bytes.get(index + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(index + 2).is_some_and(u8::is_ascii_hexdigit))
    })
}

fn decode_repeatedly(value: &str) -> String {
    let mut current = value.to_string();
    for _ in 0..MAX_DECODE_ITERATIONS {
        if has_malformed_escape(&current) {
            break;
        }
        let decoded = match percent_decode_str(&current).decode_utf8() {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => break,
        };
        if decoded == current {
            break;
        }
        current = decoded;
    }
    current
}

/// Dev-client links carry the real link in their `url` query parameter.
fn unwrap_expo_dev_client_url(value: String) -> String {
    if !URL_SCHEME.is_match(&value) {
        return value;
    }
    let Ok(parsed) = Url::parse(&value) else {
        return value;
    };

    let is_dev_client = parsed.host_str() == Some(EXPO_DEV_CLIENT) || parsed.path().contains(EXPO_DEV_CLIENT);
    let wrapped = parsed
        .query_pairs()
        .find(|(key, _)| key == "url")
        .map(|(_, wrapped)| wrapped.into_owned())
        .filter(|wrapped| !wrapped.is_empty());

    match wrapped {
        Some(wrapped) if is_dev_client => decode_repeatedly(&wrapped),
        _ => value,
    }
}

/// Turns whatever a notification carries as a link into an in-app route.
pub fn normalize_route_path(value: &str) -> String {
    let mut candidate = unwrap_expo_dev_client_url(decode_repeatedly(value.trim()));

    if let Some(index) = candidate.find(EXPO_PATH_MARKER) {
        candidate = candidate[index + EXPO_PATH_MARKER.len()..].to_string();
    }

    if URL_SCHEME.is_match(&candidate) {
        if let Ok(parsed) = Url::parse(&candidate) {
            let query = parsed.query().filter(|q| !q.is_empty()).map(|q| format!("?{q}"));
            let fragment = parsed.fragment().filter(|f| !f.is_empty()).map(|f| format!("#{f}"));
            candidate = format!(
                "{}{}{}",
                parsed.path(),
                query.unwrap_or_default(),
                fragment.unwrap_or_default()
            );
        }
    }

    if !candidate.starts_with('/') {
        candidate.insert(0, '/');
    }

    // Route groups such as `(tabs)` are internal to the app router.
    while ROUTE_GROUP.is_match(&candidate) {
        candidate = ROUTE_GROUP.replace_all(&candidate, "${1}").into_owned();
    }
    if candidate.is_empty() {
        candidate.push('/');
    }

    candidate = REPEATED_SLASHES.replace_all(&candidate, "/").into_owned();
    if candidate.len() > 1 {
        let trimmed = candidate.trim_end_matches('/');
        candidate = if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() };
    }

    candidate
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// In-app route a notification should open, if any.
pub fn resolve_target_path(metadata: Option<&Row>) -> Option<String> {
    let metadata = metadata?;
    if let Some(target) = non_blank(pick_first(metadata, &["target", "url", "deepLink"])) {
        return Some(normalize_route_path(target));
    }
    non_blank(pick_first(
        metadata,
        &["shiftId", "shift_id", "assignmentId", "assignment_id"],
    ))
    .map(|shift_id| format!("/shift-details/{shift_id}"))
}

fn first_trimmed<'a>(row: &'a Row, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| non_blank(row.get(*key)))
}

/// Maps any notification row shape to a [`NotificationRecord`]. Rows without
/// an id yield `None`; everything else has a fallback.
pub fn normalize_notification_row(
    row: &Row,
    defaults: &NotificationDefaults,
    now: DateTime<Utc>,
) -> Option<NotificationRecord> {
    let raw_id = pick_first(row, &["id", "notificationId", "notification_id"])?;

    let title = first_trimmed(row, &["title", "message"]).unwrap_or(defaults.title.as_str());
    let detail = first_trimmed(row, &["detail", "body", "description"]).unwrap_or(defaults.detail.as_str());

    let created_at = pick_first(row, &["created_at", "createdAt", "sent_at", "timestamp", "time"])
        .and_then(iso_from_value)
        .unwrap_or_else(|| to_iso(now));

    let read = ["is_read", "read", "viewed", "dismissed"]
        .iter()
        .any(|key| row.get(*key).is_some_and(is_truthy))
        || row.get("status").and_then(Value::as_str) == Some("read");

    let metadata = pick_first(row, &["metadata", "meta", "data", "payload", "context"])
        .and_then(Value::as_object)
        .cloned();
    let target_path = resolve_target_path(metadata.as_ref());

    Some(NotificationRecord {
        id: value_to_string(raw_id),
        title: title.to_string(),
        detail: detail.to_string(),
        created_at,
        read,
        category: determine_category(title, detail),
        metadata,
        target_path,
    })
}

/// Normalizes a batch, dropping rows that do not qualify.
pub fn normalize_notification_rows(
    rows: &[Row],
    defaults: &NotificationDefaults,
    now: DateTime<Utc>,
) -> Vec<NotificationRecord> {
    rows.iter()
        .filter_map(|row| {
            let record = normalize_notification_row(row, defaults, now);
            if record.is_none() {
                tracing::debug!("Skipping notification row without id");
            }
            record
        })
        .collect()
}

/// Buckets notifications by calendar day in `now`'s time zone. Empty buckets
/// are left out and each bucket keeps the input order.
pub fn group_by_recency<Tz: TimeZone>(
    notifications: &[NotificationRecord],
    labels: &SectionLabels,
    now: &DateTime<Tz>,
) -> Vec<NotificationSection> {
    let today = now.date_naive();
    let yesterday = today.pred_opt();

    let mut today_items = Vec::new();
    let mut yesterday_items = Vec::new();
    let mut earlier_items = Vec::new();

    for item in notifications {
        let day = parse_instant(&item.created_at)
            .map(|created| created.with_timezone(&now.timezone()).date_naive());
        match day {
            Some(day) if day == today => today_items.push(item.clone()),
            Some(day) if Some(day) == yesterday => yesterday_items.push(item.clone()),
            _ => earlier_items.push(item.clone()),
        }
    }

    [
        (NotificationSectionKey::Today, &labels.today, today_items),
        (NotificationSectionKey::Yesterday, &labels.yesterday, yesterday_items),
        (NotificationSectionKey::Earlier, &labels.earlier, earlier_items),
    ]
    .into_iter()
    .filter(|(_, _, items)| !items.is_empty())
    .map(|(key, title, items)| NotificationSection {
        key,
        title: title.clone(),
        items,
    })
    .collect()
}

pub fn mark_read_in_list(notifications: &[NotificationRecord], id: &str) -> Vec<NotificationRecord> {
    notifications
        .iter()
        .map(|item| {
            let mut item = item.clone();
            if item.id == id {
                item.read = true;
            }
            item
        })
        .collect()
}

pub fn mark_all_read_in_list(notifications: &[NotificationRecord]) -> Vec<NotificationRecord> {
    notifications
        .iter()
        .map(|item| NotificationRecord {
            read: true,
            ..item.clone()
        })
        .collect()
}

pub fn unread_ids(notifications: &[NotificationRecord]) -> Vec<String> {
    notifications
        .iter()
        .filter(|item| !item.read)
        .map(|item| item.id.clone())
        .collect()
}

pub fn count_unread(notifications: &[NotificationRecord]) -> usize {
    notifications.iter().filter(|item| !item.read).count()
}

impl NotificationDefaults {
    pub fn from_dictionary(dictionary: &Dictionary) -> Self {
        Self {
            title: dictionary.get("notificationDefaultTitle").to_string(),
            detail: dictionary.get("notificationDefaultDetail").to_string(),
        }
    }
}

impl SectionLabels {
    pub fn from_dictionary(dictionary: &Dictionary) -> Self {
        let label = |key: NotificationSectionKey| dictionary.get(key.label_key()).to_string();
        Self {
            today: label(NotificationSectionKey::Today),
            yesterday: label(NotificationSectionKey::Yesterday),
            earlier: label(NotificationSectionKey::Earlier),
        }
    }
}

impl RelativeTimeLabels {
    pub fn from_dictionary(dictionary: &Dictionary) -> Self {
        Self {
            just_now: dictionary.get("notificationJustNow").to_string(),
            coming_soon: dictionary.get("notificationComingSoon").to_string(),
        }
    }
}

/// Translation key for the "n waiting" line of the notifications panel.
pub fn summary_translation_key(unread: usize) -> &'static str {
    if unread == 0 {
        "notificationsAllCaughtUp"
    } else {
        "notificationsPanelWaiting"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn malformed_escapes_are_detected() {
        assert!(has_malformed_escape("/promo%20100%"));
        assert!(has_malformed_escape("%2"));
        assert!(has_malformed_escape("%zz"));
        assert!(!has_malformed_escape("/promo%20100"));
        assert!(!has_malformed_escape("/plain"));
    }

    #[test]
    fn categories_follow_priority_order() {
        assert_eq!(
            determine_category("Shift published", "New shift assigned"),
            NotificationCategory::ShiftPublished
        );
        assert_eq!(
            determine_category("Shift removed", "This shift was canceled"),
            NotificationCategory::ShiftRemoved
        );
        assert_eq!(
            determine_category("Schedule changed", "Your schedule was updated"),
            NotificationCategory::ShiftSchedule
        );
        assert_eq!(determine_category("Admin notice", "Policy message"), NotificationCategory::Admin);
        assert_eq!(determine_category("FYI", "General information"), NotificationCategory::General);
        // "published" outranks "removed" when both appear.
        assert_eq!(
            determine_category("Removed and re-published", ""),
            NotificationCategory::ShiftPublished
        );
    }

    #[test]
    fn german_keywords_are_matched_case_insensitively() {
        assert_eq!(
            determine_category("Schicht ENTFERNT", ""),
            NotificationCategory::ShiftRemoved
        );
        assert_eq!(determine_category("Plan GEÄNDERT", ""), NotificationCategory::ShiftSchedule);
        assert_eq!(
            determine_category("Neue Ankündigung", ""),
            NotificationCategory::Admin
        );
    }

    #[test]
    fn route_path_normalization() {
        assert_eq!(normalize_route_path("/calendar"), "/calendar");
        assert_eq!(normalize_route_path("calendar/"), "/calendar");
        assert_eq!(normalize_route_path("//a///b//"), "/a/b");
        assert_eq!(normalize_route_path("/"), "/");
        assert_eq!(normalize_route_path("/(tabs)/(home)/account"), "/account");
        assert_eq!(normalize_route_path("/(tabs)"), "/");
        assert_eq!(
            normalize_route_path("https://portal.example.com/(tabs)/shift-details/9?from=push#top"),
            "/shift-details/9?from=push#top"
        );
        assert_eq!(
            normalize_route_path("exp://127.0.0.1:8081/--/%2528tabs%2529/account"),
            "/account"
        );
    }

    #[test]
    fn dev_client_wrapper_is_unwrapped() {
        let link = "exp+portal://expo-development-client/?url=http%3A%2F%2F192.168.1.5%3A8081%2F--%2Fshift-details%2F42";
        assert_eq!(normalize_route_path(link), "/shift-details/42");
    }

    #[test]
    fn target_path_prefers_explicit_link_over_shift_id() {
        let metadata = row(json!({ "deepLink": "/notifications", "shiftId": "s-1" }));
        assert_eq!(resolve_target_path(Some(&metadata)).as_deref(), Some("/notifications"));

        let metadata = row(json!({ "target": "  ", "assignment_id": "a-9" }));
        assert_eq!(resolve_target_path(Some(&metadata)).as_deref(), Some("/shift-details/a-9"));

        assert_eq!(resolve_target_path(Some(&row(json!({ "other": 1 })))), None);
        assert_eq!(resolve_target_path(None), None);
    }

    #[test]
    fn read_flag_ors_all_sources() {
        let defaults = NotificationDefaults {
            title: "t".into(),
            detail: "d".into(),
        };
        let now = Utc::now();
        let read = |value: Value| {
            normalize_notification_row(&row(value), &defaults, now)
                .unwrap()
                .read
        };
        assert!(!read(json!({ "id": 1 })));
        assert!(read(json!({ "id": 1, "viewed": true })));
        assert!(read(json!({ "id": 1, "is_read": false, "dismissed": 1 })));
        assert!(read(json!({ "id": 1, "status": "read" })));
        assert!(!read(json!({ "id": 1, "status": "unread", "read": 0 })));
    }

    #[test]
    fn missing_timestamp_uses_now() {
        let defaults = NotificationDefaults {
            title: "t".into(),
            detail: "d".into(),
        };
        let now = parse_instant("2026-03-10T12:00:00Z").unwrap();
        let record = normalize_notification_row(&row(json!({ "id": "n" })), &defaults, now).unwrap();
        assert_eq!(record.created_at, "2026-03-10T12:00:00.000Z");
    }

    #[test]
    fn summary_key_switches_on_zero() {
        assert_eq!(summary_translation_key(0), "notificationsAllCaughtUp");
        assert_eq!(summary_translation_key(3), "notificationsPanelWaiting");
    }
}
