//! Maps `shifts` rows of any known column convention into [`Shift`]s.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::models::{Shift, ShiftAssignment, ShiftConfirmationStatus, ShiftPhase, ShiftStatus};
use crate::rows::{as_row, pick_first, pick_string, Row};
use crate::time::{ensure_shift_end_after_start, iso_from_value, parse_instant, to_iso};

pub const DEFAULT_SHIFT_START: &str = "2026-01-25T08:00:00Z";
pub const DEFAULT_SHIFT_END: &str = "2026-01-25T12:00:00Z";

/// Id given to rows without a usable one. Such shifts never leave
/// [`map_shift_array`].
pub const UNKNOWN_SHIFT_ID: &str = "unknown";

const START_DATE_KEYS: &[&str] = &["shiftStartingDate", "shiftstartingdate", "start_date", "start", "start_at"];
const START_TIME_KEYS: &[&str] = &["shiftStartingTime", "shiftstartingtime", "start_time", "startTime"];
const END_DATE_KEYS: &[&str] = &["shiftEndingDate", "shiftendingdate", "end_date", "end", "end_at"];
const END_TIME_KEYS: &[&str] = &["shiftEndingTime", "shiftendingtime", "end_time", "endTime"];

const TITLE_KEYS: &[&str] = &["title", "shiftTitle", "name", "shift_name", "ShiftTitle"];
const LOCATION_KEYS: &[&str] = &["location", "address", "shiftLocation", "shift_location"];
const LOCATION_ADDRESS_KEYS: &[&str] = &["objectAddress", "shiftAddress", "object_address"];
const OBJECT_NAME_KEYS: &[&str] = &[
    "objectTitle",
    "objectName",
    "shiftObject",
    "shiftobject",
    "shiftLocation",
    "locationName",
];
const OBJECT_ADDRESS_KEYS: &[&str] = &["objectAddress", "shiftAddress", "address", "object_address"];
const DESCRIPTION_KEYS: &[&str] = &["description", "shiftDescription"];
const STATUS_KEYS: &[&str] = &["status", "shiftStatus"];

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Resolves one side of a shift from a date value and a time value.
///
/// When both are present the date part of the first is joined with the time
/// part of the second. If that does not produce a valid instant the raw date
/// (then the raw time) is used as is.
fn normalize_timestamp_pair(date: Option<&Value>, time: Option<&Value>, fallback: &str) -> String {
    let iso_date = date.and_then(iso_from_value);
    let iso_time = time.and_then(iso_from_value);

    if let (Some(date), Some(time)) = (&iso_date, &iso_time) {
        let date_part = date.split('T').next().unwrap_or(date);
        let time_part = match time.split_once('T') {
            Some((_, rest)) => rest.split('T').next().unwrap_or(rest),
            None => time,
        };
        if let Some(combined) = parse_instant(&format!("{date_part}T{time_part}")) {
            return to_iso(combined);
        }
    }

    iso_date
        .or(iso_time)
        .unwrap_or_else(|| fallback.to_string())
}

pub fn map_shift_record(raw: &Row) -> Shift {
    let start = normalize_timestamp_pair(
        pick_first(raw, START_DATE_KEYS),
        pick_first(raw, START_TIME_KEYS),
        DEFAULT_SHIFT_START,
    );
    let end = normalize_timestamp_pair(
        pick_first(raw, END_DATE_KEYS),
        pick_first(raw, END_TIME_KEYS),
        DEFAULT_SHIFT_END,
    );
    let end = ensure_shift_end_after_start(&start, &end);

    let object = as_row(raw.get("object"));
    let object_field = |key: &str| object.and_then(|o| pick_string(o, &[key]));

    let location = pick_string(raw, LOCATION_KEYS)
        .or_else(|| pick_string(raw, LOCATION_ADDRESS_KEYS))
        .or_else(|| object_field("address"))
        .unwrap_or("TBD");
    let object_name = pick_string(raw, OBJECT_NAME_KEYS).or_else(|| object_field("title"));
    let object_address = pick_string(raw, OBJECT_ADDRESS_KEYS).or_else(|| object_field("address"));

    let id = match raw.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => UNKNOWN_SHIFT_ID.to_string(),
    };

    Shift {
        id,
        title: pick_string(raw, TITLE_KEYS).unwrap_or("Shift").to_string(),
        location: location.to_string(),
        object_name: object_name.map(str::to_string),
        object_address: object_address.map(str::to_string),
        start,
        end,
        status: ShiftStatus::normalize(pick_string(raw, STATUS_KEYS)),
        description: pick_string(raw, DESCRIPTION_KEYS).map(str::to_string),
        assignment_id: None,
        confirmation_status: None,
        confirmed_at: None,
    }
}

/// Ascending by start. Shifts whose start does not parse go last and keep
/// their relative order.
pub fn sort_shifts_by_start(mut list: Vec<Shift>) -> Vec<Shift> {
    list.sort_by(|a, b| compare_starts(parse_instant(&a.start), parse_instant(&b.start)));
    list
}

fn compare_starts(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
    }
}

/// Maps a batch of rows, dropping the ones without an id.
///
/// With `assignments`, every shift is joined to its assignment and only the
/// shifts whose confirmation status is visible to the employee are kept.
pub fn map_shift_array(rows: &[Row], assignments: Option<&[ShiftAssignment]>) -> Vec<Shift> {
    let by_shift_id: Option<HashMap<&str, &ShiftAssignment>> = assignments.map(|list| {
        list.iter()
            .filter_map(|a| a.shift_id.as_deref().map(|id| (id, a)))
            .collect()
    });

    let mut parsed = Vec::with_capacity(rows.len());
    for row in rows {
        let mut shift = map_shift_record(row);
        if shift.id == UNKNOWN_SHIFT_ID {
            tracing::debug!("Dropping shift row without id");
            continue;
        }

        if let Some(by_shift_id) = &by_shift_id {
            let assignment = by_shift_id.get(shift.id.as_str()).copied();
            let status = ShiftConfirmationStatus::normalize(
                assignment.and_then(|a| a.confirmation_status.as_deref()),
            );
            if !status.is_visible() {
                tracing::debug!(shift_id = %shift.id, status = status.as_str(), "Hiding unconfirmed shift");
                continue;
            }
            shift.assignment_id = assignment.and_then(|a| a.assignment_id.clone());
            shift.confirmation_status = Some(status);
            shift.confirmed_at = assignment.and_then(|a| a.confirmed_at.clone());
        }

        parsed.push(shift);
    }

    sort_shifts_by_start(parsed)
}

impl ShiftAssignment {
    pub fn from_row(row: &Row) -> Self {
        let text = |keys: &[&str]| pick_string(row, keys).map(str::to_string);
        Self {
            assignment_id: text(&["assignmentId", "assignment_id", "id"]),
            shift_id: text(&["shiftId", "shift_id"]),
            confirmation_status: text(&["confirmationStatus", "confirmation_status", "status"]),
            confirmed_at: text(&["confirmedAt", "confirmed_at"]),
        }
    }
}

/// The end instant itself still counts as live.
pub fn shift_phase(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> ShiftPhase {
    if now > end {
        ShiftPhase::Past
    } else if now >= start {
        ShiftPhase::Live
    } else {
        ShiftPhase::Upcoming
    }
}

/// Phase of a mapped shift, `None` if its timestamps do not parse.
pub fn phase_of(shift: &Shift, now: DateTime<Utc>) -> Option<ShiftPhase> {
    Some(shift_phase(parse_instant(&shift.start)?, parse_instant(&shift.end)?, now))
}

pub fn build_maps_search_url(address: Option<&str>) -> Option<String> {
    let address = address.map(str::trim).filter(|a| !a.is_empty())?;
    let query = utf8_percent_encode(address, URI_COMPONENT);
    Some(format!("https://www.google.com/maps/search/?api=1&query={query}"))
}
