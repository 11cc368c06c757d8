//! Which device calendars receive shift sync.

use serde_json::Value;

use crate::models::ImportedCalendar;

/// Remove `calendar` when it is already selected (by id), append it otherwise.
pub fn toggle_calendar_selection(
    selection: &[ImportedCalendar],
    calendar: ImportedCalendar,
) -> Vec<ImportedCalendar> {
    if selection.iter().any(|entry| entry.id == calendar.id) {
        selection
            .iter()
            .filter(|entry| entry.id != calendar.id)
            .cloned()
            .collect()
    } else {
        let mut next = selection.to_vec();
        next.push(calendar);
        next
    }
}

/// Parse a persisted selection. Anything unreadable yields an empty list.
pub fn parse_stored_calendar_selection(raw: Option<&str>) -> Vec<ImportedCalendar> {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return Vec::new();
    };
    let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(raw) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| {
            let id = entry.get("id")?.as_str()?;
            let title = entry.get("title")?.as_str()?;
            Some(ImportedCalendar {
                id: id.to_string(),
                title: title.to_string(),
                source_name: entry
                    .get("sourceName")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect()
}
