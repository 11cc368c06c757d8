//! Local SQLite cache for preferences and notifications.

mod schema;

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::calendar::{parse_stored_calendar_selection, toggle_calendar_selection};
use crate::i18n::{language_storage_key, resolve_stored_language};
use crate::models::{ImportedCalendar, Language, NotificationCategory, NotificationRecord};
use crate::time::{parse_instant, to_iso};

const CALENDAR_STORAGE_PREFIX: &str = "employee-portal-calendars";

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open the database under the platform data directory.
    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("com", "employee-portal", "portal")
            .ok_or_else(|| anyhow!("could not determine a data directory"))?;
        let data_dir = dirs.data_dir();
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("creating {}", data_dir.display()))?;
        Self::open(data_dir.join("portal.db"))
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("opening database at {}", path.display()))?;
        tracing::debug!("Opened portal cache at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute_batch(schema::SCHEMA)?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection lock poisoned"))
    }

    // ============================================================
    // Preferences
    // ============================================================

    pub fn get_preference(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, to_iso(Utc::now())],
        )?;
        Ok(())
    }

    /// Stored language for an employee; `fallback` when none or signed out.
    pub fn load_language(&self, employee_id: Option<&str>, fallback: Language) -> Result<Language> {
        let Some(key) = language_storage_key(employee_id) else {
            return Ok(fallback);
        };
        let stored = self.get_preference(&key)?;
        Ok(resolve_stored_language(stored.as_deref(), fallback))
    }

    pub fn store_language(&self, employee_id: &str, language: Language) -> Result<()> {
        let key = language_storage_key(Some(employee_id))
            .ok_or_else(|| anyhow!("an employee id is required to store a language"))?;
        self.set_preference(&key, language.as_str())
    }

    pub fn calendar_selection(&self, employee_id: &str) -> Result<Vec<ImportedCalendar>> {
        let stored = self.get_preference(&calendar_storage_key(employee_id))?;
        Ok(parse_stored_calendar_selection(stored.as_deref()))
    }

    /// Toggle one calendar in the stored selection and return the new list.
    pub fn toggle_calendar(
        &self,
        employee_id: &str,
        calendar: ImportedCalendar,
    ) -> Result<Vec<ImportedCalendar>> {
        let current = self.calendar_selection(employee_id)?;
        let next = toggle_calendar_selection(&current, calendar);
        self.set_preference(
            &calendar_storage_key(employee_id),
            &serde_json::to_string(&next)?,
        )?;
        Ok(next)
    }

    // ============================================================
    // Notification cache
    // ============================================================

    pub fn cache_notifications(&self, employee_id: &str, records: &[NotificationRecord]) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let cached_at = to_iso(Utc::now());
        {
            let mut stmt = tx.prepare(
                "INSERT INTO cached_notifications
                    (employee_id, id, title, detail, created_at, read, category, metadata, target_path, cached_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(employee_id, id) DO UPDATE SET
                    title = excluded.title,
                    detail = excluded.detail,
                    created_at = excluded.created_at,
                    read = excluded.read,
                    category = excluded.category,
                    metadata = excluded.metadata,
                    target_path = excluded.target_path,
                    cached_at = excluded.cached_at",
            )?;
            for record in records {
                let metadata = record
                    .metadata
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?;
                stmt.execute(params![
                    employee_id,
                    record.id,
                    record.title,
                    record.detail,
                    record.created_at,
                    record.read,
                    record.category.as_str(),
                    metadata,
                    record.target_path,
                    cached_at,
                ])?;
            }
        }
        tx.commit()?;
        tracing::debug!("Cached {} notifications for {}", records.len(), employee_id);
        Ok(records.len())
    }

    /// Cached notifications for an employee, newest first.
    pub fn cached_notifications(&self, employee_id: &str) -> Result<Vec<NotificationRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, title, detail, created_at, read, category, metadata, target_path
             FROM cached_notifications
             WHERE employee_id = ?1",
        )?;

        let rows = stmt.query_map(params![employee_id], |row| {
            let category: String = row.get(5)?;
            let metadata: Option<String> = row.get(6)?;
            Ok(NotificationRecord {
                id: row.get(0)?,
                title: row.get(1)?,
                detail: row.get(2)?,
                created_at: row.get(3)?,
                read: row.get(4)?,
                category: NotificationCategory::from_str(&category)
                    .unwrap_or(NotificationCategory::General),
                metadata: metadata.and_then(|raw| serde_json::from_str(&raw).ok()),
                target_path: row.get(7)?,
            })
        })?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        // Ordered by instant, not by the stored string.
        records.sort_by(|a, b| {
            parse_instant(&b.created_at)
                .cmp(&parse_instant(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(records)
    }

    /// Returns false when the notification is not cached.
    pub fn mark_cached_read(&self, employee_id: &str, id: &str) -> Result<bool> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE cached_notifications SET read = 1 WHERE employee_id = ?1 AND id = ?2",
            params![employee_id, id],
        )?;
        Ok(changed > 0)
    }

    pub fn mark_all_cached_read(&self, employee_id: &str) -> Result<usize> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE cached_notifications SET read = 1 WHERE employee_id = ?1 AND read = 0",
            params![employee_id],
        )?;
        Ok(changed)
    }
}

fn calendar_storage_key(employee_id: &str) -> String {
    format!("{CALENDAR_STORAGE_PREFIX}:{employee_id}")
}
