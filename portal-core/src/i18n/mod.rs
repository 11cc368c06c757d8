//! Localized copy for the portal.
//!
//! Lookups never fail: a missing or empty entry resolves to the key itself
//! and is reported once to the process-wide missing-translation handler.

mod translations;

use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::models::Language;

const LANGUAGE_STORAGE_PREFIX: &str = "employee-portal-language";

/// A flat key → template table for one language.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    entries: HashMap<String, String>,
}

impl Dictionary {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Raw entry, without fallback or reporting.
    pub fn entry(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Resolved value for `key`; see [`get_translation_value`].
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        get_translation_value(self, key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

static ENGLISH: LazyLock<Dictionary> =
    LazyLock::new(|| Dictionary::from_pairs(translations::EN.iter().copied()));
static GERMAN: LazyLock<Dictionary> =
    LazyLock::new(|| Dictionary::from_pairs(translations::DE.iter().copied()));

/// Built-in dictionary for a language.
pub fn dictionary(language: Language) -> &'static Dictionary {
    match language {
        Language::En => &ENGLISH,
        Language::De => &GERMAN,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingReason {
    Missing,
    Empty,
}

impl MissingReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Empty => "empty",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTranslation {
    pub key: String,
    pub reason: MissingReason,
}

pub type MissingTranslationHandler = Arc<dyn Fn(&MissingTranslation) + Send + Sync>;

static MISSING_HANDLER: RwLock<Option<MissingTranslationHandler>> = RwLock::new(None);

/// Install (or with `None`, remove) the process-wide handler.
pub fn set_missing_translation_handler(handler: Option<MissingTranslationHandler>) {
    let mut slot = MISSING_HANDLER
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    *slot = handler;
}

fn report_missing(key: &str, reason: MissingReason) {
    // Clone out of the lock so a handler may replace itself.
    let handler = MISSING_HANDLER
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    if let Some(handler) = handler {
        handler(&MissingTranslation {
            key: key.to_string(),
            reason,
        });
    }
}

/// Handler that formats each report as one line and passes it to `sink`.
pub fn create_missing_translation_logger<F>(sink: F) -> MissingTranslationHandler
where
    F: Fn(&str) + Send + Sync + 'static,
{
    Arc::new(move |missing: &MissingTranslation| {
        sink(&format!(
            "[i18n] Missing translation ({}): {}",
            missing.reason.as_str(),
            missing.key
        ));
    })
}

/// Route missing translations to `tracing` at warn level.
pub fn initialize_missing_translation_monitoring() {
    set_missing_translation_handler(Some(create_missing_translation_logger(|message| {
        tracing::warn!("{}", message);
    })));
}

pub fn get_translation_value<'a>(dictionary: &'a Dictionary, key: &'a str) -> &'a str {
    match dictionary.entry(key) {
        Some(value) if !value.is_empty() => value,
        Some(_) => {
            report_missing(key, MissingReason::Empty);
            key
        }
        None => {
            report_missing(key, MissingReason::Missing);
            key
        }
    }
}

/// Replace the first `{name}` for each variable, in the order given.
pub fn interpolate<K, V>(template: &str, vars: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: Display,
{
    let mut output = template.to_string();
    for (name, value) in vars {
        let token = format!("{{{}}}", name.as_ref());
        output = output.replacen(&token, &value.to_string(), 1);
    }
    output
}

pub fn translate<K, V>(language: Language, key: &str, vars: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: Display,
{
    interpolate(get_translation_value(dictionary(language), key), vars)
}

/// Storage key for a signed-in employee's language choice.
pub fn language_storage_key(employee_id: Option<&str>) -> Option<String> {
    employee_id
        .filter(|id| !id.trim().is_empty())
        .map(|id| format!("{LANGUAGE_STORAGE_PREFIX}:{id}"))
}

pub fn resolve_stored_language(value: Option<&str>, fallback: Language) -> Language {
    value
        .map(str::trim)
        .and_then(Language::from_str)
        .unwrap_or(fallback)
}
