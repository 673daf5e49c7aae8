//! Field normalization shared by every operation.
//!
//! Nothing here fails: a missing required field yields `None` and the whole
//! call is dropped, a wrong-typed optional field yields `None` and only that
//! field is dropped.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use beacon_core::config::BeaconConfig;

use crate::events::{
    EventOptions, GoalOptions, NormalizedEvent, NormalizedGoal, NormalizedPageview,
};

/// `local@domain.tld` with no whitespace in any part. Deliberately loose on
/// the character classes and strict on shape.
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\s@]+@[^\s@]+\.[^\s@]+").expect("email pattern compiles"));

#[derive(Debug, Clone)]
pub struct Normalizer {
    virtual_prefix: String,
    redaction_marker: String,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::from_config(&BeaconConfig::default())
    }
}

impl Normalizer {
    pub fn new(virtual_prefix: impl Into<String>, redaction_marker: impl Into<String>) -> Self {
        Self {
            virtual_prefix: virtual_prefix.into(),
            redaction_marker: redaction_marker.into(),
        }
    }

    pub fn from_config(config: &BeaconConfig) -> Self {
        Self::new(config.virtual_prefix.clone(), config.redaction_marker.clone())
    }

    /// Normalize an `event()` call. `default_category` is used when the
    /// options carry no usable category.
    pub fn event(
        &self,
        action: Option<&str>,
        options: &EventOptions,
        default_category: &str,
    ) -> Option<NormalizedEvent> {
        let action = self.action(action)?;
        Some(NormalizedEvent {
            category: self
                .category(options.category.as_ref())
                .unwrap_or_else(|| default_category.to_string()),
            action,
            label: self.label(options.label.as_ref()),
            value: value(options.value.as_ref()),
            non_interaction: flag(options.non_interaction.as_ref())
                .or_else(|| flag(options.noninteraction.as_ref())),
        })
    }

    pub fn pageview(&self, path: Option<&str>) -> Option<NormalizedPageview> {
        self.path(path).map(|path| NormalizedPageview { path })
    }

    pub fn goal(&self, action: Option<&str>, options: &GoalOptions) -> Option<NormalizedGoal> {
        let action = self.action(action)?;
        Some(NormalizedGoal {
            action,
            value_in_cents: cents(options.value_in_cents.as_ref()),
        })
    }

    /// Trim, title-case, redact. `None` when the action is missing or blank.
    pub fn action(&self, raw: Option<&str>) -> Option<String> {
        let trimmed = required(raw)?;
        Some(self.redact(title_case(trimmed)))
    }

    /// An explicit category, trimmed and redacted. `None` when absent, blank
    /// or not a string, so the host name applies.
    pub fn category(&self, raw: Option<&Value>) -> Option<String> {
        let category = required(raw?.as_str())?;
        Some(self.redact(category.to_string()))
    }

    /// Only string labels survive; they are trimmed and redacted.
    pub fn label(&self, raw: Option<&Value>) -> Option<String> {
        let label = raw?.as_str()?.trim();
        Some(self.redact(label.to_string()))
    }

    /// File the path under the virtual prefix exactly once.
    pub fn path(&self, raw: Option<&str>) -> Option<String> {
        let trimmed = required(raw)?;
        if trimmed.starts_with(self.virtual_prefix.as_str()) {
            return Some(trimmed.to_string());
        }

        let bare = trimmed.strip_prefix('/').unwrap_or(trimmed);
        Some(format!("{}{}", self.virtual_prefix, bare))
    }

    pub fn redact(&self, text: String) -> String {
        if EMAIL_PATTERN.is_match(&text) {
            self.redaction_marker.clone()
        } else {
            text
        }
    }
}

fn required(raw: Option<&str>) -> Option<&str> {
    let trimmed = raw?.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Upper-case the first character only; the rest is left as given.
pub fn title_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// JSON numbers only, truncated toward zero. Zero is a real value. Integers
/// beyond `i64` go through `f64` and saturate at the cast.
pub fn value(raw: Option<&Value>) -> Option<i64> {
    let number = raw?.as_number()?;
    if let Some(n) = number.as_i64() {
        return Some(n);
    }
    number.as_f64().map(|f| f.trunc() as i64)
}

/// Strict booleans only; `"true"` is not a flag.
pub fn flag(raw: Option<&Value>) -> Option<bool> {
    raw?.as_bool()
}

/// Positive whole numbers only. Zero means "no revenue" and is skipped.
pub fn cents(raw: Option<&Value>) -> Option<u64> {
    let number = raw?.as_number()?;
    if let Some(n) = number.as_u64() {
        return (n > 0).then_some(n);
    }
    if number.is_i64() {
        return None;
    }
    let f = number.as_f64()?;
    (f.is_finite() && f.fract() == 0.0 && f >= 1.0 && f <= u64::MAX as f64).then(|| f as u64)
}
