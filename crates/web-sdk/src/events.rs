//! Call descriptors as they arrive from page code, and the normalized hits
//! the backends encode.
//!
//! Optional fields are carried as raw [`serde_json::Value`]s: page code is
//! loosely typed, and a wrong-typed field must be dropped quietly rather than
//! rejected at the boundary.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Options accepted by `event()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Lower-case spelling used by older call sites.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noninteraction: Option<Value>,
    #[serde(
        default,
        rename = "nonInteraction",
        skip_serializing_if = "Option::is_none"
    )]
    pub non_interaction: Option<Value>,
}

impl EventOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<Value>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn label(mut self, label: impl Into<Value>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn non_interaction(mut self, flag: impl Into<Value>) -> Self {
        self.non_interaction = Some(flag.into());
        self
    }
}

/// Options accepted by `conversionGoal()`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoalOptions {
    #[serde(
        default,
        rename = "valueInCents",
        skip_serializing_if = "Option::is_none"
    )]
    pub value_in_cents: Option<Value>,
}

impl GoalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value_in_cents(mut self, cents: impl Into<Value>) -> Self {
        self.value_in_cents = Some(cents.into());
        self
    }
}

/// One public call, decoded from JSON, e.g.
/// `{"op":"event","action":"signup","options":{"label":"footer"}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum TrackCall {
    Event {
        #[serde(default)]
        action: Option<Value>,
        #[serde(default, deserialize_with = "lenient_options")]
        options: EventOptions,
    },
    #[serde(alias = "virtualPageview")]
    VirtualPageview {
        #[serde(default)]
        path: Option<Value>,
    },
    #[serde(alias = "conversionGoal")]
    ConversionGoal {
        #[serde(default)]
        action: Option<Value>,
        #[serde(default, deserialize_with = "lenient_options")]
        options: GoalOptions,
    },
}

/// Options that are `null` or not an object decode as empty options, so the
/// call itself still goes out.
fn lenient_options<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + serde::de::DeserializeOwned,
{
    let raw = Value::deserialize(deserializer)?;
    if !raw.is_object() {
        return Ok(T::default());
    }
    Ok(serde_json::from_value(raw).unwrap_or_default())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HitKind {
    Event,
    Pageview,
    Goal,
}

impl HitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HitKind::Event => "event",
            HitKind::Pageview => "pageview",
            HitKind::Goal => "goal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    pub category: String,
    pub action: String,
    pub label: Option<String>,
    pub value: Option<i64>,
    pub non_interaction: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPageview {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedGoal {
    pub action: String,
    /// Always non-zero when present.
    pub value_in_cents: Option<u64>,
}

/// A fully normalized record, ready for a backend to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hit {
    Event(NormalizedEvent),
    Pageview(NormalizedPageview),
    Goal(NormalizedGoal),
}

impl Hit {
    pub fn kind(&self) -> HitKind {
        match self {
            Hit::Event(_) => HitKind::Event,
            Hit::Pageview(_) => HitKind::Pageview,
            Hit::Goal(_) => HitKind::Goal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_options_accepts_both_spellings() {
        let opts: EventOptions = serde_json::from_value(json!({
            "label": "footer",
            "value": 2.5,
            "noninteraction": "true",
            "nonInteraction": false
        }))
        .unwrap();
        assert_eq!(opts.label, Some(json!("footer")));
        assert_eq!(opts.value, Some(json!(2.5)));
        assert_eq!(opts.noninteraction, Some(json!("true")));
        assert_eq!(opts.non_interaction, Some(json!(false)));
        assert_eq!(opts.category, None);
    }

    #[test]
    fn test_track_call_decoding() {
        let call: TrackCall =
            serde_json::from_str(r#"{"op":"event","action":"signup","options":{"label":1}}"#)
                .unwrap();
        assert_eq!(
            call,
            TrackCall::Event {
                action: Some(json!("signup")),
                options: EventOptions::new().label(1),
            }
        );

        let call: TrackCall =
            serde_json::from_str(r#"{"op":"virtualPageview","path":"/simple"}"#).unwrap();
        assert_eq!(
            call,
            TrackCall::VirtualPageview {
                path: Some(json!("/simple"))
            }
        );

        let call: TrackCall = serde_json::from_str(
            r#"{"op":"conversion_goal","action":"Buy","options":{"valueInCents":150}}"#,
        )
        .unwrap();
        assert_eq!(
            call,
            TrackCall::ConversionGoal {
                action: Some(json!("Buy")),
                options: GoalOptions::new().value_in_cents(150),
            }
        );
    }

    #[test]
    fn test_track_call_null_options() {
        let call: TrackCall =
            serde_json::from_str(r#"{"op":"event","action":"x","options":null}"#).unwrap();
        assert_eq!(
            call,
            TrackCall::Event {
                action: Some(json!("x")),
                options: EventOptions::default(),
            }
        );

        let call: TrackCall =
            serde_json::from_str(r#"{"op":"conversion_goal","action":"Buy","options":"cheap"}"#)
                .unwrap();
        assert_eq!(
            call,
            TrackCall::ConversionGoal {
                action: Some(json!("Buy")),
                options: GoalOptions::default(),
            }
        );
    }

    #[test]
    fn test_track_call_missing_fields_default() {
        let call: TrackCall = serde_json::from_str(r#"{"op":"event"}"#).unwrap();
        assert_eq!(
            call,
            TrackCall::Event {
                action: None,
                options: EventOptions::default(),
            }
        );
    }
}
