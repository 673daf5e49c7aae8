//! ga.js command-queue adaptor — appends `_trackEvent` / `_trackPageview`
//! command arrays to a `_gaq` style queue.

use serde_json::{json, Value};
use tracing::debug;

use beacon_core::{BeaconError, BeaconResult};

use super::{Backend, Payload};
use crate::events::{Hit, HitKind, NormalizedEvent};
use crate::sinks::{CollectorSlot, CommandQueue};

pub const TRACK_EVENT: &str = "_trackEvent";
pub const TRACK_PAGEVIEW: &str = "_trackPageview";

/// Legacy `_gaq` queue backend. Handles events and virtual pageviews.
pub struct LegacyQueueBackend {
    queue: CollectorSlot<dyn CommandQueue>,
}

impl LegacyQueueBackend {
    pub fn new(queue: CollectorSlot<dyn CommandQueue>) -> Self {
        Self { queue }
    }

    /// `[_trackEvent, category, action, label?, value?, nonInteraction?]`.
    ///
    /// Optional fields sit at fixed indices 3, 4 and 5. Trailing absent
    /// fields are left off; an absent field in front of a present one is
    /// `null`.
    fn event_command(event: &NormalizedEvent) -> Vec<Value> {
        let optional = [
            event.label.as_ref().map(|l| json!(l)),
            event.value.map(|v| json!(v)),
            event.non_interaction.map(|f| json!(f)),
        ];
        let used = optional
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |last| last + 1);

        let mut command = vec![
            json!(TRACK_EVENT),
            json!(event.category),
            json!(event.action),
        ];
        command.extend(
            optional
                .into_iter()
                .take(used)
                .map(|field| field.unwrap_or(Value::Null)),
        );
        command
    }
}

impl Backend for LegacyQueueBackend {
    fn platform(&self) -> &'static str {
        "legacy"
    }

    fn supports(&self, kind: HitKind) -> bool {
        matches!(kind, HitKind::Event | HitKind::Pageview)
    }

    fn is_present(&self) -> bool {
        self.queue.is_bound()
    }

    fn transform(&self, hit: &Hit) -> BeaconResult<Payload> {
        match hit {
            Hit::Event(event) => Ok(Payload::Command(Self::event_command(event))),
            Hit::Pageview(pageview) => Ok(Payload::Command(vec![
                json!(TRACK_PAGEVIEW),
                json!(pageview.path),
            ])),
            Hit::Goal(_) => Err(BeaconError::UnsupportedHit {
                platform: self.platform(),
                kind: hit.kind().as_str(),
            }),
        }
    }

    fn forward(&self, hit: &Hit) -> BeaconResult<bool> {
        let Payload::Command(command) = self.transform(hit)? else {
            return Ok(false);
        };
        let Some(queue) = self.queue.current() else {
            return Ok(false);
        };

        debug!(
            kind = hit.kind().as_str(),
            fields = command.len(),
            "legacy queue command pushed"
        );
        queue.push(command);
        Ok(true)
    }
}
