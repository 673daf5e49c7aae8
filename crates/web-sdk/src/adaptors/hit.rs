//! analytics.js hit-dispatcher adaptor — calls `ga("send", {...})` with an
//! event field object.

use serde_json::{json, Map, Value};
use tracing::debug;

use beacon_core::{BeaconError, BeaconResult};

use super::{Backend, Payload};
use crate::events::{Hit, HitKind};
use crate::sinks::{CollectorSlot, HitDispatcher};

pub const SEND: &str = "send";

/// Modern `ga()` dispatcher backend. Handles events only.
pub struct HitDispatcherBackend {
    dispatcher: CollectorSlot<dyn HitDispatcher>,
}

impl HitDispatcherBackend {
    pub fn new(dispatcher: CollectorSlot<dyn HitDispatcher>) -> Self {
        Self { dispatcher }
    }
}

impl Backend for HitDispatcherBackend {
    fn platform(&self) -> &'static str {
        "hit"
    }

    fn supports(&self, kind: HitKind) -> bool {
        kind == HitKind::Event
    }

    fn is_present(&self) -> bool {
        self.dispatcher.is_bound()
    }

    fn transform(&self, hit: &Hit) -> BeaconResult<Payload> {
        let Hit::Event(event) = hit else {
            return Err(BeaconError::UnsupportedHit {
                platform: self.platform(),
                kind: hit.kind().as_str(),
            });
        };

        let mut fields = Map::new();
        fields.insert("hitType".into(), json!("event"));
        fields.insert("eventCategory".into(), json!(event.category));
        fields.insert("eventAction".into(), json!(event.action));
        if let Some(ref label) = event.label {
            fields.insert("eventLabel".into(), json!(label));
        }
        if let Some(value) = event.value {
            fields.insert("eventValue".into(), json!(value));
        }
        if let Some(flag) = event.non_interaction {
            fields.insert("nonInteraction".into(), Value::Bool(flag));
        }

        Ok(Payload::Dispatch {
            command: SEND,
            fields,
        })
    }

    fn forward(&self, hit: &Hit) -> BeaconResult<bool> {
        let Payload::Dispatch { command, fields } = self.transform(hit)? else {
            return Ok(false);
        };
        let Some(dispatcher) = self.dispatcher.current() else {
            return Ok(false);
        };

        debug!(
            kind = hit.kind().as_str(),
            fields = fields.len(),
            "hit dispatched"
        );
        dispatcher.send(command, fields);
        Ok(true)
    }
}
