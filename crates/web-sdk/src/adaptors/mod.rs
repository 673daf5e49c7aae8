//! Backend adaptors — encode normalized [`Hit`]s in the exact wire shape a
//! third-party collector expects and hand them to it.
//!
//! Each adaptor implements [`Backend`]. The tracker walks its backends in
//! priority order and forwards a hit to the first one that supports the hit
//! kind and has a collector bound, so a new backend slots in without touching
//! the existing ones.

pub mod goal;
pub mod hit;
pub mod legacy;

use serde_json::{Map, Value};

use beacon_core::BeaconResult;

use crate::events::{Hit, HitKind};

/// A hit encoded for a specific collector.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// An array appended to a command queue.
    Command(Vec<Value>),
    /// A `(command, fields)` call on a hit dispatcher.
    Dispatch {
        command: &'static str,
        fields: Map<String, Value>,
    },
}

/// Backend trait — encodes hits for one collector family and delivers them.
pub trait Backend: Send + Sync {
    /// Platform identifier (e.g. "legacy", "hit", "goal").
    fn platform(&self) -> &'static str;

    /// Whether this backend has an encoding for the hit kind.
    fn supports(&self, kind: HitKind) -> bool;

    /// Whether a collector is bound right now.
    fn is_present(&self) -> bool;

    /// Encode a hit into the collector's wire shape. Pure.
    fn transform(&self, hit: &Hit) -> BeaconResult<Payload>;

    /// Encode and deliver. `Ok(false)` when no collector was bound at
    /// delivery time.
    fn forward(&self, hit: &Hit) -> BeaconResult<bool>;
}
