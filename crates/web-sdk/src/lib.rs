//! Browser-side analytics call normalization — one uniform API in front of
//! the ga.js command queue, the analytics.js hit dispatcher, and the
//! Optimizely goal queue.
//!
//! # Modules
//!
//! - [`events`] — Call descriptors, normalized hits, and the JSON call format
//! - [`normalize`] — Field trimming, title-casing, email redaction, type filters
//! - [`sinks`] — Collector traits, re-bindable slots, capture collectors
//! - [`adaptors`] — Per-backend wire encoders (legacy queue, hit dispatcher, goal queue)
//! - [`tracker`] — The dispatching facade callers talk to

pub mod adaptors;
pub mod events;
pub mod normalize;
pub mod sinks;
pub mod tracker;

pub use adaptors::goal::GoalQueueBackend;
pub use adaptors::hit::HitDispatcherBackend;
pub use adaptors::legacy::LegacyQueueBackend;
pub use adaptors::{Backend, Payload};
pub use events::{EventOptions, GoalOptions, Hit, HitKind, TrackCall};
pub use normalize::Normalizer;
pub use sinks::{CaptureDispatcher, CaptureQueue, CollectorSlot, CommandQueue, HitDispatcher};
pub use tracker::{Collectors, Tracker};
