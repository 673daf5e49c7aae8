//! Tracker — the one object page code talks to.
//!
//! Each call is normalized, turned into a [`Hit`], and handed to the first
//! backend (in priority order) that supports the hit kind and has a collector
//! bound at call time. Calls never fail: missing input or a missing collector
//! just means nothing is forwarded.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use beacon_core::config::{BackendKind, BeaconConfig};
use beacon_core::{BeaconResult, PageContext};

use crate::adaptors::goal::GoalQueueBackend;
use crate::adaptors::hit::HitDispatcherBackend;
use crate::adaptors::legacy::LegacyQueueBackend;
use crate::adaptors::Backend;
use crate::events::{EventOptions, GoalOptions, Hit, TrackCall};
use crate::normalize::Normalizer;
use crate::sinks::{CollectorSlot, CommandQueue, HitDispatcher};

/// The collector bindings a host page can provide.
#[derive(Debug, Clone, Default)]
pub struct Collectors {
    pub legacy_queue: CollectorSlot<dyn CommandQueue>,
    pub hit_dispatcher: CollectorSlot<dyn HitDispatcher>,
    pub goal_queue: CollectorSlot<dyn CommandQueue>,
}

impl Collectors {
    pub fn new() -> Self {
        Self::default()
    }

    fn backend(&self, kind: BackendKind) -> Arc<dyn Backend> {
        match kind {
            BackendKind::Hit => Arc::new(HitDispatcherBackend::new(self.hit_dispatcher.clone())),
            BackendKind::Legacy => Arc::new(LegacyQueueBackend::new(self.legacy_queue.clone())),
            BackendKind::Goal => Arc::new(GoalQueueBackend::new(self.goal_queue.clone())),
        }
    }
}

pub struct Tracker {
    normalizer: Normalizer,
    context: PageContext,
    backends: Vec<Arc<dyn Backend>>,
}

impl Tracker {
    /// A tracker with no backends. Add them with [`Tracker::with_backend`].
    pub fn new(normalizer: Normalizer, context: PageContext) -> Self {
        Self {
            normalizer,
            context,
            backends: Vec::new(),
        }
    }

    /// Build a tracker whose backends follow `config.backends`, each reading
    /// its collector from `collectors`.
    pub fn from_config(config: &BeaconConfig, collectors: &Collectors) -> BeaconResult<Self> {
        config.validate()?;
        let tracker = config.backends.iter().fold(
            Self::new(
                Normalizer::from_config(config),
                PageContext::new(config.hostname.clone()),
            ),
            |tracker, kind| tracker.with_backend(collectors.backend(*kind)),
        );
        Ok(tracker)
    }

    /// Append a backend at the lowest priority.
    pub fn with_backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backends.push(backend);
        self
    }

    pub fn with_context(mut self, context: PageContext) -> Self {
        self.context = context;
        self
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    /// Platforms in priority order.
    pub fn platforms(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.platform()).collect()
    }

    /// Log a custom event. Returns the platform that received it.
    pub fn event(&self, action: Option<&str>, options: &EventOptions) -> Option<&'static str> {
        let Some(event) = self
            .normalizer
            .event(action, options, &self.context.hostname)
        else {
            debug!(op = "event", reason = "missing action", "call dropped");
            return None;
        };
        self.route(Hit::Event(event))
    }

    /// Log a pageview under the virtual path prefix.
    pub fn virtual_pageview(&self, path: Option<&str>) -> Option<&'static str> {
        let Some(pageview) = self.normalizer.pageview(path) else {
            debug!(op = "virtual_pageview", reason = "missing path", "call dropped");
            return None;
        };
        self.route(Hit::Pageview(pageview))
    }

    /// Record an A/B-test conversion goal.
    pub fn conversion_goal(
        &self,
        action: Option<&str>,
        options: &GoalOptions,
    ) -> Option<&'static str> {
        let Some(goal) = self.normalizer.goal(action, options) else {
            debug!(op = "conversion_goal", reason = "missing action", "call dropped");
            return None;
        };
        self.route(Hit::Goal(goal))
    }

    /// Replay a loosely typed call. Non-string actions and paths count as
    /// missing.
    pub fn dispatch(&self, call: &TrackCall) -> Option<&'static str> {
        match call {
            TrackCall::Event { action, options } => self.event(text(action), options),
            TrackCall::VirtualPageview { path } => self.virtual_pageview(text(path)),
            TrackCall::ConversionGoal { action, options } => {
                self.conversion_goal(text(action), options)
            }
        }
    }

    fn route(&self, hit: Hit) -> Option<&'static str> {
        let kind = hit.kind();
        for backend in &self.backends {
            if !backend.supports(kind) || !backend.is_present() {
                continue;
            }
            match backend.forward(&hit) {
                Ok(true) => {
                    debug!(platform = backend.platform(), kind = kind.as_str(), "hit forwarded");
                    return Some(backend.platform());
                }
                // Collector went away between the presence check and delivery.
                Ok(false) => continue,
                Err(e) => {
                    warn!(platform = backend.platform(), error = %e, "backend rejected hit");
                    return None;
                }
            }
        }
        debug!(kind = kind.as_str(), reason = "no collector bound", "call dropped");
        None
    }
}

fn text(raw: &Option<Value>) -> Option<&str> {
    raw.as_ref().and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::{CaptureDispatcher, CaptureQueue};
    use serde_json::json;

    fn collectors() -> (Collectors, Arc<CaptureQueue>, Arc<CaptureDispatcher>, Arc<CaptureQueue>) {
        let collectors = Collectors::new();
        let legacy = Arc::new(CaptureQueue::new());
        let ga = Arc::new(CaptureDispatcher::new());
        let goals = Arc::new(CaptureQueue::new());
        collectors.legacy_queue.bind(legacy.clone());
        collectors.hit_dispatcher.bind(ga.clone());
        collectors.goal_queue.bind(goals.clone());
        (collectors, legacy, ga, goals)
    }

    #[test]
    fn test_from_config_order() {
        let config = BeaconConfig {
            backends: vec![BackendKind::Legacy, BackendKind::Goal],
            ..Default::default()
        };
        let tracker = Tracker::from_config(&config, &Collectors::new()).unwrap();
        assert_eq!(tracker.platforms(), vec!["legacy", "goal"]);
        assert_eq!(tracker.context().hostname, "localhost");
    }

    #[test]
    fn test_from_config_rejects_invalid() {
        let config = BeaconConfig {
            virtual_prefix: "nope".into(),
            ..Default::default()
        };
        assert!(Tracker::from_config(&config, &Collectors::new()).is_err());
    }

    #[test]
    fn test_hit_dispatcher_preferred_for_events() {
        let (collectors, legacy, ga, _) = collectors();
        let tracker = Tracker::from_config(&BeaconConfig::default(), &collectors).unwrap();

        assert_eq!(tracker.event(Some("action"), &EventOptions::new()), Some("hit"));
        assert_eq!(ga.count(), 1);
        assert_eq!(legacy.count(), 0);
    }

    #[test]
    fn test_priority_follows_config() {
        let (collectors, legacy, ga, _) = collectors();
        let config = BeaconConfig {
            backends: vec![BackendKind::Legacy, BackendKind::Hit],
            ..Default::default()
        };
        let tracker = Tracker::from_config(&config, &collectors).unwrap();

        assert_eq!(tracker.event(Some("action"), &EventOptions::new()), Some("legacy"));
        assert_eq!(legacy.count(), 1);
        assert_eq!(ga.count(), 0);
    }

    #[test]
    fn test_pageview_skips_hit_dispatcher() {
        let collectors = Collectors::new();
        let ga = Arc::new(CaptureDispatcher::new());
        collectors.hit_dispatcher.bind(ga.clone());
        let tracker = Tracker::from_config(&BeaconConfig::default(), &collectors).unwrap();

        assert_eq!(tracker.virtual_pageview(Some("simple")), None);
        assert_eq!(ga.count(), 0);
    }

    #[test]
    fn test_dispatch_non_string_action_dropped() {
        let (collectors, legacy, ga, goals) = collectors();
        let tracker = Tracker::from_config(&BeaconConfig::default(), &collectors).unwrap();

        let call = TrackCall::Event {
            action: Some(json!(42)),
            options: EventOptions::new(),
        };
        assert_eq!(tracker.dispatch(&call), None);
        let call = TrackCall::VirtualPageview { path: None };
        assert_eq!(tracker.dispatch(&call), None);
        let call = TrackCall::ConversionGoal {
            action: Some(json!(["Buy"])),
            options: GoalOptions::new(),
        };
        assert_eq!(tracker.dispatch(&call), None);

        assert_eq!(legacy.count() + ga.count() + goals.count(), 0);
    }

    #[test]
    fn test_dispatch_null_options_still_forwards() {
        let collectors = Collectors::new();
        let legacy = Arc::new(CaptureQueue::new());
        collectors.legacy_queue.bind(legacy.clone());
        let tracker = Tracker::from_config(&BeaconConfig::default(), &collectors).unwrap();

        let call: TrackCall =
            serde_json::from_str(r#"{"op":"event","action":"x","options":null}"#).unwrap();
        assert_eq!(tracker.dispatch(&call), Some("legacy"));
        assert_eq!(
            legacy.commands(),
            vec![vec![json!("_trackEvent"), json!("localhost"), json!("X")]]
        );
    }

    #[test]
    fn test_dispatch_routes_each_op() {
        let (collectors, legacy, ga, goals) = collectors();
        let tracker = Tracker::from_config(&BeaconConfig::default(), &collectors).unwrap();

        let calls: Vec<TrackCall> = serde_json::from_str(
            r#"[
                {"op":"event","action":"play","options":{"label":"intro"}},
                {"op":"virtual_pageview","path":"/signup/step-2"},
                {"op":"conversion_goal","action":"purchase","options":{"valueInCents":1999}}
            ]"#,
        )
        .unwrap();
        let routed: Vec<_> = calls.iter().map(|c| tracker.dispatch(c)).collect();
        assert_eq!(routed, vec![Some("hit"), Some("legacy"), Some("goal")]);

        assert_eq!(ga.hits()[0].fields["eventLabel"], "intro");
        assert_eq!(
            legacy.commands(),
            vec![vec![json!("_trackPageview"), json!("/virtual/signup/step-2")]]
        );
        assert_eq!(
            goals.commands(),
            vec![vec![json!("trackEvent"), json!("Purchase"), json!({"revenue": 1999})]]
        );
    }
}
