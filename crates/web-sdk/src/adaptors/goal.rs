//! Optimizely goal-queue adaptor — appends `trackEvent` command arrays, with
//! a revenue object when the goal carries a value.

use serde_json::{json, Value};
use tracing::debug;

use beacon_core::{BeaconError, BeaconResult};

use super::{Backend, Payload};
use crate::events::{Hit, HitKind};
use crate::sinks::{CollectorSlot, CommandQueue};

pub const TRACK_GOAL: &str = "trackEvent";

/// A/B-testing goal queue backend. Handles conversion goals only.
pub struct GoalQueueBackend {
    queue: CollectorSlot<dyn CommandQueue>,
}

impl GoalQueueBackend {
    pub fn new(queue: CollectorSlot<dyn CommandQueue>) -> Self {
        Self { queue }
    }
}

impl Backend for GoalQueueBackend {
    fn platform(&self) -> &'static str {
        "goal"
    }

    fn supports(&self, kind: HitKind) -> bool {
        kind == HitKind::Goal
    }

    fn is_present(&self) -> bool {
        self.queue.is_bound()
    }

    fn transform(&self, hit: &Hit) -> BeaconResult<Payload> {
        let Hit::Goal(goal) = hit else {
            return Err(BeaconError::UnsupportedHit {
                platform: self.platform(),
                kind: hit.kind().as_str(),
            });
        };

        let mut command: Vec<Value> = vec![json!(TRACK_GOAL), json!(goal.action)];
        if let Some(cents) = goal.value_in_cents {
            command.push(json!({ "revenue": cents }));
        }
        Ok(Payload::Command(command))
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
            revenue = command.len() > 2,
            "goal queue command pushed"
        );
        queue.push(command);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NormalizedGoal;
    use crate::sinks::capture_queue;

    #[test]
    fn test_goal_without_revenue() {
        let (slot, queue) = capture_queue();
        let backend = GoalQueueBackend::new(slot);
        let hit = Hit::Goal(NormalizedGoal {
            action: "Simple".into(),
            value_in_cents: None,
        });
        assert!(backend.forward(&hit).unwrap());
        assert_eq!(queue.commands(), vec![vec![json!("trackEvent"), json!("Simple")]]);
    }

    #[test]
    fn test_goal_with_revenue() {
        let (slot, queue) = capture_queue();
        let backend = GoalQueueBackend::new(slot);
        let hit = Hit::Goal(NormalizedGoal {
            action: "Simple".into(),
            value_in_cents: Some(1),
        });
        backend.forward(&hit).unwrap();
        assert_eq!(
            queue.commands(),
            vec![vec![
                json!("trackEvent"),
                json!("Simple"),
                json!({"revenue": 1})
            ]]
        );
    }

    #[test]
    fn test_only_goals_supported() {
        let backend = GoalQueueBackend::new(CollectorSlot::empty());
        assert!(backend.supports(HitKind::Goal));
        assert!(!backend.supports(HitKind::Event));
        assert!(!backend.supports(HitKind::Pageview));
        assert!(!backend.is_present());
    }
}
