//! Collectors — the page-owned objects hits end up in.
//!
//! A host hands the tracker [`CollectorSlot`]s instead of letting it reach for
//! globals. Slots can be bound or cleared at any time; backends look at them
//! on every call.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};

/// Append-only command queue (`_gaq`, `optimizely`). Never read back.
pub trait CommandQueue: Send + Sync {
    fn push(&self, command: Vec<Value>);
}

/// Callable hit dispatcher (`ga`). Its return value is never inspected.
pub trait HitDispatcher: Send + Sync {
    fn send(&self, command: &str, fields: Map<String, Value>);
}

impl<F> CommandQueue for F
where
    F: Fn(Vec<Value>) + Send + Sync,
{
    fn push(&self, command: Vec<Value>) {
        self(command)
    }
}

impl<F> HitDispatcher for F
where
    F: Fn(&str, Map<String, Value>) + Send + Sync,
{
    fn send(&self, command: &str, fields: Map<String, Value>) {
        self(command, fields)
    }
}

/// Shared, re-bindable reference to a collector. Clones see the same binding.
pub struct CollectorSlot<T: ?Sized> {
    binding: Arc<RwLock<Option<Arc<T>>>>,
}

impl<T: ?Sized> CollectorSlot<T> {
    pub fn empty() -> Self {
        Self {
            binding: Arc::new(RwLock::new(None)),
        }
    }

    pub fn bound(collector: Arc<T>) -> Self {
        let slot = Self::empty();
        slot.bind(collector);
        slot
    }

    pub fn bind(&self, collector: Arc<T>) {
        *self.binding.write() = Some(collector);
    }

    pub fn unbind(&self) {
        *self.binding.write() = None;
    }

    pub fn current(&self) -> Option<Arc<T>> {
        self.binding.read().clone()
    }

    pub fn is_bound(&self) -> bool {
        self.binding.read().is_some()
    }
}

impl<T: ?Sized> Clone for CollectorSlot<T> {
    fn clone(&self) -> Self {
        Self {
            binding: Arc::clone(&self.binding),
        }
    }
}

impl<T: ?Sized> Default for CollectorSlot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized> std::fmt::Debug for CollectorSlot<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectorSlot")
            .field("bound", &self.is_bound())
            .finish()
    }
}

/// In-memory queue that records every pushed command.
#[derive(Default)]
pub struct CaptureQueue {
    commands: Mutex<Vec<Vec<Value>>>,
}

impl CaptureQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> Vec<Vec<Value>> {
        self.commands.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.commands.lock().len()
    }

    pub fn clear(&self) {
        self.commands.lock().clear();
    }
}

impl CommandQueue for CaptureQueue {
    fn push(&self, command: Vec<Value>) {
        self.commands.lock().push(command);
    }
}

/// A recorded `send` call.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchedHit {
    pub command: String,
    pub fields: Map<String, Value>,
}

/// In-memory dispatcher that records every call.
#[derive(Default)]
pub struct CaptureDispatcher {
    hits: Mutex<Vec<DispatchedHit>>,
}

impl CaptureDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> Vec<DispatchedHit> {
        self.hits.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.hits.lock().len()
    }

    pub fn clear(&self) {
        self.hits.lock().clear();
    }
}

impl HitDispatcher for CaptureDispatcher {
    fn send(&self, command: &str, fields: Map<String, Value>) {
        self.hits.lock().push(DispatchedHit {
            command: command.to_string(),
            fields,
        });
    }
}

/// Convenience: an empty slot with a fresh capture queue bound to it.
pub fn capture_queue() -> (CollectorSlot<dyn CommandQueue>, Arc<CaptureQueue>) {
    let queue = Arc::new(CaptureQueue::new());
    let shared: Arc<dyn CommandQueue> = queue.clone();
    (CollectorSlot::bound(shared), queue)
}

/// Convenience: a slot with a fresh capture dispatcher bound to it.
pub fn capture_dispatcher() -> (CollectorSlot<dyn HitDispatcher>, Arc<CaptureDispatcher>) {
    let dispatcher = Arc::new(CaptureDispatcher::new());
    let shared: Arc<dyn HitDispatcher> = dispatcher.clone();
    (CollectorSlot::bound(shared), dispatcher)
}
