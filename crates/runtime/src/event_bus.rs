use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::Serialize;
use tracing::{info, warn};

pub const ALERT: &str = "alert";

/// Events kept before the oldest are dropped.
pub const DEFAULT_CAPACITY: usize = 256;

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub seq: u64,
    pub kind: &'static str,
    pub message: String,
}

/// Sink for notifications that must reach the person driving the map.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: &'static str, message: String);

    fn alert(&self, message: String) {
        self.notify(ALERT, message);
    }
}

/// Records notifications in order and mirrors them to the log.
///
/// Only the most recent `capacity` events are retained. Cloning yields
/// another handle onto the same event list.
#[derive(Debug, Clone)]
pub struct EventBus {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Debug)]
struct Inner {
    capacity: usize,
    next_seq: u64,
    events: VecDeque<Event>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Arc::new(Mutex::new(Inner {
                capacity,
                next_seq: 0,
                events: VecDeque::with_capacity(capacity),
            })),
        }
    }

    pub fn events(&self) -> Vec<Event> {
        self.inner.lock().events.iter().cloned().collect()
    }

    pub fn alerts(&self) -> Vec<Event> {
        self.inner
            .lock()
            .events
            .iter()
            .filter(|e| e.kind == ALERT)
            .cloned()
            .collect()
    }

    /// Removes and returns the pending alerts, leaving other events in place.
    pub fn take_alerts(&self) -> Vec<Event> {
        let mut inner = self.inner.lock();
        let (alerts, rest): (Vec<Event>, Vec<Event>) = std::mem::take(&mut inner.events)
            .into_iter()
            .partition(|e| e.kind == ALERT);
        inner.events = rest.into();
        alerts
    }

    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut self.inner.lock().events).into()
    }
}

impl Notifier for EventBus {
    fn notify(&self, kind: &'static str, message: String) {
        if kind == ALERT {
            warn!(kind, "{message}");
        } else {
            info!(kind, "{message}");
        }
        let mut inner = self.inner.lock();
        inner.next_seq += 1;
        let seq = inner.next_seq;
        if inner.events.len() == inner.capacity {
            inner.events.pop_front();
        }
        inner.events.push_back(Event {
            seq,
            kind,
            message,
        });
    }
}
