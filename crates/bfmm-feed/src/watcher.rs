//! Single-resolution order event watching.
//!
//! A watcher observes the broadcast stream of child-order events for the
//! first event matching its target, caches it, and stops consuming. The
//! strategy arms one per outstanding order and can rebind the target when
//! the acceptance id changes on a reprice.

use crate::error::{FeedError, FeedResult};
use bfmm_core::{AcceptanceId, OrderEvent, OrderEventType, Side};
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Match target for a watcher.
#[derive(Debug, Clone)]
pub struct EventMatch {
    pub acceptance_id: AcceptanceId,
    pub event_types: Vec<OrderEventType>,
    /// Extra side filter, rarely needed since acceptance ids are unique.
    pub side: Option<Side>,
}

impl EventMatch {
    pub fn new(acceptance_id: AcceptanceId, event_types: Vec<OrderEventType>) -> Self {
        Self {
            acceptance_id,
            event_types,
            side: None,
        }
    }

    /// Target a fill on `acceptance_id`.
    pub fn execution(acceptance_id: AcceptanceId) -> Self {
        Self::new(acceptance_id, vec![OrderEventType::Execution])
    }

    /// Target the outcome of a cancel request on `acceptance_id`.
    pub fn cancel(acceptance_id: AcceptanceId) -> Self {
        Self::new(
            acceptance_id,
            vec![OrderEventType::Cancel, OrderEventType::CancelFailed],
        )
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = Some(side);
        self
    }

    fn matches(&self, event: &OrderEvent) -> bool {
        event.acceptance_id == self.acceptance_id
            && self.event_types.contains(&event.event_type)
            && self.side.map_or(true, |side| event.side == Some(side))
    }
}

#[derive(Debug, Default)]
struct WatcherState {
    resolved: Option<OrderEvent>,
    closed: bool,
}

/// Watches the order event stream until one event matches.
pub struct EventWatcher {
    target: Arc<RwLock<EventMatch>>,
    state: Arc<RwLock<WatcherState>>,
    notify: Arc<Notify>,
    task: JoinHandle<()>,
}

impl EventWatcher {
    /// Spawn a watcher consuming `receiver` until `target` matches.
    pub fn spawn(receiver: broadcast::Receiver<OrderEvent>, target: EventMatch) -> Self {
        let target = Arc::new(RwLock::new(target));
        let state = Arc::new(RwLock::new(WatcherState::default()));
        let notify = Arc::new(Notify::new());

        let task = tokio::spawn(consume(
            receiver,
            Arc::clone(&target),
            Arc::clone(&state),
            Arc::clone(&notify),
        ));

        Self {
            target,
            state,
            notify,
            task,
        }
    }

    /// Whether the watcher has stopped, by resolution or stream close.
    pub fn done(&self) -> bool {
        let state = self.state.read();
        state.resolved.is_some() || state.closed
    }

    /// The resolved event, `NotReady` before resolution, `StreamClosed` if
    /// the stream ended first.
    pub fn result(&self) -> FeedResult<OrderEvent> {
        let state = self.state.read();
        if let Some(event) = &state.resolved {
            return Ok(event.clone());
        }
        if state.closed {
            return Err(FeedError::StreamClosed);
        }
        Err(FeedError::NotReady)
    }

    /// Await resolution.
    pub async fn wait(&self) -> FeedResult<OrderEvent> {
        loop {
            let notified = self.notify.notified();
            {
                let state = self.state.read();
                if let Some(event) = &state.resolved {
                    return Ok(event.clone());
                }
                if state.closed {
                    return Err(FeedError::StreamClosed);
                }
            }
            notified.await;
        }
    }

    /// Rebind an unresolved watcher to a new acceptance id, keeping the
    /// event-type and side filters.
    pub fn replace_target(&self, acceptance_id: AcceptanceId) {
        debug!(id = %acceptance_id, "Rebinding watcher target");
        self.target.write().acceptance_id = acceptance_id;
    }
}

impl Drop for EventWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn consume(
    mut receiver: broadcast::Receiver<OrderEvent>,
    target: Arc<RwLock<EventMatch>>,
    state: Arc<RwLock<WatcherState>>,
    notify: Arc<Notify>,
) {
    loop {
        match receiver.recv().await {
            Ok(event) => {
                if target.read().matches(&event) {
                    state.write().resolved = Some(event);
                    notify.notify_waiters();
                    return;
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Watcher fell behind the order event stream");
            }
            Err(RecvError::Closed) => {
                state.write().closed = true;
                notify.notify_waiters();
                return;
            }
        }
    }
}
