//! Publish/subscribe relay with queued and immediate delivery.
//!
//! The bus is single-threaded and exposes a `&self` API backed by interior
//! mutability, so handlers can publish, subscribe or unsubscribe while a
//! dispatch is in progress. Each handler receives the bus it was invoked from.
//!
//! Delivery rules:
//! - [`EventBus::publish`] queues; the event is dispatched by the next
//!   [`EventBus::tick`], in emission order.
//! - [`EventBus::publish_immediate`] dispatches to current subscribers before
//!   returning.
//! - `tick` drains a snapshot of the queue. Events queued by handlers during
//!   the drain wait for the following `tick`; a nested `tick` is a no-op.
//! - Handler lists are snapshotted per dispatch, in subscription order.
//! - A failing handler is logged and skipped; the remaining handlers still run.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

use log::{debug, warn};
use thiserror::Error;

use super::types::{Event, EventKind, GameEvent};

/// Fault raised by an event handler; logged at the dispatch site
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("handler does not accept {0} events")]
    Unhandled(EventKind),
    #[error("handler state is already borrowed")]
    Busy,
    #[error("{0}")]
    Failed(String),
}

pub type HandlerResult = Result<(), HandlerError>;

type Handler = Rc<RefCell<dyn FnMut(&Event, &EventBus) -> HandlerResult>>;

/// Token returned by [`EventBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscription {
    id: SubscriptionId,
    handler: Handler,
}

#[derive(Default)]
pub struct EventBus {
    subscribers: RefCell<HashMap<EventKind, Vec<Subscription>>>,
    queue: RefCell<VecDeque<Event>>,
    draining: Cell<bool>,
    next_id: Cell<u64>,
    now_ms: Cell<f64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `kind`. Takes effect from the next dispatch.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&Event, &EventBus) -> HandlerResult + 'static,
    {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        let handler: Handler = Rc::new(RefCell::new(handler));
        self.subscribers
            .borrow_mut()
            .entry(kind)
            .or_default()
            .push(Subscription { id, handler });
        id
    }

    /// Remove a subscription. Returns false if it was not registered for `kind`.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let Some(list) = subscribers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|sub| sub.id != id);
        before != list.len()
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers
            .borrow()
            .get(&kind)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Set the timestamp stamped on subsequently published events
    pub fn set_time(&self, now_ms: f64) {
        self.now_ms.set(now_ms);
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }

    fn stamp(&self, payload: GameEvent) -> Event {
        Event {
            payload,
            timestamp_ms: self.now_ms.get(),
        }
    }

    /// Queue an event for the next [`tick`](Self::tick)
    pub fn publish(&self, payload: GameEvent) {
        let event = self.stamp(payload);
        self.queue.borrow_mut().push_back(event);
    }

    /// Dispatch an event to current subscribers before returning
    pub fn publish_immediate(&self, payload: GameEvent) {
        let event = self.stamp(payload);
        self.dispatch(&event);
    }

    /// Number of queued events awaiting the next tick
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Drain the queue once. Returns the number of events dispatched.
    pub fn tick(&self) -> usize {
        if self.draining.replace(true) {
            debug!("EventBus::tick called during a drain; ignoring");
            return 0;
        }
        let batch = std::mem::take(&mut *self.queue.borrow_mut());
        let count = batch.len();
        for event in &batch {
            self.dispatch(event);
        }
        self.draining.set(false);
        count
    }

    fn dispatch(&self, event: &Event) {
        let kind = event.kind();
        let handlers: Vec<Handler> = match self.subscribers.borrow().get(&kind) {
            Some(list) => list.iter().map(|sub| Rc::clone(&sub.handler)).collect(),
            None => return,
        };

        for handler in handlers {
            let Ok(mut handler) = handler.try_borrow_mut() else {
                warn!("{kind} handler re-entered while running; skipped");
                continue;
            };
            if let Err(err) = (&mut *handler)(event, self) {
                warn!("{kind} handler failed: {err}");
            }
        }
    }

    /// Drop every subscription and queued event
    pub fn clear(&self) {
        self.subscribers.borrow_mut().clear();
        self.queue.borrow_mut().clear();
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("pending", &self.queue.borrow().len())
            .field("draining", &self.draining.get())
            .field("now_ms", &self.now_ms.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MessageLevel;

    fn recorder(bus: &EventBus, kind: EventKind) -> Rc<RefCell<Vec<GameEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        bus.subscribe(kind, move |event, _| {
            sink.borrow_mut().push(event.payload.clone());
            Ok(())
        });
        seen
    }

    fn count(n: usize) -> GameEvent {
        GameEvent::FishCountChanged { count: n }
    }

    #[test]
    fn queued_events_wait_for_tick_and_keep_order() {
        let bus = EventBus::new();
        let seen = recorder(&bus, EventKind::FishCountChanged);

        bus.publish(count(1));
        bus.publish(count(2));
        assert!(seen.borrow().is_empty());
        assert_eq!(bus.pending(), 2);

        assert_eq!(bus.tick(), 2);
        assert_eq!(*seen.borrow(), vec![count(1), count(2)]);
        assert_eq!(bus.tick(), 0);
    }

    #[test]
    fn immediate_events_dispatch_synchronously() {
        let bus = EventBus::new();
        let seen = recorder(&bus, EventKind::CleanTank);
        bus.publish_immediate(GameEvent::CleanTank);
        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn handlers_run_in_subscription_order() {
        let bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            let order = Rc::clone(&order);
            bus.subscribe(EventKind::AddFish, move |_, _| {
                order.borrow_mut().push(tag);
                Ok(())
            });
        }
        bus.publish_immediate(GameEvent::AddFish);
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn events_queued_during_drain_wait_for_next_tick() {
        let bus = EventBus::new();
        let seen = recorder(&bus, EventKind::Message);
        bus.subscribe(EventKind::AddFish, |_, bus| {
            bus.publish(GameEvent::message("queued from handler", MessageLevel::Info));
            // Nested drain is refused
            assert_eq!(bus.tick(), 0);
            Ok(())
        });

        bus.publish(GameEvent::AddFish);
        assert_eq!(bus.tick(), 1);
        assert!(seen.borrow().is_empty());
        assert_eq!(bus.pending(), 1);

        assert_eq!(bus.tick(), 1);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn failing_handler_does_not_stop_others() {
        let bus = EventBus::new();
        bus.subscribe(EventKind::CleanTank, |_, _| {
            Err(HandlerError::Failed("boom".into()))
        });
        let seen = recorder(&bus, EventKind::CleanTank);
        let other = recorder(&bus, EventKind::AddFish);

        bus.publish(GameEvent::CleanTank);
        bus.publish(GameEvent::AddFish);
        bus.tick();

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(other.borrow().len(), 1);
    }

    #[test]
    fn subscribing_during_dispatch_affects_next_pass_only() {
        let bus = EventBus::new();
        let late_calls = Rc::new(Cell::new(0));
        let late = Rc::clone(&late_calls);
        bus.subscribe(EventKind::AddFish, move |_, bus| {
            let late = Rc::clone(&late);
            bus.subscribe(EventKind::AddFish, move |_, _| {
                late.set(late.get() + 1);
                Ok(())
            });
            Ok(())
        });

        bus.publish_immediate(GameEvent::AddFish);
        assert_eq!(late_calls.get(), 0);
        bus.publish_immediate(GameEvent::AddFish);
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn self_targeting_immediate_event_is_skipped() {
        let bus = EventBus::new();
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        bus.subscribe(EventKind::AddFish, move |_, bus| {
            c.set(c.get() + 1);
            bus.publish_immediate(GameEvent::AddFish);
            Ok(())
        });
        bus.publish_immediate(GameEvent::AddFish);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn unsubscribe_removes_handler() {
        let bus = EventBus::new();
        let calls = Rc::new(Cell::new(0));
        let c = Rc::clone(&calls);
        let id = bus.subscribe(EventKind::AddFish, move |_, _| {
            c.set(c.get() + 1);
            Ok(())
        });
        assert!(bus.unsubscribe(EventKind::AddFish, id));
        assert!(!bus.unsubscribe(EventKind::AddFish, id));
        assert!(!bus.unsubscribe(EventKind::CleanTank, id));
        bus.publish_immediate(GameEvent::AddFish);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn events_carry_bus_time() {
        let bus = EventBus::new();
        let stamps = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&stamps);
        bus.subscribe(EventKind::CleanTank, move |event, _| {
            s.borrow_mut().push(event.timestamp_ms);
            Ok(())
        });
        bus.set_time(1_500.0);
        bus.publish(GameEvent::CleanTank);
        bus.set_time(2_000.0);
        bus.tick();
        assert_eq!(*stamps.borrow(), vec![1_500.0]);
    }

    #[test]
    fn clear_drops_everything() {
        let bus = EventBus::new();
        let seen = recorder(&bus, EventKind::CleanTank);
        bus.publish(GameEvent::CleanTank);
        bus.clear();
        assert_eq!(bus.tick(), 0);
        assert_eq!(bus.subscriber_count(EventKind::CleanTank), 0);
        assert!(seen.borrow().is_empty());
    }
}
