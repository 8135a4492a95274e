//! Named-channel publish/subscribe bus linking independent views.
//!
//! The bus is a transport, not a state store: it remembers who listens on
//! which channel and nothing else. Publishing fans a payload out synchronously
//! to every handler on the channel, in the order handlers were (most recently)
//! registered. A handler that errors or panics is reported and skipped; the
//! remaining handlers still run and the publisher never sees the failure.
//!
//! Handles are cheap to clone and share one registry. The bus is meant for a
//! single-threaded interaction loop and is neither `Send` nor `Sync`.

mod channel;
mod payload;

pub use channel::{Channel, SubscriberId, ViewId};
pub use payload::{Payload, PointerPayload, SelectionPayload};

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, trace, warn};

/// Errors raised when registering a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BusError {
    /// The channel name is empty.
    #[error("channel name must not be empty")]
    EmptyChannel,
    /// The subscriber id is empty.
    #[error("subscriber id must not be empty")]
    EmptySubscriber,
}

type Handler<P> = Rc<dyn Fn(&P) -> anyhow::Result<()>>;

/// A handler that failed during one publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    /// Subscriber whose handler failed.
    pub subscriber: SubscriberId,
    /// Error or panic message.
    pub message: String,
    /// Whether the handler panicked rather than returning an error.
    pub panicked: bool,
}

/// Outcome of one publish call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishReport {
    /// Handlers that ran to completion.
    pub delivered: usize,
    /// Handlers that failed.
    pub failures: Vec<HandlerFailure>,
}

impl PublishReport {
    /// Total handlers invoked.
    pub fn invoked(&self) -> usize {
        self.delivered + self.failures.len()
    }

    /// Check whether every handler succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

struct Registry<P> {
    channels: HashMap<Channel, IndexMap<SubscriberId, Handler<P>>>,
}

impl<P> Default for Registry<P> {
    fn default() -> Self {
        Self {
            channels: HashMap::new(),
        }
    }
}

/// Shared publish/subscribe registry.
pub struct CoordinationBus<P = Payload> {
    inner: Rc<RefCell<Registry<P>>>,
}

impl<P> Clone for CoordinationBus<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P> Default for CoordinationBus<P> {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry::default())),
        }
    }
}

impl<P> fmt::Debug for CoordinationBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.inner.borrow();
        let mut map = f.debug_map();
        for (channel, handlers) in &registry.channels {
            map.entry(&channel.to_string(), &handlers.keys().collect::<Vec<_>>());
        }
        map.finish()
    }
}

impl<P: 'static> CoordinationBus<P> {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `subscriber` on `channel`.
    ///
    /// A second registration under the same pair replaces the first and moves
    /// it to the end of the channel's dispatch order.
    pub fn subscribe<F>(
        &self,
        channel: impl Into<Channel>,
        subscriber: impl Into<SubscriberId>,
        handler: F,
    ) -> Result<(), BusError>
    where
        F: Fn(&P) -> anyhow::Result<()> + 'static,
    {
        let channel = channel.into();
        let subscriber = subscriber.into();
        if channel.is_empty() {
            return Err(BusError::EmptyChannel);
        }
        if subscriber.is_empty() {
            return Err(BusError::EmptySubscriber);
        }
        let mut registry = self.inner.borrow_mut();
        let handlers = registry.channels.entry(channel.clone()).or_default();
        let replaced = handlers.shift_remove(&subscriber).is_some();
        handlers.insert(subscriber.clone(), Rc::new(handler));
        debug!(%channel, %subscriber, replaced, "subscribed");
        Ok(())
    }

    /// Remove the handler for `subscriber` on `channel`.
    ///
    /// Returns whether a handler was removed; removing an absent one is a no-op.
    pub fn unsubscribe(&self, channel: &Channel, subscriber: &SubscriberId) -> bool {
        let mut registry = self.inner.borrow_mut();
        let Some(handlers) = registry.channels.get_mut(channel) else {
            return false;
        };
        let removed = handlers.shift_remove(subscriber).is_some();
        if handlers.is_empty() {
            registry.channels.remove(channel);
        }
        if removed {
            debug!(%channel, %subscriber, "unsubscribed");
        }
        removed
    }

    /// Remove every handler registered by `subscriber`. Returns how many were removed.
    pub fn unsubscribe_all(&self, subscriber: &SubscriberId) -> usize {
        let mut registry = self.inner.borrow_mut();
        let mut removed = 0;
        registry.channels.retain(|_, handlers| {
            if handlers.shift_remove(subscriber).is_some() {
                removed += 1;
            }
            !handlers.is_empty()
        });
        if removed > 0 {
            debug!(%subscriber, removed, "unsubscribed from all channels");
        }
        removed
    }

    /// Number of handlers on `channel`.
    pub fn subscriber_count(&self, channel: &Channel) -> usize {
        self.inner
            .borrow()
            .channels
            .get(channel)
            .map_or(0, |handlers| handlers.len())
    }

    /// Check whether `subscriber` has a handler on `channel`.
    pub fn is_subscribed(&self, channel: &Channel, subscriber: &SubscriberId) -> bool {
        self.inner
            .borrow()
            .channels
            .get(channel)
            .is_some_and(|handlers| handlers.contains_key(subscriber))
    }

    /// Subscribers on `channel` in dispatch order.
    pub fn subscribers(&self, channel: &Channel) -> Vec<SubscriberId> {
        self.inner
            .borrow()
            .channels
            .get(channel)
            .map(|handlers| handlers.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Deliver `payload` to every handler currently on `channel`.
    ///
    /// Handlers run against a snapshot taken before the first call, so a
    /// handler may subscribe or unsubscribe (even itself) without disturbing
    /// this dispatch. All handlers see the same payload reference.
    pub fn publish(&self, channel: &Channel, payload: &P) -> PublishReport {
        let snapshot: Vec<(SubscriberId, Handler<P>)> = match self.inner.borrow().channels.get(channel)
        {
            Some(handlers) => handlers
                .iter()
                .map(|(subscriber, handler)| (subscriber.clone(), Rc::clone(handler)))
                .collect(),
            None => Vec::new(),
        };
        trace!(%channel, handlers = snapshot.len(), "publish");

        let mut report = PublishReport::default();
        for (subscriber, handler) in snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(payload))) {
                Ok(Ok(())) => report.delivered += 1,
                Ok(Err(error)) => {
                    let message = format!("{error:#}");
                    warn!(%channel, %subscriber, error = %message, "handler failed");
                    report.failures.push(HandlerFailure {
                        subscriber,
                        message,
                        panicked: false,
                    });
                }
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    warn!(%channel, %subscriber, error = %message, "handler panicked");
                    report.failures.push(HandlerFailure {
                        subscriber,
                        message,
                        panicked: true,
                    });
                }
            }
        }
        report
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use anyhow::bail;

    use super::*;
    use crate::record::CategoryId;
    use crate::selection::SelectionState;

    fn counter() -> Rc<Cell<usize>> {
        Rc::new(Cell::new(0))
    }

    #[test]
    fn resubscribing_replaces_handler() {
        let bus: CoordinationBus<u32> = CoordinationBus::new();
        let first = counter();
        let second = counter();
        let hits = Rc::clone(&first);
        bus.subscribe("ticks", "view-a", move |_| {
            hits.set(hits.get() + 1);
            Ok(())
        })
        .unwrap();
        let hits = Rc::clone(&second);
        bus.subscribe("ticks", "view-a", move |_| {
            hits.set(hits.get() + 1);
            Ok(())
        })
        .unwrap();

        let report = bus.publish(&Channel::from("ticks"), &1);
        assert_eq!(report.invoked(), 1);
        assert_eq!(first.get(), 0);
        assert_eq!(second.get(), 1);
        assert_eq!(bus.subscriber_count(&Channel::from("ticks")), 1);
    }

    #[test]
    fn dispatch_follows_registration_order() {
        let bus: CoordinationBus<()> = CoordinationBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for id in ["a", "b", "c"] {
            let order = Rc::clone(&order);
            bus.subscribe("events", id, move |_| {
                order.borrow_mut().push(id);
                Ok(())
            })
            .unwrap();
        }
        let order_a = Rc::clone(&order);
        bus.subscribe("events", "a", move |_| {
            order_a.borrow_mut().push("a");
            Ok(())
        })
        .unwrap();

        bus.publish(&Channel::from("events"), &());
        assert_eq!(*order.borrow(), ["b", "c", "a"]);
    }

    #[test]
    fn failing_handler_does_not_block_others() {
        let bus: CoordinationBus<()> = CoordinationBus::new();
        let first = counter();
        let third = counter();
        let hits = Rc::clone(&first);
        bus.subscribe("events", "first", move |_| {
            hits.set(hits.get() + 1);
            Ok(())
        })
        .unwrap();
        bus.subscribe("events", "second", |_| bail!("redraw failed"))
            .unwrap();
        let hits = Rc::clone(&third);
        bus.subscribe("events", "third", move |_| {
            hits.set(hits.get() + 1);
            Ok(())
        })
        .unwrap();

        let report = bus.publish(&Channel::from("events"), &());
        assert_eq!(first.get(), 1);
        assert_eq!(third.get(), 1);
        assert_eq!(report.delivered, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].subscriber, SubscriberId::new("second"));
        assert_eq!(report.failures[0].message, "redraw failed");
        assert!(!report.failures[0].panicked);
    }

    #[test]
    fn panicking_handler_is_isolated() {
        let bus: CoordinationBus<()> = CoordinationBus::new();
        let after = counter();
        bus.subscribe("events", "broken", |_| panic!("boom")).unwrap();
        let hits = Rc::clone(&after);
        bus.subscribe("events", "healthy", move |_| {
            hits.set(hits.get() + 1);
            Ok(())
        })
        .unwrap();

        let report = bus.publish(&Channel::from("events"), &());
        assert_eq!(after.get(), 1);
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].panicked);
        assert_eq!(report.failures[0].message, "boom");
    }

    #[test]
    fn unsubscribe_stops_delivery_and_tolerates_absent_ids() {
        let bus: CoordinationBus<()> = CoordinationBus::new();
        let hits = counter();
        let seen = Rc::clone(&hits);
        bus.subscribe(Channel::CategoryState, "view-a", move |_| {
            seen.set(seen.get() + 1);
            Ok(())
        })
        .unwrap();

        assert!(bus.unsubscribe(&Channel::CategoryState, &SubscriberId::new("view-a")));
        let report = bus.publish(&Channel::CategoryState, &());
        assert_eq!(hits.get(), 0);
        assert_eq!(report.invoked(), 0);

        assert!(!bus.unsubscribe(&Channel::CategoryState, &SubscriberId::new("never")));
        assert!(!bus.unsubscribe(&Channel::from("unknown"), &SubscriberId::new("view-a")));
    }

    #[test]
    fn publishing_without_subscribers_is_a_noop() {
        let bus: CoordinationBus<u8> = CoordinationBus::new();
        let report = bus.publish(&Channel::VariableState, &7);
        assert_eq!(report, PublishReport::default());
        assert!(report.is_clean());
    }

    #[test]
    fn rejects_empty_names() {
        let bus: CoordinationBus<()> = CoordinationBus::new();
        assert_eq!(
            bus.subscribe("", "view", |_| Ok(())),
            Err(BusError::EmptyChannel)
        );
        assert_eq!(
            bus.subscribe(Channel::CategoryState, "", |_| Ok(())),
            Err(BusError::EmptySubscriber)
        );
        assert_eq!(
            bus.subscribe(Channel::pointer(""), "view", |_| Ok(())),
            Err(BusError::EmptyChannel)
        );
    }

    #[test]
    fn handlers_may_mutate_registry_mid_dispatch() {
        let bus: CoordinationBus<()> = CoordinationBus::new();
        let late = counter();
        let inner_bus = bus.clone();
        let late_hits = Rc::clone(&late);
        bus.subscribe("events", "rebinder", move |_| {
            inner_bus.unsubscribe(&Channel::from("events"), &SubscriberId::new("rebinder"));
            let hits = Rc::clone(&late_hits);
            inner_bus.subscribe("events", "late", move |_| {
                hits.set(hits.get() + 1);
                Ok(())
            })?;
            Ok(())
        })
        .unwrap();

        let first = bus.publish(&Channel::from("events"), &());
        assert_eq!(first.delivered, 1);
        assert_eq!(late.get(), 0);

        bus.publish(&Channel::from("events"), &());
        assert_eq!(late.get(), 1);
        assert_eq!(
            bus.subscribers(&Channel::from("events")),
            [SubscriberId::new("late")]
        );
    }

    #[test]
    fn unsubscribe_all_clears_every_channel() {
        let bus: CoordinationBus<()> = CoordinationBus::new();
        let view = SubscriberId::new("scatter");
        bus.subscribe(Channel::CategoryState, &view, |_| Ok(())).unwrap();
        bus.subscribe(Channel::VariableState, &view, |_| Ok(())).unwrap();
        bus.subscribe(Channel::VariableState, "other", |_| Ok(())).unwrap();

        assert_eq!(bus.unsubscribe_all(&view), 2);
        assert!(!bus.is_subscribed(&Channel::CategoryState, &view));
        assert_eq!(bus.subscriber_count(&Channel::VariableState), 1);
        assert_eq!(bus.unsubscribe_all(&view), 0);
    }

    #[test]
    fn selection_broadcast_reaches_every_view() {
        let bus = CoordinationBus::<Payload>::new();
        let view_a = Rc::new(RefCell::new(SelectionState::default()));
        let view_b = Rc::new(RefCell::new(SelectionState::default()));
        for (id, state) in [("view-a", &view_a), ("view-b", &view_b)] {
            let state = Rc::clone(state);
            bus.subscribe(Channel::CategoryState, id, move |payload: &Payload| {
                if let Some(selection) = payload.as_selection() {
                    state.borrow_mut().apply(selection);
                }
                Ok(())
            })
            .unwrap();
        }

        let payload = Payload::from(SelectionPayload::hovering("smoking"));
        bus.publish(&Channel::CategoryState, &payload);

        for state in [&view_a, &view_b] {
            let state = state.borrow();
            assert!(state.emphasized(&CategoryId::new("smoking")));
            assert!(!state.emphasized(&CategoryId::new("diet")));
        }
    }
}
