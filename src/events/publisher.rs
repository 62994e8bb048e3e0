use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// a listener for events of type `E`
type Listener<E> = dyn Fn(E) + Send + Sync + 'static;

/// every listener registered for one event type, in subscription order
type Listeners<E> = Vec<Box<Listener<E>>>;

/// listeners keyed by the `TypeId` of their event; each value is a boxed
/// `Listeners<E>` for that same `E`
#[derive(Debug, Default)]
struct Registry {
    by_event: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Registry {
    fn listeners<E>(&self) -> Option<&Listeners<E>>
    where
        E: 'static,
    {
        self.by_event
            .get(&TypeId::of::<E>())
            .and_then(|boxed| boxed.downcast_ref::<Listeners<E>>())
    }

    fn listeners_mut<E>(&mut self) -> Option<&mut Listeners<E>>
    where
        E: 'static,
    {
        self.by_event
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::<Listeners<E>>::default())
            .downcast_mut::<Listeners<E>>()
    }
}

/// subscribe to and publish events, keyed by the event's type
///
/// implemented for the shared `Arc<RwLock<Publisher>>` handed out by
/// [`SharedState::events`](crate::state::SharedState::events)
pub trait EventPublisher {
    /// call `listener` with every future event of type `E`
    fn subscribe<E>(&mut self, listener: impl Fn(E) + Send + Sync + 'static)
    where
        E: 'static;

    /// hand a copy of `event` to each listener of its type, in subscription order
    fn notify<E>(&self, event: E)
    where
        E: Clone + 'static;
}

/// type-keyed registry of event listeners
#[derive(Debug, Default)]
pub struct Publisher {
    registry: Registry,
}

impl Publisher {
    /// create a new [`Publisher`] without any listeners
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventPublisher for Publisher {
    fn subscribe<E>(&mut self, listener: impl Fn(E) + Send + Sync + 'static)
    where
        E: 'static,
    {
        if let Some(listeners) = self.registry.listeners_mut::<E>() {
            listeners.push(Box::new(listener));
        }
    }

    fn notify<E>(&self, event: E)
    where
        E: Clone + 'static,
    {
        for listener in self.registry.listeners::<E>().into_iter().flatten() {
            listener(event.clone());
        }
    }
}

impl EventPublisher for Arc<RwLock<Publisher>> {
    fn subscribe<E>(&mut self, listener: impl Fn(E) + Send + Sync + 'static)
    where
        E: 'static,
    {
        if let Ok(mut publisher) = self.write() {
            publisher.subscribe(listener);
        }
    }

    fn notify<E>(&self, event: E)
    where
        E: Clone + 'static,
    {
        if let Ok(publisher) = self.read() {
            publisher.notify(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Exhausted, SearchStarted};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn events_only_reach_listeners_of_their_type() {
        let exhausted = Arc::new(AtomicUsize::new(0));
        let mut publisher = Publisher::new();

        let seen = exhausted.clone();
        publisher.subscribe(move |event: Exhausted| {
            seen.store(event.tested, Ordering::SeqCst);
        });

        publisher.notify(SearchStarted {
            total: 9000,
            workers: 50,
        });
        assert_eq!(exhausted.load(Ordering::SeqCst), 0);

        publisher.notify(Exhausted { tested: 10 });
        assert_eq!(exhausted.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn every_listener_is_called_through_the_shared_publisher() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut publisher = Arc::new(RwLock::new(Publisher::new()));

        for _ in 0..3 {
            let calls = calls.clone();
            publisher.subscribe(move |event: SearchStarted| {
                calls.fetch_add(event.workers, Ordering::SeqCst);
            });
        }

        publisher.notify(SearchStarted {
            total: 9000,
            workers: 2,
        });

        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }
}
