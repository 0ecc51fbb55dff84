//! Topic-based publish/subscribe hub.
//!
//! The tour engine is the only publisher; renderers, analytics and host
//! applications subscribe. Dispatch is synchronous and in-process: `publish`
//! calls every handler registered for the topic, in registration order,
//! before it returns.
//!
//! # Re-entrancy
//!
//! `publish` snapshots the handler list before invoking anything, so a
//! handler may subscribe, unsubscribe or publish on the same center. Changes
//! made during a dispatch apply to the next `publish`. A handler that
//! publishes the topic it is subscribed to recurses immediately; avoiding an
//! unbounded loop is the caller's responsibility.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::event::Topic;

/// A subscriber callback. Handlers are compared by identity, so keep the
/// `Arc` returned by [`handler`] around to unsubscribe later.
pub type TopicHandler<P> = Arc<dyn Fn(Topic, &P) + Send + Sync>;

/// Wraps a closure into a [`TopicHandler`].
pub fn handler<P, F>(f: F) -> TopicHandler<P>
where
    F: Fn(Topic, &P) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// In-process observer registry keyed by [`Topic`].
pub struct PubCenter<P> {
    handlers: Mutex<HashMap<Topic, Vec<TopicHandler<P>>>>,
}

impl<P> PubCenter<P> {
    /// Creates an empty center.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(HashMap::new()),
        }
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<Topic, Vec<TopicHandler<P>>>> {
        // Handlers never run while the lock is held, so a poisoned lock still
        // holds a consistent map.
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `handler` for `topic`. The same handler may be registered
    /// more than once and is then invoked once per registration.
    pub fn subscribe(&self, topic: Topic, handler: TopicHandler<P>) -> &Self {
        self.registry().entry(topic).or_default().push(handler);
        self
    }

    /// Invokes every handler registered for `topic` with `(topic, data)`.
    pub fn publish(&self, topic: Topic, data: &P) -> &Self {
        let snapshot: Vec<TopicHandler<P>> = self
            .registry()
            .get(&topic)
            .map(|list| list.to_vec())
            .unwrap_or_default();

        for handler in snapshot {
            handler(topic, data);
        }
        self
    }

    /// Removes every registration of `handler` for `topic`. Unknown handlers
    /// are ignored.
    pub fn unsubscribe(&self, topic: Topic, handler: &TopicHandler<P>) -> &Self {
        let mut registry = self.registry();
        if let Some(list) = registry.get_mut(&topic) {
            list.retain(|registered| !Arc::ptr_eq(registered, handler));
            if list.is_empty() {
                registry.remove(&topic);
            }
        }
        self
    }

    /// Returns how many registrations `topic` currently has.
    #[must_use]
    pub fn handler_count(&self, topic: Topic) -> usize {
        self.registry().get(&topic).map_or(0, Vec::len)
    }
}

impl<P> Default for PubCenter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> fmt::Debug for PubCenter<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.registry();
        let mut map = f.debug_map();
        for topic in Topic::ALL {
            if let Some(list) = registry.get(&topic) {
                map.entry(&topic, &list.len());
            }
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording(log: &Arc<Mutex<Vec<String>>>, label: &'static str) -> TopicHandler<u32> {
        let log = Arc::clone(log);
        handler(move |topic: Topic, data: &u32| {
            log.lock().unwrap().push(format!("{label}:{topic}:{data}"));
        })
    }

    #[test]
    fn test_publish_invokes_handlers_in_registration_order() {
        // Arrange
        let log = Arc::new(Mutex::new(Vec::new()));
        let center = PubCenter::new();
        center
            .subscribe(Topic::NextStep, recording(&log, "a"))
            .subscribe(Topic::NextStep, recording(&log, "b"))
            .subscribe(Topic::Finish, recording(&log, "c"));

        // Act
        center.publish(Topic::NextStep, &7);

        // Assert
        assert_eq!(*log.lock().unwrap(), vec!["a:nextStep:7", "b:nextStep:7"]);
    }

    #[test]
    fn test_publish_without_subscribers_is_a_no_op() {
        let center: PubCenter<u32> = PubCenter::new();
        center.publish(Topic::Init, &1);
        assert_eq!(center.handler_count(Topic::Init), 0);
    }

    #[test]
    fn test_unsubscribe_stops_further_delivery() {
        // Arrange
        let log = Arc::new(Mutex::new(Vec::new()));
        let center = PubCenter::new();
        let a = recording(&log, "a");
        center
            .subscribe(Topic::Init, Arc::clone(&a))
            .subscribe(Topic::Init, recording(&log, "b"));

        // Act
        center.publish(Topic::Init, &1);
        center.unsubscribe(Topic::Init, &a);
        center.publish(Topic::Init, &2);

        // Assert
        assert_eq!(*log.lock().unwrap(), vec!["a:init:1", "b:init:1", "b:init:2"]);
        assert_eq!(center.handler_count(Topic::Init), 1);
    }

    #[test]
    fn test_unsubscribe_removes_duplicate_registrations() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let center = PubCenter::new();
        let a = recording(&log, "a");
        center
            .subscribe(Topic::Finish, Arc::clone(&a))
            .subscribe(Topic::Finish, Arc::clone(&a));

        center.unsubscribe(Topic::Finish, &a).publish(Topic::Finish, &3);

        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unsubscribe_unknown_handler_is_a_no_op() {
        // Arrange
        let log = Arc::new(Mutex::new(Vec::new()));
        let center = PubCenter::new();
        center.subscribe(Topic::Init, recording(&log, "a"));
        let stranger = recording(&log, "stranger");

        // Act
        center
            .unsubscribe(Topic::Init, &stranger)
            .unsubscribe(Topic::Finish, &stranger);
        center.publish(Topic::Init, &5);

        // Assert
        assert_eq!(*log.lock().unwrap(), vec!["a:init:5"]);
    }

    #[test]
    fn test_unsubscribe_is_scoped_to_topic() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let center = PubCenter::new();
        let a = recording(&log, "a");
        center
            .subscribe(Topic::Init, Arc::clone(&a))
            .subscribe(Topic::Finish, Arc::clone(&a));

        center.unsubscribe(Topic::Init, &a);
        center.publish(Topic::Init, &1).publish(Topic::Finish, &2);

        assert_eq!(*log.lock().unwrap(), vec!["a:finish:2"]);
    }

    #[test]
    fn test_handler_may_subscribe_during_dispatch() {
        // Arrange
        let log = Arc::new(Mutex::new(Vec::new()));
        let center = Arc::new(PubCenter::new());
        let late = recording(&log, "late");
        let weak = Arc::downgrade(&center);
        center.subscribe(
            Topic::NextStep,
            handler(move |_topic: Topic, _data: &u32| {
                if let Some(center) = weak.upgrade() {
                    center.subscribe(Topic::NextStep, Arc::clone(&late));
                }
            }),
        );

        // Act
        center.publish(Topic::NextStep, &1);

        // Assert
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(center.handler_count(Topic::NextStep), 2);

        center.publish(Topic::NextStep, &2);
        assert_eq!(*log.lock().unwrap(), vec!["late:nextStep:2"]);
    }

    #[test]
    fn test_handler_may_publish_another_topic_during_dispatch() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let center = Arc::new(PubCenter::new());
        center.subscribe(Topic::Finish, recording(&log, "finish"));
        let weak = Arc::downgrade(&center);
        center.subscribe(
            Topic::NextStep,
            handler(move |_topic: Topic, data: &u32| {
                if let Some(center) = weak.upgrade() {
                    center.publish(Topic::Finish, &(data + 1));
                }
            }),
        );

        center.publish(Topic::NextStep, &1);

        assert_eq!(*log.lock().unwrap(), vec!["finish:finish:2"]);
    }
}
