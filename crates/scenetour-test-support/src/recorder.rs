//! Test subscriber — records everything published on a `PubCenter`.

use std::sync::{Arc, Mutex};

use scenetour_core::event::Topic;
use scenetour_core::pub_center::{PubCenter, handler};

/// Subscribes to every topic and keeps `(topic, payload)` pairs in publish
/// order.
pub struct EventRecorder<P> {
    events: Arc<Mutex<Vec<(Topic, P)>>>,
}

impl<P> EventRecorder<P>
where
    P: Clone + Send + 'static,
{
    /// Create a recorder subscribed to every topic of `center`.
    #[must_use]
    pub fn attach(center: &PubCenter<P>) -> Self {
        let events: Arc<Mutex<Vec<(Topic, P)>>> = Arc::default();
        let sink = Arc::clone(&events);
        let handler = handler(move |topic, data: &P| {
            sink.lock().unwrap().push((topic, data.clone()));
        });
        for topic in Topic::ALL {
            center.subscribe(topic, Arc::clone(&handler));
        }
        Self { events }
    }

    /// Returns a snapshot of the recorded events.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn events(&self) -> Vec<(Topic, P)> {
        self.events.lock().unwrap().clone()
    }

    /// Returns the topics of the recorded events.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn topics(&self) -> Vec<Topic> {
        self.events.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }
}

impl<P> std::fmt::Debug for EventRecorder<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventRecorder").finish_non_exhaustive()
    }
}
