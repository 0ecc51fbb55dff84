//! Lifecycle topic abstractions.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The lifecycle events a tour engine ever emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Topic {
    /// The tour started and its first step is displayable.
    Init,
    /// The tour moved to another step.
    NextStep,
    /// The tour ran past its last step.
    Finish,
}

impl Topic {
    /// All topics, in lifecycle order.
    pub const ALL: [Topic; 3] = [Topic::Init, Topic::NextStep, Topic::Finish];

    /// Returns the wire name of the topic.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::Init => "init",
            Topic::NextStep => "nextStep",
            Topic::Finish => "finish",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata attached to every published tour event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Unique event identifier.
    pub event_id: Uuid,
    /// The tour invocation this event belongs to.
    pub tour_id: Uuid,
    /// Monotonically increasing number within the tour, starting at 1.
    pub sequence_number: i64,
    /// Timestamp of publication.
    pub occurred_at: DateTime<Utc>,
}

impl EventMetadata {
    /// Stamps a new event of `tour_id` with a fresh id and `clock`'s time.
    #[must_use]
    pub fn stamp(tour_id: Uuid, sequence_number: i64, clock: &dyn Clock) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            tour_id,
            sequence_number,
            occurred_at: clock.now(),
        }
    }
}

/// Source of event timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Trait that all published tour events implement.
pub trait TopicEvent: Send + Sync + fmt::Debug {
    /// Returns the topic this event is published on.
    fn topic(&self) -> Topic;

    /// Serializes the event payload to JSON.
    fn to_payload(&self) -> serde_json::Value;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_wire_names_match_serde() {
        for topic in Topic::ALL {
            let json = serde_json::to_value(topic).unwrap();
            assert_eq!(json, serde_json::Value::String(topic.as_str().to_owned()));
        }
    }

    #[test]
    fn test_stamp_uses_clock_and_fresh_ids() {
        // Arrange
        struct Epoch;
        impl Clock for Epoch {
            fn now(&self) -> DateTime<Utc> {
                DateTime::<Utc>::UNIX_EPOCH
            }
        }
        let tour_id = Uuid::new_v4();

        // Act
        let first = EventMetadata::stamp(tour_id, 1, &Epoch);
        let second = EventMetadata::stamp(tour_id, 2, &Epoch);

        // Assert
        assert_eq!(first.occurred_at, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(first.tour_id, tour_id);
        assert_eq!(second.sequence_number, 2);
        assert_ne!(first.event_id, second.event_id);
    }
}
