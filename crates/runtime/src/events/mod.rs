//! Topic-based event bus for runtime events.
//!
//! Outbound traffic from a game (phase broadcasts, messages to players and
//! health snapshots) is published here; clients subscribe only to the topics
//! they need.

mod bus;

pub use bus::{Event, EventBus, Topic};
