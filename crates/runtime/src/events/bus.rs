//! Topic-based event bus implementation.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use game_core::{HealthSnapshot, PhaseId, PlayerId};

/// Topics for event routing
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize, strum::EnumIter)]
pub enum Topic {
    /// Phase changes broadcast to every sender
    Phase,
    /// Messages addressed to individual players
    Player,
    /// Health and shield changes
    Battle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// The game entered a new phase.
    PhaseChanged { phase: PhaseId },

    /// A game message sent to one player, e.g. the round-start notification.
    PlayerMessage {
        player: PlayerId,
        message: serde_json::Value,
    },

    /// Health or shield values changed during a tick.
    Health(HealthSnapshot),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::PhaseChanged { .. } => Topic::Phase,
            Event::PlayerMessage { .. } => Topic::Player,
            Event::Health(_) => Topic::Battle,
        }
    }
}

struct Channels {
    phase: broadcast::Sender<Event>,
    player: broadcast::Sender<Event>,
    battle: broadcast::Sender<Event>,
}

impl Channels {
    fn sender(&self, topic: Topic) -> &broadcast::Sender<Event> {
        match topic {
            Topic::Phase => &self.phase,
            Topic::Player => &self.player,
            Topic::Battle => &self.battle,
        }
    }
}

/// Topic-based event bus
///
/// Allows consumers to subscribe to specific topics and only receive
/// events they care about. Publishing never blocks; slow subscribers lag.
#[derive(Clone)]
pub struct EventBus {
    channels: Arc<Channels>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    /// Creates a new event bus with specified capacity per topic
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            channels: Arc::new(Channels {
                phase: broadcast::channel(capacity).0,
                player: broadcast::channel(capacity).0,
                battle: broadcast::channel(capacity).0,
            }),
        }
    }

    /// Publish an event to its corresponding topic
    pub fn publish(&self, event: Event) {
        let topic = event.topic();
        if self.channels.sender(topic).send(event).is_err() {
            // No subscribers for this topic - this is normal, not an error
            tracing::trace!(?topic, "no subscribers");
        }
    }

    /// Subscribe to a specific topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.channels.sender(topic).subscribe()
    }

    /// Subscribe to multiple topics
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> Vec<(Topic, broadcast::Receiver<Event>)> {
        topics
            .iter()
            .map(|&topic| (topic, self.subscribe(topic)))
            .collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use strum::IntoEnumIterator;
        let mut debug = f.debug_struct("EventBus");
        for topic in Topic::iter() {
            debug.field(
                topic_name(topic),
                &self.channels.sender(topic).receiver_count(),
            );
        }
        debug.finish()
    }
}

fn topic_name(topic: Topic) -> &'static str {
    match topic {
        Topic::Phase => "phase_subscribers",
        Topic::Player => "player_subscribers",
        Topic::Battle => "battle_subscribers",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_only_reach_their_topic() {
        let bus = EventBus::with_capacity(8);
        let mut phase_rx = bus.subscribe(Topic::Phase);
        let mut battle_rx = bus.subscribe(Topic::Battle);

        bus.publish(Event::PhaseChanged {
            phase: PhaseId::Instructions,
        });

        assert_eq!(
            phase_rx.recv().await.unwrap(),
            Event::PhaseChanged {
                phase: PhaseId::Instructions
            }
        );
        assert!(matches!(
            battle_rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let bus = EventBus::new();
        bus.publish(Event::Health(HealthSnapshot::default()));
    }
}
