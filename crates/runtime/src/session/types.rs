//! Roster and event types exchanged with the session layer.

use bitflags::bitflags;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use game_core::PlayerId;

/// Where a player is in the session lifecycle.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PlayerState {
    /// Connected, not yet in the lobby.
    Available,
    /// Waiting in the lobby.
    Ready,
    Playing,
    /// Playing but inactive; pauses the game.
    Idle,
    /// Left or dropped.
    Quit,
}

impl PlayerState {
    /// True for players taking part in the current or next game.
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Ready | Self::Playing | Self::Idle)
    }
}

/// What the game screen is currently doing.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GameplayState {
    #[default]
    Unknown,
    Paused,
    Running,
    ShowingInfoScreen,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LobbyState {
    #[default]
    Unknown,
    Closed,
    Open,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusCode {
    #[default]
    Success,
    Error,
}

/// Kind of an inbound session event.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    PlayerAvailable,
    PlayerReady,
    PlayerPlaying,
    PlayerIdle,
    PlayerQuit,
    PlayerDropped,
    GameMessageReceived,
}

impl EventKind {
    pub const fn mask(self) -> EventMask {
        match self {
            Self::PlayerAvailable => EventMask::PLAYER_AVAILABLE,
            Self::PlayerReady => EventMask::PLAYER_READY,
            Self::PlayerPlaying => EventMask::PLAYER_PLAYING,
            Self::PlayerIdle => EventMask::PLAYER_IDLE,
            Self::PlayerQuit => EventMask::PLAYER_QUIT,
            Self::PlayerDropped => EventMask::PLAYER_DROPPED,
            Self::GameMessageReceived => EventMask::GAME_MESSAGE,
        }
    }

    /// True for events that take a player out of the game.
    pub const fn is_departure(self) -> bool {
        matches!(self, Self::PlayerQuit | Self::PlayerDropped)
    }
}

bitflags! {
    /// Set of event kinds a phase consumes.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct EventMask: u32 {
        const PLAYER_AVAILABLE = 0b0000_0001;
        const PLAYER_READY     = 0b0000_0010;
        const PLAYER_PLAYING   = 0b0000_0100;
        const PLAYER_IDLE      = 0b0000_1000;
        const PLAYER_QUIT      = 0b0001_0000;
        const PLAYER_DROPPED   = 0b0010_0000;
        const GAME_MESSAGE     = 0b0100_0000;

        /// Quit and dropped are handled the same way everywhere.
        const DEPARTURES = Self::PLAYER_QUIT.bits() | Self::PLAYER_DROPPED.bits();
    }
}

/// A player as seen by the session layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: PlayerId,
    pub state: PlayerState,
    /// Free-form data attached to the player, e.g. name and host flag.
    #[serde(default)]
    pub data: serde_json::Value,
}

impl PlayerInfo {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            state: PlayerState::Available,
            data: serde_json::Value::Null,
        }
    }

    pub fn is_host(&self) -> bool {
        self.data
            .get("host")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false)
    }
}

/// An inbound notification from the session layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEvent {
    pub kind: EventKind,
    pub status: StatusCode,
    #[serde(default)]
    pub error_description: Option<String>,
    pub player: PlayerId,
    /// Extra data sent with the request that caused the event.
    #[serde(default)]
    pub payload: Option<serde_json::Value>,
}

impl SessionEvent {
    pub fn success(kind: EventKind, player: PlayerId, payload: Option<serde_json::Value>) -> Self {
        Self {
            kind,
            status: StatusCode::Success,
            error_description: None,
            player,
            payload,
        }
    }

    pub fn failure(kind: EventKind, player: PlayerId, description: impl Into<String>) -> Self {
        Self {
            kind,
            status: StatusCode::Error,
            error_description: Some(description.into()),
            player,
            payload: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StatusCode::Success
    }

    /// Decodes the payload, `None` when the event carries none.
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.payload
            .as_ref()
            .map(|payload| T::deserialize(payload))
    }
}

/// Sets the `host` flag in a player's data object, converting non-objects.
pub fn set_host_flag(data: &mut serde_json::Value, host: bool) {
    if !data.is_object() {
        *data = serde_json::Value::Object(serde_json::Map::new());
    }
    if let Some(object) = data.as_object_mut() {
        object.insert("host".to_owned(), serde_json::Value::Bool(host));
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use game_core::PlayerReadyData;

    #[test]
    fn payload_decodes_into_wire_types() {
        let event = SessionEvent::success(
            EventKind::PlayerReady,
            PlayerId::from("p1"),
            Some(json!({"playerName": "Ada", "avatarIndex": 2})),
        );

        let data: PlayerReadyData = event.parse_payload().unwrap().unwrap();
        assert_eq!(data.player_name, "Ada");
        assert_eq!(data.avatar_index, 2);

        let malformed = SessionEvent::success(
            EventKind::PlayerReady,
            PlayerId::from("p1"),
            Some(json!({"avatarIndex": "two"})),
        );
        assert!(malformed.parse_payload::<PlayerReadyData>().unwrap().is_err());
    }

    #[test]
    fn host_flag_is_set_on_any_data() {
        let mut info = PlayerInfo::new(PlayerId::from("p1"));
        assert!(!info.is_host());

        set_host_flag(&mut info.data, true);
        assert!(info.is_host());

        info.data = json!({"playerName": "Ada"});
        set_host_flag(&mut info.data, false);
        assert_eq!(info.data, json!({"playerName": "Ada", "host": false}));
    }

    #[test]
    fn departures_share_a_mask() {
        assert!(EventMask::DEPARTURES.contains(EventKind::PlayerQuit.mask()));
        assert!(EventMask::DEPARTURES.contains(EventKind::PlayerDropped.mask()));
        assert!(!EventMask::DEPARTURES.contains(EventKind::PlayerIdle.mask()));
    }
}
