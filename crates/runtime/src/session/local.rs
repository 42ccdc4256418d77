//! In-process session layer.
//!
//! [`LocalSession`] keeps the roster in memory and turns [`PlayerRequest`]s
//! from any number of [`SessionHandle`]s into inbound [`SessionEvent`]s.
//! Requests that do not fit the requester's current state become
//! error-status events, the same way a remote session layer reports
//! rejected requests. Outbound traffic is published on the [`EventBus`].
use std::collections::VecDeque;

use serde_json::Value;
use tokio::sync::mpsc;

use game_core::{PhaseId, PlayerId, PlayerPlayingData, PlayerReadyData, SpellMessage};

use super::types::{
    EventKind, GameplayState, LobbyState, PlayerInfo, PlayerState, SessionEvent,
};
use super::SessionService;
use crate::events::{Event, EventBus};

/// A request made by a player's sender application.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerRequest {
    /// Connect, or reconnect after quitting.
    Join(PlayerId),
    Ready {
        player: PlayerId,
        data: PlayerReadyData,
    },
    /// Start the game from the lobby.
    Start {
        player: PlayerId,
        data: PlayerPlayingData,
    },
    /// Come back from idle.
    Resume(PlayerId),
    Idle(PlayerId),
    Quit(PlayerId),
    /// Connection lost.
    Drop(PlayerId),
    CastSpells {
        player: PlayerId,
        message: SpellMessage,
    },
}

impl PlayerRequest {
    pub fn player(&self) -> &PlayerId {
        match self {
            Self::Join(player)
            | Self::Resume(player)
            | Self::Idle(player)
            | Self::Quit(player)
            | Self::Drop(player)
            | Self::Ready { player, .. }
            | Self::Start { player, .. }
            | Self::CastSpells { player, .. } => player,
        }
    }

    fn kind(&self) -> EventKind {
        match self {
            Self::Join(_) => EventKind::PlayerAvailable,
            Self::Ready { .. } => EventKind::PlayerReady,
            Self::Start { .. } | Self::Resume(_) => EventKind::PlayerPlaying,
            Self::Idle(_) => EventKind::PlayerIdle,
            Self::Quit(_) => EventKind::PlayerQuit,
            Self::Drop(_) => EventKind::PlayerDropped,
            Self::CastSpells { .. } => EventKind::GameMessageReceived,
        }
    }
}

/// The session the handle points at is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("session closed")]
pub struct SessionClosed;

/// Cloneable sender for [`PlayerRequest`]s.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    requests: mpsc::UnboundedSender<PlayerRequest>,
}

impl SessionHandle {
    pub fn send(&self, request: PlayerRequest) -> Result<(), SessionClosed> {
        self.requests.send(request).map_err(|_| SessionClosed)
    }

    pub fn join(&self, player: &PlayerId) -> Result<(), SessionClosed> {
        self.send(PlayerRequest::Join(player.clone()))
    }

    pub fn ready(
        &self,
        player: &PlayerId,
        name: impl Into<String>,
        avatar_index: u32,
    ) -> Result<(), SessionClosed> {
        self.send(PlayerRequest::Ready {
            player: player.clone(),
            data: PlayerReadyData {
                player_name: name.into(),
                avatar_index,
            },
        })
    }

    pub fn start(&self, player: &PlayerId, data: PlayerPlayingData) -> Result<(), SessionClosed> {
        self.send(PlayerRequest::Start {
            player: player.clone(),
            data,
        })
    }

    pub fn cast_spells(
        &self,
        player: &PlayerId,
        message: SpellMessage,
    ) -> Result<(), SessionClosed> {
        self.send(PlayerRequest::CastSpells {
            player: player.clone(),
            message,
        })
    }
}

pub struct LocalSession {
    players: Vec<PlayerInfo>,
    gameplay: GameplayState,
    lobby: LobbyState,
    inbound: VecDeque<SessionEvent>,
    requests: mpsc::UnboundedReceiver<PlayerRequest>,
    sender: mpsc::UnboundedSender<PlayerRequest>,
    bus: EventBus,
}

impl LocalSession {
    pub fn new(bus: EventBus) -> Self {
        let (sender, requests) = mpsc::unbounded_channel();
        Self {
            players: Vec::new(),
            gameplay: GameplayState::default(),
            lobby: LobbyState::default(),
            inbound: VecDeque::new(),
            requests,
            sender,
            bus,
        }
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            requests: self.sender.clone(),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Applies `request` immediately, queueing the resulting event.
    pub fn request(&mut self, request: PlayerRequest) {
        let event = self.apply(request);
        if !event.is_success() {
            tracing::debug!(
                player = %event.player,
                kind = %event.kind,
                reason = event.error_description.as_deref().unwrap_or_default(),
                "request rejected"
            );
        }
        self.inbound.push_back(event);
    }

    fn apply(&mut self, request: PlayerRequest) -> SessionEvent {
        let kind = request.kind();
        let player = request.player().clone();
        let lobby_open = self.lobby == LobbyState::Open;

        let Some(index) = self.players.iter().position(|info| info.id == player) else {
            if let PlayerRequest::Join(_) = request {
                self.players.push(PlayerInfo::new(player.clone()));
                return SessionEvent::success(kind, player, None);
            }
            return SessionEvent::failure(kind, player, "unknown player");
        };
        let info = &mut self.players[index];
        let state = info.state;

        match request {
            PlayerRequest::Join(_) => {
                if state != PlayerState::Quit {
                    return SessionEvent::failure(kind, player, "player already connected");
                }
                info.state = PlayerState::Available;
                info.data = Value::Null;
                SessionEvent::success(kind, player, None)
            }
            PlayerRequest::Ready { data, .. } => {
                if !lobby_open {
                    return SessionEvent::failure(kind, player, "lobby is closed");
                }
                if !matches!(state, PlayerState::Available | PlayerState::Ready) {
                    return SessionEvent::failure(kind, player, format!("player is {state}"));
                }
                let payload = to_payload(&data);
                info.state = PlayerState::Ready;
                info.data = payload.clone();
                SessionEvent::success(kind, player, Some(payload))
            }
            PlayerRequest::Start { data, .. } => {
                if state != PlayerState::Ready {
                    return SessionEvent::failure(kind, player, format!("player is {state}"));
                }
                info.state = PlayerState::Playing;
                SessionEvent::success(kind, player, Some(to_payload(&data)))
            }
            PlayerRequest::Resume(_) => {
                if state != PlayerState::Idle {
                    return SessionEvent::failure(kind, player, format!("player is {state}"));
                }
                info.state = PlayerState::Playing;
                SessionEvent::success(kind, player, None)
            }
            PlayerRequest::Idle(_) => {
                if state != PlayerState::Playing {
                    return SessionEvent::failure(kind, player, format!("player is {state}"));
                }
                info.state = PlayerState::Idle;
                SessionEvent::success(kind, player, None)
            }
            PlayerRequest::Quit(_) | PlayerRequest::Drop(_) => {
                if state == PlayerState::Quit {
                    return SessionEvent::failure(kind, player, "player already left");
                }
                info.state = PlayerState::Quit;
                SessionEvent::success(kind, player, None)
            }
            PlayerRequest::CastSpells { message, .. } => {
                if state != PlayerState::Playing {
                    return SessionEvent::failure(kind, player, format!("player is {state}"));
                }
                SessionEvent::success(kind, player, Some(to_payload(&message)))
            }
        }
    }

    fn find_mut(&mut self, player: &PlayerId) -> Option<&mut PlayerInfo> {
        self.players.iter_mut().find(|info| &info.id == player)
    }
}

impl SessionService for LocalSession {
    fn players(&self) -> &[PlayerInfo] {
        &self.players
    }

    fn update_player_state(&mut self, player: &PlayerId, state: PlayerState) -> bool {
        match self.find_mut(player) {
            Some(info) => {
                info.state = state;
                true
            }
            None => false,
        }
    }

    fn update_player_data(&mut self, player: &PlayerId, data: Value) -> bool {
        match self.find_mut(player) {
            Some(info) => {
                info.data = data;
                true
            }
            None => false,
        }
    }

    fn gameplay_state(&self) -> GameplayState {
        self.gameplay
    }

    fn update_gameplay_state(&mut self, state: GameplayState) {
        self.gameplay = state;
    }

    fn lobby_state(&self) -> LobbyState {
        self.lobby
    }

    fn update_lobby_state(&mut self, state: LobbyState) {
        self.lobby = state;
    }

    fn send_message_to_player(&mut self, player: &PlayerId, message: Value) {
        tracing::debug!(%player, %message, "message to player");
        self.bus.publish(Event::PlayerMessage {
            player: player.clone(),
            message,
        });
    }

    fn broadcast_phase(&mut self, phase: PhaseId) {
        self.bus.publish(Event::PhaseChanged { phase });
    }

    fn drain_events(&mut self, out: &mut Vec<SessionEvent>) {
        while let Ok(request) = self.requests.try_recv() {
            self.request(request);
        }
        out.extend(self.inbound.drain(..));
    }
}

impl std::fmt::Debug for LocalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSession")
            .field("players", &self.players.len())
            .field("gameplay", &self.gameplay)
            .field("lobby", &self.lobby)
            .field("inbound", &self.inbound.len())
            .finish()
    }
}

fn to_payload<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
