//! Session and roster collaborator contract.
//!
//! The game never talks to the transport directly. It reads the roster,
//! updates player and screen state, sends messages and drains inbound
//! [`SessionEvent`]s through [`SessionService`].
//!
//! # Module Structure
//!
//! - `types`: Player, gameplay and lobby states, event kinds and masks
//! - `local`: In-memory implementation driven by [`PlayerRequest`]s
mod local;
mod types;

pub use local::{LocalSession, PlayerRequest, SessionClosed, SessionHandle};
pub use types::{
    EventKind, EventMask, GameplayState, LobbyState, PlayerInfo, PlayerState, SessionEvent,
    StatusCode, set_host_flag,
};

use game_core::{PhaseId, PlayerId};

/// Roster, screen state and messaging, as seen by the game.
///
/// State changes made through this trait are receiver-initiated and never
/// produce inbound events.
pub trait SessionService {
    /// Every known player, in join order.
    fn players(&self) -> &[PlayerInfo];

    fn update_player_state(&mut self, player: &PlayerId, state: PlayerState) -> bool;

    fn update_player_data(&mut self, player: &PlayerId, data: serde_json::Value) -> bool;

    fn gameplay_state(&self) -> GameplayState;

    fn update_gameplay_state(&mut self, state: GameplayState);

    fn lobby_state(&self) -> LobbyState;

    fn update_lobby_state(&mut self, state: LobbyState);

    fn send_message_to_player(&mut self, player: &PlayerId, message: serde_json::Value);

    /// Tells every sender which phase the game is in.
    fn broadcast_phase(&mut self, phase: PhaseId);

    /// Moves all pending inbound events into `out`, oldest first.
    fn drain_events(&mut self, out: &mut Vec<SessionEvent>);

    // ========================================================================
    // Roster queries
    // ========================================================================

    fn player(&self, player: &PlayerId) -> Option<&PlayerInfo> {
        self.players().iter().find(|info| &info.id == player)
    }

    fn is_connected(&self, player: &PlayerId) -> bool {
        self.player(player)
            .is_some_and(|info| info.state.is_connected())
    }

    fn connected_players(&self) -> Vec<PlayerId> {
        self.players()
            .iter()
            .filter(|info| info.state.is_connected())
            .map(|info| info.id.clone())
            .collect()
    }

    fn connected_count(&self) -> usize {
        self.players()
            .iter()
            .filter(|info| info.state.is_connected())
            .count()
    }

    fn players_in_state(&self, state: PlayerState) -> Vec<PlayerId> {
        self.players()
            .iter()
            .filter(|info| info.state == state)
            .map(|info| info.id.clone())
            .collect()
    }

    /// Moves every player in `from` to `to`.
    fn transition_players(&mut self, from: PlayerState, to: PlayerState) -> usize {
        let players = self.players_in_state(from);
        for player in &players {
            self.update_player_state(player, to);
        }
        players.len()
    }
}
