//! Lobby: collects ready players and waits for the host to start.
use game_core::{
    Cue, DisplayId, PhaseId, Placement, PlayerId, PlayerPlayingData, PlayerReadyData,
};
use serde_json::Value;

use super::{PhaseContext, PhaseHandler, Transition};
use crate::session::{
    EventKind, EventMask, GameplayState, LobbyState, PlayerState, SessionEvent, set_host_flag,
};

/// Name shown for players who did not send one.
const UNNAMED_PLAYER: &str = "???";

#[derive(Debug, Default)]
pub struct WaitingForPlayersPhase {
    host: Option<PlayerId>,
}

impl WaitingForPlayersPhase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host of the lobby, the first ready player unless they left.
    pub fn host(&self) -> Option<&PlayerId> {
        self.host.as_ref()
    }

    fn add_player(&mut self, ctx: &mut PhaseContext<'_>, player: &PlayerId, data: Value) {
        let ready: PlayerReadyData = match serde_json::from_value(data.clone()) {
            Ok(ready) => ready,
            Err(error) => {
                tracing::warn!(%player, %error, "malformed ready data, using defaults");
                PlayerReadyData::default()
            }
        };
        let name = if ready.player_name.is_empty() {
            UNNAMED_PLAYER.to_owned()
        } else {
            ready.player_name
        };

        if let Err(error) = ctx.battle.add_player(player.clone(), name, ready.avatar_index) {
            tracing::warn!(%player, %error, "player not admitted");
            ctx.session.update_player_state(player, PlayerState::Available);
            return;
        }
        ctx.cue(Cue::ShowPlayer {
            player: player.clone(),
            placement: Placement::Lobby,
        });

        if self.host.is_none() {
            self.update_host(ctx, player, Some(data));
            return;
        }
        let is_host = self.host.as_ref() == Some(player);
        let mut data = data;
        set_host_flag(&mut data, is_host);
        ctx.session.update_player_data(player, data);
    }

    fn update_host(&mut self, ctx: &mut PhaseContext<'_>, new_host: &PlayerId, data: Option<Value>) {
        if self.host.as_ref() == Some(new_host) {
            return;
        }

        if let Some(old_host) = self.host.take() {
            if let Some(mut data) = ctx.session.player(&old_host).map(|info| info.data.clone()) {
                set_host_flag(&mut data, false);
                ctx.session.update_player_data(&old_host, data);
            }
        }

        let mut data = data
            .or_else(|| ctx.session.player(new_host).map(|info| info.data.clone()))
            .unwrap_or(Value::Null);
        set_host_flag(&mut data, true);
        ctx.session.update_player_data(new_host, data);
        tracing::info!(host = %new_host, "lobby host assigned");
        self.host = Some(new_host.clone());
    }
}

impl PhaseHandler for WaitingForPlayersPhase {
    fn id(&self) -> PhaseId {
        PhaseId::WaitingForPlayers
    }

    fn subscriptions(&self) -> EventMask {
        EventMask::PLAYER_READY | EventMask::PLAYER_PLAYING
    }

    fn on_enter(&mut self, ctx: &mut PhaseContext<'_>, _previous: Option<PhaseId>) -> Transition {
        ctx.cue(Cue::DeactivateDisplay(DisplayId::EnemyHealth));
        ctx.cue(Cue::DeactivateDisplay(DisplayId::PartyHealth));
        ctx.cue(Cue::DeactivateDisplay(DisplayId::Battlefield));
        ctx.battle.clear_enemy();
        ctx.cue(Cue::RemoveEnemy);
        ctx.cue(Cue::ActivateDisplay(DisplayId::Lobby));

        // Nothing from an abandoned round may leak into the next game.
        ctx.abandon_round();
        for member in ctx.battle.members().to_vec() {
            ctx.cue(Cue::HidePlayer(member.id));
        }
        ctx.battle.remove_all_players();
        self.host = None;

        for player in ctx.session.players_in_state(PlayerState::Ready) {
            let data = ctx
                .session
                .player(&player)
                .map(|info| info.data.clone())
                .unwrap_or(Value::Null);
            self.add_player(ctx, &player, data);
        }

        ctx.session.update_gameplay_state(GameplayState::ShowingInfoScreen);
        ctx.session.update_lobby_state(LobbyState::Open);
        Transition::Stay
    }

    fn on_update(&mut self, ctx: &mut PhaseContext<'_>) -> Transition {
        let ready = ctx.session.players_in_state(PlayerState::Ready);
        let Some(first) = ready.first() else {
            return Transition::Stay;
        };
        let host_ready = self.host.as_ref().is_some_and(|host| ready.contains(host));
        if !host_ready {
            let first = first.clone();
            self.update_host(ctx, &first, None);
        }
        Transition::Stay
    }

    fn on_event(&mut self, ctx: &mut PhaseContext<'_>, event: &SessionEvent) -> Transition {
        match event.kind {
            EventKind::PlayerReady => {
                let data = event.payload.clone().unwrap_or(Value::Null);
                self.add_player(ctx, &event.player, data);
                Transition::Stay
            }
            EventKind::PlayerPlaying => {
                let playing = match event.parse_payload::<PlayerPlayingData>() {
                    Some(Ok(playing)) => playing,
                    Some(Err(error)) => {
                        tracing::warn!(player = %event.player, %error, "malformed playing data");
                        PlayerPlayingData::default()
                    }
                    None => PlayerPlayingData::default(),
                };
                ctx.battle.set_difficulty(playing.difficulty_setting);
                tracing::info!(
                    player = %event.player,
                    difficulty = %playing.difficulty_setting,
                    "game started"
                );
                Transition::GoTo(PhaseId::Instructions)
            }
            _ => Transition::Stay,
        }
    }

    fn on_exit(&mut self, ctx: &mut PhaseContext<'_>, _next: PhaseId) {
        for info in ctx.session.players().to_vec() {
            if info.state == PlayerState::Ready {
                ctx.session.update_player_state(&info.id, PlayerState::Playing);
            }
            if matches!(info.state, PlayerState::Ready | PlayerState::Playing)
                && ctx.battle.contains(&info.id)
            {
                ctx.cue(Cue::HidePlayer(info.id));
            }
        }
        ctx.session.update_lobby_state(LobbyState::Closed);
        ctx.cue(Cue::DeactivateDisplay(DisplayId::Lobby));
    }
}
