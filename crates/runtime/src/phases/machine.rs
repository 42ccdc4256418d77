//! Phase registry and transition driver.
use std::collections::HashMap;

use game_core::PhaseId;

use super::{
    EnemyResolutionPhase, InstructionsPhase, PausedPhase, PhaseContext, PhaseHandler,
    PlayerActionPhase, PlayerResolutionPhase, Transition, VictoryPhase, WaitingForPlayersPhase,
};
use crate::error::PhaseError;
use crate::session::SessionEvent;

/// Redirects followed by one `go_to_state` before giving up.
const MAX_HOPS: usize = 16;

/// Holds the phase graph and the current phase.
pub struct PhaseMachine {
    phases: HashMap<PhaseId, Box<dyn PhaseHandler>>,
    current: Option<PhaseId>,
}

impl PhaseMachine {
    /// An empty machine with no phases and nothing current.
    pub fn new() -> Self {
        Self {
            phases: HashMap::new(),
            current: None,
        }
    }

    /// A machine with all eight phases registered.
    pub fn standard() -> Self {
        let mut machine = Self::new();
        machine.add_state(WaitingForPlayersPhase::new());
        machine.add_state(InstructionsPhase::new());
        machine.add_state(PlayerActionPhase::new());
        machine.add_state(PlayerResolutionPhase::new());
        machine.add_state(EnemyResolutionPhase::new());
        machine.add_state(VictoryPhase::player());
        machine.add_state(VictoryPhase::enemy());
        machine.add_state(PausedPhase::new());
        machine
    }

    /// Registers `phase` under its own id, replacing any earlier handler.
    pub fn add_state(&mut self, phase: impl PhaseHandler + 'static) {
        let id = phase.id();
        if self.phases.insert(id, Box::new(phase)).is_some() {
            tracing::warn!(phase = %id, "phase handler replaced");
        }
    }

    pub fn state(&self, id: PhaseId) -> Option<&dyn PhaseHandler> {
        self.phases.get(&id).map(|phase| phase.as_ref())
    }

    pub fn current(&self) -> Option<PhaseId> {
        self.current
    }

    /// Leaves the current phase and enters `target`, following any redirect
    /// the entered phase asks for.
    ///
    /// Every entered phase is announced to the session after its `on_enter`.
    pub fn go_to_state(
        &mut self,
        ctx: &mut PhaseContext<'_>,
        target: PhaseId,
    ) -> Result<(), PhaseError> {
        let mut target = target;
        for _ in 0..MAX_HOPS {
            if !self.phases.contains_key(&target) {
                return Err(PhaseError::Unregistered(target));
            }

            let previous = self.current;
            if let Some(leaving) = previous.and_then(|id| self.phases.get_mut(&id)) {
                leaving.on_exit(ctx, target);
            }

            self.current = Some(target);
            tracing::info!(from = ?previous, to = %target, "phase transition");

            let Some(entering) = self.phases.get_mut(&target) else {
                return Err(PhaseError::Unregistered(target));
            };
            let transition = entering.on_enter(ctx, previous);
            ctx.session.broadcast_phase(target);

            match transition {
                Transition::Stay => return Ok(()),
                Transition::GoTo(next) => target = next,
            }
        }

        Err(PhaseError::TransitionLoop {
            hops: MAX_HOPS,
            last: target,
        })
    }

    /// Runs the current phase's per-tick logic. No-op before the first
    /// transition.
    pub fn update(&mut self, ctx: &mut PhaseContext<'_>) -> Result<(), PhaseError> {
        let Some(phase) = self.current.and_then(|id| self.phases.get_mut(&id)) else {
            return Ok(());
        };
        match phase.on_update(ctx) {
            Transition::Stay => Ok(()),
            Transition::GoTo(next) => self.go_to_state(ctx, next),
        }
    }

    /// Delivers `event` to the current phase if it subscribes to its kind.
    ///
    /// Returns whether the event was delivered.
    pub fn handle_event(
        &mut self,
        ctx: &mut PhaseContext<'_>,
        event: &SessionEvent,
    ) -> Result<bool, PhaseError> {
        let Some(phase) = self.current.and_then(|id| self.phases.get_mut(&id)) else {
            return Ok(false);
        };
        if !phase.subscriptions().contains(event.kind.mask()) {
            tracing::trace!(phase = %phase.id(), kind = %event.kind, "event not subscribed");
            return Ok(false);
        }
        match phase.on_event(ctx, event) {
            Transition::Stay => Ok(true),
            Transition::GoTo(next) => self.go_to_state(ctx, next).map(|()| true),
        }
    }
}

impl Default for PhaseMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PhaseMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseMachine")
            .field("phases", &self.phases.len())
            .field("current", &self.current)
            .finish()
    }
}
