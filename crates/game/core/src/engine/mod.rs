//! Sequential, time-driven execution of queued actions.
//!
//! # Architecture
//!
//! - **One live action**: at most one action is between `on_start` and
//!   `on_finish` at any time; actions run strictly in FIFO order
//! - **Tick driven**: the host calls [`ActionEngine::update`] once per frame
//!   with the current [`Timestamp`]; starting the next action and finishing
//!   the current one happen on separate ticks
//! - **Pause invariant**: [`ActionEngine::resume`] shifts the live action's
//!   start time by the pause length, so pauses never shorten an action
//! - **Pooled everything**: actions and the lists holding them come from
//!   object pools owned by the engine
mod errors;
mod list;

pub use errors::EngineError;
pub use list::ActionList;

use std::collections::VecDeque;

use object_pool::ObjectPool;

use crate::action::{ActionContext, ActionPools, ActionRef};
use crate::config::PoolConfig;
use crate::error::GameError;
use crate::time::Timestamp;

pub struct ActionEngine {
    pools: ActionPools,
    lists: ObjectPool<VecDeque<ActionRef>>,
    queue: Option<ActionList>,
    executing: bool,
    current: Option<ActionRef>,
    current_started_at: Timestamp,
    paused_at: Option<Timestamp>,
}

impl ActionEngine {
    pub fn new(config: &PoolConfig) -> Self {
        Self {
            pools: ActionPools::new(config),
            lists: ObjectPool::new("ActionList", config.action_lists, VecDeque::new),
            queue: None,
            executing: false,
            current: None,
            current_started_at: Timestamp::ZERO,
            paused_at: None,
        }
    }

    pub fn pools(&self) -> &ActionPools {
        &self.pools
    }

    pub fn pools_mut(&mut self) -> &mut ActionPools {
        &mut self.pools
    }

    // ========================================================================
    // Lists
    // ========================================================================

    /// Checks out an empty action list.
    pub fn action_list(&mut self) -> ActionList {
        let handle = self.lists.borrow();
        let mut actions = self
            .lists
            .get_mut(handle)
            .map(std::mem::take)
            .unwrap_or_default();
        actions.clear();
        ActionList::new(handle, actions)
    }

    /// Returns `list` and every action still in it to their pools, without
    /// running them.
    ///
    /// All actions are released even if some fail; the first failure is
    /// returned.
    pub fn release_action_list(&mut self, mut list: ActionList) -> Result<(), EngineError> {
        let mut first_error = None;
        for action in list.drain() {
            if let Err(error) = self.pools.release(action) {
                first_error.get_or_insert(EngineError::from(error));
            }
        }
        let returned = self.return_list(list);
        match first_error {
            Some(error) => Err(error),
            None => returned,
        }
    }

    /// Returns only the list container; the actions it references are left
    /// alone because they were handed elsewhere.
    pub fn release_list_only(&mut self, list: ActionList) -> Result<(), EngineError> {
        self.return_list(list)
    }

    fn return_list(&mut self, list: ActionList) -> Result<(), EngineError> {
        let (handle, mut actions) = list.into_parts();
        actions.clear();
        if let Some(slot) = self.lists.get_mut(handle) {
            *slot = actions;
        }
        self.lists.release(handle)?;
        Ok(())
    }

    /// Number of list containers currently checked out.
    pub fn lists_in_use(&self) -> usize {
        self.lists.borrowed_count()
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Begins draining `list`.
    ///
    /// Callers are expected to [`reset`](Self::reset) first. If a previous
    /// queue is still live it is force-released (its in-flight action
    /// without `on_finish`) and the violation is logged.
    pub fn start_executing(&mut self, list: ActionList) {
        if let Some(previous) = self.queue.take() {
            let pending = previous.len() + usize::from(self.current.is_some());
            if pending > 0 {
                let error = EngineError::StartedWhileLive { pending };
                tracing::error!(code = error.error_code(), %error, "engine started before reset");
            }
            self.discard_current();
            self.release_logged(previous);
        }

        tracing::debug!(actions = list.len(), "engine started");
        self.queue = Some(list);
        self.executing = true;
    }

    /// Checks out a list holding `action` alone and starts executing it.
    pub fn start_single(&mut self, action: ActionRef) {
        let mut list = self.action_list();
        list.push(action);
        self.start_executing(list);
    }

    /// True iff no queue is installed, or the queue is empty and execution
    /// has stopped.
    pub fn is_done(&self) -> bool {
        match &self.queue {
            None => true,
            Some(queue) => queue.is_empty() && !self.executing,
        }
    }

    pub fn is_executing(&self) -> bool {
        self.executing
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// The action between `on_start` and `on_finish`, if any.
    pub fn current_action(&self) -> Option<ActionRef> {
        self.current
    }

    /// Actions queued behind the current one.
    pub fn pending(&self) -> usize {
        self.queue.as_ref().map_or(0, ActionList::len)
    }

    /// Stops execution and releases every queued action, including the one in
    /// flight, without further lifecycle callbacks. Safe in any state.
    pub fn reset(&mut self) {
        self.discard_current();
        if let Some(queue) = self.queue.take() {
            self.release_logged(queue);
        }
        self.executing = false;
    }

    /// Advances the engine to `now`.
    ///
    /// No-op while stopped, without a queue, or paused.
    pub fn update(&mut self, now: Timestamp, ctx: &mut ActionContext<'_>) {
        if !self.executing || self.queue.is_none() || self.paused_at.is_some() {
            return;
        }

        if let Some(current) = self.current {
            let elapsed = now.millis_since(self.current_started_at);
            let Some(action) = self.pools.get_mut(current) else {
                let error = EngineError::MissingAction(current);
                tracing::error!(code = error.error_code(), %error, "dropping live action");
                self.current = None;
                return;
            };

            action.on_update(ctx, elapsed);
            if action.should_finish_on_next_update() || elapsed > action.execution_time() {
                action.on_finish(ctx);
                tracing::debug!(action = %current, elapsed, "action finished");
                self.current = None;
                if let Err(error) = self.pools.release(current) {
                    let error = EngineError::from(error);
                    tracing::error!(code = error.error_code(), %error, "action release failed");
                }
            }
            return;
        }

        match self.queue.as_mut().and_then(ActionList::pop_front) {
            Some(next) => match self.pools.get_mut(next) {
                Some(action) => {
                    action.on_start(ctx);
                    tracing::debug!(action = %next, "action started");
                    self.current = Some(next);
                    self.current_started_at = now;
                }
                None => {
                    let error = EngineError::MissingAction(next);
                    tracing::error!(code = error.error_code(), %error, "skipping queued action");
                }
            },
            None => self.reset(),
        }
    }

    /// Freezes logical time. Repeated pauses keep the first timestamp.
    pub fn pause(&mut self, now: Timestamp) {
        if self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    /// Unfreezes logical time, shifting the live action's start by the pause
    /// length.
    pub fn resume(&mut self, now: Timestamp) {
        if let Some(paused_at) = self.paused_at.take() {
            self.current_started_at = self.current_started_at + now.millis_since(paused_at);
        }
    }

    fn discard_current(&mut self) {
        let Some(current) = self.current.take() else {
            return;
        };
        if let Err(error) = self.pools.release(current) {
            let error = EngineError::from(error);
            tracing::error!(code = error.error_code(), %error, "in-flight action release failed");
        }
    }

    fn release_logged(&mut self, list: ActionList) {
        if let Err(error) = self.release_action_list(list) {
            tracing::error!(code = error.error_code(), %error, "action list release failed");
        }
    }
}

impl core::fmt::Debug for ActionEngine {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ActionEngine")
            .field("executing", &self.executing)
            .field("pending", &self.pending())
            .field("current", &self.current)
            .field("paused_at", &self.paused_at)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::{Battle, PlayerId};
    use crate::config::GameConfig;
    use crate::presentation::{Cue, DisplayId, Presenter};
    use crate::protocol::{SpellAccuracy, SpellElement};

    struct Harness {
        engine: ActionEngine,
        battle: Battle,
        cues: Vec<Cue>,
        config: GameConfig,
    }

    impl Harness {
        fn new() -> Self {
            let config = GameConfig::default();
            Self {
                engine: ActionEngine::new(&config.pools),
                battle: Battle::new(),
                cues: Vec::new(),
                config,
            }
        }

        fn tick(&mut self, now: u64) {
            let mut ctx = ActionContext::new(
                &mut self.battle,
                &mut self.cues as &mut dyn Presenter,
                &self.config,
            );
            self.engine.update(Timestamp(now), &mut ctx);
        }

        fn display(&mut self, duration: u64) -> ActionRef {
            self.engine
                .pools_mut()
                .full_screen_display(DisplayId::Instructions, duration)
        }
    }

    #[test]
    fn finishes_only_after_duration_is_exceeded() {
        let mut h = Harness::new();
        let action = h.display(1_000);
        h.engine.start_single(action);

        h.tick(0);
        assert_eq!(h.engine.current_action(), Some(action));
        h.tick(1_000);
        assert_eq!(h.engine.current_action(), Some(action));
        h.tick(1_001);
        assert_eq!(h.engine.current_action(), None);
        assert!(!h.engine.is_done());

        h.tick(1_017);
        assert!(h.engine.is_done());
        assert_eq!(h.engine.pools().total_borrowed(), 0);
        assert_eq!(h.engine.lists_in_use(), 0);
    }

    #[test]
    fn reset_discards_in_flight_action_without_finishing_it() {
        let mut h = Harness::new();
        let first = h.display(1_000);
        let second = h.display(1_000);
        let mut list = h.engine.action_list();
        list.push(first);
        list.push(second);
        h.engine.start_executing(list);
        h.tick(0);

        h.engine.reset();

        assert!(h.engine.is_done());
        assert!(!h.engine.is_executing());
        assert_eq!(h.engine.pools().total_borrowed(), 0);
        assert_eq!(h.engine.lists_in_use(), 0);
        assert!(!h.cues.contains(&Cue::DeactivateDisplay(DisplayId::Instructions)));
        // Safe to call again.
        h.engine.reset();
    }

    #[test]
    fn starting_while_live_releases_the_previous_queue() {
        let mut h = Harness::new();
        let old = h.display(1_000);
        h.engine.start_single(old);
        h.tick(0);

        let new = h.display(500);
        h.engine.start_single(new);

        assert!(!h.engine.pools().is_live(old));
        assert_eq!(h.engine.current_action(), None);
        assert_eq!(h.engine.lists_in_use(), 1);
        h.tick(10);
        assert_eq!(h.engine.current_action(), Some(new));
    }

    #[test]
    fn update_is_inert_while_paused() {
        let mut h = Harness::new();
        let action = h.display(100);
        h.engine.start_single(action);
        h.tick(0);

        h.engine.pause(Timestamp(50));
        h.tick(5_000);
        assert_eq!(h.engine.current_action(), Some(action));

        h.engine.resume(Timestamp(5_000));
        h.tick(5_050);
        assert_eq!(h.engine.current_action(), Some(action));
        h.tick(5_051);
        assert_eq!(h.engine.current_action(), None);
    }

    #[test]
    fn early_finish_request_skips_the_remaining_duration() {
        let mut h = Harness::new();
        // Nobody named "ghost" is in the party.
        let attack = h.engine.pools_mut().player_attack(
            PlayerId::from("ghost"),
            SpellElement::Fire,
            SpellAccuracy::Good,
        );
        h.engine.start_single(attack);

        h.tick(0);
        assert_eq!(h.engine.current_action(), Some(attack));
        h.tick(1);
        assert_eq!(h.engine.current_action(), None);
        assert!(!h.engine.pools().is_live(attack));
    }

    #[test]
    fn release_list_only_leaves_actions_checked_out() {
        let mut h = Harness::new();
        let action = h.display(10);
        let mut list = h.engine.action_list();
        list.push(action);

        h.engine.release_list_only(list).unwrap();

        assert!(h.engine.pools().is_live(action));
        assert_eq!(h.engine.lists_in_use(), 0);
    }
}
