//! Pooled action queues.

use std::collections::VecDeque;

use object_pool::PoolHandle;

use crate::action::ActionRef;

/// An ordered queue of actions, checked out from the engine's list pool.
///
/// The backing `VecDeque` lives in the pool between uses and is moved into
/// the list while it is checked out, so its capacity is reused. A list must
/// be handed back through
/// [`ActionEngine::release_action_list`](crate::engine::ActionEngine::release_action_list),
/// [`ActionEngine::release_list_only`](crate::engine::ActionEngine::release_list_only)
/// or [`ActionEngine::start_executing`](crate::engine::ActionEngine::start_executing).
#[must_use = "action lists must be handed back to the engine"]
#[derive(Debug)]
pub struct ActionList {
    handle: PoolHandle,
    actions: VecDeque<ActionRef>,
}

impl ActionList {
    pub(crate) fn new(handle: PoolHandle, actions: VecDeque<ActionRef>) -> Self {
        Self { handle, actions }
    }

    pub(crate) fn into_parts(self) -> (PoolHandle, VecDeque<ActionRef>) {
        (self.handle, self.actions)
    }

    pub fn handle(&self) -> PoolHandle {
        self.handle
    }

    pub fn push(&mut self, action: ActionRef) {
        self.actions.push_back(action);
    }

    pub fn pop_front(&mut self) -> Option<ActionRef> {
        self.actions.pop_front()
    }

    pub fn get(&self, index: usize) -> Option<ActionRef> {
        self.actions.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionRef> + '_ {
        self.actions.iter()
    }

    /// Moves every action out, leaving the list empty.
    pub fn drain(&mut self) -> impl Iterator<Item = ActionRef> + '_ {
        self.actions.drain(..)
    }
}
