//! Pool storage and the borrow/release partition.

use crate::{PoolError, PoolHandle};

/// Factory used to construct pooled objects.
type Factory<T> = Box<dyn Fn() -> T + Send + Sync>;

struct Slot<T> {
    value: T,
    generation: u32,
    borrowed: bool,
}

/// A generic object pool backed by a single growable array.
///
/// # Semantics
///
/// The pool keeps a permutation of slot indices split by `borrowed_count`:
/// - `order[..borrowed_count]` are currently borrowed
/// - `order[borrowed_count..]` are free and handed out front to back
///
/// Values never move in memory; only the permutation is rearranged. Releasing
/// swaps the released index with the last borrowed one and shrinks the
/// borrowed partition, which keeps release O(1).
pub struct ObjectPool<T> {
    name: &'static str,
    factory: Factory<T>,
    slots: Vec<Slot<T>>,
    /// Slot indices, borrowed first.
    order: Vec<usize>,
    /// Reverse map of `order`: `position[slot] = i` where `order[i] == slot`.
    position: Vec<usize>,
    borrowed: usize,
}

impl<T> ObjectPool<T> {
    /// Creates a pool and eagerly constructs `capacity` objects.
    pub fn new<F>(name: &'static str, capacity: usize, factory: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        let mut pool = Self {
            name,
            factory: Box::new(factory),
            slots: Vec::with_capacity(capacity),
            order: Vec::with_capacity(capacity),
            position: Vec::with_capacity(capacity),
            borrowed: 0,
        };
        for _ in 0..capacity {
            pool.push_slot();
        }
        pool
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Total number of constructed objects.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of objects currently borrowed.
    pub fn borrowed_count(&self) -> usize {
        self.borrowed
    }

    /// Number of objects ready to be borrowed without growing.
    pub fn free_count(&self) -> usize {
        self.slots.len() - self.borrowed
    }

    /// Borrows an object, preferring reuse of a free slot.
    ///
    /// When every slot is borrowed a new object is synthesized through the
    /// factory and a warning is logged: the caller never fails, but the
    /// initial capacity was undersized.
    pub fn borrow(&mut self) -> PoolHandle {
        if self.borrowed == self.slots.len() {
            self.push_slot();
            tracing::warn!(
                pool = self.name,
                capacity = self.slots.len(),
                "Constructed new object on exhausted pool; increase its initial size"
            );
        }

        let index = self.order[self.borrowed];
        let slot = &mut self.slots[index];
        slot.borrowed = true;
        self.borrowed += 1;

        PoolHandle::new(index as u32, slot.generation)
    }

    /// Returns a borrowed object to the free partition.
    ///
    /// Releasing a handle that is not currently borrowed (never issued,
    /// already released, or issued by another pool) is rejected with an
    /// error and leaves the pool untouched.
    pub fn release(&mut self, handle: PoolHandle) -> Result<(), PoolError> {
        if self.borrowed == 0 {
            return Err(PoolError::NothingBorrowed {
                pool: self.name,
                handle,
            });
        }

        let index = handle.index() as usize;
        let Some(slot) = self.slots.get_mut(index) else {
            return Err(PoolError::UnknownHandle {
                pool: self.name,
                handle,
            });
        };
        if !slot.borrowed || slot.generation != handle.generation() {
            return Err(PoolError::StaleHandle {
                pool: self.name,
                handle,
            });
        }

        slot.borrowed = false;
        slot.generation = slot.generation.wrapping_add(1);

        // Swap with the last borrowed entry so borrowed slots stay contiguous.
        let from = self.position[index];
        let last = self.borrowed - 1;
        if from != last {
            let moved = self.order[last];
            self.order.swap(from, last);
            self.position[moved] = from;
            self.position[index] = last;
        }
        self.borrowed -= 1;

        Ok(())
    }

    /// Returns true if `handle` refers to a currently borrowed object.
    pub fn is_borrowed(&self, handle: PoolHandle) -> bool {
        self.slot(handle).is_some()
    }

    /// Resolves a borrowed handle.
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.slot(handle).map(|slot| &slot.value)
    }

    /// Resolves a borrowed handle mutably.
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.slots
            .get_mut(handle.index() as usize)
            .filter(|slot| slot.borrowed && slot.generation == handle.generation())
            .map(|slot| &mut slot.value)
    }

    /// Iterates over handles of all borrowed objects.
    pub fn borrowed_handles(&self) -> impl Iterator<Item = PoolHandle> + '_ {
        self.order[..self.borrowed].iter().map(|&index| {
            let slot = &self.slots[index];
            PoolHandle::new(index as u32, slot.generation)
        })
    }

    fn slot(&self, handle: PoolHandle) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index() as usize)
            .filter(|slot| slot.borrowed && slot.generation == handle.generation())
    }

    fn push_slot(&mut self) {
        let index = self.slots.len();
        self.slots.push(Slot {
            value: (self.factory)(),
            generation: 0,
            borrowed: false,
        });
        self.order.push(index);
        self.position.push(index);
    }
}

impl<T> std::fmt::Debug for ObjectPool<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectPool")
            .field("name", &self.name)
            .field("capacity", &self.slots.len())
            .field("borrowed", &self.borrowed)
            .finish()
    }
}
