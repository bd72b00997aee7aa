//! Reuse pool for movable entities, keyed by entity kind.

use std::{
    collections::{BTreeSet, HashMap, VecDeque},
    fmt,
    hash::Hash,
};

use cube_slide_core::CubeId;
use log::warn;
use serde::Deserialize;
use thiserror::Error;

/// Items that can be handed out and taken back by an [`ObjectPool`].
pub trait Poolable {
    /// Key grouping interchangeable instances.
    type Kind: Copy + Eq + Hash + fmt::Debug;

    /// Kind of this instance.
    fn kind(&self) -> Self::Kind;

    /// Called when the instance is handed out.
    fn activate(&mut self);

    /// Called when the instance is taken back; resets transient state.
    fn deactivate(&mut self);
}

/// What [`ObjectPool::acquire`] does once a kind has no inactive instance left.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Allocate a fresh instance and log a warning.
    #[default]
    Grow,
    /// Refuse with [`PoolError::Exhausted`].
    Reject,
}

/// Failures reported by the pool. None of them mutate pool membership.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// No pool was registered for the requested kind.
    #[error("no pool registered for the requested kind")]
    UnknownKind,
    /// The pool is empty and the overflow policy forbids growing it.
    #[error("pool exhausted")]
    Exhausted,
    /// The handle does not belong to this pool.
    #[error("cube {0:?} does not belong to this pool")]
    UnknownHandle(CubeId),
    /// The instance is already inactive.
    #[error("cube {0:?} is not active")]
    NotActive(CubeId),
}

/// Arena of preallocated instances.
///
/// Every instance lives in exactly one of the inactive queue of its kind or
/// the active set. Handles are stable for the lifetime of the pool.
#[derive(Debug)]
pub struct ObjectPool<T: Poolable> {
    slots: Vec<T>,
    inactive: HashMap<T::Kind, VecDeque<CubeId>>,
    active: BTreeSet<CubeId>,
    factories: HashMap<T::Kind, fn(CubeId, T::Kind) -> T>,
    overflow: OverflowPolicy,
}

impl<T: Poolable> ObjectPool<T> {
    /// Creates an empty pool with the provided overflow policy.
    #[must_use]
    pub fn new(overflow: OverflowPolicy) -> Self {
        Self {
            slots: Vec::new(),
            inactive: HashMap::new(),
            active: BTreeSet::new(),
            factories: HashMap::new(),
            overflow,
        }
    }

    /// Registers a kind and preallocates `initial_size` inactive instances.
    pub fn register_kind(
        &mut self,
        kind: T::Kind,
        initial_size: usize,
        factory: fn(CubeId, T::Kind) -> T,
    ) -> Result<(), PoolError> {
        let _ = self.factories.insert(kind, factory);
        let _ = self.inactive.entry(kind).or_default();
        for _ in 0..initial_size {
            let id = self.allocate(kind, factory)?;
            self.queue_for(kind).push_back(id);
        }
        Ok(())
    }

    /// Hands out an inactive instance of the kind.
    pub fn acquire(&mut self, kind: T::Kind) -> Result<CubeId, PoolError> {
        let Some(factory) = self.factories.get(&kind).copied() else {
            warn!("no pool registered for {kind:?}");
            return Err(PoolError::UnknownKind);
        };

        let id = match self.queue_for(kind).pop_front() {
            Some(id) => id,
            None => match self.overflow {
                OverflowPolicy::Reject => return Err(PoolError::Exhausted),
                OverflowPolicy::Grow => {
                    warn!("pool for {kind:?} exhausted, allocating a new instance");
                    self.allocate(kind, factory)?
                }
            },
        };

        if let Some(item) = self.slot_mut(id) {
            item.activate();
        }
        let _ = self.active.insert(id);
        Ok(id)
    }

    /// Takes an active instance back and queues it for reuse. Releasing an
    /// inactive instance is refused and leaves the pool unchanged.
    pub fn release(&mut self, id: CubeId) -> Result<(), PoolError> {
        let Some(item) = self.slot_mut(id) else {
            return Err(PoolError::UnknownHandle(id));
        };
        let kind = item.kind();
        if !self.active.remove(&id) {
            warn!("ignoring release of inactive cube {id:?}");
            return Err(PoolError::NotActive(id));
        }
        if let Some(item) = self.slot_mut(id) {
            item.deactivate();
        }
        self.queue_for(kind).push_back(id);
        Ok(())
    }

    /// Releases every active instance of the kind, returning how many were
    /// taken back.
    pub fn release_all(&mut self, kind: T::Kind) -> usize {
        let snapshot: Vec<CubeId> = self
            .active
            .iter()
            .copied()
            .filter(|id| self.get(*id).map_or(false, |item| item.kind() == kind))
            .collect();

        snapshot
            .into_iter()
            .filter(|id| self.release(*id).is_ok())
            .count()
    }

    /// Instance behind the handle, active or not.
    #[must_use]
    pub fn get(&self, id: CubeId) -> Option<&T> {
        self.slots.get(usize::try_from(id.get()).ok()?)
    }

    /// Mutable instance behind the handle, active or not.
    pub fn get_mut(&mut self, id: CubeId) -> Option<&mut T> {
        self.slot_mut(id)
    }

    /// Whether the handle is currently handed out.
    #[must_use]
    pub fn is_active(&self, id: CubeId) -> bool {
        self.active.contains(&id)
    }

    /// Number of active instances of the kind.
    #[must_use]
    pub fn active_count(&self, kind: T::Kind) -> usize {
        self.active
            .iter()
            .filter(|id| self.get(**id).map_or(false, |item| item.kind() == kind))
            .count()
    }

    /// Number of inactive instances of the kind waiting for reuse.
    #[must_use]
    pub fn available(&self, kind: T::Kind) -> usize {
        self.inactive.get(&kind).map_or(0, VecDeque::len)
    }

    /// Total number of instances ever allocated.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn allocate(
        &mut self,
        kind: T::Kind,
        factory: fn(CubeId, T::Kind) -> T,
    ) -> Result<CubeId, PoolError> {
        let index = u32::try_from(self.slots.len()).map_err(|_| PoolError::Exhausted)?;
        let id = CubeId::new(index);
        let mut item = factory(id, kind);
        item.deactivate();
        self.slots.push(item);
        Ok(id)
    }

    fn queue_for(&mut self, kind: T::Kind) -> &mut VecDeque<CubeId> {
        self.inactive.entry(kind).or_default()
    }

    fn slot_mut(&mut self, id: CubeId) -> Option<&mut T> {
        let index = usize::try_from(id.get()).ok()?;
        self.slots.get_mut(index)
    }
}
