//! Arena-based storage with typed, generational handles.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

/// Owner tag 0 is never handed out, so detached handles resolve nowhere.
static NEXT_OWNER: AtomicU32 = AtomicU32::new(1);

fn next_owner() -> u32 {
    NEXT_OWNER.fetch_add(1, AtomicOrdering::Relaxed)
}

/// A typed handle into an [`Arena`] or [`UniqueArena`].
///
/// Handles are lightweight identifiers (owner tag, u32 index and a
/// generation) that provide type-safe access to arena-allocated values. Every
/// arena draws a distinct owner tag, so a handle issued by one arena never
/// resolves in another. Once the slot a handle points at has been removed, the
/// handle is stale and every lookup through it is rejected.
pub struct Handle<T> {
    owner: u32,
    index: u32,
    generation: u32,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner
            && self.index == other.index
            && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.owner, self.index, self.generation).cmp(&(
            other.owner,
            other.index,
            other.generation,
        ))
    }
}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.generation == 0 {
            write!(f, "[{}]", self.index)
        } else {
            write!(f, "[{}#{}]", self.index, self.generation)
        }
    }
}

impl<T> Handle<T> {
    fn owned(owner: u32, index: u32, generation: u32) -> Self {
        Self {
            owner,
            index,
            generation,
            _phantom: PhantomData,
        }
    }

    /// Creates a handle that belongs to no arena.
    #[cfg(test)]
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self {
            owner: 0,
            index,
            generation,
            _phantom: PhantomData,
        }
    }

    /// Returns the zero-based slot index of this handle.
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Returns the generation of the slot this handle was issued for.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

fn checked_index(len: usize) -> u32 {
    u32::try_from(len)
        .unwrap_or_else(|_| panic!("arena overflow: {len} items exceeds u32::MAX"))
}

#[derive(Clone, Debug)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// A handle-indexed arena whose slots can be removed.
///
/// Removing a value bumps the slot's generation, so handles issued before the
/// removal no longer resolve. Freed slots are reused by later appends. A clone
/// keeps the owner tag, so handles stay valid across clones.
#[derive(Clone, Debug)]
pub struct Arena<T> {
    owner: u32,
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            owner: next_owner(),
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Returns the number of live elements in the arena.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if the arena contains no live elements.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Returns the handle that will be assigned to the next appended value.
    pub fn next_handle(&self) -> Handle<T> {
        match self.free.last() {
            Some(&index) => {
                Handle::owned(self.owner, index, self.slots[index as usize].generation)
            }
            None => Handle::owned(self.owner, checked_index(self.slots.len()), 0),
        }
    }

    /// Appends a value and returns its handle.
    pub fn append(&mut self, value: T) -> Handle<T> {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.value = Some(value);
            return Handle::owned(self.owner, index, slot.generation);
        }
        let index = checked_index(self.slots.len());
        self.slots.push(Slot {
            generation: 0,
            value: Some(value),
        });
        Handle::owned(self.owner, index, 0)
    }

    /// Removes the value behind `handle`, invalidating every copy of the handle.
    ///
    /// Returns `None` if the handle was already stale.
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        if handle.owner != self.owner {
            return None;
        }
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        let value = slot.value.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        Some(value)
    }

    /// Returns `true` if `handle` refers to a live value of this arena.
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.try_get(handle).is_some()
    }

    /// Returns a reference to the value if the handle is live.
    pub fn try_get(&self, handle: Handle<T>) -> Option<&T> {
        if handle.owner != self.owner {
            return None;
        }
        self.slots
            .get(handle.index())
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_ref())
    }

    /// Returns a mutable reference to the value if the handle is live.
    pub fn try_get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        if handle.owner != self.owner {
            return None;
        }
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.value.as_mut())
    }

    /// Iterates over `(handle, &value)` pairs of live values in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        // Safety: arena size bounded by u32::MAX (enforced in append)
        let owner = self.owner;
        self.slots.iter().enumerate().filter_map(move |(i, slot)| {
            slot.value
                .as_ref()
                .map(|v| (Handle::owned(owner, i as u32, slot.generation), v))
        })
    }

    /// Iterates over `(handle, &mut value)` pairs of live values in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        let owner = self.owner;
        self.slots.iter_mut().enumerate().filter_map(move |(i, slot)| {
            let generation = slot.generation;
            slot.value
                .as_mut()
                .map(|v| (Handle::owned(owner, i as u32, generation), v))
        })
    }
}

impl<T> Index<Handle<T>> for Arena<T> {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &T {
        self.try_get(handle)
            .unwrap_or_else(|| panic!("stale or foreign handle {handle:?}"))
    }
}

impl<T> IndexMut<Handle<T>> for Arena<T> {
    fn index_mut(&mut self, handle: Handle<T>) -> &mut T {
        self.try_get_mut(handle)
            .unwrap_or_else(|| panic!("stale or foreign handle {handle:?}"))
    }
}

/// A deduplicating arena that returns the same [`Handle`] for equal values.
///
/// Values are never removed, so every handle it issues stays valid for the
/// arena's lifetime.
#[derive(Clone, Debug)]
pub struct UniqueArena<T> {
    owner: u32,
    data: Vec<T>,
    map: HashMap<T, u32>,
}

impl<T: Hash + Eq> Default for UniqueArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq> UniqueArena<T> {
    /// Creates an empty deduplicating arena.
    pub fn new() -> Self {
        Self {
            owner: next_owner(),
            data: Vec::new(),
            map: HashMap::new(),
        }
    }

    /// Returns the number of unique elements in the arena.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the arena contains no elements.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Inserts a value, returning an existing handle if the value is already present.
    pub fn insert(&mut self, value: T) -> Handle<T>
    where
        T: Clone,
    {
        if let Some(&index) = self.map.get(&value) {
            return Handle::owned(self.owner, index, 0);
        }
        let index = checked_index(self.data.len());
        self.map.insert(value.clone(), index);
        self.data.push(value);
        Handle::owned(self.owner, index, 0)
    }

    /// Returns the handle of a value equal to `value`, if one was inserted.
    pub fn get(&self, value: &T) -> Option<Handle<T>> {
        self.map
            .get(value)
            .map(|&index| Handle::owned(self.owner, index, 0))
    }

    /// Returns `true` if `handle` was issued by this arena.
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.try_get(handle).is_some()
    }

    /// Returns a reference to the value if the handle is valid.
    pub fn try_get(&self, handle: Handle<T>) -> Option<&T> {
        if handle.owner != self.owner || handle.generation != 0 {
            return None;
        }
        self.data.get(handle.index())
    }

    /// Iterates over `(handle, &value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        // Safety: arena size bounded by u32::MAX (enforced in insert)
        let owner = self.owner;
        self.data
            .iter()
            .enumerate()
            .map(move |(i, v)| (Handle::owned(owner, i as u32, 0), v))
    }
}

impl<T: Hash + Eq> Index<Handle<T>> for UniqueArena<T> {
    type Output = T;

    fn index(&self, handle: Handle<T>) -> &T {
        self.try_get(handle)
            .unwrap_or_else(|| panic!("foreign handle {handle:?}"))
    }
}
