#[cfg(feature = "no-std")]
use alloc::vec::Vec;
use core::fmt;
use core::ops::{Index, IndexMut};

use crate::error::{ListError, ListResult};

/// a stable handle to a slot in a [`NodeArena`]. ids of released slots are
/// handed out again by later allocations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

enum Slot<T> {
    Occupied(T),
    Vacant { next_free: Option<usize> },
}

/// growable slot storage with an intrusive free list threaded through the
/// vacant slots
pub struct NodeArena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<usize>,
    live: usize,
}

impl<T> NodeArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            live: 0,
        }
    }

    /// number of occupied slots
    pub fn live(&self) -> usize {
        self.live
    }

    /// number of slots ever created, occupied or not
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn alloc(&mut self, value: T) -> ListResult<NodeId> {
        let index = match self.free_head {
            Some(index) => {
                let next_free = match self.slots[index] {
                    Slot::Vacant { next_free } => next_free,
                    Slot::Occupied(_) => unreachable!("free list points at occupied slot {index}"),
                };
                self.free_head = next_free;
                self.slots[index] = Slot::Occupied(value);
                index
            }
            None => {
                self.slots
                    .try_reserve(1)
                    .map_err(|_| ListError::OutOfMemory)?;
                self.slots.push(Slot::Occupied(value));
                self.slots.len() - 1
            }
        };
        self.live += 1;
        Ok(NodeId(index))
    }

    /// vacate the slot behind `id`, returning what it held. returns None if
    /// the slot was already vacant
    pub fn release(&mut self, id: NodeId) -> Option<T> {
        let slot = self.slots.get_mut(id.0)?;
        if let Slot::Vacant { .. } = slot {
            return None;
        }

        let vacated = core::mem::replace(
            slot,
            Slot::Vacant {
                next_free: self.free_head,
            },
        );
        self.free_head = Some(id.0);
        self.live -= 1;
        match vacated {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        match self.slots.get(id.0)? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        match self.slots.get_mut(id.0)? {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }
}

impl<T> Default for NodeArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// panics if `id` names a vacant slot
impl<T> Index<NodeId> for NodeArena<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        match self.get(id) {
            Some(value) => value,
            None => panic!("node {id} is not live"),
        }
    }
}

impl<T> IndexMut<NodeId> for NodeArena<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        match self.get_mut(id) {
            Some(value) => value,
            None => panic!("node {id} is not live"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn alloc_on_empty_arena_returns_first_slot() {
        let mut arena = NodeArena::new();
        let id = arena.alloc(73).expect("failed to alloc");
        assert_eq!(id.index(), 0);
        assert_eq!(arena.live(), 1);
        assert_eq!(arena.get(id), Some(&73));
    }

    #[test]
    fn release_returns_value_and_vacates_slot() {
        let mut arena = NodeArena::new();
        let id = arena.alloc(73).expect("failed to alloc");
        assert_eq!(arena.release(id), Some(73));
        assert_eq!(arena.live(), 0);
        assert!(arena.get(id).is_none());
    }

    #[test]
    fn double_release_returns_none() {
        let mut arena = NodeArena::new();
        let id = arena.alloc(73).expect("failed to alloc");
        assert_eq!(arena.release(id), Some(73));
        assert_eq!(arena.release(id), None);
        assert_eq!(arena.live(), 0);
    }

    #[test]
    fn released_slots_are_reused_most_recent_first() {
        let mut arena = NodeArena::new();
        let a = arena.alloc(1).expect("failed to alloc");
        let b = arena.alloc(2).expect("failed to alloc");
        let _c = arena.alloc(3).expect("failed to alloc");

        arena.release(a);
        arena.release(b);

        assert_eq!(arena.alloc(4).expect("failed to alloc"), b);
        assert_eq!(arena.alloc(5).expect("failed to alloc"), a);
        assert_eq!(arena.slot_count(), 3);
        assert_eq!(arena.live(), 3);
    }

    #[test]
    fn release_of_unknown_id_returns_none() {
        let mut arena: NodeArena<u32> = NodeArena::new();
        assert_eq!(arena.release(NodeId(12)), None);
    }

    #[test]
    #[should_panic(expected = "node #0 is not live")]
    fn indexing_vacant_slot_panics() {
        let mut arena = NodeArena::new();
        let id = arena.alloc(73).expect("failed to alloc");
        arena.release(id);
        let _ = arena[id];
    }

    #[test]
    fn index_mut_updates_value_in_place() {
        let mut arena = NodeArena::new();
        let id = arena.alloc(73).expect("failed to alloc");
        arena[id] += 1;
        assert_eq!(arena[id], 74);
    }
}
