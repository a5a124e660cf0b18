//! # Slot arena backing the live-endpoint set.
//!
//! Membership storage with stable identifiers: a `Vec<Option<T>>` plus a
//! free-list of reclaimed indices. Iteration never shifts elements and
//! removal is O(1), so the registry can prune mid-broadcast without
//! disturbing other slots, and a [`SlotId`] handed out earlier stays valid
//! across pruning elsewhere.

use std::fmt;

/// Stable identifier of a registry slot.
///
/// Remains valid while its endpoint is registered, regardless of how many
/// other slots are pruned; after pruning, the id may be reused by a later
/// registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId(usize);

impl SlotId {
    /// The raw slot index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    free: Vec<usize>,
    len: usize,
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn insert(&mut self, value: T) -> SlotId {
        self.len += 1;
        match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(value);
                SlotId(index)
            }
            None => {
                self.slots.push(Some(value));
                SlotId(self.slots.len() - 1)
            }
        }
    }

    pub(crate) fn get(&self, id: SlotId) -> Option<&T> {
        self.slots.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn remove(&mut self, id: SlotId) -> Option<T> {
        let value = self.slots.get_mut(id.0)?.take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(value)
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (SlotId, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|value| (SlotId(index), value)))
    }

    /// Keeps only the slots `keep` approves of, in a single pass.
    ///
    /// Each removal is O(1) and no surviving slot changes position, so
    /// outstanding [`SlotId`]s stay valid. Vacated values are dropped on the
    /// spot; no stale references are retained.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(SlotId, &T) -> bool) {
        for index in 0..self.slots.len() {
            let vacate = match &self.slots[index] {
                Some(value) => !keep(SlotId(index), value),
                None => false,
            };
            if vacate {
                self.slots[index] = None;
                self.free.push(index);
                self.len -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_sequential_slots() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");

        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_remove_frees_the_slot_for_reuse() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");

        assert_eq!(arena.remove(a), Some("a"));
        assert_eq!(arena.len(), 1);
        assert!(arena.get(a).is_none());

        // The freed slot is handed out again before the vector grows.
        let c = arena.insert("c");
        assert_eq!(c.index(), a.index());
        assert_eq!(arena.get(b), Some(&"b"));
    }

    #[test]
    fn test_remove_twice_returns_none() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        assert_eq!(arena.remove(a), Some("a"));
        assert_eq!(arena.remove(a), None);
    }

    #[test]
    fn test_ids_stay_valid_across_pruning_elsewhere() {
        let mut arena = Arena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        let c = arena.insert("c");

        arena.retain(|id, _| id != b);

        assert_eq!(arena.get(a), Some(&"a"));
        assert!(arena.get(b).is_none());
        assert_eq!(arena.get(c), Some(&"c"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_iter_skips_vacated_slots() {
        let mut arena = Arena::new();
        arena.insert("a");
        let b = arena.insert("b");
        arena.insert("c");
        arena.remove(b);

        let seen: Vec<&str> = arena.iter().map(|(_, value)| *value).collect();
        assert_eq!(seen, vec!["a", "c"]);
    }

    #[test]
    fn test_retain_all_and_none() {
        let mut arena = Arena::new();
        arena.insert(1);
        arena.insert(2);

        arena.retain(|_, _| true);
        assert_eq!(arena.len(), 2);

        arena.retain(|_, _| false);
        assert!(arena.is_empty());
    }
}
