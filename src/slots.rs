//! Generational slot storage.
//!
//! Backs every stable handle the crate hands out ([`SubscriberArena`],
//! scheduler task ids). A slot's generation is bumped on removal, so every
//! handle minted before the removal goes stale at once; freed slots are
//! recycled through a free list.
//!
//! [`SubscriberArena`]: crate::SubscriberArena

/// Opaque handle into a [`Slots`] store.
///
/// A key is live only while the slot it points at still carries the
/// generation it was minted with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Key {
    index: u32,
    generation: u32,
}

struct Entry<T> {
    generation: u32,
    value: Option<T>,
}

/// Vec-backed slot map with generation-checked access.
pub(crate) struct Slots<T> {
    entries: Vec<Entry<T>>,
    free: Vec<u32>,
    len: usize,
}

impl<T> Default for Slots<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }
}

impl<T> Slots<T> {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Stores `value` and returns a key carrying the slot's current generation.
    pub(crate) fn insert(&mut self, value: T) -> Key {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let entry = &mut self.entries[index as usize];
            entry.value = Some(value);
            Key {
                index,
                generation: entry.generation,
            }
        } else {
            let index = self.entries.len() as u32;
            self.entries.push(Entry {
                generation: 0,
                value: Some(value),
            });
            Key {
                index,
                generation: 0,
            }
        }
    }

    /// Frees the slot and bumps its generation, invalidating every
    /// outstanding key for it. Stale keys return `None`.
    pub(crate) fn remove(&mut self, key: Key) -> Option<T> {
        let entry = self.entries.get_mut(key.index as usize)?;
        if entry.generation != key.generation || entry.value.is_none() {
            return None;
        }
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(key.index);
        self.len -= 1;
        entry.value.take()
    }

    pub(crate) fn get(&self, key: Key) -> Option<&T> {
        let entry = self.entries.get(key.index as usize)?;
        if entry.generation != key.generation {
            return None;
        }
        entry.value.as_ref()
    }

    pub(crate) fn get_mut(&mut self, key: Key) -> Option<&mut T> {
        let entry = self.entries.get_mut(key.index as usize)?;
        if entry.generation != key.generation {
            return None;
        }
        entry.value.as_mut()
    }

    pub(crate) fn contains(&self, key: Key) -> bool {
        self.get(key).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_then_get_returns_value() {
        let mut slots = Slots::new();
        let key = slots.insert("alpha");
        assert_eq!(slots.get(key), Some(&"alpha"));
        assert_eq!(slots.len(), 1);
    }

    #[test]
    fn test_removed_key_goes_stale() {
        let mut slots = Slots::new();
        let key = slots.insert(7);
        assert_eq!(slots.remove(key), Some(7));
        assert!(slots.get(key).is_none(), "stale key must not resolve");
        assert!(slots.remove(key).is_none(), "double remove must be a no-op");
        assert!(slots.is_empty());
    }

    #[test]
    fn test_reused_slot_does_not_revive_old_key() {
        let mut slots = Slots::new();
        let old = slots.insert(1);
        slots.remove(old);

        let new = slots.insert(2);
        assert_ne!(old, new, "recycled slot must mint a distinct key");
        assert!(slots.get(old).is_none(), "old key must stay stale after reuse");
        assert_eq!(slots.get(new), Some(&2));
    }

    #[test]
    fn test_len_tracks_occupancy_across_reuse() {
        let mut slots = Slots::new();
        let a = slots.insert("a");
        let b = slots.insert("b");
        assert_eq!(slots.len(), 2);

        slots.remove(a);
        assert_eq!(slots.len(), 1);

        slots.insert("c");
        assert_eq!(slots.len(), 2);
        assert!(slots.contains(b));
    }

    #[test]
    fn test_get_mut_allows_in_place_update() {
        let mut slots = Slots::new();
        let key = slots.insert(vec![1, 2]);
        if let Some(value) = slots.get_mut(key) {
            value.push(3);
        }
        assert_eq!(slots.get(key), Some(&vec![1, 2, 3]));
    }
}
