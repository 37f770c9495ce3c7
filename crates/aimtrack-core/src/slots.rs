//! Stable-index registry for live tracked devices.
//!
//! A plain arena with a FIFO free list: an occupied index stays valid until it
//! is freed, freed indices are handed out again in the order they were freed,
//! and the backing store only grows. Expected live sets are a handful of
//! devices, so there is no compaction and no generation counter.

use std::collections::VecDeque;

/// Errors returned by [`SlotRegistry`] on index misuse.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    #[error("slot index {index} out of range (registry size {len})")]
    OutOfRange { index: usize, len: usize },
}

#[derive(Clone, Debug)]
pub struct SlotRegistry<T> {
    slots: Vec<Option<T>>,
    freed: VecDeque<usize>,
}

impl<T> Default for SlotRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SlotRegistry<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            freed: VecDeque::new(),
        }
    }

    /// Store `item` and return its index, reusing the oldest freed slot first.
    pub fn allocate(&mut self, item: T) -> usize {
        if let Some(index) = self.freed.pop_front() {
            self.slots[index] = Some(item);
            index
        } else {
            self.slots.push(Some(item));
            self.slots.len() - 1
        }
    }

    /// Release the slot at `index`. Freeing an already free slot is a no-op.
    pub fn free(&mut self, index: usize) -> Result<(), SlotError> {
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(SlotError::OutOfRange { index, len })?;
        if slot.take().is_some() {
            self.freed.push_back(index);
        }
        Ok(())
    }

    /// `Ok(None)` for a slot that was allocated once and is currently free.
    pub fn get(&self, index: usize) -> Result<Option<&T>, SlotError> {
        self.slots
            .get(index)
            .map(Option::as_ref)
            .ok_or(SlotError::OutOfRange {
                index,
                len: self.slots.len(),
            })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<Option<&mut T>, SlotError> {
        let len = self.slots.len();
        self.slots
            .get_mut(index)
            .map(Option::as_mut)
            .ok_or(SlotError::OutOfRange { index, len })
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.len() - self.freed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the backing store; indices at or above this are out of range.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.freed.clear();
    }

    /// Occupied slots as `(index, item)`, ascending by index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|item| (i, item)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut T)> + '_ {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|item| (i, item)))
    }

    pub fn find<P>(&self, mut pred: P) -> Option<&T>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().map(|(_, item)| item).find(|item| pred(*item))
    }

    pub fn find_index<P>(&self, mut pred: P) -> Option<usize>
    where
        P: FnMut(&T) -> bool,
    {
        self.iter().find(|&(_, item)| pred(item)).map(|(i, _)| i)
    }

    /// Free every occupied slot matching `pred`; returns how many were freed.
    pub fn remove_where<P>(&mut self, mut pred: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let mut removed = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.as_ref().is_some_and(&mut pred) {
                *slot = None;
                self.freed.push_back(index);
                removed += 1;
            }
        }
        removed
    }
}

impl<T: PartialEq> SlotRegistry<T> {
    /// Free the first occupied slot equal to `item`.
    pub fn remove(&mut self, item: &T) -> bool {
        match self.find_index(|x| x == item) {
            Some(index) => {
                if let Some(slot) = self.slots.get_mut(index) {
                    *slot = None;
                    self.freed.push_back(index);
                }
                true
            }
            None => false,
        }
    }
}

impl<'a, T> IntoIterator for &'a SlotRegistry<T> {
    type Item = (usize, &'a T);
    type IntoIter = Box<dyn Iterator<Item = (usize, &'a T)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}
