//! The per-connection dynamic table (RFC 7541 Section 2.3.2 and Section 4).
//!
//! Entries live in a ring buffer ordered by insertion. Logical index 1 is the
//! newest entry. Every insertion gets a sequence number, and the lookup maps
//! store the sequence of the newest entry for each name and each name/value
//! pair, so content lookups never scan the ring. Since eviction always takes
//! the oldest entry, an evicted entry can only be the one a map points at if
//! no newer duplicate remains.

use std::collections::HashMap;

use bytes::Bytes;
use tracing::trace;

use crate::field::HeaderField;

/// Ring slots allocated on the first insertion.
const INITIAL_SLOTS: usize = 8;

/// How entries are evicted to make room for a new one.
///
/// Eviction always proceeds from the oldest end. Only [`EvictionPolicy::Fifo`]
/// matches RFC 7541; any other policy changes which entries survive and must
/// be used by both peers or not at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EvictionPolicy {
    /// Evict one oldest entry at a time until the new entry fits.
    #[default]
    Fifo,
    /// Evict `overflow / average_entry_size + 1` oldest entries per round.
    Batched { average_entry_size: usize },
}

impl EvictionPolicy {
    /// True while `size + incoming` does not fit in `capacity`.
    pub fn should_evict(&self, size: usize, incoming: usize, capacity: usize) -> bool {
        size + incoming > capacity
    }

    /// How many entries to evict in the next round.
    pub fn entries_to_evict(&self, size: usize, incoming: usize, capacity: usize) -> usize {
        if !self.should_evict(size, incoming, capacity) {
            return 0;
        }
        match *self {
            EvictionPolicy::Fifo => 1,
            EvictionPolicy::Batched { average_entry_size } => {
                let overflow = size + incoming - capacity;
                overflow / average_entry_size.max(1) + 1
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EvictionPolicy::Fifo => "FIFO",
            EvictionPolicy::Batched { .. } => "batched",
        }
    }
}

#[derive(Debug, Default)]
struct NameIndex {
    latest: u64,
    values: HashMap<Bytes, u64>,
}

/// A capacity-bounded, insertion-ordered table of header fields.
#[derive(Debug)]
pub struct DynamicTable {
    slots: Vec<Option<HeaderField>>,
    /// Slot the next insertion goes to.
    head: usize,
    len: usize,
    size: usize,
    capacity: usize,
    policy: EvictionPolicy,
    /// Insertions so far; the newest entry has sequence `inserted - 1`.
    inserted: u64,
    names: HashMap<Bytes, NameIndex>,
}

impl DynamicTable {
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, EvictionPolicy::Fifo)
    }

    pub fn with_policy(capacity: usize, policy: EvictionPolicy) -> Self {
        Self {
            slots: Vec::new(),
            head: 0,
            len: 0,
            size: 0,
            capacity,
            policy,
            inserted: 0,
            names: HashMap::new(),
        }
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sum of entry sizes.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> EvictionPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: EvictionPolicy) {
        self.policy = policy;
    }

    /// Entry at logical `index` (1 = newest).
    pub fn get(&self, index: usize) -> Option<&HeaderField> {
        if index == 0 || index > self.len {
            return None;
        }
        let slot = (self.head + self.slots.len() - index) % self.slots.len();
        self.slots[slot].as_ref()
    }

    /// Entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &HeaderField> + '_ {
        (1..=self.len).filter_map(move |i| self.get(i))
    }

    /// Index of the newest entry named `name`.
    pub fn find_name(&self, name: &[u8]) -> Option<usize> {
        self.names.get(name).map(|n| self.index_of(n.latest))
    }

    /// Index of the newest entry equal to `name: value`.
    pub fn find(&self, name: &[u8], value: &[u8]) -> Option<usize> {
        let seq = *self.names.get(name)?.values.get(value)?;
        Some(self.index_of(seq))
    }

    /// Inserts `field` as the newest entry, evicting as the policy decides.
    ///
    /// A field larger than the whole capacity empties the table and is not
    /// inserted.
    pub fn add(&mut self, field: HeaderField) {
        let entry_size = field.size();
        if entry_size > self.capacity {
            trace!(entry_size, capacity = self.capacity, "entry larger than table, clearing");
            self.clear();
            return;
        }

        while self.policy.should_evict(self.size, entry_size, self.capacity) {
            let n = self.policy.entries_to_evict(self.size, entry_size, self.capacity);
            for _ in 0..n {
                if self.remove().is_none() {
                    break;
                }
            }
        }

        if self.len == self.slots.len() {
            self.grow();
        }

        let seq = self.inserted;
        self.inserted += 1;
        let index = self.names.entry(field.name.clone()).or_default();
        index.latest = seq;
        index.values.insert(field.value.clone(), seq);

        self.size += entry_size;
        trace!(size = self.size, capacity = self.capacity, "inserted {}", field);
        self.slots[self.head] = Some(field);
        self.head = (self.head + 1) % self.slots.len();
        self.len += 1;
    }

    /// Removes and returns the oldest entry.
    pub fn remove(&mut self) -> Option<HeaderField> {
        if self.len == 0 {
            return None;
        }
        let tail = (self.head + self.slots.len() - self.len) % self.slots.len();
        let field = self.slots[tail].take()?;
        let seq = self.inserted - self.len as u64;
        self.len -= 1;
        self.size -= field.size();
        self.unindex(&field, seq);
        trace!(size = self.size, capacity = self.capacity, "evicted {}", field);
        Some(field)
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.len = 0;
        self.size = 0;
        self.names.clear();
    }

    /// Changes the capacity, evicting oldest entries until the table fits.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.size > capacity {
            if self.remove().is_none() {
                break;
            }
        }
    }

    fn index_of(&self, seq: u64) -> usize {
        (self.inserted - seq) as usize
    }

    fn unindex(&mut self, field: &HeaderField, seq: u64) {
        let Some(index) = self.names.get_mut(&field.name[..]) else {
            return;
        };
        if index.values.get(&field.value[..]) == Some(&seq) {
            index.values.remove(&field.value[..]);
        }
        if index.latest == seq {
            self.names.remove(&field.name[..]);
        }
    }

    /// Doubles the ring, laying entries out oldest first from slot 0.
    fn grow(&mut self) {
        let old_len = self.slots.len();
        let new_len = (old_len * 2).max(INITIAL_SLOTS);
        let mut slots = Vec::with_capacity(new_len);
        for i in 0..self.len {
            let slot = (self.head + old_len - self.len + i) % old_len;
            slots.push(self.slots[slot].take());
        }
        slots.resize_with(new_len, || None);
        self.slots = slots;
        self.head = self.len;
    }
}
