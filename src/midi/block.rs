use super::MidiEvent;

/// An event together with its block-local sequence index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencedEvent {
    pub index: u32,
    pub event: MidiEvent,
}

/// Fixed-capacity, ordered sequence of events for one processing block.
///
/// Storage is reserved up front; `push` never reallocates. Events pushed
/// into a full block are dropped and the overflow flag is raised.
#[derive(Debug, Clone)]
pub struct MidiBlock {
    events: Vec<SequencedEvent>,
    capacity: usize,
    next_index: u32,
    overflowed: bool,
}

impl MidiBlock {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            events: Vec::with_capacity(capacity),
            capacity,
            next_index: 0,
            overflowed: false,
        }
    }

    /// Remove all events and restart sequencing at 0.
    #[inline]
    pub fn clear(&mut self) {
        self.events.clear();
        self.next_index = 0;
        self.overflowed = false;
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.events.len() >= self.capacity
    }

    /// Returns true if any push failed since the last clear.
    #[inline]
    pub fn has_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Append an event at the next sequence index.
    ///
    /// Returns `false` (and records the overflow) when the block is full.
    #[inline]
    pub fn push(&mut self, event: MidiEvent) -> bool {
        if self.is_full() {
            self.overflowed = true;
            return false;
        }
        self.events.push(SequencedEvent {
            index: self.next_index,
            event,
        });
        self.next_index += 1;
        true
    }

    /// Events with their sequence indices, in order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &SequencedEvent> {
        self.events.iter()
    }

    /// Events in order, without indices.
    #[inline]
    pub fn events(&self) -> impl Iterator<Item = &MidiEvent> {
        self.events.iter().map(|sequenced| &sequenced.event)
    }

    #[inline]
    pub fn as_slice(&self) -> &[SequencedEvent] {
        &self.events
    }
}

impl Default for MidiBlock {
    fn default() -> Self {
        Self::with_capacity(crate::processor::DEFAULT_MAX_BLOCK_EVENTS * 2)
    }
}
