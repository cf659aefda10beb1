//! Sequence-numbered ring store with cursor-based readers.
//!
//! The store never rejects a producer. Staleness is the reader's problem and
//! is detected from sequence arithmetic alone: `head - seq > capacity` means
//! the slot for `seq` has been clobbered at least once.
//!
//! Slots are pre-allocated at construction and only ever overwritten. Each
//! slot remembers the sequence that wrote it, so a reader racing a producer
//! that laps it between the head check and the slot read still reports
//! `Overrun` instead of returning a newer event.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::error::BusError;

struct Slot<T> {
    seq: u64,
    item: T,
}

pub struct RingBuffer<T> {
    slots: Box<[Mutex<Option<Slot<T>>>]>,
    capacity: u64,
    head: AtomicU64,
    // Serializes sequence assignment: one writer at a time.
    writer: Mutex<()>,
}

impl<T> RingBuffer<T> {
    /// # Panics
    /// If `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring capacity must be non-zero");
        let slots = (0..capacity).map(|_| Mutex::new(None)).collect();
        Self {
            slots,
            capacity: capacity as u64,
            head: AtomicU64::new(0),
            writer: Mutex::new(()),
        }
    }

    /// Convenience for the common case of a store shared with readers.
    pub fn shared(capacity: usize) -> Arc<Self> {
        Arc::new(Self::new(capacity))
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Number of items ever published, i.e. the next sequence to assign.
    pub fn head(&self) -> u64 {
        self.head.load(Ordering::Acquire)
    }

    /// Store the item, then make it visible by advancing head.
    pub fn publish(&self, item: T) -> u64 {
        let _writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
        let seq = self.head.load(Ordering::Relaxed);
        {
            let mut slot = self.slot(seq).lock().unwrap_or_else(|e| e.into_inner());
            *slot = Some(Slot { seq, item });
        }
        self.head.store(seq + 1, Ordering::Release);
        seq
    }

    fn slot(&self, seq: u64) -> &Mutex<Option<Slot<T>>> {
        &self.slots[(seq % self.capacity) as usize]
    }
}

impl<T: Clone> RingBuffer<T> {
    pub fn get(&self, seq: u64) -> Result<T, BusError> {
        let head = self.head();
        if seq >= head {
            return Err(BusError::InvalidSequence { seq, head });
        }
        if head - seq > self.capacity {
            return Err(BusError::Overrun { seq, head, capacity: self.capacity });
        }
        let slot = self.slot(seq).lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some(s) if s.seq == seq => Ok(s.item.clone()),
            _ => Err(BusError::Overrun { seq, head: self.head(), capacity: self.capacity }),
        }
    }
}

impl<T> std::fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .field("head", &self.head())
            .finish()
    }
}

/// One consumer's private cursor into a shared [`RingBuffer`].
#[derive(Debug)]
pub struct Reader<T> {
    bus: Arc<RingBuffer<T>>,
    cursor: u64,
}

impl<T> Reader<T> {
    /// Late joiners start at the current head and never see older events.
    pub fn new(bus: &Arc<RingBuffer<T>>) -> Self {
        Self { bus: Arc::clone(bus), cursor: bus.head() }
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn available(&self) -> u64 {
        self.bus.head().saturating_sub(self.cursor)
    }

    /// Jump to head, dropping unread backlog. The only way out of an overrun.
    pub fn reset_to_head(&mut self) {
        self.cursor = self.bus.head();
    }

    pub fn bus(&self) -> &Arc<RingBuffer<T>> {
        &self.bus
    }
}

impl<T: Clone> Reader<T> {
    /// `Ok(None)` when caught up. On `Overrun` the cursor stays where it was.
    pub fn poll(&mut self) -> Result<Option<T>, BusError> {
        if self.cursor >= self.bus.head() {
            return Ok(None);
        }
        let item = self.bus.get(self.cursor)?;
        self.cursor += 1;
        Ok(Some(item))
    }
}
