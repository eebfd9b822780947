//! Bounded FIFO used on every response path.
//!
//! The queue models a small hardware FIFO with explicit backpressure:
//! 1. **Capacity:** Fixed at construction; `push` hands the item back when full.
//! 2. **Ordering:** Strict first-in first-out.
//! 3. **Storage:** A ring of slots with head/tail indices, no reallocation after construction.

/// Fixed-capacity ring buffer with "not ready" semantics on overflow.
#[derive(Clone, Debug)]
pub struct BoundedQueue<T> {
    slots: Vec<Option<T>>,
    /// Index of the oldest entry.
    head: usize,
    /// Index where the next entry will be written.
    tail: usize,
    /// Number of occupied slots.
    count: usize,
}

impl<T> BoundedQueue<T> {
    /// Creates an empty queue holding at most `capacity` items.
    ///
    /// A zero capacity is raised to one so the queue can always make progress.
    pub fn new(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity.max(1));
        slots.resize_with(capacity.max(1), || None);
        Self {
            slots,
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Returns the capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of queued items.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if nothing is queued.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns true if no further item can be accepted.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.count == self.slots.len()
    }

    /// Enqueues `item`, or returns it unchanged if the queue is full.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        self.slots[self.tail] = Some(item);
        self.tail = (self.tail + 1) % self.slots.len();
        self.count += 1;
        Ok(())
    }

    /// Dequeues the oldest item.
    pub fn pop(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let item = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.count -= 1;
        item
    }

    /// Returns the oldest item without removing it.
    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            None
        } else {
            self.slots[self.head].as_ref()
        }
    }
}
