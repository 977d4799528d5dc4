use parking_lot::Mutex;
use std::collections::VecDeque;
use std::num::NonZeroUsize;

/// Fixed-capacity FIFO. Both ends fail fast: a full buffer rejects `offer`,
/// an empty one returns `None` from `poll`. Nothing ever waits.
#[derive(Debug)]
pub struct BoundedBuffer<T> {
    items: Mutex<VecDeque<T>>,
    capacity: NonZeroUsize,
}

impl<T> BoundedBuffer<T> {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self { items: Mutex::new(VecDeque::with_capacity(capacity.get())), capacity }
    }

    /// Appends `item`, or hands it back when the buffer is full.
    pub fn offer(&self, item: T) -> Result<(), T> {
        let mut items = self.items.lock();
        if items.len() >= self.capacity.get() {
            return Err(item);
        }
        items.push_back(item);
        Ok(())
    }

    pub fn poll(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    pub fn size(&self) -> usize {
        self.items.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity.get()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}
