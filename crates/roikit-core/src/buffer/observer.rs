//! Change notification for pixel buffers
//!
//! Observers are plain closures that receive the buffer after a successful
//! mutation. They run synchronously, in registration order, inside the
//! mutating call, so anything they derive from the buffer is consistent by
//! the time that call returns.

use super::PixelBuffer;

/// Callback invoked after every successful mutation.
pub type Observer = Box<dyn FnMut(&PixelBuffer)>;

/// Handle returned by [`PixelBuffer::add_observer`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

#[derive(Default)]
pub(super) struct ObserverList {
    entries: Vec<(ObserverId, Observer)>,
    next_id: u64,
}

impl ObserverList {
    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl PixelBuffer {
    /// Register an observer; it fires after every later mutation.
    pub fn add_observer<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&PixelBuffer) + 'static,
    {
        let id = ObserverId(self.observers.next_id);
        self.observers.next_id += 1;
        self.observers.entries.push((id, Box::new(observer)));
        id
    }

    /// Unregister an observer. Returns `false` if `id` was not registered.
    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.entries.len();
        self.observers.entries.retain(|(oid, _)| *oid != id);
        self.observers.entries.len() != before
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Run every observer against the current contents.
    pub(crate) fn notify(&mut self) {
        if self.observers.entries.is_empty() {
            return;
        }
        // Observers only see `&PixelBuffer`, so the list is moved out while
        // they run and merged back afterwards.
        let mut entries = std::mem::take(&mut self.observers.entries);
        for (_, observer) in entries.iter_mut() {
            observer(self);
        }
        entries.append(&mut self.observers.entries);
        self.observers.entries = entries;
    }
}
