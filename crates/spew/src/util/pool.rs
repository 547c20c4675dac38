//! Bounded pools of reusable scratch objects.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

/// Scratch state that can be cleared for reuse.
pub trait Reset: Default {
    /// Clears the object so it behaves like a fresh one.
    fn reset(&mut self);

    /// Returns false if the object grew too large to keep around.
    fn reusable(&self) -> bool {
        true
    }
}

impl Reset for String {
    fn reset(&mut self) {
        self.clear();
    }

    fn reusable(&self) -> bool {
        self.capacity() <= 64 * 1024
    }
}

/// A thread-safe pool holding at most `max` idle objects.
///
/// Objects are reset on acquisition and returned automatically when the
/// [`Pooled`] guard drops.
pub struct Pool<T> {
    idle: Mutex<Vec<T>>,
    max: usize,
}

impl<T: Reset> Pool<T> {
    /// Creates an empty pool.
    pub const fn new(max: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max,
        }
    }

    /// Takes an idle object or creates a new one.
    pub fn acquire(&self) -> Pooled<'_, T> {
        let reused = self
            .idle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop();
        let mut item = reused.unwrap_or_default();
        item.reset();
        Pooled { pool: self, item }
    }

    /// Number of idle objects.
    pub fn idle(&self) -> usize {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn release(&self, item: T) {
        if !item.reusable() {
            return;
        }
        let mut idle = self.idle.lock().unwrap_or_else(PoisonError::into_inner);
        if idle.len() < self.max {
            idle.push(item);
        }
    }
}

/// An object borrowed from a [`Pool`].
pub struct Pooled<'p, T: Reset> {
    pool: &'p Pool<T>,
    item: T,
}

impl<T: Reset> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.item
    }
}

impl<T: Reset> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.item
    }
}

impl<T: Reset> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.item));
    }
}
