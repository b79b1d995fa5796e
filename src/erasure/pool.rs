use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, PoisonError};

/// Fixed-length scratch vectors shared across concurrent callers.
///
/// A checked-out buffer goes back to the pool when its guard drops.
#[derive(Debug)]
pub(crate) struct ScratchPool<T> {
    buffer_len: usize,
    free: Mutex<Vec<Vec<T>>>,
}

impl<T: Clone + Default> ScratchPool<T> {
    pub(crate) fn new(buffer_len: usize) -> Self {
        ScratchPool {
            buffer_len,
            free: Mutex::new(Vec::new()),
        }
    }

    /// A buffer of `buffer_len` default values.
    pub(crate) fn checkout(&self) -> PooledBuffer<'_, T> {
        // a panic while holding the lock leaves the free list intact
        let reused = self.free.lock().unwrap_or_else(PoisonError::into_inner).pop();
        let mut buffer = reused.unwrap_or_else(|| Vec::with_capacity(self.buffer_len));
        buffer.clear();
        buffer.resize(self.buffer_len, T::default());
        PooledBuffer { pool: self, buffer }
    }

    #[cfg(test)]
    fn num_free(&self) -> usize {
        self.free.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

pub(crate) struct PooledBuffer<'a, T> {
    pool: &'a ScratchPool<T>,
    buffer: Vec<T>,
}

impl<T> Deref for PooledBuffer<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.buffer
    }
}

impl<T> DerefMut for PooledBuffer<'_, T> {
    fn deref_mut(&mut self) -> &mut [T] {
        &mut self.buffer
    }
}

impl<T> Drop for PooledBuffer<'_, T> {
    fn drop(&mut self) {
        let buffer = std::mem::take(&mut self.buffer);
        self.pool
            .free
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(buffer);
    }
}
