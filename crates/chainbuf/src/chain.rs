use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::Arc;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use tracing::{debug, trace};

use crate::config::ChainConfig;
use crate::error::ChainResult;
use crate::store::{ChainState, Position};

/// State shared by every holder of the chain lock.
struct Shared<T> {
    state: RefCell<ChainState<T>>,
    /// Acquisitions held through [`ChainGuard`] by the owning thread.
    holds: Cell<usize>,
}

/// A logical stream formed by concatenating immutable chunks, read through a
/// bidirectional cursor.
///
/// Chunks can be added or removed at either end; nothing is ever copied into
/// a contiguous array. All state sits behind one reentrant mutex per chain.
/// Every operation acquires it for its full duration, and [`lock`] exposes
/// it so a caller can run several operations as one atomic unit:
///
/// ```
/// use chainbuf::BufferChain;
///
/// let chain: BufferChain<u8> = BufferChain::new([vec![1u8, 2], vec![3]]);
/// let guard = chain.lock();
/// let first = guard.get().unwrap();
/// let second = chain.get().unwrap(); // reentrant: same thread, same lock
/// guard.unlock();
/// assert_eq!((first, second), (1, 2));
/// ```
///
/// # Cursor rules
///
/// - Chunks prepended with [`add_start`](Self::add_start) count as consumed
///   history; chunks appended with [`add_end`](Self::add_end) are unread.
/// - A chunk can only be removed from the front once the cursor has moved
///   past it, and from the back while none of it has been read.
/// - Failed seeks and removals return `false` and change nothing.
///
/// [`lock`]: Self::lock
pub struct BufferChain<T> {
    label: String,
    inner: ReentrantMutex<Shared<T>>,
}

impl<T> BufferChain<T> {
    /// Build a chain from an ordered list of chunks. Empty chunks are dropped.
    pub fn new<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Arc<[T]>>,
    {
        Self::with_config(ChainConfig::default(), chunks)
    }

    /// Build a chain with an explicit configuration.
    pub fn with_config<I, C>(config: ChainConfig, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Arc<[T]>>,
    {
        let mut state = ChainState::with_capacity(config.chunk_capacity);
        for chunk in chunks {
            state.push_back(chunk.into());
        }
        trace!(
            chain = %config.label,
            chunks = state.chunk_count(),
            len = state.len(),
            "buffer chain created"
        );
        Self {
            label: config.label,
            inner: ReentrantMutex::new(Shared {
                state: RefCell::new(state),
                holds: Cell::new(0),
            }),
        }
    }

    /// The label attached to this chain's tracing events.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Acquire the chain lock, blocking until it is available.
    ///
    /// The lock is reentrant: the owning thread may call `lock` (or any other
    /// chain operation) again while holding a guard. Other threads block until
    /// every guard held by the owner has been dropped.
    pub fn lock(&self) -> ChainGuard<'_, T> {
        let guard = self.inner.lock();
        guard.holds.set(guard.holds.get() + 1);
        ChainGuard { chain: self, guard }
    }

    /// Number of [`ChainGuard`]s the calling thread currently holds on this
    /// chain. Returns `0` when another thread owns the lock.
    pub fn hold_count(&self) -> usize {
        self.inner
            .try_lock()
            .map(|shared| shared.holds.get())
            .unwrap_or(0)
    }

    /// Prepend a chunk. See [`ChainGuard::add_start`].
    pub fn add_start(&self, chunk: impl Into<Arc<[T]>>) {
        self.lock().add_start(chunk);
    }

    /// Append a chunk. See [`ChainGuard::add_end`].
    pub fn add_end(&self, chunk: impl Into<Arc<[T]>>) {
        self.lock().add_end(chunk);
    }

    /// Remove the first chunk. See [`ChainGuard::remove_start`].
    pub fn remove_start(&self) -> bool {
        self.lock().remove_start()
    }

    /// Remove the last chunk. See [`ChainGuard::remove_end`].
    pub fn remove_end(&self) -> bool {
        self.lock().remove_end()
    }

    /// Move the cursor by a signed element count. See [`ChainGuard::skip`].
    pub fn skip(&self, delta: isize) -> bool {
        self.lock().skip(delta)
    }

    /// Move the cursor to an absolute index. See [`ChainGuard::go_to`].
    pub fn go_to(&self, index: usize) -> bool {
        self.lock().go_to(index)
    }

    /// Elements behind the cursor.
    pub fn index(&self) -> usize {
        self.lock().index()
    }

    /// Elements ahead of the cursor.
    pub fn remaining(&self) -> usize {
        self.lock().remaining()
    }

    /// Index of the chunk holding the cursor.
    pub fn chunk_index(&self) -> usize {
        self.lock().chunk_index()
    }

    /// Offset of the cursor within its chunk.
    pub fn offset(&self) -> usize {
        self.lock().offset()
    }

    /// Consistent snapshot of the whole cursor.
    pub fn position(&self) -> Position {
        self.lock().position()
    }

    /// Number of chunks in the chain.
    pub fn chunk_count(&self) -> usize {
        self.lock().chunk_count()
    }

    /// Total number of elements across all chunks.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if the chain holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> BufferChain<T> {
    /// Read forward one element. See [`ChainGuard::get`].
    pub fn get(&self) -> ChainResult<T> {
        self.lock().get()
    }

    /// Read backward one element. See [`ChainGuard::last`].
    pub fn last(&self) -> ChainResult<T> {
        self.lock().last()
    }

    /// First element of the chain. See [`ChainGuard::peek_first`].
    pub fn peek_first(&self) -> Option<T> {
        self.lock().peek_first()
    }

    /// Last element of the chain. See [`ChainGuard::peek_last`].
    pub fn peek_last(&self) -> Option<T> {
        self.lock().peek_last()
    }
}

impl<T> Default for BufferChain<T> {
    fn default() -> Self {
        Self::new(std::iter::empty::<Vec<T>>())
    }
}

impl<T, C: Into<Arc<[T]>>> FromIterator<C> for BufferChain<T> {
    fn from_iter<I: IntoIterator<Item = C>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<T> fmt::Debug for BufferChain<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.lock();
        f.debug_struct("BufferChain")
            .field("label", &self.label)
            .field("chunks", &guard.chunk_count())
            .field("position", &guard.position())
            .finish()
    }
}

/// Exclusive access to a [`BufferChain`], held until dropped.
///
/// The guard carries the full operation set, so a sequence of calls made
/// through one guard is never interleaved with another thread's operations.
/// Dropping the guard (or calling [`unlock`](Self::unlock)) releases one
/// level of the reentrant lock.
pub struct ChainGuard<'a, T> {
    chain: &'a BufferChain<T>,
    guard: ReentrantMutexGuard<'a, Shared<T>>,
}

impl<T> ChainGuard<'_, T> {
    /// Release this acquisition of the lock.
    pub fn unlock(self) {}

    /// Run `f` on the state. The borrow ends when `f` returns, so `f` must
    /// not call element code such as `T::clone`, which may reenter the chain.
    fn with_state<R>(&self, f: impl FnOnce(&mut ChainState<T>) -> R) -> R {
        f(&mut *self.guard.state.borrow_mut())
    }

    pub(crate) fn label(&self) -> &str {
        &self.chain.label
    }

    /// Prepend a chunk as already-consumed history.
    ///
    /// The cursor keeps pointing at the same element, so `index` grows by the
    /// chunk's length. Empty chunks are ignored.
    pub fn add_start(&self, chunk: impl Into<Arc<[T]>>) {
        let chunk = chunk.into();
        let len = chunk.len();
        if self.with_state(|s| s.push_front(chunk)) {
            trace!(chain = %self.label(), len, "chunk added at start");
        }
    }

    /// Append a chunk as unread data. Empty chunks are ignored.
    pub fn add_end(&self, chunk: impl Into<Arc<[T]>>) {
        let chunk = chunk.into();
        let len = chunk.len();
        if self.with_state(|s| s.push_back(chunk)) {
            trace!(chain = %self.label(), len, "chunk added at end");
        }
    }

    /// Remove the first chunk, provided the cursor has moved entirely past it.
    ///
    /// Returns `false` and leaves the chain untouched otherwise.
    pub fn remove_start(&self) -> bool {
        match self.with_state(|s| s.pop_front()) {
            Some(chunk) => {
                trace!(chain = %self.label(), len = chunk.len(), "chunk removed from start");
                true
            }
            None => {
                debug!(chain = %self.label(), "start chunk still in use; not removed");
                false
            }
        }
    }

    /// Remove the last chunk, provided none of it has been read.
    ///
    /// A last chunk that holds the cursor at offset zero may be removed; the
    /// cursor then sits at the end of the chain. Returns `false` and leaves the
    /// chain untouched otherwise.
    pub fn remove_end(&self) -> bool {
        match self.with_state(|s| s.pop_back()) {
            Some(chunk) => {
                trace!(chain = %self.label(), len = chunk.len(), "chunk removed from end");
                true
            }
            None => {
                debug!(chain = %self.label(), "end chunk already read; not removed");
                false
            }
        }
    }

    /// Move the cursor forward (positive) or backward (negative) by `delta`
    /// elements, crossing as many chunk boundaries as needed.
    ///
    /// Returns `false` without moving if fewer than `|delta|` elements lie in
    /// that direction.
    pub fn skip(&self, delta: isize) -> bool {
        let moved = self.with_state(|s| s.skip(delta));
        if !moved {
            debug!(chain = %self.label(), delta, "skip out of range");
        }
        moved
    }

    /// Move the cursor to the absolute element `index`.
    ///
    /// Returns `false` without moving if `index` is past the end.
    pub fn go_to(&self, index: usize) -> bool {
        let moved = self.with_state(|s| s.go_to(index));
        if !moved {
            debug!(chain = %self.label(), index, "go_to out of range");
        }
        moved
    }

    /// Elements behind the cursor.
    pub fn index(&self) -> usize {
        self.position().index
    }

    /// Elements ahead of the cursor.
    pub fn remaining(&self) -> usize {
        self.position().remaining
    }

    /// Index of the chunk holding the cursor; equals the chunk count when the
    /// cursor sits at the end.
    pub fn chunk_index(&self) -> usize {
        self.position().chunk_index
    }

    /// Offset of the cursor within its chunk.
    pub fn offset(&self) -> usize {
        self.position().offset
    }

    /// All four cursor values, read together.
    pub fn position(&self) -> Position {
        self.with_state(|s| s.position())
    }

    /// Number of chunks in the chain.
    pub fn chunk_count(&self) -> usize {
        self.with_state(|s| s.chunk_count())
    }

    /// Total number of elements across all chunks.
    pub fn len(&self) -> usize {
        self.with_state(|s| s.len())
    }

    /// Returns `true` if the chain holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Clone> ChainGuard<'_, T> {
    /// Read the element under the cursor and advance past it.
    ///
    /// Fails with [`ChainError::Underflow`](crate::ChainError::Underflow) at
    /// the end of the chain.
    pub fn get(&self) -> ChainResult<T> {
        let (chunk, at) = self.with_state(|s| s.read_forward())?;
        Ok(chunk[at].clone())
    }

    /// Step back one element and read it.
    ///
    /// Fails with [`ChainError::BackUnderflow`](crate::ChainError::BackUnderflow)
    /// at the start of the chain.
    pub fn last(&self) -> ChainResult<T> {
        let (chunk, at) = self.with_state(|s| s.read_back())?;
        Ok(chunk[at].clone())
    }

    /// First element of the first chunk, whatever the cursor position.
    /// `None` for an empty chain.
    pub fn peek_first(&self) -> Option<T> {
        let chunk = self.with_state(|s| s.front_chunk())?;
        chunk.first().cloned()
    }

    /// Last element of the last chunk, whatever the cursor position.
    /// `None` for an empty chain.
    pub fn peek_last(&self) -> Option<T> {
        let chunk = self.with_state(|s| s.back_chunk())?;
        chunk.last().cloned()
    }
}

impl<T> Drop for ChainGuard<'_, T> {
    fn drop(&mut self) {
        self.guard.holds.set(self.guard.holds.get() - 1);
    }
}
