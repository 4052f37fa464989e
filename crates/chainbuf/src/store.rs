use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{ChainError, ChainResult};

/// Snapshot of a chain cursor.
///
/// `index + remaining` always equals the total number of elements in the
/// chain at the moment the snapshot was taken.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Index of the chunk holding the next element read forward.
    pub chunk_index: usize,
    /// Offset of the next element within that chunk.
    pub offset: usize,
    /// Elements behind the cursor.
    pub index: usize,
    /// Elements ahead of the cursor.
    pub remaining: usize,
}

/// Chunk store plus cursor: the unsynchronized core of a buffer chain.
///
/// The cursor is kept canonical: `offset < chunks[chunk_index].len()`, except
/// for the end sentinel `chunk_index == chunks.len()` with `offset == 0`.
#[derive(Debug)]
pub(crate) struct ChainState<T> {
    chunks: VecDeque<Arc<[T]>>,
    chunk_index: usize,
    offset: usize,
    /// Elements behind the cursor.
    before: usize,
    /// Elements ahead of the cursor.
    after: usize,
}

impl<T> ChainState<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            chunks: VecDeque::with_capacity(capacity),
            chunk_index: 0,
            offset: 0,
            before: 0,
            after: 0,
        }
    }

    pub(crate) fn position(&self) -> Position {
        Position {
            chunk_index: self.chunk_index,
            offset: self.offset,
            index: self.before,
            remaining: self.after,
        }
    }

    pub(crate) fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.before + self.after
    }

    /// Prepend a chunk as already-consumed history. Returns `false` for an
    /// empty chunk, which is discarded.
    pub(crate) fn push_front(&mut self, chunk: Arc<[T]>) -> bool {
        if chunk.is_empty() {
            return false;
        }
        self.before += chunk.len();
        self.chunk_index += 1;
        self.chunks.push_front(chunk);
        true
    }

    /// Append a chunk as unread data. Returns `false` for an empty chunk,
    /// which is discarded.
    pub(crate) fn push_back(&mut self, chunk: Arc<[T]>) -> bool {
        if chunk.is_empty() {
            return false;
        }
        self.after += chunk.len();
        self.chunks.push_back(chunk);
        true
    }

    /// Drop the first chunk if it lies entirely behind the cursor.
    pub(crate) fn pop_front(&mut self) -> Option<Arc<[T]>> {
        if self.chunk_index == 0 {
            return None;
        }
        let chunk = self.chunks.pop_front()?;
        self.before -= chunk.len();
        self.chunk_index -= 1;
        Some(chunk)
    }

    /// Drop the last chunk if none of it has been consumed.
    pub(crate) fn pop_back(&mut self) -> Option<Arc<[T]>> {
        let last = self.chunks.len().checked_sub(1)?;
        if self.chunk_index > last || (self.chunk_index == last && self.offset > 0) {
            return None;
        }
        let chunk = self.chunks.pop_back()?;
        self.after -= chunk.len();
        Some(chunk)
    }

    /// Move the cursor by `delta` elements. Out-of-range moves leave the
    /// cursor untouched and return `false`.
    pub(crate) fn skip(&mut self, delta: isize) -> bool {
        let distance = delta.unsigned_abs();
        if delta >= 0 {
            self.advance(distance)
        } else {
            self.retreat(distance)
        }
    }

    /// Move the cursor to an absolute element index.
    pub(crate) fn go_to(&mut self, index: usize) -> bool {
        if index >= self.before {
            self.advance(index - self.before)
        } else {
            self.retreat(self.before - index)
        }
    }

    /// First chunk of the chain, if any.
    pub(crate) fn front_chunk(&self) -> Option<Arc<[T]>> {
        self.chunks.front().cloned()
    }

    /// Last chunk of the chain, if any.
    pub(crate) fn back_chunk(&self) -> Option<Arc<[T]>> {
        self.chunks.back().cloned()
    }

    /// Step forward over the element under the cursor.
    ///
    /// Returns the chunk holding that element and its offset in the chunk, so
    /// the caller can clone the element after releasing the state.
    pub(crate) fn read_forward(&mut self) -> ChainResult<(Arc<[T]>, usize)> {
        if self.after == 0 {
            return Err(ChainError::Underflow {
                required: 1,
                remaining: 0,
            });
        }
        let chunk = Arc::clone(&self.chunks[self.chunk_index]);
        let at = self.offset;
        self.offset += 1;
        if self.offset == chunk.len() {
            self.offset = 0;
            self.chunk_index += 1;
        }
        self.before += 1;
        self.after -= 1;
        Ok((chunk, at))
    }

    /// Step back over the element behind the cursor; returns it as
    /// [`read_forward`](Self::read_forward) does.
    pub(crate) fn read_back(&mut self) -> ChainResult<(Arc<[T]>, usize)> {
        if self.before == 0 {
            return Err(ChainError::BackUnderflow {
                required: 1,
                available: 0,
            });
        }
        if self.offset == 0 {
            self.chunk_index -= 1;
            self.offset = self.chunks[self.chunk_index].len() - 1;
        } else {
            self.offset -= 1;
        }
        self.before -= 1;
        self.after += 1;
        Ok((Arc::clone(&self.chunks[self.chunk_index]), self.offset))
    }

    fn advance(&mut self, distance: usize) -> bool {
        if distance > self.after {
            return false;
        }
        let mut chunk_index = self.chunk_index;
        let mut offset = self.offset + distance;
        while chunk_index < self.chunks.len() && offset >= self.chunks[chunk_index].len() {
            offset -= self.chunks[chunk_index].len();
            chunk_index += 1;
        }
        debug_assert!(chunk_index < self.chunks.len() || offset == 0);

        self.chunk_index = chunk_index;
        self.offset = offset;
        self.before += distance;
        self.after -= distance;
        true
    }

    fn retreat(&mut self, distance: usize) -> bool {
        if distance > self.before {
            return false;
        }
        let mut chunk_index = self.chunk_index;
        let offset = if distance <= self.offset {
            self.offset - distance
        } else {
            let mut pending = distance - self.offset;
            loop {
                chunk_index -= 1;
                let len = self.chunks[chunk_index].len();
                if pending <= len {
                    break len - pending;
                }
                pending -= len;
            }
        };

        self.chunk_index = chunk_index;
        self.offset = offset;
        self.before -= distance;
        self.after += distance;
        true
    }
}
