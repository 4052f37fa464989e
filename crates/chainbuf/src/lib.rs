//! Chunked sequential buffers.
//!
//! A [`BufferChain`] presents an ordered list of immutable chunks as one
//! logical stream with a movable cursor. Chunks are attached and detached at
//! either end without copying, the cursor moves forward, backward, or to an
//! absolute index across chunk boundaries, and byte chains decode big-endian
//! integers and IEEE-754 floats straight out of the chunks.
//!
//! # Architecture
//!
//! - **Chunk store + cursor** (`store`): unsynchronized bookkeeping of chunks,
//!   `(chunk index, offset)` and the consumed/remaining counts
//! - **BufferChain** / **ChainGuard**: one reentrant mutex per chain; every
//!   operation locks it, and [`BufferChain::lock`] hands out a guard for
//!   compound operations
//! - **Decoding** (`decode`): multi-byte big-endian reads on
//!   [`ByteBufferChain`], built from single-byte `get`/`last`
//!
//! # Invariants
//!
//! 1. `index + remaining` equals the number of elements in the chain.
//! 2. `index` equals the length of all chunks before the cursor's chunk plus
//!    the offset within it.
//! 3. No chunk in the chain is empty.
//! 4. Every failed operation leaves the chain exactly as it was.

pub mod chain;
pub mod config;
pub mod decode;
pub mod error;
pub mod store;

pub use chain::{BufferChain, ChainGuard};
pub use config::ChainConfig;
pub use decode::ByteBufferChain;
pub use error::{ChainError, ChainResult};
pub use store::Position;
