//! Big-endian numeric decoding for byte chains.
//!
//! Values are assembled one byte at a time from [`ChainGuard::get`] and
//! [`ChainGuard::last`] while the chain lock is held, so a read never sees
//! chunks being added or removed halfway through.
//!
//! Forward reads take bytes in storage order, first byte most significant.
//! Backward reads take bytes in reverse; the byte nearest the cursor is least
//! significant. Reading a value forward and then the same width backward
//! therefore returns the same value and restores the cursor.
//!
//! Both directions check the available length first and fail without
//! consuming anything when the value does not fit.

use tracing::debug;

use crate::chain::{BufferChain, ChainGuard};
use crate::error::{ChainError, ChainResult};

/// A buffer chain of raw bytes.
pub type ByteBufferChain = BufferChain<u8>;

impl ChainGuard<'_, u8> {
    fn ensure_length(&self, required: usize) -> ChainResult<()> {
        let remaining = self.remaining();
        if required > remaining {
            debug!(chain = %self.label(), required, remaining, "forward decode underflow");
            return Err(ChainError::Underflow { required, remaining });
        }
        Ok(())
    }

    fn ensure_back_length(&self, required: usize) -> ChainResult<()> {
        let available = self.index();
        if required > available {
            debug!(chain = %self.label(), required, available, "backward decode underflow");
            return Err(ChainError::BackUnderflow { required, available });
        }
        Ok(())
    }

    fn read_be(&self, width: usize) -> ChainResult<u64> {
        self.ensure_length(width)?;
        let mut value = 0u64;
        for _ in 0..width {
            value = (value << 8) | u64::from(self.get()?);
        }
        Ok(value)
    }

    fn read_back_be(&self, width: usize) -> ChainResult<u64> {
        self.ensure_back_length(width)?;
        let mut value = 0u64;
        for shift in 0..width {
            value |= u64::from(self.last()?) << (8 * shift);
        }
        Ok(value)
    }

    /// Read a big-endian `u16` (a UTF-16 code unit on the wire).
    pub fn get_u16(&self) -> ChainResult<u16> {
        self.read_be(2).map(|v| v as u16)
    }

    /// Read a big-endian `i16`.
    pub fn get_i16(&self) -> ChainResult<i16> {
        self.get_u16().map(|v| v as i16)
    }

    /// Read a big-endian `u32`.
    pub fn get_u32(&self) -> ChainResult<u32> {
        self.read_be(4).map(|v| v as u32)
    }

    /// Read a big-endian `i32`.
    pub fn get_i32(&self) -> ChainResult<i32> {
        self.get_u32().map(|v| v as i32)
    }

    /// Read a big-endian `u64`.
    pub fn get_u64(&self) -> ChainResult<u64> {
        self.read_be(8)
    }

    /// Read a big-endian `i64`.
    pub fn get_i64(&self) -> ChainResult<i64> {
        self.get_u64().map(|v| v as i64)
    }

    /// Read an IEEE-754 binary32 from its big-endian bit pattern.
    pub fn get_f32(&self) -> ChainResult<f32> {
        self.get_u32().map(f32::from_bits)
    }

    /// Read an IEEE-754 binary64 from its big-endian bit pattern.
    pub fn get_f64(&self) -> ChainResult<f64> {
        self.get_u64().map(f64::from_bits)
    }

    /// Read backward the `u16` that ends at the cursor.
    pub fn last_u16(&self) -> ChainResult<u16> {
        self.read_back_be(2).map(|v| v as u16)
    }

    /// Read backward the `i16` that ends at the cursor.
    pub fn last_i16(&self) -> ChainResult<i16> {
        self.last_u16().map(|v| v as i16)
    }

    /// Read backward the `u32` that ends at the cursor.
    pub fn last_u32(&self) -> ChainResult<u32> {
        self.read_back_be(4).map(|v| v as u32)
    }

    /// Read backward the `i32` that ends at the cursor.
    pub fn last_i32(&self) -> ChainResult<i32> {
        self.last_u32().map(|v| v as i32)
    }

    /// Read backward the `u64` that ends at the cursor.
    pub fn last_u64(&self) -> ChainResult<u64> {
        self.read_back_be(8)
    }

    /// Read backward the `i64` that ends at the cursor.
    pub fn last_i64(&self) -> ChainResult<i64> {
        self.last_u64().map(|v| v as i64)
    }

    /// Read backward the binary32 that ends at the cursor.
    pub fn last_f32(&self) -> ChainResult<f32> {
        self.last_u32().map(f32::from_bits)
    }

    /// Read backward the binary64 that ends at the cursor.
    pub fn last_f64(&self) -> ChainResult<f64> {
        self.last_u64().map(f64::from_bits)
    }
}

impl BufferChain<u8> {
    /// Lock and call [`ChainGuard::get_u16`].
    pub fn get_u16(&self) -> ChainResult<u16> {
        self.lock().get_u16()
    }

    /// Lock and call [`ChainGuard::get_i16`].
    pub fn get_i16(&self) -> ChainResult<i16> {
        self.lock().get_i16()
    }

    /// Lock and call [`ChainGuard::get_u32`].
    pub fn get_u32(&self) -> ChainResult<u32> {
        self.lock().get_u32()
    }

    /// Lock and call [`ChainGuard::get_i32`].
    pub fn get_i32(&self) -> ChainResult<i32> {
        self.lock().get_i32()
    }

    /// Lock and call [`ChainGuard::get_u64`].
    pub fn get_u64(&self) -> ChainResult<u64> {
        self.lock().get_u64()
    }

    /// Lock and call [`ChainGuard::get_i64`].
    pub fn get_i64(&self) -> ChainResult<i64> {
        self.lock().get_i64()
    }

    /// Lock and call [`ChainGuard::get_f32`].
    pub fn get_f32(&self) -> ChainResult<f32> {
        self.lock().get_f32()
    }

    /// Lock and call [`ChainGuard::get_f64`].
    pub fn get_f64(&self) -> ChainResult<f64> {
        self.lock().get_f64()
    }

    /// Lock and call [`ChainGuard::last_u16`].
    pub fn last_u16(&self) -> ChainResult<u16> {
        self.lock().last_u16()
    }

    /// Lock and call [`ChainGuard::last_i16`].
    pub fn last_i16(&self) -> ChainResult<i16> {
        self.lock().last_i16()
    }

    /// Lock and call [`ChainGuard::last_u32`].
    pub fn last_u32(&self) -> ChainResult<u32> {
        self.lock().last_u32()
    }

    /// Lock and call [`ChainGuard::last_i32`].
    pub fn last_i32(&self) -> ChainResult<i32> {
        self.lock().last_i32()
    }

    /// Lock and call [`ChainGuard::last_u64`].
    pub fn last_u64(&self) -> ChainResult<u64> {
        self.lock().last_u64()
    }

    /// Lock and call [`ChainGuard::last_i64`].
    pub fn last_i64(&self) -> ChainResult<i64> {
        self.lock().last_i64()
    }

    /// Lock and call [`ChainGuard::last_f32`].
    pub fn last_f32(&self) -> ChainResult<f32> {
        self.lock().last_f32()
    }

    /// Lock and call [`ChainGuard::last_f64`].
    pub fn last_f64(&self) -> ChainResult<f64> {
        self.lock().last_f64()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Split `bytes` into chunks of the given sizes (cycling), so values
    /// straddle chunk boundaries.
    fn chunked(bytes: &[u8], sizes: &[usize]) -> ByteBufferChain {
        let mut chunks = Vec::new();
        let mut rest = bytes;
        for size in sizes.iter().cycle() {
            if rest.is_empty() {
                break;
            }
            let (head, tail) = rest.split_at((*size).max(1).min(rest.len()));
            chunks.push(head.to_vec());
            rest = tail;
        }
        ByteBufferChain::new(chunks)
    }

    #[test]
    fn int_forward_then_backward() {
        let chain = ByteBufferChain::new([vec![0x01u8, 0x02, 0x03, 0x04]]);
        assert_eq!(chain.get_i32().unwrap(), 0x0102_0304);
        assert_eq!(chain.last_i32().unwrap(), 0x0102_0304);
        assert_eq!(chain.index(), 0);
    }

    #[test]
    fn int_across_single_byte_chunks() {
        let chain = chunked(&[0x01, 0x02, 0x03, 0x04], &[1]);
        assert_eq!(chain.chunk_count(), 4);
        assert_eq!(chain.get_u32().unwrap(), 0x0102_0304);
        assert_eq!(chain.chunk_index(), 4);
        assert_eq!(chain.last_u32().unwrap(), 0x0102_0304);
    }

    #[test]
    fn short_and_char_are_big_endian() {
        let chain = ByteBufferChain::new([vec![0xFFu8], vec![0xFE, 0x00, 0x41]]);
        assert_eq!(chain.get_i16().unwrap(), -2);
        assert_eq!(chain.get_u16().unwrap(), 0x0041);
        assert_eq!(chain.last_u16().unwrap(), 0x0041);
        assert_eq!(chain.last_i16().unwrap(), -2);
    }

    #[test]
    fn long_and_double() {
        let mut bytes = 0x0102_0304_0506_0708i64.to_be_bytes().to_vec();
        bytes.extend_from_slice(&(-1.5f64).to_be_bytes());
        bytes.extend_from_slice(&3.25f32.to_be_bytes());
        let chain = chunked(&bytes, &[3, 1, 5]);

        assert_eq!(chain.get_i64().unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(chain.get_f64().unwrap(), -1.5);
        assert_eq!(chain.get_f32().unwrap(), 3.25);
        assert_eq!(chain.remaining(), 0);

        assert_eq!(chain.last_f32().unwrap(), 3.25);
        assert_eq!(chain.last_f64().unwrap(), -1.5);
        assert_eq!(chain.last_i64().unwrap(), 0x0102_0304_0506_0708);
    }

    #[test]
    fn nan_bit_pattern_is_preserved() {
        let bits = 0x7FC0_0001u32;
        let chain = ByteBufferChain::new([bits.to_be_bytes()]);
        assert_eq!(chain.get_f32().unwrap().to_bits(), bits);
    }

    #[test]
    fn forward_underflow_consumes_nothing() {
        let chain = ByteBufferChain::new([vec![1u8, 2], vec![3]]);
        let before = chain.position();
        assert_eq!(
            chain.get_i32(),
            Err(ChainError::Underflow { required: 4, remaining: 3 })
        );
        assert_eq!(chain.position(), before);
        assert!(chain.get_f64().is_err());
        assert_eq!(chain.position(), before);
    }

    #[test]
    fn backward_underflow_consumes_nothing() {
        let chain = ByteBufferChain::new([vec![1u8, 2], vec![3, 4, 5]]);
        assert!(chain.skip(3));
        let before = chain.position();
        assert_eq!(
            chain.last_i32(),
            Err(ChainError::BackUnderflow { required: 4, available: 3 })
        );
        assert_eq!(chain.position(), before);
        assert_eq!(chain.last_u16().unwrap(), 0x0203);
    }

    #[test]
    fn decode_through_held_guard() {
        let chain = ByteBufferChain::new([vec![0x00u8, 0x07, 0xCA], vec![0xFE]]);
        let guard = chain.lock();
        assert_eq!(guard.get_u16().unwrap(), 7);
        assert_eq!(guard.get_u16().unwrap(), 0xCAFE);
        assert_eq!(chain.hold_count(), 1);
    }

    proptest! {
        #[test]
        fn backward_inverts_forward(
            value in any::<u64>(),
            prefix in proptest::collection::vec(any::<u8>(), 0..4),
            sizes in proptest::collection::vec(1usize..4, 1..4),
        ) {
            let mut bytes = prefix.clone();
            bytes.extend_from_slice(&value.to_be_bytes());
            let chain = chunked(&bytes, &sizes);
            prop_assert!(chain.go_to(prefix.len()));

            let origin = chain.position();
            prop_assert_eq!(chain.get_u64().unwrap(), value);
            prop_assert_eq!(chain.last_u64().unwrap(), value);
            prop_assert_eq!(chain.position(), origin);

            let high = (value >> 32) as i32;
            prop_assert_eq!(chain.get_i32().unwrap(), high);
            prop_assert_eq!(chain.last_i32().unwrap(), high);

            let top = (value >> 48) as i16;
            prop_assert_eq!(chain.get_i16().unwrap(), top);
            prop_assert_eq!(chain.last_i16().unwrap(), top);
            prop_assert_eq!(chain.position(), origin);
        }

        #[test]
        fn doubles_round_trip(value in any::<f64>(), sizes in proptest::collection::vec(1usize..9, 1..3)) {
            let chain = chunked(&value.to_be_bytes(), &sizes);
            let read = chain.get_f64().unwrap();
            prop_assert_eq!(read.to_bits(), value.to_bits());
            prop_assert_eq!(chain.last_f64().unwrap().to_bits(), value.to_bits());
        }
    }
}
