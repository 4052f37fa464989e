/// Errors produced by reads on a buffer chain.
///
/// Every variant is raised before any element is consumed, so the cursor is
/// left exactly where it was when the read was attempted.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// A forward read needed more elements than remain ahead of the cursor.
    #[error("unable to read from buffer chain: required {required}, remaining {remaining}")]
    Underflow { required: usize, remaining: usize },

    /// A backward read needed more elements than lie behind the cursor.
    #[error("unable to read back from buffer chain: required {required}, available {available}")]
    BackUnderflow { required: usize, available: usize },
}

/// Convenience alias used throughout the chainbuf crate.
pub type ChainResult<T> = std::result::Result<T, ChainError>;
