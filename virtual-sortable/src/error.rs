/// Configuration errors.
///
/// Only option validation can fail. Runtime inputs (indexes, offsets, stale measurements) are
/// clamped or ignored instead, so a running list never aborts rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("keeps must be at least 1 (got {0})")]
    InvalidKeeps(usize),

    #[error("buffer must be at least 1 (got {0})")]
    InvalidBuffer(usize),

    #[error("key sequence has {keys} entries but the item list has {items}")]
    LengthMismatch { keys: usize, items: usize },
}
