//! Tile plane error types.

use thiserror::Error;

/// Errors raised synchronously by the tile plane cache.
///
/// Fetch failures and projection range errors inside a population pass are
/// never reported here; they resolve the affected slot to the fallback image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaneError {
    /// Construction or setter received an unusable value.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Slot coordinate outside `[0, size)`.
    #[error("Slot ({x}, {y}) out of range for a {size}x{size} plane")]
    IndexOutOfRange { x: usize, y: usize, size: usize },
}
