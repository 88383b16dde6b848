//! Tile plane cache.
//!
//! A fixed N×N grid of tile slots centered on a geographic coordinate and
//! populated asynchronously through an [`ImageFetcher`](crate::provider::ImageFetcher).
//!
//! # Example
//!
//! ```ignore
//! let cache = Arc::new(TilePlaneCache::new(5, dims, fallback, fetcher)?);
//! cache.initialize_plane(center);
//! cache.wait_until_idle().await;
//! let slot = cache.slot_at(2, 2)?;
//! ```

mod cache;
mod error;
mod metrics;
mod phase;
mod slot;

pub use cache::{SlotGuard, TilePlaneCache};
pub use error::PlaneError;
pub use metrics::{PlaneMetrics, PlaneMetricsSnapshot};
pub use phase::CachePhase;
pub use slot::{SlotImage, SlotStatus, TileSlot};
