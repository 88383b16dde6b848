//! Population phase of a tile plane cache.

use std::fmt;

/// What the cache is currently doing.
///
/// ```text
/// Idle --[initialize_plane]--> InitializingTiles
/// InitializingTiles --[last fetch lands]--> Idle
/// InitializingTiles --[initialize_plane]--> CancellingRequests
/// CancellingRequests --[last fetch lands]--> InitializingTiles (latest center)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CachePhase {
    /// No pass in flight.
    #[default]
    Idle,
    /// A newer center was requested; waiting for stale fetches to land.
    CancellingRequests,
    /// A population pass is in flight.
    InitializingTiles,
}

impl CachePhase {
    /// Short label for status output.
    pub fn label(&self) -> &'static str {
        match self {
            CachePhase::Idle => "idle",
            CachePhase::CancellingRequests => "cancelling",
            CachePhase::InitializingTiles => "loading",
        }
    }
}

impl fmt::Display for CachePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
