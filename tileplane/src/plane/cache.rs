//! The tile plane cache.
//!
//! Owns the N×N slot grid and drives population passes around a center
//! coordinate.
//!
//! # Passes
//!
//! A pass projects the center to a pixel, offsets that pixel by whole tiles
//! for every slot, back-projects each offset pixel to a coordinate and spawns
//! one fetch task per slot. Each landing fetch fills its slot (or the
//! fallback image on failure) and decrements the pending counter.
//!
//! # Re-centering during a pass
//!
//! In-flight fetches are never aborted. Asking for a new center while a
//! pass is pending unloads every slot, records the new center and switches
//! to `CancellingRequests`. When the last outstanding fetch lands, a fresh
//! pass starts for the most recently recorded center; older requested
//! centers are dropped. Once the cache is back to `Idle`, every slot holds
//! imagery for exactly one center.
//!
//! # Locking
//!
//! Phase, pending counter and centers sit behind one mutex; each slot has
//! its own. When both are held, the state lock is always taken first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::error::PlaneError;
use super::metrics::PlaneMetrics;
use super::phase::CachePhase;
use super::slot::{SlotImage, SlotStatus, TileSlot};
use crate::coord::{self, GeoCoordinate, TileDimensions, ZoomLevel};
use crate::provider::{FetchError, FetchRequest, ImageFetcher, ViewType};

/// Borrowed access to one slot, held under the slot's lock.
pub type SlotGuard<'a, I> = MutexGuard<'a, TileSlot<I>>;

/// Mutable plane state shared by callers and fetch completions.
#[derive(Debug)]
struct PlaneState {
    phase: CachePhase,
    pending: usize,
    /// Center the current (or last) pass was issued for.
    anchor: Option<GeoCoordinate>,
    /// Latest center requested while cancelling.
    requested_center: Option<GeoCoordinate>,
    zoom: ZoomLevel,
    view_type: ViewType,
    pass_id: u64,
}

/// Bounded N×N map tile cache with asynchronous population.
///
/// Share it as `Arc<TilePlaneCache<F>>`; [`initialize_plane`] spawns fetch
/// tasks that hold a reference to the cache until they land.
///
/// # Example
///
/// ```no_run
/// # async fn demo() -> Result<(), tileplane::plane::PlaneError> {
/// use std::sync::Arc;
/// use tileplane::coord::{GeoCoordinate, TileDimensions};
/// use tileplane::plane::TilePlaneCache;
/// use tileplane::provider::{SyntheticFetcher, TileImage};
///
/// let dims = TileDimensions::new(256, 256);
/// let fallback = TileImage::solid(dims, [0, 0, 0, 255]);
/// let cache = Arc::new(TilePlaneCache::new(
///     5,
///     dims,
///     fallback,
///     Arc::new(SyntheticFetcher::new()),
/// )?);
///
/// cache.initialize_plane(GeoCoordinate::new(47.639597, -122.12845));
/// cache.wait_until_idle().await;
/// # Ok(())
/// # }
/// ```
///
/// [`initialize_plane`]: TilePlaneCache::initialize_plane
pub struct TilePlaneCache<F: ImageFetcher> {
    grid_size: usize,
    tile_dimensions: TileDimensions,
    fallback: Arc<F::Image>,
    fetcher: Arc<F>,
    /// Row-major: index = y * grid_size + x.
    slots: Vec<Mutex<TileSlot<F::Image>>>,
    state: Mutex<PlaneState>,
    phase_tx: watch::Sender<CachePhase>,
    disposed: AtomicBool,
    metrics: PlaneMetrics,
    runtime: Handle,
}

impl<F: ImageFetcher> TilePlaneCache<F> {
    /// Create a plane of `grid_size × grid_size` empty slots.
    ///
    /// Must be called from within a Tokio runtime; fetch tasks are spawned
    /// onto that runtime.
    ///
    /// # Arguments
    ///
    /// * `grid_size` - Odd, positive edge length of the plane
    /// * `tile_dimensions` - Pixel size of one tile
    /// * `fallback_image` - Shown in slots whose fetch failed
    /// * `fetcher` - Source of tile images
    pub fn new(
        grid_size: usize,
        tile_dimensions: TileDimensions,
        fallback_image: F::Image,
        fetcher: Arc<F>,
    ) -> Result<Self, PlaneError> {
        if grid_size == 0 || grid_size % 2 == 0 {
            return Err(PlaneError::InvalidConfiguration(format!(
                "grid size must be an odd positive number, got {}",
                grid_size
            )));
        }
        if tile_dimensions.is_empty() {
            return Err(PlaneError::InvalidConfiguration(format!(
                "tile dimensions must be non-zero, got {}",
                tile_dimensions
            )));
        }
        let runtime = Handle::try_current().map_err(|_| {
            PlaneError::InvalidConfiguration("no Tokio runtime available".to_string())
        })?;

        let slots = (0..grid_size * grid_size)
            .map(|_| Mutex::new(TileSlot::new()))
            .collect();
        let (phase_tx, _) = watch::channel(CachePhase::Idle);

        debug!(
            grid_size,
            tile_dimensions = %tile_dimensions,
            fetcher = fetcher.name(),
            "Tile plane created"
        );

        Ok(Self {
            grid_size,
            tile_dimensions,
            fallback: Arc::new(fallback_image),
            fetcher,
            slots,
            state: Mutex::new(PlaneState {
                phase: CachePhase::Idle,
                pending: 0,
                anchor: None,
                requested_center: None,
                zoom: ZoomLevel::default(),
                view_type: ViewType::default(),
                pass_id: 0,
            }),
            phase_tx,
            disposed: AtomicBool::new(false),
            metrics: PlaneMetrics::new(),
            runtime,
        })
    }

    /// Edge length of the plane.
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Index of the center slot on both axes.
    pub fn center_index(&self) -> usize {
        (self.grid_size - 1) / 2
    }

    pub fn tile_dimensions(&self) -> TileDimensions {
        self.tile_dimensions
    }

    /// Lock and return the slot at `(x, y)`.
    ///
    /// Do not hold the guard across an `.await`.
    pub fn slot_at(&self, x: usize, y: usize) -> Result<SlotGuard<'_, F::Image>, PlaneError> {
        if x >= self.grid_size || y >= self.grid_size {
            return Err(PlaneError::IndexOutOfRange {
                x,
                y,
                size: self.grid_size,
            });
        }
        Ok(self.slots[self.index(x, y)].lock())
    }

    /// Status of every slot, one row per `y`.
    pub fn slot_statuses(&self) -> Vec<Vec<SlotStatus>> {
        (0..self.grid_size)
            .map(|y| {
                (0..self.grid_size)
                    .map(|x| self.slots[self.index(x, y)].lock().status())
                    .collect()
            })
            .collect()
    }

    pub fn zoom_level(&self) -> ZoomLevel {
        self.state.lock().zoom
    }

    /// Set the zoom level used by the next pass.
    pub fn set_zoom_level(&self, level: u8) -> Result<(), PlaneError> {
        let zoom =
            ZoomLevel::new(level).map_err(|e| PlaneError::InvalidConfiguration(e.to_string()))?;
        self.state.lock().zoom = zoom;
        Ok(())
    }

    pub fn view_type(&self) -> ViewType {
        self.state.lock().view_type
    }

    /// Set the imagery style used by the next pass.
    pub fn set_view_type(&self, view_type: ViewType) {
        self.state.lock().view_type = view_type;
    }

    /// Center of the most recently started pass.
    pub fn anchor(&self) -> Option<GeoCoordinate> {
        self.state.lock().anchor
    }

    pub fn phase(&self) -> CachePhase {
        self.state.lock().phase
    }

    /// Number of fetches still outstanding.
    pub fn pending_requests(&self) -> usize {
        self.state.lock().pending
    }

    /// Watch phase transitions.
    pub fn subscribe_phase(&self) -> watch::Receiver<CachePhase> {
        self.phase_tx.subscribe()
    }

    /// Resolve once the cache reaches `Idle`.
    pub async fn wait_until_idle(&self) {
        let mut rx = self.phase_tx.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|phase| *phase == CachePhase::Idle).await;
    }

    pub fn metrics(&self) -> &PlaneMetrics {
        &self.metrics
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Populate the plane around `center`.
    ///
    /// Starts a pass immediately when nothing is pending. Otherwise unloads
    /// every slot and records `center`; the pass for it starts once the
    /// outstanding fetches have landed.
    pub fn initialize_plane(self: &Arc<Self>, center: GeoCoordinate) {
        if self.is_disposed() {
            warn!(center = %center, "Ignoring initialize on a disposed tile plane");
            return;
        }

        let mut state = self.state.lock();

        // A dispose may have landed while waiting for the lock.
        if self.is_disposed() {
            warn!(center = %center, "Ignoring initialize on a disposed tile plane");
            return;
        }

        if state.pending != 0 {
            state.requested_center = Some(center);
            self.metrics.pass_superseded();
            self.set_phase(&mut state, CachePhase::CancellingRequests);
            for slot in &self.slots {
                slot.lock().unload();
            }
            info!(
                center = %center,
                pending = state.pending,
                "Re-center requested during pass, waiting for in-flight fetches"
            );
            return;
        }

        self.start_pass(&mut state, center);
    }

    /// Release every slot image.
    ///
    /// Safe to call more than once. Fetches landing afterwards drop their
    /// image instead of storing it.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        {
            let mut state = self.state.lock();
            state.requested_center = None;
            if state.pending == 0 {
                self.set_phase(&mut state, CachePhase::Idle);
            }
        }

        for slot in &self.slots {
            slot.lock().unload();
        }

        info!(grid_size = self.grid_size, "Tile plane disposed");
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.grid_size + x
    }

    fn set_phase(&self, state: &mut PlaneState, phase: CachePhase) {
        if state.phase != phase {
            debug!(from = %state.phase, to = %phase, "Tile plane phase change");
        }
        state.phase = phase;
        self.phase_tx.send_replace(phase);
    }

    /// Begin a pass for `center`. Caller holds the state lock.
    fn start_pass(self: &Arc<Self>, state: &mut PlaneState, center: GeoCoordinate) {
        state.anchor = Some(center);
        state.requested_center = None;
        state.pass_id += 1;
        self.metrics.pass_started();
        self.set_phase(state, CachePhase::InitializingTiles);

        let zoom = state.zoom;
        let view_type = state.view_type;
        let pass_id = state.pass_id;

        let center_pixel = coord::geo_to_pixel(center, zoom);
        if let Err(e) = &center_pixel {
            warn!(center = %center, error = %e, "Center cannot be projected, using fallback tiles");
        }

        let center_index = self.center_index() as f64;
        let width = f64::from(self.tile_dimensions.width);
        let height = f64::from(self.tile_dimensions.height);
        let mut requests = Vec::with_capacity(self.slots.len());

        for y in 0..self.grid_size {
            let dy = y as f64 - center_index;
            for x in 0..self.grid_size {
                let dx = x as f64 - center_index;
                let index = self.index(x, y);
                let tile_coordinate = center_pixel.and_then(|pixel| {
                    coord::pixel_to_geo(pixel.offset(dx * width, dy * height), zoom)
                });

                let mut slot = self.slots[index].lock();
                match tile_coordinate {
                    Ok(coordinate) => {
                        slot.begin_request(coordinate);
                        requests.push((
                            index,
                            FetchRequest {
                                coordinate,
                                tile_dimensions: self.tile_dimensions,
                                zoom,
                                view_type,
                            },
                        ));
                    }
                    Err(e) => {
                        debug!(x, y, error = %e, "Slot off the map, using fallback");
                        self.metrics.projection_fallback();
                        slot.fall_back(Arc::clone(&self.fallback));
                    }
                }
            }
        }

        state.pending = requests.len();
        info!(
            pass_id,
            center = %center,
            zoom = %zoom,
            view_type = %view_type,
            fetches = state.pending,
            "Population pass started"
        );

        if state.pending == 0 {
            self.set_phase(state, CachePhase::Idle);
            return;
        }

        for (index, request) in requests {
            let fetcher = Arc::clone(&self.fetcher);
            let fetch = self
                .runtime
                .spawn(async move { fetcher.fetch(request).await });

            // The fetch runs in its own task so a panic surfaces as a
            // `JoinError` here and the slot still completes.
            let cache = Arc::clone(self);
            self.runtime.spawn(async move {
                let outcome = match fetch.await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(pass_id, index, error = %e, "Fetch task aborted");
                        Err(FetchError::Aborted(e.to_string()))
                    }
                };
                cache.complete_slot(index, pass_id, outcome);
            });
        }
    }

    /// Apply one landed fetch and advance the phase when it was the last.
    fn complete_slot(
        self: &Arc<Self>,
        index: usize,
        pass_id: u64,
        outcome: Result<F::Image, FetchError>,
    ) {
        {
            let mut slot = self.slots[index].lock();
            let image = match outcome {
                Ok(image) => {
                    self.metrics.fetch_succeeded();
                    SlotImage::Fetched(image)
                }
                Err(e) => {
                    self.metrics.fetch_failed();
                    debug!(pass_id, index, error = %e, "Fetch failed, using fallback");
                    SlotImage::Fallback(Arc::clone(&self.fallback))
                }
            };
            if self.is_disposed() {
                slot.finish(None);
            } else {
                slot.finish(Some(image));
            }
        }

        let mut state = self.state.lock();
        state.pending = state.pending.saturating_sub(1);
        if state.pending > 0 {
            return;
        }

        match state.requested_center.take() {
            Some(center) if !self.is_disposed() => {
                debug!(pass_id, center = %center, "In-flight fetches drained, starting latest pass");
                self.start_pass(&mut state, center);
            }
            _ => {
                debug!(pass_id, "Population pass complete");
                self.set_phase(&mut state, CachePhase::Idle);
            }
        }
    }
}

impl<F: ImageFetcher> std::fmt::Debug for TilePlaneCache<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TilePlaneCache")
            .field("grid_size", &self.grid_size)
            .field("tile_dimensions", &self.tile_dimensions)
            .field("fetcher", &self.fetcher.name())
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}
