//! One cell of the tile plane.

use std::fmt;
use std::sync::Arc;

use crate::coord::GeoCoordinate;

/// Image held by a slot.
///
/// A fetched image is owned by the slot alone and is released when the slot
/// replaces or clears it. The fallback image is shared by the whole plane and
/// outlives every slot that shows it.
pub enum SlotImage<I> {
    Fetched(I),
    Fallback(Arc<I>),
}

impl<I> SlotImage<I> {
    /// Borrow the underlying image.
    pub fn get(&self) -> &I {
        match self {
            SlotImage::Fetched(image) => image,
            SlotImage::Fallback(image) => image,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SlotImage::Fallback(_))
    }
}

impl<I> fmt::Debug for SlotImage<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotImage::Fetched(_) => f.write_str("Fetched"),
            SlotImage::Fallback(_) => f.write_str("Fallback"),
        }
    }
}

/// Coarse state of a slot, for status output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotStatus {
    /// No image and no request outstanding.
    Empty,
    /// Waiting for a fetch to land.
    Loading,
    Fetched,
    Fallback,
}

impl SlotStatus {
    /// One-character glyph used when printing a plane.
    pub fn glyph(&self) -> char {
        match self {
            SlotStatus::Empty => '.',
            SlotStatus::Loading => '~',
            SlotStatus::Fetched => '#',
            SlotStatus::Fallback => 'x',
        }
    }
}

/// One cell of the N×N plane.
///
/// Slots are allocated once with the plane and reused by every pass; only
/// their image changes.
pub struct TileSlot<I> {
    image: Option<SlotImage<I>>,
    in_flight: bool,
    coordinate: Option<GeoCoordinate>,
}

impl<I> TileSlot<I> {
    pub(crate) fn new() -> Self {
        Self {
            image: None,
            in_flight: false,
            coordinate: None,
        }
    }

    /// The image currently shown, fetched or fallback.
    pub fn image(&self) -> Option<&I> {
        self.image.as_ref().map(SlotImage::get)
    }

    pub fn slot_image(&self) -> Option<&SlotImage<I>> {
        self.image.as_ref()
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn is_fallback(&self) -> bool {
        self.image.as_ref().is_some_and(SlotImage::is_fallback)
    }

    /// True while a fetch for this slot is outstanding.
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Coordinate of the most recent request issued for this slot.
    pub fn coordinate(&self) -> Option<GeoCoordinate> {
        self.coordinate
    }

    pub fn status(&self) -> SlotStatus {
        match (&self.image, self.in_flight) {
            (Some(SlotImage::Fetched(_)), _) => SlotStatus::Fetched,
            (Some(SlotImage::Fallback(_)), _) => SlotStatus::Fallback,
            (None, true) => SlotStatus::Loading,
            (None, false) => SlotStatus::Empty,
        }
    }

    /// Drop the current image, leaving the request marker untouched.
    pub(crate) fn unload(&mut self) {
        self.image = None;
    }

    /// Unload and mark a new request for `coordinate` as outstanding.
    pub(crate) fn begin_request(&mut self, coordinate: GeoCoordinate) {
        self.image = None;
        self.in_flight = true;
        self.coordinate = Some(coordinate);
    }

    /// Replace the image and clear the request marker.
    ///
    /// The previous image is released before this returns.
    pub(crate) fn finish(&mut self, image: Option<SlotImage<I>>) {
        self.image = image;
        self.in_flight = false;
    }

    /// Show the fallback image for a slot whose coordinate fell off the map.
    pub(crate) fn fall_back(&mut self, fallback: Arc<I>) {
        self.coordinate = None;
        self.finish(Some(SlotImage::Fallback(fallback)));
    }
}

impl<I> fmt::Debug for TileSlot<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TileSlot")
            .field("image", &self.image)
            .field("in_flight", &self.in_flight)
            .field("coordinate", &self.coordinate)
            .finish()
    }
}
