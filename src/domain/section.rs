//! Section alignment for view rectangles.
//!
//! The map renderer redraws the world in square sections. Every view
//! rectangle is grown outward to whole sections before it is handed to the
//! viewport registry.

use super::{CellRect, WorldBounds};

/// Grow `rect` so both corners land on section boundaries, then clip it to the map.
///
/// The min corner is floored to a multiple of `unit`. The inclusive max corner
/// is moved to the last cell of the section containing it, which is the same
/// as ceiling the exclusive max edge. A `unit` of one or less only clips.
pub fn expand_to_sections(rect: CellRect, unit: i32, bounds: WorldBounds) -> CellRect {
    if rect.is_empty() {
        return rect;
    }
    if unit <= 1 {
        return bounds.clip(rect);
    }

    let (min_x, max_x) = aligned_span(rect.min_x(), rect.max_x(), unit, bounds.width);
    let (min_z, max_z) = aligned_span(rect.min_z(), rect.max_z(), unit, bounds.height);
    let aligned = CellRect::from_corners(min_x, min_z, max_x, max_z);
    if aligned.is_empty() { CellRect::EMPTY } else { aligned }
}

/// Inclusive span grown to section boundaries and clipped to `0..limit`.
/// Worked in i64 so sections straddling `i32::MAX` cannot overflow.
fn aligned_span(min: i32, max: i32, unit: i32, limit: i32) -> (i32, i32) {
    let unit = i64::from(unit);
    let lo = (i64::from(min).div_euclid(unit) * unit).max(0);
    let hi = (i64::from(max).div_euclid(unit) * unit + unit - 1).min(i64::from(limit) - 1);
    // lo is within 0..=min and hi within min(max, limit - 1)..=limit - 1
    (lo as i32, hi as i32)
}
