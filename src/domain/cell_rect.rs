/// A single grid cell position. `z` is the second horizontal axis of the map.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct CellPos {
    pub x: i32,
    pub z: i32,
}

impl CellPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Cell containing a continuous world position
    pub fn from_world(x: f32, z: f32) -> Self {
        Self {
            x: x.floor() as i32,
            z: z.floor() as i32,
        }
    }
}

/// Axis-aligned rectangle of grid cells.
/// Origin is the min corner, width/height are counted in cells,
/// so `max_x() == x + width - 1`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct CellRect {
    pub x: i32,
    pub z: i32,
    pub width: i32,
    pub height: i32,
}

impl CellRect {
    pub const EMPTY: CellRect = CellRect { x: 0, z: 0, width: 0, height: 0 };

    pub const fn new(x: i32, z: i32, width: i32, height: i32) -> Self {
        Self { x, z, width, height }
    }

    /// Build from inclusive min and max corners.
    /// A span wider than `i32::MAX` cells saturates instead of wrapping.
    pub const fn from_corners(min_x: i32, min_z: i32, max_x: i32, max_z: i32) -> Self {
        Self {
            x: min_x,
            z: min_z,
            width: max_x.saturating_sub(min_x).saturating_add(1),
            height: max_z.saturating_sub(min_z).saturating_add(1),
        }
    }

    /// A rect with no cells in it
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    pub const fn min_x(&self) -> i32 {
        self.x
    }

    pub const fn min_z(&self) -> i32 {
        self.z
    }

    /// Inclusive max X
    pub const fn max_x(&self) -> i32 {
        self.x.saturating_add(self.width.saturating_sub(1))
    }

    /// Inclusive max Z
    pub const fn max_z(&self) -> i32 {
        self.z.saturating_add(self.height.saturating_sub(1))
    }

    pub const fn area(&self) -> i64 {
        if self.is_empty() {
            0
        } else {
            self.width as i64 * self.height as i64
        }
    }

    /// Smallest rect covering both. Empty rects are ignored.
    pub fn encapsulate(self, other: CellRect) -> CellRect {
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        CellRect::from_corners(
            self.min_x().min(other.min_x()),
            self.min_z().min(other.min_z()),
            self.max_x().max(other.max_x()),
            self.max_z().max(other.max_z()),
        )
    }

    /// Clip to a `width` x `height` map whose cells are `0..width`, `0..height`
    pub fn clip_to(self, width: i32, height: i32) -> CellRect {
        if self.is_empty() {
            return self;
        }
        let clipped = CellRect::from_corners(
            self.min_x().max(0),
            self.min_z().max(0),
            self.max_x().min(width - 1),
            self.max_z().min(height - 1),
        );
        if clipped.is_empty() { CellRect::EMPTY } else { clipped }
    }

    pub const fn contains(&self, cell: CellPos) -> bool {
        !self.is_empty()
            && cell.x >= self.min_x()
            && cell.x <= self.max_x()
            && cell.z >= self.min_z()
            && cell.z <= self.max_z()
    }

    /// True when every cell of `other` is inside `self`
    pub const fn contains_rect(&self, other: &CellRect) -> bool {
        other.is_empty()
            || (!self.is_empty()
                && other.min_x() >= self.min_x()
                && other.max_x() <= self.max_x()
                && other.min_z() >= self.min_z()
                && other.max_z() <= self.max_z())
    }

    /// True when the two rects share at least one cell
    pub const fn overlaps(&self, other: &CellRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min_x() <= other.max_x()
            && other.min_x() <= self.max_x()
            && self.min_z() <= other.max_z()
            && other.min_z() <= self.max_z()
    }

    /// Cells shared by both rects; `EMPTY` when they do not overlap
    pub fn intersection(&self, other: &CellRect) -> CellRect {
        if !self.overlaps(other) {
            return CellRect::EMPTY;
        }
        CellRect::from_corners(
            self.min_x().max(other.min_x()),
            self.min_z().max(other.min_z()),
            self.max_x().min(other.max_x()),
            self.max_z().min(other.max_z()),
        )
    }

    /// Iterate all cells, row by row
    pub fn cells(&self) -> impl Iterator<Item = CellPos> + '_ {
        let (w, h) = (self.width.max(0), self.height.max(0));
        (0..h).flat_map(move |dz| (0..w).map(move |dx| CellPos::new(self.x + dx, self.z + dz)))
    }
}

impl std::fmt::Display for CellRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{} {}x{})", self.x, self.z, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extreme_corners_do_not_overflow() {
        let rect = CellRect::from_corners(i32::MIN, i32::MIN, i32::MAX, i32::MAX);
        assert_eq!(rect.width, i32::MAX);
        assert_eq!(rect.height, i32::MAX);
        assert!(!rect.is_empty());

        let edge = CellRect::new(i32::MAX - 1, i32::MAX - 1, i32::MAX, i32::MAX);
        assert_eq!(edge.max_x(), i32::MAX);
        assert_eq!(edge.max_z(), i32::MAX);
        assert_eq!(edge.clip_to(100, 100), CellRect::EMPTY);

        let inverted = CellRect::from_corners(i32::MAX, 0, i32::MIN, 0);
        assert!(inverted.is_empty());
    }

    #[test]
    fn test_empty() {
        assert!(CellRect::EMPTY.is_empty());
        assert!(CellRect::new(3, 3, 0, 5).is_empty());
        assert!(CellRect::new(3, 3, 5, -1).is_empty());
        assert!(!CellRect::new(3, 3, 1, 1).is_empty());
        assert_eq!(CellRect::new(3, 3, 0, 5).area(), 0);
    }

    #[test]
    fn test_inclusive_max() {
        let rect = CellRect::new(5, 5, 10, 10);
        assert_eq!(rect.max_x(), 14);
        assert_eq!(rect.max_z(), 14);
        assert_eq!(CellRect::from_corners(5, 5, 14, 14), rect);
    }

    #[test]
    fn test_encapsulate() {
        let a = CellRect::new(0, 0, 10, 10);
        let b = CellRect::new(20, 20, 5, 5);
        let both = a.encapsulate(b);
        assert_eq!(both, CellRect::from_corners(0, 0, 24, 24));
        assert!(both.contains_rect(&a));
        assert!(both.contains_rect(&b));
    }

    #[test]
    fn test_encapsulate_ignores_empty() {
        let a = CellRect::new(4, 4, 2, 2);
        assert_eq!(a.encapsulate(CellRect::EMPTY), a);
        assert_eq!(CellRect::EMPTY.encapsulate(a), a);
    }

    #[test]
    fn test_clip() {
        let rect = CellRect::new(-5, 90, 20, 20);
        assert_eq!(rect.clip_to(100, 100), CellRect::from_corners(0, 90, 14, 99));
        // Entirely outside
        assert!(CellRect::new(150, 150, 5, 5).clip_to(100, 100).is_empty());
    }

    #[test]
    fn test_contains_and_overlaps() {
        let rect = CellRect::new(10, 10, 5, 5);
        assert!(rect.contains(CellPos::new(10, 10)));
        assert!(rect.contains(CellPos::new(14, 14)));
        assert!(!rect.contains(CellPos::new(15, 14)));
        assert!(rect.overlaps(&CellRect::new(14, 14, 3, 3)));
        assert!(!rect.overlaps(&CellRect::new(15, 10, 3, 3)));
        assert!(!rect.overlaps(&CellRect::EMPTY));
    }

    #[test]
    fn test_intersection() {
        let a = CellRect::new(0, 0, 10, 10);
        let b = CellRect::new(5, 8, 10, 10);
        assert_eq!(a.intersection(&b), CellRect::from_corners(5, 8, 9, 9));
        assert_eq!(a.intersection(&CellRect::new(10, 0, 3, 3)), CellRect::EMPTY);
        assert_eq!(a.intersection(&CellRect::EMPTY), CellRect::EMPTY);
    }

    #[test]
    fn test_cell_iteration() {
        let rect = CellRect::new(2, 3, 3, 2);
        let cells: Vec<CellPos> = rect.cells().collect();
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], CellPos::new(2, 3));
        assert_eq!(cells[5], CellPos::new(4, 4));
    }

    #[test]
    fn test_from_world_floors() {
        assert_eq!(CellPos::from_world(3.9, -0.1), CellPos::new(3, -1));
    }
}
