//! Integer grid coordinates

/// A cell address or a piece anchor.
/// `x` is the column, `y` is the row; row 0 is bottom, row increases upward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Copy of this point moved by (dx, dy), None on overflow
    pub fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }

    /// Board position of the cell at (local_row, local_col) of a tile matrix
    /// anchored at `self` (its bottom-left corner).
    /// Matrix row 0 is the top row, so rows are flipped to the board's bottom-up order.
    /// None when the position is not representable.
    pub fn locate(self, n_rows: usize, local_row: usize, local_col: usize) -> Option<Self> {
        let dy = n_rows.checked_sub(local_row)?.checked_sub(1)?;
        self.checked_offset(i32::try_from(local_col).ok()?, i32::try_from(dy).ok()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_flips_rows() {
        let anchor = Point::new(3, 5);
        // Top row of a 3-row matrix lands two rows above the anchor
        assert_eq!(anchor.locate(3, 0, 0), Some(Point::new(3, 7)));
        assert_eq!(anchor.locate(3, 2, 1), Some(Point::new(4, 5)));
    }

    #[test]
    fn test_locate_overflow_is_none() {
        assert_eq!(Point::new(0, i32::MAX).locate(2, 0, 0), None);
        assert_eq!(Point::new(i32::MAX, 0).locate(1, 0, 1), None);
        assert_eq!(Point::new(0, 0).locate(1, 0, usize::MAX), None);
        assert_eq!(Point::new(0, 0).locate(1, 1, 0), None);
    }

    #[test]
    fn test_checked_offset() {
        assert_eq!(Point::new(1, 1).checked_offset(-1, 2), Some(Point::new(0, 3)));
        assert_eq!(Point::new(0, i32::MIN).checked_offset(0, -1), None);
    }
}
