//! Packed-bitmap maze catalog
//!
//! Each maze is 8 bytes, one per row from top to bottom. Within a row the
//! most significant bit is the leftmost column and a set bit is a wall.
//! Cells are addressed `(x, y)` with `y` selecting the row and `x` the
//! column; the display driver is responsible for any panel rotation.

use crate::consts::GRID_SIZE;

/// The fixed maze catalog
pub const MAZE_CATALOG: [[u8; 8]; 4] = [
    [0x00, 0x66, 0x42, 0x58, 0x0b, 0x20, 0x6e, 0x00],
    [0x00, 0x6e, 0x42, 0x10, 0x70, 0x06, 0x22, 0x30],
    [0x10, 0x18, 0x4a, 0x63, 0x32, 0x00, 0x2c, 0x20],
    [0x00, 0x46, 0x6c, 0x20, 0x22, 0x0a, 0x7a, 0x00],
];

/// An immutable 8x8 wall layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MazeMap {
    index: usize,
    rows: [u8; 8],
}

impl MazeMap {
    /// Look up a catalog entry. Out-of-range indices yield `None`.
    pub fn from_index(index: usize) -> Option<Self> {
        MAZE_CATALOG
            .get(index)
            .map(|rows| Self { index, rows: *rows })
    }

    /// Catalog entry, wrapping out-of-range indices back into the catalog
    pub fn wrapping(index: usize) -> Self {
        let index = index % MAZE_CATALOG.len();
        Self {
            index,
            rows: MAZE_CATALOG[index],
        }
    }

    /// Build a maze from raw rows (not part of the catalog)
    pub fn from_rows(rows: [u8; 8]) -> Self {
        Self {
            index: usize::MAX,
            rows,
        }
    }

    /// Number of mazes in the catalog
    pub const fn catalog_len() -> usize {
        MAZE_CATALOG.len()
    }

    /// Catalog index this maze was loaded from
    pub fn index(&self) -> usize {
        self.index
    }

    /// Raw bitmap, as handed to `Display::draw_icon`
    pub fn bitmap(&self) -> &[u8; 8] {
        &self.rows
    }

    /// Anything outside the grid counts as a wall.
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        if !(0..GRID_SIZE).contains(&x) || !(0..GRID_SIZE).contains(&y) {
            return true;
        }
        let row = self.rows[y as usize];
        row & (0x80 >> x) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_is_wall() {
        let maze = MazeMap::from_rows([0; 8]);
        assert!(maze.is_wall(-1, 0));
        assert!(maze.is_wall(0, -1));
        assert!(maze.is_wall(8, 3));
        assert!(maze.is_wall(3, 8));
        assert!(!maze.is_wall(0, 0));
        assert!(!maze.is_wall(7, 7));
    }

    #[test]
    fn test_msb_is_leftmost_column() {
        let maze = MazeMap::from_rows([0x80, 0x01, 0, 0, 0, 0, 0, 0]);
        assert!(maze.is_wall(0, 0));
        assert!(!maze.is_wall(7, 0));
        assert!(maze.is_wall(7, 1));
        assert!(!maze.is_wall(0, 1));
    }

    #[test]
    fn test_catalog_lookup() {
        // Row 1 of maze 0 is 0x66 = 0110_0110
        let maze = MazeMap::from_index(0).unwrap();
        let walls: Vec<bool> = (0..8).map(|x| maze.is_wall(x, 1)).collect();
        assert_eq!(
            walls,
            vec![false, true, true, false, false, true, true, false]
        );
        assert!(MazeMap::from_index(MazeMap::catalog_len()).is_none());
        assert_eq!(MazeMap::wrapping(MazeMap::catalog_len() + 1).index(), 1);
    }

    #[test]
    fn test_start_corners_open_in_every_maze() {
        for i in 0..MazeMap::catalog_len() {
            let maze = MazeMap::from_index(i).unwrap();
            assert!(!maze.is_wall(0, 0), "maze {i} blocks (0,0)");
            assert!(!maze.is_wall(7, 7), "maze {i} blocks (7,7)");
        }
    }
}
