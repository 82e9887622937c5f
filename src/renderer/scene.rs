//! Board rendering: maze walls plus the two player dots

use super::Display;
use crate::sim::Position;

/// Draw one frame of the board.
///
/// `own` is this device's player and is hidden while invisible; `other`
/// is always drawn. Invisibility is purely cosmetic.
pub fn draw_board<D: Display>(
    display: &mut D,
    maze_bitmap: &[u8; 8],
    own: Position,
    own_visible: bool,
    other: Position,
) {
    display.clear();
    display.draw_icon(maze_bitmap);
    display.plot(other.x, other.y, true);
    if own_visible {
        display.plot(own.x, own.y, true);
    }
    display.present();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::FrameBuffer;
    use crate::sim::MazeMap;

    #[test]
    fn test_board_shows_walls_and_players() {
        let maze = MazeMap::from_index(0).unwrap();
        let mut fb = FrameBuffer::default();
        draw_board(&mut fb, maze.bitmap(), Position::new(7, 7), true, Position::new(0, 0));
        assert!(fb.front.is_lit(7, 7));
        assert!(fb.front.is_lit(0, 0));
        // Wall at (1, 1) from row 0x66
        assert!(fb.front.is_lit(1, 1));
        assert!(!fb.front.is_lit(3, 1));
    }

    #[test]
    fn test_invisible_player_hidden() {
        let maze = MazeMap::from_rows([0; 8]);
        let mut fb = FrameBuffer::default();
        draw_board(&mut fb, maze.bitmap(), Position::new(4, 4), false, Position::new(0, 0));
        assert!(!fb.front.is_lit(4, 4));
        assert_eq!(fb.front.lit_count(), 1);
    }
}
