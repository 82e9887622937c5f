//! LED matrix rendering
//!
//! The matrix is 8x8, single colour. Drawing goes through the `Display`
//! trait; `present` pushes the buffered frame to the panel.

pub mod effects;
pub mod scene;
#[cfg(not(target_arch = "wasm32"))]
pub mod terminal;

pub use effects::{show_result, spiral_close, spiral_order};
pub use scene::draw_board;
#[cfg(not(target_arch = "wasm32"))]
pub use terminal::TerminalDisplay;

use crate::consts::GRID_SIZE;

/// Text shown on the matrix
pub mod text {
    pub const WON: &str = "Won!";
    pub const LOST: &str = "Lost";
    pub const TIMER: &str = "2 min";
    pub const HOLD_BOTH: &str = "Hold both buttons";
    pub const HOLD_3S: &str = "3s hold";
    pub const WAITING: &str = "Waiting";
}

/// Matrix driver
pub trait Display {
    fn clear(&mut self);
    /// Set one LED. Off-grid coordinates are ignored.
    fn plot(&mut self, x: i32, y: i32, on: bool);
    /// Replace the buffer with an 8-row bitmap (MSB = leftmost column)
    fn draw_icon(&mut self, bitmap: &[u8; 8]);
    /// Scroll `text` across the matrix; returns when it has finished
    fn draw_scrolling_text(&mut self, text: &str);
    fn present(&mut self);
}

/// One frame, stored the same way as maze bitmaps
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame {
    pub rows: [u8; 8],
}

impl Frame {
    pub fn is_lit(&self, x: i32, y: i32) -> bool {
        in_grid(x, y) && self.rows[y as usize] & (0x80 >> x) != 0
    }

    pub fn set(&mut self, x: i32, y: i32, on: bool) {
        if !in_grid(x, y) {
            return;
        }
        let mask = 0x80u8 >> x;
        if on {
            self.rows[y as usize] |= mask;
        } else {
            self.rows[y as usize] &= !mask;
        }
    }

    pub fn lit_count(&self) -> u32 {
        self.rows.iter().map(|r| r.count_ones()).sum()
    }
}

fn in_grid(x: i32, y: i32) -> bool {
    (0..GRID_SIZE).contains(&x) && (0..GRID_SIZE).contains(&y)
}

/// In-memory display that remembers what was shown
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    /// Frame being drawn
    pub back: Frame,
    /// Last presented frame
    pub front: Frame,
    pub presents: u32,
    /// Every scrolled text, in order
    pub texts: Vec<String>,
}

impl Display for FrameBuffer {
    fn clear(&mut self) {
        self.back = Frame::default();
    }

    fn plot(&mut self, x: i32, y: i32, on: bool) {
        self.back.set(x, y, on);
    }

    fn draw_icon(&mut self, bitmap: &[u8; 8]) {
        self.back.rows = *bitmap;
    }

    fn draw_scrolling_text(&mut self, text: &str) {
        self.texts.push(text.to_string());
    }

    fn present(&mut self) {
        self.front = self.back;
        self.presents += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_and_present() {
        let mut fb = FrameBuffer::default();
        fb.plot(0, 0, true);
        fb.plot(7, 3, true);
        fb.plot(9, 9, true);
        assert_eq!(fb.front.lit_count(), 0);
        fb.present();
        assert!(fb.front.is_lit(0, 0));
        assert!(fb.front.is_lit(7, 3));
        assert_eq!(fb.front.lit_count(), 2);
        assert_eq!(fb.front.rows[3], 0x01);
    }

    #[test]
    fn test_icon_replaces_buffer() {
        let mut fb = FrameBuffer::default();
        fb.plot(3, 3, true);
        fb.draw_icon(&[0xff, 0, 0, 0, 0, 0, 0, 0]);
        fb.present();
        assert!(!fb.front.is_lit(3, 3));
        assert_eq!(fb.front.lit_count(), 8);
    }
}
