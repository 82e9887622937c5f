//! End-of-game presentation

use super::{Display, text};
use crate::consts::{GRID_SIZE, RESULT_BLANK_MS, RESULT_HOLD_MS, SPIRAL_STEP_MS};
use crate::platform::Clock;

/// Cell order of the closing spiral: clockwise from the top-left corner,
/// ring by ring toward the center. Visits every cell exactly once.
pub fn spiral_order() -> Vec<(i32, i32)> {
    let mut coords = Vec::with_capacity((GRID_SIZE * GRID_SIZE) as usize);
    let (mut x0, mut y0, mut x1, mut y1) = (0, 0, GRID_SIZE - 1, GRID_SIZE - 1);

    while x0 <= x1 && y0 <= y1 {
        for x in x0..=x1 {
            coords.push((x, y0));
        }
        for y in y0 + 1..=y1 {
            coords.push((x1, y));
        }
        if y0 != y1 {
            for x in (x0..x1).rev() {
                coords.push((x, y1));
            }
        }
        if x0 != x1 {
            for y in (y0 + 1..y1).rev() {
                coords.push((x0, y));
            }
        }
        x0 += 1;
        y0 += 1;
        x1 -= 1;
        y1 -= 1;
    }
    coords
}

/// Fill the matrix cell by cell along the spiral
pub fn spiral_close<D: Display, C: Clock>(display: &mut D, clock: &mut C) {
    for (x, y) in spiral_order() {
        display.plot(x, y, true);
        display.present();
        clock.sleep_ms(SPIRAL_STEP_MS);
    }
}

/// Blank the matrix, then scroll "Won!" or "Lost"
pub fn show_result<D: Display, C: Clock>(display: &mut D, clock: &mut C, won: bool) {
    display.clear();
    display.present();
    clock.sleep_ms(RESULT_BLANK_MS);
    display.draw_scrolling_text(if won { text::WON } else { text::LOST });
    clock.sleep_ms(RESULT_HOLD_MS);
}
