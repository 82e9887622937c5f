//! Matrix emulation in a terminal for desktop runs

use std::io::{self, Write};

use crossterm::{cursor, queue, style, terminal};

use super::{Display, Frame};

const LIT: &str = "██";
const DARK: &str = "··";

/// Draws the 8x8 matrix with block characters, redrawing in place
pub struct TerminalDisplay<W: Write> {
    out: W,
    frame: Frame,
    drawn_lines: u16,
}

impl TerminalDisplay<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            frame: Frame::default(),
            drawn_lines: 0,
        }
    }

    fn write_frame(&mut self) -> io::Result<()> {
        if self.drawn_lines > 0 {
            queue!(self.out, cursor::MoveUp(self.drawn_lines))?;
        }
        for y in 0..8 {
            queue!(self.out, terminal::Clear(terminal::ClearType::CurrentLine))?;
            for x in 0..8 {
                let cell = if self.frame.is_lit(x, y) { LIT } else { DARK };
                queue!(self.out, style::Print(cell))?;
            }
            queue!(self.out, style::Print("\r\n"))?;
        }
        self.drawn_lines = 8;
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Display for TerminalDisplay<W> {
    fn clear(&mut self) {
        self.frame = Frame::default();
    }

    fn plot(&mut self, x: i32, y: i32, on: bool) {
        self.frame.set(x, y, on);
    }

    fn draw_icon(&mut self, bitmap: &[u8; 8]) {
        self.frame.rows = *bitmap;
    }

    fn draw_scrolling_text(&mut self, text: &str) {
        let written = queue!(self.out, style::Print(format!(">> {text}\r\n")))
            .and_then(|_| self.out.flush());
        if let Err(e) = written {
            log::debug!("Terminal write failed: {}", e);
        }
        self.drawn_lines = 0;
    }

    fn present(&mut self) {
        if let Err(e) = self.write_frame() {
            log::debug!("Terminal write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_rendering() {
        let mut display = TerminalDisplay::new(Vec::new());
        display.plot(0, 0, true);
        display.present();
        display.draw_scrolling_text("Runner");
        let out = String::from_utf8(display.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].ends_with(&format!("{LIT}{}", DARK.repeat(7))));
        assert!(lines[1].ends_with(&DARK.repeat(8)));
        assert!(!lines[1].contains(LIT));
        assert_eq!(lines[8], ">> Runner");
    }

    #[test]
    fn test_redraw_moves_back_over_previous_frame() {
        let mut display = TerminalDisplay::new(Vec::new());
        display.present();
        let first = display.into_inner();
        assert!(!String::from_utf8(first).unwrap().contains("\x1b[8A"));

        let mut display = TerminalDisplay::new(Vec::new());
        display.present();
        display.present();
        let out = String::from_utf8(display.into_inner()).unwrap();
        assert_eq!(out.matches("\x1b[8A").count(), 1);
        assert_eq!(out.lines().count(), 16);
    }
}
