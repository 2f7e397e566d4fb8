//! Fixed One Dark colours for pieces and UI chrome.

use ratatui::style::Color;

/// Piece and UI colours used by the renderer.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Piece colours indexed by `PieceKind::color_index`: I, O, T, S, Z, J, L.
    pub pieces: [Color; 7],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, level).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Greyed-out hold preview and secondary text.
    pub inactive_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark()
    }
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

const ONEDARK_PIECES: [Color; 7] = [
    rgb(0x56B6C2), // cyan
    rgb(0xE5C07B), // yellow
    rgb(0xC678DD), // magenta
    rgb(0x98C379), // green
    rgb(0xE06C75), // red
    rgb(0x61AFEF), // blue
    rgb(0xD19A66), // orange
];

impl Theme {
    pub const fn onedark() -> Self {
        Self {
            pieces: ONEDARK_PIECES,
            bg: rgb(0x31353F),
            div_line: rgb(0x3F444F),
            main_fg: rgb(0xABB2BF),
            title: rgb(0xE5C07B),
            inactive_fg: rgb(0x5C6370),
        }
    }

    #[inline]
    pub fn piece_color(&self, index: u8) -> Color {
        self.pieces[(index as usize) % self.pieces.len()]
    }
}
