//! Cell and color types for the terminal grid.

use serde::{Deserialize, Serialize};

/// One of the eight base ANSI colors.
///
/// This core only recognizes SGR codes 30-37 / 40-47, so the palette is the
/// classic eight entries. The renderer gets linear RGB via [`Color::rgb`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    /// ANSI 0
    Black,
    /// ANSI 1
    Red,
    /// ANSI 2
    Green,
    /// ANSI 3
    Yellow,
    /// ANSI 4
    Blue,
    /// ANSI 5
    Magenta,
    /// ANSI 6
    Cyan,
    /// ANSI 7
    White,
}

impl Color {
    /// Map an SGR color index (0-7) to a palette entry.
    ///
    /// Indices outside the palette clamp to white, matching the renderer's
    /// behavior for unknown codes.
    pub fn from_ansi(index: u8) -> Self {
        match index {
            0 => Color::Black,
            1 => Color::Red,
            2 => Color::Green,
            3 => Color::Yellow,
            4 => Color::Blue,
            5 => Color::Magenta,
            6 => Color::Cyan,
            _ => Color::White,
        }
    }

    /// Linear RGB triple for this color, in render order `[r, g, b]`.
    pub fn rgb(&self) -> [f32; 3] {
        match self {
            Color::Black => [0.0, 0.0, 0.0],
            Color::Red => [1.0, 0.0, 0.0],
            Color::Green => [0.0, 1.0, 0.0],
            Color::Yellow => [1.0, 1.0, 0.0],
            Color::Blue => [0.0, 0.0, 1.0],
            Color::Magenta => [1.0, 0.0, 1.0],
            Color::Cyan => [0.0, 1.0, 1.0],
            Color::White => [1.0, 1.0, 1.0],
        }
    }
}

/// Text attributes carried by a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellFlags {
    /// Bold text
    pub bold: bool,
    /// Underlined text
    pub underline: bool,
}

impl CellFlags {
    /// Check if no attribute is set.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Flags with bold enabled.
    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Flags with underline enabled.
    pub fn with_underline(mut self) -> Self {
        self.underline = true;
        self
    }
}

/// Single character cell in the terminal grid.
///
/// `codepoint` is a Unicode scalar value stored as `u32`; the value `0` marks a
/// blank cell the renderer skips while still advancing one cell width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Unicode codepoint (0 = blank)
    pub codepoint: u32,
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Text attributes
    pub flags: CellFlags,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            codepoint: ' ' as u32,
            fg: Color::White,
            bg: Color::Black,
            flags: CellFlags::default(),
        }
    }
}

impl Cell {
    /// Create a cell holding `codepoint` with default styling.
    pub fn new(codepoint: u32) -> Self {
        Self {
            codepoint,
            ..Default::default()
        }
    }

    /// The blank cell: codepoint 0, white on black, no flags.
    ///
    /// This is what `clear` resets the grid to.
    pub fn blank() -> Self {
        Self {
            codepoint: 0,
            ..Default::default()
        }
    }

    /// Check if the cell is blank (codepoint 0).
    pub fn is_blank(&self) -> bool {
        self.codepoint == 0
    }

    /// The cell's codepoint as a `char`, if it is a valid scalar value.
    ///
    /// Invalid bytes stored literally by the decoder (e.g. a stray `0x80`) have
    /// no `char` form; the renderer resolves those through the glyph fallback.
    pub fn to_char(&self) -> Option<char> {
        char::from_u32(self.codepoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_ansi() {
        assert_eq!(Color::from_ansi(0), Color::Black);
        assert_eq!(Color::from_ansi(1), Color::Red);
        assert_eq!(Color::from_ansi(7), Color::White);
        // Out-of-palette indices clamp to white
        assert_eq!(Color::from_ansi(8), Color::White);
        assert_eq!(Color::from_ansi(255), Color::White);
    }

    #[test]
    fn test_color_rgb() {
        assert_eq!(Color::Black.rgb(), [0.0, 0.0, 0.0]);
        assert_eq!(Color::White.rgb(), [1.0, 1.0, 1.0]);
        assert_eq!(Color::Yellow.rgb(), [1.0, 1.0, 0.0]);
    }

    #[test]
    fn test_cell_default() {
        let cell = Cell::default();
        assert_eq!(cell.codepoint, ' ' as u32);
        assert_eq!(cell.fg, Color::White);
        assert_eq!(cell.bg, Color::Black);
        assert!(cell.flags.is_default());
        assert!(!cell.is_blank());
    }

    #[test]
    fn test_cell_blank() {
        let cell = Cell::blank();
        assert_eq!(cell.codepoint, 0);
        assert_eq!(cell.fg, Color::White);
        assert_eq!(cell.bg, Color::Black);
        assert!(cell.is_blank());
    }

    #[test]
    fn test_cell_to_char() {
        assert_eq!(Cell::new('A' as u32).to_char(), Some('A'));
        assert_eq!(Cell::new(0x00E9).to_char(), Some('é'));
        // Surrogate range is not a valid scalar value
        assert_eq!(Cell::new(0xD800).to_char(), None);
    }

    #[test]
    fn test_cell_flags_builders() {
        let flags = CellFlags::default().with_bold().with_underline();
        assert!(flags.bold);
        assert!(flags.underline);
        assert!(!flags.is_default());
    }

    #[test]
    fn test_color_serialization() {
        let yaml = serde_yaml::to_string(&Color::Magenta).unwrap();
        let back: Color = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, Color::Magenta);
    }
}
