//! Terminal grid state buffer and cursor tracking.

use runeterm_core::{Cell, CellFlags, Color, Dimensions, Position};

/// Terminal grid state buffer.
///
/// The grid is created once, sized for the viewport, and never resized; a
/// window resize means recreating the session. All cell mutation funnels
/// through [`Grid::write_cell`], the single bounds-checked entry point, so an
/// out-of-range position can never touch memory it does not own.
#[derive(Debug)]
pub struct Grid {
    /// Cell storage (row-major order)
    cells: Vec<Cell>,
    /// Grid dimensions
    dimensions: Dimensions,
    /// Cursor position as last reported by the decoder.
    ///
    /// Not clamped on assignment; readers treat out-of-range values as
    /// "cursor off screen".
    cursor: Position,
}

impl Grid {
    /// Create a new grid with the given dimensions.
    ///
    /// All cells are initialized to the default (empty space, white on black).
    pub fn new(dimensions: Dimensions) -> Self {
        Self {
            cells: vec![Cell::default(); dimensions.cell_count()],
            dimensions,
            cursor: Position::origin(),
        }
    }

    /// Get cell at position.
    ///
    /// Returns None if the position is out of bounds.
    pub fn cell(&self, row: u16, col: u16) -> Option<&Cell> {
        if row < self.dimensions.rows && col < self.dimensions.cols {
            let idx = row as usize * self.dimensions.cols as usize + col as usize;
            self.cells.get(idx)
        } else {
            None
        }
    }

    /// Get an entire row as a slice.
    ///
    /// Returns None if the row is out of bounds.
    pub fn row(&self, row: u16) -> Option<&[Cell]> {
        if row < self.dimensions.rows {
            let start = row as usize * self.dimensions.cols as usize;
            let end = start + self.dimensions.cols as usize;
            Some(&self.cells[start..end])
        } else {
            None
        }
    }

    /// The full cell array in row-major order, for the renderer's per-frame
    /// snapshot.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Write a cell at the given position.
    ///
    /// Bounds-checked: out-of-range writes are silent no-ops. Sets codepoint
    /// and colors; flags are left unchanged unless provided.
    pub fn write_cell(
        &mut self,
        row: u16,
        col: u16,
        codepoint: u32,
        fg: Color,
        bg: Color,
        flags: Option<CellFlags>,
    ) {
        if row >= self.dimensions.rows || col >= self.dimensions.cols {
            return;
        }
        let idx = row as usize * self.dimensions.cols as usize + col as usize;
        let cell = &mut self.cells[idx];
        cell.codepoint = codepoint;
        cell.fg = fg;
        cell.bg = bg;
        if let Some(flags) = flags {
            cell.flags = flags;
        }
    }

    /// Clear the entire grid to blank cells.
    ///
    /// The cursor does not move.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::blank();
        }
    }

    /// Get the cursor position.
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Set the cursor position. No clamping; writers clamp before cell writes.
    pub fn set_cursor(&mut self, position: Position) {
        self.cursor = position;
    }

    /// Get the grid dimensions.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Convert the grid to plain text, one line per row.
    ///
    /// Blank cells render as spaces, codepoints without a `char` form as `?`.
    /// Trailing whitespace is trimmed from each line. Used for diagnostics and
    /// tests, not by the renderer.
    pub fn to_plain_text(&self) -> String {
        let mut text = String::new();
        for row_idx in 0..self.dimensions.rows {
            if row_idx > 0 {
                text.push('\n');
            }
            if let Some(row) = self.row(row_idx) {
                for cell in row {
                    if cell.is_blank() {
                        text.push(' ');
                    } else {
                        text.push(char::from_u32(cell.codepoint).unwrap_or('?'));
                    }
                }
            }
        }
        text.lines()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
