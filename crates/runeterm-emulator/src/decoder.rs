//! Byte-stream decoder for shell output.
//!
//! Turns raw PTY chunks - plain text, multi-byte UTF-8, and a subset of
//! ANSI/VT100 CSI sequences - into grid mutations. The decoder is a persistent
//! state machine: it is called once per read chunk and must tolerate UTF-8
//! sequences and escape sequences split across chunk boundaries, which it
//! carries in a bounded buffer and resumes on the next call.

use tracing::trace;

use runeterm_core::{CellFlags, Color, Position};

use crate::grid::Grid;

/// Escape byte (0x1B).
const ESC: u8 = 0x1b;

/// Upper bound on bytes carried across chunk boundaries for an incomplete
/// sequence. An escape sequence that grows past this without terminating is
/// dropped wholesale.
const CARRY_LIMIT: usize = 4096;

/// A decoded CSI sequence, dispatched by its terminator byte.
///
/// The parser produces one of these per complete sequence; the decoder applies
/// it to its own state. Parameter defaults (missing or zero params meaning 1,
/// one-based coordinates becoming zero-based) are already resolved here, so an
/// action carries exactly what gets applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsiAction {
    /// `CSI r ; c H` / `f` - absolute cursor position, zero-based.
    CursorPosition {
        /// Target row
        row: u16,
        /// Target column
        col: u16,
    },
    /// `CSI n A` - cursor up.
    CursorUp(u16),
    /// `CSI n B` - cursor down.
    CursorDown(u16),
    /// `CSI n C` - cursor right.
    CursorForward(u16),
    /// `CSI n D` - cursor left.
    CursorBack(u16),
    /// `CSI n J` - erase display. Every parameter value clears the full
    /// screen; the clear is deferred until the next processed byte.
    ClearScreen,
    /// `CSI p ; q m` - select graphic rendition. Carries the collected
    /// parameters, applied in order.
    Attributes {
        /// Collected SGR parameters
        params: [u16; MAX_CSI_PARAMS],
        /// Number of valid entries in `params`
        count: usize,
    },
    /// Recognized sequence shape, unrecognized terminator: parsed and
    /// discarded.
    Ignore,
}

/// Maximum number of numeric CSI parameters tracked.
pub const MAX_CSI_PARAMS: usize = 2;

/// Result of attempting to parse one CSI sequence from a byte slice.
enum CsiParse {
    /// A full sequence was found: the action plus the byte count from ESC
    /// through the terminator inclusive.
    Complete { action: CsiAction, consumed: usize },
    /// The chunk ended before the terminator.
    Incomplete,
}

/// Result of decoding one UTF-8 code point from a byte slice.
enum Utf8Decode {
    /// A code point and the bytes it consumed (1-4).
    Complete { codepoint: u32, len: usize },
    /// The chunk ended inside a multi-byte sequence.
    Incomplete,
}

/// Persistent decoder state machine.
///
/// Owns the cursor/attribute state accumulated across chunks and mirrors the
/// cursor into the grid for the renderer. All grid writes go through the
/// grid's bounds-checked entry point; an out-of-bounds cursor silently drops
/// printable output (no wrap, no scroll).
#[derive(Debug)]
pub struct Decoder {
    /// Cursor row the next printable byte writes to
    cursor_row: u16,
    /// Cursor column the next printable byte writes to
    cursor_col: u16,
    /// SGR foreground index 0-7, None = default (white)
    fg: Option<u8>,
    /// SGR background index 0-7, None = default (black)
    bg: Option<u8>,
    /// Bold attribute
    bold: bool,
    /// Underline attribute
    underline: bool,
    /// Set by `CSI J`; the grid is cleared before the next byte is processed
    pending_clear: bool,
    /// Bytes of an incomplete sequence carried to the next chunk
    carry: Vec<u8>,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Create a decoder with default state: cursor at origin, default colors,
    /// no attributes.
    pub fn new() -> Self {
        Self {
            cursor_row: 0,
            cursor_col: 0,
            fg: None,
            bg: None,
            bold: false,
            underline: false,
            pending_clear: false,
            carry: Vec::new(),
        }
    }

    /// The decoder's cursor position.
    pub fn cursor(&self) -> Position {
        Position::new(self.cursor_row, self.cursor_col)
    }

    /// Number of bytes currently carried for an incomplete sequence.
    pub fn carried_bytes(&self) -> usize {
        self.carry.len()
    }

    /// Process one chunk of shell output against the grid.
    ///
    /// Invoked once per PTY read. Bytes left over from an incomplete sequence
    /// in the previous chunk are spliced in front of `bytes` before parsing.
    pub fn process(&mut self, grid: &mut Grid, bytes: &[u8]) {
        let owned;
        let data: &[u8] = if self.carry.is_empty() {
            bytes
        } else {
            self.carry.extend_from_slice(bytes);
            owned = std::mem::take(&mut self.carry);
            &owned
        };

        let mut i = 0;
        while i < data.len() {
            // A deferred CSI J clear applies before any further byte.
            if self.pending_clear {
                grid.clear();
                self.pending_clear = false;
            }

            let byte = data[i];

            // Carriage return: consumed, no state change.
            if byte == b'\r' {
                i += 1;
                continue;
            }

            // Line feed: next row, column zero.
            if byte == b'\n' {
                self.cursor_row = self.cursor_row.saturating_add(1);
                self.cursor_col = 0;
                grid.set_cursor(self.cursor());
                i += 1;
                continue;
            }

            if byte == ESC {
                if i + 1 >= data.len() {
                    // Cannot tell yet whether this starts a CSI sequence.
                    self.stash(&data[i..]);
                    break;
                }
                if data[i + 1] != b'[' {
                    // Unsupported escape kind: discard the escape byte alone.
                    i += 1;
                    continue;
                }
                match parse_csi(&data[i..]) {
                    CsiParse::Complete { action, consumed } => {
                        trace!("CSI action {:?} ({} bytes)", action, consumed);
                        self.apply(grid, action);
                        i += consumed;
                    }
                    CsiParse::Incomplete => {
                        self.stash(&data[i..]);
                        break;
                    }
                }
                continue;
            }

            // Everything else is text: decode one UTF-8 code point.
            match decode_utf8(&data[i..]) {
                Utf8Decode::Complete { codepoint, len } => {
                    self.put(grid, codepoint);
                    i += len;
                }
                Utf8Decode::Incomplete => {
                    self.stash(&data[i..]);
                    break;
                }
            }
        }
    }

    /// Write a code point at the cursor and advance one column.
    ///
    /// Out-of-bounds cursor positions drop the output: no wrap, no scroll.
    fn put(&mut self, grid: &mut Grid, codepoint: u32) {
        if !grid.dimensions().contains(self.cursor()) {
            return;
        }
        let fg = Color::from_ansi(self.fg.unwrap_or(7));
        let bg = Color::from_ansi(self.bg.unwrap_or(0));
        let flags = CellFlags {
            bold: self.bold,
            underline: self.underline,
        };
        grid.write_cell(self.cursor_row, self.cursor_col, codepoint, fg, bg, Some(flags));
        self.cursor_col = self.cursor_col.saturating_add(1);
        grid.set_cursor(self.cursor());
    }

    /// Apply a dispatched CSI action to the decoder state.
    fn apply(&mut self, grid: &mut Grid, action: CsiAction) {
        match action {
            CsiAction::CursorPosition { row, col } => {
                self.cursor_row = row;
                self.cursor_col = col;
            }
            CsiAction::CursorUp(n) => {
                self.cursor_row = self.cursor_row.saturating_sub(n);
            }
            CsiAction::CursorDown(n) => {
                self.cursor_row = self.cursor_row.saturating_add(n);
            }
            CsiAction::CursorForward(n) => {
                self.cursor_col = self.cursor_col.saturating_add(n);
            }
            CsiAction::CursorBack(n) => {
                self.cursor_col = self.cursor_col.saturating_sub(n);
            }
            CsiAction::ClearScreen => {
                self.pending_clear = true;
                return;
            }
            CsiAction::Attributes { params, count } => {
                for &param in &params[..count.min(MAX_CSI_PARAMS)] {
                    self.apply_sgr(param);
                }
                return;
            }
            CsiAction::Ignore => return,
        }
        grid.set_cursor(self.cursor());
    }

    /// Apply a single SGR parameter.
    fn apply_sgr(&mut self, param: u16) {
        match param {
            0 => {
                self.fg = None;
                self.bg = None;
                self.bold = false;
                self.underline = false;
            }
            1 => self.bold = true,
            4 => self.underline = true,
            30..=37 => self.fg = Some((param - 30) as u8),
            40..=47 => self.bg = Some((param - 40) as u8),
            _ => {} // Ignore unknown SGR codes
        }
    }

    /// Carry an incomplete sequence to the next chunk, bounded by
    /// [`CARRY_LIMIT`].
    fn stash(&mut self, tail: &[u8]) {
        if tail.len() > CARRY_LIMIT {
            trace!("Dropping runaway escape sequence of {} bytes", tail.len());
            self.carry.clear();
            return;
        }
        self.carry.clear();
        self.carry.extend_from_slice(tail);
    }
}

/// Parse one CSI sequence from `buf`, where `buf[0] == ESC` and
/// `buf[1] == b'['`.
///
/// Parameters are decimal integers separated by `;`; at most
/// [`MAX_CSI_PARAMS`] are kept. Bytes outside `0-9` and `;` before the
/// terminator are skipped. The terminator is the first byte in `@`..=`~`.
fn parse_csi(buf: &[u8]) -> CsiParse {
    debug_assert!(buf.len() >= 2 && buf[0] == ESC && buf[1] == b'[');

    let mut params = [0u16; MAX_CSI_PARAMS];
    let mut count = 0usize;
    let mut current = 0u16;

    let mut j = 2;
    while j < buf.len() {
        let byte = buf[j];
        match byte {
            b'0'..=b'9' => {
                current = current
                    .saturating_mul(10)
                    .saturating_add(u16::from(byte - b'0'));
            }
            b';' => {
                if count < MAX_CSI_PARAMS {
                    params[count] = current;
                }
                count += 1;
                current = 0;
            }
            0x40..=0x7e => {
                if count < MAX_CSI_PARAMS {
                    params[count] = current;
                }
                count += 1;
                let action = dispatch(byte, params, count.min(MAX_CSI_PARAMS));
                return CsiParse::Complete {
                    action,
                    consumed: j + 1,
                };
            }
            _ => {} // forward-compatible skip
        }
        j += 1;
    }
    CsiParse::Incomplete
}

/// Map a terminator byte plus collected parameters to an action.
///
/// A parameter of 0 means "not given"; movement commands default it to 1 and
/// position commands treat it as row/column 1.
fn dispatch(terminator: u8, params: [u16; MAX_CSI_PARAMS], count: usize) -> CsiAction {
    let p1 = params[0];
    let p2 = params[1];
    match terminator {
        b'H' | b'f' => CsiAction::CursorPosition {
            row: p1.max(1) - 1,
            col: p2.max(1) - 1,
        },
        b'A' => CsiAction::CursorUp(p1.max(1)),
        b'B' => CsiAction::CursorDown(p1.max(1)),
        b'C' => CsiAction::CursorForward(p1.max(1)),
        b'D' => CsiAction::CursorBack(p1.max(1)),
        b'J' => CsiAction::ClearScreen,
        b'm' => CsiAction::Attributes { params, count },
        _ => CsiAction::Ignore,
    }
}

/// Decode one UTF-8 code point from the start of `buf`.
///
/// Standard leading-byte patterns select 1-4 byte sequences; continuation
/// bytes are taken as-is. An invalid leading byte decodes as a literal
/// one-byte codepoint (lossy, never an error).
fn decode_utf8(buf: &[u8]) -> Utf8Decode {
    let c = buf[0];

    // Single byte (ASCII)
    if c & 0x80 == 0 {
        return Utf8Decode::Complete {
            codepoint: u32::from(c),
            len: 1,
        };
    }
    // 2-byte sequence
    if c & 0xe0 == 0xc0 {
        if buf.len() < 2 {
            return Utf8Decode::Incomplete;
        }
        return Utf8Decode::Complete {
            codepoint: (u32::from(c & 0x1f) << 6) | u32::from(buf[1] & 0x3f),
            len: 2,
        };
    }
    // 3-byte sequence
    if c & 0xf0 == 0xe0 {
        if buf.len() < 3 {
            return Utf8Decode::Incomplete;
        }
        return Utf8Decode::Complete {
            codepoint: (u32::from(c & 0x0f) << 12)
                | (u32::from(buf[1] & 0x3f) << 6)
                | u32::from(buf[2] & 0x3f),
            len: 3,
        };
    }
    // 4-byte sequence
    if c & 0xf8 == 0xf0 {
        if buf.len() < 4 {
            return Utf8Decode::Incomplete;
        }
        return Utf8Decode::Complete {
            codepoint: (u32::from(c & 0x07) << 18)
                | (u32::from(buf[1] & 0x3f) << 12)
                | (u32::from(buf[2] & 0x3f) << 6)
                | u32::from(buf[3] & 0x3f),
            len: 4,
        };
    }
    // Invalid leading byte: literal single-byte codepoint
    Utf8Decode::Complete {
        codepoint: u32::from(c),
        len: 1,
    }
}
