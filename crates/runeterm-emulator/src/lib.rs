//! # runeterm-emulator
//!
//! Terminal emulation for runeterm.
//!
//! This crate provides:
//! - A byte-stream decoder for UTF-8 text and the supported ANSI/VT CSI subset
//! - Terminal grid state management
//! - PTY (pseudo-terminal) lifecycle management
//!
//! ## Architecture
//!
//! Depends only on runeterm-core. The decoder consumes chunks read from the
//! PTY and mutates the grid; both are owned by the session layer above and
//! polled once per render frame.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod decoder;
pub mod grid;
pub mod pty;

// Re-export commonly used types
pub use decoder::{CsiAction, Decoder};
pub use grid::Grid;
pub use pty::PtySession;
