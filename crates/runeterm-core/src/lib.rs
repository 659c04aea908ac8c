//! # runeterm-core
//!
//! Core types for the runeterm terminal emulator.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other runeterm crates:
//!
//! - Cell and color types for the terminal grid
//! - Geometry types (Position, Dimensions)
//! - Configuration
//! - Error types
//!
//! ## Architecture
//!
//! This is the lowest layer - all other crates depend on this one, but this
//! crate depends on nothing internal.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cell;
pub mod config;
pub mod error;
pub mod geometry;

// Re-export commonly used types
pub use cell::{Cell, CellFlags, Color};
pub use config::{Config, FontSettings, ShellSettings, ViewportSettings};
pub use error::{Error, Result};
pub use geometry::{Dimensions, Position};
