//! # runeterm-glyphs
//!
//! Glyph cache and font backend for runeterm.
//!
//! This crate provides:
//! - Font data ownership and swash-based rasterization
//! - An eager ASCII glyph table plus a bounded lazy cache for the rest of
//!   Unicode, with `'?'` fallback for codepoints the font cannot render
//! - The fixed cell advance that keeps the grid monospaced
//!
//! The GPU texture upload is behind the [`TextureUploader`] trait; the draw
//! pipeline itself lives outside this workspace and reads the cache once per
//! frame.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cache;
pub mod font;

// Re-export commonly used types
pub use cache::{
    FontBackend, Glyph, GlyphBitmap, GlyphCache, TextureHandle, TextureUploader,
    ASCII_TABLE_SIZE,
};
pub use font::{FontData, SwashFont};
