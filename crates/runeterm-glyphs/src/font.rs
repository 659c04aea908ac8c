//! Font data ownership and the swash rasterization backend.

use std::path::Path;
use std::sync::Arc;

use swash::scale::image::Content;
use swash::scale::{Render, ScaleContext, Source, StrikeWith};
use swash::zeno::Format;
use swash::FontRef;
use tracing::debug;

use runeterm_core::{Error, Result};

use crate::cache::{FontBackend, GlyphBitmap};

/// Stores font data with lifetime management.
///
/// Owns the raw font bytes and provides a `FontRef` for glyph lookups and
/// rasterization, valid for the lifetime of this struct.
#[derive(Clone)]
pub struct FontData {
    /// Raw font data bytes (TTF/OTF)
    data: Arc<Vec<u8>>,
    /// Swash font reference for glyph operations
    font_ref: FontRef<'static>,
}

impl std::fmt::Debug for FontData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontData")
            .field("data_len", &self.data.len())
            .finish()
    }
}

impl FontData {
    /// Create a new `FontData` from raw TTF/OTF bytes (face index 0).
    ///
    /// Returns `None` if swash cannot parse the data.
    pub fn new(data: Vec<u8>) -> Option<Self> {
        let data_arc = Arc::new(data);

        // SAFETY: the Arc keeps the bytes alive for as long as this struct,
        // and the FontRef never leaves the struct, so the 'static lifetime is
        // never observable past the data it points into.
        let font_ref = unsafe {
            let bytes = data_arc.as_slice();
            let static_bytes: &'static [u8] = std::mem::transmute(bytes);
            FontRef::from_index(static_bytes, 0)?
        };

        Some(FontData {
            data: data_arc,
            font_ref,
        })
    }

    /// Load a font file from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| Error::Font(format!("Failed to read '{}': {e}", path.display())))?;
        Self::new(bytes)
            .ok_or_else(|| Error::Font(format!("'{}' is not a usable font", path.display())))
    }

    /// The swash font reference.
    pub fn font_ref(&self) -> FontRef<'static> {
        self.font_ref
    }
}

/// Swash-based implementation of the glyph cache's font backend.
///
/// Rasterizes alpha masks into white RGBA bitmaps the uploader can push to a
/// texture; color sources (emoji fonts) pass through as-is.
pub struct SwashFont {
    font: FontData,
    size_px: f32,
    context: ScaleContext,
}

impl std::fmt::Debug for SwashFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwashFont")
            .field("size_px", &self.size_px)
            .finish_non_exhaustive()
    }
}

impl SwashFont {
    /// Create a backend rendering `font` at `size_px` pixels.
    pub fn new(font: FontData, size_px: f32) -> Self {
        Self {
            font,
            size_px,
            context: ScaleContext::new(),
        }
    }

    /// Scale factor from font units to pixels at the configured size.
    fn units_to_px(&self) -> f32 {
        let units_per_em = self.font.font_ref().metrics(&[]).units_per_em;
        if units_per_em == 0 {
            return 1.0;
        }
        self.size_px / f32::from(units_per_em)
    }
}

impl FontBackend for SwashFont {
    fn glyph_index(&self, codepoint: u32) -> Option<u16> {
        let ch = char::from_u32(codepoint)?;
        let glyph_id = self.font.font_ref().charmap().map(ch);
        // Glyph id 0 is .notdef: the font has no glyph for this codepoint.
        (glyph_id != 0).then_some(glyph_id)
    }

    fn advance_width(&self, glyph_id: u16) -> f32 {
        let advance = self.font.font_ref().glyph_metrics(&[]).advance_width(glyph_id);
        advance * self.units_to_px()
    }

    fn rasterize(&mut self, glyph_id: u16) -> Option<GlyphBitmap> {
        let font_ref = self.font.font_ref();
        let mut scaler = self
            .context
            .builder(font_ref)
            .size(self.size_px)
            .hint(true)
            .build();

        // Color sources first so emoji fonts come out as colored bitmaps;
        // plain text fonts fall through to Outline.
        let image = Render::new(&[
            Source::ColorBitmap(StrikeWith::BestFit),
            Source::ColorOutline(0),
            Source::Outline,
        ])
        .format(Format::Alpha)
        .render(&mut scaler, glyph_id)?;

        let pixels = match image.content {
            Content::Color => image.data.clone(),
            Content::Mask => {
                let mut pixels = Vec::with_capacity(image.data.len() * 4);
                for &alpha in &image.data {
                    pixels.extend_from_slice(&[255, 255, 255, alpha]);
                }
                pixels
            }
            Content::SubpixelMask => {
                // Derive alpha from RGB luminance.
                let mut pixels = Vec::with_capacity(image.data.len() / 3 * 4);
                for chunk in image.data.chunks_exact(3) {
                    let alpha = ((u32::from(chunk[0]) * 299
                        + u32::from(chunk[1]) * 587
                        + u32::from(chunk[2]) * 114)
                        / 1000) as u8;
                    pixels.extend_from_slice(&[255, 255, 255, alpha]);
                }
                pixels
            }
        };

        debug!(
            "Rasterized glyph {} ({}x{})",
            glyph_id, image.placement.width, image.placement.height
        );

        Some(GlyphBitmap {
            width: image.placement.width,
            height: image.placement.height,
            bearing_x: image.placement.left,
            bearing_y: image.placement.top,
            pixels,
        })
    }
}
