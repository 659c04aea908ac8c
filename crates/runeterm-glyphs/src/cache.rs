//! On-demand glyph cache.
//!
//! ASCII glyphs are rasterized eagerly at font load; everything else is
//! loaded lazily and memoized in a bounded map. Codepoints the font cannot
//! render resolve to a `'?'` fallback so the grid never holds a silently
//! unrenderable cell.

use std::collections::HashMap;

use tracing::{debug, warn};

/// Size of the eagerly loaded ASCII table.
pub const ASCII_TABLE_SIZE: usize = 128;

/// Opaque handle to a glyph texture owned by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// A rasterized glyph bitmap plus placement metrics, ready for upload.
///
/// `pixels` is tightly packed RGBA, `width * height * 4` bytes.
#[derive(Debug, Clone)]
pub struct GlyphBitmap {
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
    /// Offset from the pen position to the left edge of the bitmap
    pub bearing_x: i32,
    /// Offset from the baseline to the top of the bitmap
    pub bearing_y: i32,
    /// RGBA pixel data
    pub pixels: Vec<u8>,
}

/// Renderable metrics and texture handle for one codepoint in one font.
///
/// Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    /// Texture handle issued by the uploader
    pub texture: TextureHandle,
    /// Bitmap width in pixels
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
    /// Offset from the pen position to the left edge of the bitmap
    pub bearing_x: i32,
    /// Offset from the baseline to the top of the bitmap
    pub bearing_y: i32,
    /// Horizontal pen advance in pixels
    pub advance: f32,
}

/// The font side of the cache: codepoint to glyph id mapping plus
/// rasterization.
///
/// A `None` glyph index means the font has no glyph for the codepoint.
pub trait FontBackend {
    /// Look up the font's glyph id for a codepoint; `None` if the font has no
    /// glyph for it.
    fn glyph_index(&self, codepoint: u32) -> Option<u16>;
    /// Horizontal advance for a glyph, in pixels.
    fn advance_width(&self, glyph_id: u16) -> f32;
    /// Rasterize a glyph to a bitmap. `None` if the font cannot render it.
    fn rasterize(&mut self, glyph_id: u16) -> Option<GlyphBitmap>;
}

/// The renderer side of the cache: turns bitmaps into texture handles.
///
/// The GPU pipeline is an external collaborator, so it plugs in behind this
/// trait.
pub trait TextureUploader {
    /// Upload a bitmap, returning the handle the renderer will draw with.
    fn upload(&mut self, bitmap: &GlyphBitmap) -> TextureHandle;
}

/// Glyph cache: eager ASCII table plus a bounded lazy map for the rest.
///
/// Entries are append-only for the lifetime of the font; there is no
/// eviction. Inserts are idempotent - a codepoint is rasterized and uploaded
/// at most once while capacity remains.
pub struct GlyphCache {
    backend: Box<dyn FontBackend>,
    uploader: Box<dyn TextureUploader>,
    /// Eagerly loaded glyphs for codepoints 0-127; `None` = font had no glyph
    ascii: [Option<Glyph>; ASCII_TABLE_SIZE],
    /// Lazily loaded glyphs for codepoints >= 128
    extended: HashMap<u32, Glyph>,
    /// Maximum number of entries `extended` may hold
    capacity: usize,
    /// The `'?'` glyph unsupported codepoints resolve to
    fallback: Option<Glyph>,
    /// Fixed horizontal step for every grid column, in pixels
    cell_advance: u32,
}

impl std::fmt::Debug for GlyphCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphCache")
            .field("extended_len", &self.extended.len())
            .field("capacity", &self.capacity)
            .field("cell_advance", &self.cell_advance)
            .finish_non_exhaustive()
    }
}

impl GlyphCache {
    /// Create an empty cache over a font backend and texture uploader.
    ///
    /// Call [`GlyphCache::preload_ascii`] before the first frame.
    pub fn new(
        backend: Box<dyn FontBackend>,
        uploader: Box<dyn TextureUploader>,
        capacity: usize,
    ) -> Self {
        Self {
            backend,
            uploader,
            ascii: [None; ASCII_TABLE_SIZE],
            extended: HashMap::new(),
            capacity,
            fallback: None,
            cell_advance: 1,
        }
    }

    /// Eagerly rasterize and store glyphs for codepoints 0-127.
    ///
    /// A codepoint the font has no glyph for leaves its slot empty; the
    /// renderer treats an empty slot as "skip, advance one cell". Also
    /// resolves the `'?'` fallback glyph and the fixed cell advance (from the
    /// space character's advance metric).
    pub fn preload_ascii(&mut self) {
        for codepoint in 0..ASCII_TABLE_SIZE as u32 {
            self.ascii[codepoint as usize] = self.load(codepoint);
        }

        self.fallback = self.ascii['?' as usize];
        if self.fallback.is_none() {
            warn!("font has no '?' glyph; unsupported codepoints will render as gaps");
        }

        // The space advance is the monospace step for every column. Glyph
        // bitmaps wider than this clip or overlap instead of reflowing.
        self.cell_advance = match self.ascii[' ' as usize] {
            Some(space) => (space.advance.round() as u32).max(1),
            None => self.max_cell_extent().0,
        };

        debug!(
            "Preloaded {} ASCII glyphs, cell advance {}px",
            self.ascii.iter().filter(|g| g.is_some()).count(),
            self.cell_advance
        );
    }

    /// Look up the glyph for a codepoint.
    ///
    /// ASCII comes from the preloaded table (fallback if the slot is empty).
    /// Other codepoints are served from the cache, or loaded on demand and
    /// memoized while capacity remains; at capacity the glyph is still
    /// returned, just not cached. A codepoint the font cannot render resolves
    /// to the fallback, and the miss is not cached. Returns `None` only when
    /// even the fallback is unavailable.
    pub fn lookup(&mut self, codepoint: u32) -> Option<Glyph> {
        if (codepoint as usize) < ASCII_TABLE_SIZE {
            return self.ascii[codepoint as usize].or(self.fallback);
        }

        if let Some(glyph) = self.extended.get(&codepoint) {
            return Some(*glyph);
        }

        match self.load(codepoint) {
            Some(glyph) => {
                if self.extended.len() < self.capacity {
                    self.extended.insert(codepoint, glyph);
                } else {
                    debug!("Glyph cache full; returning uncached glyph for U+{:04X}", codepoint);
                }
                Some(glyph)
            }
            None => self.fallback,
        }
    }

    /// The fixed horizontal step used for every grid column, in pixels.
    pub fn cell_advance(&self) -> u32 {
        self.cell_advance
    }

    /// Largest ASCII glyph bitmap extent (width, height), each at least 1.
    ///
    /// This is the cell size the grid is dimensioned from.
    pub fn max_cell_extent(&self) -> (u32, u32) {
        let mut width = 1;
        let mut height = 1;
        for glyph in self.ascii.iter().flatten() {
            width = width.max(glyph.width);
            height = height.max(glyph.height);
        }
        (width, height)
    }

    /// Number of lazily cached (non-ASCII) glyphs.
    pub fn cached_len(&self) -> usize {
        self.extended.len()
    }

    /// Maximum number of lazily cached glyphs.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Rasterize and upload a single codepoint.
    fn load(&mut self, codepoint: u32) -> Option<Glyph> {
        let glyph_id = self.backend.glyph_index(codepoint)?;
        let bitmap = self.backend.rasterize(glyph_id)?;
        let texture = self.uploader.upload(&bitmap);
        Some(Glyph {
            texture,
            width: bitmap.width,
            height: bitmap.height,
            bearing_x: bitmap.bearing_x,
            bearing_y: bitmap.bearing_y,
            advance: self.backend.advance_width(glyph_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Backend with a configurable set of missing codepoints; glyph bitmaps
    /// are 8x16 with a fixed advance.
    struct StubBackend {
        missing: Vec<u32>,
        rasterized: Rc<RefCell<u32>>,
    }

    impl StubBackend {
        fn new(missing: Vec<u32>) -> (Self, Rc<RefCell<u32>>) {
            let rasterized = Rc::new(RefCell::new(0));
            (
                Self {
                    missing,
                    rasterized: Rc::clone(&rasterized),
                },
                rasterized,
            )
        }
    }

    impl FontBackend for StubBackend {
        fn glyph_index(&self, codepoint: u32) -> Option<u16> {
            if self.missing.contains(&codepoint) {
                return None;
            }
            Some((codepoint % 0xffff) as u16 + 1)
        }

        fn advance_width(&self, _glyph_id: u16) -> f32 {
            8.0
        }

        fn rasterize(&mut self, _glyph_id: u16) -> Option<GlyphBitmap> {
            *self.rasterized.borrow_mut() += 1;
            Some(GlyphBitmap {
                width: 8,
                height: 16,
                bearing_x: 0,
                bearing_y: 12,
                pixels: vec![0u8; 8 * 16 * 4],
            })
        }
    }

    /// Uploader issuing sequential handles.
    struct CountingUploader {
        next: u32,
    }

    impl TextureUploader for CountingUploader {
        fn upload(&mut self, _bitmap: &GlyphBitmap) -> TextureHandle {
            let handle = TextureHandle(self.next);
            self.next += 1;
            handle
        }
    }

    fn cache_with(missing: Vec<u32>, capacity: usize) -> (GlyphCache, Rc<RefCell<u32>>) {
        let (backend, rasterized) = StubBackend::new(missing);
        let mut cache = GlyphCache::new(
            Box::new(backend),
            Box::new(CountingUploader { next: 1 }),
            capacity,
        );
        cache.preload_ascii();
        (cache, rasterized)
    }

    #[test]
    fn test_preload_populates_ascii() {
        let (mut cache, rasterized) = cache_with(vec![], 16);
        assert_eq!(*rasterized.borrow(), 128);

        let a = cache.lookup('A' as u32).unwrap();
        assert_eq!(a.width, 8);
        assert_eq!(a.advance, 8.0);
        // Served from the table, no further rasterization
        assert_eq!(*rasterized.borrow(), 128);
    }

    #[test]
    fn test_missing_ascii_slot_falls_back() {
        let (mut cache, _) = cache_with(vec![0x07], 16);
        let bell = cache.lookup(0x07).unwrap();
        let question = cache.lookup('?' as u32).unwrap();
        assert_eq!(bell.texture, question.texture);
    }

    #[test]
    fn test_lookup_is_idempotent() {
        let (mut cache, rasterized) = cache_with(vec![], 16);
        let before = *rasterized.borrow();

        let first = cache.lookup(0x00e9).unwrap();
        let second = cache.lookup(0x00e9).unwrap();

        // Same cached handle, one rasterization
        assert_eq!(first.texture, second.texture);
        assert_eq!(*rasterized.borrow(), before + 1);
        assert_eq!(cache.cached_len(), 1);
    }

    #[test]
    fn test_unsupported_codepoint_falls_back_uncached() {
        let (mut cache, _) = cache_with(vec![0x2603], 16);

        let snowman = cache.lookup(0x2603).unwrap();
        let question = cache.lookup('?' as u32).unwrap();
        assert_eq!(snowman.texture, question.texture);

        // Misses are not cached
        assert_eq!(cache.cached_len(), 0);
        cache.lookup(0x2603).unwrap();
        assert_eq!(cache.cached_len(), 0);
    }

    #[test]
    fn test_capacity_exhaustion_keeps_serving() {
        let (mut cache, _) = cache_with(vec![], 2);

        let first = cache.lookup(0x1000).unwrap();
        let second = cache.lookup(0x1001).unwrap();
        assert_eq!(cache.cached_len(), 2);

        // Cache is full: further codepoints still resolve, uncached.
        let overflow = cache.lookup(0x1002).unwrap();
        assert_eq!(overflow.width, 8);
        assert_eq!(cache.cached_len(), 2);

        // Existing entries are untouched.
        assert_eq!(cache.lookup(0x1000).unwrap().texture, first.texture);
        assert_eq!(cache.lookup(0x1001).unwrap().texture, second.texture);
    }

    #[test]
    fn test_cell_advance_from_space() {
        let (cache, _) = cache_with(vec![], 16);
        assert_eq!(cache.cell_advance(), 8);
    }

    #[test]
    fn test_max_cell_extent() {
        let (cache, _) = cache_with(vec![], 16);
        assert_eq!(cache.max_cell_extent(), (8, 16));
    }

    #[test]
    fn test_max_cell_extent_without_preload() {
        let (backend, _) = StubBackend::new(vec![]);
        let cache = GlyphCache::new(
            Box::new(backend),
            Box::new(CountingUploader { next: 1 }),
            16,
        );
        // Degenerate but safe: never zero, so grid sizing cannot divide by 0.
        assert_eq!(cache.max_cell_extent(), (1, 1));
    }
}
