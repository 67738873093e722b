use std::collections::BTreeMap;

use image::RgbaImage;

use crate::WaveError;

/// One rasterized character ready for scrambling.
#[derive(Clone, Debug)]
pub struct GlyphBitmap {
    pub ch: char,
    pub image: RgbaImage,
    /// Horizontal advance in pixels at the rendered size.
    pub advance: u32,
}

pub trait GlyphSource {
    fn render_glyph(&mut self, ch: char) -> Result<GlyphBitmap, WaveError>;
}

/// Glyphs rendered ahead of time, e.g. loaded from image files.
#[derive(Clone, Debug, Default)]
pub struct StaticGlyphs {
    glyphs: BTreeMap<char, GlyphBitmap>,
}

impl StaticGlyphs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, glyph: GlyphBitmap) {
        self.glyphs.insert(glyph.ch, glyph);
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn chars(&self) -> impl Iterator<Item = char> + '_ {
        self.glyphs.keys().copied()
    }
}

impl GlyphSource for StaticGlyphs {
    fn render_glyph(&mut self, ch: char) -> Result<GlyphBitmap, WaveError> {
        self.glyphs.get(&ch).cloned().ok_or(WaveError::MissingGlyph(ch))
    }
}
