use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use image::{imageops, RgbaImage};
use log::{debug, warn};

use super::scramble::scramble_glyph;
use super::source::GlyphSource;
use crate::scroll::layout::GlyphAdvances;

/// Horizontal gap between packed glyphs.
pub const ATLAS_PADDING: u32 = 2;

pub const PRINTABLE_ASCII: RangeInclusive<char> = ' '..='~';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AtlasGlyph {
    pub ch: char,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub advance: u32,
}

/// A single-row texture of scrambled glyphs.
#[derive(Clone, Debug)]
pub struct ScrambledAtlas {
    image: RgbaImage,
    glyphs: BTreeMap<char, AtlasGlyph>,
}

impl ScrambledAtlas {
    /// Renders, scrambles and packs every requested character.
    ///
    /// Characters the source cannot render are skipped.
    pub fn build<S, I>(source: &mut S, chars: I) -> Self
    where
        S: GlyphSource + ?Sized,
        I: IntoIterator<Item = char>,
    {
        let mut rendered = Vec::new();
        for ch in chars {
            match source.render_glyph(ch) {
                Ok(mut glyph) => {
                    scramble_glyph(&mut glyph.image, ch as u32);
                    rendered.push(glyph);
                },
                Err(err) => warn!("skipping glyph {ch:?}: {err}"),
            }
        }

        let total_width: u32 = rendered.iter().map(|g| g.image.width() + ATLAS_PADDING).sum();
        let max_height = rendered.iter().map(|g| g.image.height()).max().unwrap_or(0);

        let mut image = RgbaImage::new(total_width, max_height);
        let mut glyphs = BTreeMap::new();
        let mut x = 0u32;

        for glyph in rendered {
            let (width, height) = glyph.image.dimensions();
            imageops::replace(&mut image, &glyph.image, i64::from(x), 0);
            glyphs.insert(glyph.ch, AtlasGlyph {
                ch: glyph.ch,
                x,
                y: 0,
                width,
                height,
                advance: glyph.advance,
            });
            x += width + ATLAS_PADDING;
        }

        debug!("packed {} scrambled glyphs into {}x{} atlas", glyphs.len(), total_width, max_height);
        Self { image, glyphs }
    }

    pub fn build_printable<S: GlyphSource + ?Sized>(source: &mut S) -> Self {
        Self::build(source, PRINTABLE_ASCII)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn glyph(&self, ch: char) -> Option<&AtlasGlyph> {
        self.glyphs.get(&ch)
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    pub fn advances(&self) -> GlyphAdvances {
        self.glyphs.values().map(|glyph| (glyph.ch, glyph.advance)).collect()
    }
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;
    use crate::glyph::source::{GlyphBitmap, StaticGlyphs};

    fn solid(ch: char, width: u32, height: u32, shade: u8) -> GlyphBitmap {
        GlyphBitmap {
            ch,
            image: RgbaImage::from_pixel(width, height, Rgba([shade, shade, shade, 255])),
            advance: width + 1,
        }
    }

    #[test]
    fn glyphs_pack_left_to_right_with_padding() {
        let mut source = StaticGlyphs::new();
        source.insert(solid('a', 10, 12, 10));
        source.insert(solid('b', 8, 16, 20));

        let atlas = ScrambledAtlas::build(&mut source, ['a', 'b']);
        assert_eq!(atlas.image().dimensions(), (10 + 8 + 2 * ATLAS_PADDING, 16));

        let b = atlas.glyph('b').unwrap();
        assert_eq!((b.x, b.width, b.height, b.advance), (12, 8, 16, 9));
        assert_eq!(atlas.image().get_pixel(12, 0), &Rgba([20, 20, 20, 255]));
        assert_eq!(atlas.image().get_pixel(10, 0), &Rgba([0, 0, 0, 0]));
    }

    #[test]
    fn missing_glyphs_are_skipped() {
        let mut source = StaticGlyphs::new();
        source.insert(solid('A', 16, 16, 200));

        let atlas = ScrambledAtlas::build_printable(&mut source);
        assert_eq!(atlas.len(), 1);
        assert!(atlas.glyph('B').is_none());
        assert_eq!(atlas.advances().advance('A'), Some(17));
    }

    #[test]
    fn packed_glyphs_are_scrambled() {
        let mut image = RgbaImage::new(16, 16);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            *pixel = Rgba([x as u8 * 16, y as u8 * 16, 0, 255]);
        }
        let mut source = StaticGlyphs::new();
        source.insert(GlyphBitmap { ch: 'W', image: image.clone(), advance: 16 });

        let atlas = ScrambledAtlas::build(&mut source, ['W']);
        let mut expected = image;
        scramble_glyph(&mut expected, 'W' as u32);

        let packed = imageops::crop_imm(atlas.image(), 0, 0, 16, 16).to_image();
        assert_eq!(packed, expected);
    }
}
