use std::collections::HashSet;

use image::Rgba;
use wave_render::{GlyphAdvances, Raster, Rasterizer, WaveError, PRINTABLE_ASCII};

/// Width of every glyph as a share of the font size.
const ADVANCE_RATIO: f32 = 0.6;

/// A rasterizer that only measures text, for running the scroll field without a display.
///
/// Every character has the same advance, so widths are predictable and the
/// output lines up in a terminal.
#[derive(Debug)]
pub struct MetricRasterizer {
    advance: u32,
    height: u32,
    next: u64,
    live: HashSet<u64>,
}

impl MetricRasterizer {
    pub fn new(font_size: u32) -> Self {
        let height = font_size.max(1);
        Self {
            advance: ((height as f32 * ADVANCE_RATIO) as u32).max(1),
            height,
            next: 0,
            live: HashSet::new(),
        }
    }

    /// Advance table matching the widths this rasterizer reports.
    pub fn advances(&self) -> GlyphAdvances {
        PRINTABLE_ASCII.map(|ch| (ch, self.advance)).collect()
    }

    pub fn live_handles(&self) -> usize {
        self.live.len()
    }

    pub fn issued_handles(&self) -> u64 {
        self.next
    }
}

impl Rasterizer for MetricRasterizer {
    type Handle = u64;

    fn rasterize(
        &mut self,
        _font: &str,
        text: &str,
        _color: Rgba<u8>,
    ) -> Result<Raster<u64>, WaveError> {
        if text.is_empty() {
            return Err(WaveError::Raster { text: String::new(), reason: "empty text".into() });
        }

        self.next += 1;
        self.live.insert(self.next);
        Ok(Raster {
            handle: self.next,
            width: text.chars().count() as u32 * self.advance,
            height: self.height,
        })
    }

    fn release(&mut self, handle: u64) {
        if !self.live.remove(&handle) {
            log::warn!("release of unknown handle {handle}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    #[test]
    fn widths_follow_character_count() {
        let mut rasterizer = MetricRasterizer::new(100);
        let raster = rasterizer.rasterize("Scrambled", "calm", WHITE).unwrap();
        assert_eq!((raster.width, raster.height), (240, 100));
        assert_eq!(rasterizer.advances().advance('c'), Some(60));
    }

    #[test]
    fn live_handles_track_releases() {
        let mut rasterizer = MetricRasterizer::new(32);
        let a = rasterizer.rasterize("f", "a", WHITE).unwrap();
        let b = rasterizer.rasterize("f", "b", WHITE).unwrap();
        assert_eq!(rasterizer.live_handles(), 2);

        rasterizer.release(a.handle);
        rasterizer.release(a.handle);
        assert_eq!(rasterizer.live_handles(), 1);

        rasterizer.release(b.handle);
        assert_eq!(rasterizer.live_handles(), 0);
        assert_eq!(rasterizer.issued_handles(), 2);
    }

    #[test]
    fn empty_text_is_refused() {
        let mut rasterizer = MetricRasterizer::new(32);
        assert!(rasterizer.rasterize("f", "", WHITE).is_err());
        assert_eq!(rasterizer.issued_handles(), 0);
    }
}
