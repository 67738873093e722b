use std::collections::HashMap;
use std::sync::Arc;

/// Estimated advance for a character when no glyph metrics are known.
const FALLBACK_ADVANCE: f32 = 10.0;

const MIN_FONT_SCALE: f32 = 0.01;

/// Per-character horizontal advances at the font's base size.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphAdvances {
    advances: HashMap<char, u32>,
}

impl GlyphAdvances {
    pub fn advance(&self, ch: char) -> Option<u32> {
        self.advances.get(&ch).copied()
    }

    pub fn len(&self) -> usize {
        self.advances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.advances.is_empty()
    }
}

impl FromIterator<(char, u32)> for GlyphAdvances {
    fn from_iter<T: IntoIterator<Item = (char, u32)>>(iter: T) -> Self {
        Self { advances: iter.into_iter().collect() }
    }
}

/// Screen geometry and font metrics used to lay out lines of words.
#[derive(Clone, Debug)]
pub struct LineRenderContext {
    pub screen_width: u32,
    pub screen_height: u32,
    pub font_scale: f32,
    /// Gap between neighbouring words, already scaled.
    pub space_width: u32,
    pub advances: Option<Arc<GlyphAdvances>>,
}

impl LineRenderContext {
    pub fn new(screen_width: u32, screen_height: u32, font_scale: f32, space_width: u32) -> Self {
        Self { screen_width, screen_height, font_scale, space_width, advances: None }
    }

    /// Builds a context whose space width comes from the font's own space glyph.
    pub fn from_advances(
        screen_width: u32,
        screen_height: u32,
        font_scale: f32,
        advances: GlyphAdvances,
    ) -> Self {
        let space = advances.advance(' ').map_or(FALLBACK_ADVANCE, |adv| adv as f32);
        let space_width = (space * font_scale.max(MIN_FONT_SCALE)) as u32;
        Self {
            screen_width,
            screen_height,
            font_scale,
            space_width,
            advances: Some(Arc::new(advances)),
        }
    }

    /// Copy with every dimension clamped to something that can be laid out.
    pub fn sanitized(&self) -> Self {
        let font_scale =
            if self.font_scale.is_finite() { self.font_scale.max(MIN_FONT_SCALE) } else { 1.0 };
        Self {
            screen_width: self.screen_width.max(1),
            screen_height: self.screen_height.max(1),
            font_scale,
            space_width: self.space_width,
            advances: self.advances.clone(),
        }
    }

    pub fn center_x(&self) -> i32 {
        (self.screen_width / 2) as i32
    }

    /// Portion of the screen width lines may occupy, never below one pixel.
    pub fn usable_width(&self, ratio: f32) -> u32 {
        ((self.screen_width.max(1) as f32 * ratio) as u32).max(1)
    }

    /// Number of stacked lines needed to cover the screen height.
    pub fn line_slots(&self, line_height: u32) -> usize {
        self.screen_height.max(1).div_ceil(line_height.max(1)) as usize
    }

    pub fn measure_word(&self, word: &str) -> u32 {
        let scale = self.font_scale.max(MIN_FONT_SCALE);
        match &self.advances {
            Some(advances) => word
                .chars()
                .filter_map(|ch| advances.advance(ch))
                .map(|advance| (advance as f32 * scale) as u32)
                .sum(),
            None => (word.chars().count() as f32 * FALLBACK_ADVANCE * scale) as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_measure_from_advances() {
        let advances: GlyphAdvances = [('a', 20), ('b', 30), (' ', 12)].into_iter().collect();
        let context = LineRenderContext::from_advances(800, 600, 0.5, advances);

        assert_eq!(context.space_width, 6);
        assert_eq!(context.measure_word("ab"), 25);
        // unknown characters contribute nothing
        assert_eq!(context.measure_word("a?"), 10);
    }

    #[test]
    fn words_measure_by_estimate_without_metrics() {
        let context = LineRenderContext::new(800, 600, 2.0, 10);
        assert_eq!(context.measure_word("four"), 80);
    }

    #[test]
    fn degenerate_geometry_is_clamped() {
        let context = LineRenderContext::new(0, 0, 0.0, 0).sanitized();
        assert_eq!(context.screen_width, 1);
        assert_eq!(context.screen_height, 1);
        assert!(context.font_scale > 0.0);
        assert_eq!(context.usable_width(0.9), 1);
        assert_eq!(context.line_slots(0), 1);
    }

    #[test]
    fn line_slots_round_up() {
        let context = LineRenderContext::new(800, 100, 1.0, 10);
        assert_eq!(context.line_slots(16), 7);
        assert_eq!(context.line_slots(20), 5);
    }
}
