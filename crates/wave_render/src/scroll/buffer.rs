use std::collections::VecDeque;

use image::Rgba;
use log::{debug, info, warn};

use super::layout::LineRenderContext;
use super::velocity::VelocityModulator;
use crate::config::WaveConfig;
use crate::pattern::color::ColorPattern;
use crate::pattern::line::LinePattern;
use crate::WaveError;

/// Text used to measure the shared line height.
const LINE_HEIGHT_SAMPLE: &str = "Mg";

const SAMPLE_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A drawable resource produced for one piece of text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Raster<H> {
    pub handle: H,
    /// Unscaled pixel width.
    pub width: u32,
    /// Unscaled pixel height.
    pub height: u32,
}

/// Turns text into drawable resources owned by the host's graphics layer.
pub trait Rasterizer {
    type Handle;

    fn rasterize(
        &mut self,
        font: &str,
        text: &str,
        color: Rgba<u8>,
    ) -> Result<Raster<Self::Handle>, WaveError>;

    /// Frees a resource. Each handle is passed here exactly once.
    fn release(&mut self, handle: Self::Handle);
}

/// A positioned, colored word and the resource that draws it.
#[derive(Debug)]
pub struct WordToken<H> {
    text: String,
    color: Rgba<u8>,
    pub x: i32,
    pub y: i32,
    width: u32,
    height: u32,
    handle: Option<H>,
}

impl<H> WordToken<H> {
    pub(crate) fn new(text: String, color: Rgba<u8>, raster: Raster<H>, font_scale: f32) -> Self {
        Self {
            text,
            color,
            x: 0,
            y: 0,
            width: (raster.width as f32 * font_scale) as u32,
            height: (raster.height as f32 * font_scale) as u32,
            handle: Some(raster.handle),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn color(&self) -> Rgba<u8> {
        self.color
    }

    pub fn position(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// `None` once the resource has been released.
    pub fn handle(&self) -> Option<&H> {
        self.handle.as_ref()
    }

    fn release_into<R: Rasterizer<Handle = H> + ?Sized>(&mut self, rasterizer: &mut R) {
        if let Some(handle) = self.handle.take() {
            rasterizer.release(handle);
        }
    }
}

/// Words laid out left to right, centered on the screen.
///
/// `y` is the line's baseline in y-up screen coordinates: 0 is the bottom
/// edge and the screen height is the top edge.
#[derive(Debug)]
pub struct Line<H> {
    words: Vec<WordToken<H>>,
    width: u32,
    y: i32,
}

impl<H> Line<H> {
    fn new(words: Vec<WordToken<H>>) -> Self {
        Self { words, width: 0, y: 0 }
    }

    pub fn words(&self) -> &[WordToken<H>] {
        &self.words
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn y(&self) -> i32 {
        self.y
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn text(&self) -> String {
        self.words.iter().map(WordToken::text).collect::<Vec<_>>().join(" ")
    }

    /// Centers the line on `center_x` at baseline `y`.
    fn place(&mut self, center_x: i32, y: i32, space_width: u32) {
        let gaps = self.words.len().saturating_sub(1) as u32 * space_width;
        self.width = self.words.iter().map(|word| word.width).sum::<u32>() + gaps;
        self.y = y;

        let mut x = center_x - (self.width / 2) as i32;
        for word in &mut self.words {
            word.x = x;
            word.y = y;
            x += (word.width + space_width) as i32;
        }
    }

    fn shift(&mut self, dy: i32) {
        self.y = self.y.saturating_add(dy);
        for word in &mut self.words {
            word.y = word.y.saturating_add(dy);
        }
    }

    fn release_into<R: Rasterizer<Handle = H> + ?Sized>(&mut self, rasterizer: &mut R) {
        for word in &mut self.words {
            word.release_into(rasterizer);
        }
    }
}

/// The strategies a scroll buffer is assembled from.
#[derive(Clone, Debug)]
pub struct ScrollParts {
    pub line_pattern: LinePattern,
    pub colors: ColorPattern,
    pub velocity: VelocityModulator,
    pub font: String,
    /// Line height used when the sample text cannot be rasterized.
    pub fallback_line_height: u32,
}

impl ScrollParts {
    pub fn from_config(config: &WaveConfig) -> Result<Self, WaveError> {
        Ok(Self {
            line_pattern: config.line_pattern.build(config.max_line_words),
            colors: ColorPattern::new(config.palette()?, config.max_color_hold),
            velocity: VelocityModulator::new(config.velocity),
            font: config.font.clone(),
            fallback_line_height: config.standard_font_size,
        })
    }
}

/// The window of visible lines, recycled as content scrolls past either edge.
pub struct ScrollBuffer<R: Rasterizer> {
    rasterizer: R,
    words: Vec<String>,
    cursor: usize,
    line_pattern: LinePattern,
    colors: ColorPattern,
    velocity: VelocityModulator,
    font: String,
    context: LineRenderContext,
    line_height: u32,
    scroll_accumulator: f32,
    lines: VecDeque<Line<R::Handle>>,
    retired: u64,
    shut_down: bool,
}

impl<R: Rasterizer> ScrollBuffer<R> {
    pub fn new(
        rasterizer: R,
        words: Vec<String>,
        config: &WaveConfig,
        context: LineRenderContext,
    ) -> Result<Self, WaveError> {
        Ok(Self::with_parts(rasterizer, words, ScrollParts::from_config(config)?, context))
    }

    /// Builds the buffer and fills the screen with lines stacked from the top edge down.
    pub fn with_parts(
        mut rasterizer: R,
        words: Vec<String>,
        parts: ScrollParts,
        context: LineRenderContext,
    ) -> Self {
        let context = context.sanitized();
        let line_height = measure_line_height(
            &mut rasterizer,
            &parts.font,
            context.font_scale,
            parts.fallback_line_height,
        );

        let mut buffer = Self {
            rasterizer,
            words,
            cursor: 0,
            line_pattern: parts.line_pattern,
            colors: parts.colors,
            velocity: parts.velocity,
            font: parts.font,
            context,
            line_height,
            scroll_accumulator: 0.0,
            lines: VecDeque::new(),
            retired: 0,
            shut_down: false,
        };

        let slots = buffer.context.line_slots(line_height);
        let top = buffer.context.screen_height as i32;
        for slot in 0..slots {
            let y = top - (slot as i32 + 1) * line_height as i32;
            let line = buffer.build_line(y);
            buffer.lines.push_back(line);
        }

        info!(
            "scroll buffer ready: {} {} lines of {}px over {}x{}",
            slots,
            buffer.line_pattern.kind(),
            line_height,
            buffer.context.screen_width,
            buffer.context.screen_height
        );
        buffer
    }

    /// Advances the field by one frame of `dt` seconds.
    ///
    /// Lines are moved first, then retired at the edge they crossed, then
    /// replaced at the opposite edge.
    pub fn update(&mut self, dt: f32) {
        if self.shut_down {
            return;
        }

        self.velocity.advance(dt);
        let velocity = self.velocity.velocity();
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        self.scroll_accumulator += velocity * dt;
        let whole = self.scroll_accumulator.trunc();
        if whole == 0.0 {
            return;
        }

        // Past one full window every line is replaced anyway.
        let span = self.window_span() as f32;
        if whole.is_finite() && whole.abs() <= span {
            self.scroll_accumulator -= whole;
        } else {
            debug!("clamping scroll of {whole}px to {span}px");
            self.scroll_accumulator = 0.0;
        }
        let displacement = if whole.is_nan() { 0 } else { whole.clamp(-span, span) as i32 };
        if displacement == 0 {
            return;
        }

        for line in &mut self.lines {
            line.shift(displacement);
        }

        if velocity > 0.0 {
            self.recycle_top();
        } else if velocity < 0.0 {
            self.recycle_bottom();
        }
    }

    /// Distance that moves every visible line off screen.
    fn window_span(&self) -> u32 {
        (self.lines.len() as u32 + 1).saturating_mul(self.line_height).min(i32::MAX as u32)
    }

    /// Retires lines that rose past the top edge and appends replacements below.
    fn recycle_top(&mut self) {
        let top = self.context.screen_height as i32;
        let line_height = self.line_height as i32;

        while self.lines.front().is_some_and(|line| line.y >= top) {
            if let Some(line) = self.lines.pop_front() {
                self.retire(line);
            }
            let y = self.lines.back().map_or(-line_height, |line| line.y - line_height);
            let line = self.build_line(y);
            self.lines.push_back(line);
        }
    }

    /// Retires lines that sank past the bottom edge and prepends replacements above.
    fn recycle_bottom(&mut self) {
        let line_height = self.line_height as i32;

        while self.lines.back().is_some_and(|line| line.y + line_height <= 0) {
            if let Some(line) = self.lines.pop_back() {
                self.retire(line);
            }
            let y = self
                .lines
                .front()
                .map_or(self.context.screen_height as i32, |line| line.y + line_height);
            let line = self.build_line(y);
            self.lines.push_front(line);
        }
    }

    fn retire(&mut self, mut line: Line<R::Handle>) {
        debug!("retiring line at y={}: {:?}", line.y, line.text());
        line.release_into(&mut self.rasterizer);
        self.retired += 1;
    }

    /// Pulls the next words from the pattern, colors and rasterizes them.
    ///
    /// Words that fail to rasterize are left out of the line.
    fn build_line(&mut self, y: i32) -> Line<R::Handle> {
        let selection = self.line_pattern.next_line(&self.words, self.cursor, &self.context);
        self.cursor = selection.cursor;

        let mut tokens = Vec::with_capacity(selection.words.len());
        for word in selection.words {
            let color = self.colors.color();
            match self.rasterizer.rasterize(&self.font, &word, color) {
                Ok(raster) => tokens.push(WordToken::new(word, color, raster, self.context.font_scale)),
                Err(err) => warn!("skipping word {word:?}: {err}"),
            }
        }

        let mut line = Line::new(tokens);
        line.place(self.context.center_x(), y, self.context.space_width);
        line
    }

    /// Visible lines, topmost first.
    pub fn visible_lines(&self) -> impl ExactSizeIterator<Item = &Line<R::Handle>> + '_ {
        self.lines.iter()
    }

    /// Applies new screen geometry and re-centers every visible line.
    pub fn resize(&mut self, context: LineRenderContext) {
        self.context = context.sanitized();
        let center_x = self.context.center_x();
        let space_width = self.context.space_width;
        for line in &mut self.lines {
            let y = line.y;
            line.place(center_x, y, space_width);
        }
    }

    /// Releases every remaining resource. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        for mut line in self.lines.drain(..) {
            line.release_into(&mut self.rasterizer);
        }
        self.shut_down = true;
        info!("scroll buffer shut down after retiring {} lines", self.retired);
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    pub fn line_height(&self) -> u32 {
        self.line_height
    }

    /// Lines retired since construction.
    pub fn retired_lines(&self) -> u64 {
        self.retired
    }

    /// Index of the first word of the next generated line.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn context(&self) -> &LineRenderContext {
        &self.context
    }

    pub fn velocity(&self) -> &VelocityModulator {
        &self.velocity
    }

    pub fn velocity_mut(&mut self) -> &mut VelocityModulator {
        &mut self.velocity
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }
}

impl<R: Rasterizer> Drop for ScrollBuffer<R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn measure_line_height<R: Rasterizer + ?Sized>(
    rasterizer: &mut R,
    font: &str,
    font_scale: f32,
    fallback: u32,
) -> u32 {
    let height = match rasterizer.rasterize(font, LINE_HEIGHT_SAMPLE, SAMPLE_COLOR) {
        Ok(raster) => {
            let height = (raster.height as f32 * font_scale) as u32;
            rasterizer.release(raster.handle);
            height
        },
        Err(err) => {
            warn!("falling back to {fallback}px line height: {err}");
            fallback
        },
    };
    height.max(1)
}
