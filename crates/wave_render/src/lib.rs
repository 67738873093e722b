mod affirmations;
mod config;
mod glyph;
mod pattern;
mod scroll;

pub use affirmations::WordPool;
pub use config::{NamedPalette, PaletteSetting, WaveConfig};
pub use glyph::{
    atlas::{AtlasGlyph, ScrambledAtlas, ATLAS_PADDING, PRINTABLE_ASCII},
    scramble::{scramble_glyph, scramble_pixels, BlockGrid, BlockPermutation},
    source::{GlyphBitmap, GlyphSource, StaticGlyphs},
};
pub use pattern::{
    color::{ColorPattern, Palette},
    line::{LinePattern, LinePatternKind, LineSelection, PLACEHOLDER_WORD},
    oscillator::{fibonacci_terms, Direction, FibonacciOscillator},
};
pub use scroll::{
    buffer::{Line, Raster, Rasterizer, ScrollBuffer, ScrollParts, WordToken},
    layout::{GlyphAdvances, LineRenderContext},
    velocity::{VelocityConfig, VelocityModulator, VelocityPhase},
};

#[derive(Debug, thiserror::Error)]
pub enum WaveError {
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("unknown line pattern {0:?}")]
    UnknownPattern(String),
    #[error("palette needs at least two colors, found {0}")]
    Palette(usize),
    #[error("no glyph available for {0:?}")]
    MissingGlyph(char),
    #[error("failed to rasterize {text:?}: {reason}")]
    Raster { text: String, reason: String },
}
