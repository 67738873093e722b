use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::pattern::color::Palette;
use crate::pattern::line::LinePatternKind;
use crate::scroll::velocity::VelocityConfig;
use crate::WaveError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedPalette {
    #[default]
    Intent,
    Monochrome,
}

/// Either a built-in palette name or explicit `[r, g, b]` colors.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PaletteSetting {
    Named(NamedPalette),
    Colors(Vec<[u8; 3]>),
}

impl Default for PaletteSetting {
    fn default() -> Self {
        PaletteSetting::Named(NamedPalette::default())
    }
}

/// Settings read once when the scroll field is built.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    pub line_pattern: LinePatternKind,
    pub palette: PaletteSetting,
    /// Font name handed to the rasterizer.
    pub font: String,
    /// Size the glyphs are rendered at.
    pub base_font_size: u32,
    /// Size the text is shown at.
    pub standard_font_size: u32,
    pub max_line_words: u32,
    pub max_color_hold: u32,
    pub velocity: VelocityConfig,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            line_pattern: LinePatternKind::Fibonacci,
            palette: PaletteSetting::default(),
            font: String::from("Scrambled"),
            base_font_size: 128,
            standard_font_size: 32,
            max_line_words: 21,
            max_color_hold: 89,
            velocity: VelocityConfig::default(),
        }
    }
}

impl WaveConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, WaveError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WaveError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Ratio between the displayed and rendered font sizes.
    pub fn font_scale(&self) -> f32 {
        if self.base_font_size == 0 || self.standard_font_size == 0 {
            return 1.0;
        }
        self.standard_font_size as f32 / self.base_font_size as f32
    }

    pub fn palette(&self) -> Result<Palette, WaveError> {
        match &self.palette {
            PaletteSetting::Named(NamedPalette::Intent) => Ok(Palette::intent()),
            PaletteSetting::Named(NamedPalette::Monochrome) => Ok(Palette::monochrome()),
            PaletteSetting::Colors(colors) => Palette::from_rgb(colors),
        }
    }
}
