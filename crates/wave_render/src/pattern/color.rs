use image::Rgba;

use super::oscillator::FibonacciOscillator;
use crate::WaveError;

const fn opaque(r: u8, g: u8, b: u8) -> Rgba<u8> {
    Rgba([r, g, b, 255])
}

/// Ordered set of word colors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgba<u8>>,
}

impl Palette {
    pub fn new(colors: Vec<Rgba<u8>>) -> Result<Self, WaveError> {
        if colors.len() < 2 {
            return Err(WaveError::Palette(colors.len()));
        }
        Ok(Self { colors })
    }

    pub fn from_rgb(colors: &[[u8; 3]]) -> Result<Self, WaveError> {
        Self::new(colors.iter().map(|&[r, g, b]| opaque(r, g, b)).collect())
    }

    /// Warm sand into cool teal and violet.
    pub fn intent() -> Self {
        Self {
            colors: vec![
                opaque(210, 180, 140), // tan
                opaque(255, 218, 185), // peach puff
                opaque(224, 255, 255), // light cyan
                opaque(32, 178, 170),  // light sea green
                opaque(72, 209, 204),  // medium turquoise
                opaque(0, 139, 139),   // dark cyan
                opaque(147, 112, 219), // medium purple
            ],
        }
    }

    pub fn monochrome() -> Self {
        Self {
            colors: vec![
                opaque(255, 255, 255),
                opaque(220, 220, 220),
                opaque(192, 192, 192),
                opaque(169, 169, 169),
                opaque(128, 128, 128),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn colors(&self) -> &[Rgba<u8>] {
        &self.colors
    }
}

/// Hands out palette colors, holding each for a Fibonacci-oscillating number of words.
#[derive(Clone, Debug)]
pub struct ColorPattern {
    palette: Palette,
    index: usize,
    hold_left: u32,
    durations: FibonacciOscillator,
}

impl ColorPattern {
    pub fn new(palette: Palette, max_hold: u32) -> Self {
        let mut durations = FibonacciOscillator::new(max_hold);
        let hold_left = durations.advance();
        Self { palette, index: 0, hold_left, durations }
    }

    /// Color for the next word.
    pub fn color(&mut self) -> Rgba<u8> {
        let color = self.palette.colors[self.index];

        self.hold_left = self.hold_left.saturating_sub(1);
        if self.hold_left == 0 {
            self.index = (self.index + 1) % self.palette.len();
            self.hold_left = self.durations.advance();
        }

        color
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }
}
