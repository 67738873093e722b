use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::oscillator::FibonacciOscillator;
use crate::scroll::layout::LineRenderContext;
use crate::WaveError;

/// Shown alone on a line when there are no words to display.
pub const PLACEHOLDER_WORD: &str = "*";

/// Share of the screen width a Fibonacci line may fill.
const FIBONACCI_WIDTH_RATIO: f32 = 0.9;

const SINE_TOTAL_LINES: f64 = 67.0;
const SINE_FREQUENCY: f64 = 5.0;
const SINE_AMPLITUDE: f64 = 0.85;
const SINE_BASE_RATIO: f64 = 0.03;
const SINE_MAX_WORDS: usize = 144;

/// Words chosen for one line and where the next line starts reading.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineSelection {
    pub words: Vec<String>,
    pub cursor: usize,
}

impl LineSelection {
    fn placeholder(cursor: usize) -> Self {
        Self { words: vec![PLACEHOLDER_WORD.to_owned()], cursor }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinePatternKind {
    #[default]
    Fibonacci,
    Sine,
}

impl LinePatternKind {
    pub const ALL: [LinePatternKind; 2] = [LinePatternKind::Fibonacci, LinePatternKind::Sine];

    pub fn key(self) -> &'static str {
        match self {
            LinePatternKind::Fibonacci => "fibonacci",
            LinePatternKind::Sine => "sine",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            LinePatternKind::Fibonacci => "Fibonacci",
            LinePatternKind::Sine => "Sine Wave",
        }
    }

    pub fn build(self, max_words: u32) -> LinePattern {
        match self {
            LinePatternKind::Fibonacci => {
                LinePattern::Fibonacci { density: FibonacciOscillator::new(max_words) }
            },
            LinePatternKind::Sine => LinePattern::SineWave { step: 0 },
        }
    }
}

impl FromStr for LinePatternKind {
    type Err = WaveError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| WaveError::UnknownPattern(name.to_owned()))
    }
}

impl fmt::Display for LinePatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Strategy that groups the word stream into lines.
#[derive(Clone, Debug)]
pub enum LinePattern {
    /// Word count per line breathes along the Fibonacci sequence.
    Fibonacci { density: FibonacciOscillator },
    /// Line width follows a sine wave across successive lines.
    SineWave { step: u64 },
}

impl LinePattern {
    pub fn kind(&self) -> LinePatternKind {
        match self {
            LinePattern::Fibonacci { .. } => LinePatternKind::Fibonacci,
            LinePattern::SineWave { .. } => LinePatternKind::Sine,
        }
    }

    /// Takes the next line of words starting at `cursor`.
    ///
    /// The pool is read cyclically and never modified. The returned cursor is
    /// where the following line begins; a word that would overflow the line is
    /// left for that next line.
    pub fn next_line(
        &mut self,
        words: &[String],
        cursor: usize,
        context: &LineRenderContext,
    ) -> LineSelection {
        if words.is_empty() {
            return LineSelection::placeholder(cursor);
        }

        match self {
            LinePattern::Fibonacci { density } => {
                let target = density.advance() as usize;
                let limit = context.usable_width(FIBONACCI_WIDTH_RATIO);
                fill_line(words, cursor, context, target, limit)
            },
            LinePattern::SineWave { step } => {
                let angle = 2.0 * PI * SINE_FREQUENCY * *step as f64 / SINE_TOTAL_LINES;
                let wave = (angle.sin() + 1.0) / 2.0;
                let ratio = SINE_BASE_RATIO + SINE_AMPLITUDE * wave;
                *step += 1;

                let limit = context.usable_width(ratio as f32);
                fill_line(words, cursor, context, SINE_MAX_WORDS, limit)
            },
        }
    }
}

/// Collects up to `max_words` non-empty words whose laid-out width stays within `limit`.
///
/// The first word is always taken so a line is never empty.
fn fill_line(
    words: &[String],
    cursor: usize,
    context: &LineRenderContext,
    max_words: usize,
    limit: u32,
) -> LineSelection {
    let mut cursor = cursor % words.len();
    let mut line: Vec<String> = Vec::with_capacity(max_words.min(words.len()));
    let mut width = 0u32;
    let mut skipped = 0;

    while line.len() < max_words && skipped < words.len() {
        let word = &words[cursor];
        if word.is_empty() {
            cursor = (cursor + 1) % words.len();
            skipped += 1;
            continue;
        }

        let mut word_width = context.measure_word(word);
        if !line.is_empty() {
            word_width += context.space_width;
            if width.saturating_add(word_width) > limit {
                break;
            }
        }

        line.push(word.clone());
        width = width.saturating_add(word_width);
        cursor = (cursor + 1) % words.len();
        skipped = 0;
    }

    if line.is_empty() {
        return LineSelection::placeholder(cursor);
    }
    LineSelection { words: line, cursor }
}
