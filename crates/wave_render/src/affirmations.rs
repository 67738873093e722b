use std::fs;
use std::path::Path;

use crate::WaveError;

/// Shown when no affirmation text is available.
const FALLBACK_TEXT: &str = "No Affirmations Selected!";

/// The ordered word stream displayed by the scroll field.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WordPool {
    words: Vec<String>,
}

impl WordPool {
    pub fn from_text(text: &str) -> Self {
        Self { words: text.split_whitespace().map(str::to_owned).collect() }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, WaveError> {
        Ok(Self::from_text(&fs::read_to_string(path)?))
    }

    /// Words of every file, in the order given.
    pub fn load_all<I, P>(paths: I) -> Result<Self, WaveError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut pool = Self::default();
        for path in paths {
            pool.extend(Self::load(path)?);
        }
        Ok(pool)
    }

    pub fn extend(&mut self, other: WordPool) {
        self.words.extend(other.words);
    }

    /// Replaces an empty pool with the "nothing selected" notice.
    pub fn or_fallback(self) -> Self {
        if self.words.is_empty() {
            Self::from_text(FALLBACK_TEXT)
        } else {
            self
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn into_words(self) -> Vec<String> {
        self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
