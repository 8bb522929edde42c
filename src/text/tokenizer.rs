use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Splits raw text into word tokens
pub trait Tokenizer: Send + Sync {
    /// Lowercase, accent-free tokens longer than one character.
    /// May return an empty sequence.
    fn tokenize(&self, text: &str) -> Vec<String>;

    /// Identifies the tokenizer in cache keys
    fn name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// Lowercase and strip accents (NFD, combining marks removed)
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Default tokenizer: folds the text and splits on anything that is not
/// alphanumeric.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleTokenizer;

impl Tokenizer for SimpleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        fold(text)
            .split(|c: char| !c.is_alphanumeric())
            .filter(|tok| tok.chars().count() > 1)
            .map(str::to_string)
            .collect()
    }
}
