use std::{fmt, sync::Arc};

use indexmap::IndexMap;
use rust_stemmers::Algorithm;

/// Reduces a word to its stem
pub trait Stem: Send + Sync {
    fn stem(&self, word: &str) -> String;

    /// Identifies the stemmer in cache keys
    fn name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

/// Snowball stemmer for one language
pub struct SnowballStemmer {
    algorithm: Algorithm,
    inner: rust_stemmers::Stemmer,
}

impl SnowballStemmer {
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            inner: rust_stemmers::Stemmer::create(algorithm),
        }
    }
}

impl Stem for SnowballStemmer {
    fn stem(&self, word: &str) -> String {
        self.inner.stem(word).into_owned()
    }

    fn name(&self) -> String {
        format!("snowball:{:?}", self.algorithm)
    }
}

/// Returns the word unchanged.
/// Used for every language without a registered stemmer.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityStemmer;

impl Stem for IdentityStemmer {
    fn stem(&self, word: &str) -> String {
        word.to_string()
    }
}

static IDENTITY: IdentityStemmer = IdentityStemmer;

/// Stemmers keyed by language code
#[derive(Clone)]
pub struct StemmerRegistry {
    stemmers: IndexMap<String, Arc<dyn Stem>>,
}

impl fmt::Debug for StemmerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StemmerRegistry")
            .field("languages", &self.stemmers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for StemmerRegistry {
    fn default() -> Self {
        Self::snowball()
    }
}

impl StemmerRegistry {
    pub fn empty() -> Self {
        Self {
            stemmers: IndexMap::new(),
        }
    }

    /// Snowball stemmers for the European languages `rust-stemmers` ships
    pub fn snowball() -> Self {
        let mut registry = Self::empty();
        for (code, algorithm) in [
            ("da", Algorithm::Danish),
            ("nl", Algorithm::Dutch),
            ("en", Algorithm::English),
            ("fi", Algorithm::Finnish),
            ("fr", Algorithm::French),
            ("de", Algorithm::German),
            ("hu", Algorithm::Hungarian),
            ("it", Algorithm::Italian),
            ("no", Algorithm::Norwegian),
            ("pt", Algorithm::Portuguese),
            ("ro", Algorithm::Romanian),
            ("ru", Algorithm::Russian),
            ("es", Algorithm::Spanish),
            ("sv", Algorithm::Swedish),
            ("tr", Algorithm::Turkish),
        ] {
            registry.register(code, Arc::new(SnowballStemmer::new(algorithm)));
        }
        registry
    }

    pub fn register(&mut self, code: &str, stemmer: Arc<dyn Stem>) -> &mut Self {
        self.stemmers.insert(code.to_lowercase(), stemmer);
        self
    }

    pub fn contains(&self, code: &str) -> bool {
        self.stemmers.contains_key(code.to_lowercase().as_str())
    }

    /// `code=name` for every registered stemmer, in registration order
    pub fn describe(&self) -> Vec<String> {
        self.stemmers
            .iter()
            .map(|(code, stemmer)| format!("{}={}", code, stemmer.name()))
            .collect()
    }

    /// Stemmer for `code`; unknown codes resolve to `IdentityStemmer`
    pub fn lookup(&self, code: &str) -> &dyn Stem {
        match self.stemmers.get(code.to_lowercase().as_str()) {
            Some(stemmer) => &**stemmer,
            None => &IDENTITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_plurals_are_stemmed() {
        let registry = StemmerRegistry::snowball();
        let en = registry.lookup("en");
        assert_eq!(en.stem("cats"), "cat");
        assert_eq!(en.stem("dogs"), "dog");
        assert_eq!(en.stem("plays"), "play");
    }

    #[test]
    fn unknown_language_falls_back_to_identity() {
        let registry = StemmerRegistry::snowball();
        assert!(!registry.contains("xx"));
        assert_eq!(registry.lookup("xx").stem("running"), "running");
        assert_eq!(StemmerRegistry::empty().lookup("en").stem("cats"), "cats");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = StemmerRegistry::snowball();
        assert_eq!(registry.lookup("EN").stem("cats"), "cat");
    }

    #[test]
    fn describe_names_each_algorithm() {
        let mut registry = StemmerRegistry::empty();
        registry.register("en", Arc::new(SnowballStemmer::new(Algorithm::English)));
        registry.register("xx", Arc::new(IdentityStemmer));
        let described = registry.describe();
        assert_eq!(described[0], "en=snowball:English");
        assert!(described[1].starts_with("xx="));
        assert!(described[1].ends_with("IdentityStemmer"));
    }
}
