use std::collections::HashSet;

use indexmap::IndexMap;
use stop_words::LANGUAGE;
use tracing::warn;

use crate::text::tokenizer::fold;

/// Per-language stop-word lookup
pub trait StopWordSource: Send + Sync {
    /// Case- and accent-insensitive membership test
    fn is_stop_word(&self, term: &str, lang: &str) -> bool;

    /// The lexicon for `lang` in its original order; empty when unknown
    fn all_stop_words(&self, lang: &str) -> Vec<String>;

    /// Language codes with a lexicon
    fn languages(&self) -> Vec<String>;
}

const BUILTIN: [(&str, &str); 4] = [
    ("en", include_str!("lexicon/en.txt")),
    ("fr", include_str!("lexicon/fr.txt")),
    ("de", include_str!("lexicon/de.txt")),
    ("es", include_str!("lexicon/es.txt")),
];

#[derive(Debug, Clone)]
struct Lexicon {
    words: Vec<String>,
    folded: HashSet<String>,
}

impl Lexicon {
    fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        let folded = words.iter().map(|w| fold(w)).collect();
        Self { words, folded }
    }
}

/// Stop words kept in memory, one lexicon per language code.
///
/// `builtin()` ships curated lists for `en`, `fr`, `de` and `es`;
/// `with_language` pulls further languages from the `stop-words` crate.
#[derive(Debug, Clone, Default)]
pub struct LexiconStopWords {
    lexicons: IndexMap<String, Lexicon>,
}

impl LexiconStopWords {
    pub fn empty() -> Self {
        Self {
            lexicons: IndexMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut out = Self::empty();
        for (code, data) in BUILTIN {
            out.lexicons.insert(code.to_string(), Lexicon::new(data.lines()));
        }
        out
    }

    /// Add (or replace) a lexicon from the `stop-words` crate.
    /// Unsupported codes are logged and skipped.
    pub fn with_language(mut self, code: &str) -> Self {
        match iso_language(code) {
            Some(lang) => {
                let words = stop_words::get(lang);
                self.lexicons.insert(code.to_lowercase(), Lexicon::new(words));
            }
            None => warn!(code, "no stop-word list available for language"),
        }
        self
    }

    /// Add (or replace) a lexicon from caller-supplied words
    pub fn with_words<I, S>(mut self, code: &str, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.lexicons.insert(code.to_lowercase(), Lexicon::new(words));
        self
    }

    fn lexicon(&self, lang: &str) -> Option<&Lexicon> {
        self.lexicons
            .get(lang)
            .or_else(|| self.lexicons.get(lang.to_lowercase().as_str()))
    }
}

impl StopWordSource for LexiconStopWords {
    fn is_stop_word(&self, term: &str, lang: &str) -> bool {
        self.lexicon(lang)
            .map_or(false, |lex| lex.folded.contains(&fold(term)))
    }

    fn all_stop_words(&self, lang: &str) -> Vec<String> {
        self.lexicon(lang).map(|lex| lex.words.clone()).unwrap_or_default()
    }

    fn languages(&self) -> Vec<String> {
        self.lexicons.keys().cloned().collect()
    }
}

fn iso_language(code: &str) -> Option<LANGUAGE> {
    let lang = match code.to_lowercase().as_str() {
        "en" => LANGUAGE::English,
        "fr" => LANGUAGE::French,
        "de" => LANGUAGE::German,
        "es" => LANGUAGE::Spanish,
        "it" => LANGUAGE::Italian,
        "pt" => LANGUAGE::Portuguese,
        "nl" => LANGUAGE::Dutch,
        "sv" => LANGUAGE::Swedish,
        "da" => LANGUAGE::Danish,
        "fi" => LANGUAGE::Finnish,
        "ru" => LANGUAGE::Russian,
        _ => return None,
    };
    Some(lang)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_four_languages() {
        let sw = LexiconStopWords::builtin();
        assert_eq!(sw.languages(), vec!["en", "fr", "de", "es"]);
        assert!(sw.is_stop_word("the", "en"));
        assert!(sw.is_stop_word("avec", "fr"));
        assert!(sw.is_stop_word("und", "de"));
        assert!(sw.is_stop_word("porque", "es"));
        assert!(!sw.is_stop_word("cat", "en"));
    }

    #[test]
    fn lookups_ignore_case_and_accents() {
        let sw = LexiconStopWords::builtin();
        assert!(sw.is_stop_word("The", "EN"));
        assert!(sw.is_stop_word("ete", "fr"));
        assert!(sw.is_stop_word("ÉTÉ", "fr"));
        assert!(sw.is_stop_word("fur", "de"));
    }

    #[test]
    fn unknown_language_has_no_stop_words() {
        let sw = LexiconStopWords::builtin();
        assert!(!sw.is_stop_word("the", "xx"));
        assert!(sw.all_stop_words("xx").is_empty());
    }

    #[test]
    fn all_stop_words_keeps_lexicon_order() {
        let sw = LexiconStopWords::empty().with_words("en", ["Zeta", "alpha", ""]);
        assert_eq!(sw.all_stop_words("en"), vec!["zeta", "alpha"]);
    }
}
