use std::{fmt, sync::Arc};

use rayon::prelude::*;
use tracing::warn;

use crate::{
    cache::CacheKey,
    config::VectorizerConfig,
    text::{
        stemmer::StemmerRegistry,
        stopwords::{LexiconStopWords, StopWordSource},
        tokenizer::{SimpleTokenizer, Tokenizer},
    },
};

/// Raw text to analysis tokens: tokenize, drop stop words, stem.
#[derive(Clone)]
pub struct TextPipeline {
    tokenizer: Arc<dyn Tokenizer>,
    stop_words: Arc<dyn StopWordSource>,
    stemmers: StemmerRegistry,
    config: VectorizerConfig,
}

impl fmt::Debug for TextPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextPipeline")
            .field("stop_word_languages", &self.stop_words.languages())
            .field("stemmers", &self.stemmers)
            .field("config", &self.config)
            .finish()
    }
}

impl Default for TextPipeline {
    fn default() -> Self {
        Self::new(VectorizerConfig::default())
    }
}

impl TextPipeline {
    pub fn new(config: VectorizerConfig) -> Self {
        Self {
            tokenizer: Arc::new(SimpleTokenizer),
            stop_words: Arc::new(LexiconStopWords::builtin()),
            stemmers: StemmerRegistry::snowball(),
            config,
        }
    }

    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn with_stop_words(mut self, stop_words: Arc<dyn StopWordSource>) -> Self {
        self.stop_words = stop_words;
        self
    }

    pub fn with_stemmers(mut self, stemmers: StemmerRegistry) -> Self {
        self.stemmers = stemmers;
        self
    }

    pub fn stop_words(&self) -> &dyn StopWordSource {
        self.stop_words.as_ref()
    }

    pub fn stemmers(&self) -> &StemmerRegistry {
        &self.stemmers
    }

    /// Digest of everything that shapes the output: tokenizer, every
    /// stop-word lexicon, stemmer assignments and the switches.
    pub fn fingerprint(&self) -> CacheKey {
        let mut lexicons = Vec::new();
        for lang in self.stop_words.languages() {
            let words = self.stop_words.all_stop_words(&lang);
            lexicons.push(format!("{}:{}", lang, words.len()));
            lexicons.extend(words);
        }
        let mut params = vec![self.tokenizer.name(), format!("{:?}", self.config)];
        params.extend(self.stemmers.describe());
        CacheKey::derive("text_pipeline", &lexicons, &params)
    }

    /// Analysis tokens of one text in language `lang`
    pub fn analyze(&self, text: &str, lang: &str) -> Vec<String> {
        let stemmer = self.stemmers.lookup(lang);
        self.tokenizer
            .tokenize(text)
            .into_iter()
            .filter(|tok| !(self.config.remove_stop_words && self.stop_words.is_stop_word(tok, lang)))
            .map(|tok| if self.config.stem { stemmer.stem(&tok) } else { tok })
            .collect()
    }

    /// `analyze` for every text, in parallel; output order follows input order
    pub fn analyze_all<S>(&self, texts: &[S], lang: &str) -> Vec<Vec<String>>
    where
        S: AsRef<str> + Sync,
    {
        if self.config.stem && !self.stemmers.contains(lang) {
            warn!(lang, "no stemmer for language, tokens are left unstemmed");
        }
        texts
            .par_iter()
            .map(|text| self.analyze(text.as_ref(), lang))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_stop_words_and_stems() {
        let pipeline = TextPipeline::default();
        assert_eq!(pipeline.analyze("The cats and the dogs", "en"), vec!["cat", "dog"]);
    }

    #[test]
    fn switches_can_disable_filtering_and_stemming() {
        let pipeline = TextPipeline::new(VectorizerConfig {
            remove_stop_words: false,
            stem: false,
        });
        assert_eq!(
            pipeline.analyze("The cats and the dogs", "en"),
            vec!["the", "cats", "and", "the", "dogs"]
        );
    }

    #[test]
    fn unknown_language_keeps_tokens_unstemmed() {
        let pipeline = TextPipeline::default();
        assert_eq!(pipeline.analyze("the cats", "xx"), vec!["the", "cats"]);
    }

    #[test]
    fn fingerprint_follows_stop_words_and_stemmers() {
        let base = TextPipeline::default();
        assert_eq!(base.fingerprint(), TextPipeline::default().fingerprint());

        let custom = TextPipeline::default()
            .with_stop_words(Arc::new(LexiconStopWords::empty().with_words("en", ["cat"])));
        assert_ne!(base.fingerprint(), custom.fingerprint());

        let unstemmed = TextPipeline::default().with_stemmers(StemmerRegistry::empty());
        assert_ne!(base.fingerprint(), unstemmed.fingerprint());

        let unfiltered = TextPipeline::new(VectorizerConfig {
            remove_stop_words: false,
            stem: true,
        });
        assert_ne!(base.fingerprint(), unfiltered.fingerprint());
    }

    #[test]
    fn analyze_all_preserves_order() {
        let pipeline = TextPipeline::default();
        let out = pipeline.analyze_all(&["dogs bark", "", "cats sleep"], "en");
        assert_eq!(out, vec![vec!["dog", "bark"], vec![], vec!["cat", "sleep"]]);
    }
}
