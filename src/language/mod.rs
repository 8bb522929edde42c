pub mod profile;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    config::LanguageConfig,
    language::profile::TrigramProfile,
    text::stopwords::StopWordSource,
    vectorizer::evaluate::scoring::Hits,
};

/// Why no profile score decided the language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// input under the minimum length; too ambiguous to score
    TooShort,
    /// no language profile registered
    NoProfiles,
    /// no trigram of the input occurs in any profile
    NoSignal,
}

/// Outcome of language identification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identification {
    /// the strictly best scoring profile
    Identified { language: String, score: f64 },
    /// top two scores were too close and the context language was a candidate
    ContextPreferred {
        language: String,
        detected: String,
        score: f64,
    },
    /// caller should use `language` (context or configured default)
    Fallback {
        language: String,
        reason: FallbackReason,
    },
}

impl Identification {
    /// The language code to use downstream
    pub fn language(&self) -> &str {
        match self {
            Identification::Identified { language, .. }
            | Identification::ContextPreferred { language, .. }
            | Identification::Fallback { language, .. } => language,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Identification::Fallback { .. })
    }
}

/// Character-trigram language identification.
///
/// Profiles are scored in registration order, which also breaks ties.
#[derive(Debug, Clone, Default)]
pub struct LanguageProfiler {
    profiles: IndexMap<String, TrigramProfile>,
    config: LanguageConfig,
}

impl LanguageProfiler {
    pub fn new(config: LanguageConfig) -> Self {
        Self {
            profiles: IndexMap::new(),
            config,
        }
    }

    /// One profile per language of `source`, built from its stop words
    pub fn from_stop_words(config: LanguageConfig, source: &dyn StopWordSource) -> Self {
        let mut profiler = Self::new(config);
        for lang in source.languages() {
            let words = source.all_stop_words(&lang);
            profiler.register(&lang, Self::build_profile(&words));
        }
        profiler
    }

    /// Union of the trigram histograms of a reference word list
    pub fn build_profile<S>(words: &[S]) -> TrigramProfile
    where
        S: AsRef<str>,
    {
        TrigramProfile::from_words(words)
    }

    /// Dot product of the text histogram with a language profile
    pub fn score(text_trigrams: &TrigramProfile, profile: &TrigramProfile) -> f64 {
        text_trigrams.dot(profile) as f64
    }

    /// Add or replace the profile for `code`
    pub fn register(&mut self, code: &str, profile: TrigramProfile) -> &mut Self {
        self.profiles.insert(code.to_string(), profile);
        self
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn profile(&self, code: &str) -> Option<&TrigramProfile> {
        self.profiles.get(code)
    }

    pub fn config(&self) -> &LanguageConfig {
        &self.config
    }

    /// Score of `text` against every profile, in registration order
    pub fn scores(&self, text: &str) -> Hits<String> {
        let trigrams = TrigramProfile::from_text(text);
        Hits::new(
            self.profiles
                .iter()
                .map(|(code, profile)| (code.clone(), Self::score(&trigrams, profile)))
                .collect(),
        )
    }

    /// Identify the language of `text`.
    ///
    /// `context` is the language the caller would otherwise assume (site or
    /// request language). It wins when the two best scores are within the
    /// confidence threshold and it was itself scored, and it is the fallback
    /// for inputs that cannot be scored.
    pub fn identify(&self, text: &str, context: Option<&str>) -> Identification {
        let fallback_language = context.unwrap_or(&self.config.default_language).to_string();
        if self.profiles.is_empty() {
            return Identification::Fallback {
                language: self.config.default_language.clone(),
                reason: FallbackReason::NoProfiles,
            };
        }
        let trimmed = text.trim();
        // byte length, see `LanguageConfig::min_text_length`
        if trimmed.len() < self.config.min_text_length {
            return Identification::Fallback {
                language: fallback_language,
                reason: FallbackReason::TooShort,
            };
        }

        let scores = self.scores(trimmed);
        trace!(scores = ?scores, "language scores");

        let mut top: Option<(usize, f64)> = None;
        for (idx, (_, score)) in scores.list.iter().enumerate() {
            // 厳密に大きい場合のみ更新 (同点は先勝ち)
            if top.map_or(true, |(_, best)| *score > best) {
                top = Some((idx, *score));
            }
        }
        let (top_idx, top_score) = match top {
            Some(t) if t.1 > 0.0 => t,
            _ => {
                return Identification::Fallback {
                    language: fallback_language,
                    reason: FallbackReason::NoSignal,
                }
            }
        };
        let top_lang = scores.list[top_idx].0.clone();
        let second_score = scores
            .list
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != top_idx)
            .map(|(_, (_, s))| *s)
            .fold(0.0f64, f64::max);

        if let Some(ctx) = context {
            let scored = scores.keys().any(|code| code == ctx);
            let gap = (top_score - second_score) / top_score;
            if ctx != top_lang && scored && gap < self.config.confidence_threshold {
                debug!(detected = %top_lang, context = ctx, gap, "low confidence, preferring context language");
                return Identification::ContextPreferred {
                    language: ctx.to_string(),
                    detected: top_lang,
                    score: top_score,
                };
            }
        }

        debug!(language = %top_lang, score = top_score, "identified language");
        Identification::Identified {
            language: top_lang,
            score: top_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::stopwords::LexiconStopWords;

    fn builtin_profiler() -> LanguageProfiler {
        LanguageProfiler::from_stop_words(LanguageConfig::default(), &LexiconStopWords::builtin())
    }

    fn loose_config() -> LanguageConfig {
        LanguageConfig {
            min_text_length: 0,
            ..LanguageConfig::default()
        }
    }

    #[test]
    fn identifies_french_sentence() {
        let profiler = builtin_profiler();
        let id = profiler.identify("Ceci est un texte en français avec plusieurs mots", None);
        assert_eq!(id.language(), "fr");
        assert!(matches!(id, Identification::Identified { .. }));
    }

    #[test]
    fn identifies_other_builtin_languages() {
        let profiler = builtin_profiler();
        let cases = [
            ("en", "The quick brown fox jumps over the lazy dog while the children are playing in the garden"),
            ("de", "Der schnelle braune Fuchs springt über den faulen Hund und die Kinder spielen im Garten"),
            ("es", "El rápido zorro marrón salta sobre el perro perezoso mientras los niños juegan en el jardín"),
        ];
        for (expected, text) in cases {
            assert_eq!(profiler.identify(text, None).language(), expected, "{}", text);
        }
    }

    #[test]
    fn short_text_falls_back_to_context_or_default() {
        let profiler = builtin_profiler();
        assert_eq!(
            profiler.identify("  Bonjour  ", None),
            Identification::Fallback {
                language: "en".to_string(),
                reason: FallbackReason::TooShort
            }
        );
        assert_eq!(profiler.identify("Bonjour", Some("fr")).language(), "fr");
    }

    #[test]
    fn minimum_length_counts_utf8_bytes() {
        let profiler = LanguageProfiler::from_stop_words(
            LanguageConfig {
                min_text_length: 10,
                ..LanguageConfig::default()
            },
            &LexiconStopWords::builtin(),
        );
        let too_short = |text: &str| {
            matches!(
                profiler.identify(text, None),
                Identification::Fallback {
                    reason: FallbackReason::TooShort,
                    ..
                }
            )
        };
        // five characters, ten bytes
        assert!(!too_short("ééééé"));
        assert!(too_short("éééé"));
        assert!(too_short("abcde"));
    }

    #[test]
    fn no_profiles_returns_default() {
        let profiler = LanguageProfiler::new(loose_config());
        let id = profiler.identify("anything at all", Some("de"));
        assert_eq!(
            id,
            Identification::Fallback {
                language: "en".to_string(),
                reason: FallbackReason::NoProfiles
            }
        );
    }

    #[test]
    fn no_shared_trigrams_is_no_signal() {
        let mut profiler = LanguageProfiler::new(loose_config());
        profiler.register("xx", LanguageProfiler::build_profile(&["zzz"]));
        let id = profiler.identify("hello", None);
        assert!(id.is_fallback());
        assert_eq!(id.language(), "en");
    }

    fn close_pair() -> LanguageProfiler {
        let mut profiler = LanguageProfiler::new(loose_config());
        profiler
            .register("xx", LanguageProfiler::build_profile(&["hello"]))
            .register("yy", LanguageProfiler::build_profile(&["help"]));
        profiler
    }

    #[test]
    fn close_scores_prefer_scored_context_language() {
        let profiler = close_pair();
        // xx: 7, yy: 6 -> gap 1/7
        let scores = profiler.scores("hello help");
        assert_eq!(scores.list, vec![("xx".to_string(), 7.0), ("yy".to_string(), 6.0)]);

        assert_eq!(
            profiler.identify("hello help", Some("yy")),
            Identification::ContextPreferred {
                language: "yy".to_string(),
                detected: "xx".to_string(),
                score: 7.0
            }
        );
        assert_eq!(
            profiler.identify("hello help", None),
            Identification::Identified {
                language: "xx".to_string(),
                score: 7.0
            }
        );
        // context not among the candidates is ignored
        assert_eq!(profiler.identify("hello help", Some("zz")).language(), "xx");
    }

    #[test]
    fn zero_threshold_disables_context_preference() {
        let mut profiler = close_pair();
        profiler.config.confidence_threshold = 0.0;
        assert_eq!(profiler.identify("hello help", Some("yy")).language(), "xx");
    }

    #[test]
    fn ties_go_to_first_registered() {
        let mut profiler = LanguageProfiler::new(loose_config());
        profiler
            .register("aa", LanguageProfiler::build_profile(&["word"]))
            .register("bb", LanguageProfiler::build_profile(&["word"]));
        assert_eq!(profiler.identify("word", None).language(), "aa");
    }

    #[test]
    fn identification_serializes_with_kind_tag() {
        let id = Identification::Identified {
            language: "fr".to_string(),
            score: 70.0,
        };
        let json = serde_json::to_value(&id).unwrap();
        assert_eq!(json["kind"], "identified");
        assert_eq!(json["language"], "fr");
    }
}
