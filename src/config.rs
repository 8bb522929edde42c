//! Engine configuration.
//!
//! Values are layered with Figment: built-in defaults, then an optional TOML
//! file, then `TEXT_ANALYTICS_*` environment variables (nested keys joined by
//! `__`, e.g. `TEXT_ANALYTICS_KMEANS__MAX_ITERATIONS=50`).

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const ENV_PREFIX: &str = "TEXT_ANALYTICS_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub language: LanguageConfig,
    pub vectorizer: VectorizerConfig,
    pub kmeans: KMeansConfig,
    pub hierarchical: HierarchicalConfig,
    pub grouping: GroupingConfig,
    pub topics: TopicConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            language: LanguageConfig::default(),
            vectorizer: VectorizerConfig::default(),
            kmeans: KMeansConfig::default(),
            hierarchical: HierarchicalConfig::default(),
            grouping: GroupingConfig::default(),
            topics: TopicConfig::default(),
        }
    }
}

/// Language identification settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageConfig {
    /// Texts shorter than this are not scored.
    ///
    /// Measured in UTF-8 bytes after trimming, not characters: accented
    /// Latin letters count 2, most CJK characters 3.
    pub min_text_length: usize,
    /// relative gap `(top - second) / top` under which a context language wins
    pub confidence_threshold: f64,
    /// returned when nothing better is known
    pub default_language: String,
}

impl Default for LanguageConfig {
    fn default() -> Self {
        Self {
            min_text_length: 50,
            confidence_threshold: 0.3,
            default_language: "en".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorizerConfig {
    pub remove_stop_words: bool,
    pub stem: bool,
}

impl Default for VectorizerConfig {
    fn default() -> Self {
        Self {
            remove_stop_words: true,
            stem: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    pub max_iterations: usize,
    /// fixed seed for centroid sampling, `None` draws from the thread rng
    pub seed: Option<u64>,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchicalConfig {
    /// merging stops once the closest pair is farther apart than this
    pub distance_threshold: f64,
}

impl Default for HierarchicalConfig {
    fn default() -> Self {
        Self { distance_threshold: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    pub similarity_threshold: f64,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self { similarity_threshold: 0.7 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    pub terms_per_topic: usize,
    pub keyphrases: usize,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            terms_per_topic: 10,
            keyphrases: 10,
        }
    }
}

impl AnalyticsConfig {
    /// Load defaults, then `path` (if given and present), then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(AnalyticsConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        Ok(figment.extract()?)
    }
}
