use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::{text::stopwords::StopWordSource, vectorizer::evaluate::scoring::Hits};

/// Sentences with fewer tokens (punctuation included) are skipped
const MIN_SENTENCE_TOKENS: usize = 3;
/// Shorter candidate phrases are discarded
const MIN_PHRASE_WORDS: usize = 2;

/// A multi-word phrase ranked within one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyphrase {
    pub phrase: String,
    /// `frequency * ln(chars + 1) * word_count`
    pub score: f64,
    pub frequency: usize,
    pub word_count: usize,
}

/// Split after `.`, `!` or `?` when whitespace follows.
/// The terminator stays with its sentence; empty pieces are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((idx, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        if let Some(&(next_idx, next)) = chars.peek() {
            if next.is_whitespace() {
                sentences.push(&text[start..next_idx]);
                start = next_idx;
            }
        } else {
            let end = idx + c.len_utf8();
            sentences.push(&text[start..end]);
            start = end;
        }
    }
    sentences.push(&text[start..]);
    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Lowercased word and punctuation tokens, whitespace dropped
fn sentence_tokens(sentence: &str) -> Vec<String> {
    sentence
        .split_word_bounds()
        .filter(|t| !t.trim().is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[inline]
fn is_punctuation(token: &str) -> bool {
    !token.chars().any(char::is_alphanumeric)
}

/// Graph-free keyphrase extraction.
///
/// Runs of consecutive content words are collected per sentence; a stop word
/// or a punctuation token closes the run and is not part of it. Distinct
/// phrases are counted across sentences and ranked by score, ties in order of
/// first appearance.
///
/// # Arguments
/// * `text` - 対象テキスト
/// * `lang` - stop-word language
/// * `stop_words` - boundary words
/// * `top_n` - 返す件数
pub fn extract_keyphrases(
    text: &str,
    lang: &str,
    stop_words: &dyn StopWordSource,
    top_n: usize,
) -> Vec<Keyphrase> {
    let mut counts: IndexMap<String, (usize, usize)> = IndexMap::new();
    for sentence in split_sentences(text) {
        let tokens = sentence_tokens(sentence);
        if tokens.len() < MIN_SENTENCE_TOKENS {
            continue;
        }
        let mut run: Vec<&str> = Vec::new();
        for token in &tokens {
            if is_punctuation(token) || stop_words.is_stop_word(token, lang) {
                close_run(&mut run, &mut counts);
            } else {
                run.push(token);
            }
        }
        close_run(&mut run, &mut counts);
    }

    let mut hits = Hits::new(
        counts
            .iter()
            .map(|(phrase, &(freq, words))| {
                let chars = phrase.chars().count() as f64;
                (phrase.as_str(), freq as f64 * (chars + 1.0).ln() * words as f64)
            })
            .collect(),
    );
    hits.sort_by_score().top(top_n);
    hits.list
        .into_iter()
        .filter_map(|(phrase, score)| {
            counts.get(phrase).map(|&(frequency, word_count)| Keyphrase {
                phrase: phrase.to_string(),
                score,
                frequency,
                word_count,
            })
        })
        .collect()
}

/// phrase -> (frequency, word count)
fn close_run(run: &mut Vec<&str>, counts: &mut IndexMap<String, (usize, usize)>) {
    if run.len() >= MIN_PHRASE_WORDS {
        let entry = counts.entry(run.join(" ")).or_insert((0, run.len()));
        entry.0 += 1;
    }
    run.clear();
}
