//! Default tokenizer, stop-word lexicons and stemmers.
//!
//! Each is reached through a small trait so callers can plug their own.
pub mod pipeline;
pub mod stemmer;
pub mod stopwords;
pub mod tokenizer;
