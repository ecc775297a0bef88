// src/features/mod.rs — Linguistic feature extraction

pub mod lexicon;
pub mod spelling;

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

/// Number of metrics in a feature row. Trained models are fitted against
/// exactly this width.
pub const FEATURE_DIM: usize = 20;

/// Batch extraction works the corpus in chunks of this many essays.
pub const EXTRACT_CHUNK: usize = 100;

/// One essay's complete metric set. Every field is always present and
/// finite; degenerate input (empty or whitespace-only text) yields zeros.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FeatureRecord {
    pub avg_sentence_length: f64,
    pub avg_word_length: f64,
    /// Tone valence averaged over lexicon hits; stands in for a
    /// readability score in the trained row.
    pub polarity: f64,
    pub grammar_errors: f64,
    pub spelling_errors: f64,
    pub style_errors: f64,
    pub total_errors: f64,
    pub unique_sentence_starts: f64,
    pub vocabulary_richness: f64,
    pub discourse_markers: f64,
    pub topic_development: f64,
    pub word_count: f64,
    pub sentence_count: f64,
    pub long_words: f64,
    pub unique_words: f64,
    pub paragraph_count: f64,
    pub long_word_ratio: f64,
    pub unique_word_ratio: f64,
    pub complexity: f64,
    pub coherence: f64,
}

impl FeatureRecord {
    /// (name, value) pairs in model row order.
    pub fn fields(&self) -> [(&'static str, f64); FEATURE_DIM] {
        [
            ("avg_sentence_length", self.avg_sentence_length),
            ("avg_word_length", self.avg_word_length),
            ("polarity", self.polarity),
            ("grammar_errors", self.grammar_errors),
            ("spelling_errors", self.spelling_errors),
            ("style_errors", self.style_errors),
            ("total_errors", self.total_errors),
            ("unique_sentence_starts", self.unique_sentence_starts),
            ("vocabulary_richness", self.vocabulary_richness),
            ("discourse_markers", self.discourse_markers),
            ("topic_development", self.topic_development),
            ("word_count", self.word_count),
            ("sentence_count", self.sentence_count),
            ("long_words", self.long_words),
            ("unique_words", self.unique_words),
            ("paragraph_count", self.paragraph_count),
            ("long_word_ratio", self.long_word_ratio),
            ("unique_word_ratio", self.unique_word_ratio),
            ("complexity", self.complexity),
            ("coherence", self.coherence),
        ]
    }

    /// Flat model-input row, same order as [`FeatureRecord::fields`].
    pub fn as_row(&self) -> [f64; FEATURE_DIM] {
        self.fields().map(|(_, v)| v)
    }
}

/// Sentence-level readability signals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadabilityMetrics {
    pub avg_sentence_length: f64,
    pub avg_word_length: f64,
    pub polarity: f64,
}

/// Mechanical error counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ErrorMetrics {
    pub grammar_errors: f64,
    pub spelling_errors: f64,
    pub style_errors: f64,
    pub total_errors: f64,
}

/// Discourse and vocabulary signals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoherenceMetrics {
    pub unique_sentence_starts: f64,
    pub vocabulary_richness: f64,
    pub discourse_markers: f64,
    pub topic_development: f64,
}

/// Raw counts and their ratios.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountMetrics {
    pub word_count: f64,
    pub sentence_count: f64,
    pub long_words: f64,
    pub unique_words: f64,
    pub paragraph_count: f64,
    pub avg_word_length: f64,
    pub long_word_ratio: f64,
    pub unique_word_ratio: f64,
}

/// Computes the metric groups above and assembles full feature rows.
///
/// All methods are total over arbitrary text. The scoring pipeline runs
/// [`extract`](Self::extract) on preprocessed text; feedback generation
/// reads individual metric groups from the raw essay.
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Full feature record for one text.
    pub fn extract(&self, text: &str) -> FeatureRecord {
        let readability = self.readability(text);
        let errors = self.error_counts(text);
        let coherence = self.coherence(text);
        let counts = self.counts(text);

        let complexity = 0.3 * counts.avg_word_length
            + 0.3 * counts.long_word_ratio
            + 0.2 * counts.unique_word_ratio
            + 0.2 * coherence.vocabulary_richness;
        let coherence_score =
            0.4 * coherence.unique_sentence_starts + 0.6 * coherence.discourse_markers;

        FeatureRecord {
            avg_sentence_length: readability.avg_sentence_length,
            avg_word_length: readability.avg_word_length,
            polarity: readability.polarity,
            grammar_errors: errors.grammar_errors,
            spelling_errors: errors.spelling_errors,
            style_errors: errors.style_errors,
            total_errors: errors.total_errors,
            unique_sentence_starts: coherence.unique_sentence_starts,
            vocabulary_richness: coherence.vocabulary_richness,
            discourse_markers: coherence.discourse_markers,
            topic_development: coherence.topic_development,
            word_count: counts.word_count,
            sentence_count: counts.sentence_count,
            long_words: counts.long_words,
            unique_words: counts.unique_words,
            paragraph_count: counts.paragraph_count,
            long_word_ratio: counts.long_word_ratio,
            unique_word_ratio: counts.unique_word_ratio,
            complexity,
            coherence: coherence_score,
        }
    }

    /// Extract rows for many texts, worked in fixed-size chunks so progress
    /// is observable on large corpora.
    pub fn extract_batch<S: AsRef<str>>(&self, texts: &[S]) -> Vec<FeatureRecord> {
        let mut records = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(EXTRACT_CHUNK) {
            records.extend(chunk.iter().map(|t| self.extract(t.as_ref())));
            debug!("Extracted features for {}/{} essays", records.len(), texts.len());
        }
        records
    }

    pub fn readability(&self, text: &str) -> ReadabilityMetrics {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();
        let sentences = sentences_of(text);
        if words.is_empty() || sentences.is_empty() {
            return ReadabilityMetrics::default();
        }

        let total_chars: usize = words.iter().map(|w| w.chars().count()).sum();
        ReadabilityMetrics {
            avg_sentence_length: words.len() as f64 / sentences.len() as f64,
            avg_word_length: total_chars as f64 / words.len() as f64,
            polarity: lexicon::polarity(text),
        }
    }

    pub fn error_counts(&self, text: &str) -> ErrorMetrics {
        // Grammar and style analyzers are not wired up; their columns stay
        // zeroed so trained models keep a stable input width.
        let spelling_errors = spelling::count_misspellings(text) as f64;
        ErrorMetrics {
            grammar_errors: 0.0,
            spelling_errors,
            style_errors: 0.0,
            total_errors: spelling_errors,
        }
    }

    pub fn coherence(&self, text: &str) -> CoherenceMetrics {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();
        if words.is_empty() {
            return CoherenceMetrics::default();
        }

        let starters: HashSet<String> = sentences_of(text)
            .iter()
            .filter_map(|s| s.split_whitespace().next())
            .map(|w| w.to_lowercase())
            .collect();

        let unique: HashSet<&str> = words.iter().copied().collect();
        let markers = words
            .iter()
            .filter(|w| lexicon::is_discourse_marker(w))
            .count();

        CoherenceMetrics {
            unique_sentence_starts: starters.len() as f64,
            vocabulary_richness: unique.len() as f64 / words.len() as f64,
            discourse_markers: markers as f64,
            topic_development: words.len() as f64 / 100.0,
        }
    }

    pub fn counts(&self, text: &str) -> CountMetrics {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower.split_whitespace().collect();
        let word_count = words.len();
        let sentence_count = sentences_of(text).len();
        let long_words = words.iter().filter(|w| w.chars().count() > 6).count();
        let unique_words = words.iter().copied().collect::<HashSet<&str>>().len();
        let paragraph_count = text.lines().filter(|l| !l.trim().is_empty()).count();

        let avg_word_length = if word_count > 0 {
            let total_chars: usize = words.iter().map(|w| w.chars().count()).sum();
            total_chars as f64 / word_count as f64
        } else {
            0.0
        };
        let (long_word_ratio, unique_word_ratio) = if word_count > 0 {
            (
                long_words as f64 / word_count as f64,
                unique_words as f64 / word_count as f64,
            )
        } else {
            (0.0, 0.0)
        };

        CountMetrics {
            word_count: word_count as f64,
            sentence_count: sentence_count as f64,
            long_words: long_words as f64,
            unique_words: unique_words as f64,
            paragraph_count: paragraph_count as f64,
            avg_word_length,
            long_word_ratio,
            unique_word_ratio,
        }
    }
}

/// Strip digits and punctuation (keeping whitespace), lowercase, and drop
/// stop words. This is the texture the trained models see.
pub fn preprocess(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect();

    stripped
        .to_lowercase()
        .split_whitespace()
        .filter(|w| !lexicon::is_stop_word(w))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sentences are period-delimited spans with any non-whitespace content.
fn sentences_of(text: &str) -> Vec<&str> {
    text.split('.')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Strip leading/trailing punctuation so "writing," and "(writing)" hit
/// lexicon entries; interior characters (hyphens, apostrophes) stay.
pub(crate) fn trim_token(token: &str) -> &str {
    token.trim_matches(|c: char| !c.is_alphabetic())
}
