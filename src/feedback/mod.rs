// src/feedback/mod.rs — Writing suggestions derived from essay metrics

use serde::{Deserialize, Serialize};

use crate::features::FeatureExtractor;
use crate::infra::config::FeedbackConfig;

/// Suggestions grouped by writing dimension. Empty categories are omitted
/// from serialized output entirely rather than sent as empty lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub readability: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coherence: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub argumentation: Option<Vec<String>>,
}

impl FeedbackReport {
    pub fn is_empty(&self) -> bool {
        self.readability.is_none()
            && self.grammar.is_none()
            && self.coherence.is_none()
            && self.argumentation.is_none()
    }

    /// Populated categories in report order.
    pub fn sections(&self) -> Vec<(&'static str, &[String])> {
        [
            ("readability", &self.readability),
            ("grammar", &self.grammar),
            ("coherence", &self.coherence),
            ("argumentation", &self.argumentation),
        ]
        .into_iter()
        .filter_map(|(name, slot)| slot.as_ref().map(|msgs| (name, msgs.as_slice())))
        .collect()
    }
}

/// Turns threshold crossings into student-facing suggestions. Metrics are
/// computed on the raw essay text, punctuation and all, unlike the
/// preprocessed text the scoring models consume.
pub struct FeedbackGenerator {
    extractor: FeatureExtractor,
    config: FeedbackConfig,
}

impl FeedbackGenerator {
    pub fn new(config: FeedbackConfig) -> Self {
        Self {
            extractor: FeatureExtractor::new(),
            config,
        }
    }

    pub fn generate(&self, essay: &str) -> FeedbackReport {
        let readability = self.extractor.readability(essay);
        let errors = self.extractor.error_counts(essay);
        let coherence = self.extractor.coherence(essay);
        let c = &self.config;

        let mut readability_notes = Vec::new();
        if readability.avg_sentence_length > c.long_sentence_words {
            readability_notes
                .push("Try breaking longer sentences into shorter ones to improve clarity".into());
        }
        if readability.avg_word_length > c.long_word_chars {
            readability_notes.push(
                "Consider using simpler words in some places to make your writing clearer".into(),
            );
        }
        if readability.polarity < c.flat_tone_polarity {
            readability_notes
                .push("Make your writing more engaging by varying your sentence structure".into());
        }

        let mut grammar_notes = Vec::new();
        if errors.spelling_errors > c.spelling_error_limit {
            grammar_notes.push(format!(
                "Review your essay for spelling errors - found approximately {} potential mistakes",
                errors.spelling_errors as usize
            ));
        }
        if errors.grammar_errors > c.grammar_error_limit {
            grammar_notes.push(
                "Check your grammar, focusing on subject-verb agreement and proper tense usage"
                    .into(),
            );
        }
        if errors.style_errors > c.style_error_limit {
            grammar_notes.push("Review your punctuation and capitalization".into());
        }

        let mut coherence_notes = Vec::new();
        if coherence.vocabulary_richness < c.vocab_richness_floor {
            coherence_notes.push("Try using more varied vocabulary to express your ideas".into());
        }
        if coherence.unique_sentence_starts < c.sentence_start_floor {
            coherence_notes.push(
                "Start your sentences in different ways to make your writing more interesting"
                    .into(),
            );
        }

        let mut argumentation_notes = Vec::new();
        if coherence.discourse_markers < c.discourse_marker_floor {
            argumentation_notes.push(
                "Add transition words (like 'however', 'therefore', 'moreover') to connect your ideas better"
                    .into(),
            );
        }
        if coherence.topic_development < c.topic_development_floor {
            argumentation_notes
                .push("Develop your ideas further by adding more specific examples and details".into());
        }

        FeedbackReport {
            readability: non_empty(readability_notes),
            grammar: non_empty(grammar_notes),
            coherence: non_empty(coherence_notes),
            argumentation: non_empty(argumentation_notes),
        }
    }
}

fn non_empty(messages: Vec<String>) -> Option<Vec<String>> {
    if messages.is_empty() {
        None
    } else {
        Some(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Clears every threshold: six varied sentence starts, four discourse
    /// markers, warm tone, dictionary words only, 35 words.
    const STRONG: &str = "Students learn well because computers help. \
However some teachers fear change. \
Therefore schools must plan with care. \
Good habits grow because practice works. \
Great books also help students daily. \
Smart choices bring joy and success.";

    fn generator() -> FeedbackGenerator {
        FeedbackGenerator::new(FeedbackConfig::default())
    }

    #[test]
    fn test_strong_essay_gets_no_suggestions() {
        let report = generator().generate(STRONG);
        assert!(report.is_empty(), "unexpected feedback: {report:?}");
        assert!(report.sections().is_empty());
    }

    #[test]
    fn test_empty_essay_flags_fundamentals() {
        let report = generator().generate("");
        assert_eq!(report.readability.as_ref().map(Vec::len), Some(1));
        assert_eq!(report.grammar, None);
        assert_eq!(report.coherence.as_ref().map(Vec::len), Some(2));
        assert_eq!(report.argumentation.as_ref().map(Vec::len), Some(2));
        assert!(!report.is_empty());
    }

    #[test]
    fn test_sections_come_in_report_order() {
        let report = generator().generate("");
        let names: Vec<&str> = report.sections().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["readability", "coherence", "argumentation"]);
    }

    #[test]
    fn test_spelling_suggestion_includes_count() {
        let report = generator().generate("Thiss essai haz menny mispeled wordz in itt evrywhere");
        let grammar = report.grammar.expect("expected spelling feedback");
        assert_eq!(grammar.len(), 1);
        assert!(grammar[0].contains("approximately 8 potential mistakes"), "{}", grammar[0]);
    }

    #[test]
    fn test_long_sentences_flagged() {
        let mut essay = "very long sentence keeps going ".repeat(8);
        essay.push_str("end.");
        let report = generator().generate(&essay);
        let readability = report.readability.expect("expected readability feedback");
        assert!(readability.iter().any(|m| m.contains("breaking longer sentences")));
        assert!(!readability.iter().any(|m| m.contains("simpler words")));
    }

    #[test]
    fn test_serialized_report_omits_empty_categories() {
        let report = generator().generate("");
        let value = serde_json::to_value(&report).unwrap();
        let object = value.as_object().unwrap();
        assert!(object.contains_key("readability"));
        assert!(object.contains_key("coherence"));
        assert!(!object.contains_key("grammar"));
    }

    #[test]
    fn test_thresholds_follow_config() {
        let mut config = FeedbackConfig::default();
        config.discourse_marker_floor = 10.0;
        let report = FeedbackGenerator::new(config).generate(STRONG);
        let argumentation = report.argumentation.expect("expected argumentation feedback");
        assert!(argumentation.iter().any(|m| m.contains("transition words")));
    }
}
