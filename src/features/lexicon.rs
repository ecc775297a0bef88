// src/features/lexicon.rs — Embedded word lists: stop words, tone valence, discourse markers

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use super::trim_token;

/// English stop words, NLTK's list. Dropped during preprocessing so the
/// models see content words only.
const STOP_WORDS_RAW: &str = "\
i me my myself we our ours ourselves you you're you've you'll you'd your yours \
yourself yourselves he him his himself she she's her hers herself it it's its \
itself they them their theirs themselves what which who whom this that that'll \
these those am is are was were be been being have has had having do does did \
doing a an the and but if or because as until while of at by for with about \
against between into through during before after above below to from up down in \
out on off over under again further then once here there when where why how all \
any both each few more most other some such no nor not only own same so than too \
very s t can will just don don't should should've now d ll m o re ve y ain aren \
aren't couldn couldn't didn didn't doesn doesn't hadn hadn't hasn hasn't haven \
haven't isn isn't ma mightn mightn't mustn mustn't needn needn't shan shan't \
shouldn shouldn't wasn wasn't weren weren't won won't wouldn wouldn't";

/// Connectives counted as coherence evidence. Matched against whole
/// lowercase tokens, punctuation included, so "however," does not count.
pub const DISCOURSE_MARKERS: [&str; 9] = [
    "however",
    "therefore",
    "furthermore",
    "moreover",
    "because",
    "since",
    "although",
    "thus",
    "hence",
];

/// Small valence lexicon for the polarity metric. Values in [-1, 1].
const VALENCE: &[(&str, f64)] = &[
    // positive
    ("good", 0.7),
    ("great", 0.8),
    ("excellent", 1.0),
    ("amazing", 0.6),
    ("wonderful", 1.0),
    ("awesome", 1.0),
    ("fantastic", 0.9),
    ("outstanding", 1.0),
    ("best", 1.0),
    ("better", 0.5),
    ("perfect", 1.0),
    ("brilliant", 0.9),
    ("beautiful", 0.85),
    ("happy", 0.8),
    ("joy", 0.8),
    ("love", 0.7),
    ("like", 0.2),
    ("enjoy", 0.5),
    ("nice", 0.6),
    ("pleasant", 0.6),
    ("positive", 0.4),
    ("success", 0.7),
    ("successful", 0.7),
    ("helpful", 0.5),
    ("useful", 0.4),
    ("valuable", 0.5),
    ("important", 0.4),
    ("interesting", 0.5),
    ("engaging", 0.4),
    ("effective", 0.6),
    ("strong", 0.4),
    ("clear", 0.3),
    ("easy", 0.4),
    ("benefit", 0.5),
    ("improve", 0.4),
    ("improved", 0.4),
    ("win", 0.6),
    ("safe", 0.4),
    ("smart", 0.6),
    ("fun", 0.6),
    ("exciting", 0.6),
    ("remarkable", 0.7),
    ("impressive", 0.7),
    // negative
    ("bad", -0.7),
    ("terrible", -1.0),
    ("awful", -1.0),
    ("horrible", -1.0),
    ("worst", -1.0),
    ("poor", -0.4),
    ("boring", -0.8),
    ("sad", -0.5),
    ("angry", -0.6),
    ("hate", -0.8),
    ("dislike", -0.4),
    ("difficult", -0.5),
    ("hard", -0.29),
    ("wrong", -0.5),
    ("fail", -0.6),
    ("failure", -0.6),
    ("problem", -0.3),
    ("weak", -0.4),
    ("worse", -0.6),
    ("negative", -0.4),
    ("dangerous", -0.6),
    ("harm", -0.5),
    ("harmful", -0.5),
    ("ugly", -0.7),
    ("useless", -0.6),
    ("broken", -0.4),
];

fn stop_words() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOP_WORDS_RAW.split_whitespace().collect())
}

fn valence_table() -> &'static HashMap<&'static str, f64> {
    static MAP: OnceLock<HashMap<&'static str, f64>> = OnceLock::new();
    MAP.get_or_init(|| VALENCE.iter().copied().collect())
}

pub fn is_stop_word(word: &str) -> bool {
    stop_words().contains(word)
}

pub fn is_discourse_marker(token: &str) -> bool {
    DISCOURSE_MARKERS.contains(&token)
}

/// Mean valence over lexicon hits in the text, 0.0 when nothing matches.
/// Tokens are lowercased and stripped of surrounding punctuation first.
pub fn polarity(text: &str) -> f64 {
    let lower = text.to_lowercase();
    let table = valence_table();

    let mut sum = 0.0;
    let mut hits = 0usize;
    for token in lower.split_whitespace() {
        if let Some(value) = table.get(trim_token(token)) {
            sum += value;
            hits += 1;
        }
    }
    if hits == 0 {
        0.0
    } else {
        sum / hits as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_words_membership() {
        assert!(is_stop_word("the"));
        assert!(is_stop_word("because"));
        assert!(is_stop_word("don't"));
        assert!(!is_stop_word("essay"));
        assert!(!is_stop_word("dont"));
        // lookups are case-sensitive; callers lowercase first
        assert!(!is_stop_word("The"));
    }

    #[test]
    fn test_discourse_marker_exact_match() {
        assert!(is_discourse_marker("however"));
        assert!(is_discourse_marker("hence"));
        assert!(!is_discourse_marker("however,"));
        assert!(!is_discourse_marker("howevers"));
    }

    #[test]
    fn test_polarity_averages_hits() {
        // good (0.7) + bad (-0.7) cancel
        assert_eq!(polarity("good bad"), 0.0);
        assert_eq!(polarity("This essay is excellent."), 1.0);
        let p = polarity("A good, great day");
        assert!((p - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_polarity_no_hits_is_zero() {
        assert_eq!(polarity(""), 0.0);
        assert_eq!(polarity("neutral words only here"), 0.0);
    }

    #[test]
    fn test_polarity_strips_punctuation() {
        assert!(polarity("It was terrible!") < 0.0);
        assert!(polarity("(wonderful)") > 0.0);
    }
}
