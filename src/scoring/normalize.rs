// src/scoring/normalize.rs — Essay set registry and native-range normalization

/// Scores leave the engine on this fixed scale.
pub const SCALE_MIN: f64 = 0.0;
pub const SCALE_MAX: f64 = 10.0;

/// One prompt family from the training corpus, with its native grader
/// range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EssaySet {
    pub id: u8,
    pub min_score: f64,
    pub max_score: f64,
    pub description: &'static str,
}

pub const ESSAY_SETS: [EssaySet; 8] = [
    EssaySet {
        id: 1,
        min_score: 2.0,
        max_score: 12.0,
        description: "Persuasive essay about computers in education",
    },
    EssaySet {
        id: 2,
        min_score: 1.0,
        max_score: 6.0,
        description: "Library censorship essay",
    },
    EssaySet {
        id: 3,
        min_score: 0.0,
        max_score: 3.0,
        description: "Text analysis and comprehension",
    },
    EssaySet {
        id: 4,
        min_score: 0.0,
        max_score: 3.0,
        description: "Narrative analysis and interpretation",
    },
    EssaySet {
        id: 5,
        min_score: 0.0,
        max_score: 4.0,
        description: "Memoir analysis and interpretation",
    },
    EssaySet {
        id: 6,
        min_score: 0.0,
        max_score: 4.0,
        description: "Historical analysis essay",
    },
    EssaySet {
        id: 7,
        min_score: 0.0,
        max_score: 30.0,
        description: "Extended response on patience",
    },
    EssaySet {
        id: 8,
        min_score: 0.0,
        max_score: 60.0,
        description: "Extended narrative response",
    },
];

pub fn essay_set(id: u8) -> Option<&'static EssaySet> {
    ESSAY_SETS.iter().find(|s| s.id == id)
}

pub fn is_known_set(id: u8) -> bool {
    essay_set(id).is_some()
}

/// Native grader range for a set, if registered.
pub fn score_range(id: u8) -> Option<(f64, f64)> {
    essay_set(id).map(|s| (s.min_score, s.max_score))
}

/// Map a native-range score onto [0, 10], clamped. Scores for sets the
/// registry does not know pass through exactly as given, unclamped.
pub fn normalize_score(raw: f64, essay_set_id: u8) -> f64 {
    match essay_set(essay_set_id) {
        Some(set) if set.max_score > set.min_score => {
            let scaled = (raw - set.min_score) / (set.max_score - set.min_score) * SCALE_MAX;
            scaled.clamp(SCALE_MIN, SCALE_MAX)
        }
        _ => raw,
    }
}
