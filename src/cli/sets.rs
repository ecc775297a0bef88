// src/cli/sets.rs — Sets command: list registered essay sets

use crate::scoring::normalize::ESSAY_SETS;

pub fn run_sets() {
    println!("{:<4} {:<8} DESCRIPTION", "SET", "RANGE");
    for set in &ESSAY_SETS {
        let range = format!("{}-{}", set.min_score, set.max_score);
        println!("{:<4} {:<8} {}", set.id, range, set.description);
    }
}
