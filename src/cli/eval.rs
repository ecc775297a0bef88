// src/cli/eval.rs — Eval command: compare predictions to grader scores

use std::path::PathBuf;

use anyhow::bail;

use crate::corpus;
use crate::feedback::FeedbackGenerator;
use crate::infra::config::Config;
use crate::scoring::normalize::{self, ESSAY_SETS};
use crate::scoring::ScoringPipeline;

pub fn run_eval(
    config: &Config,
    corpus_file: Option<String>,
    per_set: usize,
    with_feedback: bool,
) -> anyhow::Result<()> {
    let path = corpus_file
        .map(PathBuf::from)
        .unwrap_or_else(|| config.corpus_file());
    let records = corpus::load_corpus(&path)?;
    if records.is_empty() {
        bail!("no usable records in {}", path.display());
    }

    let pipeline = ScoringPipeline::from_config(config);
    let feedback = FeedbackGenerator::new(config.feedback.clone());

    let mut total_diff = 0.0;
    let mut scored = 0usize;
    for set in &ESSAY_SETS {
        let sample: Vec<_> = records
            .iter()
            .filter(|r| r.essay_set == set.id)
            .take(per_set)
            .collect();
        if sample.is_empty() {
            continue;
        }

        println!("Set {} ({}):", set.id, set.description);
        for record in sample {
            let predicted = pipeline.predict(&record.essay, record.essay_set);
            let actual = normalize::normalize_score(record.score, record.essay_set);
            let diff = (predicted - actual).abs();
            total_diff += diff;
            scored += 1;
            println!("  predicted {predicted:>5.2}  actual {actual:>5.2}  diff {diff:>5.2}");

            if with_feedback {
                for (category, messages) in feedback.generate(&record.essay).sections() {
                    for message in messages {
                        println!("    [{category}] {message}");
                    }
                }
            }
        }
    }

    if scored == 0 {
        bail!("no corpus essays matched the registered sets");
    }
    println!(
        "\nMean absolute difference over {scored} essays: {:.3}",
        total_diff / scored as f64
    );
    Ok(())
}
