// src/cli/score.rs — Default command: score an essay

use anyhow::bail;

use crate::api::MIN_ESSAY_CHARS;
use crate::features::{self, FeatureExtractor};
use crate::feedback::FeedbackGenerator;
use crate::infra::config::Config;
use crate::scoring::{normalize, ScoringPipeline};

/// Score one essay and print the result, optionally with the raw feature
/// values and writing suggestions.
pub fn run_score(
    essay: &str,
    essay_set: u8,
    config: &Config,
    show_features: bool,
    with_feedback: bool,
) -> anyhow::Result<()> {
    if !normalize::is_known_set(essay_set) {
        bail!("essay set must be between 1 and 8, got {essay_set}");
    }
    if essay.chars().count() < MIN_ESSAY_CHARS {
        bail!("essay must be at least {MIN_ESSAY_CHARS} characters");
    }

    let pipeline = ScoringPipeline::from_config(config);
    let score = pipeline.predict(essay, essay_set);
    println!("Score: {score:.2} / 10");

    if show_features {
        let record = FeatureExtractor::new().extract(&features::preprocess(essay));
        println!("\nFeatures:");
        for (name, value) in record.fields() {
            println!("  {name:<22} {value:.3}");
        }
    }

    if with_feedback {
        let report = FeedbackGenerator::new(config.feedback.clone()).generate(essay);
        if report.is_empty() {
            println!("\nNo writing suggestions, nice work.");
        } else {
            println!("\nSuggestions:");
            for (category, messages) in report.sections() {
                println!("{category}:");
                for message in messages {
                    println!("  - {message}");
                }
            }
        }
    }

    Ok(())
}
