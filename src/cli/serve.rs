// src/cli/serve.rs — Serve command: run the scoring HTTP API

use std::sync::Arc;

use crate::api::{self, ApiState};
use crate::feedback::FeedbackGenerator;
use crate::infra::config::Config;
use crate::infra::paths;
use crate::scoring::ScoringPipeline;

pub async fn run_serve(config: &Config, port: Option<u16>) -> anyhow::Result<()> {
    paths::ensure_dirs().await?;

    let mut server = config.server.clone();
    if let Some(port) = port {
        server.port = port;
    }

    let state = ApiState {
        pipeline: Arc::new(ScoringPipeline::from_config(config)),
        feedback: Arc::new(FeedbackGenerator::new(config.feedback.clone())),
    };
    api::start_server(&server, state).await
}
