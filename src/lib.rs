// src/lib.rs — Library root for essaymark

pub mod api;
pub mod cli;
pub mod corpus;
pub mod features;
pub mod feedback;
pub mod infra;
pub mod model;
pub mod scoring;
