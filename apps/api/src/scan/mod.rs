//! Resume ↔ job-description compatibility engine.

pub mod clarity;
pub mod classifier;
pub mod error;
pub mod extractor;
pub mod feedback;
pub mod handlers;
pub mod matcher;
pub mod normalizer;
pub mod pipeline;
pub mod scoring;
