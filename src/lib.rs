//! Customer churn classifier: offline training and single-record inference.
/// Application directory resolution.
pub mod app_dirs;
/// Artifact directory layout and persistence.
pub mod artifacts;
/// TOML configuration.
pub mod config;
/// CSV loading, cleaning and splitting.
pub mod dataset;
/// One-hot encoding schema shared by training and inference.
pub mod encoding;
/// Record scoring and risk tiers.
pub mod inference;
/// Tracing subscriber setup.
pub mod logging;
/// Scaler, classifier and metrics.
pub mod ml;
/// End-to-end training job.
pub mod training;
