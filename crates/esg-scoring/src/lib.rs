pub mod config;
pub mod error;
pub mod pipeline;
pub mod scoring;
pub mod telemetry;
