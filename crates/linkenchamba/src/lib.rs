//! Candidate questionnaire scoring and recruiting workflows for LinkenChamba.

pub mod candidates;
pub mod config;
pub mod error;
pub mod manual;
pub mod notify;
pub mod scoring;
pub mod sealing;
pub mod telemetry;

pub use error::AppError;
