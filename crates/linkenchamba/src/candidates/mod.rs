//! Candidate intake, storage, search, and outreach.
//!
//! Registrations and synthetic candidates are scored by the same [`crate::scoring::Scorer`]
//! and persisted in the legacy candidate-database JSON layout.

pub mod domain;
pub mod export;
pub mod generator;
pub mod repository;
pub mod router;
pub mod search;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{CandidateDatabase, CandidateId, CandidateRecord, ContactDetails, Registration};
pub use export::{export_csv, ExportError};
pub use generator::{CandidateGenerator, DEFAULT_CANDIDATE_COUNT};
pub use repository::{CandidateRepository, RepositoryError};
pub use router::candidate_router;
pub use search::{
    rank_candidates, role_statistics, RankedCandidate, RoleStatistics, SearchQuery, TopCandidate,
};
pub use service::{CandidateService, CandidateServiceError};
pub use store::{JsonFileStore, StoreError};
