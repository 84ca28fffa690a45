use std::sync::{Arc, Mutex};

use chrono::Local;
use tracing::{info, warn};

use super::domain::{CandidateId, CandidateRecord, Registration};
use super::repository::{CandidateRepository, RepositoryError};
use super::search::{
    rank_candidates, role_statistics, RankedCandidate, RoleStatistics, SearchQuery,
    TOP_CANDIDATES_PER_ROLE,
};
use crate::notify::{ContactMessage, ContactNotifier, NotifyError};
use crate::scoring::questionnaire::MAX_UNIQUE_TRAIT_CHARS;
use crate::scoring::{
    FeatureLengthError, QuestionnaireResponse, RoleCatalog, RoleDefinition, ScoreSet, Scorer,
};
use crate::sealing::{FieldSealer, SealingError};

/// Extra attempts at the next sequential id when a stored record already uses it.
const ID_COLLISION_RETRIES: usize = 16;

/// Service composing scoring, sealing, storage and contact delivery.
pub struct CandidateService<R, S, N> {
    repository: Arc<R>,
    sealer: Arc<S>,
    notifier: Arc<N>,
    scorer: Arc<Scorer>,
    registration: Mutex<()>,
}

impl<R, S, N> CandidateService<R, S, N>
where
    R: CandidateRepository + 'static,
    S: FieldSealer + 'static,
    N: ContactNotifier + 'static,
{
    pub fn new(repository: Arc<R>, sealer: Arc<S>, notifier: Arc<N>, scorer: Arc<Scorer>) -> Self {
        Self {
            repository,
            sealer,
            notifier,
            scorer,
            registration: Mutex::new(()),
        }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    pub fn catalog(&self) -> &RoleCatalog {
        self.scorer.catalog()
    }

    /// Validate, score, seal, and store a questionnaire submission.
    pub fn register(
        &self,
        registration: Registration,
    ) -> Result<CandidateRecord, CandidateServiceError> {
        let registration = validate(registration)?;
        let scores = self.scorer.score_all(&registration.responses);
        let sealed_contact = self.sealer.seal(&registration.contact())?;

        let _serial = self
            .registration
            .lock()
            .map_err(|_| RepositoryError::Unavailable("registration lock poisoned".to_string()))?;

        let mut next = self.repository.count()? + 1;
        let mut record = CandidateRecord {
            id: CandidateId(format!("cand_{next}")),
            name: registration.name,
            email: registration.email,
            phone: registration.phone,
            address: registration.address,
            responses: registration.responses,
            scores,
            registered_at: Local::now().naive_local(),
            sealed_contact: Some(sealed_contact),
        };

        for _ in 0..ID_COLLISION_RETRIES {
            match self.repository.insert(record.clone()) {
                Ok(stored) => {
                    info!(candidate_id = %stored.id, "candidate registered");
                    return Ok(stored);
                }
                Err(RepositoryError::Conflict) => {
                    warn!(candidate_id = %record.id, "candidate id already taken, trying next");
                    next += 1;
                    record.id = CandidateId(format!("cand_{next}"));
                }
                Err(other) => return Err(other.into()),
            }
        }

        Err(RepositoryError::Conflict.into())
    }

    pub fn get(&self, id: &CandidateId) -> Result<CandidateRecord, CandidateServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Candidates for a role at or above the requested score, best first.
    pub fn search(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<RankedCandidate>, CandidateServiceError> {
        let role = self.role(&query.role)?;
        let candidates = self.repository.all()?;
        Ok(rank_candidates(
            &candidates,
            role,
            query.min_score,
            query.limit,
        ))
    }

    pub fn statistics(&self) -> Result<Vec<RoleStatistics>, CandidateServiceError> {
        let candidates = self.repository.all()?;
        Ok(role_statistics(
            &candidates,
            self.catalog(),
            TOP_CANDIDATES_PER_ROLE,
        ))
    }

    /// Compose and deliver a role invitation to a stored candidate.
    pub fn contact(
        &self,
        id: &CandidateId,
        role: &str,
    ) -> Result<ContactMessage, CandidateServiceError> {
        let role = self.role(role)?;
        let record = self.get(id)?;
        let message = ContactMessage::compose(&record, &role.name, record.score_for(&role.name));
        self.notifier.deliver(&message)?;
        info!(candidate_id = %id, role = %role.name, "candidate contacted");
        Ok(message)
    }

    /// Scores for a questionnaire without registering anyone.
    pub fn score_preview(
        &self,
        responses: &QuestionnaireResponse,
    ) -> Result<ScoreSet, CandidateServiceError> {
        check_unique_trait(responses)?;
        Ok(self.scorer.score_all(responses))
    }

    /// Scores for a raw feature vector under the configured length policy.
    pub fn score_features(&self, values: Vec<f64>) -> Result<ScoreSet, CandidateServiceError> {
        Ok(self.scorer.score_feature_slots(values)?)
    }

    fn role(&self, name: &str) -> Result<&RoleDefinition, CandidateServiceError> {
        self.catalog()
            .find(name)
            .ok_or_else(|| CandidateServiceError::UnknownRole(name.trim().to_string()))
    }
}

fn validate(mut registration: Registration) -> Result<Registration, CandidateServiceError> {
    for (field, value) in [
        ("name", &mut registration.name),
        ("email", &mut registration.email),
        ("phone", &mut registration.phone),
        ("address", &mut registration.address),
    ] {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CandidateServiceError::MissingField(field));
        }
        *value = trimmed.to_string();
    }

    check_unique_trait(&registration.responses)?;
    Ok(registration)
}

fn check_unique_trait(responses: &QuestionnaireResponse) -> Result<(), CandidateServiceError> {
    let length = responses.unique_trait.chars().count();
    if length > MAX_UNIQUE_TRAIT_CHARS {
        return Err(CandidateServiceError::TraitTooLong {
            length,
            max: MAX_UNIQUE_TRAIT_CHARS,
        });
    }
    Ok(())
}

/// Error raised by the candidate service.
#[derive(Debug, thiserror::Error)]
pub enum CandidateServiceError {
    #[error("field '{0}' is required")]
    MissingField(&'static str),
    #[error("unique trait has {length} characters, at most {max} are allowed")]
    TraitTooLong { length: usize, max: usize },
    #[error("unknown role '{0}'")]
    UnknownRole(String),
    #[error(transparent)]
    Features(#[from] FeatureLengthError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Sealing(#[from] SealingError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}
