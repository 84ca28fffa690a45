use chrono::NaiveDate;
use linkenchamba::candidates::{CandidateId, CandidateRecord, CandidateRepository, RepositoryError};
use linkenchamba::config::{ScoringConfig, SealingConfig};
use linkenchamba::error::AppError;
use linkenchamba::scoring::Scorer;
use linkenchamba::sealing::RsaFieldSealer;
use metrics_exporter_prometheus::PrometheusHandle;
use std::fs;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Candidate storage that lives only as long as the process.
#[derive(Default, Clone)]
pub(crate) struct InMemoryCandidateRepository {
    records: Arc<Mutex<Vec<CandidateRecord>>>,
}

impl InMemoryCandidateRepository {
    fn guard(&self) -> Result<std::sync::MutexGuard<'_, Vec<CandidateRecord>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))
    }
}

impl CandidateRepository for InMemoryCandidateRepository {
    fn insert(&self, record: CandidateRecord) -> Result<CandidateRecord, RepositoryError> {
        let mut guard = self.guard()?;
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateRecord>, RepositoryError> {
        Ok(self.guard()?.iter().find(|record| &record.id == id).cloned())
    }

    fn all(&self) -> Result<Vec<CandidateRecord>, RepositoryError> {
        Ok(self.guard()?.clone())
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.guard()?.len())
    }
}

pub(crate) fn scorer(config: &ScoringConfig) -> Scorer {
    Scorer::from_seed(config.seed).with_length_policy(config.length_policy)
}

/// Reuse the key at `key_path` when present, otherwise generate one and save it there.
pub(crate) fn sealer(config: &SealingConfig) -> Result<RsaFieldSealer, AppError> {
    let Some(path) = config.key_path.as_deref() else {
        return Ok(RsaFieldSealer::generate(config.key_bits)?);
    };

    if path.exists() {
        let pem = fs::read_to_string(path)?;
        let sealer = RsaFieldSealer::from_private_pem(&pem)?;
        info!(path = %path.display(), key_bits = sealer.key_bits(), "sealing key loaded");
        return Ok(sealer);
    }

    let sealer = RsaFieldSealer::generate(config.key_bits)?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, sealer.private_key_pem()?)?;
    info!(path = %path.display(), key_bits = config.key_bits, "sealing key generated");
    Ok(sealer)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
