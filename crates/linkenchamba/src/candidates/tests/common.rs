use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::candidates::domain::{CandidateId, CandidateRecord, ContactDetails, Registration};
use crate::candidates::repository::{CandidateRepository, RepositoryError};
use crate::candidates::{candidate_router, CandidateService};
use crate::notify::OutboxNotifier;
use crate::scoring::{ProficiencyLevel, QuestionnaireResponse, Scorer};
use crate::sealing::{FieldSealer, SealingError};

pub(super) type TestService = CandidateService<MemoryRepository, PlainSealer, OutboxNotifier>;

pub(super) fn responses() -> QuestionnaireResponse {
    let mut levels = BTreeMap::new();
    levels.insert("Productividad".to_string(), ProficiencyLevel::Advanced);
    levels.insert("Atención clientes".to_string(), ProficiencyLevel::Intermediate);

    QuestionnaireResponse {
        practical_skills: vec![
            "Atender clientes en mostrador o por teléfono".to_string(),
            "Manejar caja registradora y dar cambio".to_string(),
        ],
        tools: vec!["Caja registradora o punto de venta".to_string()],
        environment: "Disfruto interactuar con mucha gente".to_string(),
        activities: vec!["Ayudar directamente a clientes o personas".to_string()],
        knowledge_areas: vec!["Conceptos básicos de ventas o servicio al cliente".to_string()],
        levels,
        work_type: "Trabajo de tiempo completo (8 horas)".to_string(),
        achievements: vec!["Tener un ingreso estable para mis gastos".to_string()],
        reaction: "Mantengo la calma y evalúo opciones".to_string(),
        stands_out: vec!["Cuando hay que motivar al equipo".to_string()],
        motivation: "Todas las anteriores".to_string(),
        unique_trait: "Nunca pierdo la paciencia con un cliente".to_string(),
    }
}

pub(super) fn registration() -> Registration {
    Registration {
        name: "Gabriela Torres".to_string(),
        email: "gabriela.torres@example.com".to_string(),
        phone: "55 2468 1357".to_string(),
        address: "Calle Allende 40, Querétaro".to_string(),
        responses: responses(),
    }
}

pub(super) fn build_service() -> (TestService, Arc<MemoryRepository>, Arc<OutboxNotifier>) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(OutboxNotifier::default());
    let service = CandidateService::new(
        repository.clone(),
        Arc::new(PlainSealer),
        notifier.clone(),
        Arc::new(Scorer::standard()),
    );
    (service, repository, notifier)
}

pub(super) fn candidate_router_with_service(service: TestService) -> axum::Router {
    candidate_router(Arc::new(service))
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<Vec<CandidateRecord>>>,
}

impl MemoryRepository {
    pub(super) fn seed(&self, record: CandidateRecord) {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .push(record);
    }
}

impl CandidateRepository for MemoryRepository {
    fn insert(&self, record: CandidateRecord) -> Result<CandidateRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().find(|record| &record.id == id).cloned())
    }

    fn all(&self) -> Result<Vec<CandidateRecord>, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").clone())
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.records.lock().expect("repository mutex poisoned").len())
    }
}

pub(super) struct UnavailableRepository;

impl CandidateRepository for UnavailableRepository {
    fn insert(&self, _record: CandidateRecord) -> Result<CandidateRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }

    fn fetch(&self, _id: &CandidateId) -> Result<Option<CandidateRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }

    fn all(&self) -> Result<Vec<CandidateRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("disk full".to_string()))
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(0)
    }
}

/// Reversible stand-in so service tests avoid RSA key generation.
pub(super) struct PlainSealer;

impl FieldSealer for PlainSealer {
    fn seal(&self, contact: &ContactDetails) -> Result<String, SealingError> {
        Ok(serde_json::to_string(contact)?)
    }

    fn open(&self, sealed: &str) -> Result<ContactDetails, SealingError> {
        Ok(serde_json::from_str(sealed)?)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn stored_record(id: &str, name: &str, scores: &[(&str, f64)]) -> CandidateRecord {
    CandidateRecord {
        id: CandidateId(id.to_string()),
        name: name.to_string(),
        email: format!("{id}@example.com"),
        phone: "55 0000 0000".to_string(),
        address: "Av. Reforma 1, CDMX".to_string(),
        responses: QuestionnaireResponse::default(),
        scores: scores
            .iter()
            .map(|(role, score)| (role.to_string(), *score))
            .collect(),
        registered_at: chrono::NaiveDate::from_ymd_opt(2025, 4, 10)
            .and_then(|date| date.and_hms_opt(9, 0, 0))
            .expect("valid timestamp"),
        sealed_contact: None,
    }
}
