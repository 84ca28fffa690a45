//! Flat JSON record store holding the whole candidate collection in one file.

use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Deserialize;
use tracing::{debug, info};

use super::domain::{CandidateDatabase, CandidateId, CandidateRecord};
use super::repository::{CandidateRepository, RepositoryError};
use crate::scoring::RoleCatalog;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access candidate store at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("candidate store at {} is not valid JSON: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("candidate store at {} has no 'candidatos' collection", .path.display())]
    MissingCandidates { path: PathBuf },
}

/// On-disk shape read straight from the file so score maps keep their written order.
#[derive(Deserialize)]
struct StoredDatabase {
    version: Option<String>,
    #[serde(rename = "puestos_disponibles", default)]
    available_roles: Vec<String>,
    #[serde(rename = "metodo_puntuacion")]
    scoring_method: Option<String>,
    #[serde(rename = "candidatos")]
    candidates: Option<Vec<CandidateRecord>>,
}

/// Read a database file. A missing file reads as an empty collection.
pub fn load(path: &Path, catalog: &RoleCatalog) -> Result<CandidateDatabase, StoreError> {
    if !path.exists() {
        debug!(path = %path.display(), "candidate store missing, starting empty");
        return Ok(CandidateDatabase::empty(catalog));
    }

    let file = fs::File::open(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let stored: StoredDatabase = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
        StoreError::Json {
            path: path.to_path_buf(),
            source,
        }
    })?;

    let Some(candidates) = stored.candidates else {
        return Err(StoreError::MissingCandidates {
            path: path.to_path_buf(),
        });
    };

    let mut database = CandidateDatabase::new(catalog, candidates);
    if let Some(version) = stored.version {
        database.version = version;
    }
    if let Some(method) = stored.scoring_method {
        database.scoring_method = method;
    }
    if !stored.available_roles.is_empty() {
        database.available_roles = stored.available_roles;
    }

    Ok(database)
}

/// Write a database file atomically (temp file, then rename).
pub fn save(path: &Path, database: &CandidateDatabase) -> Result<(), StoreError> {
    let io_error = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let mut snapshot = database.clone();
    snapshot.total_candidates = snapshot.candidates.len();

    let staging = path.with_extension("json.tmp");
    let file = fs::File::create(&staging).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &snapshot).map_err(|source| StoreError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_error)?;
    drop(writer);

    fs::rename(&staging, path).map_err(io_error)?;
    info!(path = %path.display(), candidates = snapshot.total_candidates, "candidate store saved");
    Ok(())
}

/// Repository backed by a JSON file, written through on every insert.
pub struct JsonFileStore {
    path: PathBuf,
    database: Mutex<CandidateDatabase>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>, catalog: &RoleCatalog) -> Result<Self, StoreError> {
        let path = path.into();
        let database = load(&path, catalog)?;
        info!(path = %path.display(), candidates = database.total_candidates, "candidate store opened");
        Ok(Self {
            path,
            database: Mutex::new(database),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Result<CandidateDatabase, RepositoryError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, CandidateDatabase>, RepositoryError> {
        self.database
            .lock()
            .map_err(|_| RepositoryError::Unavailable("candidate store lock poisoned".to_string()))
    }
}

impl CandidateRepository for JsonFileStore {
    fn insert(&self, record: CandidateRecord) -> Result<CandidateRecord, RepositoryError> {
        let mut guard = self.lock()?;
        if guard.candidates.iter().any(|existing| existing.id == record.id) {
            return Err(RepositoryError::Conflict);
        }

        guard.push(record.clone());
        if let Err(err) = save(&self.path, &guard) {
            guard.candidates.pop();
            guard.total_candidates = guard.candidates.len();
            return Err(RepositoryError::Unavailable(err.to_string()));
        }
        Ok(record)
    }

    fn fetch(&self, id: &CandidateId) -> Result<Option<CandidateRecord>, RepositoryError> {
        let guard = self.lock()?;
        Ok(guard
            .candidates
            .iter()
            .find(|record| &record.id == id)
            .cloned())
    }

    fn all(&self) -> Result<Vec<CandidateRecord>, RepositoryError> {
        Ok(self.lock()?.candidates.clone())
    }

    fn count(&self) -> Result<usize, RepositoryError> {
        Ok(self.lock()?.candidates.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{QuestionnaireResponse, Scorer};
    use chrono::NaiveDate;

    fn record(id: &str) -> CandidateRecord {
        let responses = QuestionnaireResponse {
            environment: "Me adapto fácilmente a cualquier ambiente".to_string(),
            ..QuestionnaireResponse::default()
        };
        CandidateRecord {
            id: CandidateId(id.to_string()),
            name: "Lucía Hernández".to_string(),
            email: "lucia@example.com".to_string(),
            phone: "55 0000 1111".to_string(),
            address: "Av. Juárez 10, Oaxaca".to_string(),
            scores: Scorer::standard().score_all(&responses),
            responses,
            registered_at: NaiveDate::from_ymd_opt(2025, 3, 1)
                .and_then(|date| date.and_hms_opt(10, 0, 0))
                .expect("valid timestamp"),
            sealed_contact: None,
        }
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = RoleCatalog::standard();
        let database = load(&dir.path().join("absent.json"), &catalog).expect("loads");
        assert!(database.candidates.is_empty());
        assert_eq!(database.available_roles, catalog.names());
    }

    #[test]
    fn rejects_files_without_candidate_collection() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{ "version": "1.0" }"#).expect("write");

        match load(&path, &RoleCatalog::standard()) {
            Err(StoreError::MissingCandidates { .. }) => {}
            other => panic!("expected missing collection error, got {other:?}"),
        }
    }

    #[test]
    fn save_then_load_preserves_scores_and_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("candidatos.json");
        let catalog = RoleCatalog::standard();
        let database = CandidateDatabase::new(&catalog, vec![record("a"), record("b")]);

        save(&path, &database).expect("saves");
        let text = fs::read_to_string(&path).expect("read back");
        assert!(text.contains("Lucía Hernández"), "non-ASCII kept verbatim");
        assert!(text.contains("\"total_candidatos\": 2"));

        let loaded = load(&path, &catalog).expect("loads");
        assert_eq!(loaded, database);
    }

    #[test]
    fn loaded_scores_keep_catalog_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("candidatos.json");
        let catalog = RoleCatalog::standard();
        save(&path, &CandidateDatabase::new(&catalog, vec![record("cand_1")])).expect("saves");

        let store = JsonFileStore::open(&path, &catalog).expect("opens");
        store.insert(record("cand_2")).expect("insert");

        let loaded = load(&path, &catalog).expect("loads");
        for candidate in &loaded.candidates {
            let roles: Vec<&str> = candidate.scores.iter().map(|(role, _)| role).collect();
            assert_eq!(catalog.names(), roles);
        }
    }

    #[test]
    fn null_candidate_collection_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nulo.json");
        fs::write(&path, r#"{ "candidatos": null, "total_candidatos": 4 }"#).expect("write");

        assert!(matches!(
            load(&path, &RoleCatalog::standard()),
            Err(StoreError::MissingCandidates { .. })
        ));
    }

    #[test]
    fn store_writes_through_and_rejects_duplicates() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("candidatos.json");
        let catalog = RoleCatalog::standard();

        let store = JsonFileStore::open(&path, &catalog).expect("opens");
        store.insert(record("cand_1")).expect("insert");
        assert!(matches!(
            store.insert(record("cand_1")),
            Err(RepositoryError::Conflict)
        ));

        let reopened = JsonFileStore::open(&path, &catalog).expect("reopens");
        assert_eq!(reopened.count().expect("count"), 1);
        assert!(reopened
            .fetch(&CandidateId("cand_1".to_string()))
            .expect("fetch")
            .is_some());
    }
}
