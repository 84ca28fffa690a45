use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::scoring::{QuestionnaireResponse, RoleCatalog, ScoreSet};

pub const DATABASE_VERSION: &str = "1.0";
pub const SCORING_METHOD: &str =
    "Red neuronal multicapa (3 capas: 55->30->15->5) - Todas las preguntas del cuestionario";

/// Identifier wrapper for stored candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub String);

impl std::fmt::Display for CandidateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields sealed before a record is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub email: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "direccion")]
    pub address: String,
}

/// Interactive form submission before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub responses: QuestionnaireResponse,
}

impl Registration {
    pub fn contact(&self) -> ContactDetails {
        ContactDetails {
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
        }
    }
}

/// One stored candidate with answers and the scores computed from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: CandidateId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    #[serde(rename = "direccion", default)]
    pub address: String,
    #[serde(rename = "respuestas_cuestionario", default)]
    pub responses: QuestionnaireResponse,
    #[serde(rename = "puntuaciones", default)]
    pub scores: ScoreSet,
    #[serde(
        rename = "fecha_registro",
        serialize_with = "serialize_timestamp",
        deserialize_with = "deserialize_timestamp"
    )]
    pub registered_at: NaiveDateTime,
    #[serde(
        rename = "datos_cifrados",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sealed_contact: Option<String>,
}

impl CandidateRecord {
    /// Score for `role`; candidates without one read as zero.
    pub fn score_for(&self, role: &str) -> f64 {
        self.scores.get(role).unwrap_or(0.0)
    }
}

/// Collection-level record written to the candidate store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateDatabase {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(rename = "total_candidatos", default)]
    pub total_candidates: usize,
    #[serde(rename = "puestos_disponibles", default)]
    pub available_roles: Vec<String>,
    #[serde(rename = "metodo_puntuacion", default = "default_method")]
    pub scoring_method: String,
    #[serde(rename = "candidatos")]
    pub candidates: Vec<CandidateRecord>,
}

impl CandidateDatabase {
    pub fn new(catalog: &RoleCatalog, candidates: Vec<CandidateRecord>) -> Self {
        Self {
            version: default_version(),
            total_candidates: candidates.len(),
            available_roles: catalog.names(),
            scoring_method: default_method(),
            candidates,
        }
    }

    pub fn empty(catalog: &RoleCatalog) -> Self {
        Self::new(catalog, Vec::new())
    }

    pub fn push(&mut self, record: CandidateRecord) {
        self.candidates.push(record);
        self.total_candidates = self.candidates.len();
    }
}

fn default_version() -> String {
    DATABASE_VERSION.to_string()
}

fn default_method() -> String {
    SCORING_METHOD.to_string()
}

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

fn serialize_timestamp<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognized registration date '{raw}'")))
}

/// Accepts plain dates, naive timestamps, and RFC 3339.
pub(crate) fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, TIMESTAMP_FORMAT) {
        return Some(dt);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
