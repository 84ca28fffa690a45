use serde::{Deserialize, Serialize};

use super::domain::{CandidateId, CandidateRecord};
use crate::scoring::{finalize_score, RoleCatalog, RoleDefinition, ScoreBand, ScoreSet};

pub const DEFAULT_MIN_SCORE: f64 = 50.0;
pub const DEFAULT_RESULT_LIMIT: usize = 10;
pub const TOP_CANDIDATES_PER_ROLE: usize = 5;

/// Role search parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchQuery {
    pub role: String,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

impl SearchQuery {
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            min_score: DEFAULT_MIN_SCORE,
            limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

fn default_min_score() -> f64 {
    DEFAULT_MIN_SCORE
}

fn default_limit() -> usize {
    DEFAULT_RESULT_LIMIT
}

/// Search hit with the data a recruiter needs to follow up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub candidate_id: CandidateId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub score: f64,
    pub band: ScoreBand,
    pub other_scores: ScoreSet,
    pub unique_trait: String,
}

impl RankedCandidate {
    fn from_record(record: &CandidateRecord, role: &str, score: f64) -> Self {
        let other_scores = record
            .scores
            .iter()
            .filter(|(name, _)| *name != role)
            .map(|(name, score)| (name.to_string(), score))
            .collect();

        Self {
            candidate_id: record.id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            address: record.address.clone(),
            score,
            band: ScoreBand::of(score),
            other_scores,
            unique_trait: record.responses.unique_trait.clone(),
        }
    }
}

/// Candidates scoring at least `min_score` for `role`, best first.
///
/// Ties keep store order.
pub fn rank_candidates(
    candidates: &[CandidateRecord],
    role: &RoleDefinition,
    min_score: f64,
    limit: usize,
) -> Vec<RankedCandidate> {
    let mut hits: Vec<(&CandidateRecord, f64)> = candidates
        .iter()
        .map(|record| (record, record.score_for(&role.name)))
        .filter(|(_, score)| *score >= min_score)
        .collect();

    hits.sort_by(|a, b| b.1.total_cmp(&a.1));

    hits.into_iter()
        .take(limit)
        .map(|(record, score)| RankedCandidate::from_record(record, &role.name, score))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopCandidate {
    pub candidate_id: CandidateId,
    pub name: String,
    pub score: f64,
}

/// Aggregate view of one role across the stored candidates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleStatistics {
    pub role: String,
    pub candidates: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    pub top: Vec<TopCandidate>,
}

/// Mean, max, min and leaders per role, in catalog order.
pub fn role_statistics(
    candidates: &[CandidateRecord],
    catalog: &RoleCatalog,
    top: usize,
) -> Vec<RoleStatistics> {
    catalog
        .iter()
        .map(|role| {
            let scores: Vec<f64> = candidates
                .iter()
                .map(|record| record.score_for(&role.name))
                .collect();

            let (mean, max, min) = if scores.is_empty() {
                (None, None, None)
            } else {
                let total: f64 = scores.iter().sum();
                (
                    Some(finalize_score(total / scores.len() as f64)),
                    scores.iter().copied().reduce(f64::max),
                    scores.iter().copied().reduce(f64::min),
                )
            };

            let leaders = rank_candidates(candidates, role, f64::NEG_INFINITY, top)
                .into_iter()
                .map(|hit| TopCandidate {
                    candidate_id: hit.candidate_id,
                    name: hit.name,
                    score: hit.score,
                })
                .collect();

            RoleStatistics {
                role: role.name.clone(),
                candidates: scores.len(),
                mean,
                max,
                min,
                top: leaders,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(id: &str, scores: &[(&str, f64)]) -> CandidateRecord {
        CandidateRecord {
            id: CandidateId(id.to_string()),
            name: format!("Candidato {id}"),
            email: format!("{id}@example.com"),
            phone: "55 1111 2222".to_string(),
            address: "Calle 5, León".to_string(),
            responses: Default::default(),
            scores: scores
                .iter()
                .map(|(name, score)| (name.to_string(), *score))
                .collect(),
            registered_at: NaiveDate::from_ymd_opt(2025, 1, 1)
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .expect("valid"),
            sealed_contact: None,
        }
    }

    const SALES: &str = "Atención a Clientes/Ventas";
    const KITCHEN: &str = "Ayudante en cocina";

    fn sample() -> Vec<CandidateRecord> {
        vec![
            record("a", &[(SALES, 55.0), (KITCHEN, 80.0)]),
            record("b", &[(SALES, 72.5), (KITCHEN, 30.0)]),
            record("c", &[(SALES, 55.0)]),
            record("d", &[(SALES, 20.0), (KITCHEN, 90.0)]),
        ]
    }

    #[test]
    fn ranks_by_score_and_applies_threshold() {
        let catalog = RoleCatalog::standard();
        let role = catalog.find(SALES).expect("role");

        let hits = rank_candidates(&sample(), role, 50.0, 10);
        let ids: Vec<&str> = hits.iter().map(|hit| hit.candidate_id.0.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(hits[0].band, ScoreBand::High);
        assert_eq!(hits[1].band, ScoreBand::Medium);
        assert_eq!(hits[1].other_scores.get(KITCHEN), Some(80.0));
        assert_eq!(hits[1].other_scores.get(SALES), None);
    }

    #[test]
    fn missing_scores_read_as_zero_and_limit_truncates() {
        let catalog = RoleCatalog::standard();
        let role = catalog.find(KITCHEN).expect("role");

        let all = rank_candidates(&sample(), role, 0.0, 10);
        assert_eq!(all.len(), 4);
        assert_eq!(all.last().map(|hit| hit.score), Some(0.0));

        let top = rank_candidates(&sample(), role, 0.0, 2);
        let ids: Vec<&str> = top.iter().map(|hit| hit.candidate_id.0.as_str()).collect();
        assert_eq!(ids, vec!["d", "a"]);
    }

    #[test]
    fn statistics_cover_every_role() {
        let catalog = RoleCatalog::standard();
        let stats = role_statistics(&sample(), &catalog, 2);

        assert_eq!(stats.len(), catalog.len());
        let sales = &stats[0];
        assert_eq!(sales.role, SALES);
        assert_eq!(sales.candidates, 4);
        assert_eq!(sales.mean, Some(50.63));
        assert_eq!(sales.max, Some(72.5));
        assert_eq!(sales.min, Some(20.0));
        assert_eq!(sales.top.len(), 2);
        assert_eq!(sales.top[0].candidate_id.0, "b");
    }

    #[test]
    fn statistics_for_empty_store_have_no_aggregates() {
        let catalog = RoleCatalog::standard();
        let stats = role_statistics(&[], &catalog, TOP_CANDIDATES_PER_ROLE);
        assert!(stats.iter().all(|entry| entry.mean.is_none() && entry.top.is_empty()));
    }
}
