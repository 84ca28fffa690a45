//! Questionnaire scoring: feature encoding, the fixed layered transform, and the
//! role-specific keyword adjustment.
//!
//! A [`Scorer`] is a cheap handle over shared, read-only parameters. Every caller that
//! builds one from the same seed gets bit-identical scores for identical responses, so
//! bulk generation and interactive registration can never disagree.

pub mod features;
mod mt19937;
pub mod network;
pub mod questionnaire;
pub mod roles;

use std::fmt;
use std::sync::Arc;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub use features::{
    contains_keyword, encode, FeatureGroup, FeatureLengthError, FeatureVector, LengthPolicy,
    FEATURE_COUNT,
};
pub use mt19937::Mt19937;
pub use network::{RawScores, TransformParameters, DEFAULT_SEED};
pub use questionnaire::{ProficiencyLevel, QuestionnaireResponse};
pub use roles::{RoleCatalog, RoleDefinition, RoleId, ROLE_COUNT};

/// Clamp to `[0, 100]` and round to two decimals.
pub fn finalize_score(value: f64) -> f64 {
    (value.clamp(0.0, 100.0) * 100.0).round() / 100.0
}

/// Role name to final percentage, in catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSet {
    entries: Vec<(String, f64)>,
}

impl ScoreSet {
    pub fn get(&self, role: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == role)
            .map(|(_, score)| *score)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries
            .iter()
            .map(|(name, score)| (name.as_str(), *score))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, f64)> for ScoreSet {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for ScoreSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, score) in &self.entries {
            map.serialize_entry(name, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScoreSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoreSetVisitor;

        impl<'de> Visitor<'de> for ScoreSetVisitor {
            type Value = ScoreSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of role names to scores")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(ROLE_COUNT));
                while let Some((name, score)) = access.next_entry::<String, f64>()? {
                    entries.push((name, score));
                }
                Ok(ScoreSet { entries })
            }
        }

        deserializer.deserialize_map(ScoreSetVisitor)
    }
}

/// Scores questionnaire responses against the role catalog.
#[derive(Debug, Clone)]
pub struct Scorer {
    parameters: Arc<TransformParameters>,
    catalog: Arc<RoleCatalog>,
    length_policy: LengthPolicy,
}

impl Scorer {
    pub fn new(parameters: Arc<TransformParameters>, catalog: Arc<RoleCatalog>) -> Self {
        Self {
            parameters,
            catalog,
            length_policy: LengthPolicy::default(),
        }
    }

    /// Scorer over the process-wide default parameters and the standard catalog.
    pub fn standard() -> Self {
        Self::new(TransformParameters::shared(), RoleCatalog::shared())
    }

    /// Scorer for an arbitrary seed; the default seed reuses the shared parameters.
    pub fn from_seed(seed: u32) -> Self {
        let parameters = if seed == DEFAULT_SEED {
            TransformParameters::shared()
        } else {
            Arc::new(TransformParameters::from_seed(seed))
        };
        Self::new(parameters, RoleCatalog::shared())
    }

    pub fn with_length_policy(mut self, policy: LengthPolicy) -> Self {
        self.length_policy = policy;
        self
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    pub fn parameters(&self) -> &TransformParameters {
        &self.parameters
    }

    pub fn length_policy(&self) -> LengthPolicy {
        self.length_policy
    }

    pub fn raw_scores(&self, response: &QuestionnaireResponse) -> RawScores {
        self.parameters.transform(&encode(response))
    }

    /// Final percentage for a single role.
    pub fn score(&self, response: &QuestionnaireResponse, role: &RoleDefinition) -> f64 {
        let raw = self.raw_scores(response);
        Self::finalize(&raw, response, role)
    }

    /// Final percentages for every catalog role from one transform evaluation.
    pub fn score_all(&self, response: &QuestionnaireResponse) -> ScoreSet {
        let raw = self.raw_scores(response);
        self.catalog
            .iter()
            .map(|role| (role.name.clone(), Self::finalize(&raw, response, role)))
            .collect()
    }

    /// Transform-only scores for an externally supplied raw vector.
    ///
    /// No questionnaire is available, so no keyword adjustment is applied.
    pub fn score_feature_slots(&self, values: Vec<f64>) -> Result<ScoreSet, FeatureLengthError> {
        let features = FeatureVector::from_slots(values, self.length_policy)?;
        let raw = self.parameters.transform(&features);
        Ok(self
            .catalog
            .iter()
            .map(|role| (role.name.clone(), finalize_score(raw.get(role.id()))))
            .collect())
    }

    fn finalize(raw: &RawScores, response: &QuestionnaireResponse, role: &RoleDefinition) -> f64 {
        let adjustment = role.adjustment(&response.practical_skills, &response.environment);
        finalize_score(raw.get(role.id()) + adjustment)
    }
}

/// Display band used when presenting a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    High,
    Medium,
    Low,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score >= 70.0 {
            ScoreBand::High
        } else if score >= 40.0 {
            ScoreBand::Medium
        } else {
            ScoreBand::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ScoreBand::High => "high",
            ScoreBand::Medium => "medium",
            ScoreBand::Low => "low",
        }
    }
}
