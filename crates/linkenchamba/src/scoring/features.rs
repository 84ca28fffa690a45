//! Questionnaire to feature-vector encoding.
//!
//! Slot semantics are positional: the transform parameters are laid out against this
//! exact ordering, so the keyword tables below are part of the scoring contract.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::questionnaire::{QuestionnaireResponse, LEVEL_TOPICS};

pub const PRACTICAL_SKILL_KEYWORDS: [&str; 10] = [
    "Atender clientes",
    "Manejar caja",
    "Organizar archivos",
    "Usar computadora",
    "Empacar productos",
    "Limpiar y mantener",
    "Ayudar en preparación",
    "Tomar mensajes",
    "Resolver quejas",
    "Ayudar a compañeros",
];

pub const TOOL_KEYWORDS: [&str; 7] = [
    "Computadora",
    "Teléfono",
    "Caja registradora",
    "Herramientas básicas",
    "Equipo de cocina",
    "Vehículo",
    "aprendo rápido",
];

pub const ENVIRONMENT_KEYWORDS: [&str; 5] = [
    "movimiento",
    "tranquilo",
    "interactuar",
    "concentrado",
    "adapto",
];

pub const ACTIVITY_KEYWORDS: [&str; 5] = [
    "Ayudar directamente",
    "Crear o arreglar",
    "Organizar",
    "Aprender cosas nuevas",
    "Resolver problemas",
];

pub const KNOWLEDGE_KEYWORDS: [&str; 6] = [
    "Matemáticas",
    "Lectura rápida",
    "Escritura clara",
    "Conceptos básicos de ventas",
    "Conocimiento de productos",
    "aprendo viendo",
];

pub const ACHIEVEMENT_KEYWORDS: [&str; 5] = [
    "Aprender un oficio",
    "Ingreso estable",
    "Ganar experiencia",
    "Desarrollarme dentro",
    "Descubrir en qué soy bueno",
];

pub const REACTION_KEYWORDS: [&str; 5] = ["pregunto", "busco", "organizo", "actúo", "mantengo"];

pub const STANDS_OUT_KEYWORDS: [&str; 6] = [
    "ayudar a otros",
    "encontrar errores",
    "aprender algo nuevo",
    "mantener el orden",
    "motivar al equipo",
    "necesito oportunidad",
];

pub const FULL_TIME_MARKER: &str = "tiempo completo";

/// Motivation tiers, checked in order; the first contained keyword wins.
pub const MOTIVATION_TIERS: [(&str, f64); 3] =
    [("todas", 1.0), ("aprender", 0.8), ("estabilidad", 0.6)];

const WORK_TYPE_DEFAULT: f64 = 0.5;
const MOTIVATION_UNMATCHED: f64 = 0.4;
const MOTIVATION_DEFAULT: f64 = 0.5;

/// Contiguous run of slots fed by one questionnaire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureGroup {
    PracticalSkills,
    Tools,
    Environment,
    Activities,
    KnowledgeAreas,
    Levels,
    WorkType,
    Achievements,
    Reaction,
    StandsOut,
    Motivation,
}

impl FeatureGroup {
    pub const ORDER: [FeatureGroup; 11] = [
        FeatureGroup::PracticalSkills,
        FeatureGroup::Tools,
        FeatureGroup::Environment,
        FeatureGroup::Activities,
        FeatureGroup::KnowledgeAreas,
        FeatureGroup::Levels,
        FeatureGroup::WorkType,
        FeatureGroup::Achievements,
        FeatureGroup::Reaction,
        FeatureGroup::StandsOut,
        FeatureGroup::Motivation,
    ];

    pub const fn width(self) -> usize {
        match self {
            FeatureGroup::PracticalSkills => PRACTICAL_SKILL_KEYWORDS.len(),
            FeatureGroup::Tools => TOOL_KEYWORDS.len(),
            FeatureGroup::Environment => ENVIRONMENT_KEYWORDS.len(),
            FeatureGroup::Activities => ACTIVITY_KEYWORDS.len(),
            FeatureGroup::KnowledgeAreas => KNOWLEDGE_KEYWORDS.len(),
            FeatureGroup::Levels => LEVEL_TOPICS.len(),
            FeatureGroup::WorkType => 1,
            FeatureGroup::Achievements => ACHIEVEMENT_KEYWORDS.len(),
            FeatureGroup::Reaction => REACTION_KEYWORDS.len(),
            FeatureGroup::StandsOut => STANDS_OUT_KEYWORDS.len(),
            FeatureGroup::Motivation => 1,
        }
    }

    /// Zero-based index of the group's first slot.
    pub fn offset(self) -> usize {
        Self::ORDER
            .iter()
            .take_while(|group| **group != self)
            .map(|group| group.width())
            .sum()
    }
}

const fn total_width() -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < FeatureGroup::ORDER.len() {
        total += FeatureGroup::ORDER[i].width();
        i += 1;
    }
    total
}

/// Number of slots in every feature vector.
pub const FEATURE_COUNT: usize = 55;

const _: () = assert!(total_width() == FEATURE_COUNT);

/// True when `text` contains `keyword`, ignoring case.
pub fn text_contains(text: &str, keyword: &str) -> bool {
    text.to_lowercase().contains(&keyword.to_lowercase())
}

/// True when any selected option contains `keyword`, ignoring case.
pub fn contains_keyword<S: AsRef<str>>(selections: &[S], keyword: &str) -> bool {
    selections
        .iter()
        .any(|selection| text_contains(selection.as_ref(), keyword))
}

/// How raw vectors of the wrong length are treated at the scoring boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthPolicy {
    /// Reject anything that is not exactly [`FEATURE_COUNT`] slots.
    #[default]
    Strict,
    /// Legacy compatibility: truncate extra slots, zero-pad missing ones.
    Repair,
}

impl FromStr for LengthPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "repair" | "legacy" => Ok(Self::Repair),
            other => Err(format!("unknown length policy '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("feature vector has {actual} slots, expected {expected}")]
pub struct FeatureLengthError {
    pub expected: usize,
    pub actual: usize,
}

/// Fixed-length encoding of one questionnaire response.
#[derive(Clone, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Build a vector from externally supplied slots.
    pub fn from_slots(
        mut values: Vec<f64>,
        policy: LengthPolicy,
    ) -> Result<Self, FeatureLengthError> {
        if values.len() != FEATURE_COUNT {
            let error = FeatureLengthError {
                expected: FEATURE_COUNT,
                actual: values.len(),
            };
            match policy {
                LengthPolicy::Strict => return Err(error),
                LengthPolicy::Repair => {
                    warn!(actual = error.actual, expected = error.expected, "repairing feature vector length");
                    values.resize(FEATURE_COUNT, 0.0);
                }
            }
        }

        let mut slots = [0.0; FEATURE_COUNT];
        slots.copy_from_slice(&values);
        Ok(Self(slots))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Slots belonging to one group.
    pub fn group(&self, group: FeatureGroup) -> &[f64] {
        let start = group.offset();
        &self.0[start..start + group.width()]
    }
}

impl fmt::Debug for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

struct SlotWriter {
    slots: [f64; FEATURE_COUNT],
    cursor: usize,
}

impl SlotWriter {
    fn new() -> Self {
        Self {
            slots: [0.0; FEATURE_COUNT],
            cursor: 0,
        }
    }

    fn push(&mut self, value: f64) {
        self.slots[self.cursor] = value;
        self.cursor += 1;
    }

    fn flag(&mut self, present: bool) {
        self.push(if present { 1.0 } else { 0.0 });
    }

    fn selections(&mut self, selections: &[String], keywords: &[&str]) {
        for keyword in keywords {
            self.flag(contains_keyword(selections, keyword));
        }
    }

    fn choice(&mut self, answer: &str, keywords: &[&str]) {
        for keyword in keywords {
            self.flag(text_contains(answer, keyword));
        }
    }

    fn finish(self) -> FeatureVector {
        debug_assert_eq!(self.cursor, FEATURE_COUNT);
        FeatureVector(self.slots)
    }
}

fn work_type_slot(work_type: &str) -> f64 {
    if text_contains(work_type, FULL_TIME_MARKER) {
        1.0
    } else {
        WORK_TYPE_DEFAULT
    }
}

fn motivation_slot(motivation: &str) -> f64 {
    if motivation.is_empty() {
        return MOTIVATION_DEFAULT;
    }

    MOTIVATION_TIERS
        .iter()
        .find(|(keyword, _)| text_contains(motivation, keyword))
        .map(|(_, value)| *value)
        .unwrap_or(MOTIVATION_UNMATCHED)
}

/// Encode a response into its 55-slot feature vector.
pub fn encode(response: &QuestionnaireResponse) -> FeatureVector {
    let mut slots = SlotWriter::new();

    slots.selections(&response.practical_skills, &PRACTICAL_SKILL_KEYWORDS);
    slots.selections(&response.tools, &TOOL_KEYWORDS);
    slots.choice(&response.environment, &ENVIRONMENT_KEYWORDS);
    slots.selections(&response.activities, &ACTIVITY_KEYWORDS);
    slots.selections(&response.knowledge_areas, &KNOWLEDGE_KEYWORDS);
    for topic in LEVEL_TOPICS {
        slots.push(f64::from(response.level(topic).ordinal()) / 3.0);
    }
    slots.push(work_type_slot(&response.work_type));
    slots.selections(&response.achievements, &ACHIEVEMENT_KEYWORDS);
    slots.choice(&response.reaction, &REACTION_KEYWORDS);
    slots.selections(&response.stands_out, &STANDS_OUT_KEYWORDS);
    slots.push(motivation_slot(&response.motivation));

    slots.finish()
}
