//! Synthetic candidate generation for seeding a demo database.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, NaiveTime};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use super::domain::{CandidateDatabase, CandidateId, CandidateRecord};
use crate::scoring::questionnaire::{
    ACHIEVEMENT_OPTIONS, ACTIVITY_OPTIONS, ENVIRONMENT_OPTIONS, KNOWLEDGE_OPTIONS, LEVEL_TOPICS,
    MOTIVATION_OPTIONS, PRACTICAL_SKILL_OPTIONS, REACTION_OPTIONS, STANDS_OUT_OPTIONS,
    TOOL_OPTIONS, WORK_TYPE_OPTIONS,
};
use crate::scoring::{ProficiencyLevel, QuestionnaireResponse, Scorer};

pub const DEFAULT_CANDIDATE_COUNT: usize = 500;
const PROGRESS_INTERVAL: usize = 50;
const REGISTRATION_WINDOW_DAYS: u64 = 365;

const FIRST_NAMES: &[&str] = &[
    "María", "José", "Guadalupe", "Juan", "Ana", "Luis", "Sofía", "Carlos", "Fernanda",
    "Miguel", "Valeria", "Jorge", "Ximena", "Ricardo", "Daniela", "Alejandro", "Camila",
    "Francisco", "Mariana", "Eduardo", "Lucía", "Roberto", "Paola", "Héctor",
];

const SURNAMES: &[&str] = &[
    "Hernández", "García", "Martínez", "López", "González", "Pérez", "Rodríguez", "Sánchez",
    "Ramírez", "Cruz", "Flores", "Gómez", "Morales", "Vázquez", "Jiménez", "Reyes", "Díaz",
    "Torres", "Gutiérrez", "Ruiz", "Mendoza", "Aguilar", "Ortiz", "Castillo",
];

const STREETS: &[&str] = &[
    "Av. Reforma", "Calle Hidalgo", "Calle Morelos", "Av. Juárez", "Calle Allende",
    "Calzada de Tlalpan", "Calle Zaragoza", "Av. Insurgentes", "Calle Independencia",
    "Privada Guerrero",
];

const CITIES: &[(&str, &str)] = &[
    ("Ciudad de México", "CDMX"),
    ("Guadalajara", "Jal."),
    ("Monterrey", "N.L."),
    ("Puebla", "Pue."),
    ("León", "Gto."),
    ("Querétaro", "Qro."),
    ("Mérida", "Yuc."),
    ("Oaxaca", "Oax."),
    ("Toluca", "Edo. Méx."),
];

const EMAIL_DOMAINS: &[&str] = &["gmail.com", "hotmail.com", "outlook.com", "yahoo.com.mx"];

const TRAIT_OPENERS: &[&str] = &[
    "Soy una persona puntual y responsable",
    "Me gusta aprender de mis compañeros",
    "Tengo mucha paciencia con los clientes",
    "Siempre termino lo que empiezo",
    "Me considero alguien muy ordenado",
    "Disfruto resolver problemas bajo presión",
];

const TRAIT_CLOSERS: &[&str] = &[
    "y busco un lugar donde crecer.",
    "y me adapto rápido a nuevos equipos.",
    "y cuido cada detalle de mi trabajo.",
    "y mantengo buena actitud todo el día.",
    "y quiero seguir capacitándome.",
];

/// Builds scored synthetic candidates with the same scorer used for registrations.
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    scorer: Scorer,
    reference_date: NaiveDate,
}

impl CandidateGenerator {
    pub fn new(scorer: Scorer, reference_date: NaiveDate) -> Self {
        Self {
            scorer,
            reference_date,
        }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Random questionnaire answers drawn from the offered options.
    pub fn responses<R: Rng + ?Sized>(&self, rng: &mut R) -> QuestionnaireResponse {
        let levels: BTreeMap<String, ProficiencyLevel> = LEVEL_TOPICS
            .iter()
            .map(|topic| (topic.to_string(), *pick(rng, &ProficiencyLevel::ALL)))
            .collect();

        QuestionnaireResponse {
            practical_skills: sample(rng, &PRACTICAL_SKILL_OPTIONS, 3, 5),
            tools: sample(rng, &TOOL_OPTIONS, 2, 4),
            environment: pick(rng, &ENVIRONMENT_OPTIONS).to_string(),
            activities: sample(rng, &ACTIVITY_OPTIONS, 1, 3),
            knowledge_areas: sample(rng, &KNOWLEDGE_OPTIONS, 2, 4),
            levels,
            work_type: pick(rng, &WORK_TYPE_OPTIONS).to_string(),
            achievements: sample(rng, &ACHIEVEMENT_OPTIONS, 1, 3),
            reaction: pick(rng, &REACTION_OPTIONS).to_string(),
            stands_out: sample(rng, &STANDS_OUT_OPTIONS, 1, 3),
            motivation: pick(rng, &MOTIVATION_OPTIONS).to_string(),
            unique_trait: format!("{} {}", pick(rng, TRAIT_OPENERS), pick(rng, TRAIT_CLOSERS)),
        }
    }

    pub fn candidate<R: Rng + ?Sized>(&self, rng: &mut R) -> CandidateRecord {
        let responses = self.responses(rng);
        let scores = self.scorer.score_all(&responses);

        let first = pick(rng, FIRST_NAMES);
        let surname = pick(rng, SURNAMES);
        let second_surname = pick(rng, SURNAMES);
        let email = format!(
            "{}.{}{}@{}",
            ascii_fold(first),
            ascii_fold(surname),
            rng.gen_range(1..100),
            pick(rng, EMAIL_DOMAINS)
        );
        let phone = format!(
            "55 {:04} {:04}",
            rng.gen_range(0..10_000),
            rng.gen_range(0..10_000)
        );
        let (city, state) = pick(rng, CITIES);
        let address = format!(
            "{} {}, Col. Centro, {}, {}",
            pick(rng, STREETS),
            rng.gen_range(1..=999),
            city,
            state
        );

        let id = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
        let days_back = rng.gen_range(0..=REGISTRATION_WINDOW_DAYS);
        let registered_on = self
            .reference_date
            .checked_sub_days(Days::new(days_back))
            .unwrap_or(self.reference_date);

        CandidateRecord {
            id: CandidateId(id.to_string()),
            name: format!("{first} {surname} {second_surname}"),
            email,
            phone,
            address,
            responses,
            scores,
            registered_at: registered_on.and_time(NaiveTime::MIN),
            sealed_contact: None,
        }
    }

    /// A full database of `count` synthetic candidates.
    pub fn generate<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> CandidateDatabase {
        let mut candidates = Vec::with_capacity(count);
        for generated in 1..=count {
            candidates.push(self.candidate(rng));
            if generated % PROGRESS_INTERVAL == 0 {
                info!(generated, total = count, "generating candidates");
            }
        }

        CandidateDatabase::new(self.scorer.catalog(), candidates)
    }
}

fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

fn sample<R: Rng + ?Sized>(rng: &mut R, options: &[&str], min: usize, max: usize) -> Vec<String> {
    let amount = rng.gen_range(min..=max);
    options
        .choose_multiple(rng, amount)
        .map(|option| option.to_string())
        .collect()
}

fn ascii_fold(text: &str) -> String {
    deunicode::deunicode(text)
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(char::is_ascii_alphanumeric)
        .collect()
}
