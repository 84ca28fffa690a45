use std::collections::BTreeMap;

use chrono::NaiveDate;
use linkenchamba::candidates::CandidateGenerator;
use linkenchamba::scoring::questionnaire::{
    ACHIEVEMENT_OPTIONS, ACTIVITY_OPTIONS, KNOWLEDGE_OPTIONS, PRACTICAL_SKILL_OPTIONS,
    STANDS_OUT_OPTIONS, TOOL_OPTIONS,
};
use linkenchamba::scoring::{
    encode, finalize_score, FeatureGroup, ProficiencyLevel, QuestionnaireResponse, RoleCatalog,
    ScoreSet, Scorer, FEATURE_COUNT, ROLE_COUNT,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const VENTAS: &str = "Atención a Clientes/Ventas";
const ADMINISTRATIVO: &str = "Asistente Administrativo";

fn owned(options: &[&str]) -> Vec<String> {
    options.iter().map(|option| option.to_string()).collect()
}

fn sampled_responses(count: usize) -> Vec<QuestionnaireResponse> {
    let generator = CandidateGenerator::new(
        Scorer::standard(),
        NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date"),
    );
    let mut rng = StdRng::seed_from_u64(2024);
    (0..count).map(|_| generator.responses(&mut rng)).collect()
}

fn adversarial_responses() -> Vec<QuestionnaireResponse> {
    let skills = owned(&PRACTICAL_SKILL_OPTIONS);
    let everything = QuestionnaireResponse {
        practical_skills: [skills.clone(), skills.clone(), skills].concat(),
        tools: owned(&TOOL_OPTIONS),
        environment: "Disfruto interactuar, me adapto, estoy tranquilo y concentrado en movimiento"
            .to_string(),
        activities: owned(&ACTIVITY_OPTIONS),
        knowledge_areas: owned(&KNOWLEDGE_OPTIONS),
        work_type: "TIEMPO COMPLETO".to_string(),
        achievements: owned(&ACHIEVEMENT_OPTIONS),
        reaction: "Pregunto, busco, organizo, actúo y mantengo la calma".to_string(),
        stands_out: owned(&STANDS_OUT_OPTIONS),
        motivation: "Todas las anteriores".to_string(),
        ..QuestionnaireResponse::default()
    };
    let junk = QuestionnaireResponse {
        practical_skills: vec!["x".repeat(5_000), String::new(), "🙂".to_string()],
        tools: vec!["\u{0}".to_string()],
        environment: "ninguno".repeat(200),
        motivation: "???".to_string(),
        unique_trait: "ñ".repeat(300),
        ..QuestionnaireResponse::default()
    };
    vec![QuestionnaireResponse::default(), everything, junk]
}

#[test]
fn identical_responses_score_identically() {
    let first = Scorer::standard();
    let second = Scorer::from_seed(42);

    for response in sampled_responses(40) {
        assert_eq!(first.score_all(&response), second.score_all(&response));
        assert_eq!(first.score_all(&response), first.score_all(&response.clone()));
    }
}

#[test]
fn every_response_encodes_to_the_full_slot_count() {
    for response in sampled_responses(60).iter().chain(&adversarial_responses()) {
        let features = encode(response);
        assert_eq!(features.as_slice().len(), FEATURE_COUNT);
        assert!(features
            .as_slice()
            .iter()
            .all(|value| (0.0..=1.0).contains(value)));
    }
}

#[test]
fn scores_stay_within_percentage_range() {
    let scorer = Scorer::standard();
    for response in sampled_responses(200).iter().chain(&adversarial_responses()) {
        let scores = scorer.score_all(response);
        assert_eq!(scores.len(), ROLE_COUNT);
        for (role, score) in scores.iter() {
            assert!((0.0..=100.0).contains(&score), "{role} scored {score}");
            assert_eq!(score, finalize_score(score));
        }
    }
}

#[test]
fn every_catalog_role_is_scored_in_order() {
    let scores = Scorer::standard().score_all(&sampled_responses(1)[0]);
    let scored: Vec<&str> = scores.iter().map(|(role, _)| role).collect();

    assert_eq!(
        scored,
        vec![
            VENTAS,
            ADMINISTRATIVO,
            "Operario de Producción",
            "Ayudante General",
            "Ayudante en cocina",
        ]
    );
    assert_eq!(RoleCatalog::standard().names(), scored);
}

#[test]
fn empty_response_scores_the_bare_transform() {
    let scorer = Scorer::standard();
    let response = QuestionnaireResponse::default();
    let features = encode(&response);

    for (index, value) in features.as_slice().iter().enumerate() {
        let expected = if index == FeatureGroup::WorkType.offset()
            || index == FeatureGroup::Motivation.offset()
        {
            0.5
        } else {
            0.0
        };
        assert_eq!(*value, expected, "slot {index}");
    }

    let raw = scorer.raw_scores(&response);
    for role in scorer.catalog().iter() {
        assert_eq!(role.adjustment(&[], ""), 0.0);
        assert_eq!(
            scorer.score(&response, role),
            finalize_score(raw.get(role.id()))
        );
    }
}

#[test]
fn another_matching_skill_never_lowers_the_role_score() {
    let scorer = Scorer::standard();
    let role = scorer.catalog().find(VENTAS).expect("role exists");

    let before = QuestionnaireResponse {
        practical_skills: vec!["Atender clientes en mostrador o por teléfono".to_string()],
        environment: "Prefiero trabajo tranquilo y organizado".to_string(),
        ..QuestionnaireResponse::default()
    };
    let mut after = before.clone();
    after
        .practical_skills
        .push("Atender clientes en fin de semana".to_string());

    assert_eq!(encode(&before), encode(&after));
    let (low, high) = (scorer.score(&before, role), scorer.score(&after, role));
    assert!(high >= low);
    if low <= 97.0 {
        assert!((high - low - 3.0).abs() < 0.011, "{low} -> {high}");
    }
}

#[test]
fn skill_keywords_match_regardless_of_case() {
    let upper = QuestionnaireResponse {
        practical_skills: vec!["ATENDER CLIENTES EN MOSTRADOR".to_string()],
        ..QuestionnaireResponse::default()
    };
    let lower = QuestionnaireResponse {
        practical_skills: vec!["atender clientes en mostrador".to_string()],
        ..QuestionnaireResponse::default()
    };

    assert_eq!(encode(&upper).as_slice()[0], 1.0);
    assert_eq!(encode(&upper), encode(&lower));
    assert_eq!(
        Scorer::standard().score_all(&upper),
        Scorer::standard().score_all(&lower)
    );
}

#[test]
fn customer_facing_answers_favour_sales_over_office_work() {
    let response = QuestionnaireResponse {
        practical_skills: owned(&[
            "Atender clientes en mostrador o por teléfono",
            "Manejar caja registradora y dar cambio",
        ]),
        environment: "Disfruto interactuar con mucha gente".to_string(),
        ..QuestionnaireResponse::default()
    };

    let scores = Scorer::standard().score_all(&response);
    let ventas = scores.get(VENTAS).expect("scored");
    let administrativo = scores.get(ADMINISTRATIVO).expect("scored");
    assert!(ventas > administrativo, "{ventas} vs {administrativo}");
}

#[test]
fn different_seeds_give_different_parameters() {
    let response = sampled_responses(1).remove(0);
    let default = Scorer::standard().raw_scores(&response);
    let other = Scorer::from_seed(7).raw_scores(&response);
    assert_ne!(default.as_slice(), other.as_slice());
}

fn assert_scores(scores: &ScoreSet, expected: [f64; ROLE_COUNT]) {
    let actual: Vec<f64> = scores.iter().map(|(_, score)| score).collect();
    assert_eq!(actual, expected.to_vec());
}

#[test]
fn seed_42_scores_match_reference_values() {
    let scorer = Scorer::standard();

    let empty = QuestionnaireResponse::default();
    assert_scores(
        &scorer.score_all(&empty),
        [51.69, 46.03, 53.68, 54.36, 42.73],
    );

    let sales = QuestionnaireResponse {
        practical_skills: owned(&[
            "Atender clientes en mostrador o por teléfono",
            "Manejar caja registradora y dar cambio",
        ]),
        environment: "Disfruto interactuar con mucha gente".to_string(),
        ..QuestionnaireResponse::default()
    };
    assert_scores(
        &scorer.score_all(&sales),
        [62.68, 46.03, 53.71, 54.38, 42.81],
    );

    let mut levels = BTreeMap::new();
    levels.insert("Organización".to_string(), ProficiencyLevel::Advanced);
    levels.insert("Productividad".to_string(), ProficiencyLevel::Intermediate);
    let office = QuestionnaireResponse {
        practical_skills: owned(&[
            "Organizar archivos y documentos",
            "Usar computadora para tareas básicas",
        ]),
        tools: owned(&["Computadora (Word, Excel básico)"]),
        environment: "Prefiero trabajo tranquilo y organizado".to_string(),
        levels,
        work_type: "Trabajo de tiempo completo (8 horas)".to_string(),
        motivation: "Quiero aprender cosas nuevas".to_string(),
        ..QuestionnaireResponse::default()
    };
    let raw = scorer.raw_scores(&office);
    let expected_raw = [
        51.726_165_155_112_17,
        46.070_527_398_624_09,
        53.643_775_664_903,
        54.323_448_784_569_06,
        42.661_094_327_285_944,
    ];
    for (actual, expected) in raw.as_slice().iter().zip(expected_raw) {
        assert!((actual - expected).abs() < 1e-9, "{actual} vs {expected}");
    }
    assert_scores(
        &scorer.score_all(&office),
        [51.73, 57.07, 53.64, 57.32, 42.66],
    );
}
