use std::collections::HashSet;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::candidates::generator::CandidateGenerator;
use crate::scoring::questionnaire::{
    LEVEL_TOPICS, PRACTICAL_SKILL_OPTIONS, TOOL_OPTIONS, WORK_TYPE_OPTIONS,
};
use crate::scoring::Scorer;

fn generator() -> CandidateGenerator {
    CandidateGenerator::new(
        Scorer::standard(),
        NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date"),
    )
}

#[test]
fn same_seed_generates_same_database() {
    let first = generator().generate(20, &mut StdRng::seed_from_u64(7));
    let second = generator().generate(20, &mut StdRng::seed_from_u64(7));
    assert_eq!(first, second);

    let other = generator().generate(20, &mut StdRng::seed_from_u64(8));
    assert_ne!(first, other);
}

#[test]
fn generated_answers_respect_selection_ranges() {
    let mut rng = StdRng::seed_from_u64(11);
    let generator = generator();

    for _ in 0..100 {
        let responses = generator.responses(&mut rng);
        assert!((3..=5).contains(&responses.practical_skills.len()));
        assert!((2..=4).contains(&responses.tools.len()));
        assert!((1..=3).contains(&responses.activities.len()));
        assert!((2..=4).contains(&responses.knowledge_areas.len()));
        assert!((1..=3).contains(&responses.achievements.len()));
        assert!((1..=3).contains(&responses.stands_out.len()));
        assert_eq!(responses.levels.len(), LEVEL_TOPICS.len());

        let distinct: HashSet<&String> = responses.practical_skills.iter().collect();
        assert_eq!(distinct.len(), responses.practical_skills.len());
        assert!(responses
            .practical_skills
            .iter()
            .all(|skill| PRACTICAL_SKILL_OPTIONS.contains(&skill.as_str())));
        assert!(responses
            .tools
            .iter()
            .all(|tool| TOOL_OPTIONS.contains(&tool.as_str())));
        assert!(WORK_TYPE_OPTIONS.contains(&responses.work_type.as_str()));
        assert!(!responses.unique_trait.is_empty());
    }
}

#[test]
fn generated_candidates_are_scored_and_dated() {
    let generator = generator();
    let database = generator.generate(60, &mut StdRng::seed_from_u64(3));

    assert_eq!(database.total_candidates, 60);
    assert_eq!(database.available_roles, generator.scorer().catalog().names());

    let earliest = NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date");
    let latest = NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid date");
    let mut ids = HashSet::new();

    for record in &database.candidates {
        assert_eq!(record.scores, generator.scorer().score_all(&record.responses));
        assert!(record.scores.iter().all(|(_, score)| (0.0..=100.0).contains(&score)));

        let date = record.registered_at.date();
        assert!(date >= earliest && date <= latest, "date {date} out of window");

        assert!(uuid::Uuid::parse_str(&record.id.0).is_ok());
        assert!(ids.insert(record.id.clone()), "duplicate id {}", record.id);
        assert!(record.email.is_ascii());
        assert!(record.email.contains('@'));
    }
}
