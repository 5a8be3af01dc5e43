// src/utils/seed.rs

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::models::{
    answer::{Answer, MAX_LEVEL},
    subject::Subject,
};

/// Fixed seed so every seeding run produces the same mock answers.
pub const MOCK_SEED: u64 = 123;

/// Mock answers generated for each mock subject.
pub const STUDENTS_PER_SUBJECT: usize = 5;

pub fn mock_subjects() -> Vec<Subject> {
    vec![
        Subject {
            subject: "TESTE".to_string(),
            topics: vec![
                "Funções".to_string(),
                "Módulos".to_string(),
                "Decoradores".to_string(),
            ],
        },
        Subject {
            subject: "TESTE2".to_string(),
            topics: vec!["BLA1".to_string(), "BLA2".to_string()],
        },
    ]
}

/// Generates mock answers for `subjects`, subject by subject, from one RNG.
pub fn mock_answers(subjects: &[Subject]) -> Vec<Answer> {
    let mut rng = StdRng::seed_from_u64(MOCK_SEED);
    let mut answers = Vec::with_capacity(subjects.len() * STUDENTS_PER_SUBJECT);

    for subject in subjects {
        for _ in 0..STUDENTS_PER_SUBJECT {
            let answers_for_topics = subject
                .topics
                .iter()
                .map(|topic| (topic.clone(), rng.random_range(0..=MAX_LEVEL)))
                .collect();

            answers.push(Answer {
                subject: subject.subject.clone(),
                answers_for_topics,
            });
        }
    }

    answers
}
