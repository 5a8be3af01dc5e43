// src/models/answer.rs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Highest familiarity level a student can report. The lowest is 0.
pub const MAX_LEVEL: u8 = 5;

/// One student's ratings, keyed by topic name in form order.
pub type TopicAnswers = IndexMap<String, u8>;

/// Represents a document of the 'answers' collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Name of the subject the ratings belong to. Not checked against 'subjects'.
    pub subject: String,

    pub answers_for_topics: TopicAnswers,
}

/// DTO for submitting an answer through the JSON API.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAnswerRequest {
    #[validate(length(min = 1, max = 200))]
    pub subject: String,
    #[validate(custom(function = validate_levels))]
    pub answers_for_topics: IndexMap<String, i64>,
}

impl SubmitAnswerRequest {
    /// Converts a validated request into the stored document.
    pub fn into_answer(self) -> Answer {
        let answers_for_topics = self
            .answers_for_topics
            .into_iter()
            .map(|(topic, level)| (topic, level.clamp(0, i64::from(MAX_LEVEL)) as u8))
            .collect();

        Answer {
            subject: self.subject,
            answers_for_topics,
        }
    }
}

/// Ensures every level stays within the slider bounds.
fn validate_levels(levels: &IndexMap<String, i64>) -> Result<(), validator::ValidationError> {
    if levels.is_empty() {
        return Err(validator::ValidationError::new("answers_cannot_be_empty"));
    }
    for level in levels.values() {
        if !(0..=i64::from(MAX_LEVEL)).contains(level) {
            return Err(validator::ValidationError::new("level_out_of_range"));
        }
    }
    Ok(())
}

/// Parses a raw slider value, rejecting anything outside 0..=5.
pub fn parse_level(raw: &str) -> Option<u8> {
    raw.trim().parse::<u8>().ok().filter(|level| *level <= MAX_LEVEL)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(levels: &[(&str, i64)]) -> SubmitAnswerRequest {
        SubmitAnswerRequest {
            subject: "TESTE".to_string(),
            answers_for_topics: levels.iter().map(|(t, l)| (t.to_string(), *l)).collect(),
        }
    }

    #[test]
    fn levels_within_bounds_validate() {
        let req = request(&[("Funções", 3), ("Módulos", 0), ("Decoradores", 5)]);
        assert!(req.validate().is_ok());

        let answer = req.into_answer();
        let keys: Vec<&str> = answer.answers_for_topics.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Funções", "Módulos", "Decoradores"]);
        assert_eq!(answer.answers_for_topics["Decoradores"], 5);
    }

    #[test]
    fn out_of_range_levels_fail() {
        assert!(request(&[("Funções", 6)]).validate().is_err());
        assert!(request(&[("Funções", -1)]).validate().is_err());
        assert!(request(&[]).validate().is_err());
    }

    #[test]
    fn empty_subject_fails() {
        let mut req = request(&[("Funções", 1)]);
        req.subject = String::new();
        assert!(req.validate().is_err());
    }

    #[test]
    fn slider_values_parse() {
        assert_eq!(parse_level("0"), Some(0));
        assert_eq!(parse_level(" 5 "), Some(5));
        assert_eq!(parse_level("6"), None);
        assert_eq!(parse_level("-1"), None);
        assert_eq!(parse_level("três"), None);
    }
}
