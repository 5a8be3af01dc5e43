// src/models/subject.rs

use serde::{Deserialize, Serialize};

/// Represents a document of the 'subjects' collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Subject name. Acts as the key answers refer to, but nothing enforces it.
    pub subject: String,

    /// Topics in the order the form and the chart show them.
    pub topics: Vec<String>,
}

/// Result of resolving the topic list for a chosen subject.
#[derive(Debug, PartialEq, Eq)]
pub enum TopicLookup<'a> {
    Found(&'a [String]),
    NotFound,
}

/// Finds the topics of the first subject document named `chosen`.
///
/// `None` means the selector had nothing to offer, which resolves the same way
/// as a name with no matching document.
pub fn lookup_topics<'a>(subjects: &'a [Subject], chosen: Option<&str>) -> TopicLookup<'a> {
    let Some(chosen) = chosen else {
        return TopicLookup::NotFound;
    };

    subjects
        .iter()
        .find(|s| s.subject == chosen)
        .map_or(TopicLookup::NotFound, |s| TopicLookup::Found(&s.topics))
}

/// Distinct subject names in the order they were first stored.
pub fn subject_names(subjects: &[Subject]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::with_capacity(subjects.len());
    for s in subjects {
        if !names.contains(&s.subject.as_str()) {
            names.push(&s.subject);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subjects() -> Vec<Subject> {
        vec![
            Subject {
                subject: "TESTE".to_string(),
                topics: vec!["Funções".to_string(), "Módulos".to_string()],
            },
            Subject {
                subject: "TESTE2".to_string(),
                topics: vec!["BLA1".to_string()],
            },
            Subject {
                subject: "TESTE".to_string(),
                topics: vec!["Outro".to_string()],
            },
        ]
    }

    #[test]
    fn lookup_uses_first_matching_document() {
        let subjects = subjects();
        match lookup_topics(&subjects, Some("TESTE")) {
            TopicLookup::Found(topics) => assert_eq!(topics, ["Funções", "Módulos"]),
            TopicLookup::NotFound => panic!("expected topics for TESTE"),
        }
    }

    #[test]
    fn lookup_misses_unknown_or_absent_subject() {
        let subjects = subjects();
        assert_eq!(lookup_topics(&subjects, Some("Nope")), TopicLookup::NotFound);
        assert_eq!(lookup_topics(&subjects, None), TopicLookup::NotFound);
        assert_eq!(lookup_topics(&[], Some("TESTE")), TopicLookup::NotFound);
    }

    #[test]
    fn names_are_deduplicated_in_insertion_order() {
        assert_eq!(subject_names(&subjects()), vec!["TESTE", "TESTE2"]);
    }
}
