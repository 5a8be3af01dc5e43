// src/utils/table.rs

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::answer::TopicAnswers;

/// Answers laid out as a table: one column per topic, one row per student.
///
/// Columns appear in the order topics are first seen across the answers. A
/// student whose mapping lacks a topic gets an empty cell; nothing is filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnswerTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<u8>>>,
}

/// Descriptive statistics of one topic column, computed over present cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopicSummary {
    pub topic: String,
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation. Needs at least two values.
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub q25: Option<f64>,
    #[serde(rename = "50%")]
    pub q50: Option<f64>,
    #[serde(rename = "75%")]
    pub q75: Option<f64>,
    pub max: Option<f64>,
}

impl AnswerTable {
    pub fn from_answers(answers: &[TopicAnswers]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for answer in answers {
            for topic in answer.keys() {
                if !columns.contains(topic) {
                    columns.push(topic.clone());
                }
            }
        }

        let rows = answers
            .iter()
            .map(|answer| columns.iter().map(|c| answer.get(c).copied()).collect())
            .collect();

        Self { columns, rows }
    }

    /// Present values of the column at `index`, in row order.
    pub fn column_values(&self, index: usize) -> Vec<u8> {
        self.rows
            .iter()
            .filter_map(|row| row.get(index).copied().flatten())
            .collect()
    }

    /// Per-topic count, mean, std, min, quartiles and max.
    pub fn describe(&self) -> Vec<TopicSummary> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, topic)| summarize(topic, &self.column_values(i)))
            .collect()
    }
}

fn summarize(topic: &str, values: &[u8]) -> TopicSummary {
    let mut sorted: Vec<f64> = values.iter().map(|v| f64::from(*v)).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let count = sorted.len();
    let mean = (count > 0).then(|| sorted.iter().sum::<f64>() / count as f64);
    let std = mean.filter(|_| count > 1).map(|m| {
        let sum_sq: f64 = sorted.iter().map(|v| (v - m).powi(2)).sum();
        (sum_sq / (count - 1) as f64).sqrt()
    });

    TopicSummary {
        topic: topic.to_string(),
        count,
        mean,
        std,
        min: sorted.first().copied(),
        q25: quantile(&sorted, 0.25),
        q50: quantile(&sorted, 0.50),
        q75: quantile(&sorted, 0.75),
        max: sorted.last().copied(),
    }
}

/// Linear interpolation between the closest ranks of sorted values.
fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = (sorted.len() - 1) as f64 * q;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}
