// src/handlers/survey.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::AppError,
    models::answer::{SubmitAnswerRequest, TopicAnswers},
    store::Store,
    utils::{
        chart::{Figure, build_box_plot},
        table::{AnswerTable, TopicSummary},
    },
};

/// Everything the status section needs for one subject.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectData {
    pub table: AnswerTable,
    pub answers: Vec<TopicAnswers>,
    pub chart: Figure,
}

/// Fetches the subject's answers and shapes them into a table and a chart.
pub async fn set_up_data(store: &Store, subject: &str) -> Result<SubjectData, AppError> {
    let answers: Vec<TopicAnswers> = store
        .get_data(subject)
        .await?
        .into_iter()
        .map(|answer| answer.answers_for_topics)
        .collect();

    let table = AnswerTable::from_answers(&answers);
    let chart = build_box_plot(&table);

    Ok(SubjectData {
        table,
        answers,
        chart,
    })
}

/// Query parameters selecting a subject. A missing value reads as "".
#[derive(Debug, Default, Deserialize)]
pub struct SubjectParams {
    #[serde(default)]
    pub subject: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub subject: String,
    #[serde(flatten)]
    pub data: SubjectData,
    pub summary: Vec<TopicSummary>,
}

/// Lists every subject document.
pub async fn list_subjects(State(store): State<Store>) -> Result<impl IntoResponse, AppError> {
    let subjects = store.list_subjects().await?;
    Ok(Json(subjects))
}

/// Lists answers, filtered by `subject` unless it is empty.
pub async fn list_answers(
    State(store): State<Store>,
    Query(params): Query<SubjectParams>,
) -> Result<impl IntoResponse, AppError> {
    let answers = store.get_data(&params.subject).await?;
    Ok(Json(answers))
}

/// Returns the shaped table, summary statistics and chart for a subject.
pub async fn get_status(
    State(store): State<Store>,
    Query(params): Query<SubjectParams>,
) -> Result<impl IntoResponse, AppError> {
    if params.subject.is_empty() {
        return Err(AppError::BadRequest("No subject selected".to_string()));
    }

    let data = set_up_data(&store, &params.subject).await?;
    let summary = data.table.describe();

    Ok(Json(StatusResponse {
        subject: params.subject,
        data,
        summary,
    }))
}

/// Stores one student's answer.
///
/// Only the level bounds are checked; the subject and topic names are stored
/// as given.
pub async fn submit_answer(
    State(store): State<Store>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let answer = payload.into_answer();
    store.insert_answer(&answer).await?;

    Ok((StatusCode::CREATED, Json(answer)))
}
