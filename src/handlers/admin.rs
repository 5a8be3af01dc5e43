// src/handlers/admin.rs

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;

use crate::{error::AppError, store::Store, utils::html::subject_query};

/// Inserts the mock subjects and answers.
pub async fn seed(State(store): State<Store>) -> Result<impl IntoResponse, AppError> {
    store.add_test_data().await?;
    Ok(StatusCode::CREATED)
}

/// Drops both collections. There is no confirmation step.
pub async fn clear(State(store): State<Store>) -> Result<impl IntoResponse, AppError> {
    store.clear_database().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Hidden field the page's admin buttons carry so the selection survives.
#[derive(Debug, Deserialize)]
pub struct AdminForm {
    pub subject: Option<String>,
}

/// "Add test data" button: seeds, then renders the page again.
pub async fn seed_from_page(
    State(store): State<Store>,
    Form(form): Form<AdminForm>,
) -> Result<impl IntoResponse, AppError> {
    store.add_test_data().await?;
    Ok(Redirect::to(&subject_query("/", form.subject.as_deref())))
}

/// "Clear database" button: drops everything, then renders the page again.
pub async fn clear_from_page(
    State(store): State<Store>,
    Form(form): Form<AdminForm>,
) -> Result<impl IntoResponse, AppError> {
    store.clear_database().await?;
    Ok(Redirect::to(&subject_query("/", form.subject.as_deref())))
}
