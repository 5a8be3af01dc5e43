// src/store.rs

use sqlx::{AnyConnection, Connection, FromRow};

use crate::{
    config::{Backend, Config, ConfigError},
    error::AppError,
    models::{answer::Answer, subject::Subject},
    utils::seed::{mock_answers, mock_subjects},
};

const POSTGRES_SCHEMA: [&str; 2] = [
    "CREATE TABLE IF NOT EXISTS subjects (
        id BIGSERIAL PRIMARY KEY,
        subject TEXT NOT NULL,
        topics TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS answers (
        id BIGSERIAL PRIMARY KEY,
        subject TEXT NOT NULL,
        answers_for_topics TEXT NOT NULL
    )",
];

const SQLITE_SCHEMA: [&str; 2] = [
    "CREATE TABLE IF NOT EXISTS subjects (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        subject TEXT NOT NULL,
        topics TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS answers (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        subject TEXT NOT NULL,
        answers_for_topics TEXT NOT NULL
    )",
];

/// Raw 'subjects' row. `topics` holds a JSON array.
#[derive(FromRow)]
struct SubjectRow {
    subject: String,
    topics: String,
}

/// Raw 'answers' row. `answers_for_topics` holds a JSON object.
#[derive(FromRow)]
struct AnswerRow {
    subject: String,
    answers_for_topics: String,
}

impl TryFrom<SubjectRow> for Subject {
    type Error = AppError;

    fn try_from(row: SubjectRow) -> Result<Self, Self::Error> {
        Ok(Subject {
            subject: row.subject,
            topics: serde_json::from_str(&row.topics)?,
        })
    }
}

impl TryFrom<AnswerRow> for Answer {
    type Error = AppError;

    fn try_from(row: AnswerRow) -> Result<Self, Self::Error> {
        Ok(Answer {
            subject: row.subject,
            answers_for_topics: serde_json::from_str(&row.answers_for_topics)?,
        })
    }
}

/// Access to the 'subjects' and 'answers' collections.
///
/// Holds no connection. Every operation opens its own, runs, and closes it on
/// both the success and the failure path. Nothing is pooled, retried or wrapped
/// in a transaction.
#[derive(Debug, Clone)]
pub struct Store {
    database_url: String,
    backend: Backend,
}

impl Store {
    pub fn new(database_url: impl Into<String>) -> Result<Self, ConfigError> {
        let database_url = database_url.into();
        let backend = Backend::from_url(&database_url)?;
        sqlx::any::install_default_drivers();

        Ok(Self {
            database_url,
            backend,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(config.database_url.clone())
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    /// Opens a connection and materializes both collections if missing.
    async fn open(&self) -> Result<AnyConnection, AppError> {
        let mut conn = AnyConnection::connect(&self.database_url)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to survey database: {:?}", e);
                AppError::from(e)
            })?;

        if let Err(e) = create_collections(&mut conn, self.backend).await {
            return release(conn, Err(e)).await;
        }

        Ok(conn)
    }

    /// Inserts the two mock subjects and five seeded answers for each.
    pub async fn add_test_data(&self) -> Result<(), AppError> {
        let subjects = mock_subjects();
        let answers = mock_answers(&subjects);

        let mut conn = self.open().await?;
        let result = insert_documents(&mut conn, &subjects, &answers).await;
        let result = release(conn, result).await;

        if result.is_ok() {
            tracing::info!(
                "Added test data: {} subjects, {} answers",
                subjects.len(),
                answers.len()
            );
        }
        result
    }

    /// Drops both collections. Irreversible.
    pub async fn clear_database(&self) -> Result<(), AppError> {
        let mut conn = self.open().await?;
        let result = drop_collections(&mut conn).await;
        let result = release(conn, result).await;

        if result.is_ok() {
            tracing::warn!("Survey database cleared");
        }
        result
    }

    /// Returns the answers for `subject`, or every answer when `subject` is
    /// empty. The empty string doubles as "no filter".
    pub async fn get_data(&self, subject: &str) -> Result<Vec<Answer>, AppError> {
        let mut conn = self.open().await?;
        let result = fetch_answers(&mut conn, subject).await;
        release(conn, result).await
    }

    /// All subject documents in insertion order.
    pub async fn list_subjects(&self) -> Result<Vec<Subject>, AppError> {
        let mut conn = self.open().await?;
        let result = fetch_subjects(&mut conn).await;
        release(conn, result).await
    }

    pub async fn insert_answer(&self, answer: &Answer) -> Result<(), AppError> {
        let mut conn = self.open().await?;
        let result = insert_answer(&mut conn, answer).await;
        let result = release(conn, result).await;

        if result.is_ok() {
            tracing::info!("Stored answer for subject '{}'", answer.subject);
        }
        result
    }
}

/// Postgres catalog conflicts raised when two sessions create the same table
/// at once: 23505 (unique_violation on pg_type) and 42P07 (duplicate_table).
const CONCURRENT_CREATE_CODES: [&str; 2] = ["23505", "42P07"];

fn is_concurrent_create(code: Option<&str>) -> bool {
    code.is_some_and(|code| CONCURRENT_CREATE_CODES.contains(&code))
}

/// Runs the collection DDL. Losing a creation race to another session still
/// leaves the table in place, so that error counts as success.
async fn create_collections(conn: &mut AnyConnection, backend: Backend) -> Result<(), AppError> {
    let schema = match backend {
        Backend::Postgres => POSTGRES_SCHEMA,
        Backend::Sqlite => SQLITE_SCHEMA,
    };

    for ddl in schema {
        match sqlx::query(ddl).execute(&mut *conn).await {
            Ok(_) => {}
            Err(sqlx::Error::Database(db_err)) if is_concurrent_create(db_err.code().as_deref()) => {
                tracing::debug!("Collection created concurrently: {}", db_err);
            }
            Err(e) => {
                tracing::error!("Failed to create collections: {:?}", e);
                return Err(AppError::from(e));
            }
        }
    }
    Ok(())
}

/// Closes the connection, keeping the operation's own result.
async fn release<T>(conn: AnyConnection, result: Result<T, AppError>) -> Result<T, AppError> {
    if let Err(e) = conn.close().await {
        tracing::warn!("Failed to close survey database connection: {:?}", e);
    }
    result
}

async fn insert_subject(conn: &mut AnyConnection, subject: &Subject) -> Result<(), AppError> {
    sqlx::query("INSERT INTO subjects (subject, topics) VALUES ($1, $2)")
        .bind(subject.subject.clone())
        .bind(serde_json::to_string(&subject.topics)?)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert subject: {:?}", e);
            AppError::from(e)
        })?;
    Ok(())
}

async fn insert_answer(conn: &mut AnyConnection, answer: &Answer) -> Result<(), AppError> {
    sqlx::query("INSERT INTO answers (subject, answers_for_topics) VALUES ($1, $2)")
        .bind(answer.subject.clone())
        .bind(serde_json::to_string(&answer.answers_for_topics)?)
        .execute(&mut *conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert answer: {:?}", e);
            AppError::from(e)
        })?;
    Ok(())
}

async fn insert_documents(
    conn: &mut AnyConnection,
    subjects: &[Subject],
    answers: &[Answer],
) -> Result<(), AppError> {
    for subject in subjects {
        insert_subject(conn, subject).await?;
    }
    for answer in answers {
        insert_answer(conn, answer).await?;
    }
    Ok(())
}

async fn drop_collections(conn: &mut AnyConnection) -> Result<(), AppError> {
    sqlx::query("DROP TABLE IF EXISTS subjects")
        .execute(&mut *conn)
        .await?;
    sqlx::query("DROP TABLE IF EXISTS answers")
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn fetch_answers(conn: &mut AnyConnection, subject: &str) -> Result<Vec<Answer>, AppError> {
    let rows: Vec<AnswerRow> = if subject.is_empty() {
        sqlx::query_as("SELECT subject, answers_for_topics FROM answers ORDER BY id")
            .fetch_all(&mut *conn)
            .await?
    } else {
        sqlx::query_as(
            "SELECT subject, answers_for_topics FROM answers WHERE subject = $1 ORDER BY id",
        )
        .bind(subject.to_owned())
        .fetch_all(&mut *conn)
        .await?
    };

    rows.into_iter().map(Answer::try_from).collect()
}

async fn fetch_subjects(conn: &mut AnyConnection) -> Result<Vec<Subject>, AppError> {
    let rows: Vec<SubjectRow> = sqlx::query_as("SELECT subject, topics FROM subjects ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;

    rows.into_iter().map(Subject::try_from).collect()
}
