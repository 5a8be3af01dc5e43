// src/handlers/page.rs

use std::ops::ControlFlow;

use axum::{
    Form,
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    handlers::survey::set_up_data,
    models::{
        answer::{Answer, TopicAnswers, parse_level},
        subject::{TopicLookup, lookup_topics, subject_names},
    },
    store::Store,
    utils::{
        chart::Figure,
        html::{escape, script_json},
        table::{AnswerTable, TopicSummary},
    },
};

const PLOTLY_JS: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Id of the element the chart is drawn into.
const PLOT_ID: &str = "plot";

/// Prefix of the slider field names in the submission form.
const TOPIC_FIELD: &str = "topic:";

/// Widget state carried by the page's query string (or the submitted form).
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub subject: Option<String>,
    pub show_data: Option<String>,
    pub show_raw: Option<String>,
}

impl PageParams {
    fn from_fields(fields: &[(String, String)]) -> Self {
        let field = |name: &str| {
            fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.clone())
        };

        Self {
            subject: field("subject"),
            show_data: field("show_data"),
            show_raw: field("show_raw"),
        }
    }

    fn shows_data(&self) -> bool {
        self.show_data.is_some()
    }

    fn shows_raw(&self) -> bool {
        self.show_raw.is_some()
    }
}

/// The page under construction. Sections render top to bottom; the chart
/// lives in a placeholder that can be redrawn later in the same pass.
#[derive(Debug, Default)]
struct Page {
    sections: Vec<String>,
    plot: Option<usize>,
}

impl Page {
    fn push(&mut self, html: impl Into<String>) {
        self.sections.push(html.into());
    }

    /// `html` is trusted; escape user text before passing it in.
    fn title(&mut self, html: &str) {
        self.push(format!("<h1>{}</h1>", html));
    }

    fn warning(&mut self, html: &str) {
        self.push(format!(r#"<div class="warning">{}</div>"#, html));
    }

    /// Draws the chart, into the existing placeholder if there is one.
    fn plot(&mut self, figure: &Figure) -> Result<(), AppError> {
        let html = format!(
            r#"<div id="{id}"></div><script>(function () {{ const fig = {json}; Plotly.react("{id}", fig.data, fig.layout); }})();</script>"#,
            id = PLOT_ID,
            json = script_json(&serde_json::to_string(figure)?),
        );

        match self.plot {
            Some(index) => self.sections[index] = html,
            None => {
                self.plot = Some(self.sections.len());
                self.push(html);
            }
        }
        Ok(())
    }

    fn finish(self) -> Html<String> {
        Html(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Class Optimizer</title>
<script src="{plotly}"></script>
<style>
body {{ font-family: sans-serif; margin: 2rem; }}
.warning {{ background: #fff3cd; border: 1px solid #ffe08a; padding: .75rem; margin: 1rem 0; }}
.columns {{ display: flex; gap: 2rem; }}
table {{ border-collapse: collapse; }}
td, th {{ border: 1px solid #ddd; padding: .25rem .5rem; text-align: right; }}
</style>
</head>
<body>
<form id="page" method="get" action="/"></form>
{body}
</body>
</html>"#,
            plotly = PLOTLY_JS,
            body = self.sections.join("\n"),
        ))
    }
}

/// Renders the dashboard for the current widget state.
pub async fn show(
    State(store): State<Store>,
    Query(params): Query<PageParams>,
) -> Result<Html<String>, AppError> {
    render(&store, &params, None).await
}

/// Handles the familiarity form, then renders the dashboard again.
pub async fn submit(
    State(store): State<Store>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Result<Html<String>, AppError> {
    let params = PageParams::from_fields(&fields);
    render(&store, &params, Some(fields.as_slice())).await
}

/// Runs the page from the top. Every request goes through all sections until
/// one of them halts; nothing is remembered between requests.
async fn render(
    store: &Store,
    params: &PageParams,
    submission: Option<&[(String, String)]>,
) -> Result<Html<String>, AppError> {
    let mut page = Page::default();

    admin_controls(store, &mut page, params).await?;
    explainer(&mut page);

    let ControlFlow::Continue((subject, topics)) = select_subject(store, &mut page, params).await?
    else {
        return Ok(page.finish());
    };

    if status(store, &mut page, params, &subject).await?.is_break() {
        return Ok(page.finish());
    }

    feedback_form(&mut page, params, &subject, &topics);

    if let Some(fields) = submission {
        let answer = read_submission(&subject, &topics, fields)?;
        store.insert_answer(&answer).await?;

        page.push("<p>Response submitted!</p>");
        page.push(format!(
            "<pre>{}</pre>",
            escape(&serde_json::to_string_pretty(&answer.answers_for_topics)?)
        ));

        let data = set_up_data(store, &subject).await?;
        page.plot(&data.chart)?;
    }

    Ok(page.finish())
}

async fn admin_controls(store: &Store, page: &mut Page, params: &PageParams) -> Result<(), AppError> {
    let hidden_subject = params
        .subject
        .as_deref()
        .map(|s| format!(r#"<input type="hidden" name="subject" value="{}">"#, escape(s)))
        .unwrap_or_default();

    page.push(format!(
        r#"<div class="admin">
<form method="post" action="/admin/seed" style="display:inline">{hidden}<button type="submit">Add test data</button></form>
<form method="post" action="/admin/clear" style="display:inline">{hidden}<button type="submit">Clear database</button></form>
<label><input type="checkbox" name="show_data" form="page" onchange="this.form.submit()"{checked}> Show data</label>
</div>"#,
        hidden = hidden_subject,
        checked = checked(params.shows_data()),
    ));

    if params.shows_data() {
        let answers = store.get_data("").await?;
        page.push(format!(
            "<pre>{}</pre>",
            escape(&serde_json::to_string_pretty(&answers)?)
        ));
    }

    Ok(())
}

fn explainer(page: &mut Page) {
    page.title("Class optimizer (alpha)");
    page.push(
        "<p>A small app to help tailor our classes using the very tool the course is about: \
         data analysis.</p>\
         <p>Students share, <strong>anonymously</strong>, how familiar they are (on a scale from 0 \
         to 5) with the topics of an upcoming class. The instructor sees the distribution of \
         familiarity per topic and can adapt the class to the group.</p>",
    );
    page.warning(
        "This app is very simple and therefore not protected against abuse. \
         Please share the link only with classmates.",
    );
}

/// Populates the subject selector and resolves the chosen subject's topics.
async fn select_subject(
    store: &Store,
    page: &mut Page,
    params: &PageParams,
) -> Result<ControlFlow<(), (String, Vec<String>)>, AppError> {
    page.title("Pick a subject to give feedback on its topics");

    let subjects = store.list_subjects().await?;
    let names = subject_names(&subjects);
    let chosen = params
        .subject
        .as_deref()
        .or_else(|| names.first().copied());

    let options: String = names
        .iter()
        .map(|name| {
            format!(
                r#"<option value="{value}"{selected}>{value}</option>"#,
                value = escape(name),
                selected = if Some(*name) == chosen { " selected" } else { "" },
            )
        })
        .collect();
    page.push(format!(
        r#"<label>Select the subject <select name="subject" form="page" onchange="this.form.submit()">{}</select></label>"#,
        options
    ));

    match lookup_topics(&subjects, chosen) {
        TopicLookup::Found(topics) => {
            let subject = chosen.unwrap_or_default().to_string();
            Ok(ControlFlow::Continue((subject, topics.to_vec())))
        }
        TopicLookup::NotFound => {
            tracing::warn!(
                "No topics available for subject {:?}; check that the database has one",
                chosen
            );
            page.warning("Pick a subject, if one is available");
            Ok(ControlFlow::Break(()))
        }
    }
}

/// Shows the current feedback for the subject: optional raw table and
/// summary, then the chart placeholder.
async fn status(
    store: &Store,
    page: &mut Page,
    params: &PageParams,
    subject: &str,
) -> Result<ControlFlow<()>, AppError> {
    page.title(&format!("Current feedback for: {}", escape(subject)));

    if subject.is_empty() {
        page.warning("No subject to load data for");
        return Ok(ControlFlow::Break(()));
    }

    let data = set_up_data(store, subject).await?;

    page.push(format!(
        r#"<label><input type="checkbox" name="show_raw" form="page" onchange="this.form.submit()"{}> Show raw data</label>"#,
        checked(params.shows_raw())
    ));
    if params.shows_raw() {
        page.push(format!(
            r#"<div class="columns"><div><h3>Table</h3>{}</div><div><h3>Summary</h3>{}</div></div>"#,
            table_html(&data.table),
            summary_html(&data.table.describe()),
        ));
    }

    page.plot(&data.chart)?;
    Ok(ControlFlow::Continue(()))
}

fn feedback_form(page: &mut Page, params: &PageParams, subject: &str, topics: &[String]) {
    page.title("Share your familiarity with the topics");

    let mut hidden = format!(
        r#"<input type="hidden" name="subject" value="{}">"#,
        escape(subject)
    );
    if params.shows_data() {
        hidden.push_str(r#"<input type="hidden" name="show_data" value="on">"#);
    }
    if params.shows_raw() {
        hidden.push_str(r#"<input type="hidden" name="show_raw" value="on">"#);
    }

    let sliders: String = topics
        .iter()
        .map(|topic| {
            format!(
                r#"<p><label>{topic} <input type="range" name="{prefix}{topic}" min="0" max="5" step="1" value="0" oninput="this.nextElementSibling.value = this.value"><output>0</output></label></p>"#,
                topic = escape(topic),
                prefix = TOPIC_FIELD,
            )
        })
        .collect();

    page.push(format!(
        r#"<form method="post" action="/submit">{}{}<button type="submit">Send</button></form>"#,
        hidden, sliders
    ));
}

/// Builds the answer from the slider fields, in the subject's topic order.
/// A topic missing from the form counts as the slider default, 0.
fn read_submission(
    subject: &str,
    topics: &[String],
    fields: &[(String, String)],
) -> Result<Answer, AppError> {
    let mut answers_for_topics = TopicAnswers::new();

    for topic in topics {
        let raw = fields
            .iter()
            .find(|(key, _)| key.strip_prefix(TOPIC_FIELD) == Some(topic.as_str()))
            .map(|(_, value)| value.as_str());

        let level = match raw {
            Some(raw) => parse_level(raw).ok_or_else(|| {
                AppError::BadRequest(format!("Invalid familiarity level for '{}': {}", topic, raw))
            })?,
            None => 0,
        };
        answers_for_topics.insert(topic.clone(), level);
    }

    Ok(Answer {
        subject: subject.to_string(),
        answers_for_topics,
    })
}

fn checked(on: bool) -> &'static str {
    if on { " checked" } else { "" }
}

fn table_html(table: &AnswerTable) -> String {
    let header: String = table
        .columns
        .iter()
        .map(|c| format!("<th>{}</th>", escape(c)))
        .collect();
    let rows: String = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let cells: String = row
                .iter()
                .map(|cell| match cell {
                    Some(v) => format!("<td>{}</td>", v),
                    None => "<td></td>".to_string(),
                })
                .collect();
            format!("<tr><th>{}</th>{}</tr>", i, cells)
        })
        .collect();

    format!("<table><tr><th></th>{}</tr>{}</table>", header, rows)
}

fn summary_html(summary: &[TopicSummary]) -> String {
    let header: String = summary
        .iter()
        .map(|s| format!("<th>{}</th>", escape(&s.topic)))
        .collect();

    let stat_row = |label: &str, value: fn(&TopicSummary) -> Option<f64>| {
        let cells: String = summary
            .iter()
            .map(|s| match value(s) {
                Some(v) => format!("<td>{:.6}</td>", v),
                None => "<td>NaN</td>".to_string(),
            })
            .collect();
        format!("<tr><th>{}</th>{}</tr>", label, cells)
    };

    let counts: String = summary
        .iter()
        .map(|s| format!("<td>{}</td>", s.count))
        .collect();

    format!(
        "<table><tr><th></th>{}</tr><tr><th>count</th>{}</tr>{}{}{}{}{}{}{}</table>",
        header,
        counts,
        stat_row("mean", |s| s.mean),
        stat_row("std", |s| s.std),
        stat_row("min", |s| s.min),
        stat_row("25%", |s| s.q25),
        stat_row("50%", |s| s.q50),
        stat_row("75%", |s| s.q75),
        stat_row("max", |s| s.max),
    )
}
