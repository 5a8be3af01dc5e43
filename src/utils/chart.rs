// src/utils/chart.rs

use serde::Serialize;

use crate::utils::table::AnswerTable;

pub const CHART_TITLE: &str = "Familiarity by topic";
pub const X_AXIS_TITLE: &str = "Topic";
pub const Y_AXIS_TITLE: &str = "Familiarity level";

/// Plotly figure, handed to plotly.js as-is. The box statistics (quartiles,
/// whiskers, outliers) are computed by plotly.js from the raw points.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<BoxTrace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxTrace {
    #[serde(rename = "type")]
    pub trace_type: &'static str,
    pub name: String,
    pub y: Vec<u8>,
    /// "all" overlays every point next to its box.
    pub boxpoints: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Title,
}

/// One box per table column, in column order.
pub fn build_box_plot(table: &AnswerTable) -> Figure {
    let data = table
        .columns
        .iter()
        .enumerate()
        .map(|(i, topic)| BoxTrace {
            trace_type: "box",
            name: topic.clone(),
            y: table.column_values(i),
            boxpoints: "all",
        })
        .collect();

    Figure {
        data,
        layout: Layout {
            title: Title { text: CHART_TITLE },
            xaxis: Axis {
                title: Title { text: X_AXIS_TITLE },
            },
            yaxis: Axis {
                title: Title { text: Y_AXIS_TITLE },
            },
        },
    }
}
