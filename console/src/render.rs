//! Status list rendering
//!
//! [`render_status_list`] is a pure mapping from step state to a view model.
//! Adapters such as [`paint_terminal`] turn the view model into output.

use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::pipeline::step::{PipelineStep, StepStatus};

/// Icon shown next to a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Glyph {
    Spinner,
    Check,
    Cross,
    Neutral,
}

impl Glyph {
    pub fn symbol(&self) -> &'static str {
        match self {
            Glyph::Spinner => "…",
            Glyph::Check => "✔",
            Glyph::Cross => "✘",
            Glyph::Neutral => "•",
        }
    }
}

/// Color family of a step row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Muted,
    Active,
    Positive,
    Negative,
}

/// Rendered row for one step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepView {
    pub id: String,
    pub name: String,
    pub status: StepStatus,
    pub glyph: Glyph,
    pub tone: Tone,

    /// Highlighted border for the step in flight
    pub highlighted: bool,
}

/// Map every step to its view, from current status only
pub fn render_status_list(steps: &[PipelineStep]) -> Vec<StepView> {
    steps.iter().map(render_step).collect()
}

fn render_step(step: &PipelineStep) -> StepView {
    let (glyph, tone, highlighted) = match step.status() {
        StepStatus::InProgress => (Glyph::Spinner, Tone::Active, true),
        StepStatus::Success => (Glyph::Check, Tone::Positive, false),
        StepStatus::Failed | StepStatus::Stuck => (Glyph::Cross, Tone::Negative, false),
        StepStatus::Pending => (Glyph::Neutral, Tone::Muted, false),
    };

    StepView {
        id: step.id.clone(),
        name: step.name.clone(),
        status: step.status(),
        glyph,
        tone,
        highlighted,
    }
}

/// Paint the views as terminal lines
pub fn paint_terminal(views: &[StepView]) -> String {
    views
        .iter()
        .map(|view| {
            let line = format!("{} {}", view.glyph.symbol(), view.name);
            let line = match view.tone {
                Tone::Muted => line.dimmed(),
                Tone::Active => line.blue().bold(),
                Tone::Positive => line.green(),
                Tone::Negative => line.red(),
            };
            if view.highlighted {
                format!("{} {}", "▌".blue(), line)
            } else {
                format!("  {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
