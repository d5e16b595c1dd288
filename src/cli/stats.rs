//! taskpad stats command implementation
//!
//! Mirrors the counts and progress panel: totals for each filter bucket
//! plus a completion percentage when the list is non-empty.

use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::view;

use super::Context;

#[derive(serde::Serialize)]
struct StatsReport {
    total: usize,
    active: usize,
    completed: usize,
    /// Unrounded ratio for proportional rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    progress: Option<f64>,
    /// Rounded percentage for label text.
    #[serde(skip_serializing_if = "Option::is_none")]
    progress_percent: Option<u32>,
}

pub fn run(ctx: &mut Context) -> Result<()> {
    let counts = view::counts(ctx.store.tasks());

    let mut human = HumanOutput::new("task stats");
    human.push_summary("total", counts.total.to_string());
    human.push_summary("active", counts.active.to_string());
    human.push_summary("completed", counts.completed.to_string());
    if let Some(percent) = counts.progress_percent() {
        human.push_summary("progress", format!("{percent}%"));
    }

    emit_success(
        ctx.options,
        "stats",
        &StatsReport {
            total: counts.total,
            active: counts.active,
            completed: counts.completed,
            progress: counts.progress(),
            progress_percent: counts.progress_percent(),
        },
        Some(&human),
    )
}
