//! taskpad toggle command implementation

use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

use super::Context;

#[derive(serde::Serialize)]
struct ToggleReport<'a> {
    id: &'a str,
    changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
}

pub fn run(ctx: &mut Context, id: &str) -> Result<()> {
    // Unknown ids are defined no-ops, not errors.
    let changed = ctx.store.toggle(id);
    let completed = ctx
        .store
        .tasks()
        .iter()
        .find(|task| task.id == id)
        .map(|task| task.completed);

    let mut human = if changed {
        let state = if completed == Some(true) { "completed" } else { "active" };
        HumanOutput::new(format!("task {id} is now {state}"))
    } else {
        HumanOutput::new(format!("no task with id {id}"))
    };
    if !changed {
        human.push_warning("unknown id: nothing to do");
    }

    emit_success(
        ctx.options,
        "toggle",
        &ToggleReport {
            id,
            changed,
            completed,
        },
        Some(&human),
    )
}
