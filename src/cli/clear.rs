//! taskpad clear command implementation

use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

use super::Context;

#[derive(serde::Serialize)]
struct ClearReport {
    removed: usize,
    remaining: usize,
}

pub fn run(ctx: &mut Context) -> Result<()> {
    let removed = ctx.store.clear_completed();

    let human = HumanOutput::new(format!("cleared {removed} completed task(s)"));

    emit_success(
        ctx.options,
        "clear",
        &ClearReport {
            removed,
            remaining: ctx.store.tasks().len(),
        },
        Some(&human),
    )
}
