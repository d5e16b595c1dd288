//! taskpad rm command implementation

use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

use super::Context;

#[derive(serde::Serialize)]
struct RmReport<'a> {
    id: &'a str,
    changed: bool,
    remaining: usize,
}

pub fn run(ctx: &mut Context, id: &str) -> Result<()> {
    let changed = ctx.store.delete(id);

    let mut human = if changed {
        HumanOutput::new(format!("removed task {id}"))
    } else {
        HumanOutput::new(format!("no task with id {id}"))
    };
    if !changed {
        human.push_warning("unknown id: nothing to do");
    }

    emit_success(
        ctx.options,
        "rm",
        &RmReport {
            id,
            changed,
            remaining: ctx.store.tasks().len(),
        },
        Some(&human),
    )
}
