//! taskpad edit command implementation

use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

use super::{validate_text, Context};

#[derive(serde::Serialize)]
struct EditReport<'a> {
    id: &'a str,
    changed: bool,
    text: &'a str,
}

pub fn run(ctx: &mut Context, id: &str, raw_text: &str) -> Result<()> {
    let text = validate_text(raw_text, ctx.max_text_len)?;
    let changed = ctx.store.update(id, &text);

    let mut human = if changed {
        HumanOutput::new(format!("updated task {id}"))
    } else {
        HumanOutput::new(format!("no task with id {id}"))
    };
    if changed {
        human.push_summary("text", text.clone());
    } else {
        human.push_warning("unknown id: nothing to do");
    }

    emit_success(
        ctx.options,
        "edit",
        &EditReport {
            id,
            changed,
            text: &text,
        },
        Some(&human),
    )
}
