//! taskpad add command implementation

use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::task::Task;

use super::{validate_text, Context};

#[derive(serde::Serialize)]
struct AddReport {
    task: Task,
}

pub fn run(ctx: &mut Context, raw_text: &str) -> Result<()> {
    let text = validate_text(raw_text, ctx.max_text_len)?;
    let task = ctx
        .store
        .add(&text)
        .ok_or_else(|| Error::InvalidArgument("task text cannot be blank".to_string()))?;

    let mut human = HumanOutput::new(format!("added task {}", task.id));
    human.push_summary("text", task.text.clone());

    emit_success(ctx.options, "add", &AddReport { task }, Some(&human))
}
