//! taskpad list command implementation

use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::task::{Filter, Task};
use crate::view;

use super::Context;

#[derive(serde::Serialize)]
struct ListReport {
    filter: &'static str,
    total: usize,
    tasks: Vec<Task>,
}

pub fn run(ctx: &mut Context, filter: Option<&str>) -> Result<()> {
    if let Some(raw) = filter {
        ctx.store.set_filter(Filter::parse(raw)?);
    }

    let filter = ctx.store.filter();
    let tasks: Vec<Task> = view::filtered(ctx.store.tasks(), filter)
        .into_iter()
        .cloned()
        .collect();

    let report = ListReport {
        filter: filter.as_str(),
        total: tasks.len(),
        tasks,
    };

    let mut human = HumanOutput::new(format!("{} task(s), filter: {}", report.total, report.filter));
    for task in &report.tasks {
        let mark = if task.completed { "x" } else { " " };
        human.push_detail(format!("[{mark}] {}  {}", task.id, task.text));
    }

    emit_success(ctx.options, "list", &report, Some(&human))
}
