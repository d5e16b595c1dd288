//! Command-line interface for taskpad
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is implemented in its own submodule. The CLI is the
//! input boundary: it trims task text and enforces the length limit
//! before anything reaches the store.

use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::events::EventDestination;
use crate::output::OutputOptions;
use crate::storage::FileSlot;
use crate::task::TaskStore;

mod add;
mod clear;
mod edit;
mod list;
mod rm;
mod stats;
mod toggle;

/// taskpad - a single-user task list
///
/// Tasks live in one local JSON file and survive across runs. Filters are
/// per-invocation view selectors and are never persisted.
#[derive(Parser, Debug)]
#[command(name = "taskpad")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the task storage file (defaults to the platform data dir)
    #[arg(long, global = true, env = "TASKPAD_STORE")]
    pub store: Option<std::path::PathBuf>,

    /// Path to the configuration file
    #[arg(long, global = true, env = "TASKPAD_CONFIG")]
    pub config: Option<std::path::PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Emit change events as JSON lines ("-" for stdout, or a file path)
    #[arg(long, global = true)]
    pub events: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a new task
    Add {
        /// Task text (trimmed; non-blank, at most the configured length)
        text: String,
    },

    /// List tasks
    List {
        /// View filter: all, active, or completed
        #[arg(long)]
        filter: Option<String>,
    },

    /// Toggle a task's completed state
    Toggle {
        /// Task id
        id: String,
    },

    /// Replace a task's text
    Edit {
        /// Task id
        id: String,

        /// New task text
        text: String,
    },

    /// Remove a task
    Rm {
        /// Task id
        id: String,
    },

    /// Remove all completed tasks
    Clear,

    /// Show counts and completion progress
    Stats,
}

/// Shared state handed to each subcommand.
pub(crate) struct Context {
    pub store: TaskStore,
    pub options: OutputOptions,
    pub max_text_len: usize,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::load_default(),
        };

        let storage_path = match &self.store {
            Some(path) => path.clone(),
            None => config.storage_path()?,
        };

        let mut store =
            TaskStore::open(Box::new(FileSlot::new(storage_path))).with_filter(config.default_filter());

        let destination = EventDestination::parse(self.events.as_deref());
        let events_to_stdout = matches!(destination, Some(EventDestination::Stdout));
        if let Some(destination) = destination {
            let mut sink = destination.open()?;
            // Change-feed emission is best-effort, like persistence.
            store.subscribe(Box::new(move |change, _snapshot| {
                let _ = sink.emit(change);
            }));
        }

        let mut ctx = Context {
            store,
            options: OutputOptions {
                json: self.json && !events_to_stdout,
                quiet: self.quiet,
            },
            max_text_len: config.input.max_text_len,
        };

        match self.command {
            Commands::Add { text } => add::run(&mut ctx, &text),
            Commands::List { filter } => list::run(&mut ctx, filter.as_deref()),
            Commands::Toggle { id } => toggle::run(&mut ctx, &id),
            Commands::Edit { id, text } => edit::run(&mut ctx, &id, &text),
            Commands::Rm { id } => rm::run(&mut ctx, &id),
            Commands::Clear => clear::run(&mut ctx),
            Commands::Stats => stats::run(&mut ctx),
        }
    }
}

/// Trim and validate task text at the input boundary.
///
/// Length is measured in UTF-16 code units, matching the persisted
/// contract for the 200-unit default limit.
pub(crate) fn validate_text(raw: &str, max_len: usize) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument("task text cannot be blank".to_string()));
    }

    let units = trimmed.encode_utf16().count();
    if units > max_len {
        return Err(Error::InvalidArgument(format!(
            "task text is {units} units long (maximum {max_len})"
        )));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_text_trims() {
        assert_eq!(validate_text("  hello  ", 200).expect("text"), "hello");
    }

    #[test]
    fn validate_text_rejects_blank() {
        assert!(validate_text("", 200).is_err());
        assert!(validate_text("   ", 200).is_err());
        assert!(validate_text("\t\n", 200).is_err());
    }

    #[test]
    fn validate_text_enforces_utf16_units() {
        let ascii = "a".repeat(200);
        assert!(validate_text(&ascii, 200).is_ok());
        let too_long = "a".repeat(201);
        assert!(validate_text(&too_long, 200).is_err());

        // Astral-plane chars count as two units each.
        let emoji = "😀".repeat(100);
        assert!(validate_text(&emoji, 200).is_ok());
        let emoji_over = "😀".repeat(101);
        assert!(validate_text(&emoji_over, 200).is_err());
    }
}
