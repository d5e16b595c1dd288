//! taskpad - Single-User Task List Library
//!
//! This library provides the core functionality for the taskpad CLI:
//! a task collection with local JSON persistence, filtered views, and a
//! synchronous observer-based change feed.
//!
//! # Core Concepts
//!
//! - **Task Store**: the single source of truth for tasks and the active
//!   filter; every mutation persists best-effort and notifies observers
//! - **Persistence Slot**: an opaque key-value boundary holding one JSON
//!   array; absence and corruption both degrade to an empty list
//! - **View Projection**: pure filtered subsets, counts, and progress
//! - **Change Feed**: schema-versioned events emitted per mutation
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `config.toml`
//! - `error`: Error types and result aliases
//! - `events`: Change events and JSONL sinks
//! - `output`: Human and JSON output formatting
//! - `storage`: The persistence slot and its file/memory backends
//! - `task`: Task model and the task store
//! - `view`: Pure projections (filtering, counts, progress)

pub mod cli;
pub mod config;
pub mod error;
pub mod events;
pub mod output;
pub mod storage;
pub mod task;
pub mod view;

pub use error::{Error, Result};
