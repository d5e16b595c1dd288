//! Task collection state management.
//!
//! [`TaskStore`] is the single source of truth for the task list and the
//! active filter. Every mutation runs synchronously to completion: apply
//! the change, attempt exactly one best-effort persistence write, then
//! notify registered observers with the fresh snapshot — all before the
//! next intent is accepted. Persistence failures never roll back the
//! in-memory state, and unknown ids are defined no-ops rather than errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ulid::Ulid;

use crate::error::{Error, Result};
use crate::events::{EventKind, StoreEvent};
use crate::storage::{decode_tasks, encode_tasks, Slot};

/// One user-visible to-do item.
///
/// Serialized field names are the stored wire format: camelCase, with
/// RFC 3339 timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique id, assigned at creation, immutable.
    pub id: String,
    pub text: String,
    pub completed: bool,
    /// Fixed at creation, never mutated.
    pub created_at: DateTime<Utc>,
    /// Refreshed on toggle and text update; not on deletion.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    fn new(text: String) -> Self {
        let now = Utc::now();
        Self {
            id: Ulid::new().to_string(),
            text,
            completed: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// View selector over the task collection. Orthogonal to the collection
/// itself and never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Active,
    Completed,
}

impl Filter {
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim() {
            "all" => Ok(Filter::All),
            "active" => Ok(Filter::Active),
            "completed" => Ok(Filter::Completed),
            other => Err(Error::InvalidArgument(format!(
                "unknown filter '{other}' (expected all|active|completed)"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Filter::All => "all",
            Filter::Active => "active",
            Filter::Completed => "completed",
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Active => !task.completed,
            Filter::Completed => task.completed,
        }
    }
}

/// Immutable state view handed to observers after each change.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    pub filter: Filter,
}

/// Observer callback receiving the change event and the new snapshot.
pub type Observer = Box<dyn FnMut(&StoreEvent, &Snapshot)>;

/// Authoritative owner of the task collection and the active filter.
pub struct TaskStore {
    tasks: Vec<Task>,
    filter: Filter,
    slot: Box<dyn Slot>,
    observers: Vec<Observer>,
}

impl TaskStore {
    /// Open a store over the given slot and load its persisted state.
    ///
    /// The load happens before any mutation is possible; a missing or
    /// unreadable payload starts the store empty.
    pub fn open(slot: Box<dyn Slot>) -> Self {
        let mut store = Self {
            tasks: Vec::new(),
            filter: Filter::default(),
            slot,
            observers: Vec::new(),
        };
        store.load();
        store
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Replace the collection wholesale from the slot.
    ///
    /// Absent data leaves the collection empty. A payload that does not
    /// parse as a task array is logged and treated as no data; this never
    /// surfaces as an error.
    pub fn load(&mut self) {
        match self.slot.read() {
            Ok(Some(payload)) => match decode_tasks(&payload) {
                Ok(tasks) => self.tasks = tasks,
                Err(err) => {
                    warn!(error = %err, "stored tasks are unreadable; starting empty");
                    self.tasks.clear();
                }
            },
            Ok(None) => self.tasks.clear(),
            Err(err) => {
                warn!(error = %err, "failed to read task storage; starting empty");
                self.tasks.clear();
            }
        }
    }

    /// Register an observer. Observers run synchronously after each state
    /// change, in subscription order, before the next intent is accepted.
    pub fn subscribe(&mut self, observer: Observer) {
        self.observers.push(observer);
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tasks: self.tasks.clone(),
            filter: self.filter,
        }
    }

    /// Append a new task. The text is trimmed; blank input is dropped as a
    /// logged no-op. Returns a clone of the new task.
    pub fn add(&mut self, text: &str) -> Option<Task> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("ignoring blank task text");
            return None;
        }

        let task = Task::new(trimmed.to_string());
        self.tasks.push(task.clone());
        self.commit(event(EventKind::TaskAdded, &task));
        Some(task)
    }

    /// Flip `completed` on the matching task. Unknown id is a no-op.
    pub fn toggle(&mut self, id: &str) -> bool {
        let payload = match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.completed = !task.completed;
                task.updated_at = Utc::now();
                TogglePayload {
                    id: task.id.clone(),
                    completed: task.completed,
                }
            }
            None => return false,
        };
        self.commit(event(EventKind::TaskToggled, payload));
        true
    }

    /// Replace the matching task's text. Blank text and unknown ids are
    /// no-ops.
    pub fn update(&mut self, id: &str, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("ignoring blank task text");
            return false;
        }

        let payload = match self.tasks.iter_mut().find(|task| task.id == id) {
            Some(task) => {
                task.text = trimmed.to_string();
                task.updated_at = Utc::now();
                EditPayload {
                    id: task.id.clone(),
                    text: task.text.clone(),
                }
            }
            None => return false,
        };
        self.commit(event(EventKind::TaskEdited, payload));
        true
    }

    /// Remove the matching task in place. Unknown id is a no-op.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            return false;
        };
        let task = self.tasks.remove(index);
        self.commit(event(
            EventKind::TaskDeleted,
            IdPayload { id: task.id },
        ));
        true
    }

    /// Remove every completed task, preserving the order of the rest.
    /// Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|task| !task.completed);
        let removed = before - self.tasks.len();
        if removed > 0 {
            self.commit(event(EventKind::CompletedCleared, ClearPayload { removed }));
        }
        removed
    }

    /// Set the active filter. Pure state change: the collection is never
    /// touched and nothing is persisted; observers are notified so the
    /// presentation layer re-renders.
    pub fn set_filter(&mut self, filter: Filter) {
        if self.filter == filter {
            return;
        }
        self.filter = filter;
        self.notify(event(
            EventKind::FilterChanged,
            FilterPayload {
                filter: filter.as_str(),
            },
        ));
    }

    /// One persistence attempt then observer notification, in that order.
    fn commit(&mut self, change: StoreEvent) {
        self.persist();
        self.notify(change);
    }

    /// Best-effort write of the current collection, empty or not. Failures
    /// are logged and the in-memory state stands.
    fn persist(&mut self) {
        let payload = match encode_tasks(&self.tasks) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "failed to serialize tasks; skipping persist");
                return;
            }
        };
        if let Err(err) = self.slot.write(&payload) {
            warn!(error = %err, "failed to persist tasks; keeping in-memory state");
        }
    }

    fn notify(&mut self, change: StoreEvent) {
        if self.observers.is_empty() {
            return;
        }
        let snapshot = Snapshot {
            tasks: self.tasks.clone(),
            filter: self.filter,
        };
        for observer in &mut self.observers {
            observer(&change, &snapshot);
        }
    }
}

fn event<T: Serialize>(kind: EventKind, data: T) -> StoreEvent {
    match StoreEvent::new(kind).with_data(data) {
        Ok(change) => change,
        Err(err) => {
            warn!(error = %err, "failed to encode event payload");
            StoreEvent::new(kind)
        }
    }
}

#[derive(Serialize)]
struct TogglePayload {
    id: String,
    completed: bool,
}

#[derive(Serialize)]
struct EditPayload {
    id: String,
    text: String,
}

#[derive(Serialize)]
struct IdPayload {
    id: String,
}

#[derive(Serialize)]
struct ClearPayload {
    removed: usize,
}

#[derive(Serialize)]
struct FilterPayload {
    filter: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySlot;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn memory_store() -> (TaskStore, MemorySlot) {
        let slot = MemorySlot::new();
        let handle = slot.handle();
        (TaskStore::open(Box::new(slot)), handle)
    }

    #[test]
    fn add_appends_one_active_task() {
        let (mut store, _slot) = memory_store();

        let task = store.add("Buy milk").expect("task");
        assert_eq!(task.text, "Buy milk");
        assert!(!task.completed);
        assert_eq!(task.created_at, task.updated_at);

        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0], task);
    }

    #[test]
    fn add_trims_and_drops_blank_text() {
        let (mut store, slot) = memory_store();

        let task = store.add("  padded  ").expect("task");
        assert_eq!(task.text, "padded");

        assert!(store.add("   ").is_none());
        assert!(store.add("").is_none());
        assert_eq!(store.tasks().len(), 1);
        // Blank adds are no-ops: only the real add persisted.
        assert_eq!(slot.write_count(), 1);
    }

    #[test]
    fn ids_are_unique_within_a_tick() {
        let (mut store, _slot) = memory_store();
        for _ in 0..100 {
            store.add("same text");
        }

        let mut ids: Vec<&str> = store.tasks().iter().map(|task| task.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn toggle_twice_restores_state_and_bumps_updated_at() {
        let (mut store, _slot) = memory_store();
        let task = store.add("flip me").expect("task");

        assert!(store.toggle(&task.id));
        assert!(store.tasks()[0].completed);
        let after_first = store.tasks()[0].updated_at;
        assert!(after_first >= task.created_at);

        assert!(store.toggle(&task.id));
        assert!(!store.tasks()[0].completed);
        assert!(store.tasks()[0].updated_at >= after_first);
        assert_eq!(store.tasks()[0].created_at, task.created_at);
    }

    #[test]
    fn unknown_ids_are_silent_noops() {
        let (mut store, slot) = memory_store();
        store.add("only task");
        let before = store.snapshot();
        let writes = slot.write_count();

        assert!(!store.toggle("nonexistent-id"));
        assert!(!store.update("nonexistent-id", "new text"));
        assert!(!store.delete("nonexistent-id"));

        assert_eq!(store.tasks(), before.tasks.as_slice());
        // No-ops do not persist.
        assert_eq!(slot.write_count(), writes);
    }

    #[test]
    fn update_replaces_text_and_keeps_position() {
        let (mut store, _slot) = memory_store();
        let a = store.add("first").expect("a");
        let b = store.add("second").expect("b");
        store.add("third");

        assert!(store.update(&b.id, "  renamed  "));
        assert_eq!(store.tasks()[1].text, "renamed");
        assert_eq!(store.tasks()[0].id, a.id);
        assert_eq!(store.tasks()[1].id, b.id);

        // Blank update leaves the task untouched.
        assert!(!store.update(&b.id, "   "));
        assert_eq!(store.tasks()[1].text, "renamed");
    }

    #[test]
    fn delete_removes_in_place() {
        let (mut store, _slot) = memory_store();
        let a = store.add("a").expect("a");
        let b = store.add("b").expect("b");
        let c = store.add("c").expect("c");

        assert!(store.delete(&b.id));
        let ids: Vec<&str> = store.tasks().iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, vec![a.id.as_str(), c.id.as_str()]);
    }

    #[test]
    fn clear_completed_preserves_order_of_remaining() {
        let (mut store, _slot) = memory_store();
        let a = store.add("A").expect("a");
        let b = store.add("B").expect("b");
        let c = store.add("C").expect("c");
        store.toggle(&b.id);

        assert_eq!(store.clear_completed(), 1);
        let ids: Vec<&str> = store.tasks().iter().map(|task| task.id.as_str()).collect();
        assert_eq!(ids, vec![a.id.as_str(), c.id.as_str()]);
        assert!(store.tasks().iter().all(|task| !task.completed));

        // Nothing completed left: clearing again is a no-op.
        assert_eq!(store.clear_completed(), 0);
    }

    #[test]
    fn every_mutation_persists_including_to_empty() {
        let (mut store, slot) = memory_store();

        let task = store.add("ephemeral").expect("task");
        assert_eq!(slot.write_count(), 1);

        store.toggle(&task.id);
        assert_eq!(slot.write_count(), 2);

        store.delete(&task.id);
        assert_eq!(slot.write_count(), 3);
        // The now-empty collection overwrites the stored state.
        assert_eq!(slot.payload().as_deref(), Some("[]"));
    }

    #[test]
    fn write_failure_keeps_in_memory_mutation() {
        let (mut store, slot) = memory_store();
        slot.fail_writes(true);

        let task = store.add("survives").expect("task");
        assert_eq!(store.tasks().len(), 1);
        assert!(store.toggle(&task.id));
        assert!(store.tasks()[0].completed);
        assert!(slot.payload().is_none());
    }

    #[test]
    fn load_treats_garbage_as_empty() {
        let slot = MemorySlot::with_payload("not json");
        let store = TaskStore::open(Box::new(slot));
        assert!(store.tasks().is_empty());

        let slot = MemorySlot::with_payload(r#"{"id": "x"}"#);
        let store = TaskStore::open(Box::new(slot));
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn load_treats_read_failure_as_empty() {
        let slot = MemorySlot::new();
        slot.fail_reads(true);
        let store = TaskStore::open(Box::new(slot));
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn load_restores_persisted_tasks() {
        let slot = MemorySlot::new();
        let handle = slot.handle();
        {
            let mut store = TaskStore::open(Box::new(slot));
            store.add("kept");
            let done = store.add("done").expect("task");
            store.toggle(&done.id);
        }

        let store = TaskStore::open(Box::new(handle));
        assert_eq!(store.tasks().len(), 2);
        assert_eq!(store.tasks()[0].text, "kept");
        assert!(!store.tasks()[0].completed);
        assert_eq!(store.tasks()[1].text, "done");
        assert!(store.tasks()[1].completed);
    }

    #[test]
    fn load_is_idempotent() {
        let slot = MemorySlot::new();
        let mut store = TaskStore::open(Box::new(slot));
        store.add("stable");

        store.load();
        store.load();
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(store.tasks()[0].text, "stable");
    }

    #[test]
    fn replay_is_deterministic() {
        fn apply(store: &mut TaskStore, ids: &[String]) {
            store.toggle(&ids[1]);
            store.update(&ids[0], "renamed");
            store.delete(&ids[2]);
            store.toggle(&ids[3]);
            store.clear_completed();
        }

        let (mut first, _slot) = memory_store();
        let ids: Vec<String> = ["a", "b", "c", "d"]
            .iter()
            .map(|text| first.add(text).expect("task").id)
            .collect();
        apply(&mut first, &ids);

        // Same mutation sequence against a fresh store seeded with the same
        // pre-mutation collection.
        let seed = crate::storage::encode_tasks(
            &["a", "b", "c", "d"]
                .iter()
                .zip(&ids)
                .map(|(text, id)| Task {
                    id: id.clone(),
                    text: text.to_string(),
                    completed: false,
                    created_at: first.tasks().first().map(|t| t.created_at).unwrap_or_else(Utc::now),
                    updated_at: first.tasks().first().map(|t| t.created_at).unwrap_or_else(Utc::now),
                })
                .collect::<Vec<_>>(),
        )
        .expect("seed");
        let mut second = TaskStore::open(Box::new(MemorySlot::with_payload(seed)));
        apply(&mut second, &ids);

        let first_view: Vec<(&str, &str, bool)> = first
            .tasks()
            .iter()
            .map(|task| (task.id.as_str(), task.text.as_str(), task.completed))
            .collect();
        let second_view: Vec<(&str, &str, bool)> = second
            .tasks()
            .iter()
            .map(|task| (task.id.as_str(), task.text.as_str(), task.completed))
            .collect();
        assert_eq!(first_view, second_view);
    }

    #[test]
    fn observers_see_each_change_with_fresh_snapshot() {
        let (mut store, _slot) = memory_store();
        let seen: Rc<RefCell<Vec<(EventKind, usize)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        store.subscribe(Box::new(move |change, snapshot| {
            sink.borrow_mut().push((change.event, snapshot.tasks.len()));
        }));

        let task = store.add("watched").expect("task");
        store.toggle(&task.id);
        store.set_filter(Filter::Completed);
        store.clear_completed();

        assert_eq!(
            seen.borrow().as_slice(),
            &[
                (EventKind::TaskAdded, 1),
                (EventKind::TaskToggled, 1),
                (EventKind::FilterChanged, 1),
                (EventKind::CompletedCleared, 0),
            ]
        );
    }

    #[test]
    fn set_filter_never_persists_or_mutates() {
        let (mut store, slot) = memory_store();
        store.add("task");
        let writes = slot.write_count();

        store.set_filter(Filter::Active);
        store.set_filter(Filter::Active);
        store.set_filter(Filter::All);

        assert_eq!(store.filter(), Filter::All);
        assert_eq!(store.tasks().len(), 1);
        assert_eq!(slot.write_count(), writes);
    }

    #[test]
    fn filter_parse_accepts_exactly_three_values() {
        assert_eq!(Filter::parse("all").expect("all"), Filter::All);
        assert_eq!(Filter::parse(" active ").expect("active"), Filter::Active);
        assert_eq!(
            Filter::parse("completed").expect("completed"),
            Filter::Completed
        );
        assert!(Filter::parse("done").is_err());
        assert!(Filter::parse("").is_err());
    }

    #[test]
    fn stored_wire_format_uses_camel_case_fields() {
        let (mut store, slot) = memory_store();
        store.add("wire");

        let payload = slot.payload().expect("payload");
        let value: serde_json::Value = serde_json::from_str(&payload).expect("json");
        let record = &value.as_array().expect("array")[0];
        assert!(record["id"].is_string());
        assert_eq!(record["text"], "wire");
        assert_eq!(record["completed"], false);
        assert!(record["createdAt"].is_string());
        assert!(record["updatedAt"].is_string());
    }
}
