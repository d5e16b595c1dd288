//! Persistence adapter for the task collection.
//!
//! The durable state is a single key-value slot holding one JSON array of
//! task records. The slot is opaque to the rest of the crate: it hands back
//! a serialized string or nothing, and accepts a serialized string. Absence
//! of data is not an error; adapter-internal faults are, and the task store
//! catches them.

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::task::Task;

/// Opaque key-value persistence slot.
pub trait Slot {
    /// Read the serialized payload, or `None` when nothing has been stored.
    fn read(&self) -> Result<Option<String>>;

    /// Write the serialized payload, replacing any previous value.
    fn write(&self, payload: &str) -> Result<()>;
}

/// Slot backed by a single file on disk.
#[derive(Debug, Clone)]
pub struct FileSlot {
    path: PathBuf,
}

impl FileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Slot for FileSlot {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(Error::Io(err)),
        }
    }

    fn write(&self, payload: &str) -> Result<()> {
        write_atomic(&self.path, payload.as_bytes())
    }
}

/// Write data atomically using temp file + rename, so readers never see a
/// partial payload.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    fs::rename(&temp_path, path)?;

    Ok(())
}

/// Serialize the task collection to its stored JSON form.
///
/// An empty collection serializes to `[]`, which is written like any other
/// state so a previously non-empty slot is correctly overwritten.
pub fn encode_tasks(tasks: &[Task]) -> Result<String> {
    Ok(serde_json::to_string(tasks)?)
}

/// Deserialize a stored payload into a task collection.
///
/// Anything that is not a JSON array of task records is an error; the task
/// store treats that as "no data".
pub fn decode_tasks(payload: &str) -> Result<Vec<Task>> {
    Ok(serde_json::from_str(payload)?)
}

#[derive(Debug, Default)]
struct MemoryCell {
    payload: Option<String>,
    fail_reads: bool,
    fail_writes: bool,
    writes: usize,
}

/// In-memory slot for tests, with injectable read/write failures.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    cell: Rc<RefCell<MemoryCell>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot pre-seeded with a stored payload.
    pub fn with_payload(payload: impl Into<String>) -> Self {
        let slot = Self::new();
        slot.cell.borrow_mut().payload = Some(payload.into());
        slot
    }

    /// A second handle onto the same cell, for inspection after the slot
    /// has been handed to a store.
    pub fn handle(&self) -> MemorySlot {
        self.clone()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.cell.borrow_mut().fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.cell.borrow_mut().fail_writes = fail;
    }

    /// The last payload written, if any.
    pub fn payload(&self) -> Option<String> {
        self.cell.borrow().payload.clone()
    }

    /// How many writes have been attempted successfully.
    pub fn write_count(&self) -> usize {
        self.cell.borrow().writes
    }
}

impl Slot for MemorySlot {
    fn read(&self) -> Result<Option<String>> {
        let cell = self.cell.borrow();
        if cell.fail_reads {
            return Err(Error::OperationFailed("injected read failure".to_string()));
        }
        Ok(cell.payload.clone())
    }

    fn write(&self, payload: &str) -> Result<()> {
        let mut cell = self.cell.borrow_mut();
        if cell.fail_writes {
            return Err(Error::OperationFailed("injected write failure".to_string()));
        }
        cell.payload = Some(payload.to_string());
        cell.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_slot_missing_file_reads_none() {
        let dir = tempdir().expect("tempdir");
        let slot = FileSlot::new(dir.path().join("tasks.json"));
        assert_eq!(slot.read().expect("read"), None);
    }

    #[test]
    fn file_slot_roundtrip() {
        let dir = tempdir().expect("tempdir");
        let slot = FileSlot::new(dir.path().join("tasks.json"));

        slot.write("[]").expect("write");
        assert_eq!(slot.read().expect("read").as_deref(), Some("[]"));

        slot.write(r#"[{"broken"#).expect("overwrite");
        assert_eq!(
            slot.read().expect("read").as_deref(),
            Some(r#"[{"broken"#)
        );
    }

    #[test]
    fn file_slot_creates_parent_directories() {
        let dir = tempdir().expect("tempdir");
        let slot = FileSlot::new(dir.path().join("nested/deeper/tasks.json"));
        slot.write("[]").expect("write");
        assert_eq!(slot.read().expect("read").as_deref(), Some("[]"));
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("tasks.json");
        write_atomic(&path, b"[]").expect("write");

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn memory_slot_injected_failures() {
        let slot = MemorySlot::new();
        let handle = slot.handle();

        slot.write("[]").expect("write");
        assert_eq!(handle.write_count(), 1);

        handle.fail_writes(true);
        assert!(slot.write("[1]").is_err());
        assert_eq!(handle.payload().as_deref(), Some("[]"));

        handle.fail_reads(true);
        assert!(slot.read().is_err());
    }

    #[test]
    fn decode_rejects_non_array_payloads() {
        assert!(decode_tasks("not json").is_err());
        assert!(decode_tasks(r#"{"id": "x"}"#).is_err());
        assert!(decode_tasks("42").is_err());
        assert!(decode_tasks("[]").expect("empty array").is_empty());
    }
}
