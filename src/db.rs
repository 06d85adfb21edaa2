//! Task storage.
//!
//! `Database` is the in-memory task collection: an insertion-ordered list with at most
//! one task per id. `Store` moves the whole collection to and from a JSON file. Nothing
//! is cached between invocations; every command loads fresh and mutating commands write
//! the full collection back.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fields::Status;
use crate::task::Task;

/// In-memory task collection, serialized as a bare JSON array.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Database {
    pub tasks: Vec<Task>,
}

impl Database {
    /// One more than the highest id present, or 1 for an empty collection.
    ///
    /// Only the ids still present count, so deleting the task with the highest id frees
    /// that id for the next `add`.
    pub fn next_id(&self) -> Result<u64> {
        self.tasks
            .iter()
            .map(|t| t.id)
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or(Error::IdSpaceExhausted)
    }

    /// Get a mutable reference to a task by ID.
    pub fn get_mut(&mut self, id: u64) -> Option<&mut Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        self.tasks.get_mut(idx)
    }

    /// Append a new `todo` task and return its id.
    pub fn add(&mut self, description: String) -> Result<u64> {
        let id = self.next_id()?;
        self.tasks.push(Task::new(id, description));
        Ok(id)
    }

    /// Remove the task with `id`, keeping the order of the rest.
    pub fn remove(&mut self, id: u64) -> Option<Task> {
        let idx = self.tasks.iter().position(|t| t.id == id)?;
        Some(self.tasks.remove(idx))
    }

    /// Tasks in collection order, restricted to `status` when given.
    pub fn filter(&self, status: Option<Status>) -> impl Iterator<Item = &Task> {
        self.tasks
            .iter()
            .filter(move |t| status.map_or(true, |s| t.status == s))
    }

    /// Check that ids are positive and pairwise distinct and descriptions non-empty.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        for t in &self.tasks {
            if t.id == 0 {
                return Err("task id 0 is not allowed".into());
            }
            if t.description.is_empty() {
                return Err(format!("task {} has an empty description", t.id));
            }
            if !seen.insert(t.id) {
                return Err(format!("duplicate task id {}", t.id));
            }
        }
        Ok(())
    }

    /// Pretty JSON document with 4-space indentation and a trailing newline.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)?;
        buf.push(b'\n');
        Ok(buf)
    }
}

/// File-backed persistence for a `Database`.
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(config: &Config) -> Self {
        Store {
            path: config.db_path().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the collection. A missing file is an empty collection; a malformed one is an
    /// error.
    pub fn load(&self) -> Result<Database> {
        let buf = match fs::read_to_string(&self.path) {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no task database, starting empty");
                return Ok(Database::default());
            }
            Err(source) => {
                return Err(Error::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let db: Database = serde_json::from_str(&buf).map_err(|source| Error::Parse {
            path: self.path.clone(),
            source,
        })?;
        db.validate().map_err(|message| Error::InvalidData {
            path: self.path.clone(),
            message,
        })?;

        debug!(path = %self.path.display(), tasks = db.tasks.len(), "loaded task database");
        Ok(db)
    }

    /// Overwrite the file with the full collection in a single write.
    pub fn save(&self, db: &Database) -> Result<()> {
        let data = db.to_json()?;
        fs::write(&self.path, &data).map_err(|source| Error::Write {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), bytes = data.len(), "saved task database");
        Ok(())
    }
}

/// One console line for a task.
pub fn format_task_line(t: &Task) -> String {
    format!(
        "ID: {}, Description: {}, Status: {}",
        t.id, t.description, t.status
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> Store {
        Store::new(&Config::from_db_arg(Some(dir.path().join("tasks.json"))))
    }

    #[test]
    fn test_next_id_starts_at_one() {
        assert_eq!(Database::default().next_id().unwrap(), 1);
    }

    #[test]
    fn test_deleting_lower_id_does_not_free_it() {
        let mut db = Database::default();
        assert_eq!(db.add("a".into()).unwrap(), 1);
        assert_eq!(db.add("b".into()).unwrap(), 2);
        assert_eq!(db.add("c".into()).unwrap(), 3);

        db.remove(2);
        assert_eq!(db.add("d".into()).unwrap(), 4);

        let ids: Vec<u64> = db.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn test_deleting_highest_id_frees_it() {
        let mut db = Database::default();
        db.add("a".into()).unwrap();
        db.add("b".into()).unwrap();

        db.remove(2);
        assert_eq!(db.add("c".into()).unwrap(), 2);

        let ids: Vec<u64> = db.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_add_fails_when_ids_run_out() {
        let mut db = Database::default();
        db.tasks.push(Task::new(u64::MAX, "last".into()));
        let before = db.clone();

        assert!(matches!(db.next_id(), Err(Error::IdSpaceExhausted)));
        assert!(matches!(db.add("one more".into()), Err(Error::IdSpaceExhausted)));
        assert_eq!(db, before);
    }

    #[test]
    fn test_next_id_follows_highest_id() {
        let mut db = Database::default();
        db.tasks.push(Task::new(10, "old".into()));
        db.tasks.push(Task::new(3, "older".into()));
        assert_eq!(db.next_id().unwrap(), 11);
    }

    #[test]
    fn test_remove_missing_id_leaves_collection() {
        let mut db = Database::default();
        db.add("a".into()).unwrap();
        let before = db.clone();

        assert!(db.remove(42).is_none());
        assert_eq!(db, before);
    }

    #[test]
    fn test_filter_keeps_insertion_order() {
        let mut db = Database::default();
        for d in ["a", "b", "c", "d"] {
            db.add(d.into()).unwrap();
        }
        db.get_mut(2).unwrap().set_status(Status::Done);
        db.get_mut(4).unwrap().set_status(Status::Done);

        let all: Vec<u64> = db.filter(None).map(|t| t.id).collect();
        assert_eq!(all, vec![1, 2, 3, 4]);
        let done: Vec<u64> = db.filter(Some(Status::Done)).map(|t| t.id).collect();
        assert_eq!(done, vec![2, 4]);
        assert_eq!(db.filter(Some(Status::InProgress)).count(), 0);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let db = store_in(&dir).load().unwrap();
        assert!(db.tasks.is_empty());
    }

    #[test]
    fn test_save_then_load_preserves_tasks() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut db = Database::default();
        db.add("buy milk".into()).unwrap();
        db.add("walk dog".into()).unwrap();
        db.get_mut(2).unwrap().set_status(Status::InProgress);

        store.save(&db).unwrap();
        assert_eq!(store.load().unwrap(), db);
    }

    #[test]
    fn test_resave_is_byte_identical() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut db = Database::default();
        db.add("buy milk".into()).unwrap();
        db.add("walk dog".into()).unwrap();
        store.save(&db).unwrap();
        let first = fs::read(store.path()).unwrap();

        store.save(&store.load().unwrap()).unwrap();
        assert_eq!(fs::read(store.path()).unwrap(), first);
    }

    #[test]
    fn test_file_layout() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let mut db = Database::default();
        db.add("buy milk".into()).unwrap();
        store.save(&db).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.starts_with("[\n    {\n        \"id\": 1,"));
        assert!(text.ends_with("]\n"));
        assert!(text.contains("\"createdAt\""));
        assert!(text.contains("\"updatedAt\""));
        assert!(text.contains("\"status\": \"todo\""));
    }

    #[test]
    fn test_load_corrupt_file_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.load(), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_load_rejects_unknown_status() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"[{"id": 1, "description": "x", "status": "blocked",
                "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        assert!(matches!(store.load(), Err(Error::Parse { .. })));
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"[
                {"id": 1, "description": "a", "status": "todo",
                 "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"},
                {"id": 1, "description": "b", "status": "done",
                 "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"}
            ]"#,
        )
        .unwrap();

        match store.load() {
            Err(Error::InvalidData { message, .. }) => assert!(message.contains("duplicate")),
            other => panic!("expected InvalidData, got {other:?}"),
        }
    }

    #[test]
    fn test_format_task_line() {
        let task = Task::new(3, "walk dog".into());
        assert_eq!(
            format_task_line(&task),
            "ID: 3, Description: walk dog, Status: todo"
        );
    }

    #[test]
    fn test_load_accepts_timestamps_without_offset() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"[
    {
        "id": 1,
        "description": "buy milk",
        "status": "in-progress",
        "createdAt": "2024-05-01T10:20:30.123456",
        "updatedAt": "2024-05-01T11:00:00.000001"
    }
]"#,
        )
        .unwrap();

        let db = store.load().unwrap();
        assert_eq!(db.tasks.len(), 1);
        let task = &db.tasks[0];
        assert_eq!(task.status, Status::InProgress);
        assert!(task.updated_at > task.created_at);

        // Saving rewrites the timestamps as RFC 3339, which loads back unchanged.
        store.save(&db).unwrap();
        assert_eq!(store.load().unwrap(), db);
    }

    #[test]
    fn test_load_rejects_empty_description() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"[{"id": 4, "description": "", "status": "todo",
                "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        match store.load() {
            Err(Error::InvalidData { message, .. }) => {
                assert!(message.contains("empty description"))
            }
            other => panic!("expected InvalidData, got {other:?}"),
        }
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(
            store.path(),
            r#"[{"id": 1, "description": "x", "status": "todo", "tags": ["home"],
                "createdAt": "2024-01-01T00:00:00Z", "updatedAt": "2024-01-01T00:00:00Z"}]"#,
        )
        .unwrap();

        assert!(matches!(store.load(), Err(Error::Parse { .. })));
    }
}
