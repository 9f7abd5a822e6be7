//! Record Storage
//!
//! Two kinds of output live next to each artifact:
//! - an append-only audit log, one `~~~` block per download event
//! - a tracking subdirectory with one write-once record per key
//!
//! Active-path records keep to their own `active-path/` namespace inside
//! the tracking directory, so they never shadow a provenance record of
//! the same name.
//!
//! Records are created with `create_new`, so the first writer for a key
//! wins and every later attempt is a no-op.
//!
//! @module tracking/store

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::core::config::OutputConfig;
use crate::core::error::{Error, Result};

/// Line that opens every audit log block
pub const AUDIT_SEPARATOR: &str = "~~~";

/// Subdirectory of the tracking directory holding active-path records
pub const ACTIVE_PATH_DIR: &str = "active-path";

// =============================================================================
// RECORD KEYS
// =============================================================================

/// What a record explains; decides the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// The artifact was resolved or downloaded
    Dependency,
    /// The artifact was resolved but no local file exists
    Missing,
    /// A plugin was resolved
    Plugin,
    /// The artifact was requested under a node on the active path
    ActivePath,
}

impl RecordKind {
    pub fn extension(self) -> &'static str {
        match self {
            RecordKind::Dependency => "dep",
            RecordKind::Missing => "miss",
            RecordKind::Plugin => "plugin",
            RecordKind::ActivePath => "dep",
        }
    }

    /// Subdirectory of the tracking directory, if the kind has its own
    pub fn namespace(self) -> Option<&'static str> {
        match self {
            RecordKind::ActivePath => Some(ACTIVE_PATH_DIR),
            RecordKind::Dependency | RecordKind::Missing | RecordKind::Plugin => None,
        }
    }
}

/// Stable name of a provenance record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey {
    stem: String,
    kind: RecordKind,
}

impl RecordKey {
    pub fn new(stem: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            stem: stem.into(),
            kind,
        }
    }

    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}", self.stem, self.kind.extension())
    }

    /// Location relative to the tracking directory
    pub fn relative_path(&self) -> PathBuf {
        let mut path = PathBuf::new();
        if let Some(namespace) = self.kind.namespace() {
            path.push(namespace);
        }
        path.push(self.file_name());
        path
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

/// Turn a file path into a flat file stem
///
/// Leading separators are dropped, the rest (and drive colons) become `_`.
pub fn path_slug(path: &Path) -> String {
    let raw = path.to_string_lossy();
    raw.trim_start_matches(['/', '\\'])
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect()
}

// =============================================================================
// STORE
// =============================================================================

/// Result of a write-once attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Written(PathBuf),
    /// A record for the key already existed
    Skipped(PathBuf),
}

impl RecordOutcome {
    pub fn path(&self) -> &Path {
        match self {
            RecordOutcome::Written(path) | RecordOutcome::Skipped(path) => path,
        }
    }

    pub fn was_written(&self) -> bool {
        matches!(self, RecordOutcome::Written(_))
    }
}

/// File-backed record and audit log writer
#[derive(Debug, Clone)]
pub struct TrackingStore {
    audit_log_file: String,
    tracking_dir: String,
}

impl Default for TrackingStore {
    fn default() -> Self {
        Self::new(&OutputConfig::default())
    }
}

impl TrackingStore {
    pub fn new(output: &OutputConfig) -> Self {
        Self {
            audit_log_file: output.audit_log_file.clone(),
            tracking_dir: output.tracking_dir.clone(),
        }
    }

    /// Audit log path for an artifact directory
    pub fn audit_log_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.audit_log_file)
    }

    /// Tracking subdirectory for an artifact directory
    pub fn tracking_dir(&self, dir: &Path) -> PathBuf {
        dir.join(&self.tracking_dir)
    }

    /// Path a record would be written to
    pub fn record_path(&self, dir: &Path, key: &RecordKey) -> PathBuf {
        self.tracking_dir(dir).join(key.relative_path())
    }

    /// Write `body` under `key` unless a record already exists
    ///
    /// # Arguments
    /// * `dir` - The artifact directory the record belongs to
    /// * `key` - Stable record name
    /// * `body` - Full record text
    pub fn record_if_absent(&self, dir: &Path, key: &RecordKey, body: &str) -> Result<RecordOutcome> {
        let path = self.record_path(dir, key);

        if path.is_file() {
            return Ok(RecordOutcome::Skipped(path));
        }

        // create_dir_all treats an existing directory as success
        let parent = path.parent().unwrap_or(dir).to_path_buf();
        fs::create_dir_all(&parent).map_err(|source| Error::Record {
            path: parent,
            source,
        })?;

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Ok(RecordOutcome::Skipped(path));
            }
            Err(source) => return Err(Error::Record { path, source }),
        };

        file.write_all(body.as_bytes())
            .map_err(|source| Error::Record {
                path: path.clone(),
                source,
            })?;

        Ok(RecordOutcome::Written(path))
    }

    /// Append one block to the audit log, creating it if needed
    ///
    /// The block is prefixed with the separator line.
    pub fn append_audit(&self, dir: &Path, block: &str) -> Result<PathBuf> {
        let path = self.audit_log_path(dir);
        let mut entry = String::with_capacity(AUDIT_SEPARATOR.len() + 1 + block.len());
        entry.push_str(AUDIT_SEPARATOR);
        entry.push('\n');
        entry.push_str(block);

        // Single write so concurrent appenders do not interleave lines
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| file.write_all(entry.as_bytes()))
            .map_err(|source| Error::AuditLog {
                path: path.clone(),
                source,
            })?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_first_writer_wins() {
        let temp = TempDir::new().unwrap();
        let store = TrackingStore::default();
        let key = RecordKey::new("org.example_core_jar_1.0", RecordKind::Dependency);

        let first = store.record_if_absent(temp.path(), &key, "first\n").unwrap();
        let second = store.record_if_absent(temp.path(), &key, "second\n").unwrap();

        assert!(first.was_written());
        assert_eq!(second, RecordOutcome::Skipped(first.path().to_path_buf()));
        assert_eq!(
            first.path(),
            temp.path()
                .join(".tracking")
                .join("org.example_core_jar_1.0.dep")
        );
        assert_eq!(fs::read_to_string(first.path()).unwrap(), "first\n");
    }

    #[test]
    fn test_kinds_do_not_collide() {
        let temp = TempDir::new().unwrap();
        let store = TrackingStore::default();

        for kind in [RecordKind::Dependency, RecordKind::Missing, RecordKind::Plugin] {
            let outcome = store
                .record_if_absent(temp.path(), &RecordKey::new("same", kind), "x")
                .unwrap();
            assert!(outcome.was_written());
        }

        let mut names: Vec<_> = fs::read_dir(temp.path().join(".tracking"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["same.dep", "same.miss", "same.plugin"]);
    }

    #[test]
    fn test_active_path_record_beside_dependency_record() {
        let temp = TempDir::new().unwrap();
        let store = TrackingStore::default();
        let stem = "org.example_app_jar_1.0";

        let active = store
            .record_if_absent(temp.path(), &RecordKey::new(stem, RecordKind::ActivePath), "active\n")
            .unwrap();
        let provenance = store
            .record_if_absent(temp.path(), &RecordKey::new(stem, RecordKind::Dependency), "provenance\n")
            .unwrap();

        assert!(active.was_written());
        assert!(provenance.was_written());
        assert_eq!(
            active.path(),
            temp.path()
                .join(".tracking")
                .join("active-path")
                .join("org.example_app_jar_1.0.dep")
        );
        assert_eq!(
            provenance.path(),
            temp.path().join(".tracking").join("org.example_app_jar_1.0.dep")
        );
        assert_eq!(fs::read_to_string(active.path()).unwrap(), "active\n");
        assert_eq!(fs::read_to_string(provenance.path()).unwrap(), "provenance\n");
    }

    #[test]
    fn test_audit_blocks_in_order() {
        let temp = TempDir::new().unwrap();
        let store = TrackingStore::default();

        for i in 0..5 {
            store
                .append_audit(temp.path(), &format!("event {}\n", i))
                .unwrap();
        }

        let content = fs::read_to_string(temp.path().join("_dependency-tracker.txt")).unwrap();
        let blocks: Vec<&str> = content
            .split("~~~\n")
            .filter(|b| !b.is_empty())
            .collect();
        assert_eq!(blocks.len(), 5);
        for (i, block) in blocks.iter().enumerate() {
            assert_eq!(*block, format!("event {}\n", i));
        }
    }

    #[test]
    fn test_record_error_when_dir_is_a_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".tracking"), b"not a dir").unwrap();
        let store = TrackingStore::default();

        let result = store.record_if_absent(
            temp.path(),
            &RecordKey::new("x", RecordKind::Dependency),
            "body",
        );
        assert!(matches!(result, Err(Error::Record { .. })));
    }

    #[test]
    fn test_path_slug() {
        assert_eq!(
            path_slug(Path::new("/home/dev/project/pom.xml")),
            "home_dev_project_pom.xml"
        );
        assert_eq!(
            path_slug(Path::new("C:\\work\\app\\pom.xml")),
            "C__work_app_pom.xml"
        );
    }
}
