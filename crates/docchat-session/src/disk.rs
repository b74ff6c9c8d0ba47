//! Durable record tier: one payload file plus one metadata sidecar per
//! session id.
//!
//! Layout: `{data_dir}/{id}.json` (serialized payload) and
//! `{data_dir}/{id}.meta.json` (bookkeeping). Writes go to a temporary
//! file, are synced, and renamed into place, so a crash mid-write can never
//! leave a record that reads back half-written.

use std::fs::{self, File};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::Result;
use crate::record::SessionMetadata;

/// Pure-I/O store for session records. No eviction, no TTL policy.
#[derive(Debug)]
pub struct DiskRecordStore {
    data_dir: PathBuf,
}

impl DiskRecordStore {
    /// Open a store rooted at `data_dir`, creating it if needed.
    ///
    /// When the configured directory cannot be created (read-only install
    /// prefix, container mount quirks), falls back to a namespaced
    /// directory under the OS temp dir rather than refusing to start.
    pub fn open(data_dir: &Path) -> io::Result<Self> {
        match fs::create_dir_all(data_dir) {
            Ok(()) => Ok(Self {
                data_dir: data_dir.to_path_buf(),
            }),
            Err(e) => {
                let fallback = std::env::temp_dir().join("docchat").join("sessions");
                warn!(
                    configured = %data_dir.display(),
                    fallback = %fallback.display(),
                    error = %e,
                    "session data dir unavailable, using temp fallback"
                );
                fs::create_dir_all(&fallback)?;
                Ok(Self { data_dir: fallback })
            }
        }
    }

    /// The directory records are stored under.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn payload_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(format!("{id}.json"))
    }

    fn metadata_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(format!("{id}.meta.json"))
    }

    /// Write the payload record and its metadata sidecar.
    pub fn write_record(&self, meta: &SessionMetadata, payload: &[u8]) -> Result<()> {
        check_id(&meta.session_id)?;

        write_atomic(&self.payload_path(&meta.session_id), payload)?;

        let meta_bytes = serde_json::to_vec(meta)?;
        write_atomic(&self.metadata_path(&meta.session_id), &meta_bytes)?;

        debug!(session_id = %meta.session_id, "session record written");
        Ok(())
    }

    /// Read a payload record. `None` when no record exists.
    pub fn read_payload(&self, id: &str) -> Result<Option<Vec<u8>>> {
        check_id(id)?;
        match fs::read(self.payload_path(id)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Read a metadata sidecar. `None` when absent or unparseable: a
    /// sidecar that cannot be decoded is useless for bookkeeping and is
    /// treated like a missing one.
    pub fn read_metadata(&self, id: &str) -> Result<Option<SessionMetadata>> {
        check_id(id)?;
        let bytes = match fs::read(self.metadata_path(id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(meta) => Ok(Some(meta)),
            Err(e) => {
                warn!(session_id = %id, error = %e, "unreadable metadata sidecar");
                Ok(None)
            }
        }
    }

    /// Rewrite the sidecar's `last_accessed` stamp.
    ///
    /// Returns `false` when the session has no sidecar to refresh.
    pub fn touch(&self, id: &str, now: DateTime<Utc>) -> Result<bool> {
        let Some(mut meta) = self.read_metadata(id)? else {
            return Ok(false);
        };
        meta.touch(now);

        let meta_bytes = serde_json::to_vec(&meta)?;
        write_atomic(&self.metadata_path(id), &meta_bytes)?;
        Ok(true)
    }

    /// Remove both files of a record.
    ///
    /// Returns `true` when either file existed.
    pub fn delete(&self, id: &str) -> Result<bool> {
        check_id(id)?;
        let removed_payload = remove_if_present(&self.payload_path(id))?;
        let removed_meta = remove_if_present(&self.metadata_path(id))?;
        Ok(removed_payload || removed_meta)
    }

    /// Enumerate every readable metadata sidecar, newest access first.
    ///
    /// Payloads are never materialized. A sidecar that cannot be read or
    /// parsed is logged and skipped so one bad record cannot hide the rest.
    pub fn list_metadata(&self) -> Result<Vec<SessionMetadata>> {
        let mut sessions = Vec::new();

        for entry in fs::read_dir(&self.data_dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };

            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.ends_with(".meta.json") {
                continue;
            }

            let bytes = match fs::read(entry.path()) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(file = %name, error = %e, "skipping unreadable sidecar");
                    continue;
                }
            };
            match serde_json::from_slice::<SessionMetadata>(&bytes) {
                Ok(meta) => sessions.push(meta),
                Err(e) => {
                    warn!(file = %name, error = %e, "skipping corrupt sidecar");
                }
            }
        }

        sessions.sort_by(|a, b| b.last_accessed.cmp(&a.last_accessed));
        Ok(sessions)
    }
}

/// Reject ids that could escape the data directory.
fn check_id(id: &str) -> io::Result<()> {
    let valid = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(io::Error::new(
            ErrorKind::InvalidInput,
            format!("invalid session id: {id:?}"),
        ))
    }
}

/// Write via a temp file, sync, then rename into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    {
        let mut file = File::create(&tmp)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
}

fn remove_if_present(path: &Path) -> io::Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, DiskRecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskRecordStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn write_then_read_round_trips() {
        let (_dir, store) = temp_store();
        let meta = SessionMetadata::new("s1", Some("10.0.0.1"));

        store.write_record(&meta, b"payload-bytes").unwrap();

        assert_eq!(
            store.read_payload("s1").unwrap().as_deref(),
            Some(b"payload-bytes".as_slice())
        );
        let back = store.read_metadata("s1").unwrap().unwrap();
        assert_eq!(back.client_id.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn missing_record_reads_as_none() {
        let (_dir, store) = temp_store();
        assert!(store.read_payload("absent").unwrap().is_none());
        assert!(store.read_metadata("absent").unwrap().is_none());
    }

    #[test]
    fn no_temp_files_survive_a_write() {
        let (dir, store) = temp_store();
        let meta = SessionMetadata::new("s1", None);
        store.write_record(&meta, b"x").unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn delete_removes_both_files_and_is_idempotent() {
        let (_dir, store) = temp_store();
        let meta = SessionMetadata::new("s1", None);
        store.write_record(&meta, b"x").unwrap();

        assert!(store.delete("s1").unwrap());
        assert!(store.read_payload("s1").unwrap().is_none());
        assert!(store.read_metadata("s1").unwrap().is_none());

        assert!(!store.delete("s1").unwrap());
    }

    #[test]
    fn touch_refreshes_last_accessed() {
        let (_dir, store) = temp_store();
        let meta = SessionMetadata::new("s1", None);
        store.write_record(&meta, b"x").unwrap();

        let later = meta.last_accessed + chrono::Duration::hours(1);
        assert!(store.touch("s1", later).unwrap());

        let back = store.read_metadata("s1").unwrap().unwrap();
        assert_eq!(back.last_accessed, later);
        assert_eq!(back.created_at, meta.created_at);
    }

    #[test]
    fn touch_without_sidecar_reports_false() {
        let (_dir, store) = temp_store();
        assert!(!store.touch("absent", Utc::now()).unwrap());
    }

    #[test]
    fn listing_skips_corrupt_sidecars() {
        let (dir, store) = temp_store();

        store
            .write_record(&SessionMetadata::new("good", None), b"x")
            .unwrap();
        fs::write(dir.path().join("bad.meta.json"), b"{not json").unwrap();

        let listed = store.list_metadata().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].session_id, "good");
    }

    #[test]
    fn listing_orders_by_recency() {
        let (_dir, store) = temp_store();

        store
            .write_record(&SessionMetadata::new("older", None), b"x")
            .unwrap();
        store
            .write_record(&SessionMetadata::new("newer", None), b"x")
            .unwrap();
        store
            .touch("newer", Utc::now() + chrono::Duration::minutes(5))
            .unwrap();

        let listed = store.list_metadata().unwrap();
        assert_eq!(listed[0].session_id, "newer");
        assert_eq!(listed[1].session_id, "older");
    }

    #[test]
    fn corrupt_metadata_reads_as_none() {
        let (dir, store) = temp_store();
        fs::write(dir.path().join("s1.meta.json"), b"{truncated").unwrap();

        assert!(store.read_metadata("s1").unwrap().is_none());
    }

    #[test]
    fn traversal_ids_are_rejected() {
        let (_dir, store) = temp_store();
        assert!(store.read_payload("../escape").is_err());
        assert!(store.delete("a/b").is_err());
    }
}
