// src/store/storage.rs
//! Reading and writing the JSON store file.

use crate::error::{FollowError, Result};
use crate::types::UserTable;
use serde::Serialize;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_PATH: &str = "users_data.json";

/// Reads the user table, or `None` if the file does not exist.
///
/// # Errors
/// Returns `Io` if the file exists but cannot be read, `CorruptData` if it
/// does not parse as a user table (including content that is not UTF-8).
pub fn read_table(path: &Path) -> Result<Option<UserTable>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(FollowError::io(e, path)),
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| FollowError::CorruptData {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
}

/// Writes the table atomically (temp file + rename).
///
/// # Errors
/// Returns `Io` if serialization, the temp write, or the rename fails.
pub fn write_table(path: &Path, table: &UserTable) -> Result<()> {
    let bytes = to_pretty_json(table).map_err(|e| FollowError::io(e, path))?;
    atomic_write(path, &bytes)
}

/// Whether `path` exists. Unlike `Path::exists`, a permission error is
/// reported instead of read as "missing".
///
/// # Errors
/// Returns `Io` if the existence check itself fails.
pub fn file_exists(path: &Path) -> Result<bool> {
    path.try_exists().map_err(|e| FollowError::io(e, path))
}

/// Copies the current store file to `<name>.bak`.
///
/// # Errors
/// Returns `Io` if the copy fails.
pub fn create_backup(path: &Path) -> Result<PathBuf> {
    let backup_path = sibling(path, ".bak");

    fs::copy(path, &backup_path).map_err(|e| FollowError::io(e, &backup_path))?;

    Ok(backup_path)
}

fn to_pretty_json(table: &UserTable) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    table.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| FollowError::io(e, parent))?;
    }

    let temp_path = sibling(path, ".tmp");

    let written = File::create(&temp_path).and_then(|mut file| {
        file.write_all(content)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(FollowError::io(e, &temp_path));
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        FollowError::io(e, path)
    })
}

/// `users_data.json` -> `users_data.json<suffix>`, in the same directory so
/// the final rename never crosses file systems.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from(DEFAULT_PATH));
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RelationshipRecord;

    fn sample() -> UserTable {
        let mut table = UserTable::new();
        let mut bo = RelationshipRecord::default();
        bo.following.insert("Ama".into());
        let mut ama = RelationshipRecord::default();
        ama.followers.insert("Bo".into());
        table.insert("Bo".into(), bo);
        table.insert("Ama".into(), ama);
        table
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_table(&dir.path().join("nope.json")).unwrap().is_none());
    }

    #[test]
    fn written_file_is_sorted_and_four_space_indented() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users_data.json");
        write_table(&path, &sample()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.find("\"Ama\"").unwrap() < text.find("\"Bo\"").unwrap());
        assert!(text.contains("\n    \"Ama\": {\n        \"following\": []"));
        assert_eq!(read_table(&path).unwrap(), Some(sample()));
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users_data.json");
        write_table(&path, &sample()).unwrap();
        assert!(!dir.path().join("users_data.json.tmp").exists());
    }

    #[test]
    fn garbage_is_corrupt_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users_data.json");
        fs::write(&path, "{ \"Bo\": { \"following\": 7 } }").unwrap();
        assert!(matches!(
            read_table(&path),
            Err(FollowError::CorruptData { .. })
        ));
    }

    #[test]
    fn invalid_utf8_is_corrupt_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users_data.json");
        fs::write(&path, b"{\"Bo\xff\": {}}").unwrap();
        assert!(matches!(
            read_table(&path),
            Err(FollowError::CorruptData { .. })
        ));
    }

    #[test]
    fn duplicate_keys_keep_the_last_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users_data.json");
        fs::write(
            &path,
            r#"{"Ama": {"following": ["Bo"]}, "Bo": {}, "Ama": {"followers": ["Bo"]}}"#,
        )
        .unwrap();
        let table = read_table(&path).unwrap().unwrap();
        assert_eq!(table.len(), 2);
        assert!(table["Ama"].following.is_empty());
        assert!(table["Ama"].followers.contains("Bo"));
    }

    #[test]
    fn unreadable_path_is_io_not_missing() {
        let dir = tempfile::tempdir().unwrap();
        // A directory exists but cannot be read as a file.
        assert!(matches!(
            read_table(dir.path()),
            Err(FollowError::Io { .. })
        ));
    }

    #[test]
    fn file_exists_reports_missing_and_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users_data.json");
        assert!(!file_exists(&path).unwrap());
        write_table(&path, &sample()).unwrap();
        assert!(file_exists(&path).unwrap());
    }

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("store.json");
        write_table(&path, &sample()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn backup_sits_next_to_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users_data.json");
        write_table(&path, &sample()).unwrap();
        let backup = create_backup(&path).unwrap();
        assert_eq!(backup, dir.path().join("users_data.json.bak"));
        assert!(backup.exists());
    }
}
