use std::fs;
use std::path::{Path, PathBuf};
use chrono::NaiveDateTime;
use glob::{glob, Pattern};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use crate::errors::SnapshotError;
use crate::models::snapshot::FetchMetadata;

/// Length of the timestamp prefix of archived snapshot file names, e.g. 20250601_0600
const ARCHIVE_STAMP_LEN: usize = 13;

/// Glob matching the timestamp prefix of archived snapshot file names
const ARCHIVE_STAMP_GLOB: &str = "[0-9][0-9][0-9][0-9][0-9][0-9][0-9][0-9]_[0-9][0-9][0-9][0-9]";

/// Read access to the snapshots written by the fetch job.
///
/// The fetch job writes every snapshot twice: once as `latest_<name>.json` in the data
/// directory and once as `archive/<YYYYMMDD_HHMM>_<name>.json`.
pub struct SnapshotStore {
    data_dir: PathBuf,
}

impl SnapshotStore {
    /// Returns a new SnapshotStore
    ///
    /// # Arguments
    ///
    /// * 'data_dir' - the directory the fetch job writes to
    pub fn new(data_dir: &str) -> SnapshotStore {
        SnapshotStore { data_dir: PathBuf::from(data_dir) }
    }

    /// Returns the path of the most recent snapshot with the given name. The latest file
    /// is preferred, if it is missing the newest archived snapshot is used.
    ///
    /// # Arguments
    ///
    /// * 'name' - snapshot name, e.g. weather
    pub fn latest_path(&self, name: &str) -> Result<PathBuf, SnapshotError> {
        let latest = self.data_dir.join(format!("latest_{}.json", name));
        if latest.is_file() {
            return Ok(latest);
        }

        debug!("{} not found, looking in archive", latest.display());
        self.archived(name)?
            .pop()
            .map(|(_, path)| path)
            .ok_or_else(|| SnapshotError::NotFound { dir: self.data_dir.clone(), name: name.to_string() })
    }

    /// Returns archived snapshots with the given name ordered by the time encoded in their
    /// file names, oldest first. Files with a malformed time stamp are skipped.
    ///
    /// # Arguments
    ///
    /// * 'name' - snapshot name
    pub fn archived(&self, name: &str) -> Result<Vec<(NaiveDateTime, PathBuf)>, SnapshotError> {
        let archive_dir = self.data_dir.join("archive");
        let pattern = format!(
            "{}/{}_{}.json",
            Pattern::escape(&archive_dir.to_string_lossy()),
            ARCHIVE_STAMP_GLOB,
            Pattern::escape(name)
        );

        let mut entries: Vec<(NaiveDateTime, PathBuf)> = Vec::new();
        for entry in glob(&pattern)? {
            match entry {
                Ok(path) => match archive_time(&path, name) {
                    Some(time) => entries.push((time, path)),
                    None => warn!("skipping archived snapshot with malformed name: {}", path.display()),
                },
                Err(e) => warn!("{:?}", e),
            }
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(entries)
    }

    /// Loads and deserializes the most recent snapshot with the given name
    ///
    /// # Arguments
    ///
    /// * 'name' - snapshot name
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<(PathBuf, T), SnapshotError> {
        let path = self.latest_path(name)?;
        let document = read_json(&path)?;

        Ok((path, document))
    }

    /// Loads the fetch job's metadata if there is any. A missing or broken metadata file is
    /// only logged, the dashboard can do without it.
    ///
    /// # Arguments
    ///
    /// * 'name' - metadata name, e.g. metadata
    pub fn load_metadata(&self, name: &str) -> Option<FetchMetadata> {
        let path = self.data_dir.join(format!("latest_{}.json", name));
        if !path.is_file() {
            debug!("no fetch metadata at {}", path.display());
            return None;
        }

        read_json(&path)
            .map_err(|e| warn!("ignoring fetch metadata: {}", e))
            .ok()
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SnapshotError> {
    let json = fs::read_to_string(path).map_err(|e| SnapshotError::Read(path.to_path_buf(), e))?;

    serde_json::from_str(&json).map_err(|e| SnapshotError::Document(path.to_path_buf(), e))
}

/// Returns the time encoded in an archived snapshot's file name
///
/// # Arguments
///
/// * 'path' - path to the archived snapshot
/// * 'name' - snapshot name the file must carry after the stamp
fn archive_time(path: &Path, name: &str) -> Option<NaiveDateTime> {
    let file_name = path.file_name()?.to_str()?;
    let stamp = file_name.get(0..ARCHIVE_STAMP_LEN)?;
    if file_name.get(ARCHIVE_STAMP_LEN..)? != format!("_{}.json", name) {
        return None;
    }

    NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::snapshot::PrimarySnapshot;

    fn write(dir: &Path, file: &str, content: &str) {
        let path = dir.join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn prefers_latest_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "latest_weather.json", r#"{"last_updated": "latest"}"#);
        write(dir.path(), "archive/20250601_0600_weather.json", r#"{"last_updated": "archived"}"#);
        let store = SnapshotStore::new(dir.path().to_str().unwrap());

        let (path, snapshot): (PathBuf, PrimarySnapshot) = store.load("weather").unwrap();

        assert!(path.ends_with("latest_weather.json"));
        assert_eq!(snapshot.last_updated.as_deref(), Some("latest"));
    }

    #[test]
    fn falls_back_to_newest_archived() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "archive/20250601_1800_weather.json", r#"{"last_updated": "evening"}"#);
        write(dir.path(), "archive/20250601_0600_weather.json", r#"{"last_updated": "morning"}"#);
        write(dir.path(), "archive/20250602_0000_open_meteo.json", r#"{}"#);
        write(dir.path(), "archive/backup_weather.json", r#"{}"#);
        let store = SnapshotStore::new(dir.path().to_str().unwrap());

        let archived = store.archived("weather").unwrap();
        let (_, snapshot): (PathBuf, PrimarySnapshot) = store.load("weather").unwrap();

        assert_eq!(archived.len(), 2);
        assert_eq!(snapshot.last_updated.as_deref(), Some("evening"));
    }

    #[test]
    fn archive_does_not_match_longer_names() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "archive/20250601_1800_open_meteo.json", r#"{"last_updated": "open"}"#);
        write(dir.path(), "archive/20250601_0600_meteo.json", r#"{"last_updated": "meteo"}"#);
        let store = SnapshotStore::new(dir.path().to_str().unwrap());

        let archived = store.archived("meteo").unwrap();
        let (_, snapshot): (PathBuf, PrimarySnapshot) = store.load("meteo").unwrap();

        assert_eq!(archived.len(), 1);
        assert!(archived[0].1.ends_with("20250601_0600_meteo.json"));
        assert_eq!(snapshot.last_updated.as_deref(), Some("meteo"));
    }

    #[test]
    fn missing_and_broken_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().to_str().unwrap());

        assert!(matches!(store.load::<PrimarySnapshot>("weather"), Err(SnapshotError::NotFound { .. })));

        write(dir.path(), "latest_weather.json", "{ not json");
        assert!(matches!(store.load::<PrimarySnapshot>("weather"), Err(SnapshotError::Document(..))));
    }

    #[test]
    fn metadata_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path().to_str().unwrap());

        assert!(store.load_metadata("metadata").is_none());

        write(dir.path(), "latest_metadata.json", r#"{"last_update": "2025-06-01T06:00:00", "source": "Open-Meteo API", "status": "success"}"#);
        let metadata = store.load_metadata("metadata").unwrap();
        assert_eq!(metadata.status.as_deref(), Some("success"));
        assert_eq!(metadata.error_message, None);

        write(dir.path(), "latest_metadata.json", "[]");
        assert!(store.load_metadata("metadata").is_none());
    }
}
