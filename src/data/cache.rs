//! Bincode side-cache for [`RunData`] snapshots.
//!
//! One snapshot per run directory, stored as `occam_cache/run.bin` inside it.
//! The cache is an optimization only: a missing or unreadable snapshot never
//! loses data, since the source files remain authoritative.

use super::RunData;
use crate::ops::Error;
use std::fs;
use std::path::{Path, PathBuf};

/// Cache directory created inside the run directory.
const CACHE_DIR: &str = "occam_cache";
/// Snapshot file inside the cache directory.
const CACHE_FILE: &str = "run.bin";

fn cache_path(run_dir: &Path) -> PathBuf {
    run_dir.join(CACHE_DIR).join(CACHE_FILE)
}

/// Writes a snapshot of the run into its cache directory.
///
/// # Arguments
///
/// * `run` - Data to snapshot.
/// * `run_dir` - The run directory; the cache directory is created inside.
/// * `overwrite` - Whether an existing snapshot may be replaced.
///
/// # Returns
///
/// `true` when a snapshot was written, `false` when one already existed and
/// `overwrite` was not set.
pub fn save(run: &RunData, run_dir: impl AsRef<Path>, overwrite: bool) -> Result<bool, Error> {
    let run_dir = run_dir.as_ref();
    let path = cache_path(run_dir);
    if path.exists() && !overwrite {
        return Ok(false);
    }

    let encoded = bincode::serialize(run)
        .map_err(|e| Error::inconsistent(format!("Cannot encode run data: {e}")))?;
    fs::create_dir_all(run_dir.join(CACHE_DIR))
        .map_err(|e| crate::io::Error::from_io(e, Some(run_dir.join(CACHE_DIR))))?;
    fs::write(&path, encoded).map_err(|e| crate::io::Error::from_io(e, Some(path.clone())))?;

    log::info!("Cached run data to file: {}", path.display());
    Ok(true)
}

/// Loads the run's snapshot, when one exists.
///
/// # Returns
///
/// `None` when the run directory carries no snapshot.
pub fn load(run_dir: impl AsRef<Path>) -> Result<Option<RunData>, Error> {
    let path = cache_path(run_dir.as_ref());
    if !path.exists() {
        return Ok(None);
    }

    let encoded = fs::read(&path).map_err(|e| crate::io::Error::from_io(e, Some(path.clone())))?;
    let run = bincode::deserialize(&encoded).map_err(|e| {
        Error::inconsistent(format!(
            "Cannot decode cache file {}: {e}",
            path.display()
        ))
    })?;
    Ok(Some(run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::tests::write_run;

    fn sample_run(dir: &Path) -> RunData {
        write_run(dir);
        RunData::load(dir, true).unwrap()
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let run = sample_run(dir.path());

        assert!(save(&run, dir.path(), false).unwrap());
        let loaded = load(dir.path()).unwrap().expect("snapshot present");

        assert_eq!(loaded, run);
    }

    #[test]
    fn save_without_overwrite_keeps_existing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let run = sample_run(dir.path());
        assert!(save(&run, dir.path(), false).unwrap());

        let mut modified = run.clone();
        modified.consistent = !modified.consistent;

        assert!(!save(&modified, dir.path(), false).unwrap());
        assert_eq!(load(dir.path()).unwrap().unwrap(), run);

        assert!(save(&modified, dir.path(), true).unwrap());
        assert_eq!(load(dir.path()).unwrap().unwrap(), modified);
    }

    #[test]
    fn load_returns_none_without_a_snapshot() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(load(dir.path()).unwrap(), None);
    }

    #[test]
    fn load_rejects_corrupt_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join(CACHE_DIR)).unwrap();
        std::fs::write(cache_path(dir.path()), b"not bincode").unwrap();

        let err = load(dir.path()).unwrap_err();

        assert!(matches!(err, Error::Inconsistent { .. }));
    }

    #[test]
    fn load_cached_populates_and_reuses_the_cache() {
        let dir = tempfile::tempdir().unwrap();
        write_run(dir.path());

        let first = RunData::load_cached(dir.path(), true).unwrap();
        assert!(cache_path(dir.path()).exists());

        // Source files are gone; the second load must come from the cache.
        std::fs::remove_file(dir.path().join("fort.1")).unwrap();
        let second = RunData::load_cached(dir.path(), true).unwrap();

        assert_eq!(second, first);
    }
}
