//! Aggregation of the three per-run auxiliary files into one [`RunData`]
//! value, with cross-file consistency checking and a bincode side-cache.
//!
//! The control file (fort.1), the thermodynamic log (fort.7), and the
//! trajectory (fort.8, .xyz layout) describe the same run and repeat some of
//! its metadata. Disagreements between them are reported as warnings and
//! recorded in the `consistent` flag rather than treated as errors: a run
//! with, say, a restarted step count is still usable data.

pub mod cache;

use crate::io::{Fort1, Fort7, Xyz};
use crate::ops::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Relative tolerance for numeric consistency comparisons.
const TOLERANCE: f64 = 1e-8;

/// Combined data of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunData {
    /// Parsed fort.1 control file.
    pub control: Fort1,
    /// Parsed fort.7 thermodynamic log.
    pub energy: Fort7,
    /// Parsed fort.8 trajectory.
    pub trajectory: Xyz,
    /// Whether every shared field agreed across the three files.
    pub consistent: bool,
}

impl RunData {
    /// Combines already-parsed parts, checking their shared fields.
    ///
    /// Each disagreement is logged as a warning naming the field and both
    /// values; the combined `consistent` flag reflects whether any fired.
    pub fn from_parts(control: Fort1, energy: Fort7, trajectory: Xyz) -> Self {
        let consistent = check_consistency(&control, &energy, &trajectory);
        Self {
            control,
            energy,
            trajectory,
            consistent,
        }
    }

    /// Reads and combines the three files from explicit paths.
    pub fn from_paths(
        fort1: impl AsRef<Path>,
        fort7: impl AsRef<Path>,
        fort8: impl AsRef<Path>,
        silent: bool,
    ) -> Result<Self, Error> {
        let control = crate::io::read_fort1_file(fort1, silent)?;
        let energy = crate::io::read_fort7_file(fort7, silent)?;
        let trajectory = crate::io::read_xyz_file(fort8, silent)?;
        Ok(Self::from_parts(control, energy, trajectory))
    }

    /// Reads a run from its directory, or from any one of its files.
    ///
    /// A directory is expected to contain `fort.1`, `fort.7`, and `fort.8`;
    /// a file path stands for its parent directory.
    pub fn load(path: impl AsRef<Path>, silent: bool) -> Result<Self, Error> {
        let dir = run_directory(path.as_ref())?;
        Self::from_paths(
            dir.join("fort.1"),
            dir.join("fort.7"),
            dir.join("fort.8"),
            silent,
        )
    }

    /// Like [`RunData::load`], but backed by the run's cache directory.
    ///
    /// A present cache snapshot is returned directly; otherwise the files are
    /// read and a snapshot is written for the next call.
    pub fn load_cached(path: impl AsRef<Path>, silent: bool) -> Result<Self, Error> {
        let dir = run_directory(path.as_ref())?;
        if let Some(run) = cache::load(&dir)? {
            log::info!("Loaded run data from cache in: {}", dir.display());
            return Ok(run);
        }
        let run = Self::load(&dir, silent)?;
        cache::save(&run, &dir, false)?;
        Ok(run)
    }
}

fn run_directory(path: &Path) -> Result<std::path::PathBuf, Error> {
    if path.is_dir() {
        Ok(path.to_path_buf())
    } else {
        path.parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .ok_or_else(|| {
                Error::inconsistent(format!(
                    "Cannot resolve a run directory from '{}'",
                    path.display()
                ))
            })
    }
}

/// Pairwise comparison of every field shared between two of the three files.
fn check_consistency(control: &Fort1, energy: &Fort7, trajectory: &Xyz) -> bool {
    let mut consistent = true;

    check_str(
        &mut consistent,
        "title",
        "fort.1",
        control.title.as_deref(),
        "fort.7",
        energy.title.as_deref(),
    );
    check_int(
        &mut consistent,
        "particle count",
        "fort.1",
        control.n_particles,
        "fort.7",
        energy.n_particles,
    );
    check_int(
        &mut consistent,
        "particle count",
        "fort.1",
        control.n_particles,
        "fort.8",
        Some(trajectory.n_particles),
    );
    check_int(
        &mut consistent,
        "particle count",
        "fort.7",
        energy.n_particles,
        "fort.8",
        Some(trajectory.n_particles),
    );
    check_float(
        &mut consistent,
        "cutoff",
        "fort.1",
        control.cutoff,
        "fort.7",
        energy.cutoff,
    );
    check_float(
        &mut consistent,
        "time step",
        "fort.1",
        control.dt,
        "fort.7",
        energy.dt,
    );
    check_int(
        &mut consistent,
        "step count",
        "fort.1",
        control.n_time_steps,
        "fort.7",
        energy.n_time_steps,
    );

    if let (Some(a), Some(b)) = (energy.box_size, trajectory.box_size) {
        let agree = a
            .iter()
            .zip(b.iter())
            .all(|(x, y)| close(*x, *y));
        if !agree {
            warn_mismatch(
                "box",
                "fort.7",
                format!("[{} {} {}]", a[0], a[1], a[2]),
                "fort.8",
                format!("[{} {} {}]", b[0], b[1], b[2]),
            );
            consistent = false;
        }
    }

    consistent
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() <= TOLERANCE * a.abs().max(b.abs()).max(1.0)
}

fn warn_mismatch(
    field: &str,
    a_source: &str,
    a: impl std::fmt::Display,
    b_source: &str,
    b: impl std::fmt::Display,
) {
    log::warn!("Run data disagrees on {field}: {a_source} has {a}, {b_source} has {b}");
}

fn check_str(
    consistent: &mut bool,
    field: &str,
    a_source: &str,
    a: Option<&str>,
    b_source: &str,
    b: Option<&str>,
) {
    if let (Some(a), Some(b)) = (a, b) {
        if a != b {
            warn_mismatch(field, a_source, a, b_source, b);
            *consistent = false;
        }
    }
}

fn check_int(
    consistent: &mut bool,
    field: &str,
    a_source: &str,
    a: Option<u64>,
    b_source: &str,
    b: Option<u64>,
) {
    if let (Some(a), Some(b)) = (a, b) {
        if a != b {
            warn_mismatch(field, a_source, a, b_source, b);
            *consistent = false;
        }
    }
}

fn check_float(
    consistent: &mut bool,
    field: &str,
    a_source: &str,
    a: Option<f64>,
    b_source: &str,
    b: Option<f64>,
) {
    if let (Some(a), Some(b)) = (a, b) {
        if !close(a, b) {
            warn_mismatch(field, a_source, a, b_source, b);
            *consistent = false;
        }
    }
}
