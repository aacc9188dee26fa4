//! Initial-configuration generators producing fort.5 files.
//!
//! Two placement schemes are provided: uniform-random placement inside the
//! box (optionally relaxed so no two particles sit closer than a threshold)
//! and an FCC lattice. All generators return the number of particles written.

use crate::ops::error::Error;
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

/// Particle label written by the generators.
const LABEL: &str = "Ar";

/// Tuning for the relaxed uniform generator.
#[derive(Debug, Clone, Copy)]
pub struct StableOptions {
    /// Maximum number of resampling rounds before giving up.
    pub max_iter: usize,
    /// Minimum allowed distance between any two particles.
    pub threshold: f64,
}

impl Default for StableOptions {
    fn default() -> Self {
        Self {
            max_iter: 1000,
            threshold: 0.2,
        }
    }
}

/// Resolves a generator output path; directories get a `fort.5` file inside.
fn resolve_output(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join("fort.5")
    } else {
        path.to_path_buf()
    }
}

fn check_box(box_size: [f64; 3]) -> Result<(), Error> {
    if box_size.iter().any(|&extent| extent <= 0.0) {
        return Err(Error::inconsistent(format!(
            "Box extents must be positive, got [{} {} {}]",
            box_size[0], box_size[1], box_size[2]
        )));
    }
    Ok(())
}

fn sample_point<R: Rng>(rng: &mut R, box_size: [f64; 3]) -> [f64; 3] {
    [
        rng.gen_range(0.0..box_size[0]),
        rng.gen_range(0.0..box_size[1]),
        rng.gen_range(0.0..box_size[2]),
    ]
}

fn write_configuration(
    path: &Path,
    box_size: [f64; 3],
    positions: &[[f64; 3]],
    velocity: bool,
) -> Result<(), Error> {
    let output = resolve_output(path);
    let mut buffer = Vec::new();
    let mut writer = crate::io::Fort5Writer::new(&mut buffer);

    writer.write_box(box_size, 0.0)?;
    writer.write_particle_count(positions.len())?;
    for (index, position) in positions.iter().enumerate() {
        writer.write_molecule(index + 1, LABEL, *position, velocity)?;
    }
    fs::write(&output, buffer)
        .map_err(|e| crate::io::Error::from_io(e, Some(output.clone())))?;

    log::info!(
        "Wrote {} particles to file: {}",
        positions.len(),
        output.display()
    );
    Ok(())
}

/// Writes a uniform-random configuration using the thread-local RNG.
///
/// See [`generate_uniform_with`].
pub fn generate_uniform(
    path: impl AsRef<Path>,
    n_particles: usize,
    box_size: [f64; 3],
) -> Result<usize, Error> {
    generate_uniform_with(path, n_particles, box_size, &mut rand::thread_rng())
}

/// Writes a uniform-random configuration drawn from the given RNG.
///
/// # Arguments
///
/// * `path` - Output file, or a directory that receives a `fort.5`.
/// * `n_particles` - Number of particles to place.
/// * `box_size` - Box extents; placement covers `[0, extent)` per axis.
/// * `rng` - Random source for the coordinates.
///
/// # Returns
///
/// The number of particles written.
pub fn generate_uniform_with<R: Rng>(
    path: impl AsRef<Path>,
    n_particles: usize,
    box_size: [f64; 3],
    rng: &mut R,
) -> Result<usize, Error> {
    check_box(box_size)?;
    let positions: Vec<[f64; 3]> = (0..n_particles)
        .map(|_| sample_point(rng, box_size))
        .collect();

    write_configuration(path.as_ref(), box_size, &positions, false)?;
    Ok(n_particles)
}

/// Writes a relaxed uniform-random configuration using the thread-local RNG.
///
/// See [`generate_uniform_stable_with`].
pub fn generate_uniform_stable(
    path: impl AsRef<Path>,
    n_particles: usize,
    box_size: [f64; 3],
    options: StableOptions,
) -> Result<usize, Error> {
    generate_uniform_stable_with(path, n_particles, box_size, options, &mut rand::thread_rng())
}

/// Writes a uniform-random configuration with a minimum pair distance.
///
/// Placement starts uniform, then any particle closer than
/// [`StableOptions::threshold`] to an earlier one is resampled; rounds repeat
/// until every distinct pair clears the threshold.
///
/// # Errors
///
/// Returns [`Error::Inconsistent`] when no clearing configuration is found
/// within [`StableOptions::max_iter`] rounds, which is expected when the
/// requested density leaves no room for the threshold.
pub fn generate_uniform_stable_with<R: Rng>(
    path: impl AsRef<Path>,
    n_particles: usize,
    box_size: [f64; 3],
    options: StableOptions,
    rng: &mut R,
) -> Result<usize, Error> {
    check_box(box_size)?;
    let positions = place_stable(rng, n_particles, box_size, options)?;

    write_configuration(path.as_ref(), box_size, &positions, false)?;
    Ok(n_particles)
}

fn place_stable<R: Rng>(
    rng: &mut R,
    n_particles: usize,
    box_size: [f64; 3],
    options: StableOptions,
) -> Result<Vec<[f64; 3]>, Error> {
    let mut positions: Vec<[f64; 3]> = (0..n_particles)
        .map(|_| sample_point(rng, box_size))
        .collect();
    let threshold_sq = options.threshold * options.threshold;

    for _ in 0..options.max_iter {
        let mut resampled = false;
        for i in 0..n_particles {
            for j in (i + 1)..n_particles {
                if distance_sq(positions[i], positions[j]) < threshold_sq {
                    positions[j] = sample_point(rng, box_size);
                    resampled = true;
                }
            }
        }
        if !resampled {
            return Ok(positions);
        }
    }

    Err(Error::inconsistent(format!(
        "Unable to place {n_particles} particles with minimum distance {} in {} rounds",
        options.threshold, options.max_iter
    )))
}

fn distance_sq(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let dz = b[2] - a[2];
    dx * dx + dy * dy + dz * dz
}

/// Writes an FCC lattice configuration.
///
/// Each unit cell carries four particles at basis offsets
/// `0.5·b·{(0,0,0), (1,1,0), (0,1,1), (1,0,1)}`; the box is the lattice
/// constant times the cell counts.
///
/// # Arguments
///
/// * `path` - Output file, or a directory that receives a `fort.5`.
/// * `cells` - Unit-cell counts along the three axes; all must be nonzero.
/// * `lattice_constant` - Unit-cell edge length.
/// * `velocity` - Whether to emit zero velocity columns.
///
/// # Returns
///
/// The number of particles written, `4 * cells[0] * cells[1] * cells[2]`.
pub fn generate_fcc(
    path: impl AsRef<Path>,
    cells: [u32; 3],
    lattice_constant: f64,
    velocity: bool,
) -> Result<usize, Error> {
    if cells.iter().any(|&c| c == 0) {
        return Err(Error::inconsistent(format!(
            "Cell counts must be positive, got [{} {} {}]",
            cells[0], cells[1], cells[2]
        )));
    }
    let box_size = [
        lattice_constant * f64::from(cells[0]),
        lattice_constant * f64::from(cells[1]),
        lattice_constant * f64::from(cells[2]),
    ];
    check_box(box_size)?;

    const BASIS: [[f64; 3]; 4] = [
        [0.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 1.0],
        [1.0, 0.0, 1.0],
    ];

    let n_particles = 4 * cells.iter().map(|&c| c as usize).product::<usize>();
    let mut positions = Vec::with_capacity(n_particles);
    for i in 0..cells[0] {
        for j in 0..cells[1] {
            for k in 0..cells[2] {
                let origin = [
                    lattice_constant * f64::from(i),
                    lattice_constant * f64::from(j),
                    lattice_constant * f64::from(k),
                ];
                for basis in &BASIS {
                    positions.push([
                        origin[0] + 0.5 * lattice_constant * basis[0],
                        origin[1] + 0.5 * lattice_constant * basis[1],
                        origin[2] + 0.5 * lattice_constant * basis[2],
                    ]);
                }
            }
        }
    }

    write_configuration(path.as_ref(), box_size, &positions, velocity)?;
    Ok(n_particles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn in_box(position: [f64; 3], box_size: [f64; 3]) -> bool {
        position
            .iter()
            .zip(box_size.iter())
            .all(|(&x, &extent)| (0.0..=extent).contains(&x))
    }

    #[test]
    fn generate_uniform_places_all_particles_inside_the_box() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fort.5");
        let box_size = [5.0, 4.0, 3.0];
        let mut rng = StdRng::seed_from_u64(7);

        let count = generate_uniform_with(&path, 32, box_size, &mut rng).unwrap();

        assert_eq!(count, 32);
        let fort5 = crate::io::read_fort5_file(&path).unwrap();
        assert_eq!(fort5.box_size, box_size);
        assert_eq!(fort5.particles.len(), 32);
        for particle in &fort5.particles {
            assert!(in_box(particle.position, box_size));
            assert_eq!(particle.label, LABEL);
        }
    }

    #[test]
    fn generate_uniform_resolves_directory_to_fort5() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        generate_uniform_with(dir.path(), 4, [2.0, 2.0, 2.0], &mut rng).unwrap();

        assert!(dir.path().join("fort.5").exists());
    }

    #[test]
    fn generate_uniform_rejects_degenerate_box() {
        let dir = tempfile::tempdir().unwrap();

        let err =
            generate_uniform(dir.path().join("fort.5"), 4, [2.0, 0.0, 2.0]).unwrap_err();

        assert!(matches!(err, Error::Inconsistent { .. }));
    }

    #[test]
    fn generate_uniform_stable_clears_the_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fort.5");
        let box_size = [10.0, 10.0, 10.0];
        let options = StableOptions::default();
        let mut rng = StdRng::seed_from_u64(11);

        let count =
            generate_uniform_stable_with(&path, 20, box_size, options, &mut rng).unwrap();

        assert_eq!(count, 20);
        let fort5 = crate::io::read_fort5_file(&path).unwrap();
        let threshold_sq = options.threshold * options.threshold;
        for i in 0..fort5.particles.len() {
            for j in (i + 1)..fort5.particles.len() {
                let d = distance_sq(fort5.particles[i].position, fort5.particles[j].position);
                assert!(d >= threshold_sq, "pair ({i}, {j}) too close: {d}");
            }
        }
    }

    #[test]
    fn generate_uniform_stable_fails_when_density_is_impossible() {
        let dir = tempfile::tempdir().unwrap();
        let options = StableOptions {
            max_iter: 5,
            threshold: 10.0,
        };
        let mut rng = StdRng::seed_from_u64(13);

        let err = generate_uniform_stable_with(
            dir.path().join("fort.5"),
            50,
            [1.0, 1.0, 1.0],
            options,
            &mut rng,
        )
        .unwrap_err();

        assert!(err.to_string().contains("5 rounds"));
        assert!(!dir.path().join("fort.5").exists());
    }

    #[test]
    fn generate_fcc_writes_four_particles_per_cell() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fort.5");

        let count = generate_fcc(&path, [2, 3, 4], 1.5, false).unwrap();

        assert_eq!(count, 4 * 2 * 3 * 4);
        let fort5 = crate::io::read_fort5_file(&path).unwrap();
        assert_eq!(fort5.particles.len(), count);
        assert_eq!(fort5.box_size, [3.0, 4.5, 6.0]);
        for particle in &fort5.particles {
            assert!(in_box(particle.position, fort5.box_size));
        }
    }

    #[test]
    fn generate_fcc_first_cell_matches_basis() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fort.5");

        generate_fcc(&path, [1, 1, 1], 2.0, false).unwrap();

        let fort5 = crate::io::read_fort5_file(&path).unwrap();
        assert_eq!(fort5.particles[0].position, [0.0, 0.0, 0.0]);
        assert_eq!(fort5.particles[1].position, [1.0, 1.0, 0.0]);
        assert_eq!(fort5.particles[2].position, [0.0, 1.0, 1.0]);
        assert_eq!(fort5.particles[3].position, [1.0, 0.0, 1.0]);
    }

    #[test]
    fn generate_fcc_rejects_zero_cell_counts() {
        let dir = tempfile::tempdir().unwrap();

        let err = generate_fcc(dir.path().join("fort.5"), [2, 0, 2], 1.0, false).unwrap_err();

        assert!(matches!(err, Error::Inconsistent { .. }));
    }
}
