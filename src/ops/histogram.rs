//! Numeric reductions over trajectories: axis histograms and the radial
//! distribution function.
//!
//! Both reductions pool every frame of the trajectory. The pair loop of the
//! radial distribution function is a pure per-frame reduction, so it runs
//! through the `utils::parallel` shim: each frame produces its own bin counts
//! which are then merged serially.

use crate::io::Xyz;
use crate::ops::error::Error;
use crate::utils::parallel::*;

/// Coordinate axis selector for [`histogram`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Per-frame coordinate arrays of this axis.
    fn frames<'a>(&self, xyz: &'a Xyz) -> &'a [Vec<f64>] {
        match self {
            Axis::X => &xyz.x,
            Axis::Y => &xyz.y,
            Axis::Z => &xyz.z,
        }
    }

    /// Index of this axis in a box triple.
    fn index(&self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Binned coordinate counts along one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Bin edges, `bins + 1` values from the range start to its end.
    pub edges: Vec<f64>,
    /// Pooled counts per bin, over all frames.
    pub counts: Vec<u64>,
}

/// Bins every coordinate of the trajectory along one axis.
///
/// The bin range is `[0, box extent]` along the chosen axis when the
/// trajectory carries a box, and the data's min/max otherwise.
///
/// # Arguments
///
/// * `xyz` - Trajectory to reduce; all frames contribute.
/// * `axis` - Coordinate axis to bin.
/// * `bins` - Number of bins; must be nonzero.
///
/// # Errors
///
/// Returns [`Error::Inconsistent`] for zero bins or for a boxless trajectory
/// with no coordinate data to infer a range from.
pub fn histogram(xyz: &Xyz, axis: Axis, bins: usize) -> Result<Histogram, Error> {
    if bins == 0 {
        return Err(Error::inconsistent("Histogram needs at least one bin"));
    }
    let frames = axis.frames(xyz);

    let (low, high) = match xyz.box_size {
        Some(box_size) => (0.0, box_size[axis.index()]),
        None => data_range(frames)?,
    };
    let width = (high - low) / bins as f64;
    if width <= 0.0 {
        return Err(Error::inconsistent(format!(
            "Degenerate histogram range [{low}, {high}]"
        )));
    }

    let mut counts = vec![0u64; bins];
    for frame in frames {
        for &value in frame {
            counts[bin_index(value, low, width, bins)] += 1;
        }
    }

    let edges = (0..=bins).map(|k| low + k as f64 * width).collect();
    Ok(Histogram { edges, counts })
}

fn data_range(frames: &[Vec<f64>]) -> Result<(f64, f64), Error> {
    let mut low = f64::INFINITY;
    let mut high = f64::NEG_INFINITY;
    for frame in frames {
        for &value in frame {
            low = low.min(value);
            high = high.max(value);
        }
    }
    if low > high {
        return Err(Error::inconsistent(
            "Cannot infer a histogram range from an empty trajectory without a box",
        ));
    }
    Ok((low, high))
}

/// Maps a value to its bin, clamping the top edge into the last bin.
fn bin_index(value: f64, low: f64, width: f64, bins: usize) -> usize {
    let k = ((value - low) / width).floor();
    (k.max(0.0) as usize).min(bins - 1)
}

/// Radial distribution function estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialDistribution {
    /// Bin-center distances.
    pub r: Vec<f64>,
    /// Pair density relative to an ideal gas at the same number density.
    pub g: Vec<f64>,
}

/// Computes the radial distribution function over all frames.
///
/// Pair distances use the minimum-image convention in the trajectory's box;
/// counts are normalized per frame against the expected pair count of an
/// ideal gas in each spherical shell, so a structureless system tends to 1.
///
/// # Arguments
///
/// * `xyz` - Trajectory to reduce; must carry a box.
/// * `bins` - Number of distance bins; must be nonzero.
/// * `r_max` - Largest distance binned; `None` uses half the smallest box
///   extent, the largest radius free of minimum-image artifacts.
///
/// # Errors
///
/// Returns [`Error::Inconsistent`] for zero bins, a missing box, a
/// non-positive `r_max`, or a trajectory with fewer than two particles.
pub fn radial_distribution(
    xyz: &Xyz,
    bins: usize,
    r_max: Option<f64>,
) -> Result<RadialDistribution, Error> {
    if bins == 0 {
        return Err(Error::inconsistent(
            "Radial distribution needs at least one bin",
        ));
    }
    let box_size = xyz.box_size.ok_or_else(|| {
        Error::inconsistent("Radial distribution needs a box; the trajectory carries none")
    })?;
    let n = xyz.n_particles as usize;
    if n < 2 {
        return Err(Error::inconsistent(
            "Radial distribution needs at least two particles",
        ));
    }

    let smallest_extent = box_size[0].min(box_size[1]).min(box_size[2]);
    let r_max = r_max.unwrap_or(smallest_extent / 2.0);
    if r_max <= 0.0 {
        return Err(Error::inconsistent(format!(
            "Radial distribution cutoff must be positive, got {r_max}"
        )));
    }
    let dr = r_max / bins as f64;

    let n_frames = xyz.n_frames();
    let frame_counts: Vec<Vec<u64>> = (0..n_frames)
        .into_par_iter()
        .map(|frame| {
            let mut counts = vec![0u64; bins];
            let (x, y, z) = (&xyz.x[frame], &xyz.y[frame], &xyz.z[frame]);
            for i in 0..n {
                for j in (i + 1)..n {
                    let distance = minimum_image_distance(
                        [x[i], y[i], z[i]],
                        [x[j], y[j], z[j]],
                        box_size,
                    );
                    if distance < r_max {
                        counts[bin_index(distance, 0.0, dr, bins)] += 1;
                    }
                }
            }
            counts
        })
        .collect();

    let mut counts = vec![0u64; bins];
    for frame in &frame_counts {
        for (total, &count) in counts.iter_mut().zip(frame) {
            *total += count;
        }
    }

    // Expected pairs per frame in shell k for an ideal gas at the same
    // number density: n(n-1)/2 * shell_volume / box_volume.
    let volume = box_size[0] * box_size[1] * box_size[2];
    let pair_density = (n * (n - 1)) as f64 / 2.0 / volume;
    let mut r = Vec::with_capacity(bins);
    let mut g = Vec::with_capacity(bins);
    for (k, &count) in counts.iter().enumerate() {
        let r_in = k as f64 * dr;
        let r_out = r_in + dr;
        let shell = 4.0 / 3.0 * std::f64::consts::PI * (r_out.powi(3) - r_in.powi(3));
        let expected = pair_density * shell * n_frames as f64;
        r.push(r_in + 0.5 * dr);
        g.push(count as f64 / expected);
    }

    Ok(RadialDistribution { r, g })
}

fn minimum_image_distance(a: [f64; 3], b: [f64; 3], box_size: [f64; 3]) -> f64 {
    let mut sum = 0.0;
    for axis in 0..3 {
        let mut d = b[axis] - a[axis];
        d -= box_size[axis] * (d / box_size[axis]).round();
        sum += d * d;
    }
    sum.sqrt()
}
