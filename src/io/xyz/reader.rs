//! Parses xyz trajectory files into [`Xyz`] instances.
//!
//! Each frame consists of a particle-count line, a comment line, and one
//! `<label> <x> <y> <z>` line per particle. The comment line of the first
//! frame is probed for simulation metadata: four floats are read as time plus
//! box, three floats as box only, and anything else leaves the comment format
//! unrecognized (times stay zero). Frames are read until end of input, so a
//! file with a trailing partial frame is rejected rather than miscounted.
//!
//! Particle type labels map to indices by first appearance in the first
//! frame, in the order the particles are listed.

use crate::io::error::Error;
use crate::io::progress::open_with_progress;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

/// Identifier used in diagnostics to reference the xyz format.
const FORMAT: &str = "xyz";

/// Typed view of an xyz trajectory.
///
/// Coordinates are stored per frame, per particle; the outer index of `x`,
/// `y`, and `z` is the frame, the inner index the particle, matching the
/// particle order of `type_indices`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Xyz {
    /// Particle count shared by every frame.
    pub n_particles: u64,
    /// Whether the first comment line matched a recognized metadata layout.
    pub comment_format_known: bool,
    /// Box dimensions from the first comment line, when present.
    pub box_size: Option<[f64; 3]>,
    /// Per-frame simulation time; zero when the comment format is unknown.
    pub time: Vec<f64>,
    pub x: Vec<Vec<f64>>,
    pub y: Vec<Vec<f64>>,
    pub z: Vec<Vec<f64>>,
    /// Per-particle type index, assigned by first appearance.
    pub type_indices: Vec<u64>,
    /// Label-to-index mapping backing `type_indices`.
    pub type_dict: HashMap<SmolStr, u64>,
}

impl Xyz {
    /// Number of frames read from the trajectory.
    pub fn n_frames(&self) -> usize {
        self.time.len()
    }
}

/// Reads an xyz trajectory from a path.
///
/// A progress bar tracks the read unless `silent` is set.
pub fn read_file(path: impl AsRef<Path>, silent: bool) -> Result<Xyz, Error> {
    let path = path.as_ref();
    log::info!("Loading xyz data from file: {}", path.display());
    let reader = open_with_progress(path, silent)?;
    read(reader).map_err(|e| e.with_path(path.to_path_buf()))
}

/// Reads an xyz trajectory from any buffered reader.
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed count lines, particle lines with
/// fewer than four fields, coordinates that fail float conversion, or a
/// truncated final frame, and [`Error::InconsistentData`] when a later frame
/// declares a different particle count than the first.
pub fn read<R: BufRead>(reader: R) -> Result<Xyz, Error> {
    let mut lines = reader.lines().enumerate();
    let mut xyz = Xyz::default();

    let Some(first) = next_line(&mut lines)? else {
        return Err(Error::parse(FORMAT, None, 1, "Empty xyz file"));
    };
    xyz.n_particles = parse_count(&first.1, first.0)?;

    let mut first_frame = true;
    loop {
        let comment = expect_line(&mut lines, "comment line")?;
        if first_frame {
            xyz.comment_format_known = parse_first_comment(&mut xyz, &comment.1);
        } else if xyz.comment_format_known {
            // Subsequent comments carry the frame time in the first field.
            let token = comment.1.split_whitespace().next().unwrap_or("");
            let time = parse_float(token, "frame time", comment.0 + 1)?;
            xyz.time.push(time);
        } else {
            xyz.time.push(0.0);
        }

        read_frame_particles(&mut xyz, &mut lines, first_frame)?;
        first_frame = false;

        // Next frame starts with its own count line, or the file ends here.
        match next_line(&mut lines)? {
            None => break,
            Some((idx, line)) => {
                if line.trim().is_empty() {
                    // Tolerate trailing blank lines at end of input only.
                    drain_blank_lines(&mut lines)?;
                    break;
                }
                let count = parse_count(&line, idx)?;
                if count != xyz.n_particles {
                    return Err(Error::inconsistent_data(
                        FORMAT,
                        None,
                        format!(
                            "Frame declares {count} particles but the first frame has {}",
                            xyz.n_particles
                        ),
                    ));
                }
            }
        }
    }

    Ok(xyz)
}

fn next_line<I>(lines: &mut I) -> Result<Option<(usize, String)>, Error>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    match lines.next() {
        Some((idx, line)) => {
            let line = line.map_err(|e| Error::from_io(e, None))?;
            Ok(Some((idx, line)))
        }
        None => Ok(None),
    }
}

fn expect_line<I>(lines: &mut I, what: &str) -> Result<(usize, String), Error>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    next_line(lines)?.ok_or_else(|| {
        Error::parse(
            FORMAT,
            None,
            0,
            format!("Unexpected end of file, expected {what}"),
        )
    })
}

fn drain_blank_lines<I>(lines: &mut I) -> Result<(), Error>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    while let Some((idx, line)) = next_line(lines)? {
        if !line.trim().is_empty() {
            return Err(Error::parse(
                FORMAT,
                None,
                idx + 1,
                format!("Unexpected content after the last frame: '{}'", line.trim()),
            ));
        }
    }
    Ok(())
}

fn parse_count(line: &str, idx: usize) -> Result<u64, Error> {
    line.trim().parse::<u64>().map_err(|_| {
        Error::parse(
            FORMAT,
            None,
            idx + 1,
            format!("Invalid particle count '{}'", line.trim()),
        )
    })
}

fn parse_float(token: &str, what: &str, line_number: usize) -> Result<f64, Error> {
    token.parse::<f64>().map_err(|_| {
        Error::parse(
            FORMAT,
            None,
            line_number,
            format!("Invalid {what} '{token}'"),
        )
    })
}

/// Probes the first comment line for time and box metadata.
///
/// Returns whether the layout was recognized; on success the frame time (or
/// zero) is pushed and the box recorded.
fn parse_first_comment(xyz: &mut Xyz, line: &str) -> bool {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let floats: Option<Vec<f64>> = tokens.iter().map(|t| t.parse::<f64>().ok()).collect();

    match floats {
        Some(values) if values.len() == 4 => {
            xyz.time.push(values[0]);
            xyz.box_size = Some([values[1], values[2], values[3]]);
            true
        }
        Some(values) if values.len() == 3 => {
            xyz.time.push(0.0);
            xyz.box_size = Some([values[0], values[1], values[2]]);
            true
        }
        _ => {
            xyz.time.push(0.0);
            false
        }
    }
}

fn read_frame_particles(
    xyz: &mut Xyz,
    lines: &mut impl Iterator<Item = (usize, std::io::Result<String>)>,
    first_frame: bool,
) -> Result<(), Error> {
    let n = xyz.n_particles as usize;
    let mut frame_x = Vec::with_capacity(n);
    let mut frame_y = Vec::with_capacity(n);
    let mut frame_z = Vec::with_capacity(n);

    for _ in 0..n {
        let (idx, line) = expect_line(lines, "particle line")?;
        let line_number = idx + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(Error::parse(
                FORMAT,
                None,
                line_number,
                format!("Particle line must have 4 fields, got {}", tokens.len()),
            ));
        }

        if first_frame {
            let label = SmolStr::new(tokens[0]);
            let next_index = xyz.type_dict.len() as u64;
            let index = *xyz.type_dict.entry(label).or_insert(next_index);
            xyz.type_indices.push(index);
        }

        frame_x.push(parse_float(tokens[1], "x coordinate", line_number)?);
        frame_y.push(parse_float(tokens[2], "y coordinate", line_number)?);
        frame_z.push(parse_float(tokens[3], "z coordinate", line_number)?);
    }

    xyz.x.push(frame_x);
    xyz.y.push(frame_y);
    xyz.z.push(frame_z);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "\
3
0.0 10.0 10.0 12.0
O 1.0 2.0 3.0
H 1.5 2.0 3.0
O 4.0 5.0 6.0
3
0.3 10.0 10.0 12.0
O 1.1 2.1 3.1
H 1.6 2.1 3.1
O 4.1 5.1 6.1
";

    #[test]
    fn read_counts_frames_until_end_of_input() {
        let xyz = read(EXAMPLE.as_bytes()).expect("example parses");

        assert_eq!(xyz.n_particles, 3);
        assert_eq!(xyz.n_frames(), 2);
        assert_eq!(xyz.time, vec![0.0, 0.3]);
        assert_eq!(xyz.box_size, Some([10.0, 10.0, 12.0]));
        assert!(xyz.comment_format_known);
        assert_eq!(xyz.x[1], vec![1.1, 1.6, 4.1]);
        assert_eq!(xyz.z[0], vec![3.0, 3.0, 6.0]);
    }

    #[test]
    fn read_assigns_type_indices_by_first_appearance() {
        let xyz = read(EXAMPLE.as_bytes()).unwrap();

        assert_eq!(xyz.type_indices, vec![0, 1, 0]);
        assert_eq!(xyz.type_dict.get("O"), Some(&0));
        assert_eq!(xyz.type_dict.get("H"), Some(&1));
    }

    #[test]
    fn read_box_only_comment_leaves_time_at_zero() {
        let input = "\
2
10.0 10.0 12.0
A 0.0 0.0 0.0
B 1.0 1.0 1.0
";
        let xyz = read(input.as_bytes()).unwrap();

        assert!(xyz.comment_format_known);
        assert_eq!(xyz.box_size, Some([10.0, 10.0, 12.0]));
        assert_eq!(xyz.time, vec![0.0]);
    }

    #[test]
    fn read_unrecognized_comment_disables_metadata() {
        let input = "\
1
generated by hand
A 0.0 0.0 0.0
1
generated by hand
A 0.5 0.0 0.0
";
        let xyz = read(input.as_bytes()).unwrap();

        assert!(!xyz.comment_format_known);
        assert_eq!(xyz.box_size, None);
        assert_eq!(xyz.time, vec![0.0, 0.0]);
        assert_eq!(xyz.n_frames(), 2);
    }

    #[test]
    fn read_rejects_truncated_final_frame() {
        let truncated = "\
2
10.0 10.0 10.0
A 0.0 0.0 0.0
";
        let err = read(truncated.as_bytes()).unwrap_err();

        assert!(err.to_string().contains("particle line"));
    }

    #[test]
    fn read_rejects_changed_particle_count() {
        let input = "\
2
10.0 10.0 10.0
A 0.0 0.0 0.0
B 1.0 1.0 1.0
3
10.0 10.0 10.0
A 0.0 0.0 0.0
B 1.0 1.0 1.0
C 2.0 2.0 2.0
";
        let err = read(input.as_bytes()).unwrap_err();

        assert!(matches!(err, Error::InconsistentData { .. }));
    }

    #[test]
    fn read_tolerates_trailing_blank_lines() {
        let padded = format!("{EXAMPLE}\n\n");

        let xyz = read(padded.as_bytes()).unwrap();

        assert_eq!(xyz.n_frames(), 2);
    }
}
