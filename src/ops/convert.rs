//! Conversions between the .xyz trajectory format and fort.5 configurations.
//!
//! Only the first frame of an .xyz file participates in `xyz_to_fort5`: a
//! fort.5 file is a single configuration. The box is taken from the frame's
//! comment line when present, in any of the historically tolerated `#box:`
//! spellings, or from the caller; a disagreement between the two is an error,
//! as is the absence of both.

use crate::io::Error as IoError;
use crate::ops::error::Error;
use smol_str::SmolStr;
use std::fmt::Write as _;
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Identifier used in diagnostics to reference the .xyz format.
const FORMAT: &str = "xyz";

/// Tolerance for comparing a caller-supplied box against the file's box.
const BOX_TOLERANCE: f64 = 1e-8;

/// Extracts a box triple from an .xyz comment line, if one is present.
///
/// Recognized spellings, with the `#box:`/`#box`/`#` marker either glued to
/// the first value or standing alone:
///
/// ```text
/// #box: 10.0 10.0 10.0
/// #box:10.0 10.0 10.0
/// # box: 10.0 10.0 10.0
/// 10.0 10.0 10.0
/// ```
///
/// # Returns
///
/// `Ok(None)` when the line carries no box triple; an error when a candidate
/// triple is found but fails float conversion.
fn parse_comment_box(line: &str) -> Result<Option<[f64; 3]>, Error> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    // `explicit` means the line spells out a box marker; only then is a value
    // that fails float conversion an error rather than a plain comment.
    let (candidates, explicit): (Option<Vec<&str>>, bool) = match tokens.len() {
        3 => {
            let stripped = tokens[0]
                .strip_prefix("#box:")
                .or_else(|| tokens[0].strip_prefix("#box"));
            match stripped {
                Some(first) => (Some(vec![first, tokens[1], tokens[2]]), true),
                None => {
                    let first = tokens[0].strip_prefix('#').unwrap_or(tokens[0]);
                    (Some(vec![first, tokens[1], tokens[2]]), false)
                }
            }
        }
        4 => {
            if tokens[0] == "#box:" || tokens[0] == "#box" {
                (Some(tokens[1..].to_vec()), true)
            } else if tokens[0] == "#" {
                let stripped = tokens[1]
                    .strip_prefix("box:")
                    .or_else(|| tokens[1].strip_prefix("box"));
                match stripped {
                    Some(second) => (Some(vec![second, tokens[2], tokens[3]]), true),
                    None => (Some(tokens[1..].to_vec()), false),
                }
            } else {
                (None, false)
            }
        }
        5 => {
            let explicit = tokens[0] == "#" && tokens[1].contains("box");
            (Some(tokens[2..].to_vec()), explicit)
        }
        _ => (None, false),
    };

    let Some(candidates) = candidates else {
        return Ok(None);
    };

    let mut box_size = [0.0; 3];
    for (slot, token) in box_size.iter_mut().zip(&candidates) {
        match token.parse::<f64>() {
            Ok(value) => *slot = value,
            Err(_) if explicit => {
                return Err(Error::inconsistent(format!(
                    "Comment line carries a box marker but '{token}' is not a number"
                )));
            }
            Err(_) => return Ok(None),
        }
    }
    Ok(Some(box_size))
}

/// Reconciles the file's box with the caller's box.
fn resolve_box(
    file_box: Option<[f64; 3]>,
    arg_box: Option<[f64; 3]>,
) -> Result<[f64; 3], Error> {
    match (file_box, arg_box) {
        (None, None) => Err(Error::inconsistent(
            "No box size in the .xyz comment line and none supplied",
        )),
        (Some(file), None) => Ok(file),
        (None, Some(arg)) => Ok(arg),
        (Some(file), Some(arg)) => {
            let agree = file
                .iter()
                .zip(arg.iter())
                .all(|(f, a)| (f - a).abs() <= BOX_TOLERANCE * f.abs().max(1.0));
            if agree {
                Ok(file)
            } else {
                Err(Error::inconsistent(format!(
                    "Supplied box [{} {} {}] does not match the .xyz file box [{} {} {}]",
                    arg[0], arg[1], arg[2], file[0], file[1], file[2]
                )))
            }
        }
    }
}

/// Maps a coordinate into `[0, extent)` when wrapping is requested.
fn wrap_coordinate(x: f64, extent: f64, wrap: bool) -> f64 {
    if wrap {
        x.rem_euclid(extent)
    } else {
        x
    }
}

/// Converts the first frame of an .xyz trajectory into a fort.5 file.
///
/// # Arguments
///
/// * `input` - Path of the .xyz file.
/// * `output` - Destination path; `None` writes a `fort.5` next to the input.
/// * `arg_box` - Box to use when the comment line carries none; must agree
///   with the file's box when both are present.
/// * `wrap` - Whether to wrap coordinates into the box.
///
/// # Returns
///
/// The path the fort.5 configuration was written to.
pub fn xyz_to_fort5(
    input: impl AsRef<Path>,
    output: Option<&Path>,
    arg_box: Option<[f64; 3]>,
    wrap: bool,
) -> Result<PathBuf, Error> {
    let input = input.as_ref();
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_file_name("fort.5"));

    let file = fs::File::open(input)
        .map_err(|e| IoError::from_io(e, Some(input.to_path_buf())))?;
    let reader = std::io::BufReader::new(file);
    let frame = read_first_frame(reader).map_err(|e| e.with_path(input.to_path_buf()))?;

    let box_size = resolve_box(frame.box_size, arg_box)?;

    let mut buffer = Vec::new();
    let mut writer = crate::io::Fort5Writer::new(&mut buffer);
    writer.write_box(box_size, 0.0)?;
    writer.write_particle_count(frame.particles.len())?;
    for (index, (label, position)) in frame.particles.iter().enumerate() {
        let wrapped = [
            wrap_coordinate(position[0], box_size[0], wrap),
            wrap_coordinate(position[1], box_size[1], wrap),
            wrap_coordinate(position[2], box_size[2], wrap),
        ];
        writer.write_molecule(index + 1, label, wrapped, false)?;
    }
    fs::write(&output, buffer).map_err(|e| IoError::from_io(e, Some(output.clone())))?;

    log::info!(
        "Converted {} to fort.5 file: {}",
        input.display(),
        output.display()
    );
    Ok(output)
}

struct FirstFrame {
    box_size: Option<[f64; 3]>,
    particles: Vec<(SmolStr, [f64; 3])>,
}

fn read_first_frame<R: BufRead>(reader: R) -> Result<FirstFrame, IoError> {
    let mut lines = reader.lines();
    let mut line_number = 0;
    let mut next_line = |what: &str| -> Result<String, IoError> {
        line_number += 1;
        match lines.next() {
            Some(line) => line.map_err(|e| IoError::from_io(e, None)),
            None => Err(IoError::parse(
                FORMAT,
                None,
                line_number,
                format!("Unexpected end of file, expected {what}"),
            )),
        }
    };

    let count_line = next_line("particle count")?;
    let n_particles = count_line.trim().parse::<usize>().map_err(|_| {
        IoError::parse(
            FORMAT,
            None,
            1,
            format!("Invalid particle count '{}'", count_line.trim()),
        )
    })?;

    let comment = next_line("comment line")?;
    let box_size = parse_comment_box(&comment).map_err(|e| {
        IoError::parse(FORMAT, None, 2, e.to_string())
    })?;

    let mut particles = Vec::with_capacity(n_particles);
    for _ in 0..n_particles {
        let record = next_line("particle record")?;
        let tokens: Vec<&str> = record.split_whitespace().collect();
        if tokens.len() != 4 {
            return Err(IoError::parse(
                FORMAT,
                None,
                2 + particles.len() + 1,
                format!("Particle record must have 4 fields, got {}", tokens.len()),
            ));
        }
        let mut position = [0.0; 3];
        for (slot, token) in position.iter_mut().zip(&tokens[1..]) {
            *slot = token.parse::<f64>().map_err(|_| {
                IoError::parse(
                    FORMAT,
                    None,
                    2 + particles.len() + 1,
                    format!("Invalid coordinate '{token}'"),
                )
            })?;
        }
        particles.push((SmolStr::new(tokens[0]), position));
    }

    Ok(FirstFrame {
        box_size,
        particles,
    })
}

/// Converts a fort.5 configuration into a single-frame .xyz file.
///
/// Coordinates are wrapped into the box; the comment line carries the box in
/// the `# box: x y z` spelling so the result converts back without a
/// caller-supplied box.
///
/// # Arguments
///
/// * `input` - Path of the fort.5 file.
/// * `output` - Destination path; `None` swaps the input's extension for
///   `.xyz`.
///
/// # Returns
///
/// The path the .xyz frame was written to.
pub fn fort5_to_xyz(
    input: impl AsRef<Path>,
    output: Option<&Path>,
) -> Result<PathBuf, Error> {
    let input = input.as_ref();
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.with_extension("xyz"));

    let fort5 = crate::io::read_fort5_file(input)?;

    let mut contents = String::new();
    let _ = writeln!(contents, "{}", fort5.particles.len());
    let _ = writeln!(
        contents,
        "# box: {:.15} {:.15} {:.15}",
        fort5.box_size[0], fort5.box_size[1], fort5.box_size[2]
    );
    for particle in &fort5.particles {
        let _ = writeln!(
            contents,
            "{} {:.15} {:.15} {:.15}",
            particle.label,
            wrap_coordinate(particle.position[0], fort5.box_size[0], true),
            wrap_coordinate(particle.position[1], fort5.box_size[1], true),
            wrap_coordinate(particle.position[2], fort5.box_size[2], true),
        );
    }
    fs::write(&output, contents).map_err(|e| IoError::from_io(e, Some(output.clone())))?;

    log::info!(
        "Converted {} to .xyz file: {}",
        input.display(),
        output.display()
    );
    Ok(output)
}
