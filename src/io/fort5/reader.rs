//! Parses fort.5 initial-configuration files into [`Fort5`] instances.
//!
//! The reader accepts the output of [`Fort5Writer`](super::writer::Fort5Writer)
//! as well as files produced by the simulation code itself, which prints
//! coordinates in Fortran scientific notation (`1.2345D+02`); the `D`
//! exponent marker is rewritten to `E` before float conversion.

use crate::io::error::Error;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Identifier used in diagnostics to reference the fort.5 format.
const FORMAT: &str = "fort.5";

/// One particle of a fort.5 configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fort5Particle {
    pub label: SmolStr,
    pub position: [f64; 3],
}

/// Typed view of a fort.5 initial configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fort5 {
    pub box_size: [f64; 3],
    pub scaling: f64,
    pub particles: Vec<Fort5Particle>,
}

/// Reads a fort.5 configuration from a path.
pub fn read_file(path: impl AsRef<Path>) -> Result<Fort5, Error> {
    let path = path.as_ref();
    log::info!("Loading fort.5 data from file: {}", path.display());
    let file = File::open(path).map_err(|e| Error::from_io(e, Some(path.to_path_buf())))?;
    read(BufReader::new(file)).map_err(|e| e.with_path(path.to_path_buf()))
}

/// Reads a fort.5 configuration from any buffered reader.
///
/// # Errors
///
/// Returns [`Error::Parse`] when a block header or record line does not match
/// the expected layout or a numeric field fails conversion.
pub fn read<R: BufRead>(reader: R) -> Result<Fort5, Error> {
    let mut cursor = Cursor::new(reader);

    let header = cursor.expect_line("Box: header")?;
    if !header.contains("Box") {
        return Err(Error::parse(
            FORMAT,
            None,
            cursor.line_number,
            format!("Expected 'Box:' header, got '{}'", header.trim()),
        ));
    }
    let box_line = cursor.expect_line("box dimensions")?;
    let line_number = cursor.line_number;
    let tokens: Vec<&str> = box_line.split_whitespace().collect();
    if tokens.len() != 4 {
        return Err(Error::parse(
            FORMAT,
            None,
            line_number,
            format!("Box line must have 4 fields, got {}", tokens.len()),
        ));
    }
    let box_size = [
        parse_float(tokens[0], "box dimension", line_number)?,
        parse_float(tokens[1], "box dimension", line_number)?,
        parse_float(tokens[2], "box dimension", line_number)?,
    ];
    let scaling = parse_float(tokens[3], "box scaling", line_number)?;

    let header = cursor.expect_line("Number of particles: header")?;
    if !header.contains("Number of particles") {
        return Err(Error::parse(
            FORMAT,
            None,
            cursor.line_number,
            format!("Expected 'Number of particles:' header, got '{}'", header.trim()),
        ));
    }
    let count_line = cursor.expect_line("particle count")?;
    let n_molecules = count_line.trim().parse::<usize>().map_err(|_| {
        Error::parse(
            FORMAT,
            None,
            cursor.line_number,
            format!("Invalid particle count '{}'", count_line.trim()),
        )
    })?;

    let mut particles = Vec::with_capacity(n_molecules);
    for _ in 0..n_molecules {
        let header = cursor.expect_line("Molecule header")?;
        if !header.contains("Molecule") {
            return Err(Error::parse(
                FORMAT,
                None,
                cursor.line_number,
                format!("Expected 'Molecule #' header, got '{}'", header.trim()),
            ));
        }
        let atoms_line = cursor.expect_line("atoms-per-molecule count")?;
        let atoms_per_mol = atoms_line.trim().parse::<usize>().map_err(|_| {
            Error::parse(
                FORMAT,
                None,
                cursor.line_number,
                format!("Invalid atoms-per-molecule count '{}'", atoms_line.trim()),
            )
        })?;

        for _ in 0..atoms_per_mol {
            let record = cursor.expect_line("atom record")?;
            particles.push(parse_atom_record(&record, cursor.line_number)?);
        }
    }

    Ok(Fort5 {
        box_size,
        scaling,
        particles,
    })
}

/// Parses one atom record: `<index> <label> <label_index> <n_bonds> <x> <y> <z> …`.
fn parse_atom_record(line: &str, line_number: usize) -> Result<Fort5Particle, Error> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 7 {
        return Err(Error::parse(
            FORMAT,
            None,
            line_number,
            format!("Atom record must have at least 7 fields, got {}", tokens.len()),
        ));
    }
    let label = SmolStr::new(tokens[1]);
    let position = [
        parse_float(tokens[4], "x coordinate", line_number)?,
        parse_float(tokens[5], "y coordinate", line_number)?,
        parse_float(tokens[6], "z coordinate", line_number)?,
    ];
    Ok(Fort5Particle { label, position })
}

/// Parses a float, accepting the Fortran `D` exponent marker.
fn parse_float(token: &str, what: &str, line_number: usize) -> Result<f64, Error> {
    let normalized = token.replace(['D', 'd'], "E");
    normalized.parse::<f64>().map_err(|_| {
        Error::parse(
            FORMAT,
            None,
            line_number,
            format!("Invalid {what} '{token}'"),
        )
    })
}

struct Cursor<R: BufRead> {
    lines: std::io::Lines<R>,
    line_number: usize,
}

impl<R: BufRead> Cursor<R> {
    fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }

    fn expect_line(&mut self, what: &str) -> Result<String, Error> {
        match self.lines.next() {
            Some(line) => {
                self.line_number += 1;
                line.map_err(|e| Error::from_io(e, None))
            }
            None => Err(Error::parse(
                FORMAT,
                None,
                self.line_number + 1,
                format!("Unexpected end of file, expected {what}"),
            )),
        }
    }
}
