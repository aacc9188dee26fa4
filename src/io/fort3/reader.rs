//! Parses fort.3 topology files into [`Topology`] documents.
//!
//! The format is strictly sequential: a title line, five record sections
//! (atom types, bond types, bond angles, torsions, non-bonded pairs), the SCF
//! grid triple, the compressibility scalar, and the chi matrix. Each record
//! section opens with a count header and a comment line and closes with a
//! delimiter line made of asterisks. Record lines reference atom types by
//! 1-based ordinal; the reader resolves those ordinals against the positional
//! order of the atom-type section, never against the stored id column, so
//! legacy files with out-of-sequence id columns parse correctly.

use crate::io::error::Error;
use crate::io::progress::open_with_progress;
use crate::model::atom::AtomType;
use crate::model::chi::ChiMatrix;
use crate::model::records::{BondAngle, BondType, NonBonded, ScfGrid, Torsion};
use crate::model::topology::Topology;
use smol_str::SmolStr;
use std::io::BufRead;
use std::path::Path;

/// Identifier used in diagnostics to reference the fort.3 format.
const FORMAT: &str = "fort.3";

/// Minimum delimiter length closing the atom-type section.
const ATOM_DELIMITER: usize = 5;
/// Minimum delimiter length closing every later record section.
const RECORD_DELIMITER: usize = 6;

/// Reads a fort.3 topology from a file path.
///
/// # Errors
///
/// Returns [`Error::Io`] when the file cannot be opened and any error of
/// [`read`] with the path filled in.
pub fn read_file(path: impl AsRef<Path>, silent: bool) -> Result<Topology, Error> {
    let path = path.as_ref();
    log::info!("Loading fort.3 data from file: {}", path.display());
    let reader = open_with_progress(path, silent)?;
    read(reader).map_err(|e| e.with_path(path.to_path_buf()))
}

/// Reads a fort.3 topology from any buffered reader.
///
/// # Arguments
///
/// * `reader` - A buffered text source positioned at the title line.
///
/// # Returns
///
/// A fully populated [`Topology`] with the chi matrix sized to the atom count.
///
/// # Errors
///
/// Returns [`Error::Parse`] when a line has the wrong token count, a field
/// fails numeric conversion, or an ordinal falls outside the atom-type set,
/// and [`Error::InconsistentData`] when a declared section count does not
/// match the number of records actually parsed.
pub fn read<R: BufRead>(reader: R) -> Result<Topology, Error> {
    let mut cursor = Cursor::new(reader);

    let title = cursor.expect_line("title line")?;
    let mut topology = Topology::new(title.trim_end());

    read_atom_section(&mut cursor, &mut topology)?;
    read_bond_section(&mut cursor, &mut topology)?;
    read_angle_section(&mut cursor, &mut topology)?;
    read_torsion_section(&mut cursor, &mut topology)?;
    read_non_bonded_section(&mut cursor, &mut topology)?;

    read_grid(&mut cursor, &mut topology)?;
    read_kappa(&mut cursor, &mut topology)?;
    read_chi(&mut cursor, &mut topology)?;

    // Trailing blank lines are tolerated; anything else is rejected.
    while let Some(line) = cursor.next_line()? {
        if !line.trim().is_empty() {
            return Err(Error::parse(
                FORMAT,
                None,
                cursor.line_number,
                format!("Unexpected content after the chi matrix: '{}'", line.trim()),
            ));
        }
    }

    Ok(topology)
}

/// Line source tracking one-based line numbers for diagnostics.
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

    /// Returns the next line, or `None` at end of input.
    fn next_line(&mut self) -> Result<Option<String>, Error> {
        match self.lines.next() {
            Some(line) => {
                self.line_number += 1;
                line.map(Some).map_err(|e| Error::from_io(e, None))
            }
            None => Ok(None),
        }
    }

    /// Returns the next line, failing when the input ends early.
    fn expect_line(&mut self, what: &str) -> Result<String, Error> {
        self.next_line()?.ok_or_else(|| {
            Error::parse(
                FORMAT,
                None,
                self.line_number + 1,
                format!("Unexpected end of file, expected {what}"),
            )
        })
    }

    /// Returns the next non-blank line, failing when the input ends early.
    fn expect_content(&mut self, what: &str) -> Result<String, Error> {
        loop {
            let line = self.expect_line(what)?;
            if !line.trim().is_empty() {
                return Ok(line);
            }
        }
    }
}

/// Tests whether a trimmed line is a run of at least `min` asterisks.
fn is_delimiter(line: &str, min: usize) -> bool {
    let t = line.trim();
    t.len() >= min && t.chars().all(|c| c == '*')
}

/// Parses a section header of the shape `<count> different <keyword>:`.
fn parse_section_header<R: BufRead>(
    cursor: &mut Cursor<R>,
    keyword: &str,
) -> Result<usize, Error> {
    let line = cursor.expect_content(&format!("{keyword} section header"))?;
    let line_number = cursor.line_number;
    if !line.contains(keyword) {
        return Err(Error::parse(
            FORMAT,
            None,
            line_number,
            format!("Expected a section header containing '{keyword}', got '{}'", line.trim()),
        ));
    }
    let first = line.split_whitespace().next().ok_or_else(|| {
        Error::parse(FORMAT, None, line_number, "Empty section header")
    })?;
    first.parse::<usize>().map_err(|_| {
        Error::parse(
            FORMAT,
            None,
            line_number,
            format!("Section header must start with a record count, got '{first}'"),
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

fn parse_int(token: &str, what: &str, line_number: usize) -> Result<usize, Error> {
    token.parse::<usize>().map_err(|_| {
        Error::parse(
            FORMAT,
            None,
            line_number,
            format!("Invalid {what} '{token}'"),
        )
    })
}

/// Splits a record line into exactly `expected` whitespace-separated tokens.
fn tokenize(line: &str, expected: usize, section: &str, line_number: usize) -> Result<Vec<String>, Error> {
    let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
    if tokens.len() != expected {
        return Err(Error::parse(
            FORMAT,
            None,
            line_number,
            format!(
                "{section} record must have {expected} fields, got {}",
                tokens.len()
            ),
        ));
    }
    Ok(tokens)
}

/// Resolves a 1-based positional ordinal to the atom-type label it denotes.
fn resolve_ordinal(
    topology: &Topology,
    token: &str,
    section: &str,
    line_number: usize,
) -> Result<SmolStr, Error> {
    let ordinal = parse_int(token, "atom ordinal", line_number)?;
    if ordinal == 0 || ordinal > topology.atom_count() {
        return Err(Error::parse(
            FORMAT,
            None,
            line_number,
            format!(
                "{section} record references atom ordinal {ordinal}, outside 1..={}",
                topology.atom_count()
            ),
        ));
    }
    Ok(topology.atoms()[ordinal - 1].name.clone())
}

fn check_declared_count(declared: usize, parsed: usize, section: &str) -> Result<(), Error> {
    if declared != parsed {
        return Err(Error::inconsistent_data(
            FORMAT,
            None,
            format!("Declared {declared} {section} but parsed {parsed}"),
        ));
    }
    Ok(())
}

fn read_atom_section<R: BufRead>(
    cursor: &mut Cursor<R>,
    topology: &mut Topology,
) -> Result<(), Error> {
    let declared = parse_section_header(cursor, "atom types")?;
    cursor.expect_line("atom section comment")?;

    loop {
        let line = cursor.expect_line("atom record or delimiter")?;
        if is_delimiter(&line, ATOM_DELIMITER) {
            break;
        }
        let line_number = cursor.line_number;
        let tokens = tokenize(&line, 4, "atom type", line_number)?;

        // The id column must be numeric but its value is ignored: identity is
        // the position within the section, which tolerates legacy files whose
        // id columns are out of sequence.
        parse_int(&tokens[0], "atom id", line_number)?;
        let name = tokens[1].as_str();
        let mass = parse_float(&tokens[2], "atom mass", line_number)?;
        let charge = parse_float(&tokens[3], "atom charge", line_number)?;

        if topology.has_atom(name) {
            return Err(Error::parse(
                FORMAT,
                None,
                line_number,
                format!("Duplicate atom type name '{name}'"),
            ));
        }
        topology.add_atom(AtomType::new(name, mass, charge));
    }

    check_declared_count(declared, topology.atom_count(), "atom types")
}

fn read_bond_section<R: BufRead>(
    cursor: &mut Cursor<R>,
    topology: &mut Topology,
) -> Result<(), Error> {
    let declared = parse_section_header(cursor, "bond types")?;
    cursor.expect_line("bond section comment")?;

    let mut parsed = 0;
    loop {
        let line = cursor.expect_line("bond record or delimiter")?;
        if is_delimiter(&line, RECORD_DELIMITER) {
            break;
        }
        let line_number = cursor.line_number;
        let tokens = tokenize(&line, 4, "bond type", line_number)?;
        let a = resolve_ordinal(topology, &tokens[0], "bond type", line_number)?;
        let b = resolve_ordinal(topology, &tokens[1], "bond type", line_number)?;
        let length = parse_float(&tokens[2], "bond length", line_number)?;
        let energy = parse_float(&tokens[3], "bond energy", line_number)?;

        topology.add_bond(BondType::new(&a, &b, length, energy));
        parsed += 1;
    }

    check_declared_count(declared, parsed, "bond types")
}

fn read_angle_section<R: BufRead>(
    cursor: &mut Cursor<R>,
    topology: &mut Topology,
) -> Result<(), Error> {
    let declared = parse_section_header(cursor, "bond angles")?;
    cursor.expect_line("angle section comment")?;

    let mut parsed = 0;
    loop {
        let line = cursor.expect_line("angle record or delimiter")?;
        if is_delimiter(&line, RECORD_DELIMITER) {
            break;
        }
        let line_number = cursor.line_number;
        let tokens = tokenize(&line, 5, "bond angle", line_number)?;
        // The middle column is the central atom of the angle.
        let outer_a = resolve_ordinal(topology, &tokens[0], "bond angle", line_number)?;
        let center = resolve_ordinal(topology, &tokens[1], "bond angle", line_number)?;
        let outer_b = resolve_ordinal(topology, &tokens[2], "bond angle", line_number)?;
        let theta0 = parse_float(&tokens[3], "equilibrium angle", line_number)?;
        let force_constant = parse_float(&tokens[4], "force constant", line_number)?;

        topology.add_angle(BondAngle::new(&outer_a, &center, &outer_b, theta0, force_constant));
        parsed += 1;
    }

    check_declared_count(declared, parsed, "bond angles")
}

fn read_torsion_section<R: BufRead>(
    cursor: &mut Cursor<R>,
    topology: &mut Topology,
) -> Result<(), Error> {
    let declared = parse_section_header(cursor, "torsions")?;
    cursor.expect_line("torsion section comment")?;

    let mut parsed = 0;
    loop {
        let line = cursor.expect_line("torsion record or delimiter")?;
        if is_delimiter(&line, RECORD_DELIMITER) {
            break;
        }
        let line_number = cursor.line_number;
        let tokens = tokenize(&line, 6, "torsion", line_number)?;
        let a = resolve_ordinal(topology, &tokens[0], "torsion", line_number)?;
        let b = resolve_ordinal(topology, &tokens[1], "torsion", line_number)?;
        let c = resolve_ordinal(topology, &tokens[2], "torsion", line_number)?;
        let d = resolve_ordinal(topology, &tokens[3], "torsion", line_number)?;
        let phi0 = parse_float(&tokens[4], "equilibrium dihedral", line_number)?;
        let force_constant = parse_float(&tokens[5], "force constant", line_number)?;

        topology.add_torsion(Torsion::new(&a, &b, &c, &d, phi0, force_constant));
        parsed += 1;
    }

    check_declared_count(declared, parsed, "torsions")
}

fn read_non_bonded_section<R: BufRead>(
    cursor: &mut Cursor<R>,
    topology: &mut Topology,
) -> Result<(), Error> {
    let declared = parse_section_header(cursor, "non-bond")?;
    cursor.expect_line("non-bonded section comment")?;

    let mut parsed = 0;
    loop {
        let line = cursor.expect_line("non-bonded record or delimiter")?;
        if is_delimiter(&line, RECORD_DELIMITER) {
            break;
        }
        let line_number = cursor.line_number;
        let tokens = tokenize(&line, 4, "non-bonded", line_number)?;
        let a = resolve_ordinal(topology, &tokens[0], "non-bonded", line_number)?;
        let b = resolve_ordinal(topology, &tokens[1], "non-bonded", line_number)?;
        let sigma = parse_float(&tokens[2], "sigma", line_number)?;
        let epsilon = parse_float(&tokens[3], "epsilon", line_number)?;

        topology.add_non_bonded(NonBonded::new(&a, &b, sigma, epsilon));
        parsed += 1;
    }

    check_declared_count(declared, parsed, "non-bonded interactions")
}

fn read_grid<R: BufRead>(cursor: &mut Cursor<R>, topology: &mut Topology) -> Result<(), Error> {
    let line = cursor.expect_content("grid descriptor line")?;
    let line_number = cursor.line_number;
    let tokens = tokenize(&line, 3, "grid descriptor", line_number)?;
    let mx = parse_int(&tokens[0], "grid dimension", line_number)?;
    let my = parse_int(&tokens[1], "grid dimension", line_number)?;
    let mz = parse_int(&tokens[2], "grid dimension", line_number)?;

    topology.set_grid(ScfGrid::new(mx as u32, my as u32, mz as u32));
    Ok(())
}

fn read_kappa<R: BufRead>(cursor: &mut Cursor<R>, topology: &mut Topology) -> Result<(), Error> {
    let line = cursor.expect_content("compressibility line")?;
    let line_number = cursor.line_number;
    let tokens = tokenize(&line, 1, "compressibility", line_number)?;
    let kappa = parse_float(&tokens[0], "compressibility", line_number)?;

    topology.set_kappa(kappa);
    Ok(())
}

fn read_chi<R: BufRead>(cursor: &mut Cursor<R>, topology: &mut Topology) -> Result<(), Error> {
    let n = topology.atom_count();
    let mut rows = Vec::with_capacity(n);
    for _ in 0..n {
        let line = cursor.expect_content("chi matrix row")?;
        let line_number = cursor.line_number;
        let tokens = tokenize(&line, n, "chi matrix", line_number)?;
        let mut row = Vec::with_capacity(n);
        for token in &tokens {
            row.push(parse_float(token, "chi entry", line_number)?);
        }
        rows.push(row);
    }

    let chi = ChiMatrix::from_rows(&rows).ok_or_else(|| {
        Error::inconsistent_data(FORMAT, None, "Chi matrix rows do not form a square matrix")
    })?;
    topology.set_chi(chi);
    Ok(())
}
