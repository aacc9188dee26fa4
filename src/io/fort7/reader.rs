//! Parses fort.7 thermodynamic logs into [`Fort7`] instances.
//!
//! The log opens with free-form header lines matched by content, up to a line
//! containing `MDCYCLE`. After that marker the file lists one block per step,
//! each block a sequence of `<tag> <value> <label>` lines. A line containing
//! `nonbonded virial` closes a step; a run of asterisks closes the cycle
//! listing. Per-quantity values accumulate into parallel series, one entry
//! per step, with quantities missing from a block recorded as zero.

use crate::io::error::Error;
use crate::io::progress::open_with_progress;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;

/// Identifier used in diagnostics to reference the fort.7 format.
const FORMAT: &str = "fort.7";

/// Typed view of a fort.7 thermodynamic log.
///
/// Header metadata is optional; the per-step series all share the same
/// length, the number of step blocks parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fort7 {
    pub title: Option<String>,
    pub n_particles: Option<u64>,
    pub cutoff: Option<f64>,
    pub box_size: Option<[f64; 3]>,
    pub n_time_steps: Option<u64>,
    pub dt: Option<f64>,
    pub step: Vec<u64>,
    pub kinetic_energy: Vec<f64>,
    pub potential_energy: Vec<f64>,
    pub temperature: Vec<f64>,
    pub pressure: Vec<f64>,
    pub pressure_nb: Vec<f64>,
    pub pressure_pf_0: Vec<f64>,
    pub pressure_pf_1: Vec<f64>,
}

impl Fort7 {
    /// Number of step blocks parsed from the cycle listing.
    pub fn step_count(&self) -> usize {
        self.step.len()
    }
}

/// Per-step accumulator; missing quantities default to zero.
#[derive(Default)]
struct StepBlock {
    step: u64,
    kinetic_energy: f64,
    potential_energy: f64,
    temperature: f64,
    pressure: f64,
    pressure_nb: f64,
    pressure_pf_0: f64,
    pressure_pf_1: f64,
}

/// Reads a fort.7 log from a path.
///
/// A progress bar tracks the read unless `silent` is set.
pub fn read_file(path: impl AsRef<Path>, silent: bool) -> Result<Fort7, Error> {
    let path = path.as_ref();
    log::info!("Loading fort.7 data from file: {}", path.display());
    let reader = open_with_progress(path, silent)?;
    read(reader).map_err(|e| e.with_path(path.to_path_buf()))
}

/// Reads a fort.7 log from any buffered reader.
///
/// # Errors
///
/// Returns [`Error::Parse`] when a matched header or step line carries a
/// value that fails numeric conversion.
pub fn read<R: BufRead>(reader: R) -> Result<Fort7, Error> {
    let mut fort7 = Fort7::default();
    let mut lines = reader.lines().enumerate();

    // Header scan, up to the MDCYCLE marker. A log truncated before the
    // marker simply has no step data.
    while let Some((idx, line)) = lines.next() {
        let line = line.map_err(|e| Error::from_io(e, None))?;
        let line_number = idx + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        let joined = tokens.join(" ");

        if tokens[0].contains("title") {
            fort7.title = tokens.get(1).map(|t| t.to_string());
        } else if joined.contains("number of atoms") {
            fort7.n_particles = Some(parse_last(&tokens, "atom count", line_number)?);
        } else if tokens[0].contains("cutoff") {
            fort7.cutoff = Some(parse_last(&tokens, "cutoff", line_number)?);
        } else if tokens[0].contains("box") {
            fort7.box_size = Some(parse_box_line(&mut lines)?);
        } else if joined.contains("number of time steps") {
            fort7.n_time_steps = Some(parse_last(&tokens, "step count", line_number)?);
        } else if joined.contains("time step length") {
            fort7.dt = Some(parse_last(&tokens, "time step length", line_number)?);
        } else if tokens.contains(&"MDCYCLE") {
            parse_cycle(&mut fort7, &mut lines)?;
            break;
        }
    }

    Ok(fort7)
}

fn parse_box_line<I>(lines: &mut I) -> Result<[f64; 3], Error>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    let (idx, line) = lines.next().ok_or_else(|| {
        Error::parse(FORMAT, None, 0, "Unexpected end of file, expected box line")
    })?;
    let line = line.map_err(|e| Error::from_io(e, None))?;
    let line_number = idx + 1;
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() != 3 {
        return Err(Error::parse(
            FORMAT,
            None,
            line_number,
            format!("box line must have 3 fields, got {}", tokens.len()),
        ));
    }
    Ok([
        parse_token(tokens[0], "box dimension", line_number)?,
        parse_token(tokens[1], "box dimension", line_number)?,
        parse_token(tokens[2], "box dimension", line_number)?,
    ])
}

/// Parses the step blocks of the cycle listing.
fn parse_cycle<I>(fort7: &mut Fort7, lines: &mut I) -> Result<(), Error>
where
    I: Iterator<Item = (usize, std::io::Result<String>)>,
{
    let mut block = StepBlock::default();
    for (idx, line) in lines {
        let line = line.map_err(|e| Error::from_io(e, None))?;
        let line_number = idx + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        let joined = tokens.join(" ");

        if joined.contains("nonbonded virial") {
            push_block(fort7, std::mem::take(&mut block));
            continue;
        }
        if joined.contains("****") {
            break;
        }

        let last = tokens[tokens.len() - 1];
        if joined.contains("step no") {
            block.step = parse_token(last, "step number", line_number)?;
        } else if last.contains("ekin") {
            block.kinetic_energy = parse_second(&tokens, "kinetic energy", line_number)?;
        } else if joined.contains("epot shifted") {
            block.potential_energy = parse_second(&tokens, "potential energy", line_number)?;
        } else if last.contains("temp") {
            block.temperature = parse_second(&tokens, "temperature", line_number)?;
        } else if last == "press" {
            block.pressure = parse_second(&tokens, "pressure", line_number)?;
        } else if joined.contains("PP_press_") {
            block.pressure_nb = parse_second(&tokens, "non-bonded pressure", line_number)?;
        } else if joined.contains("PF_press_0") {
            block.pressure_pf_0 = parse_second(&tokens, "field pressure 0", line_number)?;
        } else if joined.contains("PF_press_1") {
            block.pressure_pf_1 = parse_second(&tokens, "field pressure 1", line_number)?;
        }
    }
    Ok(())
}

fn push_block(fort7: &mut Fort7, block: StepBlock) {
    fort7.step.push(block.step);
    fort7.kinetic_energy.push(block.kinetic_energy);
    fort7.potential_energy.push(block.potential_energy);
    fort7.temperature.push(block.temperature);
    fort7.pressure.push(block.pressure);
    fort7.pressure_nb.push(block.pressure_nb);
    fort7.pressure_pf_0.push(block.pressure_pf_0);
    fort7.pressure_pf_1.push(block.pressure_pf_1);
}

fn parse_token<T: std::str::FromStr>(
    token: &str,
    what: &str,
    line_number: usize,
) -> Result<T, Error> {
    token.parse::<T>().map_err(|_| {
        Error::parse(
            FORMAT,
            None,
            line_number,
            format!("Invalid {what} '{token}'"),
        )
    })
}

fn parse_last<T: std::str::FromStr>(
    tokens: &[&str],
    what: &str,
    line_number: usize,
) -> Result<T, Error> {
    parse_token(tokens[tokens.len() - 1], what, line_number)
}

/// Step lines have the shape `<tag> <value> <label>`; the value is second.
fn parse_second(tokens: &[&str], what: &str, line_number: usize) -> Result<f64, Error> {
    let token = tokens.get(1).copied().unwrap_or("");
    parse_token(token, what, line_number)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "\
 title dppc
 total number of atoms = 5000
 cutoff radius = 1.2
 box dimensions:
 10.0 10.0 12.0
 total number of time steps = 2
 time step length = 0.03
 MDCYCLE listing follows
 > 100 step no 100
 > 12.5 ekin
 > -80.25 epot shifted
 > 1.01 temp
 > 0.52 press
 > 0.11 PP_press_
 > 0.21 PF_press_0
 > 0.31 PF_press_1
 > 0.0 nonbonded virial
 > 200 step no 200
 > 13.5 ekin
 > -79.5 epot shifted
 > 0.99 temp
 > 0.54 press
 > 0.0 nonbonded virial
 ********
 averages below
";

    #[test]
    fn read_parses_header_metadata() {
        let fort7 = read(EXAMPLE.as_bytes()).expect("example parses");

        assert_eq!(fort7.title.as_deref(), Some("dppc"));
        assert_eq!(fort7.n_particles, Some(5000));
        assert_eq!(fort7.cutoff, Some(1.2));
        assert_eq!(fort7.box_size, Some([10.0, 10.0, 12.0]));
        assert_eq!(fort7.n_time_steps, Some(2));
        assert_eq!(fort7.dt, Some(0.03));
    }

    #[test]
    fn read_accumulates_one_entry_per_step_block() {
        let fort7 = read(EXAMPLE.as_bytes()).unwrap();

        assert_eq!(fort7.step_count(), 2);
        assert_eq!(fort7.step, vec![100, 200]);
        assert_eq!(fort7.kinetic_energy, vec![12.5, 13.5]);
        assert_eq!(fort7.potential_energy, vec![-80.25, -79.5]);
        assert_eq!(fort7.temperature, vec![1.01, 0.99]);
        assert_eq!(fort7.pressure, vec![0.52, 0.54]);
    }

    #[test]
    fn read_defaults_missing_quantities_to_zero() {
        let fort7 = read(EXAMPLE.as_bytes()).unwrap();

        // The second block has no PP/PF pressure lines.
        assert_eq!(fort7.pressure_nb, vec![0.11, 0.0]);
        assert_eq!(fort7.pressure_pf_0, vec![0.21, 0.0]);
        assert_eq!(fort7.pressure_pf_1, vec![0.31, 0.0]);
    }

    #[test]
    fn read_all_series_share_the_step_count() {
        let fort7 = read(EXAMPLE.as_bytes()).unwrap();

        let n = fort7.step_count();
        assert_eq!(fort7.kinetic_energy.len(), n);
        assert_eq!(fort7.potential_energy.len(), n);
        assert_eq!(fort7.temperature.len(), n);
        assert_eq!(fort7.pressure.len(), n);
        assert_eq!(fort7.pressure_nb.len(), n);
        assert_eq!(fort7.pressure_pf_0.len(), n);
        assert_eq!(fort7.pressure_pf_1.len(), n);
    }

    #[test]
    fn read_without_mdcycle_marker_yields_empty_series() {
        let fort7 = read(" title only\n".as_bytes()).unwrap();

        assert_eq!(fort7.title.as_deref(), Some("only"));
        assert_eq!(fort7.step_count(), 0);
    }

    #[test]
    fn read_rejects_malformed_step_value() {
        let broken = EXAMPLE.replace("> 12.5 ekin", "> twelve ekin");

        let err = read(broken.as_bytes()).unwrap_err();

        assert!(err.to_string().contains("kinetic energy"));
    }

    #[test]
    fn read_rejects_malformed_box_line() {
        let broken = EXAMPLE.replace(" 10.0 10.0 12.0", " 10.0 10.0");

        let err = read(broken.as_bytes()).unwrap_err();

        assert!(err.to_string().contains("box line"));
    }
}
