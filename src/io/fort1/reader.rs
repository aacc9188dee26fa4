//! Parses fort.1 simulation-control files into [`Fort1`] instances.
//!
//! The format alternates keyword lines with value lines. Keywords are matched
//! by substring in a fixed precedence order, which mirrors how the simulation
//! code itself scans the file; notably, a plain `cutoff` line only matches
//! when `nl` is absent, so it cannot shadow `nl_cutoff`. Unknown keywords are
//! rejected rather than skipped, because a typo in a control file silently
//! changes a simulation.

use crate::io::error::Error;
use crate::io::progress::open_with_progress;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;

/// Identifier used in diagnostics to reference the fort.1 format.
const FORMAT: &str = "fort.1";

/// Adaptive-resolution region description from an `adaptive` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveRegion {
    /// Start of the adaptive region along the box axis.
    pub start: f64,
    /// End of the adaptive region.
    pub end: f64,
    /// Length of the transition zone at the region boundary.
    pub transition_length: f64,
}

/// Typed view of a fort.1 simulation-control file.
///
/// Every field is optional because control files only carry the keywords a
/// given run needs; consumers inspect the fields relevant to them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fort1 {
    pub title: Option<String>,
    pub n_particles: Option<u64>,
    pub cutoff: Option<f64>,
    pub nl_cutoff: Option<f64>,
    pub nl_size: Option<u64>,
    pub dt: Option<f64>,
    pub n_time_steps: Option<u64>,
    pub ensemble: Option<String>,
    pub angle_function: Option<i64>,
    pub trj_print: Option<u64>,
    pub out_print: Option<u64>,
    pub pbc_traj: Option<bool>,
    pub mean_field: Option<String>,
    pub num_config_acc: Option<u64>,
    pub pot_calc_freq: Option<u64>,
    pub temperature_coupl: Option<f64>,
    pub target_pressure: Option<f64>,
    pub pressure_coupling: Option<f64>,
    pub velocity_traj: Option<bool>,
    pub velocity_read: Option<bool>,
    pub target_temperature: Option<f64>,
    pub collision_frequency: Option<f64>,
    pub density_lattice_update: Option<u64>,
    pub intra_nonbonded: Option<bool>,
    pub adaptive: Option<AdaptiveRegion>,
}

/// Reads a fort.1 control file from a path.
///
/// A progress bar tracks the read unless `silent` is set.
pub fn read_file(path: impl AsRef<Path>, silent: bool) -> Result<Fort1, Error> {
    let path = path.as_ref();
    log::info!("Loading fort.1 data from file: {}", path.display());
    let reader = open_with_progress(path, silent)?;
    read(reader).map_err(|e| e.with_path(path.to_path_buf()))
}

/// Reads a fort.1 control file from any buffered reader.
///
/// # Errors
///
/// Returns [`Error::Parse`] for unrecognized keywords, missing value lines,
/// and values that fail numeric or boolean conversion.
pub fn read<R: BufRead>(reader: R) -> Result<Fort1, Error> {
    let lines: Vec<String> = reader
        .lines()
        .collect::<Result<_, _>>()
        .map_err(|e| Error::from_io(e, None))?;

    let mut fort1 = Fort1::default();
    let mut index = 0;
    while index < lines.len() {
        parse_keyword(&mut fort1, &lines, index)?;
        index += 2;
    }
    Ok(fort1)
}

/// Dispatches one keyword line against the value line that follows it.
///
/// Precedence of the substring checks follows the original scanning order and
/// must not be reordered.
fn parse_keyword(fort1: &mut Fort1, lines: &[String], index: usize) -> Result<(), Error> {
    let line = &lines[index];
    let line_number = index + 1;

    if line.contains("title") {
        fort1.title = Some(value_line(lines, index)?.trim().to_string());
    } else if line.contains("atoms") {
        fort1.n_particles = Some(parse_value(lines, index, "particle count")?);
    } else if line.contains("cutoff") && !line.contains("nl") {
        fort1.cutoff = Some(parse_value(lines, index, "cutoff")?);
    } else if line.contains("nl_cutoff") {
        fort1.nl_cutoff = Some(parse_value(lines, index, "neighbor-list cutoff")?);
    } else if line.contains("nl_size") {
        fort1.nl_size = Some(parse_value(lines, index, "neighbor-list size")?);
    } else if line.contains("time_step") {
        fort1.dt = Some(parse_value(lines, index, "time step")?);
    } else if line.contains("number_of_steps") {
        fort1.n_time_steps = Some(parse_value(lines, index, "step count")?);
    } else if line.contains("simulated_ensemble") {
        fort1.ensemble = Some(value_line(lines, index)?.trim().to_string());
    } else if line.contains("angle_function") {
        fort1.angle_function = Some(parse_value(lines, index, "angle function")?);
    } else if line.contains("trj_print") {
        fort1.trj_print = Some(parse_value(lines, index, "trajectory print interval")?);
    } else if line.contains("out_print") {
        fort1.out_print = Some(parse_value(lines, index, "output print interval")?);
    } else if line.contains("pbc_traj") {
        fort1.pbc_traj = Some(parse_bool_value(lines, index)?);
    } else if line.contains("mean_field") {
        fort1.mean_field = Some(value_line(lines, index)?.trim().to_string());
    } else if line.contains("num_config_acc") {
        fort1.num_config_acc = Some(parse_value(lines, index, "accumulated configurations")?);
    } else if line.contains("pot_calc_freq") {
        fort1.pot_calc_freq = Some(parse_value(lines, index, "potential calculation frequency")?);
    } else if line.contains("temperature_coupl") {
        fort1.temperature_coupl = Some(parse_value(lines, index, "temperature coupling")?);
    } else if line.contains("target_pressure") {
        fort1.target_pressure = Some(parse_value(lines, index, "target pressure")?);
    } else if line.contains("pressure_coupling") {
        fort1.pressure_coupling = Some(parse_value(lines, index, "pressure coupling")?);
    } else if line.contains("velocity_traj") {
        fort1.velocity_traj = Some(parse_bool_value(lines, index)?);
    } else if line.contains("velocity_read") {
        fort1.velocity_read = Some(parse_bool_value(lines, index)?);
    } else if line.contains("target_temperature") {
        // Only the first token counts; the rest of the line is free commentary.
        let value = value_line(lines, index)?;
        let token = value.split_whitespace().next().unwrap_or("");
        fort1.target_temperature = Some(parse_token(token, "target temperature", index + 2)?);
    } else if line.contains("collision_freq") {
        fort1.collision_frequency = Some(parse_value(lines, index, "collision frequency")?);
    } else if line.contains("SCF_lattice_update") {
        fort1.density_lattice_update = Some(parse_value(lines, index, "lattice update interval")?);
    } else if line.contains("intra_nonbonded") {
        fort1.intra_nonbonded = Some(parse_bool_value(lines, index)?);
    } else if line.contains("adaptive") {
        let value = value_line(lines, index)?;
        let tokens: Vec<&str> = value.split_whitespace().collect();
        if tokens.len() != 3 {
            return Err(Error::parse(
                FORMAT,
                None,
                index + 2,
                format!("adaptive value line must have 3 fields, got {}", tokens.len()),
            ));
        }
        fort1.adaptive = Some(AdaptiveRegion {
            start: parse_token(tokens[0], "adaptive region start", index + 2)?,
            end: parse_token(tokens[1], "adaptive region end", index + 2)?,
            transition_length: parse_token(tokens[2], "adaptive transition length", index + 2)?,
        });
    } else if line.contains("end") {
        // Terminator keyword, carries no value.
    } else {
        return Err(Error::parse(
            FORMAT,
            None,
            line_number,
            format!("fort.1 line not recognized: '{}'", line.trim()),
        ));
    }
    Ok(())
}

fn value_line(lines: &[String], index: usize) -> Result<&str, Error> {
    lines.get(index + 1).map(String::as_str).ok_or_else(|| {
        Error::parse(
            FORMAT,
            None,
            index + 1,
            format!("keyword '{}' has no value line", lines[index].trim()),
        )
    })
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

fn parse_value<T: std::str::FromStr>(
    lines: &[String],
    index: usize,
    what: &str,
) -> Result<T, Error> {
    let value = value_line(lines, index)?;
    parse_token(value.trim(), what, index + 2)
}

fn parse_bool_value(lines: &[String], index: usize) -> Result<bool, Error> {
    let value = value_line(lines, index)?.trim().to_string();
    match value.to_lowercase().as_str() {
        "yes" | "y" | "1" | "t" | "true" => Ok(true),
        "no" | "n" | "0" | "f" | "false" => Ok(false),
        _ => Err(Error::parse(
            FORMAT,
            None,
            index + 2,
            format!("String not recognized as a boolean, '{value}'"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "\
title of the simulation
dppc bilayer
number_of_atoms
5000
cutoff_radius
1.2
nl_cutoff_radius
1.5
time_step_length
0.03
number_of_steps
10000
simulated_ensemble
nvt
pbc_traj_output
yes
target_temperature_in_kelvin
323.0 with berendsen thermostat
intra_nonbonded_interactions
no
adaptive_region
2.0 8.0 1.0
end_of_file
";

    #[test]
    fn read_parses_recognized_keywords() {
        let fort1 = read(EXAMPLE.as_bytes()).expect("example parses");

        assert_eq!(fort1.title.as_deref(), Some("dppc bilayer"));
        assert_eq!(fort1.n_particles, Some(5000));
        assert_eq!(fort1.cutoff, Some(1.2));
        assert_eq!(fort1.nl_cutoff, Some(1.5));
        assert_eq!(fort1.dt, Some(0.03));
        assert_eq!(fort1.n_time_steps, Some(10000));
        assert_eq!(fort1.ensemble.as_deref(), Some("nvt"));
        assert_eq!(fort1.pbc_traj, Some(true));
        assert_eq!(fort1.target_temperature, Some(323.0));
        assert_eq!(fort1.intra_nonbonded, Some(false));
        assert_eq!(
            fort1.adaptive,
            Some(AdaptiveRegion {
                start: 2.0,
                end: 8.0,
                transition_length: 1.0,
            })
        );
    }

    #[test]
    fn read_leaves_absent_keywords_unset() {
        let fort1 = read("title line\nshort run\nend\n".as_bytes()).unwrap();

        assert_eq!(fort1.title.as_deref(), Some("short run"));
        assert_eq!(fort1.n_particles, None);
        assert_eq!(fort1.cutoff, None);
    }

    #[test]
    fn read_plain_cutoff_does_not_shadow_nl_cutoff() {
        let fort1 = read("nl_cutoff_radius\n1.5\nend\n".as_bytes()).unwrap();

        assert_eq!(fort1.nl_cutoff, Some(1.5));
        assert_eq!(fort1.cutoff, None);
    }

    #[test]
    fn read_rejects_unknown_keyword() {
        let err = read("mystery_keyword\n42\n".as_bytes()).unwrap_err();

        match err {
            Error::Parse { line_number, details, .. } => {
                assert_eq!(line_number, 1);
                assert!(details.contains("mystery_keyword"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn read_rejects_bad_boolean() {
        let err = read("pbc_traj_output\nmaybe\n".as_bytes()).unwrap_err();

        assert!(err.to_string().contains("'maybe'"));
    }

    #[test]
    fn read_accepts_boolean_spellings_case_insensitively() {
        for (value, expected) in [("YES", true), ("T", true), ("0", false), ("False", false)] {
            let input = format!("pbc_traj_output\n{value}\n");
            let fort1 = read(input.as_bytes()).unwrap();
            assert_eq!(fort1.pbc_traj, Some(expected), "value {value}");
        }
    }

    #[test]
    fn read_rejects_keyword_without_value_line() {
        let err = read("number_of_atoms\n".as_bytes()).unwrap_err();

        assert!(err.to_string().contains("no value line"));
    }
}
