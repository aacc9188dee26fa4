//! Streaming value substitution for fort.1 control files.
//!
//! The editor keeps the keyword lines untouched and swaps only the value line
//! that follows a matching keyword, preserving the rest of the file verbatim.

use crate::io::error::Error;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Rewrites a fort.1 file, substituting the value lines of matching keywords.
///
/// Each replacement is a `(key, value)` pair; a keyword line containing `key`
/// as a substring has its following value line replaced by `value`. When
/// several keys match one keyword line, the first in `replacements` wins.
/// The full output is assembled in memory and written in one step, so a
/// failure never leaves a partial file behind.
///
/// # Arguments
///
/// * `input` - Path to the existing fort.1 file.
/// * `output` - Destination path; `None` defaults to `<input>_new`.
/// * `replacements` - Ordered `(key, value)` substitution pairs.
///
/// # Returns
///
/// The path the new file was written to.
pub fn replace_in_fort1(
    input: impl AsRef<Path>,
    output: Option<&Path>,
    replacements: &[(&str, &str)],
) -> Result<PathBuf, Error> {
    let input = input.as_ref();
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => default_output_path(input),
    };

    let file = fs::File::open(input).map_err(|e| Error::from_io(e, Some(input.to_path_buf())))?;
    let reader = BufReader::new(file);

    let mut contents = String::new();
    let mut pending: Option<usize> = None;
    for line in reader.lines() {
        let line = line.map_err(|e| Error::from_io(e, Some(input.to_path_buf())))?;
        match pending.take() {
            Some(index) => {
                contents.push_str(replacements[index].1);
                contents.push('\n');
            }
            None => {
                contents.push_str(&line);
                contents.push('\n');
                pending = replacements.iter().position(|(key, _)| line.contains(key));
            }
        }
    }

    fs::write(&output, contents).map_err(|e| Error::from_io(e, Some(output.clone())))?;
    Ok(output)
}

/// Default output path `<input>_new`, next to the input file.
pub(crate) fn default_output_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    input.with_file_name(format!("{name}_new"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = "\
number_of_atoms
5000
time_step_length
0.03
end_of_file
";

    #[test]
    fn replace_in_fort1_substitutes_only_the_value_line() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("fort.1");
        fs::write(&input, EXAMPLE).unwrap();

        let output =
            replace_in_fort1(&input, None, &[("time_step", "0.01")]).expect("edit succeeds");

        let written = fs::read_to_string(&output).unwrap();
        assert_eq!(
            written,
            "number_of_atoms\n5000\ntime_step_length\n0.01\nend_of_file\n"
        );
    }

    #[test]
    fn replace_in_fort1_defaults_to_suffixed_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("fort.1");
        fs::write(&input, EXAMPLE).unwrap();

        let output = replace_in_fort1(&input, None, &[]).expect("copy succeeds");

        assert_eq!(output, dir.path().join("fort.1_new"));
        assert_eq!(fs::read_to_string(&output).unwrap(), EXAMPLE);
    }

    #[test]
    fn replace_in_fort1_first_matching_key_wins() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("fort.1");
        fs::write(&input, EXAMPLE).unwrap();

        let output = replace_in_fort1(
            &input,
            None,
            &[("atoms", "7000"), ("number_of", "9999")],
        )
        .expect("edit succeeds");

        let written = fs::read_to_string(&output).unwrap();
        assert!(written.contains("number_of_atoms\n7000\n"));
        assert!(!written.contains("9999"));
    }

    #[test]
    fn replace_in_fort1_honors_explicit_output_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("fort.1");
        let explicit = dir.path().join("edited.1");
        fs::write(&input, EXAMPLE).unwrap();

        let output = replace_in_fort1(&input, Some(&explicit), &[("atoms", "1")]).unwrap();

        assert_eq!(output, explicit);
        assert!(explicit.exists());
    }
}
