//! File-to-file topology replacement: parse, merge, serialize.
//!
//! The output file is written in a single syscall from an in-memory buffer,
//! after the merge and serialization have both succeeded. A failing batch
//! therefore leaves the filesystem exactly as it was: the source file is
//! never opened for writing and no partial output file appears.

use crate::model::replacement::Replacement;
use crate::ops::error::Error;
use crate::ops::merge::merge;
use std::fs;
use std::path::{Path, PathBuf};

/// Applies a directive batch to a topology file on disk.
///
/// # Arguments
///
/// * `input` - Path of the topology file to read.
/// * `output` - Destination path; `None` writes next to the input with a
///   `_new` suffix appended to the file name.
/// * `directives` - Batch of replacement directives, applied in order.
///
/// # Returns
///
/// The path the merged document was written to.
///
/// # Errors
///
/// Returns any parse or I/O error from reading the input, any merge error
/// from the batch, or an I/O error from writing the output. On error, no
/// output file is created.
pub fn replace_topology(
    input: impl AsRef<Path>,
    output: Option<&Path>,
    directives: &[Replacement],
) -> Result<PathBuf, Error> {
    let input = input.as_ref();
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| crate::io::default_output_path(input));

    let topology = crate::io::read_fort3_file(input, true)?;
    let (merged, _) = merge(&topology, directives)?;

    let mut buffer = Vec::new();
    crate::io::write_fort3(&mut buffer, &merged)?;
    fs::write(&output, buffer)
        .map_err(|e| crate::io::Error::from_io(e, Some(output.clone())))?;

    log::info!(
        "Wrote merged topology ({} directives) to file: {}",
        directives.len(),
        output.display()
    );
    Ok(output)
}
