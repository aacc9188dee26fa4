//! Byte-level progress reporting for the path-based readers.
//!
//! The original tooling wrapped its file readers in progress bars; the same
//! convenience is offered here through `indicatif`. Stream-based entry points
//! stay free of terminal output, so the bar only attaches when a reader is
//! handed a path and `silent` is not requested.

use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use super::error::Error;

/// Opens `path` for buffered reading, attaching a byte progress bar.
///
/// When `silent` is set the returned reader still wraps a progress bar, but a
/// hidden one, so call sites do not need to branch on the flag.
pub(crate) fn open_with_progress(
    path: &Path,
    silent: bool,
) -> Result<BufReader<indicatif::ProgressBarIter<File>>, Error> {
    let file = File::open(path).map_err(|e| Error::from_io(e, Some(path.to_path_buf())))?;
    let len = file
        .metadata()
        .map_err(|e| Error::from_io(e, Some(path.to_path_buf())))?
        .len();

    let bar = if silent {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(len);
        bar.set_style(
            ProgressStyle::with_template("{wide_bar} {bytes}/{total_bytes} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    };

    Ok(BufReader::new(bar.wrap_read(file)))
}
