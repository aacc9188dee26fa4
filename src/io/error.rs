//! Canonical error type for all file reading and writing operations.
//!
//! This module wraps parser, serializer, and filesystem failures into a single
//! `Error` enum that higher-level operations can bubble up or convert into
//! user-facing diagnostics with uniform wording.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing simulation data files.
///
/// The enum captures I/O failures, structured parser issues, and integrity
/// mismatches so callers can inspect the variant and react accordingly.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper around operating-system level I/O failures.
    ///
    /// Includes both filesystem and stream sources, optionally carrying the file path for
    /// richer error messages.
    #[error(
        "I/O error for {path_desc}: {source}",
        path_desc = PathDisplay(path)
    )]
    Io {
        /// Path to the file involved in the failed operation, if any.
        path: Option<PathBuf>,
        /// Underlying error emitted by the standard library.
        #[source]
        source: std::io::Error,
    },

    /// Indicates that an input line could not be parsed into the expected record.
    ///
    /// Exposes the textual format, source path, failing line number, and an explanatory
    /// detail string to assist with debugging malformed files.
    #[error(
        "failed to parse {format} {path_desc}: {details} (line {line_number})",
        path_desc = PathDisplay(path)
    )]
    Parse {
        /// Name of the textual format (e.g., `"fort.3"`, `"xyz"`).
        format: &'static str,
        /// Path to the offending file, if known.
        path: Option<PathBuf>,
        /// One-based line number where parsing failed.
        line_number: usize,
        /// Human-readable description of what went wrong.
        details: String,
    },

    /// Reports logical inconsistencies such as mismatched record counts or
    /// references to atom types outside the declared set.
    #[error(
        "inconsistent data in {format} {path_desc}: {details}",
        path_desc = PathDisplay(path)
    )]
    InconsistentData {
        /// Name of the textual format being validated.
        format: &'static str,
        /// Path to the offending file, if known.
        path: Option<PathBuf>,
        /// Explanation of the mismatch.
        details: String,
    },
}

impl Error {
    /// Wraps a standard library I/O error with an optional path for context.
    pub fn from_io(source: std::io::Error, path: Option<PathBuf>) -> Self {
        Self::Io { path, source }
    }

    /// Helper for constructing an [`Error::Parse`] variant.
    ///
    /// # Arguments
    ///
    /// * `format` - Short format name used in diagnostics.
    /// * `path` - Offending file path, when known.
    /// * `line_number` - One-based line number of the failure.
    /// * `details` - Free-form description of the problem.
    pub fn parse(
        format: &'static str,
        path: Option<PathBuf>,
        line_number: usize,
        details: impl Into<String>,
    ) -> Self {
        Self::Parse {
            format,
            path,
            line_number,
            details: details.into(),
        }
    }

    /// Helper for constructing an [`Error::InconsistentData`] variant.
    pub fn inconsistent_data(
        format: &'static str,
        path: Option<PathBuf>,
        details: impl Into<String>,
    ) -> Self {
        Self::InconsistentData {
            format,
            path,
            details: details.into(),
        }
    }

    /// Attaches a file path to an error produced by a stream-based reader.
    ///
    /// Readers that operate on a generic `BufRead` cannot know the source
    /// path; the path-based entry points use this to fill it in afterwards.
    pub fn with_path(self, new_path: PathBuf) -> Self {
        match self {
            Self::Io { source, .. } => Self::Io {
                path: Some(new_path),
                source,
            },
            Self::Parse {
                format,
                line_number,
                details,
                ..
            } => Self::Parse {
                format,
                path: Some(new_path),
                line_number,
                details,
            },
            Self::InconsistentData {
                format, details, ..
            } => Self::InconsistentData {
                format,
                path: Some(new_path),
                details,
            },
        }
    }
}

struct PathDisplay<'a>(&'a Option<PathBuf>);

impl<'a> fmt::Display for PathDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(p) => write!(f, "file '{}'", p.display()),
            None => write!(f, "stream source"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_includes_context() {
        let err = Error::parse("fort.3", None, 7, "expected 4 fields");

        assert_eq!(
            err.to_string(),
            "failed to parse fort.3 stream source: expected 4 fields (line 7)"
        );
    }

    #[test]
    fn inconsistent_data_display_includes_path() {
        let err = Error::inconsistent_data(
            "fort.3",
            Some(PathBuf::from("/tmp/fort.3")),
            "declared 3 atom types but parsed 2",
        );

        assert_eq!(
            err.to_string(),
            "inconsistent data in fort.3 file '/tmp/fort.3': declared 3 atom types but parsed 2"
        );
    }

    #[test]
    fn with_path_fills_in_stream_errors() {
        let err = Error::parse("xyz", None, 1, "bad count").with_path(PathBuf::from("traj.xyz"));

        match err {
            Error::Parse { path, .. } => assert_eq!(path, Some(PathBuf::from("traj.xyz"))),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
