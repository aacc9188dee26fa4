//! Shared error types returned by the high-level operations modules.
//!
//! Every merge variant maps to a specific directive failure (inapplicable
//! directive, duplicate target, missing target, dangling atom reference) so
//! callers can report precisely which directive broke the batch and why,
//! without re-reading the source file.

use crate::model::types::PropertyKind;
use thiserror::Error;

/// Error conditions surfaced by the operations layer.
#[derive(Debug, Error)]
pub enum Error {
    /// File-level failure bubbled up from the I/O layer.
    #[error(transparent)]
    Io(#[from] crate::io::Error),

    /// A directive cannot be applied at all, independent of document state.
    #[error("directive for {kind} cannot be applied: {details}")]
    Validation { kind: PropertyKind, details: String },

    /// A New directive collides with an existing matching record.
    #[error("new {kind} '{name}' collides with an existing record: {details}")]
    Duplicate {
        kind: PropertyKind,
        name: String,
        details: String,
    },

    /// A Replace directive has no matching target record.
    #[error("no existing {kind} matches '{name}'")]
    NotFound { kind: PropertyKind, name: String },

    /// A directive references an atom type absent from the current atom set.
    #[error("{kind} directive references unknown atom type '{name}'")]
    Referential { kind: PropertyKind, name: String },

    /// Data from different sources (or arguments) disagrees.
    #[error("inconsistent data: {details}")]
    Inconsistent { details: String },
}

impl Error {
    /// Helper for constructing an [`Error::Validation`] variant.
    pub fn validation(kind: PropertyKind, details: impl Into<String>) -> Self {
        Self::Validation {
            kind,
            details: details.into(),
        }
    }

    /// Helper for constructing an [`Error::Duplicate`] variant.
    ///
    /// # Arguments
    ///
    /// * `kind` - Property kind of the colliding directive.
    /// * `name` - Display name of the record key (e.g., `"O-H"`).
    /// * `details` - Description of the existing record.
    pub fn duplicate(
        kind: PropertyKind,
        name: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self::Duplicate {
            kind,
            name: name.into(),
            details: details.into(),
        }
    }

    /// Helper for constructing an [`Error::NotFound`] variant.
    pub fn not_found(kind: PropertyKind, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Helper for constructing an [`Error::Referential`] variant.
    pub fn referential(kind: PropertyKind, name: impl Into<String>) -> Self {
        Self::Referential {
            kind,
            name: name.into(),
        }
    }

    /// Helper for constructing an [`Error::Inconsistent`] variant.
    pub fn inconsistent(details: impl Into<String>) -> Self {
        Self::Inconsistent {
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_display_names_kind_and_key() {
        let err = Error::duplicate(
            PropertyKind::BondType,
            "O-H",
            "a bond type for (H, O) already exists",
        );

        assert_eq!(
            err.to_string(),
            "new bond type 'O-H' collides with an existing record: a bond type for (H, O) already exists"
        );
    }

    #[test]
    fn referential_display_names_missing_atom() {
        let err = Error::referential(PropertyKind::NonBonded, "Xx");

        assert_eq!(
            err.to_string(),
            "non-bonded directive references unknown atom type 'Xx'"
        );
    }

    #[test]
    fn io_errors_convert_transparently() {
        let io_err = crate::io::Error::parse("fort.3", None, 3, "bad line");
        let err: Error = io_err.into();

        assert!(err.to_string().contains("bad line"));
    }
}
