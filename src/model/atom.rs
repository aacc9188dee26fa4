//! Atom-type representation comprising label, mass, and partial charge.
//!
//! This module defines the smallest record of a topology file. Atom types are
//! instantiated by the fort.3 reader or by replacement directives, matched by
//! label during merges, and rendered back with freshly derived ordinals. The
//! ordinal itself is never stored here: an atom type's identity in the file is
//! its 1-based position in the atom-type section.

use smol_str::SmolStr;
use std::fmt;

/// Named particle species with immutable label and mutable physical data.
///
/// Matching during merges is by exact label equality, so the label doubles as
/// the primary key of the atom-type section. Mass and charge travel together
/// because a replacement directive always overwrites both.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomType {
    /// Species label as it appears in the file (e.g., `H`, `O`, `H+`).
    pub name: SmolStr,
    /// Particle mass in the file's reduced units.
    pub mass: f64,
    /// Partial charge in units of the elementary charge.
    pub charge: f64,
}

impl AtomType {
    /// Creates a new atom type from a label, mass, and charge.
    ///
    /// # Arguments
    ///
    /// * `name` - Species label such as `"H"` or `"H+"`.
    /// * `mass` - Particle mass.
    /// * `charge` - Partial charge.
    ///
    /// # Returns
    ///
    /// A fully initialized `AtomType`.
    pub fn new(name: &str, mass: f64, charge: f64) -> Self {
        Self {
            name: SmolStr::new(name),
            mass,
            charge,
        }
    }
}

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AtomType {{ name: \"{}\", mass: {:.5}, charge: {:.5} }}",
            self.name, self.mass, self.charge
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atom_type_new_creates_correct_atom_type() {
        let atom = AtomType::new("H+", 1.008, 1.0);

        assert_eq!(atom.name, "H+");
        assert_eq!(atom.mass, 1.008);
        assert_eq!(atom.charge, 1.0);
    }

    #[test]
    fn atom_type_display_formats_correctly() {
        let atom = AtomType::new("O", 15.999, -0.5);

        let display = format!("{}", atom);

        assert_eq!(
            display,
            "AtomType { name: \"O\", mass: 15.99900, charge: -0.50000 }"
        );
    }

    #[test]
    fn atom_type_clone_creates_identical_copy() {
        let atom = AtomType::new("Be", 9.01218, 0.0);
        let cloned = atom.clone();

        assert_eq!(atom, cloned);
    }
}
