//! Interaction records connecting atom types: bonds, angles, torsions, and
//! non-bonded pairs, plus the SCF grid descriptor.
//!
//! Records reference atom types by label, never by ordinal; ordinals are
//! resolved against the owning [`Topology`](super::topology::Topology) only
//! when a file is read or written. Matching rules differ per record kind:
//! pairs and angle outer atoms compare unordered, torsions compare in the
//! given order only.

use smol_str::SmolStr;
use std::fmt;

/// Bonded pair potential between two atom types.
///
/// The endpoint pair is unordered: a bond stored as (A, B) is the same bond
/// as (B, A).
#[derive(Debug, Clone, PartialEq)]
pub struct BondType {
    /// Label of one endpoint.
    pub a: SmolStr,
    /// Label of the other endpoint.
    pub b: SmolStr,
    /// Equilibrium bond length.
    pub length: f64,
    /// Bond energy parameter.
    pub energy: f64,
}

/// Three-body angle potential with a fixed center atom.
///
/// The outer pair is unordered around the center: (X, C, Y) matches
/// (Y, C, X) for the same center C.
#[derive(Debug, Clone, PartialEq)]
pub struct BondAngle {
    /// Label of the central atom.
    pub center: SmolStr,
    /// Label of one outer atom.
    pub outer_a: SmolStr,
    /// Label of the other outer atom.
    pub outer_b: SmolStr,
    /// Equilibrium angle.
    pub theta0: f64,
    /// Angle force constant.
    pub force_constant: f64,
}

/// Four-body torsion potential.
///
/// The atom sequence is significant: no reversal symmetry is applied when
/// matching, so (A, B, C, D) and (D, C, B, A) are distinct records.
#[derive(Debug, Clone, PartialEq)]
pub struct Torsion {
    /// Labels of the four atoms in chain order.
    pub names: [SmolStr; 4],
    /// Equilibrium dihedral angle.
    pub phi0: f64,
    /// Torsion force constant.
    pub force_constant: f64,
}

/// Non-bonded pair interaction between two atom types.
///
/// Endpoints compare unordered, exactly as for [`BondType`].
#[derive(Debug, Clone, PartialEq)]
pub struct NonBonded {
    /// Label of one endpoint.
    pub a: SmolStr,
    /// Label of the other endpoint.
    pub b: SmolStr,
    /// Interaction length scale.
    pub sigma: f64,
    /// Interaction energy scale.
    pub epsilon: f64,
}

/// SCF grid resolution along the three box axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScfGrid {
    pub mx: u32,
    pub my: u32,
    pub mz: u32,
}

impl BondType {
    pub fn new(a: &str, b: &str, length: f64, energy: f64) -> Self {
        Self {
            a: SmolStr::new(a),
            b: SmolStr::new(b),
            length,
            energy,
        }
    }

    /// Tests whether this bond connects the two given labels, in either order.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.a == a && self.b == b) || (self.a == b && self.b == a)
    }
}

impl BondAngle {
    /// Creates an angle from its atoms in chain order; the middle argument is
    /// the center.
    pub fn new(outer_a: &str, center: &str, outer_b: &str, theta0: f64, force_constant: f64) -> Self {
        Self {
            center: SmolStr::new(center),
            outer_a: SmolStr::new(outer_a),
            outer_b: SmolStr::new(outer_b),
            theta0,
            force_constant,
        }
    }

    /// Tests whether this angle spans the given outer pair (unordered) around
    /// the given center.
    pub fn spans(&self, center: &str, outer_a: &str, outer_b: &str) -> bool {
        self.center == center
            && ((self.outer_a == outer_a && self.outer_b == outer_b)
                || (self.outer_a == outer_b && self.outer_b == outer_a))
    }
}

impl Torsion {
    pub fn new(a: &str, b: &str, c: &str, d: &str, phi0: f64, force_constant: f64) -> Self {
        Self {
            names: [
                SmolStr::new(a),
                SmolStr::new(b),
                SmolStr::new(c),
                SmolStr::new(d),
            ],
            phi0,
            force_constant,
        }
    }

    /// Tests whether this torsion spans the given labels in the given order.
    pub fn same_sequence(&self, names: &[SmolStr; 4]) -> bool {
        self.names == *names
    }
}

impl NonBonded {
    pub fn new(a: &str, b: &str, sigma: f64, epsilon: f64) -> Self {
        Self {
            a: SmolStr::new(a),
            b: SmolStr::new(b),
            sigma,
            epsilon,
        }
    }

    /// Tests whether this pair connects the two given labels, in either order.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.a == a && self.b == b) || (self.a == b && self.b == a)
    }
}

impl ScfGrid {
    pub fn new(mx: u32, my: u32, mz: u32) -> Self {
        Self { mx, my, mz }
    }
}

impl fmt::Display for ScfGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.mx, self.my, self.mz)
    }
}
