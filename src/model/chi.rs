//! Pairwise interaction matrix ("chi") indexed by atom-type ordinal.
//!
//! The matrix is square with one row and column per atom type, in the same
//! order as the atom-type section, and is intended to be symmetric (symmetry
//! is not validated on read). When the atom-type set changes during a merge,
//! [`ChiMatrix::remap`] rebuilds the matrix under the new ordering; entries
//! for atom types that did not exist before are filled with [`SENTINEL`]
//! because no directive kind supplies interaction values.

use nalgebra::DMatrix;
use smol_str::SmolStr;
use std::collections::HashMap;

/// Placeholder written into rows and columns of newly introduced atom types.
pub const SENTINEL: f64 = -1.0;

/// Square matrix of pairwise interaction parameters.
///
/// Rows and columns follow the current atom-type ordering of the owning
/// topology; the matrix itself stores no labels. Remapping is therefore
/// always driven by the caller's old and new label sequences.
#[derive(Debug, Clone, PartialEq)]
pub struct ChiMatrix {
    values: DMatrix<f64>,
}

impl ChiMatrix {
    /// Creates a matrix from row-major data.
    ///
    /// # Arguments
    ///
    /// * `rows` - One `Vec<f64>` per matrix row.
    ///
    /// # Returns
    ///
    /// `None` when the rows do not form a square matrix.
    pub fn from_rows(rows: &[Vec<f64>]) -> Option<Self> {
        let n = rows.len();
        if rows.iter().any(|row| row.len() != n) {
            return None;
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Some(Self {
            values: DMatrix::from_row_slice(n, n, &flat),
        })
    }

    /// Creates an empty 0x0 matrix.
    pub fn empty() -> Self {
        Self {
            values: DMatrix::zeros(0, 0),
        }
    }

    /// Returns the number of rows (and columns).
    pub fn dim(&self) -> usize {
        self.values.nrows()
    }

    /// Returns the entry at `(i, j)`, 0-based.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[(i, j)]
    }

    /// Iterates over one row in column order.
    pub fn row(&self, i: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.dim()).map(move |j| self.values[(i, j)])
    }

    /// Rebuilds the matrix for a changed atom-type ordering.
    ///
    /// Every entry keyed by a pair of labels present in both sequences keeps
    /// its value at the pair's new ordinals. Entries whose row or column
    /// corresponds to a label absent from `old_names` are set to [`SENTINEL`].
    /// When the two sequences are identical the matrix is returned unchanged.
    ///
    /// # Arguments
    ///
    /// * `old_names` - Atom-type labels in the ordering this matrix was built
    ///   for; length must equal [`ChiMatrix::dim`].
    /// * `new_names` - Atom-type labels in the target ordering.
    ///
    /// # Returns
    ///
    /// A matrix of dimension `new_names.len()`.
    pub fn remap(&self, old_names: &[SmolStr], new_names: &[SmolStr]) -> ChiMatrix {
        debug_assert_eq!(self.dim(), old_names.len(), "Label count mismatch");

        if old_names == new_names {
            return self.clone();
        }

        let old_ordinal: HashMap<&SmolStr, usize> = old_names
            .iter()
            .enumerate()
            .map(|(ordinal, name)| (name, ordinal))
            .collect();

        let n = new_names.len();
        let values = DMatrix::from_fn(n, n, |i, j| {
            let row = old_ordinal.get(&new_names[i]);
            let col = old_ordinal.get(&new_names[j]);
            match (row, col) {
                (Some(&oi), Some(&oj)) => self.values[(oi, oj)],
                _ => SENTINEL,
            }
        });

        ChiMatrix { values }
    }
}
