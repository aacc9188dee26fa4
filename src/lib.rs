//! # OccamForge
//!
//! **OccamForge** is a pure-Rust toolkit for the file formats surrounding OCCAM-style hybrid particle-field simulations. Its centerpiece is a transactional editor for the fixed-section force-field file (fort.3): parse, apply a batch of typed replacement directives, remap the interaction matrix, and re-serialize, with the output written only after the whole batch has succeeded. Around it sit typed readers for the control file (fort.1), the thermodynamic log (fort.7), and .xyz trajectories, plus configuration generators, format converters, and run-level aggregation with a binary cache.
//!
//! ## Features
//!
//! - **Transactional topology edits** – Replacement directives are validated, matched by label with the format's symmetry rules, and applied all-or-nothing; a failing batch leaves the source file untouched.
//! - **Positional atom identity** – Atom types are identified by their position in the file, never by the stored id column, so legacy files with stale ids parse and rewrite correctly.
//! - **Interaction-matrix remapping** – When the atom set changes, the chi matrix is rebuilt under the new ordering with sentinel entries for new species.
//! - **Run aggregation** – fort.1, fort.7, and trajectory data combine into one `RunData` with cross-file consistency warnings and a bincode side-cache.
//! - **Configuration tooling** – Uniform-random, relaxed, and FCC-lattice fort.5 generators, fort.5 ⇄ .xyz converters, and histogram/RDF reductions over trajectories.

mod model;
mod utils;

pub mod data;
pub mod io;
pub mod ops;

pub use model::atom::AtomType;
pub use model::chi::{ChiMatrix, SENTINEL};
pub use model::records::{BondAngle, BondType, NonBonded, ScfGrid, Torsion};
pub use model::replacement::{Payload, Replacement};
pub use model::topology::Topology;
pub use model::types::{Action, PropertyKind};
