//! High-level operations: topology merging and replacement, configuration
//! generation, format conversion, and trajectory reductions.

mod convert;
mod error;
mod generate;
mod histogram;
mod merge;
mod replace;

pub use convert::{fort5_to_xyz, xyz_to_fort5};
pub use error::Error;
pub use generate::{
    generate_fcc, generate_uniform, generate_uniform_stable, generate_uniform_stable_with,
    generate_uniform_with, StableOptions,
};
pub use histogram::{histogram, radial_distribution, Axis, Histogram, RadialDistribution};
pub use merge::{merge, AtomIdentityMap};
pub use replace::replace_topology;
