//! Reading and editing of the fort.1 simulation-control format.

pub mod reader;
pub mod writer;
