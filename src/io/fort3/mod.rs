//! Reading and writing of the fixed-section fort.3 topology format.

pub mod reader;
pub mod writer;
