//! Reading and writing of the fort.5 initial-configuration format.

pub mod reader;
pub mod writer;
