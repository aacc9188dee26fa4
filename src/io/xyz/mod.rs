//! Reading of xyz trajectory files.

pub mod reader;
