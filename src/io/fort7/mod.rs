//! Reading of the fort.7 thermodynamic log format.

pub mod reader;
