//! Core data structures modeling a coarse-grained force-field document.
//!
//! This module defines the foundational types for representing atom types,
//! interaction records, the pairwise interaction matrix, and the complete
//! topology document, along with the replacement directives that edit it.
//! These types are produced by the I/O parsers, transformed by the merge
//! pipeline, and rendered back by the writers.

pub mod atom;
pub mod chi;
pub mod records;
pub mod replacement;
pub mod topology;
pub mod types;
