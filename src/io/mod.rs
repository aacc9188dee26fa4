//! Readers and writers for the OCCAM family of simulation file formats.
//!
//! Every format gets a stream-based entry point over [`std::io::BufRead`] or
//! [`std::io::Write`] plus a path-based convenience wrapper; the path
//! wrappers log the load, attach progress reporting, and stamp the file path
//! into any error raised by the stream layer.

mod error;
mod fort1;
mod fort3;
mod fort5;
mod fort7;
mod progress;
mod xyz;

pub use fort3::reader::{read as read_fort3, read_file as read_fort3_file};
pub use fort3::writer::write as write_fort3;

pub use fort1::reader::{read as read_fort1, read_file as read_fort1_file, AdaptiveRegion, Fort1};
pub use fort1::writer::replace_in_fort1;
pub(crate) use fort1::writer::default_output_path;

pub use fort7::reader::{read as read_fort7, read_file as read_fort7_file, Fort7};

pub use xyz::reader::{read as read_xyz, read_file as read_xyz_file, Xyz};

pub use fort5::reader::{read as read_fort5, read_file as read_fort5_file, Fort5, Fort5Particle};
pub use fort5::writer::Fort5Writer;

pub use error::Error;
