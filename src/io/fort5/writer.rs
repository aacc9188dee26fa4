//! Serializes initial configurations into the fort.5 format.
//!
//! The format carries a box block, a particle-count block, and one molecule
//! block per particle. Coordinates are written with fifteen decimal places,
//! matching the precision the simulation code expects on read-in.

use crate::io::error::Error;
use std::io::Write;

/// Incremental fort.5 writer driving any [`Write`] sink.
///
/// Callers emit the box block, then the particle count, then one molecule
/// block per particle, in that order; the writer does not reorder or buffer.
pub struct Fort5Writer<W> {
    writer: W,
}

impl<W: Write> Fort5Writer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn emit(&mut self, args: std::fmt::Arguments<'_>) -> Result<(), Error> {
        self.writer
            .write_fmt(args)
            .map_err(|e| Error::from_io(e, None))
    }

    /// Writes the `Box:` block with dimensions and scaling factor.
    pub fn write_box(&mut self, box_size: [f64; 3], scaling: f64) -> Result<(), Error> {
        self.emit(format_args!("Box:\n"))?;
        self.emit(format_args!(
            "{:.15} {:.15} {:.15} {:.15}\n",
            box_size[0], box_size[1], box_size[2], scaling
        ))
    }

    /// Writes the `Number of particles:` block.
    pub fn write_particle_count(&mut self, n_particles: usize) -> Result<(), Error> {
        self.emit(format_args!("Number of particles:\n"))?;
        self.emit(format_args!("{n_particles}\n"))
    }

    /// Writes one single-atom molecule block.
    ///
    /// # Arguments
    ///
    /// * `number` - 1-based molecule number.
    /// * `label` - Particle type label.
    /// * `position` - Particle coordinates.
    /// * `velocity` - Whether to emit a zero velocity triple before the bond
    ///   columns.
    pub fn write_molecule(
        &mut self,
        number: usize,
        label: &str,
        position: [f64; 3],
        velocity: bool,
    ) -> Result<(), Error> {
        self.emit(format_args!("Molecule # {number}\n"))?;
        self.emit(format_args!("1\n"))?;
        self.emit(format_args!("{number} {label} 1 0 "))?;
        self.emit(format_args!(
            "{:.15} {:.15} {:.15} ",
            position[0], position[1], position[2]
        ))?;
        if velocity {
            self.emit(format_args!("0 0 0 "))?;
        }
        self.emit(format_args!("0 0 0 0 0 0\n"))
    }
}
