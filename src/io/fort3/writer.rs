//! Serializes [`Topology`] documents back into the fort.3 format.
//!
//! The writer emits the sections in their fixed order and re-derives every id
//! column from the current position of the atom type in the document, so a
//! legacy file with out-of-sequence ids comes out renumbered. Floats are
//! written with five decimal places, which round-trips through the reader for
//! every value representable at that precision.

use crate::io::error::Error;
use crate::model::topology::Topology;
use std::io::Write;

/// Identifier used in diagnostics to reference the fort.3 format.
const FORMAT: &str = "fort.3";

/// Writes a topology document to any sink in the fort.3 format.
///
/// # Arguments
///
/// * `writer` - Destination that implements [`Write`].
/// * `topology` - Document to serialize.
///
/// # Errors
///
/// Returns [`Error::Io`] when the sink rejects a write and
/// [`Error::InconsistentData`] when a record references an atom type absent
/// from the document, which a merged document can never contain.
pub fn write<W: Write>(writer: W, topology: &Topology) -> Result<(), Error> {
    let mut ctx = WriterContext::new(writer, topology);

    ctx.write_title()?;
    ctx.write_atom_section()?;
    ctx.write_bond_section()?;
    ctx.write_angle_section()?;
    ctx.write_torsion_section()?;
    ctx.write_non_bonded_section()?;
    ctx.write_grid()?;
    ctx.write_kappa()?;
    ctx.write_chi()?;

    Ok(())
}

struct WriterContext<'a, W> {
    writer: W,
    topology: &'a Topology,
}

impl<'a, W: Write> WriterContext<'a, W> {
    fn new(writer: W, topology: &'a Topology) -> Self {
        Self { writer, topology }
    }

    fn emit(&mut self, args: std::fmt::Arguments<'_>) -> Result<(), Error> {
        self.writer
            .write_fmt(args)
            .map_err(|e| Error::from_io(e, None))
    }

    /// Current 1-based ordinal of the named atom type.
    fn ordinal(&self, name: &str) -> Result<usize, Error> {
        self.topology.ordinal_of(name).ok_or_else(|| {
            Error::inconsistent_data(
                FORMAT,
                None,
                format!("Record references atom type '{name}' absent from the atom-type section"),
            )
        })
    }

    fn write_title(&mut self) -> Result<(), Error> {
        self.emit(format_args!("{}\n", self.topology.title()))
    }

    fn write_atom_section(&mut self) -> Result<(), Error> {
        self.emit(format_args!(
            "{} different atom types:\n",
            self.topology.atom_count()
        ))?;
        self.emit(format_args!("* atom_no  label  mass  charge\n"))?;
        for (index, atom) in self.topology.atoms().iter().enumerate() {
            self.emit(format_args!(
                "{} {} {:.5} {:.5}\n",
                index + 1,
                atom.name,
                atom.mass,
                atom.charge
            ))?;
        }
        self.emit(format_args!("*****\n"))
    }

    fn write_bond_section(&mut self) -> Result<(), Error> {
        self.emit(format_args!(
            "{} different bond types:\n",
            self.topology.bonds().len()
        ))?;
        self.emit(format_args!(
            "* atom_1  atom_2  bond_length  bond_energy\n"
        ))?;
        for bond in self.topology.bonds() {
            let a = self.ordinal(&bond.a)?;
            let b = self.ordinal(&bond.b)?;
            self.emit(format_args!(
                "{} {} {:.5} {:.5}\n",
                a, b, bond.length, bond.energy
            ))?;
        }
        self.emit(format_args!("******\n"))
    }

    fn write_angle_section(&mut self) -> Result<(), Error> {
        self.emit(format_args!(
            "{} different bond angles:\n",
            self.topology.angles().len()
        ))?;
        self.emit(format_args!(
            "* atom_1  atom_2  atom_3  theta_0  force_constant\n"
        ))?;
        for angle in self.topology.angles() {
            let outer_a = self.ordinal(&angle.outer_a)?;
            let center = self.ordinal(&angle.center)?;
            let outer_b = self.ordinal(&angle.outer_b)?;
            self.emit(format_args!(
                "{} {} {} {:.5} {:.5}\n",
                outer_a, center, outer_b, angle.theta0, angle.force_constant
            ))?;
        }
        self.emit(format_args!("******\n"))
    }

    fn write_torsion_section(&mut self) -> Result<(), Error> {
        self.emit(format_args!(
            "{} different torsions:\n",
            self.topology.torsions().len()
        ))?;
        self.emit(format_args!(
            "* atom_1  atom_2  atom_3  atom_4  phi_0  force_constant\n"
        ))?;
        for torsion in self.topology.torsions() {
            let ordinals = [
                self.ordinal(&torsion.names[0])?,
                self.ordinal(&torsion.names[1])?,
                self.ordinal(&torsion.names[2])?,
                self.ordinal(&torsion.names[3])?,
            ];
            self.emit(format_args!(
                "{} {} {} {} {:.5} {:.5}\n",
                ordinals[0],
                ordinals[1],
                ordinals[2],
                ordinals[3],
                torsion.phi0,
                torsion.force_constant
            ))?;
        }
        self.emit(format_args!("******\n"))
    }

    fn write_non_bonded_section(&mut self) -> Result<(), Error> {
        self.emit(format_args!(
            "{} different non-bonded interactions:\n",
            self.topology.non_bonded().len()
        ))?;
        self.emit(format_args!("* atom_1  atom_2  sigma  epsilon\n"))?;
        for pair in self.topology.non_bonded() {
            let a = self.ordinal(&pair.a)?;
            let b = self.ordinal(&pair.b)?;
            self.emit(format_args!(
                "{} {} {:.5} {:.5}\n",
                a, b, pair.sigma, pair.epsilon
            ))?;
        }
        self.emit(format_args!("******\n"))
    }

    fn write_grid(&mut self) -> Result<(), Error> {
        let grid = self.topology.grid();
        self.emit(format_args!("{} {} {}\n", grid.mx, grid.my, grid.mz))
    }

    fn write_kappa(&mut self) -> Result<(), Error> {
        self.emit(format_args!("{:.5}\n", self.topology.kappa()))
    }

    fn write_chi(&mut self) -> Result<(), Error> {
        let chi = self.topology.chi();
        for i in 0..chi.dim() {
            for j in 0..chi.dim() {
                self.emit(format_args!("{:>10.5}", chi.get(i, j)))?;
                if j + 1 < chi.dim() {
                    self.emit(format_args!(" "))?;
                }
            }
            self.emit(format_args!("\n"))?;
        }
        Ok(())
    }
}
