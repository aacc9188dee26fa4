use super::atom::AtomType;
use super::chi::ChiMatrix;
use super::records::{BondAngle, BondType, NonBonded, ScfGrid, Torsion};
use smol_str::SmolStr;
use std::fmt;

#[derive(Debug, Clone)]
pub struct Topology {
    title: String,
    atoms: Vec<AtomType>,
    bonds: Vec<BondType>,
    angles: Vec<BondAngle>,
    torsions: Vec<Torsion>,
    non_bonded: Vec<NonBonded>,
    grid: ScfGrid,
    kappa: f64,
    chi: ChiMatrix,
}

impl Default for Topology {
    fn default() -> Self {
        Self {
            title: String::new(),
            atoms: Vec::new(),
            bonds: Vec::new(),
            angles: Vec::new(),
            torsions: Vec::new(),
            non_bonded: Vec::new(),
            grid: ScfGrid::new(0, 0, 0),
            kappa: 0.0,
            chi: ChiMatrix::empty(),
        }
    }
}

impl Topology {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn add_atom(&mut self, atom: AtomType) {
        debug_assert!(
            self.atom(&atom.name).is_none(),
            "Attempted to add a duplicate atom type '{}'",
            atom.name
        );
        self.atoms.push(atom);
    }

    pub fn atom(&self, name: &str) -> Option<&AtomType> {
        self.atoms.iter().find(|a| a.name == name)
    }

    pub fn atom_mut(&mut self, name: &str) -> Option<&mut AtomType> {
        self.atoms.iter_mut().find(|a| a.name == name)
    }

    pub fn atoms(&self) -> &[AtomType] {
        &self.atoms
    }

    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn has_atom(&self, name: &str) -> bool {
        self.atom(name).is_some()
    }

    /// 1-based position of the named atom type, as used for ids in the file.
    pub fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.atoms.iter().position(|a| a.name == name).map(|i| i + 1)
    }

    pub fn atom_names(&self) -> Vec<SmolStr> {
        self.atoms.iter().map(|a| a.name.clone()).collect()
    }

    pub fn add_bond(&mut self, bond: BondType) {
        self.bonds.push(bond);
    }

    pub fn bonds(&self) -> &[BondType] {
        &self.bonds
    }

    pub fn find_bond_mut(&mut self, a: &str, b: &str) -> Option<&mut BondType> {
        self.bonds.iter_mut().find(|bond| bond.connects(a, b))
    }

    pub fn add_angle(&mut self, angle: BondAngle) {
        self.angles.push(angle);
    }

    pub fn angles(&self) -> &[BondAngle] {
        &self.angles
    }

    pub fn find_angle_mut(
        &mut self,
        center: &str,
        outer_a: &str,
        outer_b: &str,
    ) -> Option<&mut BondAngle> {
        self.angles
            .iter_mut()
            .find(|angle| angle.spans(center, outer_a, outer_b))
    }

    pub fn add_torsion(&mut self, torsion: Torsion) {
        self.torsions.push(torsion);
    }

    pub fn torsions(&self) -> &[Torsion] {
        &self.torsions
    }

    pub fn find_torsion_mut(&mut self, names: &[SmolStr; 4]) -> Option<&mut Torsion> {
        self.torsions
            .iter_mut()
            .find(|torsion| torsion.same_sequence(names))
    }

    pub fn add_non_bonded(&mut self, pair: NonBonded) {
        self.non_bonded.push(pair);
    }

    pub fn non_bonded(&self) -> &[NonBonded] {
        &self.non_bonded
    }

    pub fn find_non_bonded_mut(&mut self, a: &str, b: &str) -> Option<&mut NonBonded> {
        self.non_bonded.iter_mut().find(|pair| pair.connects(a, b))
    }

    pub fn grid(&self) -> ScfGrid {
        self.grid
    }

    pub fn set_grid(&mut self, grid: ScfGrid) {
        self.grid = grid;
    }

    pub fn kappa(&self) -> f64 {
        self.kappa
    }

    pub fn set_kappa(&mut self, kappa: f64) {
        self.kappa = kappa;
    }

    pub fn chi(&self) -> &ChiMatrix {
        &self.chi
    }

    pub fn set_chi(&mut self, chi: ChiMatrix) {
        self.chi = chi;
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Topology {{ atoms: {}, bonds: {}, angles: {}, torsions: {}, non-bonded: {} }}",
            self.atoms.len(),
            self.bonds.len(),
            self.angles.len(),
            self.torsions.len(),
            self.non_bonded.len()
        )
    }
}
