//! Transactional application of replacement directives to a topology.
//!
//! The merge runs in four strictly ordered passes: pre-validation, atom-type
//! directives, record directives (bond/angle/torsion/non-bonded), and the
//! scalar directives (grid, compressibility). The input document is cloned
//! once at transaction start and only the clone is mutated, so any failure
//! leaves the caller's document untouched and the whole batch applies
//! all-or-nothing.
//!
//! Within the atom pass, directives see the result of every earlier directive
//! in the same batch; record directives are then resolved against the final
//! atom set. Matching semantics follow the record types: pairs and angle
//! outer atoms compare unordered, torsions compare in the given order only.

use crate::model::replacement::{Payload, Replacement};
use crate::model::topology::Topology;
use crate::model::types::{Action, PropertyKind};
use crate::ops::error::Error;
use smol_str::SmolStr;
use std::collections::HashMap;

/// Mapping from old to new 1-based atom ordinals across a merge.
///
/// Atom-type directives never remove or reorder atoms (Replace edits in
/// place, New appends), so the map produced by [`merge`] is the identity over
/// the surviving ordinals; the type still supports arbitrary permutations
/// because the chi remapper accepts any old/new ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomIdentityMap {
    map: HashMap<usize, usize>,
}

impl AtomIdentityMap {
    /// Builds the map between two atom-label orderings.
    ///
    /// Labels present in only one of the sequences carry no entry.
    pub fn between(old_names: &[SmolStr], new_names: &[SmolStr]) -> Self {
        let new_ordinal: HashMap<&SmolStr, usize> = new_names
            .iter()
            .enumerate()
            .map(|(index, name)| (name, index + 1))
            .collect();

        let map = old_names
            .iter()
            .enumerate()
            .filter_map(|(index, name)| {
                new_ordinal.get(name).map(|&new| (index + 1, new))
            })
            .collect();
        Self { map }
    }

    /// New 1-based ordinal of the atom that held `old` before the merge.
    pub fn new_ordinal(&self, old: usize) -> Option<usize> {
        self.map.get(&old).copied()
    }

    /// Number of atoms present both before and after.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Applies a directive batch to a topology document, transactionally.
///
/// # Arguments
///
/// * `topology` - Document to merge into; never mutated.
/// * `directives` - Batch of replacement directives, applied in order.
///
/// # Returns
///
/// The merged document, with its chi matrix remapped to the final atom set,
/// and the old-to-new atom ordinal map.
///
/// # Errors
///
/// Returns [`Error::Validation`] for directives that can never apply (chi),
/// [`Error::Referential`] for record directives naming unknown atom types,
/// [`Error::Duplicate`] when New collides with an existing matching record,
/// and [`Error::NotFound`] when Replace has no matching target. Any error
/// aborts the whole batch.
pub fn merge(
    topology: &Topology,
    directives: &[Replacement],
) -> Result<(Topology, AtomIdentityMap), Error> {
    validate(directives)?;

    let old_names = topology.atom_names();
    let mut updated = topology.clone();

    apply_atom_directives(&mut updated, directives)?;
    apply_record_directives(&mut updated, directives)?;
    apply_scalar_directives(&mut updated, directives)?;

    let new_names = updated.atom_names();
    if old_names != new_names {
        updated.set_chi(topology.chi().remap(&old_names, &new_names));
    }

    let map = AtomIdentityMap::between(&old_names, &new_names);
    Ok((updated, map))
}

/// Rejects directives that cannot apply regardless of document state.
///
/// Chi is a recognized kind, but no directive payload carries interaction
/// matrix entries, so a chi directive can never be honored.
fn validate(directives: &[Replacement]) -> Result<(), Error> {
    for directive in directives {
        if directive.kind() == PropertyKind::Chi {
            return Err(Error::validation(
                PropertyKind::Chi,
                "no directive payload carries interaction-matrix entries",
            ));
        }
    }
    Ok(())
}

fn apply_atom_directives(
    topology: &mut Topology,
    directives: &[Replacement],
) -> Result<(), Error> {
    for directive in directives {
        let Payload::Atom(atom) = directive.payload() else {
            continue;
        };
        let found = topology.has_atom(&atom.name);
        match (found, directive.action()) {
            (true, Action::Replace) => {
                // Name and therefore ordinal are retained; only the physical
                // data changes.
                let existing = topology
                    .atom_mut(&atom.name)
                    .ok_or_else(|| Error::not_found(PropertyKind::AtomType, atom.name.as_str()))?;
                existing.mass = atom.mass;
                existing.charge = atom.charge;
            }
            (true, Action::New) => {
                return Err(Error::duplicate(
                    PropertyKind::AtomType,
                    atom.name.as_str(),
                    format!("conflicting payload {atom}"),
                ));
            }
            (false, Action::New) => topology.add_atom(atom.clone()),
            (false, Action::Replace) => {
                return Err(Error::not_found(PropertyKind::AtomType, atom.name.as_str()));
            }
        }
    }
    Ok(())
}

/// Outcome of the found/not-found decision table for a record directive.
enum Fate {
    Overwrite,
    Append,
}

/// Decides what a record directive does, or why it fails.
fn record_fate(
    found: bool,
    action: Action,
    kind: PropertyKind,
    name: String,
) -> Result<Fate, Error> {
    match (found, action) {
        (true, Action::Replace) => Ok(Fate::Overwrite),
        (true, Action::New) => Err(Error::duplicate(
            kind,
            name,
            format!("a matching {kind} record already exists"),
        )),
        (false, Action::New) => Ok(Fate::Append),
        (false, Action::Replace) => Err(Error::not_found(kind, name)),
    }
}

fn apply_record_directives(
    topology: &mut Topology,
    directives: &[Replacement],
) -> Result<(), Error> {
    for directive in directives {
        match directive.payload() {
            Payload::Bond(bond) => {
                check_atoms(topology, PropertyKind::BondType, [&bond.a, &bond.b])?;
                let found = topology
                    .bonds()
                    .iter()
                    .any(|b| b.connects(&bond.a, &bond.b));
                let name = format!("{}-{}", bond.a, bond.b);
                match record_fate(found, directive.action(), PropertyKind::BondType, name)? {
                    Fate::Overwrite => {
                        if let Some(existing) = topology.find_bond_mut(&bond.a, &bond.b) {
                            *existing = bond.clone();
                        }
                    }
                    Fate::Append => topology.add_bond(bond.clone()),
                }
            }
            Payload::Angle(angle) => {
                check_atoms(
                    topology,
                    PropertyKind::BondAngle,
                    [&angle.outer_a, &angle.center, &angle.outer_b],
                )?;
                let found = topology
                    .angles()
                    .iter()
                    .any(|a| a.spans(&angle.center, &angle.outer_a, &angle.outer_b));
                let name = format!("{}-{}-{}", angle.outer_a, angle.center, angle.outer_b);
                match record_fate(found, directive.action(), PropertyKind::BondAngle, name)? {
                    Fate::Overwrite => {
                        if let Some(existing) =
                            topology.find_angle_mut(&angle.center, &angle.outer_a, &angle.outer_b)
                        {
                            *existing = angle.clone();
                        }
                    }
                    Fate::Append => topology.add_angle(angle.clone()),
                }
            }
            Payload::Torsion(torsion) => {
                check_atoms(topology, PropertyKind::Torsion, torsion.names.iter())?;
                let found = topology
                    .torsions()
                    .iter()
                    .any(|t| t.same_sequence(&torsion.names));
                let name = torsion.names.join("-");
                match record_fate(found, directive.action(), PropertyKind::Torsion, name)? {
                    Fate::Overwrite => {
                        if let Some(existing) = topology.find_torsion_mut(&torsion.names) {
                            *existing = torsion.clone();
                        }
                    }
                    Fate::Append => topology.add_torsion(torsion.clone()),
                }
            }
            Payload::NonBonded(pair) => {
                check_atoms(topology, PropertyKind::NonBonded, [&pair.a, &pair.b])?;
                let found = topology
                    .non_bonded()
                    .iter()
                    .any(|p| p.connects(&pair.a, &pair.b));
                let name = format!("{}-{}", pair.a, pair.b);
                match record_fate(found, directive.action(), PropertyKind::NonBonded, name)? {
                    Fate::Overwrite => {
                        if let Some(existing) = topology.find_non_bonded_mut(&pair.a, &pair.b) {
                            *existing = pair.clone();
                        }
                    }
                    Fate::Append => topology.add_non_bonded(pair.clone()),
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Referential check against the final atom set of the atom pass.
fn check_atoms<'a>(
    topology: &Topology,
    kind: PropertyKind,
    names: impl IntoIterator<Item = &'a SmolStr>,
) -> Result<(), Error> {
    for name in names {
        if !topology.has_atom(name) {
            return Err(Error::referential(kind, name.as_str()));
        }
    }
    Ok(())
}

/// Scalar pass: Replace overwrites and the last applicable directive wins.
///
/// New is rejected with a duplicate error because a parsed document always
/// carries a grid and a compressibility value.
fn apply_scalar_directives(
    topology: &mut Topology,
    directives: &[Replacement],
) -> Result<(), Error> {
    for directive in directives {
        match directive.payload() {
            Payload::Grid(grid) => match directive.action() {
                Action::Replace => topology.set_grid(*grid),
                Action::New => {
                    return Err(Error::duplicate(
                        PropertyKind::ScfGrid,
                        grid.to_string(),
                        "the document already carries a grid descriptor",
                    ));
                }
            },
            Payload::Compressibility(kappa) => match directive.action() {
                Action::Replace => topology.set_kappa(*kappa),
                Action::New => {
                    return Err(Error::duplicate(
                        PropertyKind::Compressibility,
                        kappa.to_string(),
                        "the document already carries a compressibility value",
                    ));
                }
            },
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::atom::AtomType;
    use crate::model::chi::{ChiMatrix, SENTINEL};
    use crate::model::records::{BondAngle, BondType, NonBonded, ScfGrid, Torsion};

    fn base_topology() -> Topology {
        let mut topology = Topology::new("merge test system");
        topology.add_atom(AtomType::new("O", 15.9994, -0.5));
        topology.add_atom(AtomType::new("H", 1.008, 0.4));
        topology.add_atom(AtomType::new("Be", 9.01218, 0.0));
        topology.add_atom(AtomType::new("H+", 1.008, 1.0));
        topology.add_bond(BondType::new("O", "H", 1.0, 450.0));
        topology.add_angle(BondAngle::new("H", "O", "Be", 104.5, 55.0));
        topology.add_torsion(Torsion::new("H", "O", "Be", "H+", 180.0, 2.0));
        topology.add_non_bonded(NonBonded::new("O", "Be", 0.3, 0.8));
        topology.set_grid(ScfGrid::new(24, 24, 36));
        topology.set_kappa(0.05);
        topology.set_chi(
            ChiMatrix::from_rows(&[
                vec![0.0, 1.2, 2.3, 3.4],
                vec![1.2, 0.0, 0.5, 0.6],
                vec![2.3, 0.5, 0.0, 0.7],
                vec![3.4, 0.6, 0.7, 0.0],
            ])
            .unwrap(),
        );
        topology
    }

    #[test]
    fn merge_appends_new_atom_with_next_ordinal() {
        let topology = base_topology();
        let directives = [Replacement::new(Payload::Atom(AtomType::new(
            "K", 1.298, 0.0,
        )))];

        let (merged, map) = merge(&topology, &directives).expect("merge succeeds");

        assert_eq!(merged.atom_count(), 5);
        assert_eq!(merged.ordinal_of("K"), Some(5));
        assert_eq!(merged.atom("K").unwrap().mass, 1.298);
        assert_eq!(merged.atom("K").unwrap().charge, 0.0);
        // Prior records still resolve to the ordinals of their names.
        assert_eq!(merged.ordinal_of("O"), Some(1));
        assert!(merged.bonds()[0].connects("O", "H"));
        assert_eq!(map.new_ordinal(1), Some(1));
        assert_eq!(map.new_ordinal(4), Some(4));
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn merge_inserting_atom_pads_chi_with_sentinel() {
        let topology = base_topology();
        let directives = [Replacement::new(Payload::Atom(AtomType::new(
            "K", 1.298, 0.0,
        )))];

        let (merged, _) = merge(&topology, &directives).unwrap();

        assert_eq!(merged.chi().dim(), 5);
        assert_eq!(merged.chi().get(0, 1), 1.2);
        assert_eq!(merged.chi().get(4, 0), SENTINEL);
        assert_eq!(merged.chi().get(2, 4), SENTINEL);
    }

    #[test]
    fn merge_replace_atom_edits_in_place_without_renumbering() {
        let topology = base_topology();
        let directives = [Replacement::replace(Payload::Atom(AtomType::new(
            "H", 2.014, 0.4,
        )))];

        let (merged, map) = merge(&topology, &directives).unwrap();

        assert_eq!(merged.atom("H").unwrap().mass, 2.014);
        assert_eq!(merged.ordinal_of("H"), Some(2));
        assert_eq!(merged.chi(), topology.chi());
        assert_eq!(map.new_ordinal(2), Some(2));
    }

    #[test]
    fn merge_new_atom_with_existing_name_is_a_duplicate() {
        let topology = base_topology();
        let directives = [Replacement::new(Payload::Atom(AtomType::new(
            "O", 16.0, 0.0,
        )))];

        let err = merge(&topology, &directives).unwrap_err();

        match err {
            Error::Duplicate { kind, name, .. } => {
                assert_eq!(kind, PropertyKind::AtomType);
                assert_eq!(name, "O");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn merge_replace_missing_atom_is_not_found() {
        let topology = base_topology();
        let directives = [Replacement::replace(Payload::Atom(AtomType::new(
            "Xx", 1.0, 0.0,
        )))];

        let err = merge(&topology, &directives).unwrap_err();

        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[test]
    fn merge_atom_directives_have_sequential_visibility() {
        let topology = base_topology();
        let directives = [
            Replacement::new(Payload::Atom(AtomType::new("K", 1.0, 0.0))),
            Replacement::replace(Payload::Atom(AtomType::new("K", 1.298, 0.1))),
        ];

        let (merged, _) = merge(&topology, &directives).expect("second directive sees the first");

        assert_eq!(merged.atom("K").unwrap().mass, 1.298);
        assert_eq!(merged.atom("K").unwrap().charge, 0.1);
    }

    #[test]
    fn merge_replace_bond_matches_reversed_endpoints() {
        let topology = base_topology();
        let directives = [Replacement::replace(Payload::Bond(BondType::new(
            "H", "O", 0.96, 500.0,
        )))];

        let (merged, _) = merge(&topology, &directives).unwrap();

        assert_eq!(merged.bonds().len(), 1);
        assert_eq!(merged.bonds()[0].length, 0.96);
        assert_eq!(merged.bonds()[0].energy, 500.0);
    }

    #[test]
    fn merge_new_bond_conflicts_with_reversed_endpoints() {
        let topology = base_topology();
        let directives = [Replacement::new(Payload::Bond(BondType::new(
            "H", "O", 0.96, 500.0,
        )))];

        let err = merge(&topology, &directives).unwrap_err();

        assert!(matches!(err, Error::Duplicate { kind: PropertyKind::BondType, .. }));
    }

    #[test]
    fn merge_record_directive_can_reference_atom_added_in_same_batch() {
        let topology = base_topology();
        let directives = [
            Replacement::new(Payload::Atom(AtomType::new("K", 1.298, 0.0))),
            Replacement::new(Payload::Bond(BondType::new("K", "O", 2.0, 10.0))),
        ];

        let (merged, _) = merge(&topology, &directives).unwrap();

        assert_eq!(merged.bonds().len(), 2);
        assert!(merged.bonds()[1].connects("K", "O"));
    }

    #[test]
    fn merge_bond_with_unknown_atom_is_referential_error() {
        let topology = base_topology();
        let directives = [Replacement::new(Payload::Bond(BondType::new(
            "O", "Xx", 1.0, 1.0,
        )))];

        let err = merge(&topology, &directives).unwrap_err();

        match err {
            Error::Referential { kind, name } => {
                assert_eq!(kind, PropertyKind::BondType);
                assert_eq!(name, "Xx");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn merge_replace_angle_matches_swapped_outer_pair() {
        let topology = base_topology();
        let directives = [Replacement::replace(Payload::Angle(BondAngle::new(
            "Be", "O", "H", 120.0, 60.0,
        )))];

        let (merged, _) = merge(&topology, &directives).unwrap();

        assert_eq!(merged.angles().len(), 1);
        assert_eq!(merged.angles()[0].theta0, 120.0);
    }

    #[test]
    fn merge_angle_with_different_center_does_not_match() {
        let topology = base_topology();
        let directives = [Replacement::replace(Payload::Angle(BondAngle::new(
            "O", "Be", "H", 120.0, 60.0,
        )))];

        let err = merge(&topology, &directives).unwrap_err();

        assert!(matches!(err, Error::NotFound { kind: PropertyKind::BondAngle, .. }));
    }

    #[test]
    fn merge_reversed_torsion_does_not_match() {
        let topology = base_topology();
        let directives = [Replacement::replace(Payload::Torsion(Torsion::new(
            "H+", "Be", "O", "H", 0.0, 1.0,
        )))];

        let err = merge(&topology, &directives).unwrap_err();

        assert!(matches!(err, Error::NotFound { kind: PropertyKind::Torsion, .. }));
    }

    #[test]
    fn merge_ordered_torsion_replaces_in_place() {
        let topology = base_topology();
        let directives = [Replacement::replace(Payload::Torsion(Torsion::new(
            "H", "O", "Be", "H+", 0.0, 4.0,
        )))];

        let (merged, _) = merge(&topology, &directives).unwrap();

        assert_eq!(merged.torsions().len(), 1);
        assert_eq!(merged.torsions()[0].phi0, 0.0);
        assert_eq!(merged.torsions()[0].force_constant, 4.0);
    }

    #[test]
    fn merge_last_scalar_replace_wins() {
        let topology = base_topology();
        let directives = [
            Replacement::replace(Payload::Compressibility(0.1)),
            Replacement::replace(Payload::Grid(ScfGrid::new(8, 8, 8))),
            Replacement::replace(Payload::Compressibility(0.2)),
        ];

        let (merged, _) = merge(&topology, &directives).unwrap();

        assert_eq!(merged.kappa(), 0.2);
        assert_eq!(merged.grid(), ScfGrid::new(8, 8, 8));
    }

    #[test]
    fn merge_new_scalar_is_a_duplicate() {
        let topology = base_topology();
        let directives = [Replacement::new(Payload::Compressibility(0.1))];

        let err = merge(&topology, &directives).unwrap_err();

        assert!(matches!(
            err,
            Error::Duplicate { kind: PropertyKind::Compressibility, .. }
        ));
    }

    #[test]
    fn merge_chi_directive_fails_pre_validation() {
        let topology = base_topology();
        let directives = [
            Replacement::new(Payload::Atom(AtomType::new("K", 1.0, 0.0))),
            Replacement::new(Payload::Chi),
        ];

        let err = merge(&topology, &directives).unwrap_err();

        assert!(matches!(err, Error::Validation { kind: PropertyKind::Chi, .. }));
    }

    #[test]
    fn merge_failure_leaves_input_untouched() {
        let topology = base_topology();
        let directives = [
            Replacement::new(Payload::Atom(AtomType::new("K", 1.0, 0.0))),
            Replacement::replace(Payload::Atom(AtomType::new("Xx", 1.0, 0.0))),
        ];

        let before = topology.clone();
        let _ = merge(&topology, &directives).unwrap_err();

        assert_eq!(topology.atom_names(), before.atom_names());
        assert_eq!(topology.atom_count(), 4);
    }

    #[test]
    fn merge_empty_batch_returns_identical_document() {
        let topology = base_topology();

        let (merged, map) = merge(&topology, &[]).unwrap();

        assert_eq!(merged.atom_names(), topology.atom_names());
        assert_eq!(merged.chi(), topology.chi());
        assert_eq!(map.len(), 4);
    }

    #[test]
    fn atom_identity_map_between_tracks_permutation() {
        let old: Vec<SmolStr> = ["A", "B"].map(SmolStr::new).to_vec();
        let new: Vec<SmolStr> = ["B", "A"].map(SmolStr::new).to_vec();

        let map = AtomIdentityMap::between(&old, &new);

        assert_eq!(map.new_ordinal(1), Some(2));
        assert_eq!(map.new_ordinal(2), Some(1));
        assert_eq!(map.new_ordinal(3), None);
    }
}
