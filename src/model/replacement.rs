//! Edit directives applied to a [`Topology`](super::topology::Topology) by
//! the merge operation.
//!
//! A [`Replacement`] pairs an [`Action`] (add a new record or replace an
//! existing one) with a typed payload. The action is fixed at construction,
//! so a directive can never be in an ambiguous "neither" or contradictory
//! "both" state, and the target kind is derived from the payload variant
//! rather than carried separately.

use super::atom::AtomType;
use super::records::{BondAngle, BondType, NonBonded, ScfGrid, Torsion};
use super::types::{Action, PropertyKind};
use std::fmt;

/// Typed content of a directive, one variant per property kind.
///
/// `Chi` carries no data: interaction-matrix directives are recognized but
/// not applicable, and are rejected during merge pre-validation.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Atom(AtomType),
    Bond(BondType),
    Angle(BondAngle),
    Torsion(Torsion),
    NonBonded(NonBonded),
    Grid(ScfGrid),
    Compressibility(f64),
    Chi,
}

impl Payload {
    pub fn kind(&self) -> PropertyKind {
        match self {
            Payload::Atom(_) => PropertyKind::AtomType,
            Payload::Bond(_) => PropertyKind::BondType,
            Payload::Angle(_) => PropertyKind::BondAngle,
            Payload::Torsion(_) => PropertyKind::Torsion,
            Payload::NonBonded(_) => PropertyKind::NonBonded,
            Payload::Grid(_) => PropertyKind::ScfGrid,
            Payload::Compressibility(_) => PropertyKind::Compressibility,
            Payload::Chi => PropertyKind::Chi,
        }
    }
}

/// One add-or-replace request against a topology document.
///
/// Directives are immutable once constructed and are read, never consumed,
/// by the merge operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Replacement {
    action: Action,
    payload: Payload,
}

impl Replacement {
    /// Creates a directive that appends a record not present yet.
    pub fn new(payload: Payload) -> Self {
        Self {
            action: Action::New,
            payload,
        }
    }

    /// Creates a directive that overwrites an existing matching record.
    pub fn replace(payload: Payload) -> Self {
        Self {
            action: Action::Replace,
            payload,
        }
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn kind(&self) -> PropertyKind {
        self.payload.kind()
    }
}

impl fmt::Display for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Replacement {{ kind: {}, action: {} }}",
            self.kind(),
            self.action
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replacement_new_sets_new_action() {
        let directive = Replacement::new(Payload::Atom(AtomType::new("K", 1.298, 0.0)));

        assert_eq!(directive.action(), Action::New);
        assert_eq!(directive.kind(), PropertyKind::AtomType);
    }

    #[test]
    fn replacement_replace_sets_replace_action() {
        let directive = Replacement::replace(Payload::Compressibility(0.05));

        assert_eq!(directive.action(), Action::Replace);
        assert_eq!(directive.kind(), PropertyKind::Compressibility);
    }

    #[test]
    fn payload_kind_covers_every_variant() {
        let cases = [
            (
                Payload::Atom(AtomType::new("O", 15.999, 0.0)),
                PropertyKind::AtomType,
            ),
            (
                Payload::Bond(BondType::new("O", "H", 1.0, 450.0)),
                PropertyKind::BondType,
            ),
            (
                Payload::Angle(BondAngle::new("H", "O", "H", 104.5, 55.0)),
                PropertyKind::BondAngle,
            ),
            (
                Payload::Torsion(Torsion::new("A", "B", "C", "D", 180.0, 2.0)),
                PropertyKind::Torsion,
            ),
            (
                Payload::NonBonded(NonBonded::new("O", "H", 0.3, 0.05)),
                PropertyKind::NonBonded,
            ),
            (Payload::Grid(ScfGrid::new(8, 8, 8)), PropertyKind::ScfGrid),
            (
                Payload::Compressibility(0.05),
                PropertyKind::Compressibility,
            ),
            (Payload::Chi, PropertyKind::Chi),
        ];

        for (payload, kind) in cases {
            assert_eq!(payload.kind(), kind);
        }
    }

    #[test]
    fn replacement_display_formats_correctly() {
        let directive = Replacement::new(Payload::Chi);

        assert_eq!(
            format!("{}", directive),
            "Replacement { kind: chi, action: new }"
        );
    }
}
