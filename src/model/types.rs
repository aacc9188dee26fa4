use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    AtomType,
    BondType,
    BondAngle,
    Torsion,
    NonBonded,
    ScfGrid,
    Compressibility,
    Chi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    New,
    Replace,
}

impl PropertyKind {
    pub fn name(&self) -> &'static str {
        match self {
            PropertyKind::AtomType => "atom type",
            PropertyKind::BondType => "bond type",
            PropertyKind::BondAngle => "bond angle",
            PropertyKind::Torsion => "torsion",
            PropertyKind::NonBonded => "non-bonded",
            PropertyKind::ScfGrid => "scf grid",
            PropertyKind::Compressibility => "compressibility",
            PropertyKind::Chi => "chi",
        }
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PropertyKind {
    type Err = String;

    // Tolerant keyword lookup. Non-bonded is tested before the bonded kinds
    // since all its accepted spellings also contain "bond".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let p = s.to_lowercase();
        if p.contains("atom") {
            Ok(PropertyKind::AtomType)
        } else if p.contains("non") && p.contains("bond") {
            Ok(PropertyKind::NonBonded)
        } else if p.contains("bond") && p.contains("type") {
            Ok(PropertyKind::BondType)
        } else if p.contains("bond") && p.contains("ang") {
            Ok(PropertyKind::BondAngle)
        } else if p.contains("torsion") {
            Ok(PropertyKind::Torsion)
        } else if p.contains("scf") || p.contains("hpf") {
            Ok(PropertyKind::ScfGrid)
        } else if p.contains("comp") {
            Ok(PropertyKind::Compressibility)
        } else if p.contains("chi") {
            Ok(PropertyKind::Chi)
        } else {
            Err(format!("Property string {} was not recognized", s))
        }
    }
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::New => "new",
            Action::Replace => "replace",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(Action::New),
            "replace" => Ok(Action::Replace),
            _ => Err(format!("Invalid action: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_kind_name_returns_correct_string() {
        assert_eq!(PropertyKind::AtomType.name(), "atom type");
        assert_eq!(PropertyKind::BondType.name(), "bond type");
        assert_eq!(PropertyKind::BondAngle.name(), "bond angle");
        assert_eq!(PropertyKind::Torsion.name(), "torsion");
        assert_eq!(PropertyKind::NonBonded.name(), "non-bonded");
        assert_eq!(PropertyKind::ScfGrid.name(), "scf grid");
        assert_eq!(PropertyKind::Compressibility.name(), "compressibility");
        assert_eq!(PropertyKind::Chi.name(), "chi");
    }

    #[test]
    fn property_kind_display_formats_correctly() {
        assert_eq!(format!("{}", PropertyKind::AtomType), "atom type");
        assert_eq!(format!("{}", PropertyKind::NonBonded), "non-bonded");
        assert_eq!(format!("{}", PropertyKind::Chi), "chi");
    }

    #[test]
    fn property_kind_from_str_parses_valid_inputs() {
        assert_eq!(
            PropertyKind::from_str("atom").unwrap(),
            PropertyKind::AtomType
        );
        assert_eq!(
            PropertyKind::from_str("atom type").unwrap(),
            PropertyKind::AtomType
        );
        assert_eq!(
            PropertyKind::from_str("bond type").unwrap(),
            PropertyKind::BondType
        );
        assert_eq!(
            PropertyKind::from_str("bond angle").unwrap(),
            PropertyKind::BondAngle
        );
        assert_eq!(
            PropertyKind::from_str("Bond Angles").unwrap(),
            PropertyKind::BondAngle
        );
        assert_eq!(
            PropertyKind::from_str("torsion").unwrap(),
            PropertyKind::Torsion
        );
        assert_eq!(
            PropertyKind::from_str("non bonded").unwrap(),
            PropertyKind::NonBonded
        );
        assert_eq!(
            PropertyKind::from_str("non-bonded").unwrap(),
            PropertyKind::NonBonded
        );
        assert_eq!(
            PropertyKind::from_str("scf").unwrap(),
            PropertyKind::ScfGrid
        );
        assert_eq!(
            PropertyKind::from_str("hpf grid").unwrap(),
            PropertyKind::ScfGrid
        );
        assert_eq!(
            PropertyKind::from_str("compress").unwrap(),
            PropertyKind::Compressibility
        );
        assert_eq!(
            PropertyKind::from_str("compressibility").unwrap(),
            PropertyKind::Compressibility
        );
        assert_eq!(PropertyKind::from_str("chi").unwrap(), PropertyKind::Chi);
    }

    #[test]
    fn property_kind_from_str_handles_invalid_input() {
        assert!(PropertyKind::from_str("").is_err());
        assert!(PropertyKind::from_str("grid").is_err());
        assert!(PropertyKind::from_str("kappa").is_err());
    }

    #[test]
    fn action_name_returns_correct_string() {
        assert_eq!(Action::New.name(), "new");
        assert_eq!(Action::Replace.name(), "replace");
    }

    #[test]
    fn action_display_formats_correctly() {
        assert_eq!(format!("{}", Action::New), "new");
        assert_eq!(format!("{}", Action::Replace), "replace");
    }

    #[test]
    fn action_from_str_parses_valid_inputs() {
        assert_eq!(Action::from_str("new").unwrap(), Action::New);
        assert_eq!(Action::from_str("New").unwrap(), Action::New);
        assert_eq!(Action::from_str("replace").unwrap(), Action::Replace);
        assert_eq!(Action::from_str("REPLACE").unwrap(), Action::Replace);
    }

    #[test]
    fn action_from_str_handles_invalid_input() {
        assert!(Action::from_str("add").is_err());
        assert!(Action::from_str("").is_err());
    }
}
