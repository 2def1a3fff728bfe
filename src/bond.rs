use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use lazy_static::lazy_static;

use crate::{AtomIndex, Candidates, Result, StructureError};

/// A bond order class.
#[derive(Debug, PartialEq)]
pub struct BondType {
    pub label: &'static str,
    pub order: f32,
    increased: Option<&'static str>,
    decreased: Option<&'static str>,
}

static BOND_TYPES: [BondType; 4] = [
    BondType { label: "S", order: 1.0, increased: Some("D"), decreased: None },
    BondType { label: "D", order: 2.0, increased: Some("T"), decreased: Some("S") },
    BondType { label: "T", order: 3.0, increased: None, decreased: Some("D") },
    // Benzene bonds sit outside the S/D/T ladder.
    BondType { label: "B", order: 1.5, increased: None, decreased: None },
];

lazy_static! {
    static ref BOND_TYPE_INDEX: HashMap<&'static str, &'static BondType> =
        BOND_TYPES.iter().map(|t| (t.label, t)).collect();
}

/// Look up a bond type by its label (`S`, `D`, `T` or `B`).
pub fn bond_type(label: &str) -> Result<&'static BondType> {
    BOND_TYPE_INDEX
        .get(label)
        .copied()
        .ok_or_else(|| StructureError::UnknownBondType(label.to_string()))
}

impl BondType {
    pub fn increased(&self) -> Option<&'static BondType> {
        self.increased.map(|label| BOND_TYPE_INDEX[label])
    }

    pub fn decreased(&self) -> Option<&'static BondType> {
        self.decreased.map(|label| BOND_TYPE_INDEX[label])
    }
}

impl Display for BondType {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.label)
    }
}

/// A bond between two atoms of one [`Structure`](crate::Structure).
#[derive(Debug, Clone, PartialEq)]
pub struct Bond {
    /// The two endpoints. Order carries no meaning.
    pub(crate) atoms: (AtomIndex, AtomIndex),
    pub bond_type: Candidates<&'static BondType>,
}

impl Bond {
    /// Create a bond from a bond type label such as `"D"`.
    pub fn new(atom1: AtomIndex, atom2: AtomIndex, bond_type: &str) -> Result<Self> {
        Ok(Self::with_types(atom1, atom2, self::bond_type(bond_type)?))
    }

    pub fn with_types(
        atom1: AtomIndex,
        atom2: AtomIndex,
        bond_type: impl Into<Candidates<&'static BondType>>,
    ) -> Self {
        Self {
            atoms: (atom1, atom2),
            bond_type: bond_type.into(),
        }
    }

    pub fn atoms(&self) -> (AtomIndex, AtomIndex) {
        self.atoms
    }

    /// The endpoint that is not `atom`, if `atom` is one of the endpoints.
    pub fn other(&self, atom: AtomIndex) -> Option<AtomIndex> {
        match self.atoms {
            (a, b) if a == atom => Some(b),
            (a, b) if b == atom => Some(a),
            _ => None,
        }
    }

    pub fn order(&self) -> Result<f32> {
        Ok(self.bond_type.require("bond type")?.order)
    }

    fn is(&self, label: &str) -> bool {
        self.bond_type.resolved().is_some_and(|t| t.label == label)
    }

    pub fn is_single(&self) -> bool {
        self.is("S")
    }

    pub fn is_double(&self) -> bool {
        self.is("D")
    }

    pub fn is_triple(&self) -> bool {
        self.is("T")
    }

    pub fn is_benzene(&self) -> bool {
        self.is("B")
    }

    pub fn can_increase_order(&self) -> bool {
        self.bond_type.resolved().is_some_and(|t| t.increased().is_some())
    }

    pub fn can_decrease_order(&self) -> bool {
        self.bond_type.resolved().is_some_and(|t| t.decreased().is_some())
    }

    pub fn increase_order(&mut self) -> Result<()> {
        let current = *self.bond_type.require("bond type")?;
        let next = current
            .increased()
            .ok_or(StructureError::CannotIncreaseOrder(current.label))?;
        self.bond_type = Candidates::Resolved(next);
        Ok(())
    }

    pub fn decrease_order(&mut self) -> Result<()> {
        let current = *self.bond_type.require("bond type")?;
        let next = current
            .decreased()
            .ok_or(StructureError::CannotDecreaseOrder(current.label))?;
        self.bond_type = Candidates::Resolved(next);
        Ok(())
    }

    /// Bonds match when their type sets share a member. Endpoints are not compared.
    pub fn is_equivalent(&self, other: &Bond) -> bool {
        self.bond_type.intersects(&other.bond_type, |a, b| a == b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bond(label: &str) -> Bond {
        Bond::new(AtomIndex::new(0), AtomIndex::new(1), label).unwrap()
    }

    #[test]
    fn order_ladder() {
        let mut b = bond("S");
        assert!(b.can_increase_order());
        assert!(!b.can_decrease_order());
        assert_eq!(b.decrease_order(), Err(StructureError::CannotDecreaseOrder("S")));

        b.increase_order().unwrap();
        assert!(b.is_double());
        b.increase_order().unwrap();
        assert!(b.is_triple());
        assert_eq!(b.order().unwrap(), 3.0);
        assert!(!b.can_increase_order());
        assert_eq!(b.increase_order(), Err(StructureError::CannotIncreaseOrder("T")));
        assert!(b.is_triple());

        b.decrease_order().unwrap();
        b.decrease_order().unwrap();
        assert!(b.is_single());
    }

    #[test]
    fn benzene_bonds_are_fixed() {
        let mut b = bond("B");
        assert_eq!(b.order().unwrap(), 1.5);
        assert!(!b.can_increase_order());
        assert!(!b.can_decrease_order());
        assert!(b.increase_order().is_err());
    }

    #[test]
    fn ambiguous_bonds() {
        let types = Candidates::from_vec(vec![bond_type("S").unwrap(), bond_type("D").unwrap()])
            .unwrap();
        let mut b = Bond::with_types(AtomIndex::new(0), AtomIndex::new(1), types);
        assert!(!b.is_single());
        assert!(!b.can_increase_order());
        assert!(matches!(b.increase_order(), Err(StructureError::Unresolved { .. })));
        assert!(b.is_equivalent(&bond("D")));
        assert!(!b.is_equivalent(&bond("T")));
    }

    #[test]
    fn other_endpoint() {
        let b = bond("S");
        assert_eq!(b.other(AtomIndex::new(0)), Some(AtomIndex::new(1)));
        assert_eq!(b.other(AtomIndex::new(1)), Some(AtomIndex::new(0)));
        assert_eq!(b.other(AtomIndex::new(5)), None);
    }
}
