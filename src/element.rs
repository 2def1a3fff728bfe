use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use lazy_static::lazy_static;

use crate::{Result, StructureError};

/// A chemical element from the periodic table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub number: u8,
    pub symbol: &'static str,
    pub name: &'static str,
    pub mass: f64,
    pub valence: u8,
}

static ELEMENTS: [Element; 10] = [
    Element { number: 1, symbol: "H", name: "hydrogen", mass: 1.00794, valence: 1 },
    Element { number: 2, symbol: "He", name: "helium", mass: 4.002602, valence: 0 },
    Element { number: 6, symbol: "C", name: "carbon", mass: 12.0107, valence: 4 },
    Element { number: 7, symbol: "N", name: "nitrogen", mass: 14.0067, valence: 3 },
    Element { number: 8, symbol: "O", name: "oxygen", mass: 15.9994, valence: 2 },
    Element { number: 10, symbol: "Ne", name: "neon", mass: 20.1797, valence: 0 },
    Element { number: 14, symbol: "Si", name: "silicon", mass: 28.0855, valence: 4 },
    Element { number: 16, symbol: "S", name: "sulfur", mass: 32.065, valence: 2 },
    Element { number: 17, symbol: "Cl", name: "chlorine", mass: 35.453, valence: 1 },
    Element { number: 18, symbol: "Ar", name: "argon", mass: 39.948, valence: 0 },
];

/// Look up an element by its symbol (e.g. "C", "Cl").
pub fn element_by_symbol(symbol: &str) -> Option<&'static Element> {
    ELEMENTS.iter().find(|e| e.symbol == symbol)
}

/// Look up an element by its atomic number.
pub fn element_by_number(number: u8) -> Option<&'static Element> {
    ELEMENTS.iter().find(|e| e.number == number)
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.symbol)
    }
}

/// A structural role an atom can play, from fully generic (`R`) down to a
/// bonding-specific subtype such as `Cds` or `Od`.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct AtomType {
    pub label: &'static str,
    /// `None` for generic types that match any element.
    element: Option<&'static str>,
    /// The next more general type in the hierarchy.
    parent: Option<&'static str>,
}

static ATOM_TYPES: [AtomType; 23] = [
    AtomType { label: "R", element: None, parent: None },
    AtomType { label: "R!H", element: None, parent: Some("R") },
    AtomType { label: "H", element: Some("H"), parent: Some("R") },
    AtomType { label: "He", element: Some("He"), parent: Some("R!H") },
    AtomType { label: "C", element: Some("C"), parent: Some("R!H") },
    AtomType { label: "Cs", element: Some("C"), parent: Some("C") },
    AtomType { label: "Cd", element: Some("C"), parent: Some("C") },
    AtomType { label: "Cds", element: Some("C"), parent: Some("Cd") },
    AtomType { label: "Cdd", element: Some("C"), parent: Some("Cd") },
    AtomType { label: "CO", element: Some("C"), parent: Some("Cd") },
    AtomType { label: "Ct", element: Some("C"), parent: Some("C") },
    AtomType { label: "Cb", element: Some("C"), parent: Some("C") },
    AtomType { label: "Cbf", element: Some("C"), parent: Some("Cb") },
    AtomType { label: "N", element: Some("N"), parent: Some("R!H") },
    AtomType { label: "O", element: Some("O"), parent: Some("R!H") },
    AtomType { label: "Os", element: Some("O"), parent: Some("O") },
    AtomType { label: "Od", element: Some("O"), parent: Some("O") },
    AtomType { label: "Oa", element: Some("O"), parent: Some("O") },
    AtomType { label: "Ne", element: Some("Ne"), parent: Some("R!H") },
    AtomType { label: "Si", element: Some("Si"), parent: Some("R!H") },
    AtomType { label: "S", element: Some("S"), parent: Some("R!H") },
    AtomType { label: "Cl", element: Some("Cl"), parent: Some("R!H") },
    AtomType { label: "Ar", element: Some("Ar"), parent: Some("R!H") },
];

lazy_static! {
    static ref ATOM_TYPE_INDEX: HashMap<&'static str, &'static AtomType> =
        ATOM_TYPES.iter().map(|t| (t.label, t)).collect();
}

/// Look up an atom type by its label.
pub fn atom_type(label: &str) -> Result<&'static AtomType> {
    ATOM_TYPE_INDEX
        .get(label)
        .copied()
        .ok_or_else(|| StructureError::UnknownAtomType(label.to_string()))
}

impl AtomType {
    /// The element this type belongs to, or `None` for `R` and `R!H`.
    pub fn element(&self) -> Option<&'static Element> {
        self.element.and_then(element_by_symbol)
    }

    pub fn is_generic(&self) -> bool {
        self.element.is_none()
    }

    /// True for the plain element types (`C`, `O`, ...) as opposed to subtypes.
    pub fn is_bare_element(&self) -> bool {
        self.element == Some(self.label)
    }

    /// The bare element type for this type, if it has an element.
    pub fn element_type(&self) -> Option<&'static AtomType> {
        self.element.and_then(|symbol| ATOM_TYPE_INDEX.get(symbol).copied())
    }

    pub fn parent(&self) -> Option<&'static AtomType> {
        self.parent.and_then(|label| ATOM_TYPE_INDEX.get(label).copied())
    }

    /// True if `self` is `general` or lies below it in the type hierarchy.
    pub fn is_specific_case_of(&self, general: &AtomType) -> bool {
        if self == general {
            return true;
        }
        let mut current = self.parent();
        while let Some(ancestor) = current {
            if ancestor == general {
                return true;
            }
            current = ancestor.parent();
        }
        false
    }

    /// Two types match when one is a specific case of the other.
    pub fn is_equivalent(&self, other: &AtomType) -> bool {
        self.is_specific_case_of(other) || other.is_specific_case_of(self)
    }
}

impl Display for AtomType {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.label)
    }
}
