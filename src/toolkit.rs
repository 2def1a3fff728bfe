//! Exchange with an external cheminformatics toolkit.
//!
//! Line notations (SMILES, InChI, CML) are not handled here. A [`Toolkit`]
//! implementation converts between those strings and a [`NativeMolecule`],
//! the flat atom/bond listing such toolkits work with, and this module maps
//! native molecules to and from [`Structure`]s.

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use tracing::debug;

use crate::{
    atom_type, bond_type, element_by_number, Atom, AtomIndex, Bond, BondType, Candidates,
    ElectronState, Result, Structure, StructureError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notation {
    Smiles,
    InChI,
    Cml,
}

impl Display for Notation {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Notation::Smiles => write!(f, "smiles"),
            Notation::InChI => write!(f, "inchi"),
            Notation::Cml => write!(f, "cml"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    fn from_bond_type(bond_type: &BondType) -> Self {
        match bond_type.label {
            "D" => BondOrder::Double,
            "T" => BondOrder::Triple,
            "B" => BondOrder::Aromatic,
            _ => BondOrder::Single,
        }
    }

    fn label(self) -> &'static str {
        match self {
            BondOrder::Single => "S",
            BondOrder::Double => "D",
            BondOrder::Triple => "T",
            BondOrder::Aromatic => "B",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeAtom {
    pub atomic_number: u8,
    /// 0 for closed-shell atoms, otherwise 2S+1.
    pub spin_multiplicity: u8,
}

/// A bond between two atoms, by their 0-based position in [`NativeMolecule::atoms`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeBond {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeMolecule {
    pub atoms: Vec<NativeAtom>,
    pub bonds: Vec<NativeBond>,
}

/// An external cheminformatics backend.
pub trait Toolkit {
    fn read(&self, notation: Notation, text: &str) -> anyhow::Result<NativeMolecule>;
    fn write(&self, notation: Notation, molecule: &NativeMolecule) -> anyhow::Result<String>;
}

impl Structure {
    /// Flatten into a native molecule. Every atom and bond must be resolved,
    /// and every atom must belong to a concrete element.
    pub fn to_native(&self) -> Result<NativeMolecule> {
        let mut positions: HashMap<AtomIndex, usize> = HashMap::new();
        let mut molecule = NativeMolecule::default();

        for atom in self.atoms() {
            let data = &self[atom];
            let element = data
                .element()
                .ok_or_else(|| StructureError::unresolved("element", &data.atom_type))?;
            let state = data.electron_state.require("electron state")?;
            let spin_multiplicity = state.spin_multiplicity().ok_or_else(|| {
                StructureError::Toolkit(format!(
                    "electron state {} has no spin multiplicity",
                    state
                ))
            })?;
            positions.insert(atom, molecule.atoms.len());
            molecule.atoms.push(NativeAtom {
                atomic_number: element.number,
                spin_multiplicity,
            });
        }

        for bond in self.bonds() {
            let (a, b) = self.bond_endpoints(bond)?;
            let (begin, end) = match (positions.get(&a), positions.get(&b)) {
                (Some(&begin), Some(&end)) => (begin, end),
                _ => return Err(StructureError::MissingBond(bond)),
            };
            molecule.bonds.push(NativeBond {
                begin,
                end,
                order: BondOrder::from_bond_type(self[bond].bond_type.require("bond type")?),
            });
        }
        Ok(molecule)
    }

    /// Build a structure from a native molecule. Atoms get bare element types;
    /// run [`Structure::update_atom_types`] to refine them.
    pub fn from_native(molecule: &NativeMolecule) -> Result<Structure> {
        let mut structure = Structure::new();
        let mut atoms = Vec::with_capacity(molecule.atoms.len());

        for native in &molecule.atoms {
            let element = element_by_number(native.atomic_number)
                .ok_or(StructureError::UnknownElement(native.atomic_number))?;
            let state = ElectronState::from_spin_multiplicity(native.spin_multiplicity)?;
            let atom = Atom::with_candidates(atom_type(element.symbol)?, state);
            atoms.push(structure.add_atom(atom));
        }

        for native in &molecule.bonds {
            let endpoint = |position: usize| {
                atoms.get(position).copied().ok_or_else(|| {
                    StructureError::Toolkit(format!("bond refers to missing atom {}", position))
                })
            };
            let bond = Bond::with_types(
                endpoint(native.begin)?,
                endpoint(native.end)?,
                Candidates::Resolved(bond_type(native.order.label())?),
            );
            structure.add_bond(bond)?;
        }
        Ok(structure)
    }

    /// Read a line notation through `toolkit`.
    pub fn from_notation(toolkit: &dyn Toolkit, notation: Notation, text: &str) -> Result<Structure> {
        let molecule = toolkit.read(notation, text).map_err(|e| {
            debug!("toolkit could not read {} '{}': {:#}", notation, text, e);
            StructureError::Toolkit(format!("{:#}", e))
        })?;
        Structure::from_native(&molecule)
    }

    /// Write this structure as a line notation through `toolkit`.
    pub fn to_notation(&self, toolkit: &dyn Toolkit, notation: Notation) -> Result<String> {
        let molecule = self.to_native()?;
        toolkit
            .write(notation, &molecule)
            .map_err(|e| StructureError::Toolkit(format!("{:#}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    /// Knows exactly one molecule: the methyl radical, as `[CH3]`.
    struct MethylOnly;

    fn methyl() -> NativeMolecule {
        let mut molecule = NativeMolecule::default();
        molecule.atoms.push(NativeAtom {
            atomic_number: 6,
            spin_multiplicity: 2,
        });
        for i in 1..=3 {
            molecule.atoms.push(NativeAtom {
                atomic_number: 1,
                spin_multiplicity: 0,
            });
            molecule.bonds.push(NativeBond {
                begin: 0,
                end: i,
                order: BondOrder::Single,
            });
        }
        molecule
    }

    impl Toolkit for MethylOnly {
        fn read(&self, notation: Notation, text: &str) -> anyhow::Result<NativeMolecule> {
            if notation != Notation::Smiles || text != "[CH3]" {
                bail!("cannot read {} '{}'", notation, text);
            }
            Ok(methyl())
        }

        fn write(&self, _: Notation, molecule: &NativeMolecule) -> anyhow::Result<String> {
            if *molecule != methyl() {
                bail!("unknown molecule");
            }
            Ok("[CH3]".to_string())
        }
    }

    #[test]
    fn test_native_round_trip() {
        let s = Structure::from_adjacency_list(
            "vinoxy\n1 C 1 {2,S}\n2 C 0 {1,S} {3,D}\n3 O 0 {2,D}\n4 O 2S\n",
        )
        .unwrap();
        let native = s.to_native().unwrap();
        assert_eq!(native.atoms[0].spin_multiplicity, 2);
        assert_eq!(native.atoms[3].spin_multiplicity, 1);
        assert_eq!(native.bonds.len(), 2);
        assert!(native.bonds.iter().any(|b| b.order == BondOrder::Double));

        let back = Structure::from_native(&native).unwrap();
        assert!(back.is_isomorphic(&s));
        assert_eq!(back.radical_count().unwrap(), 3);
    }

    #[test]
    fn test_native_after_bond_edits() {
        let mut s = Structure::from_adjacency_list(
            "propene\n1 C 0 {2,D}\n2 C 0 {1,D} {3,S}\n3 C 0 {2,S}\n",
        )
        .unwrap();
        let atoms: Vec<_> = s.atoms().collect();
        let first = s.get_bond(atoms[0], atoms[1]).unwrap();
        let second = s.get_bond(atoms[1], atoms[2]).unwrap();
        s.decrease_bond_order(first).unwrap();
        s.set_bond_type(second, bond_type("D").unwrap()).unwrap();

        let native = s.to_native().unwrap();
        let mut bonds: Vec<_> = native
            .bonds
            .iter()
            .map(|b| (b.begin.min(b.end), b.begin.max(b.end), b.order))
            .collect();
        bonds.sort_by_key(|&(begin, end, _)| (begin, end));
        assert_eq!(
            bonds,
            vec![(0, 1, BondOrder::Single), (1, 2, BondOrder::Double)]
        );
        assert!(Structure::from_native(&native).unwrap().is_isomorphic(&s));
    }

    #[test]
    fn test_native_requires_resolved_atoms() {
        let generic = Structure::from_adjacency_list("g\n1 R!H 0\n").unwrap();
        assert!(matches!(generic.to_native(), Err(StructureError::Unresolved { .. })));

        let quartet = Structure::from_adjacency_list("q\n1 C 3\n").unwrap();
        assert!(matches!(quartet.to_native(), Err(StructureError::Toolkit(_))));
    }

    #[test]
    fn test_from_native_rejects_bad_input() {
        let mut molecule = methyl();
        molecule.atoms[0].atomic_number = 92;
        assert_eq!(
            Structure::from_native(&molecule).unwrap_err(),
            StructureError::UnknownElement(92)
        );

        let mut molecule = methyl();
        molecule.bonds[0].end = 9;
        assert!(matches!(
            Structure::from_native(&molecule),
            Err(StructureError::Toolkit(_))
        ));
    }

    #[test]
    fn test_notation_through_toolkit() {
        let s = Structure::from_notation(&MethylOnly, Notation::Smiles, "[CH3]").unwrap();
        assert_eq!(s.formula().unwrap(), "CH3");
        assert_eq!(s.radical_count().unwrap(), 1);
        assert_eq!(s.to_notation(&MethylOnly, Notation::Smiles).unwrap(), "[CH3]");

        let err = Structure::from_notation(&MethylOnly, Notation::InChI, "InChI=1S/CH4/h1H4");
        assert!(matches!(err, Err(StructureError::Toolkit(_))));
    }
}
