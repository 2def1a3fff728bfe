use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Index;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;
use tracing::{debug, trace};

use crate::{Atom, Bond, BondType, Candidates, Result, StructureError};

mod matching;
mod rings;

/// Handle to an atom inside a [`Structure`]. Stays valid while the atom is present.
pub type AtomIndex = NodeIndex;
/// Handle to a bond inside a [`Structure`].
pub type BondIndex = EdgeIndex;

/// A chemical structure: atoms connected by bonds.
///
/// The same type describes concrete species and generic functional-group
/// patterns; patterns simply carry ambiguous atom or bond types.
/// Removing atoms or bonds never invalidates the handles of the others.
#[derive(Debug, Clone, Default)]
pub struct Structure {
    graph: StableUnGraph<Atom, Bond>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.atom_count() == 0
    }

    /// Atom handles in insertion order.
    pub fn atoms(&self) -> impl Iterator<Item = AtomIndex> + '_ {
        self.graph.node_indices()
    }

    /// Mutable access to every atom, in insertion order.
    pub fn atoms_mut(&mut self) -> impl Iterator<Item = &mut Atom> + '_ {
        self.graph.node_weights_mut()
    }

    pub fn bonds(&self) -> impl Iterator<Item = BondIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn contains_atom(&self, atom: AtomIndex) -> bool {
        self.graph.contains_node(atom)
    }

    pub fn atom(&self, atom: AtomIndex) -> Result<&Atom> {
        self.graph
            .node_weight(atom)
            .ok_or(StructureError::MissingAtom(atom))
    }

    pub fn atom_mut(&mut self, atom: AtomIndex) -> Result<&mut Atom> {
        self.graph
            .node_weight_mut(atom)
            .ok_or(StructureError::MissingAtom(atom))
    }

    pub fn bond(&self, bond: BondIndex) -> Result<&Bond> {
        self.graph
            .edge_weight(bond)
            .ok_or(StructureError::MissingBond(bond))
    }

    /// The two atoms `bond` connects, as recorded by the structure itself.
    pub fn bond_endpoints(&self, bond: BondIndex) -> Result<(AtomIndex, AtomIndex)> {
        self.graph
            .edge_endpoints(bond)
            .ok_or(StructureError::MissingBond(bond))
    }

    // Stays private: a stored bond's endpoints must equal the graph's.
    fn bond_weight_mut(&mut self, bond: BondIndex) -> Result<&mut Bond> {
        self.graph
            .edge_weight_mut(bond)
            .ok_or(StructureError::MissingBond(bond))
    }

    pub fn set_bond_type(
        &mut self,
        bond: BondIndex,
        bond_type: impl Into<Candidates<&'static BondType>>,
    ) -> Result<()> {
        self.bond_weight_mut(bond)?.bond_type = bond_type.into();
        Ok(())
    }

    pub fn increase_bond_order(&mut self, bond: BondIndex) -> Result<()> {
        self.bond_weight_mut(bond)?.increase_order()
    }

    pub fn decrease_bond_order(&mut self, bond: BondIndex) -> Result<()> {
        self.bond_weight_mut(bond)?.decrease_order()
    }

    /// Add an atom with no bonds.
    pub fn add_atom(&mut self, atom: Atom) -> AtomIndex {
        let index = self.graph.add_node(atom);
        trace!("added atom {}", index.index());
        index
    }

    /// Add a bond between the two atoms named by [`Bond::atoms`].
    ///
    /// Both atoms must already be present, distinct, and not yet bonded to each other.
    pub fn add_bond(&mut self, bond: Bond) -> Result<BondIndex> {
        let (a, b) = bond.atoms();
        for atom in [a, b] {
            if !self.contains_atom(atom) {
                return Err(StructureError::MissingAtom(atom));
            }
        }
        if a == b {
            return Err(StructureError::SelfBond(a));
        }
        if self.has_bond(a, b) {
            return Err(StructureError::DuplicateBond(a, b));
        }
        let index = self.graph.add_edge(a, b, bond);
        trace!("added bond {} between {} and {}", index.index(), a.index(), b.index());
        Ok(index)
    }

    /// Remove an atom together with every bond touching it.
    pub fn remove_atom(&mut self, atom: AtomIndex) -> Result<Atom> {
        self.graph
            .remove_node(atom)
            .ok_or(StructureError::MissingAtom(atom))
    }

    pub fn remove_bond(&mut self, bond: BondIndex) -> Result<Bond> {
        self.graph
            .remove_edge(bond)
            .ok_or(StructureError::MissingBond(bond))
    }

    /// Every neighbor of `atom`, mapped to the bond that connects them.
    pub fn get_bonds(&self, atom: AtomIndex) -> Result<BTreeMap<AtomIndex, BondIndex>> {
        if !self.contains_atom(atom) {
            return Err(StructureError::MissingAtom(atom));
        }
        Ok(self
            .graph
            .edges(atom)
            .map(|edge| {
                let neighbor = if edge.source() == atom {
                    edge.target()
                } else {
                    edge.source()
                };
                (neighbor, edge.id())
            })
            .collect())
    }

    pub fn get_bond(&self, atom1: AtomIndex, atom2: AtomIndex) -> Option<BondIndex> {
        self.graph.find_edge(atom1, atom2)
    }

    pub fn has_bond(&self, atom1: AtomIndex, atom2: AtomIndex) -> bool {
        self.get_bond(atom1, atom2).is_some()
    }

    /// Copy the given atoms, and every bond between two of them, into `target`.
    /// Returns the mapping from old handles to new ones.
    fn copy_into(
        &self,
        target: &mut Structure,
        atoms: &[AtomIndex],
    ) -> HashMap<AtomIndex, AtomIndex> {
        let mut mapping = HashMap::new();
        for &atom in atoms {
            mapping.insert(atom, target.graph.add_node(self.graph[atom].clone()));
        }
        for edge in self.graph.edge_indices() {
            let Some((a, b)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            if let (Some(&new_a), Some(&new_b)) = (mapping.get(&a), mapping.get(&b)) {
                let mut copied = self.graph[edge].clone();
                copied.atoms = (new_a, new_b);
                target.graph.add_edge(new_a, new_b, copied);
            }
        }
        mapping
    }

    /// A new structure holding copies of both `self` and `other`, with
    /// `self`'s atoms first. Neither input is changed.
    pub fn merge(&self, other: &Structure) -> Structure {
        let mut merged = Structure::new();
        self.copy_into(&mut merged, &self.atoms().collect::<Vec<_>>());
        other.copy_into(&mut merged, &other.atoms().collect::<Vec<_>>());
        merged
    }

    /// Split into one structure per connected component.
    ///
    /// Components are ordered by their earliest atom; an empty structure
    /// splits into nothing.
    pub fn split(&self) -> Vec<Structure> {
        let components = self.connected_components();
        debug!("split into {} components", components.len());
        components
            .iter()
            .map(|component| {
                let mut fragment = Structure::new();
                self.copy_into(&mut fragment, component);
                fragment
            })
            .collect()
    }

    fn connected_components(&self) -> Vec<Vec<AtomIndex>> {
        let mut components = Vec::new();
        let mut visited = HashSet::new();

        for start in self.graph.node_indices() {
            if visited.contains(&start) {
                continue;
            }
            let mut stack = vec![start];
            let mut component = Vec::new();
            while let Some(current) = stack.pop() {
                if visited.insert(current) {
                    component.push(current);
                    stack.extend(self.graph.neighbors(current).filter(|n| !visited.contains(n)));
                }
            }
            // Keep each fragment in the parent's atom order.
            component.sort();
            components.push(component);
        }
        components
    }

    /// Total number of radical electrons across all atoms.
    pub fn radical_count(&self) -> Result<u32> {
        self.graph
            .node_weights()
            .map(|atom| atom.radical_order().map(u32::from))
            .sum()
    }

    /// Molecular formula in Hill order: carbon, then hydrogen, then the
    /// remaining elements alphabetically. Without carbon every element is
    /// alphabetical.
    pub fn formula(&self) -> Result<String> {
        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for atom in self.graph.node_weights() {
            let element = atom
                .atom_type
                .require("atom type")?
                .element()
                .ok_or_else(|| StructureError::unresolved("element", &atom.atom_type))?;
            *counts.entry(element.symbol).or_default() += 1;
        }

        let mut order = Vec::new();
        if counts.contains_key("C") {
            order.push("C");
            if counts.contains_key("H") {
                order.push("H");
            }
        }
        let rest: Vec<_> = counts
            .keys()
            .copied()
            .filter(|symbol| !order.contains(symbol))
            .collect();
        order.extend(rest);

        let mut formula = String::new();
        for symbol in order {
            formula.push_str(symbol);
            if counts[symbol] > 1 {
                formula.push_str(&counts[symbol].to_string());
            }
        }
        Ok(formula)
    }

    /// Remove every center label.
    pub fn clear_labeled_atoms(&mut self) {
        for atom in self.atoms_mut() {
            atom.label.clear();
        }
    }

    /// The empty label marks an unlabeled atom and is never contained.
    pub fn contains_labeled_atom(&self, label: &str) -> bool {
        !label.is_empty() && self.graph.node_weights().any(|atom| atom.label == label)
    }

    /// The atom carrying `label`, if any. Two atoms sharing one label is an error.
    /// The empty label finds nothing.
    pub fn get_labeled_atom(&self, label: &str) -> Result<Option<AtomIndex>> {
        if label.is_empty() {
            return Ok(None);
        }
        let mut found = None;
        for atom in self.atoms() {
            if self.graph[atom].label == label {
                if found.is_some() {
                    return Err(StructureError::DuplicateLabel(label.to_string()));
                }
                found = Some(atom);
            }
        }
        Ok(found)
    }

    /// Every labeled atom, keyed by label.
    pub fn get_labeled_atoms(&self) -> Result<BTreeMap<String, AtomIndex>> {
        let mut labeled = BTreeMap::new();
        for atom in self.atoms() {
            let label = &self.graph[atom].label;
            if label.is_empty() {
                continue;
            }
            if labeled.insert(label.clone(), atom).is_some() {
                return Err(StructureError::DuplicateLabel(label.clone()));
            }
        }
        Ok(labeled)
    }
}

/// Panics if the atom is not part of the structure; see [`Structure::atom`].
impl Index<AtomIndex> for Structure {
    type Output = Atom;

    fn index(&self, atom: AtomIndex) -> &Atom {
        &self.graph[atom]
    }
}

impl Index<BondIndex> for Structure {
    type Output = Bond;

    fn index(&self, bond: BondIndex) -> &Bond {
        &self.graph[bond]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bond_type, init_logging};

    fn ethyl() -> (Structure, AtomIndex, AtomIndex) {
        let mut s = Structure::new();
        let a = s.add_atom(Atom::new("C", "0").unwrap());
        let b = s.add_atom(Atom::new("C", "1").unwrap());
        s.add_bond(Bond::new(a, b, "S").unwrap()).unwrap();
        (s, a, b)
    }

    #[test]
    fn test_add_and_query_bonds() {
        init_logging("trace");
        let (mut s, a, b) = ethyl();
        let c = s.add_atom(Atom::new("O", "0").unwrap());
        let bc = s.add_bond(Bond::new(b, c, "D").unwrap()).unwrap();

        assert_eq!(s.atom_count(), 3);
        assert_eq!(s.bond_count(), 2);
        assert!(s.has_bond(a, b));
        assert!(s.has_bond(b, a));
        assert!(!s.has_bond(a, c));
        assert_eq!(s.get_bond(c, b), Some(bc));

        let bonds = s.get_bonds(b).unwrap();
        assert_eq!(bonds.keys().copied().collect::<Vec<_>>(), vec![a, c]);
        assert!(s.bond(bonds[&c]).unwrap().is_double());
        assert!(s.get_bonds(a).unwrap().contains_key(&b));
    }

    #[test]
    fn test_add_bond_rejects_bad_endpoints() {
        let (mut s, a, b) = ethyl();
        let missing = AtomIndex::new(42);
        assert_eq!(
            s.add_bond(Bond::new(a, missing, "S").unwrap()),
            Err(StructureError::MissingAtom(missing))
        );
        assert_eq!(
            s.add_bond(Bond::new(a, a, "S").unwrap()),
            Err(StructureError::SelfBond(a))
        );
        assert_eq!(
            s.add_bond(Bond::new(b, a, "D").unwrap()),
            Err(StructureError::DuplicateBond(b, a))
        );
        assert_eq!(s.bond_count(), 1);
    }

    #[test]
    fn test_remove_atom_drops_its_bonds() {
        let (mut s, a, b) = ethyl();
        let removed = s.remove_atom(b).unwrap();
        assert_eq!(removed.radical_order().unwrap(), 1);
        assert_eq!(s.bond_count(), 0);
        assert!(s.get_bonds(a).unwrap().is_empty());
        assert_eq!(s.get_bonds(b), Err(StructureError::MissingAtom(b)));
        assert!(s.remove_atom(b).is_err());
        // Surviving handles are untouched.
        assert!(s.atom(a).unwrap().is_carbon());
    }

    #[test]
    fn test_remove_bond() {
        let (mut s, a, b) = ethyl();
        let bond = s.get_bond(a, b).unwrap();
        assert!(s.remove_bond(bond).unwrap().is_single());
        assert!(!s.has_bond(a, b));
        assert_eq!(s.remove_bond(bond), Err(StructureError::MissingBond(bond)));
    }

    #[test]
    fn test_clone_is_independent() {
        let (s, _, b) = ethyl();
        let mut copy = s.clone();
        copy.atom_mut(b).unwrap().increase_free_electron().unwrap();
        assert_eq!(s.radical_count().unwrap(), 1);
        assert_eq!(copy.radical_count().unwrap(), 2);
    }

    #[test]
    fn test_merge_and_split() {
        let (ethyl, _, _) = ethyl();
        let mut water = Structure::new();
        let o = water.add_atom(Atom::new("O", "0").unwrap());
        for _ in 0..2 {
            let h = water.add_atom(Atom::new("H", "0").unwrap());
            water.add_bond(Bond::new(o, h, "S").unwrap()).unwrap();
        }

        let merged = ethyl.merge(&water);
        assert_eq!(merged.atom_count(), 5);
        assert_eq!(merged.bond_count(), 3);
        assert!(merged.atom(AtomIndex::new(0)).unwrap().is_carbon());
        assert!(merged.atom(AtomIndex::new(2)).unwrap().is_oxygen());

        let parts = merged.split();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].formula().unwrap(), "C2");
        assert_eq!(parts[1].formula().unwrap(), "H2O");
        assert_eq!(parts[1].bond_count(), 2);
        for part in &parts {
            for bond in part.bonds() {
                let (a, b) = part.bond_endpoints(bond).unwrap();
                assert_eq!(part.bond(bond).unwrap().atoms(), (a, b));
                assert_eq!(part.get_bond(a, b), Some(bond));
            }
        }

        assert!(Structure::new().split().is_empty());
    }

    #[test]
    fn test_radical_count_and_formula() {
        let (mut s, a, _) = ethyl();
        for _ in 0..3 {
            let h = s.add_atom(Atom::new("H", "0").unwrap());
            s.add_bond(Bond::new(a, h, "S").unwrap()).unwrap();
        }
        let o = s.add_atom(Atom::new("Os", "2T").unwrap());
        s.add_bond(Bond::new(a, o, "S").unwrap()).unwrap();

        assert_eq!(s.radical_count().unwrap(), 3);
        assert_eq!(s.formula().unwrap(), "C2H3O");

        let generic = s.add_atom(Atom::new("R!H", "0").unwrap());
        assert!(matches!(s.formula(), Err(StructureError::Unresolved { .. })));
        s.remove_atom(generic).unwrap();

        let mut inorganic = Structure::new();
        inorganic.add_atom(Atom::new("O", "0").unwrap());
        inorganic.add_atom(Atom::new("H", "0").unwrap());
        inorganic.add_atom(Atom::new("Cl", "0").unwrap());
        assert_eq!(inorganic.formula().unwrap(), "ClHO");
    }

    #[test]
    fn test_labeled_atoms() {
        let (mut s, a, b) = ethyl();
        s.atom_mut(a).unwrap().label = "*1".to_string();
        s.atom_mut(b).unwrap().label = "*2".to_string();

        assert!(s.contains_labeled_atom("*1"));
        assert!(!s.contains_labeled_atom("*3"));
        assert_eq!(s.get_labeled_atom("*2").unwrap(), Some(b));
        assert_eq!(s.get_labeled_atom("*3").unwrap(), None);
        let labeled = s.get_labeled_atoms().unwrap();
        assert_eq!(labeled.len(), 2);
        assert_eq!(labeled["*1"], a);

        s.atom_mut(b).unwrap().label = "*1".to_string();
        assert_eq!(
            s.get_labeled_atom("*1"),
            Err(StructureError::DuplicateLabel("*1".to_string()))
        );
        assert!(s.get_labeled_atoms().is_err());

        s.clear_labeled_atoms();
        assert!(s.get_labeled_atoms().unwrap().is_empty());
    }

    #[test]
    fn test_empty_label_is_not_a_label() {
        let (mut s, a, _) = ethyl();
        assert!(!s.contains_labeled_atom(""));
        assert_eq!(s.get_labeled_atom("").unwrap(), None);

        s.atom_mut(a).unwrap().label = "*1".to_string();
        assert!(!s.contains_labeled_atom(""));
        assert_eq!(s.get_labeled_atom("").unwrap(), None);
        assert_eq!(s.get_labeled_atom("*1").unwrap(), Some(a));
    }

    #[test]
    fn test_bond_edits_keep_endpoints() {
        let (mut s, a, b) = ethyl();
        let c = s.add_atom(Atom::new("O", "0").unwrap());
        let bc = s.add_bond(Bond::new(b, c, "S").unwrap()).unwrap();
        let ab = s.get_bond(a, b).unwrap();
        let reference = s.clone();

        s.set_bond_type(bc, bond_type("D").unwrap()).unwrap();
        s.increase_bond_order(ab).unwrap();
        s.decrease_bond_order(ab).unwrap();
        assert!(s[bc].is_double());
        assert!(s[ab].is_single());
        assert!(matches!(
            s.decrease_bond_order(ab),
            Err(StructureError::CannotDecreaseOrder(_))
        ));

        for bond in s.bonds() {
            let (x, y) = s.bond_endpoints(bond).unwrap();
            assert_eq!(s.get_bond(x, y), Some(bond));
            assert_eq!(s[bond].atoms(), (x, y));
        }
        assert_eq!(s.bond_endpoints(bc).unwrap(), (b, c));

        let native = s.to_native().unwrap();
        assert_eq!(native.bonds.len(), 2);
        let parts = s.split();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].bond_count(), 2);
        assert!(!s.is_isomorphic(&reference));
        s.set_bond_type(bc, bond_type("S").unwrap()).unwrap();
        assert!(s.is_isomorphic(&reference));

        s.remove_bond(bc).unwrap();
        assert_eq!(s.bond_endpoints(bc), Err(StructureError::MissingBond(bc)));
        assert_eq!(s.set_bond_type(bc, bond_type("S").unwrap()), Err(StructureError::MissingBond(bc)));
    }
}
