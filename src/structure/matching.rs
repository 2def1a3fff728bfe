use std::collections::{BTreeMap, HashMap};

use petgraph::algo::{
    is_isomorphic_matching, is_isomorphic_subgraph_matching, subgraph_isomorphisms_iter,
};
use petgraph::graph::Graph;
use petgraph::visit::{EdgeRef, IntoEdgeReferences};
use petgraph::Undirected;
use tracing::trace;

use super::{AtomIndex, Structure};
use crate::{Atom, Bond};

/// A borrowed, densely indexed view of a structure for the VF2 matcher.
type CompactGraph<'a> = Graph<&'a Atom, &'a Bond, Undirected>;

fn atoms_match(a: &&Atom, b: &&Atom) -> bool {
    a.is_equivalent(b)
}

fn bonds_match(a: &&Bond, b: &&Bond) -> bool {
    a.is_equivalent(b)
}

impl Structure {
    /// Returns the compact graph and, for each of its node positions, the
    /// handle of the atom it came from.
    fn compact(&self) -> (CompactGraph<'_>, Vec<AtomIndex>) {
        let mut graph: CompactGraph = Graph::with_capacity(self.atom_count(), self.bond_count());
        let mut positions = HashMap::new();
        let mut handles = Vec::with_capacity(self.atom_count());
        for atom in self.atoms() {
            positions.insert(atom, graph.add_node(&self.graph[atom]));
            handles.push(atom);
        }
        for edge in self.graph.edge_references() {
            graph.add_edge(positions[&edge.source()], positions[&edge.target()], edge.weight());
        }
        (graph, handles)
    }

    /// True if `self` and `other` have the same shape with equivalent atoms
    /// and bonds. Ambiguous types match when their candidate sets intersect.
    pub fn is_isomorphic(&self, other: &Structure) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        let (g0, _) = self.compact();
        let (g1, _) = other.compact();
        is_isomorphic_matching(&g0, &g1, atoms_match, bonds_match)
    }

    /// True if `pattern` occurs somewhere inside `self`.
    ///
    /// Matching is induced: two pattern atoms without a bond between them
    /// cannot land on two bonded atoms of `self`. A three-atom chain does not
    /// occur in a three-membered ring.
    pub fn is_subgraph_isomorphic(&self, pattern: &Structure) -> bool {
        let (g0, _) = pattern.compact();
        let (g1, _) = self.compact();
        is_isomorphic_subgraph_matching(&g0, &g1, atoms_match, bonds_match)
    }

    /// Every placement of `pattern` inside `self`, as a map from pattern atoms
    /// to the atoms of `self` they land on. Placements are induced, as in
    /// [`Structure::is_subgraph_isomorphic`].
    pub fn find_subgraph_isomorphisms(
        &self,
        pattern: &Structure,
    ) -> Vec<BTreeMap<AtomIndex, AtomIndex>> {
        let (g0, pattern_handles) = pattern.compact();
        let (g1, handles) = self.compact();
        let (g0, g1) = (&g0, &g1);
        let mut node_match = atoms_match;
        let mut edge_match = bonds_match;

        let mappings: Vec<BTreeMap<AtomIndex, AtomIndex>> =
            subgraph_isomorphisms_iter(&g0, &g1, &mut node_match, &mut edge_match)
                .map(|found| {
                    found
                        .map(|mapping| {
                            mapping
                                .into_iter()
                                .enumerate()
                                .map(|(from, to)| (pattern_handles[from], handles[to]))
                                .collect()
                        })
                        .collect()
                })
                .unwrap_or_default();
        trace!("found {} subgraph isomorphisms", mappings.len());
        mappings
    }
}
