use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use petgraph::visit::EdgeRef;
use tracing::trace;

use super::{AtomIndex, BondIndex, Structure};

impl Structure {
    /// The smallest set of smallest rings.
    ///
    /// Holds exactly `bonds - atoms + components` rings, each the atoms of
    /// one cycle in ring order. Rings come smallest first; each starts at
    /// its lowest atom handle. Acyclic structures have none.
    pub fn smallest_set_of_smallest_rings(&self) -> Vec<Vec<AtomIndex>> {
        let independent =
            (self.bond_count() + self.connected_components().len()).saturating_sub(self.atom_count());
        if independent == 0 {
            return Vec::new();
        }

        let ring_atoms = self.ring_atoms();
        let mut candidates = Vec::new();
        for bond in self.bonds() {
            let Ok((a, b)) = self.bond_endpoints(bond) else {
                continue;
            };
            if !ring_atoms.contains(&a) || !ring_atoms.contains(&b) {
                continue;
            }
            for path in self.shortest_paths_avoiding(a, b, bond, &ring_atoms) {
                let ring = normalize_ring(path);
                if !candidates.contains(&ring) {
                    candidates.push(ring);
                }
            }
        }
        candidates.sort_by(|x, y| x.len().cmp(&y.len()).then_with(|| x.cmp(y)));

        let positions: HashMap<BondIndex, usize> =
            self.bonds().enumerate().map(|(i, bond)| (bond, i)).collect();
        let mut basis = BTreeMap::new();
        let mut rings = Vec::with_capacity(independent);
        for ring in candidates {
            if rings.len() == independent {
                break;
            }
            if add_to_basis(&mut basis, self.ring_bits(&ring, &positions)) {
                rings.push(ring);
            }
        }
        trace!("{} of {} rings found", rings.len(), independent);
        rings
    }

    /// Atoms left after repeatedly stripping atoms with at most one neighbor.
    fn ring_atoms(&self) -> HashSet<AtomIndex> {
        let mut degree: HashMap<AtomIndex, usize> = self
            .atoms()
            .map(|atom| (atom, self.graph.neighbors(atom).count()))
            .collect();
        let mut pending: VecDeque<AtomIndex> = degree
            .iter()
            .filter(|(_, d)| **d <= 1)
            .map(|(atom, _)| *atom)
            .collect();
        let mut stripped = HashSet::new();

        while let Some(atom) = pending.pop_front() {
            if !stripped.insert(atom) {
                continue;
            }
            for neighbor in self.graph.neighbors(atom) {
                if stripped.contains(&neighbor) {
                    continue;
                }
                if let Some(d) = degree.get_mut(&neighbor) {
                    *d -= 1;
                    if *d <= 1 {
                        pending.push_back(neighbor);
                    }
                }
            }
        }
        self.atoms().filter(|atom| !stripped.contains(atom)).collect()
    }

    /// Every shortest path from `start` to `end` through `allowed` atoms
    /// that does not cross `excluded`.
    fn shortest_paths_avoiding(
        &self,
        start: AtomIndex,
        end: AtomIndex,
        excluded: BondIndex,
        allowed: &HashSet<AtomIndex>,
    ) -> Vec<Vec<AtomIndex>> {
        let mut distance = HashMap::from([(start, 0usize)]);
        let mut parents: HashMap<AtomIndex, Vec<AtomIndex>> = HashMap::new();
        let mut queue = VecDeque::from([start]);

        while let Some(current) = queue.pop_front() {
            let next = distance[&current] + 1;
            if distance.get(&end).is_some_and(|&d| next > d) {
                break;
            }
            for edge in self.graph.edges(current) {
                if edge.id() == excluded {
                    continue;
                }
                let neighbor = if edge.source() == current {
                    edge.target()
                } else {
                    edge.source()
                };
                if !allowed.contains(&neighbor) {
                    continue;
                }
                match distance.get(&neighbor) {
                    None => {
                        distance.insert(neighbor, next);
                        parents.insert(neighbor, vec![current]);
                        queue.push_back(neighbor);
                    }
                    Some(&d) if d == next => {
                        parents.entry(neighbor).or_default().push(current);
                    }
                    Some(_) => {}
                }
            }
        }

        let mut paths = Vec::new();
        let mut partials = vec![vec![end]];
        while let Some(mut partial) = partials.pop() {
            let last = partial[partial.len() - 1];
            if last == start {
                partial.reverse();
                paths.push(partial);
                continue;
            }
            for &previous in parents.get(&last).into_iter().flatten() {
                let mut longer = partial.clone();
                longer.push(previous);
                partials.push(longer);
            }
        }
        paths
    }

    /// The ring's bonds as a bit set over bond positions.
    fn ring_bits(&self, ring: &[AtomIndex], positions: &HashMap<BondIndex, usize>) -> Vec<u64> {
        let mut bits = vec![0u64; positions.len().div_ceil(64)];
        for (i, &atom) in ring.iter().enumerate() {
            let next = ring[(i + 1) % ring.len()];
            if let Some(&position) = self
                .get_bond(atom, next)
                .and_then(|bond| positions.get(&bond))
            {
                bits[position / 64] |= 1 << (position % 64);
            }
        }
        bits
    }
}

/// Rotate the lowest atom to the front, then walk toward its lower neighbor.
fn normalize_ring(mut ring: Vec<AtomIndex>) -> Vec<AtomIndex> {
    if ring.len() < 3 {
        return ring;
    }
    if let Some(lowest) = ring.iter().enumerate().min_by_key(|(_, &a)| a).map(|(i, _)| i) {
        ring.rotate_left(lowest);
    }
    if ring[ring.len() - 1] < ring[1] {
        ring[1..].reverse();
    }
    ring
}

fn lowest_bit(bits: &[u64]) -> Option<usize> {
    bits.iter()
        .enumerate()
        .find(|(_, &word)| word != 0)
        .map(|(i, &word)| i * 64 + word.trailing_zeros() as usize)
}

/// Gaussian elimination over GF(2), keyed by each row's lowest set bit.
/// Returns false when `bits` is a sum of rings already in `basis`.
fn add_to_basis(basis: &mut BTreeMap<usize, Vec<u64>>, mut bits: Vec<u64>) -> bool {
    while let Some(pivot) = lowest_bit(&bits) {
        match basis.get(&pivot) {
            Some(row) => {
                for (word, other) in bits.iter_mut().zip(row) {
                    *word ^= other;
                }
            }
            None => {
                basis.insert(pivot, bits);
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Atom, Bond};

    fn carbons(count: usize, bonds: &[(usize, usize)]) -> (Structure, Vec<AtomIndex>) {
        let mut s = Structure::new();
        let atoms: Vec<_> = (0..count)
            .map(|_| s.add_atom(Atom::new("C", "0").unwrap()))
            .collect();
        for &(a, b) in bonds {
            s.add_bond(Bond::new(atoms[a], atoms[b], "S").unwrap())
                .unwrap();
        }
        (s, atoms)
    }

    #[test]
    fn test_acyclic_has_no_rings() {
        let (propane, _) = carbons(3, &[(0, 1), (1, 2)]);
        assert!(propane.smallest_set_of_smallest_rings().is_empty());
        assert!(Structure::new().smallest_set_of_smallest_rings().is_empty());
    }

    #[test]
    fn test_single_ring_skips_substituents() {
        let (methylcyclopropane, atoms) = carbons(4, &[(0, 1), (1, 2), (2, 0), (2, 3)]);
        assert_eq!(
            methylcyclopropane.smallest_set_of_smallest_rings(),
            vec![vec![atoms[0], atoms[1], atoms[2]]]
        );
    }

    #[test]
    fn test_fused_rings() {
        // Bicyclobutane: two triangles sharing the 0-2 bond.
        let (bicyclobutane, atoms) = carbons(4, &[(0, 1), (1, 2), (2, 0), (0, 3), (3, 2)]);
        assert_eq!(
            bicyclobutane.smallest_set_of_smallest_rings(),
            vec![
                vec![atoms[0], atoms[1], atoms[2]],
                vec![atoms[0], atoms[2], atoms[3]],
            ]
        );

        // Decalin skeleton: the ten-membered perimeter is never chosen.
        let (decalin, _) = carbons(
            10,
            &[
                (0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0),
                (0, 6), (6, 7), (7, 8), (8, 9), (9, 5),
            ],
        );
        let rings = decalin.smallest_set_of_smallest_rings();
        assert_eq!(rings.len(), 2);
        assert!(rings.iter().all(|ring| ring.len() == 6));
    }

    #[test]
    fn test_cube_needs_five_rings() {
        let (cubane, _) = carbons(
            8,
            &[
                (0, 1), (1, 2), (2, 3), (3, 0),
                (4, 5), (5, 6), (6, 7), (7, 4),
                (0, 4), (1, 5), (2, 6), (3, 7),
            ],
        );
        let rings = cubane.smallest_set_of_smallest_rings();
        assert_eq!(rings.len(), 5);
        assert!(rings.iter().all(|ring| ring.len() == 4));
    }

    #[test]
    fn test_rings_per_component() {
        let (triangle, _) = carbons(3, &[(0, 1), (1, 2), (2, 0)]);
        let pair = triangle.merge(&triangle);
        let rings = pair.smallest_set_of_smallest_rings();
        assert_eq!(rings.len(), 2);
        assert_ne!(rings[0], rings[1]);
    }
}
