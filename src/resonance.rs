//! Allylic resonance: moving a radical two atoms along a chain while the
//! double bond between them shifts the other way.
//!
//! ```text
//! C=C-C*   ->   *C-C=C
//! 3 2 1         3 2 1
//! ```

use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::{AtomIndex, BondIndex, Result, Structure};

/// One radical/vinyl/allyl span: the radical on `atom1` can move to `atom3`
/// by raising `bond12` and lowering `bond23` one order each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DelocalizationPath {
    pub atom1: AtomIndex,
    pub atom2: AtomIndex,
    pub atom3: AtomIndex,
    pub bond12: BondIndex,
    pub bond23: BondIndex,
}

impl Structure {
    /// Every delocalization path starting at the radical `atom1`.
    /// Empty when `atom1` carries no free electrons.
    pub fn find_all_delocalization_paths(
        &self,
        atom1: AtomIndex,
    ) -> Result<Vec<DelocalizationPath>> {
        if self.atom(atom1)?.radical_order()? == 0 {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for (atom2, bond12) in self.get_bonds(atom1)? {
            if !self[bond12].can_increase_order() {
                continue;
            }
            for (atom3, bond23) in self.get_bonds(atom2)? {
                if atom3 != atom1 && self[bond23].can_decrease_order() {
                    paths.push(DelocalizationPath {
                        atom1,
                        atom2,
                        atom3,
                        bond12,
                        bond23,
                    });
                }
            }
        }
        trace!("{} delocalization paths from atom {}", paths.len(), atom1.index());
        Ok(paths)
    }

    /// A copy of this structure with the radical shifted along `path`.
    pub fn apply_delocalization(&self, path: &DelocalizationPath) -> Result<Structure> {
        let mut isomer = self.clone();
        isomer.atom_mut(path.atom1)?.decrease_free_electron()?;
        isomer.atom_mut(path.atom3)?.increase_free_electron()?;
        isomer.increase_bond_order(path.bond12)?;
        isomer.decrease_bond_order(path.bond23)?;
        Ok(isomer)
    }

    /// Every resonance isomer one allylic shift away, one per path.
    ///
    /// Isomorphic duplicates are not removed; see [`Structure::resonance_isomers`].
    pub fn get_adjacent_resonance_isomers(&self) -> Result<Vec<Structure>> {
        if self.radical_count()? == 0 {
            return Ok(Vec::new());
        }
        let mut isomers = Vec::new();
        for atom in self.atoms() {
            for path in self.find_all_delocalization_paths(atom)? {
                isomers.push(self.apply_delocalization(&path)?);
            }
        }
        Ok(isomers)
    }

    /// Every resonance isomer reachable by repeated allylic shifts, with
    /// isomorphic duplicates removed. The first entry is a copy of `self`.
    pub fn resonance_isomers(&self) -> Result<Vec<Structure>> {
        let mut isomers = vec![self.clone()];
        let mut pending = VecDeque::from([0]);
        while let Some(next) = pending.pop_front() {
            let adjacent = isomers[next].get_adjacent_resonance_isomers()?;
            for candidate in adjacent {
                if !isomers.iter().any(|known| known.is_isomorphic(&candidate)) {
                    isomers.push(candidate);
                    pending.push_back(isomers.len() - 1);
                }
            }
        }
        debug!("{} distinct resonance isomers", isomers.len());
        Ok(isomers)
    }
}
