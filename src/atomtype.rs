//! Atom-type inference.
//!
//! Each atom's bonding environment suggests a specific type (a carbon with
//! one triple bond is `Ct`, an oxygen with one double bond is `Od`, ...).
//! The suggestion is then reconciled against the type the atom already
//! carries, so that explicitly assigned specific types are never silently
//! replaced by incompatible ones.

use tracing::{debug, warn};

use crate::{atom_type, Atom, AtomIndex, AtomType, Candidates, Result, Structure};

/// Incident bonds of one atom, counted by type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BondCensus {
    pub single: usize,
    pub double: usize,
    pub triple: usize,
    pub benzene: usize,
    /// A carbon double-bonded to an oxygen.
    pub carbonyl: bool,
}

struct TypeRule {
    element: &'static str,
    applies: fn(&BondCensus) -> bool,
    suggests: &'static str,
}

/// Checked top to bottom; the first rule for the atom's element wins.
static TYPE_RULES: [TypeRule; 10] = [
    TypeRule { element: "C", applies: |c| c.triple == 1, suggests: "Ct" },
    TypeRule { element: "C", applies: |c| matches!(c.single, 3 | 4), suggests: "Cs" },
    TypeRule { element: "C", applies: |c| c.double == 2, suggests: "Cdd" },
    TypeRule { element: "C", applies: |c| c.carbonyl, suggests: "CO" },
    TypeRule { element: "C", applies: |c| c.double == 1 && matches!(c.single, 1 | 2), suggests: "Cds" },
    TypeRule { element: "C", applies: |c| c.double == 1, suggests: "Cd" },
    TypeRule { element: "C", applies: |c| matches!(c.benzene, 1 | 2), suggests: "Cb" },
    TypeRule { element: "C", applies: |c| c.benzene == 3, suggests: "Cbf" },
    TypeRule { element: "O", applies: |c| matches!(c.single, 1 | 2), suggests: "Os" },
    TypeRule { element: "O", applies: |c| c.double == 1, suggests: "Od" },
];

/// What to do with a suggested type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// The current type stays.
    Keep,
    /// The suggestion replaces the current type.
    Adopt,
    /// The suggestion contradicts a more specific type that was set explicitly.
    Conflict,
}

struct ReconcileRule {
    applies: fn(current: &AtomType, suggested: &AtomType) -> bool,
    outcome: Reconciliation,
}

/// Checked top to bottom. Anything no rule covers is a conflict.
static RECONCILE_RULES: [ReconcileRule; 7] = [
    ReconcileRule {
        applies: |current, suggested| current == suggested,
        outcome: Reconciliation::Keep,
    },
    ReconcileRule {
        applies: |_, suggested| suggested.is_bare_element(),
        outcome: Reconciliation::Keep,
    },
    ReconcileRule {
        applies: |current, suggested| {
            matches!(current.label, "Cds" | "Cdd") && suggested.label == "Cd"
        },
        outcome: Reconciliation::Keep,
    },
    ReconcileRule {
        applies: |current, suggested| current.label == "Cbf" && suggested.label == "Cb",
        outcome: Reconciliation::Keep,
    },
    ReconcileRule {
        applies: |current, suggested| current.label == "Cdd" && suggested.label == "CO",
        outcome: Reconciliation::Keep,
    },
    ReconcileRule {
        applies: |current, _| current.is_bare_element(),
        outcome: Reconciliation::Adopt,
    },
    ReconcileRule {
        applies: |current, suggested| {
            current.label == "Cd" && matches!(suggested.label, "Cds" | "Cdd" | "CO")
        },
        outcome: Reconciliation::Adopt,
    },
];

/// The type a census suggests for an atom of type `current`: the first
/// matching rule for its element, or else the bare element type.
/// Generic types get no suggestion.
pub fn suggest_atom_type(current: &AtomType, census: &BondCensus) -> Option<&'static AtomType> {
    let bare = current.element_type()?;
    let suggested = TYPE_RULES
        .iter()
        .find(|rule| rule.element == bare.label && (rule.applies)(census))
        .and_then(|rule| atom_type(rule.suggests).ok());
    Some(suggested.unwrap_or(bare))
}

pub fn reconcile(current: &AtomType, suggested: &AtomType) -> Reconciliation {
    RECONCILE_RULES
        .iter()
        .find(|rule| (rule.applies)(current, suggested))
        .map_or(Reconciliation::Conflict, |rule| rule.outcome)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtomTypeChange {
    pub atom: AtomIndex,
    pub from: &'static AtomType,
    pub to: &'static AtomType,
}

/// A suggestion that was not applied because the atom already carries an
/// incompatible specific type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeConflict {
    pub atom: AtomIndex,
    pub current: &'static AtomType,
    pub suggested: &'static AtomType,
}

/// The outcome of one [`Structure::update_atom_types`] pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeReport {
    pub changes: Vec<AtomTypeChange>,
    pub conflicts: Vec<TypeConflict>,
}

impl TypeReport {
    pub fn is_unchanged(&self) -> bool {
        self.changes.is_empty()
    }
}

/// The resolved, non-generic type of an atom, if it has one.
fn specific_type(atom: &Atom) -> Option<&'static AtomType> {
    atom.atom_type.resolved().copied().filter(|t| !t.is_generic())
}

impl Structure {
    /// Count the bonds of `atom` by type.
    pub fn bond_census(&self, atom: AtomIndex) -> Result<BondCensus> {
        let is_carbon = self.atom(atom)?.is_carbon();
        let mut census = BondCensus::default();
        for (neighbor, bond) in self.get_bonds(atom)? {
            let bond = &self[bond];
            if bond.is_single() {
                census.single += 1;
            } else if bond.is_double() {
                census.double += 1;
                if is_carbon && self[neighbor].is_oxygen() {
                    census.carbonyl = true;
                }
            } else if bond.is_triple() {
                census.triple += 1;
            } else if bond.is_benzene() {
                census.benzene += 1;
            }
        }
        Ok(census)
    }

    /// Bring every resolved, non-generic atom type in line with its bonds.
    ///
    /// Atoms holding an ambiguity set or a generic type are skipped.
    /// Conflicts leave the atom unchanged and are both logged and reported.
    /// Running this twice in a row changes nothing the second time.
    pub fn update_atom_types(&mut self) -> Result<TypeReport> {
        let mut report = TypeReport::default();
        let atoms: Vec<AtomIndex> = self.atoms().collect();

        for atom in atoms {
            let Some(current) = specific_type(&self[atom]) else {
                continue;
            };
            let census = self.bond_census(atom)?;
            let Some(suggested) = suggest_atom_type(current, &census) else {
                continue;
            };
            match reconcile(current, suggested) {
                Reconciliation::Keep => {}
                Reconciliation::Adopt => {
                    debug!("atom {}: {} -> {}", atom.index(), current, suggested);
                    self.atom_mut(atom)?.atom_type = Candidates::Resolved(suggested);
                    report.changes.push(AtomTypeChange {
                        atom,
                        from: current,
                        to: suggested,
                    });
                }
                Reconciliation::Conflict => {
                    warn!(
                        "atom {}: keeping explicit type {} although its bonds suggest {}",
                        atom.index(),
                        current,
                        suggested
                    );
                    report.conflicts.push(TypeConflict {
                        atom,
                        current,
                        suggested,
                    });
                }
            }
        }
        Ok(report)
    }

    /// Reset every resolved, non-generic atom to its bare element type.
    pub fn simplify_atom_types(&mut self) {
        for atom in self.atoms_mut() {
            if let Some(bare) = specific_type(atom).and_then(|t| t.element_type()) {
                atom.atom_type = Candidates::Resolved(bare);
            }
        }
    }
}
