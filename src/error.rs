use thiserror::Error;

use crate::{AtomIndex, BondIndex};

/// Everything that can go wrong while building, editing, or reading a [`Structure`](crate::Structure).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructureError {
    /// The adjacency list could not be parsed. Only the label of the list is kept.
    #[error("Invalid adjacency list: {label}")]
    InvalidAdjacencyList { label: String },

    #[error("atom {} is not part of this structure", .0.index())]
    MissingAtom(AtomIndex),
    #[error("bond {} is not part of this structure", .0.index())]
    MissingBond(BondIndex),
    #[error("atom {} cannot be bonded to itself", .0.index())]
    SelfBond(AtomIndex),
    #[error("atoms {} and {} are already bonded", .0.index(), .1.index())]
    DuplicateBond(AtomIndex, AtomIndex),

    #[error("cannot increase the order of a bond of type {0}")]
    CannotIncreaseOrder(&'static str),
    #[error("cannot decrease the order of a bond of type {0}")]
    CannotDecreaseOrder(&'static str),
    #[error("cannot add a free electron to electron state {0}")]
    CannotIncreaseFreeElectron(&'static str),
    #[error("cannot remove a free electron from electron state {0}")]
    CannotDecreaseFreeElectron(&'static str),

    /// A type-dependent operation was attempted on an ambiguity set or a generic type.
    #[error("{what} is unresolved: {candidates}")]
    Unresolved { what: &'static str, candidates: String },
    #[error("a candidate set must not be empty")]
    EmptyCandidates,

    #[error("unknown atom type '{0}'")]
    UnknownAtomType(String),
    #[error("unknown electron state '{0}'")]
    UnknownElectronState(String),
    #[error("unknown bond type '{0}'")]
    UnknownBondType(String),
    #[error("unknown element with atomic number {0}")]
    UnknownElement(u8),
    #[error("no electron state has spin multiplicity {0}")]
    UnknownSpinMultiplicity(u8),

    #[error("center label '{0}' is used by more than one atom")]
    DuplicateLabel(String),

    #[error("toolkit failure: {0}")]
    Toolkit(String),
}

impl StructureError {
    pub(crate) fn unresolved(what: &'static str, candidates: impl ToString) -> Self {
        Self::Unresolved {
            what,
            candidates: candidates.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StructureError>;
