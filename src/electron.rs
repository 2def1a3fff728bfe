use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

use lazy_static::lazy_static;

use crate::{Result, StructureError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Spin {
    None,
    Singlet,
    Doublet,
    Triplet,
    Quartet,
    Quintet,
}

/// A free-electron configuration: how many radical electrons an atom carries
/// and, for diradicals, how they are paired.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct ElectronState {
    pub label: &'static str,
    pub order: u8,
    pub spin: Spin,
    increased: Option<&'static str>,
    decreased: Option<&'static str>,
}

static ELECTRON_STATES: [ElectronState; 6] = [
    ElectronState { label: "0", order: 0, spin: Spin::None, increased: Some("1"), decreased: None },
    ElectronState { label: "1", order: 1, spin: Spin::Doublet, increased: Some("2T"), decreased: Some("0") },
    ElectronState { label: "2S", order: 2, spin: Spin::Singlet, increased: Some("3"), decreased: Some("1") },
    ElectronState { label: "2T", order: 2, spin: Spin::Triplet, increased: Some("3"), decreased: Some("1") },
    ElectronState { label: "3", order: 3, spin: Spin::Quartet, increased: Some("4"), decreased: Some("2T") },
    ElectronState { label: "4", order: 4, spin: Spin::Quintet, increased: None, decreased: Some("3") },
];

lazy_static! {
    static ref ELECTRON_STATE_INDEX: HashMap<&'static str, &'static ElectronState> =
        ELECTRON_STATES.iter().map(|s| (s.label, s)).collect();
}

/// Look up an electron state by label. Labels are case-insensitive (`2t` is `2T`).
pub fn electron_state(label: &str) -> Result<&'static ElectronState> {
    ELECTRON_STATE_INDEX
        .get(label.to_ascii_uppercase().as_str())
        .copied()
        .ok_or_else(|| StructureError::UnknownElectronState(label.to_string()))
}

fn lookup(label: &'static str) -> &'static ElectronState {
    // Transition targets are labels from the same static table.
    ELECTRON_STATE_INDEX[label]
}

impl ElectronState {
    /// The state with one more free electron.
    pub fn increased(&self) -> Result<&'static ElectronState> {
        self.increased
            .map(lookup)
            .ok_or(StructureError::CannotIncreaseFreeElectron(self.label))
    }

    /// The state with one less free electron.
    pub fn decreased(&self) -> Result<&'static ElectronState> {
        self.decreased
            .map(lookup)
            .ok_or(StructureError::CannotDecreaseFreeElectron(self.label))
    }

    /// Spin multiplicity as an external toolkit reports it (0 meaning "not a radical").
    pub fn spin_multiplicity(&self) -> Option<u8> {
        match self.label {
            "0" => Some(0),
            "2S" => Some(1),
            "1" => Some(2),
            "2T" => Some(3),
            _ => None,
        }
    }

    pub fn from_spin_multiplicity(multiplicity: u8) -> Result<&'static ElectronState> {
        let label = match multiplicity {
            0 => "0",
            1 => "2S",
            2 => "1",
            3 => "2T",
            _ => return Err(StructureError::UnknownSpinMultiplicity(multiplicity)),
        };
        Ok(lookup(label))
    }
}

impl Display for ElectronState {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        write!(f, "{}", self.label)
    }
}
