use crate::{
    atom_type, electron_state, AtomType, Candidates, Element, ElectronState, Result,
};

/// An atom (or a generic atom pattern) inside a [`Structure`](crate::Structure).
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub atom_type: Candidates<&'static AtomType>,
    pub electron_state: Candidates<&'static ElectronState>,
    /// Center label such as `*` or `*2`; empty for ordinary atoms.
    pub label: String,
}

impl Atom {
    /// Create a resolved atom from labels, e.g. `Atom::new("C", "1")` for a carbon radical.
    pub fn new(atom_type: &str, electron_state: &str) -> Result<Self> {
        Ok(Self::with_candidates(
            self::atom_type(atom_type)?,
            self::electron_state(electron_state)?,
        ))
    }

    pub fn with_candidates(
        atom_type: impl Into<Candidates<&'static AtomType>>,
        electron_state: impl Into<Candidates<&'static ElectronState>>,
    ) -> Self {
        Self {
            atom_type: atom_type.into(),
            electron_state: electron_state.into(),
            label: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// The element of a resolved, non-generic atom.
    pub fn element(&self) -> Option<&'static Element> {
        self.atom_type.resolved().and_then(|t| t.element())
    }

    fn is_element(&self, symbol: &str) -> bool {
        self.element().is_some_and(|e| e.symbol == symbol)
    }

    pub fn is_carbon(&self) -> bool {
        self.is_element("C")
    }

    pub fn is_oxygen(&self) -> bool {
        self.is_element("O")
    }

    pub fn is_hydrogen(&self) -> bool {
        self.is_element("H")
    }

    pub fn is_center(&self) -> bool {
        !self.label.is_empty()
    }

    /// Number of radical electrons on this atom.
    pub fn radical_order(&self) -> Result<u8> {
        Ok(self.electron_state.require("electron state")?.order)
    }

    pub fn increase_free_electron(&mut self) -> Result<()> {
        let next = self.electron_state.require("electron state")?.increased()?;
        self.electron_state = Candidates::Resolved(next);
        Ok(())
    }

    pub fn decrease_free_electron(&mut self) -> Result<()> {
        let next = self.electron_state.require("electron state")?.decreased()?;
        self.electron_state = Candidates::Resolved(next);
        Ok(())
    }

    /// Atoms match when both their type sets and their electron state sets
    /// share an equivalent member. Generic types match their specific cases.
    pub fn is_equivalent(&self, other: &Atom) -> bool {
        self.atom_type
            .intersects(&other.atom_type, |a, b| a.is_equivalent(b))
            && self
                .electron_state
                .intersects(&other.electron_state, |a, b| a == b)
    }
}
