use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::{Result, StructureError};

/// Either a single resolved value or an ambiguity set of candidates.
///
/// Generic functional-group patterns describe atoms and bonds with several
/// acceptable types at once (`{Cd,CO}`); concrete species always carry a
/// resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidates<T> {
    Resolved(T),
    /// Two or more candidates, kept in the order they were given.
    Ambiguous(Vec<T>),
}

impl<T> Candidates<T> {
    /// Build from a list, collapsing a single candidate to `Resolved`.
    pub fn from_vec(mut values: Vec<T>) -> Result<Self> {
        match values.len() {
            0 => Err(StructureError::EmptyCandidates),
            1 => Ok(Candidates::Resolved(values.remove(0))),
            _ => Ok(Candidates::Ambiguous(values)),
        }
    }

    pub fn resolved(&self) -> Option<&T> {
        match self {
            Candidates::Resolved(value) => Some(value),
            Candidates::Ambiguous(_) => None,
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Candidates::Ambiguous(_))
    }

    pub fn len(&self) -> usize {
        match self {
            Candidates::Resolved(_) => 1,
            Candidates::Ambiguous(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let values: &[T] = match self {
            Candidates::Resolved(value) => std::slice::from_ref(value),
            Candidates::Ambiguous(values) => values,
        };
        values.iter()
    }

    /// True if any candidate of `self` is equivalent to any candidate of `other`.
    pub fn intersects<F>(&self, other: &Self, mut equivalent: F) -> bool
    where
        F: FnMut(&T, &T) -> bool,
    {
        self.iter().any(|a| other.iter().any(|b| equivalent(a, b)))
    }
}

impl<T: Display> Candidates<T> {
    /// The resolved value, or an unresolved-model error naming `what` was being asked for.
    pub fn require(&self, what: &'static str) -> Result<&T> {
        self.resolved()
            .ok_or_else(|| StructureError::unresolved(what, self))
    }
}

impl<T> From<T> for Candidates<T> {
    fn from(value: T) -> Self {
        Candidates::Resolved(value)
    }
}

/// Renders `C` for a resolved value and `{Cd,CO}` for an ambiguity set.
impl<T: Display> Display for Candidates<T> {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Candidates::Resolved(value) => write!(f, "{}", value),
            Candidates::Ambiguous(values) => {
                write!(f, "{{")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", value)?;
                }
                write!(f, "}}")
            }
        }
    }
}
