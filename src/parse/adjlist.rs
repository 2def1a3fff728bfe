//! The adjacency-list notation.
//!
//! The first line is a free-form label. Every following non-blank line
//! describes one atom and the bonds it takes part in:
//!
//! ```text
//! allyl
//! 1 *1 C 1 {2,S}
//! 2 C 0 {1,S} {3,D}
//! 3 C 0 {2,D}
//! ```
//!
//! Types, states, and bond types may each be a single label or a braced
//! ambiguity set such as `{Cd,CO}`. Every bond must be listed from both ends
//! with the same type.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context};
use nom::{
    branch::alt,
    bytes::complete::{take_while, take_while1},
    character::complete::{char, digit1, space0, space1},
    combinator::{all_consuming, map, map_res, opt, recognize},
    error::{convert_error, VerboseError},
    multi::{many0, separated_list1},
    sequence::{delimited, pair, separated_pair, terminated, tuple},
    IResult,
};
use tracing::{debug, trace};

use crate::{
    atom_type, bond_type, electron_state, Atom, AtomIndex, Bond, Candidates, Result, Structure,
    StructureError,
};

type Res<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// One parsed atom line, before anything is resolved against the registries.
#[derive(Debug, PartialEq)]
struct AtomLine<'a> {
    id: usize,
    center: Option<&'a str>,
    atom_types: Vec<&'a str>,
    electron_states: Vec<&'a str>,
    bonds: Vec<(usize, Vec<&'a str>)>,
    /// The id was written as `1.` rather than `1`.
    numbered: bool,
    /// Bond descriptors were separated with commas.
    comma_separated: bool,
}

fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, '{' | '}' | ',')
}

fn symbol(input: &str) -> Res<&str> {
    take_while1(is_symbol_char)(input)
}

/// Either a bare label or a braced, comma-separated ambiguity set.
fn labels(input: &str) -> Res<Vec<&str>> {
    alt((
        delimited(char('{'), separated_list1(char(','), symbol), char('}')),
        map(symbol, |label| vec![label]),
    ))(input)
}

fn number(input: &str) -> Res<usize> {
    map_res(digit1, usize::from_str)(input)
}

fn atom_id(input: &str) -> Res<(usize, bool)> {
    map(pair(number, opt(char('.'))), |(id, period)| {
        (id, period.is_some())
    })(input)
}

fn center(input: &str) -> Res<&str> {
    recognize(pair(char('*'), take_while(|c: char| !c.is_whitespace())))(input)
}

fn bond(input: &str) -> Res<(usize, Vec<&str>)> {
    delimited(char('{'), separated_pair(number, char(','), labels), char('}'))(input)
}

fn separator(input: &str) -> Res<&str> {
    take_while1(|c: char| c == ',' || c.is_whitespace())(input)
}

fn atom_line(input: &str) -> Res<AtomLine> {
    let (input, (_, (id, numbered), _, center, atom_types, _, electron_states)) = tuple((
        space0,
        atom_id,
        space1,
        opt(terminated(center, space1)),
        labels,
        space1,
        labels,
    ))(input)?;
    let (input, bonds) = many0(pair(separator, bond))(input)?;
    let (input, trailing) = opt(separator)(input)?;

    let comma_separated = bonds
        .iter()
        .map(|(sep, _)| *sep)
        .chain(trailing)
        .any(|sep| sep.contains(','));
    let bonds = bonds.into_iter().map(|(_, bond)| bond).collect();
    Ok((
        input,
        AtomLine {
            id,
            center,
            atom_types,
            electron_states,
            bonds,
            numbered,
            comma_separated,
        },
    ))
}

fn parse_atom_line(line: &str) -> anyhow::Result<AtomLine> {
    match all_consuming(atom_line)(line) {
        Ok((_, parsed)) => Ok(parsed),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(anyhow!(convert_error(line, e))),
        Err(nom::Err::Incomplete(_)) => Err(anyhow!("incomplete atom line")),
    }
}

impl AtomLine<'_> {
    fn to_atom(&self) -> anyhow::Result<Atom> {
        let atom_types = self
            .atom_types
            .iter()
            .map(|label| atom_type(label))
            .collect::<Result<Vec<_>>>()?;
        let electron_states = self
            .electron_states
            .iter()
            .map(|label| electron_state(label))
            .collect::<Result<Vec<_>>>()?;
        let atom = Atom::with_candidates(
            Candidates::from_vec(atom_types)?,
            Candidates::from_vec(electron_states)?,
        );
        Ok(atom.with_label(self.center.unwrap_or_default()))
    }
}

fn read_adjacency_list(text: &str) -> anyhow::Result<Structure> {
    let mut lines = text.lines().enumerate();
    lines.next().context("missing label line")?;

    let mut structure = Structure::new();
    let mut atoms: HashMap<usize, AtomIndex> = HashMap::new();
    // Bond types keyed by both endpoint ids, exactly as written on each line.
    let mut adjacency: BTreeMap<usize, BTreeMap<usize, Vec<&str>>> = BTreeMap::new();

    for (number, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        let number = number + 1;
        let entry = parse_atom_line(line).with_context(|| format!("line {}", number))?;
        if entry.numbered {
            debug!("line {}: trailing period after atom id {}", number, entry.id);
        }
        if entry.comma_separated {
            debug!("line {}: bond descriptors separated by commas", number);
        }
        if atoms.contains_key(&entry.id) {
            bail!("line {}: atom {} is defined twice", number, entry.id);
        }

        let atom = entry
            .to_atom()
            .with_context(|| format!("line {}: atom {}", number, entry.id))?;
        let index = structure.add_atom(atom);
        atoms.insert(entry.id, index);

        let neighbors = adjacency.entry(entry.id).or_default();
        for (other, bond_types) in entry.bonds {
            if other == entry.id {
                bail!("line {}: atom {} is bonded to itself", number, other);
            }
            if neighbors.contains_key(&other) {
                bail!("line {}: atom {} lists neighbor {} twice", number, entry.id, other);
            }
            // The bond is created by whichever of its two lines comes second.
            if let Some(&other_index) = atoms.get(&other) {
                let types = bond_types
                    .iter()
                    .map(|label| bond_type(label))
                    .collect::<Result<Vec<_>>>()?;
                structure
                    .add_bond(Bond::with_types(index, other_index, Candidates::from_vec(types)?))
                    .with_context(|| format!("line {}: bond {}-{}", number, entry.id, other))?;
            }
            neighbors.insert(other, bond_types);
        }
    }

    for (a, neighbors) in &adjacency {
        for (b, types) in neighbors {
            match adjacency.get(b).and_then(|mirror| mirror.get(a)) {
                None => bail!("bond {}-{} is not listed on atom {}", a, b, b),
                Some(mirror) if mirror != types => bail!(
                    "bond {}-{} is {{{}}} on atom {} but {{{}}} on atom {}",
                    a,
                    b,
                    types.join(","),
                    a,
                    mirror.join(","),
                    b
                ),
                Some(_) => {}
            }
        }
    }

    Ok(structure)
}

impl Structure {
    /// Parse an adjacency list. Parsing is all-or-nothing: on failure only
    /// the label line is reported, and the cause is logged at debug level.
    pub fn from_adjacency_list(text: &str) -> Result<Structure> {
        read_adjacency_list(text).map_err(|cause| {
            let label = text.lines().next().unwrap_or_default().to_string();
            debug!("invalid adjacency list '{}': {:#}", label, cause);
            StructureError::InvalidAdjacencyList { label }
        })
    }

    /// Write this structure as an adjacency list headed by `label`.
    ///
    /// Atoms are numbered from 1 in iteration order, so ids from the
    /// original text are not preserved.
    pub fn to_adjacency_list(&self, label: &str) -> String {
        let ids: HashMap<AtomIndex, usize> = self
            .atoms()
            .enumerate()
            .map(|(i, atom)| (atom, i + 1))
            .collect();

        // Writing into a String cannot fail.
        let mut text = String::new();
        let _ = writeln!(text, "{}", label);
        for atom in self.atoms() {
            let data = &self[atom];
            let _ = write!(text, "{}", ids[&atom]);
            if data.is_center() {
                let _ = write!(text, " {}", data.label);
            }
            let _ = write!(text, " {} {}", data.atom_type, data.electron_state);
            for (neighbor, bond) in self.get_bonds(atom).unwrap_or_default() {
                let _ = write!(text, " {{{},{}}}", ids[&neighbor], self[bond].bond_type);
            }
            text.push('\n');
        }
        trace!("wrote adjacency list for {} atoms", ids.len());
        text
    }
}

impl FromStr for Structure {
    type Err = StructureError;

    fn from_str(s: &str) -> Result<Self> {
        Structure::from_adjacency_list(s)
    }
}
