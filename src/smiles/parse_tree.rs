use crate::smiles::error::SmilesError;
use crate::smiles::tokenizer::{AtomToken, BondToken, Token};

#[derive(Debug, Clone)]
pub struct ParseAtom {
    pub token: AtomToken,
    /// Neighbors in SMILES order: the preceding atom, then ring closures and
    /// branches in the order they are written.
    pub neighbors: Vec<Neighbor>,
    /// Whether `neighbors[0]` is the atom this one was written after.
    pub has_preceding: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    pub bond: Option<BondToken>,
    pub atom_idx: usize,
}

#[derive(Debug, Clone)]
pub struct ParseTree {
    pub atoms: Vec<ParseAtom>,
}

struct OpenRing {
    atom: usize,
    slot: usize,
    bond: Option<BondToken>,
}

pub fn build_parse_tree(tokens: &[Token]) -> Result<ParseTree, SmilesError> {
    let mut atoms: Vec<ParseAtom> = Vec::new();
    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut current: Option<usize> = None;
    let mut pending_bond: Option<BondToken> = None;
    let mut open_rings: Vec<Option<OpenRing>> = (0..100).map(|_| None).collect();

    for token in tokens {
        match token {
            Token::Atom(atom_tok) => {
                let idx = atoms.len();
                atoms.push(ParseAtom {
                    token: atom_tok.clone(),
                    neighbors: Vec::new(),
                    has_preceding: current.is_some(),
                });
                if let Some(cur) = current {
                    let bond = pending_bond.take();
                    atoms[cur].neighbors.push(Neighbor { bond, atom_idx: idx });
                    atoms[idx].neighbors.push(Neighbor { bond, atom_idx: cur });
                }
                pending_bond = None;
                current = Some(idx);
            }
            Token::Bond(b) => pending_bond = Some(*b),
            Token::RingClosure { bond, digit, pos } => {
                let cur = current.ok_or(SmilesError::InvalidRingBond {
                    digit: *digit,
                    pos: *pos,
                })?;
                let d = usize::from(*digit);
                match open_rings[d].take() {
                    Some(open) => {
                        let ring_bond = match (*bond, open.bond) {
                            (None, None) => None,
                            (Some(b), None) | (None, Some(b)) => Some(b),
                            (Some(b1), Some(b2)) if b1 == b2 => Some(b1),
                            (Some(_), Some(_)) => {
                                return Err(SmilesError::RingBondConflict { digit: *digit });
                            }
                        };
                        let duplicate = open.atom == cur
                            || atoms[cur].neighbors.iter().any(|n| n.atom_idx == open.atom);
                        if duplicate {
                            return Err(SmilesError::DuplicateRingBond { digit: *digit });
                        }
                        atoms[open.atom].neighbors[open.slot] = Neighbor {
                            bond: ring_bond,
                            atom_idx: cur,
                        };
                        atoms[cur].neighbors.push(Neighbor {
                            bond: ring_bond,
                            atom_idx: open.atom,
                        });
                    }
                    None => {
                        let slot = atoms[cur].neighbors.len();
                        atoms[cur].neighbors.push(Neighbor {
                            bond: None,
                            atom_idx: usize::MAX,
                        });
                        open_rings[d] = Some(OpenRing {
                            atom: cur,
                            slot,
                            bond: *bond,
                        });
                    }
                }
            }
            Token::OpenParen(pos) => {
                let cur = current.ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                stack.push((cur, *pos));
            }
            Token::CloseParen(pos) => {
                let (cur, _) = stack.pop().ok_or(SmilesError::UnmatchedParen { pos: *pos })?;
                current = Some(cur);
                pending_bond = None;
            }
            Token::Dot(_) => {
                current = None;
                pending_bond = None;
            }
        }
    }

    if let Some(&(_, pos)) = stack.last() {
        return Err(SmilesError::UnmatchedParen { pos });
    }
    if let Some(digit) = open_rings.iter().position(Option::is_some) {
        return Err(SmilesError::UnclosedRing {
            digit: digit as u16,
        });
    }
    if pending_bond.is_some() {
        return Err(SmilesError::UnexpectedEnd);
    }

    Ok(ParseTree { atoms })
}
