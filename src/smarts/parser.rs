use std::collections::HashMap;

use crate::atom::Chirality;
use crate::element::Element;
use crate::mol::{AtomId, Mol, TetrahedralStereo};

use super::error::SmartsError;
use super::query::{AtomExpr, BondExpr};

const BRACKET_AROMATIC: [(&str, u8); 9] = [
    ("se", 34),
    ("te", 52),
    ("as", 33),
    ("b", 5),
    ("c", 6),
    ("n", 7),
    ("o", 8),
    ("p", 15),
    ("s", 16),
];

const BARE_AROMATIC: [(char, u8); 6] = [('b', 5), ('c', 6), ('n', 7), ('o', 8), ('p', 15), ('s', 16)];

struct ParsedAtom {
    expr: AtomExpr,
    /// Neighbors in written order; ring bonds keep the position of their
    /// opening digit.
    neighbors: Vec<usize>,
    has_preceding: bool,
}

struct OpenRing {
    atom: usize,
    slot: usize,
    bond: Option<BondExpr>,
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    bracket_start: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
            bracket_start: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn parse_number(&mut self) -> Option<u32> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        if self.pos == start {
            return None;
        }
        let s: String = self.chars[start..self.pos].iter().collect();
        s.parse().ok()
    }

    fn parse_count(&mut self, default: u8) -> Result<u8, SmartsError> {
        let start = self.pos;
        match self.parse_number() {
            None => Ok(default),
            Some(n) => u8::try_from(n).map_err(|_| SmartsError::InvalidSmarts {
                pos: start,
                msg: format!("count {n} out of range"),
            }),
        }
    }

    fn parse_smarts(&mut self) -> Result<Mol<AtomExpr, BondExpr>, SmartsError> {
        let mut atoms: Vec<ParsedAtom> = Vec::new();
        let mut bonds: Vec<(usize, usize, BondExpr)> = Vec::new();
        let mut stack: Vec<(usize, usize)> = Vec::new();
        let mut current: Option<usize> = None;
        let mut pending_bond: Option<BondExpr> = None;
        let mut open_rings: HashMap<u16, OpenRing> = HashMap::new();

        while let Some(ch) = self.peek() {
            match ch {
                '(' => {
                    let cur = current.ok_or(SmartsError::UnmatchedParen { pos: self.pos })?;
                    stack.push((cur, self.pos));
                    self.pos += 1;
                }
                ')' => {
                    let (cur, _) = stack
                        .pop()
                        .ok_or(SmartsError::UnmatchedParen { pos: self.pos })?;
                    current = Some(cur);
                    pending_bond = None;
                    self.pos += 1;
                }
                '.' => {
                    current = None;
                    pending_bond = None;
                    self.pos += 1;
                }
                '0'..='9' | '%' => {
                    let pos = self.pos;
                    let digit = self.parse_ring_closure()?;
                    let cur = current.ok_or_else(|| SmartsError::InvalidSmarts {
                        pos,
                        msg: "ring closure without preceding atom".into(),
                    })?;
                    match open_rings.remove(&digit) {
                        Some(open) => {
                            let bond = match (pending_bond.take(), open.bond) {
                                (Some(a), Some(b)) if a != b => {
                                    return Err(SmartsError::InvalidSmarts {
                                        pos,
                                        msg: format!("conflicting bonds on ring closure {digit}"),
                                    });
                                }
                                (Some(b), _) | (None, Some(b)) => b,
                                (None, None) => BondExpr::SingleOrAromatic,
                            };
                            if open.atom == cur || atoms[cur].neighbors.contains(&open.atom) {
                                return Err(SmartsError::InvalidSmarts {
                                    pos,
                                    msg: format!("duplicate bond on ring closure {digit}"),
                                });
                            }
                            atoms[open.atom].neighbors[open.slot] = cur;
                            atoms[cur].neighbors.push(open.atom);
                            bonds.push((open.atom, cur, bond));
                        }
                        None => {
                            let slot = atoms[cur].neighbors.len();
                            atoms[cur].neighbors.push(usize::MAX);
                            open_rings.insert(
                                digit,
                                OpenRing {
                                    atom: cur,
                                    slot,
                                    bond: pending_bond.take(),
                                },
                            );
                        }
                    }
                }
                '-' | '=' | '#' | '~' | ':' | '/' | '\\' | '@' | '!' => {
                    if pending_bond.is_some() {
                        return Err(SmartsError::InvalidSmarts {
                            pos: self.pos,
                            msg: "consecutive bond expressions".into(),
                        });
                    }
                    pending_bond = Some(self.parse_bond_expr()?);
                }
                _ => {
                    let expr = if ch == '[' {
                        self.parse_bracket_atom()?
                    } else {
                        self.parse_bare_atom()?
                    };
                    let idx = atoms.len();
                    atoms.push(ParsedAtom {
                        expr,
                        neighbors: Vec::new(),
                        has_preceding: current.is_some(),
                    });
                    if let Some(prev) = current {
                        let bond = pending_bond.take().unwrap_or(BondExpr::SingleOrAromatic);
                        atoms[prev].neighbors.push(idx);
                        atoms[idx].neighbors.push(prev);
                        bonds.push((prev, idx, bond));
                    }
                    pending_bond = None;
                    current = Some(idx);
                }
            }
        }

        if let Some(&(_, pos)) = stack.last() {
            return Err(SmartsError::UnmatchedParen { pos });
        }
        if let Some(&digit) = open_rings.keys().min() {
            return Err(SmartsError::UnclosedRing { digit });
        }
        if pending_bond.is_some() {
            return Err(SmartsError::InvalidSmarts {
                pos: self.pos,
                msg: "bond without a following atom".into(),
            });
        }

        Ok(build_query(atoms, bonds))
    }

    fn parse_ring_closure(&mut self) -> Result<u16, SmartsError> {
        let start = self.pos;
        if self.peek() == Some('%') {
            self.pos += 1;
            let d1 = self.peek().and_then(|c| c.to_digit(10));
            let d2 = self.peek_at(1).and_then(|c| c.to_digit(10));
            match (d1, d2) {
                (Some(a), Some(b)) => {
                    self.pos += 2;
                    Ok((a * 10 + b) as u16)
                }
                _ => Err(SmartsError::InvalidSmarts {
                    pos: start,
                    msg: "expected two digits after %".into(),
                }),
            }
        } else {
            let d = self.peek().and_then(|c| c.to_digit(10)).ok_or(
                SmartsError::UnexpectedChar {
                    pos: start,
                    ch: self.chars[start],
                },
            )?;
            self.pos += 1;
            Ok(d as u16)
        }
    }

    fn parse_bond_expr(&mut self) -> Result<BondExpr, SmartsError> {
        let mut parts = vec![self.parse_bond_or()?];
        while self.peek() == Some(';') {
            self.pos += 1;
            parts.push(self.parse_bond_or()?);
        }
        Ok(flatten_bond_and(parts))
    }

    fn parse_bond_or(&mut self) -> Result<BondExpr, SmartsError> {
        let mut parts = vec![self.parse_bond_high_and()?];
        while self.peek() == Some(',') {
            self.pos += 1;
            parts.push(self.parse_bond_high_and()?);
        }
        Ok(if parts.len() == 1 {
            parts.remove(0)
        } else {
            BondExpr::Or(parts)
        })
    }

    fn parse_bond_high_and(&mut self) -> Result<BondExpr, SmartsError> {
        let mut parts = vec![self.parse_bond_not()?];
        loop {
            match self.peek() {
                Some('&') => {
                    self.pos += 1;
                    parts.push(self.parse_bond_not()?);
                }
                Some('-' | '=' | '#' | '~' | ':' | '/' | '\\' | '@' | '!') => {
                    parts.push(self.parse_bond_not()?);
                }
                _ => break,
            }
        }
        Ok(flatten_bond_and(parts))
    }

    fn parse_bond_not(&mut self) -> Result<BondExpr, SmartsError> {
        if self.peek() == Some('!') {
            self.pos += 1;
            Ok(BondExpr::Not(Box::new(self.parse_bond_not()?)))
        } else {
            self.parse_bond_primitive()
        }
    }

    fn parse_bond_primitive(&mut self) -> Result<BondExpr, SmartsError> {
        let ch = self.peek().ok_or(SmartsError::InvalidSmarts {
            pos: self.pos,
            msg: "expected bond primitive".into(),
        })?;
        let bond = match ch {
            '-' => BondExpr::Single,
            '=' => BondExpr::Double,
            '#' => BondExpr::Triple,
            '~' => BondExpr::True,
            ':' => BondExpr::Aromatic,
            '/' => BondExpr::Up,
            '\\' => BondExpr::Down,
            '@' => BondExpr::Ring,
            _ => return Err(SmartsError::UnexpectedChar { pos: self.pos, ch }),
        };
        self.pos += 1;
        Ok(bond)
    }

    fn parse_bare_atom(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        let ch = self.chars[start];
        let expr = match ch {
            '*' => AtomExpr::True,
            'A' => AtomExpr::Aliphatic,
            'a' => AtomExpr::Aromatic,
            'C' if self.peek_at(1) == Some('l') => {
                self.pos += 1;
                element(17, Some(false))
            }
            'B' if self.peek_at(1) == Some('r') => {
                self.pos += 1;
                element(35, Some(false))
            }
            _ if ch.is_ascii_lowercase() => {
                let &(_, num) = BARE_AROMATIC
                    .iter()
                    .find(|(c, _)| *c == ch)
                    .ok_or(SmartsError::UnexpectedChar { pos: start, ch })?;
                element(num, Some(true))
            }
            _ => {
                let elem = Element::from_symbol(&ch.to_string())
                    .filter(|e| e.is_organic_subset())
                    .ok_or(SmartsError::UnexpectedChar { pos: start, ch })?;
                element(elem.atomic_num(), Some(false))
            }
        };
        self.pos += 1;
        Ok(expr)
    }

    fn parse_bracket_atom(&mut self) -> Result<AtomExpr, SmartsError> {
        let bracket_start = self.pos;
        self.pos += 1;
        self.bracket_start = bracket_start;

        let mut expr = self.parse_semicolon_expr()?;

        if self.peek() == Some(':') {
            self.pos += 1;
            let pos = self.pos;
            let n = self
                .parse_number()
                .and_then(|n| u16::try_from(n).ok())
                .ok_or(SmartsError::InvalidSmarts {
                    pos,
                    msg: "expected atom map number".into(),
                })?;
            expr = flatten_and(vec![expr, AtomExpr::AtomMapClass(n)]);
        }

        if self.peek() != Some(']') {
            return Err(SmartsError::UnclosedBracket { pos: bracket_start });
        }
        self.pos += 1;
        Ok(expr)
    }

    fn parse_semicolon_expr(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut parts = vec![self.parse_comma_expr()?];
        while self.peek() == Some(';') {
            self.pos += 1;
            parts.push(self.parse_comma_expr()?);
        }
        Ok(flatten_and(parts))
    }

    fn parse_comma_expr(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut parts = vec![self.parse_high_and_expr()?];
        while self.peek() == Some(',') {
            self.pos += 1;
            parts.push(self.parse_high_and_expr()?);
        }
        Ok(flatten_or(parts))
    }

    fn parse_high_and_expr(&mut self) -> Result<AtomExpr, SmartsError> {
        let mut parts = Vec::new();
        loop {
            match self.peek() {
                None | Some(']' | ',' | ';' | ':') => break,
                Some('&') => self.pos += 1,
                Some(_) => parts.push(self.parse_not_expr()?),
            }
        }
        if parts.is_empty() {
            return Err(SmartsError::InvalidSmarts {
                pos: self.pos,
                msg: "expected atom primitive".into(),
            });
        }
        Ok(flatten_and(parts))
    }

    fn parse_not_expr(&mut self) -> Result<AtomExpr, SmartsError> {
        if self.peek() == Some('!') {
            self.pos += 1;
            Ok(AtomExpr::Not(Box::new(self.parse_not_expr()?)))
        } else {
            self.parse_primitive()
        }
    }

    fn parse_primitive(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        let ch = self.peek().ok_or(SmartsError::InvalidSmarts {
            pos: start,
            msg: "expected atom primitive".into(),
        })?;

        if ch.is_ascii_uppercase() {
            if let Some(expr) = self.try_two_letter_element() {
                return Ok(expr);
            }
        }

        match ch {
            '*' => {
                self.pos += 1;
                Ok(AtomExpr::True)
            }
            '#' => {
                self.pos += 1;
                let num = self
                    .parse_number()
                    .filter(|n| (1..=118).contains(n))
                    .ok_or(SmartsError::InvalidAtomicNum { pos: start })?;
                Ok(element(num as u8, None))
            }
            'a' if self.peek_at(1) == Some('s') => self.parse_aromatic_element(),
            'a' => {
                self.pos += 1;
                Ok(AtomExpr::Aromatic)
            }
            'A' => {
                self.pos += 1;
                Ok(AtomExpr::Aliphatic)
            }
            'D' => {
                self.pos += 1;
                Ok(AtomExpr::Degree(self.parse_count(1)?))
            }
            'd' => {
                self.pos += 1;
                Ok(AtomExpr::NonHDegree(self.parse_count(1)?))
            }
            'v' => {
                self.pos += 1;
                Ok(AtomExpr::Valence(self.parse_count(1)?))
            }
            'X' => {
                self.pos += 1;
                Ok(AtomExpr::Connectivity(self.parse_count(1)?))
            }
            'x' => {
                self.pos += 1;
                Ok(AtomExpr::RingBondCount(self.parse_count(1)?))
            }
            'H' if self.is_hydrogen_element_context() => {
                self.pos += 1;
                Ok(element(1, Some(false)))
            }
            'H' => {
                self.pos += 1;
                Ok(AtomExpr::TotalHCount(self.parse_count(1)?))
            }
            'h' => {
                self.pos += 1;
                match self.parse_number() {
                    Some(n) => Ok(AtomExpr::ImplicitHCount(n.min(u8::MAX as u32) as u8)),
                    None => Ok(AtomExpr::HasImplicitH),
                }
            }
            'R' => {
                self.pos += 1;
                match self.parse_number() {
                    Some(0) => Ok(AtomExpr::NotInRing),
                    Some(n) => Ok(AtomExpr::RingMembership(n.min(u8::MAX as u32) as u8)),
                    None => Ok(AtomExpr::InRing),
                }
            }
            'r' => {
                self.pos += 1;
                match self.parse_number() {
                    Some(0) => Ok(AtomExpr::NotInRing),
                    Some(n) => Ok(AtomExpr::SmallestRingSize(n.min(u8::MAX as u32) as u8)),
                    None => Ok(AtomExpr::InRing),
                }
            }
            'z' => {
                self.pos += 1;
                match self.parse_number() {
                    Some(n) => Ok(AtomExpr::HeteroNeighborCount(n.min(u8::MAX as u32) as u8)),
                    None => Ok(AtomExpr::HasHeteroNeighbor),
                }
            }
            'Z' => {
                self.pos += 1;
                match self.parse_number() {
                    Some(n) => Ok(AtomExpr::AliphaticHeteroNeighborCount(
                        n.min(u8::MAX as u32) as u8,
                    )),
                    None => Ok(AtomExpr::HasAliphaticHeteroNeighbor),
                }
            }
            '@' => {
                self.pos += 1;
                if self.peek() == Some('@') {
                    self.pos += 1;
                    Ok(AtomExpr::Chirality(Chirality::Cw))
                } else {
                    Ok(AtomExpr::Chirality(Chirality::Ccw))
                }
            }
            '+' | '-' => Ok(AtomExpr::Charge(self.parse_charge()?)),
            '$' => {
                self.pos += 1;
                if self.peek() != Some('(') {
                    return Err(SmartsError::UnclosedRecursive { pos: start });
                }
                self.pos += 1;
                let inner = self.extract_balanced_parens(start)?;
                Ok(AtomExpr::Recursive(parse(&inner)?))
            }
            _ if ch.is_ascii_digit() => {
                let n = self.parse_number().unwrap_or(0);
                let iso = u16::try_from(n).map_err(|_| SmartsError::InvalidSmarts {
                    pos: start,
                    msg: format!("isotope {n} out of range"),
                })?;
                Ok(AtomExpr::Isotope(iso))
            }
            _ if ch.is_ascii_lowercase() => self.parse_aromatic_element(),
            _ if ch.is_ascii_uppercase() => {
                let elem = Element::from_symbol(&ch.to_string())
                    .ok_or(SmartsError::UnexpectedChar { pos: start, ch })?;
                self.pos += 1;
                Ok(element(elem.atomic_num(), Some(false)))
            }
            _ => Err(SmartsError::UnexpectedChar { pos: start, ch }),
        }
    }

    fn try_two_letter_element(&mut self) -> Option<AtomExpr> {
        let first = self.peek()?;
        let second = self.peek_at(1).filter(|c| c.is_ascii_lowercase())?;
        let elem = Element::from_symbol(&format!("{first}{second}"))?;
        self.pos += 2;
        Some(element(elem.atomic_num(), Some(false)))
    }

    fn parse_aromatic_element(&mut self) -> Result<AtomExpr, SmartsError> {
        let start = self.pos;
        for &(sym, num) in &BRACKET_AROMATIC {
            let len = sym.len();
            let matches = self
                .chars
                .get(start..start + len)
                .is_some_and(|s| s.iter().copied().eq(sym.chars()));
            if matches {
                self.pos += len;
                return Ok(element(num, Some(true)));
            }
        }
        Err(SmartsError::UnexpectedChar {
            pos: start,
            ch: self.chars[start],
        })
    }

    fn parse_charge(&mut self) -> Result<i8, SmartsError> {
        let start = self.pos;
        let sign = self.chars[start];
        self.pos += 1;
        let mut magnitude: u32 = 1;
        if let Some(n) = self.parse_number() {
            magnitude = n;
        } else {
            while self.peek() == Some(sign) {
                self.pos += 1;
                magnitude += 1;
            }
        }
        let value = i8::try_from(magnitude).map_err(|_| SmartsError::InvalidSmarts {
            pos: start,
            msg: "charge out of range".into(),
        })?;
        Ok(if sign == '-' { -value } else { value })
    }

    /// `H` names the element when nothing but an isotope precedes it in the
    /// bracket and it is followed by the end of the atom, a charge or a map.
    fn is_hydrogen_element_context(&self) -> bool {
        let before = &self.chars[self.bracket_start + 1..self.pos];
        if !before.iter().all(|c| c.is_ascii_digit()) {
            return false;
        }
        matches!(self.peek_at(1), Some(']' | '+' | '-' | ':'))
    }

    fn extract_balanced_parens(&mut self, start: usize) -> Result<String, SmartsError> {
        let inner_start = self.pos;
        let mut depth = 1;
        while let Some(ch) = self.peek() {
            match ch {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        let inner: String = self.chars[inner_start..self.pos].iter().collect();
                        self.pos += 1;
                        return Ok(inner);
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        Err(SmartsError::UnclosedRecursive { pos: start })
    }
}

fn element(atomic_num: u8, aromatic: Option<bool>) -> AtomExpr {
    AtomExpr::Element {
        atomic_num,
        aromatic,
    }
}

fn flatten_and(parts: Vec<AtomExpr>) -> AtomExpr {
    let mut flattened = Vec::new();
    for p in parts {
        match p {
            AtomExpr::And(inner) => flattened.extend(inner),
            other => flattened.push(other),
        }
    }
    if flattened.len() == 1 {
        flattened.remove(0)
    } else {
        AtomExpr::And(flattened)
    }
}

fn flatten_or(parts: Vec<AtomExpr>) -> AtomExpr {
    let mut flattened = Vec::new();
    for p in parts {
        match p {
            AtomExpr::Or(inner) => flattened.extend(inner),
            other => flattened.push(other),
        }
    }
    if flattened.len() == 1 {
        flattened.remove(0)
    } else {
        AtomExpr::Or(flattened)
    }
}

fn flatten_bond_and(parts: Vec<BondExpr>) -> BondExpr {
    let mut flattened = Vec::new();
    for p in parts {
        match p {
            BondExpr::And(inner) => flattened.extend(inner),
            other => flattened.push(other),
        }
    }
    if flattened.len() == 1 {
        flattened.remove(0)
    } else {
        BondExpr::And(flattened)
    }
}

fn has_single_h(expr: &AtomExpr) -> bool {
    match expr {
        AtomExpr::TotalHCount(1) => true,
        AtomExpr::And(parts) => parts.iter().any(has_single_h),
        _ => false,
    }
}

fn build_query(atoms: Vec<ParsedAtom>, bonds: Vec<(usize, usize, BondExpr)>) -> Mol<AtomExpr, BondExpr> {
    let mut mol = Mol::new();
    let nodes: Vec<_> = atoms.iter().map(|a| mol.add_atom(a.expr.clone())).collect();
    for (a, b, bond) in bonds {
        mol.add_bond(nodes[a], nodes[b], bond);
    }

    for (i, atom) in atoms.iter().enumerate() {
        let chirality = atom.expr.chirality();
        if chirality == Chirality::None {
            continue;
        }
        let mut order: Vec<AtomId> = atom
            .neighbors
            .iter()
            .map(|&n| AtomId::Node(nodes[n]))
            .collect();
        if has_single_h(&atom.expr) || order.len() == 3 {
            order.insert(usize::from(atom.has_preceding), AtomId::Implicit);
        }
        let Ok(mut neighbors) = <[AtomId; 4]>::try_from(order) else {
            continue;
        };
        if chirality == Chirality::Cw {
            neighbors.swap(2, 3);
        }
        mol.add_tetrahedral_stereo(TetrahedralStereo {
            center: nodes[i],
            neighbors,
        });
    }
    mol
}

pub fn parse(input: &str) -> Result<Mol<AtomExpr, BondExpr>, SmartsError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SmartsError::EmptyInput);
    }
    Parser::new(trimmed).parse_smarts()
}
