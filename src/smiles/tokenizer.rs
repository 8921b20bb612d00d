use crate::element::Element;
use crate::smiles::error::SmilesError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Atom(AtomToken),
    Bond(BondToken),
    RingClosure {
        bond: Option<BondToken>,
        digit: u16,
        pos: usize,
    },
    OpenParen(usize),
    CloseParen(usize),
    Dot(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomToken {
    /// `None` for the `*` wildcard.
    pub element: Option<Element>,
    pub is_aromatic: bool,
    pub isotope: u16,
    pub chirality: ChiralityToken,
    pub hcount: Option<u8>,
    pub charge: i8,
    pub atom_class: u16,
    pub is_bracket: bool,
    pub pos: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChiralityToken {
    None,
    CounterClockwise,
    Clockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondToken {
    Single,
    Double,
    Triple,
    Aromatic,
    Up,
    Down,
}

const ORGANIC: &[(&str, Element, bool)] = &[
    ("Cl", Element::Cl, false),
    ("Br", Element::Br, false),
    ("B", Element::B, false),
    ("C", Element::C, false),
    ("N", Element::N, false),
    ("O", Element::O, false),
    ("P", Element::P, false),
    ("S", Element::S, false),
    ("F", Element::F, false),
    ("I", Element::I, false),
    ("b", Element::B, true),
    ("c", Element::C, true),
    ("n", Element::N, true),
    ("o", Element::O, true),
    ("p", Element::P, true),
    ("s", Element::S, true),
];

const BRACKET_AROMATIC: &[(&str, Element)] = &[
    ("se", Element::Se),
    ("te", Element::Te),
    ("as", Element::As),
    ("b", Element::B),
    ("c", Element::C),
    ("n", Element::N),
    ("o", Element::O),
    ("p", Element::P),
    ("s", Element::S),
];

pub fn tokenize(input: &str) -> Result<Vec<Token>, SmilesError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            ' ' | '\t' | '\r' | '\n' => i += 1,
            '[' => {
                let (tok, next) = parse_bracket_atom(&chars, i)?;
                tokens.push(Token::Atom(tok));
                i = next;
            }
            '*' => {
                tokens.push(Token::Atom(bare_atom(None, false, i)));
                i += 1;
            }
            '-' | '=' | '#' | ':' | '/' | '\\' => {
                let bond = match ch {
                    '-' => BondToken::Single,
                    '=' => BondToken::Double,
                    '#' => BondToken::Triple,
                    ':' => BondToken::Aromatic,
                    '/' => BondToken::Up,
                    _ => BondToken::Down,
                };
                tokens.push(Token::Bond(bond));
                i += 1;
            }
            '(' => {
                tokens.push(Token::OpenParen(i));
                i += 1;
            }
            ')' => {
                tokens.push(Token::CloseParen(i));
                i += 1;
            }
            '.' => {
                tokens.push(Token::Dot(i));
                i += 1;
            }
            '%' => {
                let digits: String = chars.iter().skip(i + 1).take(2).collect();
                if digits.len() != 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
                    return Err(SmilesError::UnexpectedChar { pos: i, ch: '%' });
                }
                let digit = digits.parse::<u16>().map_err(|_| SmilesError::UnexpectedChar {
                    pos: i,
                    ch: '%',
                })?;
                let bond = take_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure { bond, digit, pos: i });
                i += 3;
            }
            d @ '0'..='9' => {
                let bond = take_pending_bond(&mut tokens);
                tokens.push(Token::RingClosure {
                    bond,
                    digit: d as u16 - '0' as u16,
                    pos: i,
                });
                i += 1;
            }
            _ => {
                let rest: String = chars[i..chars.len().min(i + 2)].iter().collect();
                let Some(&(sym, element, aromatic)) =
                    ORGANIC.iter().find(|(sym, _, _)| rest.starts_with(sym))
                else {
                    return Err(SmilesError::UnexpectedChar { pos: i, ch });
                };
                tokens.push(Token::Atom(bare_atom(Some(element), aromatic, i)));
                i += sym.len();
            }
        }
    }

    Ok(tokens)
}

fn bare_atom(element: Option<Element>, aromatic: bool, pos: usize) -> AtomToken {
    AtomToken {
        element,
        is_aromatic: aromatic,
        isotope: 0,
        chirality: ChiralityToken::None,
        hcount: None,
        charge: 0,
        atom_class: 0,
        is_bracket: false,
        pos,
    }
}

fn take_pending_bond(tokens: &mut Vec<Token>) -> Option<BondToken> {
    if let Some(Token::Bond(b)) = tokens.last().cloned() {
        tokens.pop();
        return Some(b);
    }
    None
}

fn parse_bracket_atom(chars: &[char], start: usize) -> Result<(AtomToken, usize), SmilesError> {
    let mut i = start + 1;

    let isotope = parse_number(chars, &mut i).unwrap_or(0) as u16;
    let (element, is_aromatic) = parse_bracket_element(chars, &mut i, start)?;
    let chirality = parse_chirality(chars, &mut i);
    let hcount = parse_hcount(chars, &mut i);
    let charge = parse_charge(chars, &mut i, start)?;
    let atom_class = if chars.get(i) == Some(&':') {
        i += 1;
        parse_number(chars, &mut i).unwrap_or(0) as u16
    } else {
        0
    };

    if chars.get(i) != Some(&']') {
        return Err(SmilesError::UnclosedBracket { pos: start });
    }
    i += 1;

    Ok((
        AtomToken {
            element,
            is_aromatic,
            isotope,
            chirality,
            hcount: Some(hcount),
            charge,
            atom_class,
            is_bracket: true,
            pos: start,
        },
        i,
    ))
}

fn parse_number(chars: &[char], i: &mut usize) -> Option<u32> {
    let begin = *i;
    let mut val: u32 = 0;
    while let Some(d) = chars.get(*i).and_then(|c| c.to_digit(10)) {
        val = val.saturating_mul(10).saturating_add(d);
        *i += 1;
    }
    (*i > begin).then_some(val)
}

fn parse_bracket_element(
    chars: &[char],
    i: &mut usize,
    bracket_start: usize,
) -> Result<(Option<Element>, bool), SmilesError> {
    let Some(&first) = chars.get(*i) else {
        return Err(SmilesError::UnclosedBracket { pos: bracket_start });
    };
    if first == '*' {
        *i += 1;
        return Ok((None, false));
    }

    let rest: String = chars[*i..chars.len().min(*i + 2)].iter().collect();
    for &(pat, elem) in BRACKET_AROMATIC {
        if rest.starts_with(pat) {
            *i += pat.len();
            return Ok((Some(elem), true));
        }
    }

    if first.is_ascii_uppercase() {
        if let Some(&second) = chars.get(*i + 1).filter(|c| c.is_ascii_lowercase()) {
            let sym: String = [first, second].iter().collect();
            if let Some(e) = Element::from_symbol(&sym) {
                *i += 2;
                return Ok((Some(e), false));
            }
        }
        if let Some(e) = Element::from_symbol(&first.to_string()) {
            *i += 1;
            return Ok((Some(e), false));
        }
    }

    Err(SmilesError::InvalidElement {
        pos: *i,
        text: first.to_string(),
    })
}

fn parse_chirality(chars: &[char], i: &mut usize) -> ChiralityToken {
    if chars.get(*i) != Some(&'@') {
        return ChiralityToken::None;
    }
    *i += 1;
    if chars.get(*i) == Some(&'@') {
        *i += 1;
        ChiralityToken::Clockwise
    } else {
        ChiralityToken::CounterClockwise
    }
}

fn parse_hcount(chars: &[char], i: &mut usize) -> u8 {
    if chars.get(*i) != Some(&'H') {
        return 0;
    }
    *i += 1;
    match chars.get(*i).and_then(|c| c.to_digit(10)) {
        Some(d) => {
            *i += 1;
            d as u8
        }
        None => 1,
    }
}

fn parse_charge(chars: &[char], i: &mut usize, bracket_start: usize) -> Result<i8, SmilesError> {
    let sign: i8 = match chars.get(*i) {
        Some('+') => 1,
        Some('-') => -1,
        _ => return Ok(0),
    };
    let symbol = chars[*i];
    *i += 1;

    if let Some(n) = parse_number(chars, i) {
        let magnitude =
            i8::try_from(n).map_err(|_| SmilesError::InvalidCharge { pos: bracket_start })?;
        return Ok(sign * magnitude);
    }
    let mut count: i8 = 1;
    while chars.get(*i) == Some(&symbol) {
        count = count
            .checked_add(1)
            .ok_or(SmilesError::InvalidCharge { pos: bracket_start })?;
        *i += 1;
    }
    Ok(sign * count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_atom(s: &str) -> AtomToken {
        match tokenize(s).unwrap().into_iter().next() {
            Some(Token::Atom(a)) => a,
            other => panic!("expected atom, got {other:?}"),
        }
    }

    #[test]
    fn organic_subset() {
        let tokens = tokenize("ClCBr").unwrap();
        assert_eq!(tokens.len(), 3);
        assert_eq!(single_atom("Cl").element, Some(Element::Cl));
        assert!(single_atom("c").is_aromatic);
        assert_eq!(single_atom("*").element, None);
    }

    #[test]
    fn bracket_atom() {
        let a = single_atom("[NH4+]");
        assert_eq!(a.element, Some(Element::N));
        assert!(a.is_bracket);
        assert_eq!(a.hcount, Some(4));
        assert_eq!(a.charge, 1);
    }

    #[test]
    fn isotope_and_class() {
        let a = single_atom("[13CH3:7]");
        assert_eq!(a.isotope, 13);
        assert_eq!(a.hcount, Some(3));
        assert_eq!(a.atom_class, 7);
    }

    #[test]
    fn charges() {
        assert_eq!(single_atom("[O-]").charge, -1);
        assert_eq!(single_atom("[O-2]").charge, -2);
        assert_eq!(single_atom("[O--]").charge, -2);
        assert_eq!(single_atom("[Fe+++]").charge, 3);
    }

    #[test]
    fn chirality() {
        assert_eq!(
            single_atom("[C@@H]").chirality,
            ChiralityToken::Clockwise
        );
        assert_eq!(
            single_atom("[C@H]").chirality,
            ChiralityToken::CounterClockwise
        );
    }

    #[test]
    fn aromatic_brackets() {
        let a = single_atom("[se]");
        assert!(a.is_aromatic);
        assert_eq!(a.element, Some(Element::Se));
        let a = single_atom("[nH]");
        assert!(a.is_aromatic);
        assert_eq!(a.hcount, Some(1));
        assert_eq!(single_atom("[Sc]").element, Some(Element::Sc));
    }

    #[test]
    fn ring_closures_take_bonds() {
        let tokens = tokenize("C=1CC%12CC1").unwrap();
        assert!(matches!(
            tokens[1],
            Token::RingClosure {
                bond: Some(BondToken::Double),
                digit: 1,
                ..
            }
        ));
        assert!(matches!(tokens[4], Token::RingClosure { digit: 12, .. }));
    }

    #[test]
    fn rejects_garbage() {
        assert!(tokenize("C$C").is_err());
        assert!(tokenize("[C").is_err());
        assert!(tokenize("[Xx]").is_err());
    }
}
