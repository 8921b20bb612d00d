//! Connection tables in MDL V2000 and V3000 layout.
//!
//! A [`Ctab`] is the element-agnostic middle ground between the text and
//! the molecular graph: atoms are kept as symbols with their property
//! fields, bonds as 0-based atom pairs with the raw MDL bond type. Both
//! molecules and reaction templates are read and written through it.

use std::fmt::Write;

use super::error::MdlError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CtabAtom {
    pub symbol: String,
    pub charge: i8,
    pub isotope: u16,
    /// Unpaired electrons.
    pub radical: u8,
    pub map_num: u16,
}

impl CtabAtom {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CtabBond {
    pub begin: usize,
    pub end: usize,
    /// MDL bond type, 1..=8.
    pub kind: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Ctab {
    pub atoms: Vec<CtabAtom>,
    pub bonds: Vec<CtabBond>,
}

/// Fixed-width column, trimmed. Short lines read as empty fields.
fn column(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start..end).unwrap_or("").trim()
}

fn parse_num<T: std::str::FromStr>(
    text: &str,
    line: usize,
    field: &'static str,
) -> Result<T, MdlError> {
    text.parse().map_err(|_| MdlError::BadField {
        line,
        field,
        value: text.to_string(),
    })
}

/// Like [`parse_num`], but an empty column reads as zero.
fn parse_opt<T: std::str::FromStr + Default>(
    text: &str,
    line: usize,
    field: &'static str,
) -> Result<T, MdlError> {
    if text.is_empty() {
        Ok(T::default())
    } else {
        parse_num(text, line, field)
    }
}

fn charge_from_code(code: u8) -> i8 {
    match code {
        1 => 3,
        2 => 2,
        3 => 1,
        5 => -1,
        6 => -2,
        7 => -3,
        _ => 0,
    }
}

fn code_from_charge(charge: i8) -> u8 {
    match charge {
        3 => 1,
        2 => 2,
        1 => 3,
        -1 => 5,
        -2 => 6,
        -3 => 7,
        _ => 0,
    }
}

fn radical_from_code(code: u8) -> u8 {
    match code {
        2 => 1,
        1 | 3 => 2,
        _ => 0,
    }
}

fn code_from_radical(electrons: u8) -> u8 {
    match electrons {
        0 => 0,
        1 => 2,
        _ => 3,
    }
}

fn check_bond_atoms(bond: &CtabBond, count: usize) -> Result<(), MdlError> {
    for atom in [bond.begin, bond.end] {
        if atom >= count {
            return Err(MdlError::BadAtomReference {
                atom: atom + 1,
                count,
            });
        }
    }
    Ok(())
}

fn to_index(one_based: usize, line: usize) -> Result<usize, MdlError> {
    one_based.checked_sub(1).ok_or(MdlError::BadField {
        line,
        field: "atom index",
        value: "0".to_string(),
    })
}

/// Reads a V2000 molblock: three header lines, the counts line, the atom
/// and bond blocks and the property block up to `M  END`.
///
/// `first_line` is the 1-based position of `lines[0]` in the whole input
/// and only shows up in error messages.
pub(crate) fn read_v2000(lines: &[&str], first_line: usize) -> Result<Ctab, MdlError> {
    let counts = lines.get(3).ok_or(MdlError::TooShort { what: "molblock" })?;
    let counts_line = first_line + 3;
    let num_atoms: usize = parse_num(column(counts, 0, 3), counts_line, "atom count")?;
    let num_bonds: usize = parse_num(column(counts, 3, 6), counts_line, "bond count")?;

    let atom_start = 4;
    let bond_start = atom_start + num_atoms;
    if lines.len() < bond_start + num_bonds {
        return Err(MdlError::TooShort { what: "molblock" });
    }

    let mut ctab = Ctab::default();
    for (i, line) in lines[atom_start..bond_start].iter().enumerate() {
        let n = first_line + atom_start + i;
        let symbol = column(line, 31, 34);
        if symbol.is_empty() {
            return Err(MdlError::BadField {
                line: n,
                field: "atom symbol",
                value: String::new(),
            });
        }
        let charge_code: u8 = parse_opt(column(line, 36, 39), n, "charge")?;
        let map_num: u16 = parse_opt(column(line, 60, 63), n, "atom map")?;
        ctab.atoms.push(CtabAtom {
            symbol: symbol.to_string(),
            charge: charge_from_code(charge_code),
            map_num,
            ..Default::default()
        });
    }

    for (i, line) in lines[bond_start..bond_start + num_bonds].iter().enumerate() {
        let n = first_line + bond_start + i;
        let a: usize = parse_num(column(line, 0, 3), n, "bond atom")?;
        let b: usize = parse_num(column(line, 3, 6), n, "bond atom")?;
        let kind: u8 = parse_num(column(line, 6, 9), n, "bond type")?;
        let bond = CtabBond {
            begin: to_index(a, n)?,
            end: to_index(b, n)?,
            kind,
        };
        check_bond_atoms(&bond, num_atoms)?;
        ctab.bonds.push(bond);
    }

    let mut charges_reset = false;
    for (i, line) in lines[bond_start + num_bonds..].iter().enumerate() {
        let n = first_line + bond_start + num_bonds + i;
        if line.starts_with("M  END") {
            break;
        }
        let Some(tag) = line.get(3..6) else {
            continue;
        };
        if !matches!(tag, "CHG" | "ISO" | "RAD") {
            continue;
        }
        // Any CHG or RAD line supersedes the charges in the atom block.
        if tag != "ISO" && !charges_reset {
            for atom in &mut ctab.atoms {
                atom.charge = 0;
            }
            charges_reset = true;
        }
        for (atom, value) in property_pairs(line, n)? {
            let idx = to_index(atom, n)?;
            let count = ctab.atoms.len();
            let target = ctab
                .atoms
                .get_mut(idx)
                .ok_or(MdlError::BadAtomReference { atom, count })?;
            match tag {
                "CHG" => target.charge = value.clamp(i8::MIN as i32, i8::MAX as i32) as i8,
                "ISO" => target.isotope = value.clamp(0, u16::MAX as i32) as u16,
                _ => target.radical = radical_from_code(value.clamp(0, 3) as u8),
            }
        }
    }
    Ok(ctab)
}

/// `M  XXX  n aaa vvv ...` pairs.
fn property_pairs(line: &str, n: usize) -> Result<Vec<(usize, i32)>, MdlError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some(count) = parts.get(2) else {
        return Ok(Vec::new());
    };
    let count: usize = parse_num(count, n, "property count")?;
    let mut pairs = Vec::with_capacity(count);
    for i in 0..count {
        let (Some(atom), Some(value)) = (parts.get(3 + 2 * i), parts.get(4 + 2 * i)) else {
            break;
        };
        pairs.push((
            parse_num(atom, n, "property atom")?,
            parse_num(value, n, "property value")?,
        ));
    }
    Ok(pairs)
}

fn push_property_lines(out: &mut String, tag: &str, pairs: &[(usize, i32)]) {
    for chunk in pairs.chunks(8) {
        let _ = write!(out, "M  {tag}{:>3}", chunk.len());
        for (atom, value) in chunk {
            let _ = write!(out, " {:>3} {:>3}", atom, value);
        }
        out.push('\n');
    }
}

/// Writes a V2000 molblock with zeroed coordinates, ending in `M  END`.
pub(crate) fn write_v2000(ctab: &Ctab, name: &str) -> String {
    let mut out = String::new();
    push_header(&mut out, name);
    let _ = writeln!(
        out,
        "{:>3}{:>3}  0  0  0  0  0  0  0  0999 V2000",
        ctab.atoms.len(),
        ctab.bonds.len()
    );
    for atom in &ctab.atoms {
        let _ = writeln!(
            out,
            "{:>10.4}{:>10.4}{:>10.4} {:<3} 0{:>3}  0  0  0  0  0  0  0{:>3}  0  0",
            0.0,
            0.0,
            0.0,
            atom.symbol,
            code_from_charge(atom.charge),
            atom.map_num
        );
    }
    for bond in &ctab.bonds {
        let _ = writeln!(
            out,
            "{:>3}{:>3}{:>3}  0",
            bond.begin + 1,
            bond.end + 1,
            bond.kind
        );
    }

    push_property_lines(&mut out, "CHG", &nonzero(ctab, |a| a.charge as i32));
    push_property_lines(&mut out, "ISO", &nonzero(ctab, |a| a.isotope as i32));
    push_property_lines(
        &mut out,
        "RAD",
        &nonzero(ctab, |a| code_from_radical(a.radical) as i32),
    );
    out.push_str("M  END\n");
    out
}

/// 1-based atom numbers paired with a property value, zeros dropped.
fn nonzero(ctab: &Ctab, value: impl Fn(&CtabAtom) -> i32) -> Vec<(usize, i32)> {
    ctab.atoms
        .iter()
        .enumerate()
        .map(|(i, a)| (i + 1, value(a)))
        .filter(|&(_, v)| v != 0)
        .collect()
}

fn push_header(out: &mut String, name: &str) {
    out.push_str(name);
    out.push('\n');
    out.push_str("     molkit\n");
    out.push('\n');
}

fn v30_content(line: &str) -> Option<&str> {
    line.trim_start().strip_prefix("M  V30").map(str::trim)
}

/// Position of the `M  V30 <marker>` line, searching from `from`.
pub(crate) fn find_v30(lines: &[&str], from: usize, marker: &str) -> Option<usize> {
    lines
        .iter()
        .enumerate()
        .skip(from)
        .find(|(_, l)| v30_content(l) == Some(marker))
        .map(|(i, _)| i)
}

/// Reads the lines between `M  V30 BEGIN CTAB` and `M  V30 END CTAB`.
pub(crate) fn read_v3000(lines: &[&str], first_line: usize) -> Result<Ctab, MdlError> {
    let counts_pos = lines
        .iter()
        .position(|l| v30_content(l).is_some_and(|c| c.starts_with("COUNTS")))
        .ok_or(MdlError::Missing("V3000 COUNTS line"))?;
    let counts: Vec<&str> = v30_content(lines[counts_pos])
        .unwrap_or("")
        .split_whitespace()
        .collect();
    let counts_line = first_line + counts_pos;
    let num_atoms: usize = parse_num(
        counts.get(1).copied().unwrap_or(""),
        counts_line,
        "atom count",
    )?;
    let num_bonds: usize = parse_num(
        counts.get(2).copied().unwrap_or(""),
        counts_line,
        "bond count",
    )?;

    let mut ctab = Ctab::default();
    let begin = find_v30(lines, 0, "BEGIN ATOM").ok_or(MdlError::Missing("BEGIN ATOM"))?;
    let end = find_v30(lines, begin, "END ATOM").ok_or(MdlError::Missing("END ATOM"))?;
    for (i, line) in lines[begin + 1..end].iter().enumerate() {
        ctab.atoms
            .push(read_v3000_atom(line, first_line + begin + 1 + i)?);
    }
    if ctab.atoms.len() != num_atoms {
        return Err(MdlError::CountMismatch {
            what: "atoms",
            expected: num_atoms,
            found: ctab.atoms.len(),
        });
    }

    if let Some(begin) = find_v30(lines, end, "BEGIN BOND") {
        let end = find_v30(lines, begin, "END BOND").ok_or(MdlError::Missing("END BOND"))?;
        for (i, line) in lines[begin + 1..end].iter().enumerate() {
            let bond = read_v3000_bond(line, first_line + begin + 1 + i)?;
            check_bond_atoms(&bond, num_atoms)?;
            ctab.bonds.push(bond);
        }
    }
    if ctab.bonds.len() != num_bonds {
        return Err(MdlError::CountMismatch {
            what: "bonds",
            expected: num_bonds,
            found: ctab.bonds.len(),
        });
    }
    Ok(ctab)
}

/// `M  V30 idx symbol x y z aamap [KEY=value ...]`
fn read_v3000_atom(line: &str, n: usize) -> Result<CtabAtom, MdlError> {
    let parts: Vec<&str> = v30_content(line)
        .ok_or(MdlError::Missing("M  V30 prefix on atom line"))?
        .split_whitespace()
        .collect();
    if parts.len() < 6 {
        return Err(MdlError::BadField {
            line: n,
            field: "atom line",
            value: line.to_string(),
        });
    }
    let mut atom = CtabAtom::new(parts[1]);
    atom.map_num = parse_num(parts[5], n, "atom map")?;
    for part in &parts[6..] {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key {
            "CHG" => atom.charge = parse_num(value, n, "CHG")?,
            "MASS" => atom.isotope = parse_num(value, n, "MASS")?,
            "RAD" => atom.radical = radical_from_code(parse_num(value, n, "RAD")?),
            _ => {}
        }
    }
    Ok(atom)
}

/// `M  V30 idx type a1 a2 [KEY=value ...]`
fn read_v3000_bond(line: &str, n: usize) -> Result<CtabBond, MdlError> {
    let parts: Vec<&str> = v30_content(line)
        .ok_or(MdlError::Missing("M  V30 prefix on bond line"))?
        .split_whitespace()
        .collect();
    if parts.len() < 4 {
        return Err(MdlError::BadField {
            line: n,
            field: "bond line",
            value: line.to_string(),
        });
    }
    let a: usize = parse_num(parts[2], n, "bond atom")?;
    let b: usize = parse_num(parts[3], n, "bond atom")?;
    Ok(CtabBond {
        begin: to_index(a, n)?,
        end: to_index(b, n)?,
        kind: parse_num(parts[1], n, "bond type")?,
    })
}

/// Writes a `BEGIN CTAB` .. `END CTAB` section.
pub(crate) fn write_v3000(ctab: &Ctab, out: &mut String) {
    out.push_str("M  V30 BEGIN CTAB\n");
    let _ = writeln!(
        out,
        "M  V30 COUNTS {} {} 0 0 0",
        ctab.atoms.len(),
        ctab.bonds.len()
    );
    out.push_str("M  V30 BEGIN ATOM\n");
    for (i, atom) in ctab.atoms.iter().enumerate() {
        let _ = write!(out, "M  V30 {} {} 0 0 0 {}", i + 1, atom.symbol, atom.map_num);
        if atom.charge != 0 {
            let _ = write!(out, " CHG={}", atom.charge);
        }
        if atom.isotope != 0 {
            let _ = write!(out, " MASS={}", atom.isotope);
        }
        if atom.radical != 0 {
            let _ = write!(out, " RAD={}", code_from_radical(atom.radical));
        }
        out.push('\n');
    }
    out.push_str("M  V30 END ATOM\n");
    if !ctab.bonds.is_empty() {
        out.push_str("M  V30 BEGIN BOND\n");
        for (i, bond) in ctab.bonds.iter().enumerate() {
            let _ = writeln!(
                out,
                "M  V30 {} {} {} {}",
                i + 1,
                bond.kind,
                bond.begin + 1,
                bond.end + 1
            );
        }
        out.push_str("M  V30 END BOND\n");
    }
    out.push_str("M  V30 END CTAB\n");
}

/// A complete V3000 molblock around [`write_v3000`].
pub(crate) fn write_v3000_molblock(ctab: &Ctab, name: &str) -> String {
    let mut out = String::new();
    push_header(&mut out, name);
    out.push_str("  0  0  0     0  0            999 V3000\n");
    write_v3000(ctab, &mut out);
    out.push_str("M  END\n");
    out
}

pub(crate) fn is_v3000(block: &str) -> bool {
    block.lines().take(5).any(|l| l.contains("V3000")) || block.contains("M  V30 BEGIN CTAB")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ethanolate() -> Ctab {
        Ctab {
            atoms: vec![
                CtabAtom::new("C"),
                CtabAtom {
                    isotope: 13,
                    map_num: 2,
                    ..CtabAtom::new("C")
                },
                CtabAtom {
                    charge: -1,
                    ..CtabAtom::new("O")
                },
            ],
            bonds: vec![
                CtabBond {
                    begin: 0,
                    end: 1,
                    kind: 1,
                },
                CtabBond {
                    begin: 1,
                    end: 2,
                    kind: 1,
                },
            ],
        }
    }

    #[test]
    fn v2000_layout() {
        let block = write_v2000(&ethanolate(), "ethanolate");
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(lines[0], "ethanolate");
        assert_eq!(lines[3], "  3  2  0  0  0  0  0  0  0  0999 V2000");
        assert_eq!(column(lines[4], 31, 34), "C");
        assert_eq!(column(lines[5], 60, 63), "2");
        assert_eq!(column(lines[6], 36, 39), "5");
        assert_eq!(lines[7], "  1  2  1  0");
        assert!(block.contains("M  CHG  1   3  -1\n"));
        assert!(block.contains("M  ISO  1   2  13\n"));
        assert!(block.ends_with("M  END\n"));
    }

    #[test]
    fn v2000_reads_back() {
        let block = write_v2000(&ethanolate(), "");
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(read_v2000(&lines, 1).unwrap(), ethanolate());
    }

    #[test]
    fn old_style_charges_without_chg_lines() {
        let block = "\n\n\n  1  0  0  0  0  0  0  0  0  0999 V2000\n    0.0000    0.0000    0.0000 N   0  3  0  0  0  0  0  0  0  0  0  0\nM  END\n";
        let lines: Vec<&str> = block.lines().collect();
        let ctab = read_v2000(&lines, 1).unwrap();
        assert_eq!(ctab.atoms[0].charge, 1);
    }

    #[test]
    fn radicals() {
        let mut ctab = Ctab::default();
        ctab.atoms.push(CtabAtom {
            radical: 1,
            ..CtabAtom::new("C")
        });
        let block = write_v2000(&ctab, "");
        assert!(block.contains("M  RAD  1   1   2\n"));
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(read_v2000(&lines, 1).unwrap().atoms[0].radical, 1);
    }

    #[test]
    fn v2000_errors() {
        assert_eq!(
            read_v2000(&["", ""], 1),
            Err(MdlError::TooShort { what: "molblock" })
        );
        let block = "\n\n\n  1  1  0  0  0  0  0  0  0  0999 V2000\n    0.0000    0.0000    0.0000 C   0  0\n  1  2  1  0\nM  END\n";
        let lines: Vec<&str> = block.lines().collect();
        assert_eq!(
            read_v2000(&lines, 1),
            Err(MdlError::BadAtomReference { atom: 2, count: 1 })
        );
        let block = "\n\n\n  x  0\n";
        let lines: Vec<&str> = block.lines().collect();
        assert!(matches!(
            read_v2000(&lines, 1),
            Err(MdlError::BadField { line: 4, .. })
        ));
    }

    #[test]
    fn v3000_round_trip() {
        let mut out = String::new();
        write_v3000(&ethanolate(), &mut out);
        assert!(out.contains("M  V30 2 C 0 0 0 2 MASS=13\n"));
        assert!(out.contains("M  V30 3 O 0 0 0 0 CHG=-1\n"));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(read_v3000(&lines, 1).unwrap(), ethanolate());
    }

    #[test]
    fn v3000_count_mismatch() {
        let text = "M  V30 BEGIN CTAB\nM  V30 COUNTS 2 0 0 0 0\nM  V30 BEGIN ATOM\nM  V30 1 C 0 0 0 0\nM  V30 END ATOM\nM  V30 END CTAB\n";
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            read_v3000(&lines, 1),
            Err(MdlError::CountMismatch {
                what: "atoms",
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn version_detection() {
        assert!(is_v3000(&write_v3000_molblock(&ethanolate(), "")));
        assert!(!is_v3000(&write_v2000(&ethanolate(), "")));
    }
}
