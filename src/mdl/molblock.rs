use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::element::Element;
use crate::mol::Mol;
use crate::sanitize::sanitize;
use crate::smiles::fold_explicit_hydrogens;

use super::ctab::{self, Ctab, CtabAtom, CtabBond};
use super::error::MdlError;

fn mol_to_ctab(mol: &Mol<Atom, Bond>) -> Ctab {
    let atoms = mol
        .atoms()
        .map(|idx| {
            let atom = mol.atom(idx);
            CtabAtom {
                symbol: atom.symbol().to_string(),
                charge: atom.formal_charge,
                isotope: atom.isotope,
                radical: atom.radical_electrons,
                map_num: atom.map_num,
            }
        })
        .collect();
    let bonds = mol
        .bonds()
        .filter_map(|e| {
            let (a, b) = mol.bond_endpoints(e)?;
            let kind = match mol.bond(e).order {
                BondOrder::Single => 1,
                BondOrder::Double => 2,
                BondOrder::Triple => 3,
                BondOrder::Aromatic => 4,
            };
            Some(CtabBond {
                begin: a.index(),
                end: b.index(),
                kind,
            })
        })
        .collect();
    Ctab { atoms, bonds }
}

fn ctab_to_mol(ctab: &Ctab, first_line: usize) -> Result<Mol<Atom, Bond>, MdlError> {
    let mut mol = Mol::new();
    for (i, a) in ctab.atoms.iter().enumerate() {
        let atomic_num = match a.symbol.as_str() {
            "*" | "R" | "R#" | "A" | "Q" => 0,
            "D" | "T" => 1,
            symbol => Element::from_symbol(symbol)
                .ok_or_else(|| MdlError::UnknownElement {
                    line: first_line + 4 + i,
                    symbol: symbol.to_string(),
                })?
                .atomic_num(),
        };
        let isotope = match (a.symbol.as_str(), a.isotope) {
            ("D", 0) => 2,
            ("T", 0) => 3,
            (_, iso) => iso,
        };
        mol.add_atom(Atom {
            formal_charge: a.charge,
            isotope,
            radical_electrons: a.radical,
            map_num: a.map_num,
            ..Atom::new(atomic_num)
        });
    }
    for (i, b) in ctab.bonds.iter().enumerate() {
        let order = match b.kind {
            1 => BondOrder::Single,
            2 => BondOrder::Double,
            3 => BondOrder::Triple,
            4 => BondOrder::Aromatic,
            other => {
                return Err(MdlError::BadField {
                    line: first_line + 4 + ctab.atoms.len() + i,
                    field: "bond type",
                    value: other.to_string(),
                })
            }
        };
        let bond = Bond::new(order);
        if order == BondOrder::Aromatic {
            for end in [b.begin, b.end] {
                mol.atom_mut(NodeIndex::new(end)).is_aromatic = true;
            }
        }
        mol.add_bond(NodeIndex::new(b.begin), NodeIndex::new(b.end), bond);
    }
    Ok(mol)
}

/// Writes a V2000 molblock. Coordinates are zero and bonds are written in
/// their Kekulé form.
///
/// ```
/// let mol = molkit::smiles::from_smiles("CC[O-]").unwrap();
/// let block = molkit::mdl::to_molblock(&mol);
/// assert!(block.contains("M  CHG  1   3  -1"));
/// ```
pub fn to_molblock(mol: &Mol<Atom, Bond>) -> String {
    ctab::write_v2000(&mol_to_ctab(mol), "")
}

/// Same as [`to_molblock`] in V3000 layout.
pub fn to_molblock_v3000(mol: &Mol<Atom, Bond>) -> String {
    ctab::write_v3000_molblock(&mol_to_ctab(mol), "")
}

/// Reads a V2000 or V3000 molblock and sanitizes the result. Hydrogen
/// atoms without a label are folded into their neighbors.
pub fn from_molblock(block: &str) -> Result<Mol<Atom, Bond>, MdlError> {
    let mut mol = from_molblock_unsanitized(block)?;
    sanitize(&mut mol)?;
    Ok(mol)
}

/// Reads a molblock without sanitizing. Aromatic (type 4) bonds stay
/// unresolved and implicit hydrogens are not assigned.
pub fn from_molblock_unsanitized(block: &str) -> Result<Mol<Atom, Bond>, MdlError> {
    let lines: Vec<&str> = block.lines().collect();
    let ctab = if ctab::is_v3000(block) {
        let begin = ctab::find_v30(&lines, 0, "BEGIN CTAB").ok_or(MdlError::Missing("BEGIN CTAB"))?;
        let end = ctab::find_v30(&lines, begin, "END CTAB").ok_or(MdlError::Missing("END CTAB"))?;
        ctab::read_v3000(&lines[begin..=end], begin + 1)?
    } else {
        ctab::read_v2000(&lines, 1)?
    };
    let mut mol = ctab_to_mol(&ctab, 1)?;
    fold_explicit_hydrogens(&mut mol);
    Ok(mol)
}
