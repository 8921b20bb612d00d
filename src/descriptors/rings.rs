//! Ring counts by aromaticity, saturation and composition.

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Aromatic,
    Aliphatic,
    Saturated,
}

fn count(mol: &Mol<Atom, Bond>, kind: Kind, carbo: Option<bool>) -> usize {
    let info = RingInfo::sssr(mol);
    info.rings()
        .iter()
        .zip(info.bond_rings())
        .filter(|(atoms, bonds)| {
            let is_kind = match kind {
                Kind::Aromatic => bonds.iter().all(|&e| mol.bond(e).is_aromatic),
                Kind::Aliphatic => bonds.iter().any(|&e| !mol.bond(e).is_aromatic),
                Kind::Saturated => bonds.iter().all(|&e| {
                    let bond = mol.bond(e);
                    bond.order == BondOrder::Single && !bond.is_aromatic
                }),
            };
            let all_carbon = atoms.iter().all(|&a| mol.atom(a).atomic_num == 6);
            is_kind && carbo.map_or(true, |c| c == all_carbon)
        })
        .count()
}

pub fn n_rings(mol: &Mol<Atom, Bond>) -> usize {
    RingInfo::sssr(mol).num_rings()
}

pub fn n_aromatic_rings(mol: &Mol<Atom, Bond>) -> usize {
    count(mol, Kind::Aromatic, None)
}

pub fn n_aromatic_carbocycles(mol: &Mol<Atom, Bond>) -> usize {
    count(mol, Kind::Aromatic, Some(true))
}

pub fn n_aromatic_heterocycles(mol: &Mol<Atom, Bond>) -> usize {
    count(mol, Kind::Aromatic, Some(false))
}

/// Rings with at least one non-aromatic bond.
pub fn n_aliphatic_rings(mol: &Mol<Atom, Bond>) -> usize {
    count(mol, Kind::Aliphatic, None)
}

pub fn n_aliphatic_carbocycles(mol: &Mol<Atom, Bond>) -> usize {
    count(mol, Kind::Aliphatic, Some(true))
}

pub fn n_aliphatic_heterocycles(mol: &Mol<Atom, Bond>) -> usize {
    count(mol, Kind::Aliphatic, Some(false))
}

/// Rings made only of non-aromatic single bonds.
pub fn n_saturated_rings(mol: &Mol<Atom, Bond>) -> usize {
    count(mol, Kind::Saturated, None)
}

pub fn n_saturated_carbocycles(mol: &Mol<Atom, Bond>) -> usize {
    count(mol, Kind::Saturated, Some(true))
}

pub fn n_saturated_heterocycles(mol: &Mol<Atom, Bond>) -> usize {
    count(mol, Kind::Saturated, Some(false))
}
