//! Topological polar surface area from per-atom nitrogen and oxygen
//! contributions (Ertl, Rohde and Selzer, 2000).

use petgraph::graph::NodeIndex;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;

/// Bonding environment of one polar atom. Hydrogen neighbors in the graph
/// count as attached hydrogens, not neighbors.
#[derive(Debug, Default)]
struct Environment {
    neighbors: i32,
    hs: i32,
    charge: i8,
    single: u8,
    double: u8,
    triple: u8,
    aromatic: u8,
    in_3_ring: bool,
}

impl Environment {
    fn of(mol: &Mol<Atom, Bond>, info: &RingInfo, idx: NodeIndex) -> Self {
        let atom = mol.atom(idx);
        let mut env = Environment {
            hs: atom.total_h() as i32,
            charge: atom.formal_charge,
            in_3_ring: info.atom_rings(idx).iter().any(|r| r.len() == 3),
            ..Default::default()
        };
        for e in mol.bonds_of(idx) {
            let Some(nb) = mol.other_atom(e, idx) else {
                continue;
            };
            if mol.atom(nb).atomic_num == 1 {
                env.hs += 1;
                continue;
            }
            env.neighbors += 1;
            let bond = mol.bond(e);
            if bond.is_aromatic {
                env.aromatic += 1;
            } else {
                match bond.order {
                    BondOrder::Single => env.single += 1,
                    BondOrder::Double => env.double += 1,
                    BondOrder::Triple => env.triple += 1,
                    BondOrder::Aromatic => env.aromatic += 1,
                }
            }
        }
        env
    }
}

fn nitrogen(env: &Environment) -> Option<f64> {
    let Environment {
        hs,
        charge,
        single: s,
        double: d,
        triple: t,
        aromatic: a,
        ..
    } = *env;
    let v = match (env.neighbors, hs, charge) {
        (1, 0, 0) if t == 1 => 23.79,
        (1, 1, 0) if d == 1 => 23.85,
        (1, 2, 0) if s == 1 => 26.02,
        (1, 2, 1) if d == 1 => 25.59,
        (1, 3, 1) if s == 1 => 27.64,
        (2, 0, 0) if s == 1 && d == 1 => 12.36,
        (2, 0, 0) if t == 1 && d == 1 => 13.60,
        (2, 1, 0) if s == 2 => {
            if env.in_3_ring {
                21.94
            } else {
                12.03
            }
        }
        (2, 0, 1) if t == 1 && s == 1 => 4.36,
        (2, 0, 1) if d == 2 => 13.97,
        (2, 2, 1) if s == 2 => 16.61,
        (2, 0, 0) if a == 2 => 12.89,
        (2, 1, 0) if a == 2 => 15.79,
        (2, 1, 1) if a == 2 => 14.14,
        (3, 0, 0) if s == 3 => {
            if env.in_3_ring {
                3.01
            } else {
                3.24
            }
        }
        (3, 0, 0) if s == 1 && d == 2 => 11.68,
        (3, 0, 1) if s == 2 && d == 1 => 3.01,
        (3, 1, 1) if s == 3 => 4.44,
        (3, 0, 0) if a == 3 => 4.41,
        (3, 0, 0) if s == 1 && a == 2 => 4.93,
        (3, 0, 0) if d == 1 && a == 2 => 8.39,
        (3, 0, 1) if a == 3 => 4.10,
        (3, 0, 1) if s == 1 && a == 2 => 3.88,
        (4, 0, 1) if s == 4 => 0.0,
        _ => return None,
    };
    Some(v)
}

fn oxygen(env: &Environment) -> Option<f64> {
    let v = match (env.neighbors, env.hs, env.charge) {
        (1, 0, 0) if env.double == 1 => 17.07,
        (1, 1, 0) if env.single == 1 => 20.23,
        (1, 0, -1) if env.single == 1 => 23.06,
        (2, 0, 0) if env.single == 2 => {
            if env.in_3_ring {
                12.53
            } else {
                9.23
            }
        }
        (2, 0, 0) if env.aromatic == 2 => 13.14,
        _ => return None,
    };
    Some(v)
}

/// Contribution of each atom, zero for atoms other than N and O.
/// Environments outside the fitted table fall back to a linear estimate in
/// the neighbor and hydrogen counts.
pub fn tpsa_contribs(mol: &Mol<Atom, Bond>) -> Vec<f64> {
    let info = RingInfo::sssr(mol);
    mol.atoms()
        .map(|idx| {
            let (table, base, per_neighbor) = match mol.atom(idx).atomic_num {
                7 => (nitrogen as fn(&Environment) -> Option<f64>, 30.5, 8.2),
                8 => (oxygen as fn(&Environment) -> Option<f64>, 28.5, 8.6),
                _ => return 0.0,
            };
            let env = Environment::of(mol, &info, idx);
            table(&env).unwrap_or_else(|| {
                (base - per_neighbor * env.neighbors as f64 + 1.5 * env.hs as f64).max(0.0)
            })
        })
        .collect()
}

pub fn tpsa(mol: &Mol<Atom, Bond>) -> f64 {
    tpsa_contribs(mol).iter().sum()
}
