//! Wildman-Crippen atomic logP contributions.
//!
//! Heavy atoms are typed by the first pattern in [`HEAVY_TYPES`] whose
//! first atom lands on them. Hydrogens, attached or in the graph, are typed
//! from their parent atom.

use lazy_static::lazy_static;
use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::atom::Atom;
use crate::bond::{Bond, BondOrder};
use crate::mol::Mol;
use crate::rings::RingInfo;
use crate::smarts::{anchor_atoms, AtomExpr, BondExpr};

use super::constitutional::total_hs;
use super::pattern;

/// `(type, pattern, logP contribution)`, in matching order.
const HEAVY_TYPES: &[(&str, &str, f64)] = &[
    ("C1", "[CH4]", 0.1441),
    ("C1", "[CH3]C", 0.1441),
    ("C1", "[CH2](C)C", 0.1441),
    ("C2", "[CH](C)(C)C", 0.0),
    ("C2", "[C](C)(C)(C)C", 0.0),
    ("C3", "[CH3][N,O,P,S,F,Cl,Br,I]", -0.2035),
    ("C3", "[CH2X4]([N,O,P,S,F,Cl,Br,I])[A;!#1]", -0.2035),
    ("C4", "[CH1X4]([N,O,P,S,F,Cl,Br,I])([A;!#1])[A;!#1]", -0.2051),
    ("C4", "[CH0X4]([N,O,P,S,F,Cl,Br,I])([A;!#1])([A;!#1])[A;!#1]", -0.2051),
    ("C5", "[C]=[!C;A;!#1]", -0.2783),
    ("C6", "[CH2]=C", 0.1551),
    ("C6", "[CH1](=C)[A;!#1]", 0.1551),
    ("C6", "[CH0](=C)([A;!#1])[A;!#1]", 0.1551),
    ("C6", "[C](=C)=C", 0.1551),
    ("C7", "[CX2]#[A;!#1]", 0.0017),
    ("C8", "[CH3]c", 0.08452),
    ("C9", "[CH3]a", -0.1444),
    ("C10", "[CH2X4]a", -0.0516),
    ("C11", "[CHX4]a", 0.1193),
    ("C12", "[CH0X4]a", -0.0967),
    ("C13", "[cH0]-[A;!C;!N;!O;!S;!F;!Cl;!Br;!I;!#1]", -0.5443),
    ("C14", "[c][#9]", 0.0),
    ("C15", "[c][#17]", 0.245),
    ("C16", "[c][#35]", 0.198),
    ("C17", "[c][#53]", 0.0),
    ("C18", "[cH]", 0.1581),
    ("C19", "[c](:a)(:a):a", 0.2955),
    ("C20", "[c](:a)(:a)-a", 0.2713),
    ("C21", "[c](:a)(:a)-C", 0.136),
    ("C22", "[c](:a)(:a)-N", 0.4619),
    ("C23", "[c](:a)(:a)-O", 0.5437),
    ("C24", "[c](:a)(:a)-S", 0.1893),
    ("C25", "[c](:a)(:a)=[C,N,O]", -0.8186),
    ("C26", "[C](=C)(a)[A;!#1]", 0.264),
    ("C26", "[C](=C)(c)a", 0.264),
    ("C26", "[CH1](=C)a", 0.264),
    ("C26", "[C]=c", 0.264),
    ("C27", "[CX4][A;!C;!N;!O;!P;!S;!F;!Cl;!Br;!I;!#1]", 0.2148),
    ("CS", "[#6]", 0.08129),
    ("N1", "[NH2+0][A;!#1]", -1.019),
    ("N2", "[NH+0]([A;!#1])[A;!#1]", -0.7096),
    ("N3", "[NH2+0]a", -1.027),
    ("N4", "[NH1+0]([!#1;A,a])a", -0.5188),
    ("N5", "[NH+0]=[!#1;A,a]", 0.08387),
    ("N6", "[N+0](=[!#1;A,a])[!#1;A,a]", 0.1836),
    ("N7", "[N+0]([A;!#1])([A;!#1])[A;!#1]", -0.3187),
    ("N8", "[N+0](a)([!#1;A,a])[A;!#1]", -0.4458),
    ("N8", "[N+0](a)(a)a", -0.4458),
    ("N9", "[N+0]#[A;!#1]", 0.01508),
    ("N10", "[NH3,NH2,NH;+,+2,+3]", -1.95),
    ("N11", "[n+0]", -0.3239),
    ("N12", "[n;+,+2,+3]", -1.119),
    ("N13", "[NH0;+,+2,+3]([A;!#1])([A;!#1])([A;!#1])[A;!#1]", -0.3396),
    ("N13", "[NH0;+,+2,+3](=[A])([A;!#1])[!#1]", -0.3396),
    ("N13", "[NH0;+,+2,+3](=[#6])=[#7]", -0.3396),
    ("N13", "[N;+,+2,+3]#[A]", -0.3396),
    ("N13", "[N;-,-2,-3]", -0.3396),
    ("N14", "[N;+,+2,+3](=[N;-,-2,-3])=N", 0.2887),
    ("NS", "[#7]", -0.4806),
    ("O1", "[o]", 0.1552),
    ("O2", "[OH,OH2]", -0.2893),
    ("O3", "[O]([A;!#1])[A;!#1]", -0.0684),
    ("O4", "[O](a)[A;!#1]", -0.4195),
    ("O4", "[O](a)a", -0.4195),
    ("O5", "[O]=[#7,#8]", 0.0335),
    ("O5", "[OX1;-;$([OX1;-][#7])]", 0.0335),
    ("O6", "[OX1;-;$([OX1;-][#16])]", -0.3339),
    ("O12", "[O-1]C(=O)", -1.326),
    ("O7", "[OX1;-]", -1.189),
    ("O8", "[O]=c", 0.1788),
    ("O9", "[O]=[CH]C", -0.1526),
    ("O9", "O=C(C)[A;!#1]", -0.1526),
    ("O9", "[O]=[CH2]", -0.1526),
    ("O9", "[O]=[CX2]=O", -0.1526),
    ("O10", "[O]=[CH]c", 0.1129),
    ("O10", "[O]=C([C,c])[a;!#1]", 0.1129),
    ("O10", "[O]=C(c)[A;!#1]", 0.1129),
    ("O11", "[O]=C([!#1;!#6])[!#1;!#6]", 0.4833),
    ("OS", "[#8]", -0.1188),
    ("F", "[#9;+0]", 0.4202),
    ("Cl", "[#17;+0]", 0.6895),
    ("Br", "[#35;+0]", 0.8456),
    ("I", "[#53;+0]", 0.8857),
    ("Hal", "[#9,#17,#35,#53;-]", -2.996),
    ("Hal", "[#53;+,+2,+3]", -2.996),
    ("Hal", "[+;#3,#11,#19,#37,#55]", -2.996),
    ("P", "[#15]", 0.8612),
    ("S1", "[S;+0]", 0.6482),
    ("S2", "[S;!+0]", -0.0024),
    ("S3", "[s]", 0.6237),
    ("Me1", "[#3,#11,#19,#37,#55]", -0.3808),
    (
        "Me2",
        "[#4,#12,#13,#20,#21,#22,#23,#24,#25,#26,#27,#28,#29,#30,#31,#38,#47,#48,#49,#50,#56,#78,#79,#80,#81,#82]",
        -0.0025,
    ),
];

const H1: f64 = 0.123;
const H2: f64 = -0.2677;
const H3: f64 = 0.2142;
const H4: f64 = 0.298;
const HS: f64 = 0.1125;

lazy_static! {
    static ref HEAVY_PATTERNS: Vec<(&'static str, Mol<AtomExpr, BondExpr>, f64)> = HEAVY_TYPES
        .iter()
        .map(|&(label, smarts, value)| (label, pattern(smarts), value))
        .collect();
}

/// Type label and contribution of every heavy atom; `None` for graph
/// hydrogens and atoms no pattern covers.
fn heavy_types(mol: &Mol<Atom, Bond>) -> Vec<Option<(&'static str, f64)>> {
    let info = RingInfo::sssr(mol);
    let mut types = vec![None; mol.atom_count()];
    let mut remaining = mol
        .atoms()
        .filter(|&i| mol.atom(i).atomic_num != 1)
        .count();
    for (label, query, value) in HEAVY_PATTERNS.iter() {
        if remaining == 0 {
            break;
        }
        for idx in anchor_atoms(mol, &info, query) {
            let slot = &mut types[idx.index()];
            if slot.is_none() && mol.atom(idx).atomic_num != 1 {
                *slot = Some((*label, *value));
                remaining -= 1;
            }
        }
    }
    types
}

fn is_cx4(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> bool {
    let atom = mol.atom(idx);
    atom.atomic_num == 6 && !atom.is_aromatic && mol.degree(idx) + atom.total_h() as usize == 4
}

/// Double bond from `idx` to C, N, O or S.
fn has_hetero_double(mol: &Mol<Atom, Bond>, idx: NodeIndex) -> bool {
    mol.bonds_of(idx).any(|e| {
        let bond = mol.bond(e);
        bond.order == BondOrder::Double
            && !bond.is_aromatic
            && mol
                .other_atom(e, idx)
                .is_some_and(|nb| matches!(mol.atom(nb).atomic_num, 6 | 7 | 8 | 16))
    })
}

/// Contribution of one hydrogen bonded to `parent`.
fn hydrogen_contrib(mol: &Mol<Atom, Bond>, parent: NodeIndex) -> f64 {
    match mol.atom(parent).atomic_num {
        1 | 6 => H1,
        7 => H3,
        8 => {
            // one of the oxygen's hydrogens is the one being typed
            if total_hs(mol, parent) > 1 {
                return H2;
            }
            let heavy: Vec<_> = mol
                .neighbors(parent)
                .filter(|&n| mol.atom(n).atomic_num != 1)
                .collect();
            let alcohol = heavy.iter().any(|&n| {
                let nb = mol.atom(n);
                is_cx4(mol, n)
                    || (nb.atomic_num == 6 && nb.is_aromatic)
                    || !matches!(nb.atomic_num, 6 | 7 | 8 | 16)
            });
            if alcohol {
                H2
            } else if heavy.iter().any(|&n| mol.atom(n).atomic_num == 7) {
                H3
            } else if heavy.iter().any(|&n| {
                let num = mol.atom(n).atomic_num;
                matches!(num, 8 | 16) || (num == 6 && has_hetero_double(mol, n))
            }) {
                H4
            } else {
                HS
            }
        }
        _ => H2,
    }
}

/// Per-atom logP contributions, each heavy atom carrying its attached
/// hydrogens. Graph hydrogens carry their own.
pub fn crippen_contribs(mol: &Mol<Atom, Bond>) -> Vec<f64> {
    let types = heavy_types(mol);
    mol.atoms()
        .map(|idx| {
            let atom = mol.atom(idx);
            if atom.atomic_num == 1 {
                return match mol.neighbors(idx).next() {
                    Some(parent) => hydrogen_contrib(mol, parent),
                    None => HS,
                };
            }
            let heavy = match types[idx.index()] {
                Some((_, value)) => value,
                None => {
                    debug!(
                        "no logP type for {} at atom {}",
                        atom.symbol(),
                        idx.index()
                    );
                    0.0
                }
            };
            heavy + atom.total_h() as f64 * hydrogen_contrib(mol, idx)
        })
        .collect()
}

/// Wildman-Crippen logP.
pub fn clogp(mol: &Mol<Atom, Bond>) -> f64 {
    crippen_contribs(mol).iter().sum()
}
