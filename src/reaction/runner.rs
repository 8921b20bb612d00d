use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::NodeIndex;
use tracing::debug;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::{AtomId, Mol, TetrahedralStereo};
use crate::smarts::{get_substruct_matches, AtomExpr, BondExpr};
use crate::substruct::AtomMapping;
use crate::valence::{assign_implicit_hs, explicit_valence};

use super::error::ReactionError;
use super::ChemicalReaction;

pub const MAX_COMBINATIONS: usize = 1000;

/// Where a product atom came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Origin {
    Reactant { reactant: usize, atom: NodeIndex },
    Template(NodeIndex),
}

impl ChemicalReaction {
    /// Applies the reaction to one molecule per reactant template.
    ///
    /// Returns one product group per combination of template matches, first
    /// template outermost. Each group holds one unsanitized molecule per
    /// product template. No match for some template gives an empty result.
    pub fn run(
        &self,
        reactants: &[&Mol<Atom, Bond>],
    ) -> Result<Vec<Vec<Mol<Atom, Bond>>>, ReactionError> {
        if reactants.len() != self.num_reactant_templates() {
            return Err(ReactionError::WrongReactantCount {
                expected: self.num_reactant_templates(),
                got: reactants.len(),
            });
        }
        check_reactant_maps(self.reactant_templates())?;

        let per_template: Vec<Vec<AtomMapping>> = self
            .reactant_templates()
            .iter()
            .zip(reactants)
            .map(|(tmpl, mol)| get_substruct_matches(mol, tmpl))
            .collect();
        debug!(
            matches = ?per_template.iter().map(Vec::len).collect::<Vec<_>>(),
            "matched reactant templates"
        );
        if per_template.iter().any(Vec::is_empty) {
            return Ok(Vec::new());
        }

        let combinations = cartesian_product(&per_template, MAX_COMBINATIONS)?;
        debug!(combinations = combinations.len(), "building products");

        Ok(combinations
            .iter()
            .map(|combo| {
                let builder = ProductBuilder::new(self, reactants, combo);
                self.product_templates()
                    .iter()
                    .map(|tmpl| builder.build(tmpl))
                    .collect()
            })
            .collect())
    }
}

fn check_reactant_maps(templates: &[Mol<AtomExpr, BondExpr>]) -> Result<(), ReactionError> {
    let mut seen = HashSet::new();
    for tmpl in templates {
        for idx in tmpl.atoms() {
            if let Some(map_num) = mapped(tmpl.atom(idx)) {
                if !seen.insert(map_num) {
                    return Err(ReactionError::DuplicateAtomMap { map_num });
                }
            }
        }
    }
    Ok(())
}

/// Nonzero atom map number of a template atom.
pub(crate) fn mapped(expr: &AtomExpr) -> Option<u16> {
    expr.map_num().filter(|&n| n != 0)
}

fn map_pair(a: u16, b: u16) -> (u16, u16) {
    (a.min(b), a.max(b))
}

fn mapped_bond_pairs(tmpl: &Mol<AtomExpr, BondExpr>) -> HashMap<(u16, u16), &BondExpr> {
    let mut pairs = HashMap::new();
    for edge in tmpl.bonds() {
        if let Some((a, b)) = tmpl.bond_endpoints(edge) {
            if let (Some(ma), Some(mb)) = (mapped(tmpl.atom(a)), mapped(tmpl.atom(b))) {
                pairs.insert(map_pair(ma, mb), tmpl.bond(edge));
            }
        }
    }
    pairs
}

/// Per-combination state shared by every product template.
struct ProductBuilder<'a> {
    reactants: &'a [&'a Mol<Atom, Bond>],
    /// map number -> (reactant, target atom)
    mapped_atoms: HashMap<u16, (usize, NodeIndex)>,
    /// reverse of `mapped_atoms`, per reactant
    atom_maps: Vec<HashMap<NodeIndex, u16>>,
    /// target atoms covered by each reactant's match
    matched: Vec<HashSet<NodeIndex>>,
    reactant_bonds: HashSet<(u16, u16)>,
}

impl<'a> ProductBuilder<'a> {
    fn new(
        rxn: &ChemicalReaction,
        reactants: &'a [&'a Mol<Atom, Bond>],
        combo: &[&AtomMapping],
    ) -> Self {
        let mut mapped_atoms = HashMap::new();
        let mut atom_maps = vec![HashMap::new(); reactants.len()];
        let mut matched = vec![HashSet::new(); reactants.len()];
        let mut reactant_bonds = HashSet::new();
        for (ri, (tmpl, mapping)) in rxn.reactant_templates().iter().zip(combo).enumerate() {
            for &(q, t) in mapping.iter() {
                matched[ri].insert(t);
                if let Some(map_num) = mapped(tmpl.atom(q)) {
                    mapped_atoms.insert(map_num, (ri, t));
                    atom_maps[ri].insert(t, map_num);
                }
            }
            reactant_bonds.extend(mapped_bond_pairs(tmpl).into_keys());
        }
        Self {
            reactants,
            mapped_atoms,
            atom_maps,
            matched,
            reactant_bonds,
        }
    }

    fn build(&self, tmpl: &Mol<AtomExpr, BondExpr>) -> Mol<Atom, Bond> {
        let mut product = Mol::new();
        let mut placed: HashMap<Origin, NodeIndex> = HashMap::new();
        let mut h_spec = HashSet::new();

        for p_idx in tmpl.atoms() {
            let expr = tmpl.atom(p_idx);
            let source = mapped(expr).and_then(|m| self.mapped_atoms.get(&m).copied());
            let (origin, mut atom) = match source {
                Some((ri, t)) => (
                    Origin::Reactant { reactant: ri, atom: t },
                    self.reactants[ri].atom(t).clone(),
                ),
                None => (Origin::Template(p_idx), Atom::default()),
            };
            if apply_template(&mut atom, expr) {
                h_spec.insert(p_idx);
            }
            placed.insert(origin, product.add_atom(atom));
        }

        let product_bonds = mapped_bond_pairs(tmpl);
        for edge in tmpl.bonds() {
            let Some((a, b)) = tmpl.bond_endpoints(edge) else {
                continue;
            };
            let bond = self.template_bond(tmpl, a, b, tmpl.bond(edge));
            let pa = placed[&self.origin_of(tmpl, a)];
            let pb = placed[&self.origin_of(tmpl, b)];
            if product.bond_between(pa, pb).is_none() {
                product.add_bond(pa, pb, bond);
            }
        }

        // Reactant bonds between mapped atoms that the templates say nothing
        // about, then everything hanging off the mapped atoms.
        let mut queue = VecDeque::new();
        for p_idx in tmpl.atoms() {
            let Origin::Reactant { reactant: ri, atom: t } = self.origin_of(tmpl, p_idx) else {
                continue;
            };
            let Some(map_num) = mapped(tmpl.atom(p_idx)) else {
                continue;
            };
            let mol = self.reactants[ri];
            let here = placed[&Origin::Reactant {
                reactant: ri,
                atom: t,
            }];
            for nb in mol.neighbors(t) {
                if self.matched[ri].contains(&nb) {
                    let Some(&nb_map) = self.atom_maps[ri].get(&nb) else {
                        continue;
                    };
                    let pair = map_pair(map_num, nb_map);
                    if self.reactant_bonds.contains(&pair) || product_bonds.contains_key(&pair) {
                        continue;
                    }
                    let nb_origin = Origin::Reactant { reactant: ri, atom: nb };
                    if let (Some(&there), Some(e)) = (placed.get(&nb_origin), mol.bond_between(t, nb))
                    {
                        if product.bond_between(here, there).is_none() {
                            product.add_bond(here, there, *mol.bond(e));
                        }
                    }
                    continue;
                }
                queue.push_back((ri, t, nb));
            }
        }
        while let Some((ri, from, to)) = queue.pop_front() {
            let mol = self.reactants[ri];
            let from_p = placed[&Origin::Reactant { reactant: ri, atom: from }];
            let to_origin = Origin::Reactant { reactant: ri, atom: to };
            let to_p = match placed.get(&to_origin) {
                Some(&p) => p,
                None => {
                    let p = product.add_atom(mol.atom(to).clone());
                    placed.insert(to_origin, p);
                    for nb in mol.neighbors(to) {
                        if !self.matched[ri].contains(&nb) {
                            queue.push_back((ri, to, nb));
                        }
                    }
                    p
                }
            };
            if let Some(e) = mol.bond_between(from, to) {
                if product.bond_between(from_p, to_p).is_none() {
                    product.add_bond(from_p, to_p, *mol.bond(e));
                }
            }
        }

        self.adjust_hydrogens(&mut product, tmpl, &placed, &h_spec);
        product.set_tetrahedral_stereo(self.carried_stereo(&product, &placed));
        assign_implicit_hs(&mut product);
        product
    }

    fn origin_of(&self, tmpl: &Mol<AtomExpr, BondExpr>, p_idx: NodeIndex) -> Origin {
        mapped(tmpl.atom(p_idx))
            .and_then(|m| self.mapped_atoms.get(&m))
            .map_or(Origin::Template(p_idx), |&(ri, t)| Origin::Reactant {
                reactant: ri,
                atom: t,
            })
    }

    /// Bond for a product-template edge: the template's own bond type where
    /// it names one, otherwise the reactant bond it keeps, otherwise single.
    fn template_bond(
        &self,
        tmpl: &Mol<AtomExpr, BondExpr>,
        a: NodeIndex,
        b: NodeIndex,
        expr: &BondExpr,
    ) -> Bond {
        let existing = match (self.origin_of(tmpl, a), self.origin_of(tmpl, b)) {
            (
                Origin::Reactant { reactant: ra, atom: ta },
                Origin::Reactant { reactant: rb, atom: tb },
            ) if ra == rb => {
                let mol = self.reactants[ra];
                mol.bond_between(ta, tb).map(|e| *mol.bond(e))
            }
            _ => None,
        };
        match (expr.explicit_bond(), existing) {
            (Some(wanted), Some(kept)) if wanted.is_aromatic && kept.is_aromatic => kept,
            (Some(wanted), _) => wanted,
            (None, Some(kept)) => kept,
            (None, None) => Bond::single(),
        }
    }

    /// Bracket atoms keep their written hydrogens minus the bonds they gained;
    /// other atoms have theirs recomputed from valence.
    fn adjust_hydrogens(
        &self,
        product: &mut Mol<Atom, Bond>,
        tmpl: &Mol<AtomExpr, BondExpr>,
        placed: &HashMap<Origin, NodeIndex>,
        h_spec: &HashSet<NodeIndex>,
    ) {
        for p_idx in tmpl.atoms() {
            let origin = self.origin_of(tmpl, p_idx);
            let node = placed[&origin];
            if h_spec.contains(&p_idx) {
                continue;
            }
            let Origin::Reactant { reactant: ri, atom: t } = origin else {
                continue;
            };
            if !product.atom(node).no_implicit {
                continue;
            }
            let before = explicit_valence(self.reactants[ri], t);
            let after = explicit_valence(product, node);
            if after > before {
                let atom = product.atom_mut(node);
                atom.explicit_h = atom.explicit_h.saturating_sub(after - before);
            }
        }
    }

    /// Reactant stereocenters whose four slots all survive around the same
    /// neighbors in the product.
    fn carried_stereo(
        &self,
        product: &Mol<Atom, Bond>,
        placed: &HashMap<Origin, NodeIndex>,
    ) -> Vec<TetrahedralStereo> {
        let mut out = Vec::new();
        for (ri, mol) in self.reactants.iter().enumerate() {
            for st in mol.tetrahedral_stereo() {
                let Some(&center) = placed.get(&Origin::Reactant {
                    reactant: ri,
                    atom: st.center,
                }) else {
                    continue;
                };
                let mut neighbors = [AtomId::Implicit; 4];
                let mut complete = true;
                for (slot, id) in neighbors.iter_mut().zip(st.neighbors) {
                    if let AtomId::Node(n) = id {
                        match placed.get(&Origin::Reactant { reactant: ri, atom: n }) {
                            Some(&p) if product.bond_between(center, p).is_some() => {
                                *slot = AtomId::Node(p)
                            }
                            _ => complete = false,
                        }
                    }
                }
                let listed = neighbors
                    .iter()
                    .filter(|s| matches!(s, AtomId::Node(_)))
                    .count();
                if complete && listed == product.degree(center) {
                    out.push(TetrahedralStereo { center, neighbors });
                }
            }
        }
        out
    }
}

/// Writes what a product-template atom pins down onto `atom`. Returns true
/// when the template fixes the hydrogen count.
fn apply_template(atom: &mut Atom, expr: &AtomExpr) -> bool {
    match expr {
        AtomExpr::Element {
            atomic_num,
            aromatic,
        } => {
            atom.atomic_num = *atomic_num;
            if let Some(arom) = aromatic {
                atom.is_aromatic = *arom;
            }
            false
        }
        AtomExpr::Charge(c) => {
            atom.formal_charge = *c;
            false
        }
        AtomExpr::Isotope(i) => {
            atom.isotope = *i;
            false
        }
        AtomExpr::TotalHCount(h) => {
            atom.explicit_h = *h;
            atom.implicit_h = 0;
            atom.no_implicit = true;
            true
        }
        AtomExpr::And(parts) => parts
            .iter()
            .fold(false, |fixed, p| apply_template(atom, p) || fixed),
        _ => false,
    }
}

fn cartesian_product<T>(sets: &[Vec<T>], max: usize) -> Result<Vec<Vec<&T>>, ReactionError> {
    let total = sets
        .iter()
        .try_fold(1usize, |acc, s| acc.checked_mul(s.len()))
        .unwrap_or(usize::MAX);
    if total > max {
        return Err(ReactionError::TooManyCombinations { limit: max });
    }
    let mut result: Vec<Vec<&T>> = vec![Vec::new()];
    for set in sets {
        result = result
            .iter()
            .flat_map(|combo| {
                set.iter().map(move |item| {
                    let mut next = combo.clone();
                    next.push(item);
                    next
                })
            })
            .collect();
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cartesian_first_set_outermost() {
        let sets = vec![vec![1, 2], vec![10, 20]];
        let combos = cartesian_product(&sets, 100).unwrap();
        let flat: Vec<(i32, i32)> = combos.iter().map(|c| (*c[0], *c[1])).collect();
        assert_eq!(flat, vec![(1, 10), (1, 20), (2, 10), (2, 20)]);
    }

    #[test]
    fn cartesian_limit() {
        let sets = vec![vec![0; 40], vec![0; 30]];
        assert_eq!(
            cartesian_product(&sets, MAX_COMBINATIONS),
            Err(ReactionError::TooManyCombinations {
                limit: MAX_COMBINATIONS
            })
        );
        let sets = vec![vec![0; 10], vec![0; 100]];
        assert_eq!(cartesian_product(&sets, MAX_COMBINATIONS).unwrap().len(), 1000);
    }

    #[test]
    fn template_atoms_pin_hydrogens() {
        let mut atom = Atom::new(6);
        atom.implicit_h = 3;
        let expr = AtomExpr::And(vec![
            AtomExpr::Element {
                atomic_num: 8,
                aromatic: Some(false),
            },
            AtomExpr::TotalHCount(1),
            AtomExpr::AtomMapClass(2),
        ]);
        assert!(apply_template(&mut atom, &expr));
        assert_eq!(atom.atomic_num, 8);
        assert_eq!(atom.total_h(), 1);
        assert!(atom.no_implicit);
        assert!(!apply_template(&mut atom, &AtomExpr::Charge(-1)));
        assert_eq!(atom.formal_charge, -1);
    }
}
