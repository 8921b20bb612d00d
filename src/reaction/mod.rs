//! Reaction templates: parsing and writing reaction SMARTS, running
//! templates against molecules and checking template consistency.

pub mod error;
mod parser;
mod runner;
mod validate;
mod writer;

pub use error::{ReactionError, ReactionSmartsError};
pub use parser::parse_reaction_smarts;
pub use runner::MAX_COMBINATIONS;
pub use validate::ReactionValidation;
pub use writer::to_reaction_smarts;

use crate::mol::Mol;
use crate::smarts::{AtomExpr, BondExpr};

/// A reaction as reactant, agent and product query templates. Atom map
/// numbers tie reactant atoms to product atoms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChemicalReaction {
    reactant_templates: Vec<Mol<AtomExpr, BondExpr>>,
    product_templates: Vec<Mol<AtomExpr, BondExpr>>,
    agent_templates: Vec<Mol<AtomExpr, BondExpr>>,
}

impl ChemicalReaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_reactant_templates(&self) -> usize {
        self.reactant_templates.len()
    }

    pub fn num_product_templates(&self) -> usize {
        self.product_templates.len()
    }

    pub fn num_agent_templates(&self) -> usize {
        self.agent_templates.len()
    }

    pub fn reactant_template(&self, i: usize) -> Option<&Mol<AtomExpr, BondExpr>> {
        self.reactant_templates.get(i)
    }

    pub fn product_template(&self, i: usize) -> Option<&Mol<AtomExpr, BondExpr>> {
        self.product_templates.get(i)
    }

    pub fn reactant_templates(&self) -> &[Mol<AtomExpr, BondExpr>] {
        &self.reactant_templates
    }

    pub fn product_templates(&self) -> &[Mol<AtomExpr, BondExpr>] {
        &self.product_templates
    }

    pub fn agent_templates(&self) -> &[Mol<AtomExpr, BondExpr>] {
        &self.agent_templates
    }

    /// Appends a reactant template and returns its index.
    pub fn add_reactant_template(&mut self, template: Mol<AtomExpr, BondExpr>) -> usize {
        self.reactant_templates.push(template);
        self.reactant_templates.len() - 1
    }

    pub fn add_product_template(&mut self, template: Mol<AtomExpr, BondExpr>) -> usize {
        self.product_templates.push(template);
        self.product_templates.len() - 1
    }

    pub fn add_agent_template(&mut self, template: Mol<AtomExpr, BondExpr>) -> usize {
        self.agent_templates.push(template);
        self.agent_templates.len() - 1
    }
}

pub fn from_reaction_smarts(s: &str) -> Result<ChemicalReaction, ReactionSmartsError> {
    parse_reaction_smarts(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Atom;
    use crate::bond::{Bond, BondOrder};
    use crate::sanitize::sanitize;
    use crate::smiles::{from_smiles, to_smiles};

    fn mol(smiles: &str) -> Mol<Atom, Bond> {
        from_smiles(smiles).unwrap_or_else(|e| panic!("bad SMILES {smiles:?}: {e}"))
    }

    fn rxn(s: &str) -> ChemicalReaction {
        from_reaction_smarts(s).unwrap_or_else(|e| panic!("bad reaction {s:?}: {e}"))
    }

    fn smiles_of(mut product: Mol<Atom, Bond>) -> String {
        sanitize(&mut product).unwrap();
        to_smiles(&product)
    }

    fn canon(smiles: &str) -> String {
        to_smiles(&mol(smiles))
    }

    #[test]
    fn parse_counts() {
        let r = rxn("[C:1][Br:2]>>[C:1][OH]");
        assert_eq!(r.num_reactant_templates(), 1);
        assert_eq!(r.num_product_templates(), 1);
        assert_eq!(r.num_agent_templates(), 0);
        let r = rxn("[C:1]=[C:2]>[Pd]>[C:1][C:2]");
        assert_eq!(r.num_agent_templates(), 1);
        let r = rxn("[C:1][Br:2].[OH-:3]>>[C:1][O:3].[Br-:2]");
        assert_eq!(r.num_reactant_templates(), 2);
        assert_eq!(r.num_product_templates(), 2);
        assert!(r.reactant_template(1).is_some());
        assert!(r.reactant_template(2).is_none());
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            from_reaction_smarts("[C][Br]"),
            Err(ReactionSmartsError::MissingSeparator)
        );
        assert_eq!(
            from_reaction_smarts("[C:1]>>"),
            Err(ReactionSmartsError::EmptyProducts)
        );
        assert_eq!(
            from_reaction_smarts(">>[C:1]"),
            Err(ReactionSmartsError::EmptyReactants)
        );
    }

    #[test]
    fn builders_return_indices() {
        let mut r = ChemicalReaction::new();
        let template = crate::smarts::from_smarts("[C:1]").unwrap();
        assert_eq!(r.add_reactant_template(template.clone()), 0);
        assert_eq!(r.add_reactant_template(template.clone()), 1);
        assert_eq!(r.add_product_template(template), 0);
        assert_eq!(r.num_reactant_templates(), 2);
    }

    #[test]
    fn substitution_keeps_substituents() {
        let r = rxn("[C:1][Br:2]>>[C:1][OH]");
        let products = r.run(&[&mol("CCCBr")]).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(smiles_of(products[0][0].clone()), canon("CCCO"));
    }

    #[test]
    fn two_reactants_two_products() {
        let r = rxn("[C:1][Br:2].[OH-:3]>>[C:1][O:3].[Br-:2]");
        let products = r.run(&[&mol("CCBr"), &mol("[OH-]")]).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].len(), 2);
        assert_eq!(smiles_of(products[0][0].clone()), canon("CC[O-]"));
        assert_eq!(smiles_of(products[0][1].clone()), canon("[Br-]"));
    }

    #[test]
    fn no_match_returns_empty() {
        let r = rxn("[C:1][Br:2]>>[C:1][OH]");
        assert!(r.run(&[&mol("CC")]).unwrap().is_empty());
    }

    #[test]
    fn wrong_reactant_count() {
        let r = rxn("[C:1][Br:2].[OH-:3]>>[C:1][O:3]");
        assert_eq!(
            r.run(&[&mol("CBr")]),
            Err(ReactionError::WrongReactantCount {
                expected: 2,
                got: 1
            })
        );
    }

    #[test]
    fn duplicate_maps_refuse_to_run() {
        let r = rxn("[C:1][C:1]>>[C:1]");
        assert_eq!(
            r.run(&[&mol("CC")]),
            Err(ReactionError::DuplicateAtomMap { map_num: 1 })
        );
    }

    #[test]
    fn bond_formation() {
        let r = rxn("[C:1]Br.[N:2]>>[C:1][N:2]");
        let products = r.run(&[&mol("CBr"), &mol("N")]).unwrap();
        assert_eq!(smiles_of(products[0][0].clone()), canon("CN"));
    }

    #[test]
    fn bond_order_changes() {
        let r = rxn("[C:1][C:2]>>[C:1]=[C:2]");
        let products = r.run(&[&mol("CC")]).unwrap();
        let p = &products[0][0];
        assert_eq!(p.bond_count(), 1);
        let edge = p.bonds().next().unwrap();
        assert_eq!(p.bond(edge).order, BondOrder::Double);
        assert_eq!(smiles_of(p.clone()), canon("C=C"));

        let r = rxn("[C:1][C:2]>>[C:1]#[C:2]");
        let products = r.run(&[&mol("CC")]).unwrap();
        assert_eq!(smiles_of(products[0][0].clone()), canon("C#C"));
    }

    #[test]
    fn bond_removal_splits_product() {
        let r = rxn("[C:1][O:2]>>[C:1].[O:2]");
        let products = r.run(&[&mol("CCO")]).unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(smiles_of(products[0][0].clone()), canon("CC"));
        assert_eq!(smiles_of(products[0][1].clone()), canon("O"));
    }

    #[test]
    fn charge_change() {
        let r = rxn("[OH:1]>>[O-:1]");
        let products = r.run(&[&mol("CO")]).unwrap();
        assert_eq!(smiles_of(products[0][0].clone()), canon("C[O-]"));
    }

    #[test]
    fn unmapped_product_atoms_are_created() {
        let r = rxn("[N:1]>>[N:1]C");
        let products = r.run(&[&mol("N")]).unwrap();
        assert_eq!(smiles_of(products[0][0].clone()), canon("CN"));
    }

    #[test]
    fn every_match_gives_a_group() {
        let r = rxn("[C:1][Br:2]>>[C:1][OH]");
        let products = r.run(&[&mol("BrCCBr")]).unwrap();
        assert_eq!(products.len(), 2);
        for group in products {
            assert_eq!(smiles_of(group[0].clone()), canon("OCCBr"));
        }
    }

    #[test]
    fn aromatic_substitution() {
        let r = rxn("[c:1][Br:2].[OH-:3]>>[c:1][O:3].[Br-:2]");
        let products = r.run(&[&mol("c1ccc(Br)cc1"), &mol("[OH-]")]).unwrap();
        assert_eq!(products.len(), 1);
        let phenoxide = &products[0][0];
        let doubles = phenoxide
            .bonds()
            .filter(|&e| phenoxide.bond(e).order == BondOrder::Double)
            .count();
        assert_eq!(doubles, 3);
        assert_eq!(smiles_of(phenoxide.clone()), canon("[O-]c1ccccc1"));
    }

    #[test]
    fn attaching_dummy() {
        let r = rxn("[*;h:1]>>[*:1][*]");
        let products = r.run(&[&mol("CO")]).unwrap();
        assert_eq!(products.len(), 2);
        let outputs: Vec<String> = products
            .into_iter()
            .map(|g| smiles_of(g.into_iter().next().unwrap()))
            .collect();
        assert!(outputs.contains(&canon("*CO")));
        assert!(outputs.contains(&canon("*OC")));
    }

    #[test]
    fn ring_bonds_between_mapped_atoms_survive() {
        let r = rxn("[C:1][C:2]>>[C:1]=[C:2]");
        let products = r.run(&[&mol("C1CC1")]).unwrap();
        assert_eq!(products.len(), 6);
        assert_eq!(smiles_of(products[0][0].clone()), canon("C1=CC1"));
    }

    #[test]
    fn stereo_away_from_reaction_center_is_kept() {
        let r = rxn("[C:1][Br:2]>>[C:1][OH]");
        let products = r.run(&[&mol("F[C@H](Cl)CBr")]).unwrap();
        assert_eq!(smiles_of(products[0][0].clone()), canon("F[C@H](Cl)CO"));
        assert_eq!(products[0][0].tetrahedral_stereo().len(), 1);
    }

    #[test]
    fn stereo_at_replaced_neighbor_is_dropped() {
        let r = rxn("[C:1][Br:2]>>[C:1][OH]");
        let products = r.run(&[&mol("F[C@H](Cl)Br")]).unwrap();
        assert!(products[0][0].tetrahedral_stereo().is_empty());
    }
}
