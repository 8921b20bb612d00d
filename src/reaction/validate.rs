use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use super::error::ReactionError;
use super::runner::mapped;
use super::ChemicalReaction;

/// Outcome of checking a reaction's templates for consistency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReactionValidation {
    pub num_warnings: usize,
    pub num_errors: usize,
    pub num_reactants: usize,
    pub num_products: usize,
    /// Atom map numbers used in the reactant templates, ascending.
    pub labels: Vec<u16>,
    pub messages: Vec<String>,
}

impl ReactionValidation {
    pub fn is_valid(&self) -> bool {
        self.num_errors == 0
    }
}

enum Finding {
    Error(ReactionError),
    Warning(String),
}

impl ChemicalReaction {
    pub fn validate(&self) -> ReactionValidation {
        let mut report = ReactionValidation {
            num_reactants: self.num_reactant_templates(),
            num_products: self.num_product_templates(),
            labels: self.reactant_map_numbers().into_iter().collect(),
            ..Default::default()
        };
        for finding in self.findings() {
            match finding {
                Finding::Error(e) => {
                    report.num_errors += 1;
                    report.messages.push(format!("error: {e}"));
                }
                Finding::Warning(w) => {
                    report.num_warnings += 1;
                    report.messages.push(format!("warning: {w}"));
                }
            }
        }
        report
    }

    /// Checks that the templates can be run: at least one reactant and
    /// product, no empty templates, unique reactant map numbers and every
    /// product map number present in a reactant.
    pub fn sanitize_rxn(&self) -> Result<(), ReactionError> {
        for finding in self.findings() {
            if let Finding::Error(e) = finding {
                return Err(e);
            }
        }
        Ok(())
    }

    fn reactant_map_numbers(&self) -> BTreeSet<u16> {
        self.reactant_templates()
            .iter()
            .flat_map(|t| t.atoms().filter_map(|i| mapped(t.atom(i))))
            .collect()
    }

    fn findings(&self) -> Vec<Finding> {
        let mut out = Vec::new();
        if self.num_reactant_templates() == 0 {
            out.push(Finding::Error(ReactionError::NoReactantTemplates));
        }
        if self.num_product_templates() == 0 {
            out.push(Finding::Error(ReactionError::NoProductTemplates));
        }
        for (role, templates) in [
            ("reactant", self.reactant_templates()),
            ("product", self.product_templates()),
        ] {
            for (index, t) in templates.iter().enumerate() {
                if t.atom_count() == 0 {
                    out.push(Finding::Error(ReactionError::EmptyTemplate { role, index }));
                }
            }
        }

        let mut reactant_maps = HashSet::new();
        for t in self.reactant_templates() {
            for idx in t.atoms() {
                if let Some(map_num) = mapped(t.atom(idx)) {
                    if !reactant_maps.insert(map_num) {
                        out.push(Finding::Error(ReactionError::DuplicateAtomMap { map_num }));
                    }
                }
            }
        }

        let mut product_maps = HashSet::new();
        for (pi, t) in self.product_templates().iter().enumerate() {
            for idx in t.atoms() {
                match mapped(t.atom(idx)) {
                    Some(map_num) => {
                        if !reactant_maps.contains(&map_num) {
                            out.push(Finding::Error(ReactionError::UnknownProductMap { map_num }));
                        }
                        if !product_maps.insert(map_num) {
                            out.push(Finding::Warning(format!(
                                "product atom map number {map_num} appears more than once"
                            )));
                        }
                    }
                    None => out.push(Finding::Warning(format!(
                        "product template {pi} atom {} is unmapped and will be created",
                        idx.index()
                    ))),
                }
            }
        }

        let mut dropped: Vec<u16> = reactant_maps.difference(&product_maps).copied().collect();
        dropped.sort_unstable();
        for map_num in dropped {
            out.push(Finding::Warning(format!(
                "mapped reactant atom {map_num} does not appear in any product"
            )));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::reaction::{from_reaction_smarts, ChemicalReaction, ReactionError};
    use crate::smarts::from_smarts;

    #[test]
    fn clean_reaction() {
        let rxn = from_reaction_smarts("[C:1][Br:2]>>[C:1][O:2]").unwrap();
        let report = rxn.validate();
        assert_eq!(report.num_errors, 0);
        assert_eq!(report.num_warnings, 0);
        assert_eq!(report.num_reactants, 1);
        assert_eq!(report.num_products, 1);
        assert_eq!(report.labels, vec![1, 2]);
        assert!(rxn.sanitize_rxn().is_ok());
    }

    #[test]
    fn attaching_reaction_warns_about_new_atom() {
        let rxn = from_reaction_smarts("[*;h:1]>>[*:1][*]").unwrap();
        let report = rxn.validate();
        assert_eq!(report.num_errors, 0);
        assert_eq!(report.num_warnings, 1);
        assert!(report.is_valid());
        assert_eq!(report.labels, vec![1]);
    }

    #[test]
    fn dropped_atoms_warn() {
        let rxn = from_reaction_smarts("[C:1][Br:2]>>[C:1]O").unwrap();
        let report = rxn.validate();
        assert_eq!(report.num_errors, 0);
        assert_eq!(report.num_warnings, 2);
    }

    #[test]
    fn duplicate_reactant_maps_are_errors() {
        let rxn = from_reaction_smarts("[C:1][C:1]>>[C:1]").unwrap();
        assert_eq!(rxn.validate().num_errors, 1);
        assert_eq!(
            rxn.sanitize_rxn(),
            Err(ReactionError::DuplicateAtomMap { map_num: 1 })
        );
    }

    #[test]
    fn unknown_product_maps_are_errors() {
        let rxn = from_reaction_smarts("[C:1]>>[C:1][N:5]").unwrap();
        assert_eq!(
            rxn.sanitize_rxn(),
            Err(ReactionError::UnknownProductMap { map_num: 5 })
        );
        assert!(!rxn.validate().is_valid());
    }

    #[test]
    fn empty_templates() {
        let mut rxn = ChemicalReaction::new();
        assert_eq!(rxn.sanitize_rxn(), Err(ReactionError::NoReactantTemplates));
        assert_eq!(rxn.validate().num_errors, 2);
        rxn.add_reactant_template(from_smarts("C").unwrap());
        rxn.add_product_template(crate::mol::Mol::new());
        assert_eq!(
            rxn.sanitize_rxn(),
            Err(ReactionError::EmptyTemplate {
                role: "product",
                index: 0
            })
        );
    }
}
