//! Convenience layer over [`ChemicalReaction`]: loading and saving
//! reactions, applying them and picking which products to keep.

use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use rand::Rng;
use tracing::{debug, info};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::convert::{remove_dummies, sanitize_mol};
use crate::error::{Error, Result};
use crate::logging::without_logs;
use crate::mdl::{from_rxn_block, to_rxn_block, RxnWriteOptions};
use crate::mol::Mol;
use crate::reaction::{from_reaction_smarts, to_reaction_smarts, ChemicalReaction};
use crate::smarts::has_substruct_match;
use crate::smiles::to_smiles;

lazy_static! {
    /// Attaches a dummy atom to any atom that carries a hydrogen.
    pub static ref ATTACHING_RXN: ChemicalReaction =
        rxn_from_smarts("[*;h:1]>>[*:1][*]").expect("built-in reaction SMARTS");
}

pub fn rxn_from_smarts(smarts: &str) -> Result<ChemicalReaction> {
    Ok(from_reaction_smarts(smarts)?)
}

pub fn rxn_to_smarts(rxn: &ChemicalReaction) -> String {
    to_reaction_smarts(rxn)
}

/// Reads an MDL RXN block. With `sanitize`, the templates must also pass
/// [`ChemicalReaction::sanitize_rxn`].
pub fn rxn_from_block(block: &str, sanitize: bool) -> Result<ChemicalReaction> {
    let rxn = from_rxn_block(block)?;
    if sanitize {
        rxn.sanitize_rxn()?;
    }
    Ok(rxn)
}

pub fn rxn_from_block_file(path: impl AsRef<Path>, sanitize: bool) -> Result<ChemicalReaction> {
    let block = fs::read_to_string(path)?;
    rxn_from_block(&block, sanitize)
}

pub fn rxn_to_block(rxn: &ChemicalReaction, separate_agents: bool, force_v3000: bool) -> String {
    to_rxn_block(
        rxn,
        RxnWriteOptions {
            separate_agents,
            force_v3000,
        },
    )
}

pub fn rxn_to_block_file(
    rxn: &ChemicalReaction,
    path: impl AsRef<Path>,
    separate_agents: bool,
    force_v3000: bool,
) -> Result<()> {
    fs::write(path, rxn_to_block(rxn, separate_agents, force_v3000))?;
    Ok(())
}

/// Whether the reaction's templates are consistent enough to run. With
/// `enable_logs` the validation summary is logged at info level.
pub fn is_reaction_ok(rxn: &ChemicalReaction, enable_logs: bool) -> bool {
    if enable_logs {
        let report = rxn.validate();
        info!("Number of warnings: {}", report.num_warnings);
        info!("Number of preprocessing errors: {}", report.num_errors);
        info!("Number of reactants in reaction: {}", report.num_reactants);
        info!("Number of products in reaction: {}", report.num_products);
        info!("Preprocess labels added: {:?}", report.labels);
        for msg in &report.messages {
            debug!("{msg}");
        }
    }
    rxn.sanitize_rxn().is_ok()
}

/// Which products of each group to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductIndex {
    Single(usize),
    Many(Vec<usize>),
}

impl ProductIndex {
    fn indices(&self) -> &[usize] {
        match self {
            ProductIndex::Single(i) => std::slice::from_ref(i),
            ProductIndex::Many(v) => v,
        }
    }
}

/// A selected product, as a molecule or as SMILES.
#[derive(Debug, Clone, PartialEq)]
pub enum Product {
    Mol(Mol<Atom, Bond>),
    Smiles(String),
}

impl Product {
    pub fn as_mol(&self) -> Option<&Mol<Atom, Bond>> {
        match self {
            Product::Mol(m) => Some(m),
            Product::Smiles(_) => None,
        }
    }

    pub fn as_smiles(&self) -> Option<&str> {
        match self {
            Product::Smiles(s) => Some(s),
            Product::Mol(_) => None,
        }
    }
}

/// Product groups after selection. A slot is `None` when its product
/// failed to sanitize.
pub type ProductGroups = Vec<Vec<Option<Product>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOptions {
    pub product_index: Option<ProductIndex>,
    /// Keep one randomly chosen group.
    pub single_product_group: bool,
    /// Replace dummy atoms by hydrogens.
    pub rm_attach: bool,
    pub as_smiles: bool,
    pub sanitize: bool,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            product_index: None,
            single_product_group: true,
            rm_attach: false,
            as_smiles: false,
            sanitize: true,
        }
    }
}

pub fn select_reaction_output(
    products: Vec<Vec<Mol<Atom, Bond>>>,
    opts: &SelectOptions,
) -> Result<ProductGroups> {
    select_reaction_output_with_rng(products, opts, &mut rand::thread_rng())
}

/// Picks products out of the groups [`ChemicalReaction::run`] returns.
///
/// `product_index` is applied to every group before a single group is
/// drawn, so an index past the end of any group is an error.
pub fn select_reaction_output_with_rng<R: Rng + ?Sized>(
    mut products: Vec<Vec<Mol<Atom, Bond>>>,
    opts: &SelectOptions,
    rng: &mut R,
) -> Result<ProductGroups> {
    if products.is_empty() {
        return Ok(Vec::new());
    }
    if let Some(index) = &opts.product_index {
        products = products
            .into_iter()
            .map(|group| {
                index
                    .indices()
                    .iter()
                    .map(|&i| {
                        group.get(i).cloned().ok_or(Error::ProductIndex {
                            index: i,
                            len: group.len(),
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
    }
    if opts.single_product_group {
        let pick = rng.gen_range(0..products.len());
        products = vec![products.swap_remove(pick)];
    }

    Ok(products
        .into_iter()
        .map(|group| {
            group
                .into_iter()
                .map(|mol| finish_product(mol, opts))
                .collect()
        })
        .collect())
}

fn finish_product(mol: Mol<Atom, Bond>, opts: &SelectOptions) -> Option<Product> {
    let mol = if opts.sanitize {
        sanitize_mol(&mol, true)?
    } else {
        mol
    };
    let mol = if opts.rm_attach {
        remove_dummies(&mol)
    } else {
        mol
    };
    Some(if opts.as_smiles {
        Product::Smiles(to_smiles(&mol))
    } else {
        Product::Mol(mol)
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyOptions {
    pub product_index: Option<ProductIndex>,
    pub single_product_group: bool,
    pub as_smiles: bool,
    pub rm_attach: bool,
    /// Silence logging while the reaction runs.
    pub disable_logs: bool,
    pub sanitize: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            product_index: None,
            single_product_group: false,
            as_smiles: false,
            rm_attach: false,
            disable_logs: true,
            sanitize: true,
        }
    }
}

impl ApplyOptions {
    fn select(&self) -> SelectOptions {
        SelectOptions {
            product_index: self.product_index.clone(),
            single_product_group: self.single_product_group,
            rm_attach: self.rm_attach,
            as_smiles: self.as_smiles,
            sanitize: self.sanitize,
        }
    }
}

pub fn apply_reaction(
    rxn: &ChemicalReaction,
    reactants: &[&Mol<Atom, Bond>],
    opts: &ApplyOptions,
) -> Result<ProductGroups> {
    apply_reaction_with_rng(rxn, reactants, opts, &mut rand::thread_rng())
}

/// Runs `rxn` on `reactants`, one per reactant template, and selects the
/// outputs.
pub fn apply_reaction_with_rng<R: Rng + ?Sized>(
    rxn: &ChemicalReaction,
    reactants: &[&Mol<Atom, Bond>],
    opts: &ApplyOptions,
    rng: &mut R,
) -> Result<ProductGroups> {
    let products = if opts.disable_logs {
        without_logs(|| rxn.run(reactants))?
    } else {
        rxn.run(reactants)?
    };
    select_reaction_output_with_rng(products, &opts.select(), rng)
}

/// Index of the last reactant template that matches `mol`.
pub fn find_reactant_position(rxn: &ChemicalReaction, mol: &Mol<Atom, Bond>) -> Option<usize> {
    rxn.reactant_templates()
        .iter()
        .rposition(|tmpl| has_substruct_match(mol, tmpl))
}

pub fn can_react(rxn: &ChemicalReaction, mol: &Mol<Atom, Bond>) -> bool {
    find_reactant_position(rxn, mol).is_some()
}

/// Swaps reactant and product templates. Agents are dropped.
pub fn inverse_reaction(rxn: &ChemicalReaction) -> ChemicalReaction {
    let mut inverse = ChemicalReaction::new();
    for tmpl in rxn.product_templates() {
        inverse.add_reactant_template(tmpl.clone());
    }
    for tmpl in rxn.reactant_templates() {
        inverse.add_product_template(tmpl.clone());
    }
    inverse
}
