//! Estimated aqueous solubility (log mol/L), Delaney's ESOL with refit
//! coefficients.

use serde::{Deserialize, Serialize};

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;

use super::constitutional::{mw, n_aromatic_atoms_proportion, n_rotatable_bonds};
use super::crippen::clogp;

const INTERCEPT: f64 = 0.26121066137801696;
const COEF_LOGP: f64 = -0.7416739523408995;
const COEF_MW: f64 = -0.0066138847738667125;
const COEF_ROTORS: f64 = 0.003451545565957996;
const COEF_AROMATIC: f64 = -0.42624840441316975;

/// Inputs to the ESOL model, as read from a precomputed table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EsolInput {
    pub clogp: f64,
    pub mw: f64,
    pub n_rotatable_bonds: f64,
    pub n_aromatic_atoms_proportion: f64,
}

impl EsolInput {
    pub fn of(mol: &Mol<Atom, Bond>) -> Self {
        Self {
            clogp: clogp(mol),
            mw: mw(mol),
            n_rotatable_bonds: n_rotatable_bonds(mol) as f64,
            n_aromatic_atoms_proportion: n_aromatic_atoms_proportion(mol),
        }
    }
}

pub fn esol_from_data(data: &EsolInput) -> f64 {
    INTERCEPT
        + COEF_LOGP * data.clogp
        + COEF_MW * data.mw
        + COEF_ROTORS * data.n_rotatable_bonds
        + COEF_AROMATIC * data.n_aromatic_atoms_proportion
}

pub fn esol(mol: &Mol<Atom, Bond>) -> f64 {
    esol_from_data(&EsolInput::of(mol))
}
