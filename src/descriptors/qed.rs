//! Quantitative estimate of drug-likeness (Bickerton et al., 2012).

use lazy_static::lazy_static;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
use crate::smarts::{count_matches, has_substruct_match, AtomExpr, BondExpr};

use super::constitutional::{mw, n_hbd};
use super::crippen::clogp;
use super::pattern;
use super::rings::n_aromatic_rings;
use super::tpsa::tpsa;

/// Parameters of one asymmetric double sigmoid.
#[derive(Debug, Clone, Copy)]
struct Ads {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
    dmax: f64,
}

impl Ads {
    const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64, dmax: f64) -> Self {
        Self { a, b, c, d, e, f, dmax }
    }

    fn desirability(&self, x: f64) -> f64 {
        let rise = 1.0 + (-(x - self.c + self.d / 2.0) / self.e).exp();
        let fall = 1.0 + (-(x - self.c - self.d / 2.0) / self.f).exp();
        (self.a + self.b / rise * (1.0 - 1.0 / fall)) / self.dmax
    }
}

/// MW, ALOGP, HBA, HBD, PSA, ROTB, AROM, ALERTS.
const PARAMS: [Ads; 8] = [
    Ads::new(2.817065973, 392.5754953, 290.7489764, 2.419764353, 49.22325677, 65.37051707, 104.9805561),
    Ads::new(3.172690585, 137.8624751, 2.534937431, 4.581497897, 0.822739154, 0.576295591, 131.3186604),
    Ads::new(2.948620388, 160.4605972, 3.615294657, 4.435986202, 0.290141953, 1.300669958, 148.7763046),
    Ads::new(1.618662227, 1010.051101, 0.985094388, 0.000000001, 0.713820843, 0.920922555, 258.1632616),
    Ads::new(1.876861559, 125.2232657, 62.90773554, 87.83366614, 12.01999824, 28.51324732, 104.5686167),
    Ads::new(0.010000000, 272.4121427, 2.558379970, 1.565547684, 1.271567166, 2.758063707, 105.4420403),
    Ads::new(3.217788970, 957.7374108, 2.274627939, 0.000000001, 1.317690384, 0.375760881, 312.3372610),
    Ads::new(0.010000000, 1199.094025, -0.09002883, 0.000000001, 0.185904477, 0.875193782, 417.7253140),
];

/// Mean weights of the eight properties.
pub const QED_WEIGHTS: [f64; 8] = [0.66, 0.46, 0.05, 0.61, 0.06, 0.65, 0.48, 0.95];

const ACCEPTORS: &[&str] = &[
    "[oH0;X2]",
    "[OH1;X2;v2]",
    "[OH0;X2;v2]",
    "[OH0;X1;v2]",
    "[O-;X1]",
    "[SH0;X2;v2]",
    "[SH0;X1;v2]",
    "[S-;X1]",
    "[nH0;X2]",
    "[NH0;X1;v3]",
    "[$([N;+0;X3;v3]);!$(N[C,S]=O)]",
];

/// Structural alerts for reactive or otherwise unwanted groups. A
/// molecule scores one per pattern it contains.
const ALERTS: &[&str] = &[
    "*1[O,S,N]*1",
    "[S,C](=[O,S])[F,Br,Cl,I]",
    "[CX4][Cl,Br,I]",
    "[#6]S(=O)(=O)O[#6]",
    "[$([CH]),$(CC)]#CC(=O)[#6]",
    "[$([CH]),$(CC)]#CC(=O)O[#6]",
    "n[OH]",
    "[$([CH]),$(CC)]#CS(=O)(=O)[#6]",
    "C=C(C=O)C=O",
    "n1c([F,Cl,Br,I])cccc1",
    "[CH1](=O)",
    "[#8][#8]",
    "[C;!R]=[N;!R]",
    "[N!R]=[N!R]",
    "[#6](=O)[#6](=O)",
    "[#16][#16]",
    "[#7][NH2]",
    "C(=O)N[NH2]",
    "[#6]=S",
    "[$([CH2]),$([CH][CX4]),$(C([CX4])[CX4])]=[$([CH2]),$([CH][CX4]),$(C([CX4])[CX4])]",
    "C1(=[O,N])C=CC(=[O,N])C=C1",
    "C1(=[O,N])C(=[O,N])C=CC=C1",
    "a21aa3a(aa1aaaa2)aaaa3",
    "a31a(a2a(aa1)aaaa2)aaaa3",
    "a1aa2a3a(a1)A=AA=A3=AA=A2",
    "c1cc([NH2])ccc1",
    "[Hg,Fe,As,Sb,Zn,Se,se,Te,B,Si,Na,Ca,Ge,Ag,Mg,K,Ba,Sr,Be,Ti,Mo,Mn,Ru,Pd,Ni,Cu,Au,Cd,Al,Ga,Sn,Rh,Tl,Bi,Nb,Li,Pb,Hf,Ho]",
    "I",
    "OS(=O)(=O)[O-]",
    "[N+](=O)[O-]",
    "C(=O)N[OH]",
    "C1NC(=O)NC(=O)1",
    "[SH]",
    "[S-]",
    "c1ccc([Cl,Br,I,F])c([Cl,Br,I,F])c1[Cl,Br,I,F]",
    "c1cc([Cl,Br,I,F])cc([Cl,Br,I,F])c1[Cl,Br,I,F]",
    "[CR1]1[CR1][CR1][CR1][CR1][CR1][CR1]1",
    "[CR1]1[CR1][CR1]cc[CR1][CR1]1",
    "[CR2]1[CR2][CR2][CR2][CR2][CR2][CR2][CR2]1",
    "[CR2]1[CR2][CR2]cc[CR2][CR2][CR2]1",
    "[CH2R2]1N[CH2R2][CH2R2][CH2R2][CH2R2][CH2R2]1",
    "[CH2R2]1N[CH2R2][CH2R2][CH2R2][CH2R2][CH2R2][CH2R2]1",
    "C#C",
    "[OR2,NR2]@[CR2]@[CR2]@[OR2,NR2]@[CR2]@[CR2]@[OR2,NR2]",
    "[$([N+R]),$([n+R]),$([N+]=C)][O-]",
    "[#6]=N[OH]",
    "[#6]=NOC=O",
    "[#6](=O)[CX4,CR0X3,O][#6](=O)",
    "c1ccc2c(c1)ccc(=O)o2",
    "[O+,o+,S+,s+]",
    "N=C=O",
    "[NX3,NX4][F,Cl,Br,I]",
    "c1ccccc1OC(=O)[#6]",
    "[CR0]=[CR0][CR0]=[CR0]",
    "[C+,c+,C-,c-]",
    "N=[N+]=[N-]",
    "C12C(NC(N1)=O)CSC2",
    "c1c([OH])c([OH,NH2,NH])ccc1",
    "P",
    "[N,O,S]C#N",
    "C=C=O",
    "[Si][F,Cl,Br,I]",
    "[SX2]O",
    "[SiR0,CR0](c1ccccc1)(c2ccccc2)(c3ccccc3)",
    "O1CCCCC1OC2CCC3CCCCC3C2",
    "N=[CR0][N,n,O,S]",
    "[cR2]1[cR2][cR2]([Nv3X3,Nv4X4])[cR2][cR2][cR2]1[cR2]2[cR2][cR2][cR2]([Nv3X3,Nv4X4])[cR2][cR2]2",
    "C=[C!r]C#N",
    "[cR2]1[cR2]c([N+0X3R0,nX3R0])c([N+0X3R0,nX3R0])[cR2][cR2]1",
    "[cR2]1[cR2]c([N+0X3R0,nX3R0])[cR2]c([N+0X3R0,nX3R0])[cR2]1",
    "[cR2]1[cR2]c([N+0X3R0,nX3R0])[cR2][cR2]c1([N+0X3R0,nX3R0])",
    "[OH]c1ccc([OH,NH2,NH])cc1",
    "c1ccccc1OC(=O)O",
    "[SX2H0][N]",
    "c12ccccc1(SC(S)=N2)",
    "c12ccccc1(SC(=S)N2)",
    "c1nnnn1C=O",
    "s1c(S)nnc1NC=O",
    "S1C=CSC1=S",
    "C(=O)Onnn",
    "OS(=O)(=O)C(F)(F)F",
    "N#CC[OH]",
    "N#CC(=O)",
    "S(=O)(=O)C#N",
    "N[CH2]C#N",
    "C1(=O)NCC1",
    "S(=O)(=O)[O-,OH]",
    "NC[F,Cl,Br,I]",
    "C=[C!r]O",
    "[NX2+0]=[O+0]",
    "[OR0,NR0][OR0,NR0]",
    "C(=O)O[C,H1].C(=O)O[C,H1].C(=O)O[C,H1]",
    "[CX2R0][NX3R0]",
    "c1ccccc1[C;!R]=[C;!R]c2ccccc2",
    "[NX3R0,NX4R0,OR0,SX2R0][CX4][NX3R0,NX4R0,OR0,SX2R0]",
    "[s,S,c,C,n,N,o,O]~[n+,N+](~[s,S,c,C,n,N,o,O])(~[s,S,c,C,n,N,o,O])~[s,S,c,C,n,N,o,O]",
    "[s,S,c,C,n,N,o,O]~[nX3+,NX3+](~[s,S,c,C,n,N])~[s,S,c,C,n,N]",
    "[*]=[N+]=[*]",
    "[SX3](=O)[O-,OH]",
    "N#N",
    "F.F.F.F",
    "[R0;D2][R0;D2][R0;D2][R0;D2]",
    "[cR,CR]~C(=O)NC(=O)~[cR,CR]",
    "C=!@CC=[O,S]",
    "[#6,#8,#16][#6](=O)O[#6]",
    "c[C;R0](=[O,S])[#6]",
    "c[SX2][C;!R]",
    "C=C=C",
    "c1nc([F,Cl,Br,I,S])ncc1",
    "c1ncnc([F,Cl,Br,I,S])c1",
    "c1nc(c2c(n1)nc(n2)[F,Cl,Br,I])",
    "[#6]S(=O)(=O)c1ccc(cc1)F",
    "[15N]",
    "[13C]",
    "[18O]",
    "[34S]",
];

/// Rotatable bonds, leaving out amide and ester linkages and bonds to
/// CX3 and tert-butyl groups.
const ROTATABLE: &str = concat!(
    "[!$(*#*)&!D1&$(*(-[!#1])~[!#1])&!$(C(F)(F)F)&!$(C(Cl)(Cl)Cl)&!$(C(Br)(Br)Br)",
    "&!$(C([CH3])([CH3])[CH3])&!$([CD3](=[N,O,S])-!@[#7,O,S!D1])",
    "&!$([#7,O,S!D1]-!@[CD3]=[N,O,S])&!$([CD3](=[N+])-!@[#7!D1])",
    "&!$([#7!D1]-!@[CD3]=[N+])]-,:;!@[!$(*#*)&!D1&!$(C(F)(F)F)",
    "&!$(C(Cl)(Cl)Cl)&!$(C(Br)(Br)Br)&!$(C([CH3])([CH3])[CH3])]"
);

lazy_static! {
    static ref ACCEPTOR_PATTERNS: Vec<Mol<AtomExpr, BondExpr>> =
        ACCEPTORS.iter().map(|s| pattern(s)).collect();
    static ref ALERT_PATTERNS: Vec<Mol<AtomExpr, BondExpr>> =
        ALERTS.iter().map(|s| pattern(s)).collect();
    static ref ROTATABLE_PATTERN: Mol<AtomExpr, BondExpr> = pattern(ROTATABLE);
}

/// The eight raw properties QED combines, in [`QED_WEIGHTS`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QedProperties {
    pub mw: f64,
    pub alogp: f64,
    pub hba: f64,
    pub hbd: f64,
    pub psa: f64,
    pub rotb: f64,
    pub arom: f64,
    pub alerts: f64,
}

impl QedProperties {
    pub fn of(mol: &Mol<Atom, Bond>) -> Self {
        let hba: usize = ACCEPTOR_PATTERNS
            .iter()
            .map(|p| count_matches(mol, p))
            .sum();
        let alerts = ALERT_PATTERNS
            .iter()
            .filter(|p| has_substruct_match(mol, p))
            .count();
        Self {
            mw: mw(mol),
            alogp: clogp(mol),
            hba: hba as f64,
            hbd: n_hbd(mol) as f64,
            psa: tpsa(mol),
            rotb: count_matches(mol, &ROTATABLE_PATTERN) as f64,
            arom: n_aromatic_rings(mol) as f64,
            alerts: alerts as f64,
        }
    }

    fn values(&self) -> [f64; 8] {
        [
            self.mw,
            self.alogp,
            self.hba,
            self.hbd,
            self.psa,
            self.rotb,
            self.arom,
            self.alerts,
        ]
    }
}

/// Weighted geometric mean of the property desirabilities.
pub fn qed_from_properties(props: &QedProperties, weights: &[f64; 8]) -> f64 {
    let total: f64 = weights.iter().sum();
    let log_sum: f64 = props
        .values()
        .iter()
        .zip(PARAMS.iter())
        .zip(weights)
        .map(|((&x, ads), &w)| w * ads.desirability(x).ln())
        .sum();
    (log_sum / total).exp()
}

pub fn qed(mol: &Mol<Atom, Bond>) -> f64 {
    qed_from_properties(&QedProperties::of(mol), &QED_WEIGHTS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::from_smiles;

    fn mol(s: &str) -> Mol<Atom, Bond> {
        from_smiles(s).unwrap()
    }

    #[test]
    fn all_patterns_parse() {
        assert_eq!(ACCEPTOR_PATTERNS.len(), ACCEPTORS.len());
        assert_eq!(ALERT_PATTERNS.len(), ALERTS.len());
    }

    #[test]
    fn benzene() {
        let q = qed(&mol("c1ccccc1"));
        assert!((q - 0.4426).abs() < 1e-3, "{q}");
    }

    #[test]
    fn reference_drugs() {
        for (smiles, expected) in [
            ("CC(=O)Oc1ccccc1C(=O)O", 0.5501),
            ("Cn1cnc2c1c(=O)n(C)c(=O)n2C", 0.5385),
            ("CC(C)Cc1ccc(cc1)C(C)C(=O)O", 0.8216),
        ] {
            let q = qed(&mol(smiles));
            assert!((q - expected).abs() < 1e-3, "{smiles}: {q}");
        }
    }

    #[test]
    fn aspirin_properties() {
        let props = QedProperties::of(&mol("CC(=O)Oc1ccccc1C(=O)O"));
        assert_eq!(props.hba, 4.0);
        assert_eq!(props.hbd, 1.0);
        assert_eq!(props.rotb, 2.0);
        assert_eq!(props.arom, 1.0);
        // phenyl ester and generic ester
        assert_eq!(props.alerts, 2.0);
        let q = qed_from_properties(&props, &QED_WEIGHTS);
        assert!((q - 0.5501).abs() < 1e-3, "{q}");
    }

    #[test]
    fn isotope_and_metal_alerts() {
        assert_eq!(QedProperties::of(&mol("[13CH4]")).alerts, 1.0);
        assert_eq!(QedProperties::of(&mol("CCCC[Sn](CCCC)(CCCC)CCCC")).alerts, 1.0);
        assert_eq!(QedProperties::of(&mol("FC(F)(F)C(F)F")).alerts, 1.0);
    }

    #[test]
    fn alerts_lower_the_score() {
        let clean = QedProperties::of(&mol("CCCO"));
        let aldehyde = QedProperties::of(&mol("CCC=O"));
        assert_eq!(clean.alerts, 0.0);
        assert_eq!(aldehyde.alerts, 1.0);
        assert!(qed(&mol("CCC=O")) < qed(&mol("CCCO")));
        // four chain atoms in a row
        assert_eq!(QedProperties::of(&mol("CCCCCCO")).alerts, 1.0);
    }

    #[test]
    fn stays_in_unit_interval() {
        for s in ["C", "CC(=O)Oc1ccccc1C(=O)O", "c1ccc2ccccc2c1", "OCC(O)CO"] {
            let q = qed(&mol(s));
            assert!(q > 0.0 && q < 1.0, "{s}: {q}");
        }
    }
}
