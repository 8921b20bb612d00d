use crate::element::Element;

/// Atom type for a molecular graph node.
///
/// `Atom` stores what you would read off a structure: element, charge,
/// isotope and hydrogen counts. Hydrogens are normally not graph nodes; a
/// bracket atom records its hydrogens in `explicit_h` and sets
/// `no_implicit`, while bare atoms get `implicit_h` assigned during
/// sanitization.
///
/// # Examples
///
/// ```
/// use molkit::Atom;
///
/// let carbon = Atom::new(6);
/// assert_eq!(carbon.atomic_num, 6);
/// assert_eq!(carbon.total_h(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Atom {
    /// Atomic number. `0` is a dummy atom (`*`).
    pub atomic_num: u8,
    /// Formal charge in elementary charge units.
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance.
    pub isotope: u16,
    /// Hydrogens written on the atom (`[NH2]`) or set by an edit.
    pub explicit_h: u8,
    /// When set, `implicit_h` is never assigned. True for bracket atoms.
    pub no_implicit: bool,
    /// Hydrogens implied by the atom's default valence.
    pub implicit_h: u8,
    /// Unpaired electrons.
    pub radical_electrons: u8,
    /// Set by aromaticity perception, or by an aromatic SMILES symbol
    /// before sanitization.
    pub is_aromatic: bool,
    /// Atom-map number from `[C:1]`. `0` means unmapped.
    pub map_num: u16,
}

impl Atom {
    pub fn new(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Default::default()
        }
    }

    pub fn dummy() -> Self {
        Self::new(0)
    }

    pub fn element(&self) -> Option<Element> {
        Element::from_atomic_num(self.atomic_num)
    }

    pub fn is_dummy(&self) -> bool {
        self.atomic_num == 0
    }

    pub fn symbol(&self) -> &'static str {
        self.element().map_or("*", Element::symbol)
    }

    pub fn total_h(&self) -> u8 {
        self.explicit_h + self.implicit_h
    }

    /// Average mass of the atom including its attached (non-graph)
    /// hydrogens. Isotope labels replace the average element weight with
    /// the mass number.
    pub fn mass_with_h(&self) -> f64 {
        let heavy = match self.element() {
            Some(_) if self.isotope > 0 => self.isotope as f64,
            Some(e) => e.atomic_weight(),
            None => 0.0,
        };
        heavy + self.total_h() as f64 * Element::H.atomic_weight()
    }
}

/// Chirality tag as written in SMILES or SMARTS.
///
/// Molecules keep stereo as [`TetrahedralStereo`](crate::mol::TetrahedralStereo)
/// records on the [`Mol`](crate::Mol); the tag only appears in query atoms
/// and while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Chirality {
    #[default]
    None,
    /// `@@`
    Cw,
    /// `@`
    Ccw,
}
