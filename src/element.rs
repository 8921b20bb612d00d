//! Periodic table data for elements 1–118.
//!
//! Average atomic weights follow IUPAC standard atomic weights. Elements
//! without a stable isotope use the mass number of their longest-lived
//! isotope.

macro_rules! elements {
    ($($variant:ident = $num:literal, $weight:literal;)*) => {
        /// A chemical element, identified by its atomic number.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        pub enum Element {
            $($variant = $num,)*
        }

        const ALL: [Element; 118] = [$(Element::$variant,)*];

        const SYMBOLS: [&str; 118] = [$(stringify!($variant),)*];

        const WEIGHTS: [f64; 118] = [$($weight,)*];
    };
}

elements! {
    H = 1, 1.008;
    He = 2, 4.002602;
    Li = 3, 6.94;
    Be = 4, 9.0121831;
    B = 5, 10.81;
    C = 6, 12.011;
    N = 7, 14.007;
    O = 8, 15.999;
    F = 9, 18.998403163;
    Ne = 10, 20.1797;
    Na = 11, 22.98976928;
    Mg = 12, 24.305;
    Al = 13, 26.9815385;
    Si = 14, 28.085;
    P = 15, 30.973761998;
    S = 16, 32.06;
    Cl = 17, 35.45;
    Ar = 18, 39.948;
    K = 19, 39.0983;
    Ca = 20, 40.078;
    Sc = 21, 44.955908;
    Ti = 22, 47.867;
    V = 23, 50.9415;
    Cr = 24, 51.9961;
    Mn = 25, 54.938044;
    Fe = 26, 55.845;
    Co = 27, 58.933194;
    Ni = 28, 58.6934;
    Cu = 29, 63.546;
    Zn = 30, 65.38;
    Ga = 31, 69.723;
    Ge = 32, 72.630;
    As = 33, 74.921595;
    Se = 34, 78.971;
    Br = 35, 79.904;
    Kr = 36, 83.798;
    Rb = 37, 85.4678;
    Sr = 38, 87.62;
    Y = 39, 88.90584;
    Zr = 40, 91.224;
    Nb = 41, 92.90637;
    Mo = 42, 95.95;
    Tc = 43, 98.0;
    Ru = 44, 101.07;
    Rh = 45, 102.9055;
    Pd = 46, 106.42;
    Ag = 47, 107.8682;
    Cd = 48, 112.414;
    In = 49, 114.818;
    Sn = 50, 118.710;
    Sb = 51, 121.760;
    Te = 52, 127.60;
    I = 53, 126.90447;
    Xe = 54, 131.293;
    Cs = 55, 132.90545196;
    Ba = 56, 137.327;
    La = 57, 138.90547;
    Ce = 58, 140.116;
    Pr = 59, 140.90766;
    Nd = 60, 144.242;
    Pm = 61, 145.0;
    Sm = 62, 150.36;
    Eu = 63, 151.964;
    Gd = 64, 157.25;
    Tb = 65, 158.92535;
    Dy = 66, 162.500;
    Ho = 67, 164.93033;
    Er = 68, 167.259;
    Tm = 69, 168.93422;
    Yb = 70, 173.045;
    Lu = 71, 174.9668;
    Hf = 72, 178.49;
    Ta = 73, 180.94788;
    W = 74, 183.84;
    Re = 75, 186.207;
    Os = 76, 190.23;
    Ir = 77, 192.217;
    Pt = 78, 195.084;
    Au = 79, 196.966569;
    Hg = 80, 200.592;
    Tl = 81, 204.38;
    Pb = 82, 207.2;
    Bi = 83, 208.9804;
    Po = 84, 209.0;
    At = 85, 210.0;
    Rn = 86, 222.0;
    Fr = 87, 223.0;
    Ra = 88, 226.0;
    Ac = 89, 227.0;
    Th = 90, 232.0377;
    Pa = 91, 231.03588;
    U = 92, 238.02891;
    Np = 93, 237.0;
    Pu = 94, 244.0;
    Am = 95, 243.0;
    Cm = 96, 247.0;
    Bk = 97, 247.0;
    Cf = 98, 251.0;
    Es = 99, 252.0;
    Fm = 100, 257.0;
    Md = 101, 258.0;
    No = 102, 259.0;
    Lr = 103, 262.0;
    Rf = 104, 267.0;
    Db = 105, 268.0;
    Sg = 106, 269.0;
    Bh = 107, 270.0;
    Hs = 108, 277.0;
    Mt = 109, 278.0;
    Ds = 110, 281.0;
    Rg = 111, 282.0;
    Cn = 112, 285.0;
    Nh = 113, 286.0;
    Fl = 114, 289.0;
    Mc = 115, 290.0;
    Lv = 116, 293.0;
    Ts = 117, 294.0;
    Og = 118, 294.0;
}

impl Element {
    pub fn from_atomic_num(n: u8) -> Option<Element> {
        ALL.get((n as usize).checked_sub(1)?).copied()
    }

    pub fn from_symbol(s: &str) -> Option<Element> {
        SYMBOLS
            .iter()
            .position(|&sym| sym == s)
            .map(|i| ALL[i])
    }

    pub fn atomic_num(self) -> u8 {
        self as u8
    }

    pub fn symbol(self) -> &'static str {
        SYMBOLS[self as usize - 1]
    }

    pub fn atomic_weight(self) -> f64 {
        WEIGHTS[self as usize - 1]
    }

    /// Allowed valences for the neutral atom, lowest first.
    ///
    /// An empty slice means the element has no fixed valence (most metals);
    /// such atoms never receive implicit hydrogens and are not valence
    /// checked.
    pub fn default_valences(self) -> &'static [u8] {
        use Element::*;
        match self {
            H => &[1],
            He | Ne | Ar | Kr | Xe | Rn => &[0],
            Li | Na | K | Rb | Cs | Fr => &[1],
            Be | Mg | Ca | Sr | Ba | Ra => &[2],
            B | Al | Ga => &[3],
            C | Si | Ge => &[4],
            Sn | Pb => &[2, 4],
            N => &[3],
            P | As | Sb => &[3, 5, 7],
            Bi => &[3, 5],
            O => &[2],
            S | Se | Te | Po => &[2, 4, 6],
            F | Cl | Br | At => &[1],
            I => &[1, 3, 5],
            _ => &[],
        }
    }

    /// Electrons in the outer shell of the neutral atom. Transition metals
    /// count their group number, lanthanides and actinides count 3.
    pub fn outer_electrons(self) -> u8 {
        const NOBLE: [u8; 7] = [2, 10, 18, 36, 54, 86, 118];
        let n = self.atomic_num();
        let prev = NOBLE.iter().rev().find(|&&g| g < n).copied().unwrap_or(0);
        let k = n - prev;
        match prev {
            0 | 2 | 10 => k,
            18 | 36 if k > 12 => k - 10,
            18 | 36 => k,
            _ => match k {
                0..=2 => k,
                3..=16 => 3,
                17..=26 => k - 14,
                _ => k - 24,
            },
        }
    }

    /// Elements that may appear outside brackets in SMILES.
    pub fn is_organic_subset(self) -> bool {
        matches!(
            self,
            Element::B
                | Element::C
                | Element::N
                | Element::O
                | Element::P
                | Element::S
                | Element::F
                | Element::Cl
                | Element::Br
                | Element::I
        )
    }

    /// Elements that may be written in lowercase (aromatic) form.
    pub fn can_be_aromatic(self) -> bool {
        matches!(
            self,
            Element::B
                | Element::C
                | Element::N
                | Element::O
                | Element::P
                | Element::S
                | Element::As
                | Element::Se
                | Element::Te
        )
    }
}

/// Valences allowed for an atom with the given formal charge.
///
/// Charged atoms take the valences of their isoelectronic neighbour
/// (N+ behaves like C, O- like F, C- like N). Returns an empty slice when
/// the valence is unconstrained.
pub fn allowed_valences(atomic_num: u8, formal_charge: i8) -> &'static [u8] {
    let Some(element) = Element::from_atomic_num(atomic_num) else {
        return &[];
    };
    if formal_charge == 0 || element.default_valences().is_empty() {
        return element.default_valences();
    }
    let shifted = atomic_num as i16 - formal_charge as i16;
    if shifted <= 0 {
        return &[0];
    }
    match u8::try_from(shifted).ok().and_then(Element::from_atomic_num) {
        Some(iso) if !iso.default_valences().is_empty() => iso.default_valences(),
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_num_round_trip() {
        for n in 1u8..=118 {
            let e = Element::from_atomic_num(n).unwrap();
            assert_eq!(e.atomic_num(), n);
            assert_eq!(Element::from_symbol(e.symbol()), Some(e));
        }
        assert!(Element::from_atomic_num(0).is_none());
        assert!(Element::from_atomic_num(119).is_none());
    }

    #[test]
    fn symbols_are_case_sensitive() {
        assert_eq!(Element::from_symbol("Cl"), Some(Element::Cl));
        assert!(Element::from_symbol("cl").is_none());
        assert!(Element::from_symbol("CL").is_none());
        assert!(Element::from_symbol("").is_none());
    }

    #[test]
    fn weights_line_up_with_symbols() {
        assert!((Element::H.atomic_weight() - 1.008).abs() < 1e-6);
        assert!((Element::C.atomic_weight() - 12.011).abs() < 1e-6);
        assert!((Element::Cr.atomic_weight() - 51.9961).abs() < 1e-6);
        assert!((Element::Br.atomic_weight() - 79.904).abs() < 1e-6);
        assert!((Element::U.atomic_weight() - 238.02891).abs() < 1e-6);
        for n in 1u8..=118 {
            assert!(Element::from_atomic_num(n).unwrap().atomic_weight() > 0.0);
        }
    }

    #[test]
    fn charged_valences_are_isoelectronic() {
        assert_eq!(allowed_valences(7, 1), &[4]);
        assert_eq!(allowed_valences(7, -1), &[2]);
        assert_eq!(allowed_valences(8, -1), &[1]);
        assert_eq!(allowed_valences(6, -1), &[3]);
        assert_eq!(allowed_valences(17, -1), &[0]);
        assert_eq!(allowed_valences(11, 1), &[0]);
        assert_eq!(allowed_valences(26, 2), &[] as &[u8]);
        assert_eq!(allowed_valences(0, 0), &[] as &[u8]);
    }

    #[test]
    fn outer_electrons_follow_groups() {
        let cases = [
            (Element::H, 1),
            (Element::He, 2),
            (Element::C, 4),
            (Element::N, 5),
            (Element::O, 6),
            (Element::Cl, 7),
            (Element::Ar, 8),
            (Element::K, 1),
            (Element::Fe, 8),
            (Element::Ga, 3),
            (Element::Br, 7),
            (Element::I, 7),
            (Element::La, 3),
            (Element::Pt, 10),
            (Element::Pb, 4),
            (Element::Rn, 8),
        ];
        for (e, expected) in cases {
            assert_eq!(e.outer_electrons(), expected, "{}", e.symbol());
        }
    }

    #[test]
    fn organic_subset() {
        assert!(Element::C.is_organic_subset());
        assert!(Element::Br.is_organic_subset());
        assert!(!Element::Fe.is_organic_subset());
        assert!(!Element::H.is_organic_subset());
    }
}
