#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    /// Unresolved aromatic bond. Only present before kekulization.
    Aromatic,
}

impl BondOrder {
    /// Contribution to an atom's explicit valence. Unresolved aromatic
    /// bonds count as one; kekulization supplies the missing order.
    pub fn valence_contrib(self) -> u8 {
        match self {
            BondOrder::Single | BondOrder::Aromatic => 1,
            BondOrder::Double => 2,
            BondOrder::Triple => 3,
        }
    }
}

/// Bond between two atoms.
///
/// Sanitized molecules always carry a Kekulé `order`; aromaticity is
/// tracked by `is_aromatic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bond {
    pub order: BondOrder,
    pub is_aromatic: bool,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            is_aromatic: order == BondOrder::Aromatic,
        }
    }

    pub fn single() -> Self {
        Self::new(BondOrder::Single)
    }

    pub fn double() -> Self {
        Self::new(BondOrder::Double)
    }

    pub fn aromatic() -> Self {
        Self::new(BondOrder::Aromatic)
    }
}
