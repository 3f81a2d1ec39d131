use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum BondOrder {
    #[default]
    Single = 1,
    Double = 2,
    Triple = 3,
    Aromatic = 4,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid bond order string: '{0}'")]
pub struct ParseBondOrderError(pub String);

impl BondOrder {
    /// Interprets a Tripos mol2 bond type column.
    ///
    /// Amide (`am`), dummy (`du`), unknown (`un`) and not-connected (`nc`) bonds
    /// carry no multiplicity information and are read as single bonds.
    pub fn from_mol2(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "1" | "am" | "du" | "un" | "nc" => Some(Self::Single),
            "2" => Some(Self::Double),
            "3" => Some(Self::Triple),
            "ar" => Some(Self::Aromatic),
            _ => None,
        }
    }

    pub fn to_mol2(self) -> &'static str {
        match self {
            Self::Single => "1",
            Self::Double => "2",
            Self::Triple => "3",
            Self::Aromatic => "ar",
        }
    }

    /// Interprets the bond type field of a V2000 connection table.
    pub fn from_ctfile(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::Single),
            2 => Some(Self::Double),
            3 => Some(Self::Triple),
            4 => Some(Self::Aromatic),
            _ => None,
        }
    }

    pub fn to_ctfile(self) -> u8 {
        self as u8
    }
}

impl FromStr for BondOrder {
    type Err = ParseBondOrderError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1" | "s" | "single" => Ok(Self::Single),
            "2" | "d" | "double" => Ok(Self::Double),
            "3" | "t" | "triple" => Ok(Self::Triple),
            "ar" | "4" | "aromatic" => Ok(Self::Aromatic),
            _ => Err(ParseBondOrderError(s.to_string())),
        }
    }
}

impl fmt::Display for BondOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Single => "Single",
                Self::Double => "Double",
                Self::Triple => "Triple",
                Self::Aromatic => "Aromatic",
            }
        )
    }
}

/// A bond between two atoms of the same molecule, addressed by atom position.
///
/// The constructor stores the lower index first so that two bonds over the same
/// atom pair compare equal regardless of input direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1_idx: usize,
    pub atom2_idx: usize,
    pub order: BondOrder,
    /// The Tripos bond type name ("1", "2", "3", "ar", "am"). Empty until typed.
    pub tripos_type: String,
}

impl Bond {
    pub fn new(atom1_idx: usize, atom2_idx: usize, order: BondOrder) -> Self {
        let (atom1_idx, atom2_idx) = if atom1_idx <= atom2_idx {
            (atom1_idx, atom2_idx)
        } else {
            (atom2_idx, atom1_idx)
        };
        Self {
            atom1_idx,
            atom2_idx,
            order,
            tripos_type: String::new(),
        }
    }

    /// The label written to the mol2 BOND section.
    pub fn mol2_type(&self) -> &str {
        if self.tripos_type.is_empty() {
            self.order.to_mol2()
        } else {
            &self.tripos_type
        }
    }
}
