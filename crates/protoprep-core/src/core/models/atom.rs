use nalgebra::Point3;

/// Residue name given to atoms that have not been assigned to any residue yet.
pub const UNASSIGNED_RESIDUE_NAME: &str = "UNL";

/// Represents one atom of a small-molecule record.
///
/// Atoms are stored positionally inside a [`Molecule`](super::molecule::Molecule);
/// there is no separate identifier. Fields that a given file format does not
/// carry are left at their defaults (an SDF atom, for example, has an empty
/// `name` and no residue information).
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// The atom name (e.g., "C4N", "O7N"). May be empty when read from formats without names.
    pub name: String,
    /// The canonical element symbol (e.g., "C", "Cl").
    pub element: String,
    /// The 3D coordinates of the atom in Angstroms.
    pub position: Point3<f64>,
    /// The partial atomic charge in elementary charge units.
    pub partial_charge: f64,
    /// The integer formal charge.
    pub formal_charge: i8,
    /// The Tripos (SYBYL) atom type name (e.g., "C.ar", "N.am"). Empty until typed.
    pub tripos_type: String,
    /// The residue (substructure) name the atom belongs to.
    pub residue_name: String,
    /// The residue sequence number.
    pub residue_number: isize,
}

impl Atom {
    /// Creates a new `Atom` with default values for charges, type and residue.
    ///
    /// # Arguments
    ///
    /// * `name` - The atom name.
    /// * `element` - The canonical element symbol.
    /// * `position` - The 3D coordinates of the atom.
    pub fn new(name: &str, element: &str, position: Point3<f64>) -> Self {
        Self {
            name: name.to_string(),
            element: element.to_string(),
            position,
            partial_charge: 0.0,
            formal_charge: 0,
            tripos_type: String::new(),
            residue_name: UNASSIGNED_RESIDUE_NAME.to_string(),
            residue_number: 1,
        }
    }
}
