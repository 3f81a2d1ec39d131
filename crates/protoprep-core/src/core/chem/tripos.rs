//! Tripos (SYBYL) atom and bond type assignment.
//!
//! Types are derived from elements, connectivity and bond orders only. Labels
//! already present on the molecule are never consulted, which makes every
//! function here idempotent.

use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;
use phf::{Map, phf_map};
use std::collections::HashMap;

static ELEMENT_DEFAULT_TYPES: Map<&'static str, &'static str> = phf_map! {
    "H" => "H",
    "F" => "F",
    "Cl" => "Cl",
    "Br" => "Br",
    "I" => "I",
    "P" => "P.3",
    "B" => "B.3",
    "Li" => "Li",
    "Na" => "Na",
    "K" => "K",
    "Mg" => "Mg",
    "Ca" => "Ca",
    "Al" => "Al",
    "Si" => "Si",
    "Se" => "Se",
    "Sn" => "Sn",
    "Mn" => "Mn",
    "Fe" => "Fe",
    "Cu" => "Cu",
    "Zn" => "Zn",
    "Co" => "Co.oh",
    "Cr" => "Cr.oh",
    "Mo" => "Mo",
};

const DUMMY_TYPE: &str = "Du";

/// Assigns Tripos atom type names and then bond type names.
pub fn assign_tripos_types(molecule: &mut Molecule) {
    assign_atom_type_names(molecule);
    assign_bond_type_names(molecule);
}

pub fn assign_atom_type_names(molecule: &mut Molecule) {
    let view = TypingView::new(molecule);
    let types: Vec<&'static str> = (0..molecule.atom_count())
        .map(|idx| view.atom_type(idx))
        .collect();
    for (atom, tripos_type) in molecule.atoms_mut().iter_mut().zip(types) {
        atom.tripos_type = tripos_type.to_string();
    }
}

pub fn assign_bond_type_names(molecule: &mut Molecule) {
    let view = TypingView::new(molecule);
    let labels: Vec<&'static str> = molecule
        .bonds()
        .iter()
        .map(|bond| {
            if bond.order == BondOrder::Aromatic {
                "ar"
            } else if bond.order == BondOrder::Single
                && view.is_amide_bond(bond.atom1_idx, bond.atom2_idx)
            {
                "am"
            } else {
                bond.order.to_mol2()
            }
        })
        .collect();
    for (bond, label) in molecule.bonds_mut().iter_mut().zip(labels) {
        bond.tripos_type = label.to_string();
    }
}

/// Reassigns every atom name as element symbol plus a per-element counter
/// (`C1`, `C2`, `O1`, ...), in atom order.
pub fn assign_tripos_atom_names(molecule: &mut Molecule) {
    let mut counters: HashMap<String, usize> = HashMap::new();
    for atom in molecule.atoms_mut() {
        let counter = counters.entry(atom.element.clone()).or_insert(0);
        *counter += 1;
        atom.name = format!("{}{}", atom.element, counter);
    }
}

/// Renames all atoms when any atom has an empty name; otherwise leaves names alone.
///
/// Returns `true` when the names were reassigned.
pub fn ensure_atom_names(molecule: &mut Molecule) -> bool {
    if molecule.atoms().iter().any(|a| a.name.trim().is_empty()) {
        assign_tripos_atom_names(molecule);
        true
    } else {
        false
    }
}

struct TypingView<'a> {
    molecule: &'a Molecule,
    adjacency: Vec<Vec<(usize, BondOrder)>>,
}

impl<'a> TypingView<'a> {
    fn new(molecule: &'a Molecule) -> Self {
        Self {
            molecule,
            adjacency: molecule.adjacency(),
        }
    }

    fn element(&self, idx: usize) -> &str {
        &self.molecule.atoms()[idx].element
    }

    fn degree(&self, idx: usize) -> usize {
        self.adjacency[idx].len()
    }

    fn has_order(&self, idx: usize, order: BondOrder) -> bool {
        self.adjacency[idx].iter().any(|&(_, o)| o == order)
    }

    fn count_order(&self, idx: usize, order: BondOrder) -> usize {
        self.adjacency[idx].iter().filter(|&&(_, o)| o == order).count()
    }

    fn neighbors_with(&self, idx: usize, element: &str) -> impl Iterator<Item = usize> + '_ {
        let element = element.to_string();
        self.adjacency[idx]
            .iter()
            .map(|&(n, _)| n)
            .filter(move |&n| self.element(n) == element)
    }

    fn is_terminal_oxygen(&self, idx: usize) -> bool {
        self.element(idx) == "O" && self.degree(idx) == 1
    }

    fn is_unsaturated(&self, idx: usize) -> bool {
        self.adjacency[idx]
            .iter()
            .any(|&(_, o)| matches!(o, BondOrder::Double | BondOrder::Triple | BondOrder::Aromatic))
    }

    /// Carbon double-bonded to an oxygen or a sulfur.
    fn is_carbonyl_carbon(&self, idx: usize) -> bool {
        self.element(idx) == "C"
            && self.adjacency[idx].iter().any(|&(n, o)| {
                o == BondOrder::Double && matches!(self.element(n), "O" | "S")
            })
    }

    fn is_amide_bond(&self, a: usize, b: usize) -> bool {
        let (carbon, nitrogen) = match (self.element(a), self.element(b)) {
            ("C", "N") => (a, b),
            ("N", "C") => (b, a),
            _ => return false,
        };
        self.is_carbonyl_carbon(carbon) && self.nitrogen_type(nitrogen) == "N.am"
    }

    fn atom_type(&self, idx: usize) -> &'static str {
        match self.element(idx) {
            "C" => self.carbon_type(idx),
            "N" => self.nitrogen_type(idx),
            "O" => self.oxygen_type(idx),
            "S" => self.sulfur_type(idx),
            other => ELEMENT_DEFAULT_TYPES.get(other).copied().unwrap_or(DUMMY_TYPE),
        }
    }

    fn carbon_type(&self, idx: usize) -> &'static str {
        if self.has_order(idx, BondOrder::Aromatic) {
            return "C.ar";
        }
        let doubles = self.count_order(idx, BondOrder::Double);
        if self.has_order(idx, BondOrder::Triple) || doubles >= 2 {
            return "C.1";
        }
        if doubles == 1 {
            let nitrogens = self.neighbors_with(idx, "N").count();
            let double_to_nitrogen = self.adjacency[idx]
                .iter()
                .any(|&(n, o)| o == BondOrder::Double && self.element(n) == "N");
            if nitrogens == 3 && double_to_nitrogen {
                return "C.cat";
            }
            return "C.2";
        }
        "C.3"
    }

    fn nitrogen_type(&self, idx: usize) -> &'static str {
        if self.has_order(idx, BondOrder::Aromatic) {
            return "N.ar";
        }
        if self.has_order(idx, BondOrder::Triple) {
            return "N.1";
        }
        let degree = self.degree(idx);
        if self.has_order(idx, BondOrder::Double) {
            let oxygens = self.neighbors_with(idx, "O").count();
            if degree == 3 || oxygens >= 2 {
                return "N.pl3";
            }
            return "N.2";
        }
        if degree == 4 {
            return "N.4";
        }
        let neighbors: Vec<usize> = self.adjacency[idx].iter().map(|&(n, _)| n).collect();
        if neighbors.iter().any(|&n| self.is_carbonyl_carbon(n)) {
            return "N.am";
        }
        if degree == 3 && neighbors.iter().any(|&n| self.is_unsaturated(n)) {
            return "N.pl3";
        }
        "N.3"
    }

    fn oxygen_type(&self, idx: usize) -> &'static str {
        if self.is_terminal_oxygen(idx) {
            let (partner, order) = self.adjacency[idx][0];
            match self.element(partner) {
                "C" => {
                    let terminal_oxygens = self.adjacency[partner]
                        .iter()
                        .filter(|&&(n, _)| self.is_terminal_oxygen(n))
                        .count();
                    if terminal_oxygens >= 2 {
                        return "O.co2";
                    }
                }
                "P" => return "O.co2",
                _ => {}
            }
            if order == BondOrder::Double {
                return "O.2";
            }
        }
        if self.has_order(idx, BondOrder::Double) {
            return "O.2";
        }
        "O.3"
    }

    fn sulfur_type(&self, idx: usize) -> &'static str {
        let sulfoxide_oxygens = self.adjacency[idx]
            .iter()
            .filter(|&&(n, o)| o == BondOrder::Double && self.is_terminal_oxygen(n))
            .count();
        match sulfoxide_oxygens {
            0 if self.has_order(idx, BondOrder::Double) => "S.2",
            0 => "S.3",
            1 => "S.O",
            _ => "S.O2",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use nalgebra::Point3;

    fn build(elements: &[&str], bonds: &[(usize, usize, BondOrder)]) -> Molecule {
        let mut molecule = Molecule::new("test");
        for (i, element) in elements.iter().enumerate() {
            molecule.add_atom(Atom::new(
                "",
                element,
                Point3::new(i as f64, 0.0, 0.0),
            ));
        }
        for &(a, b, order) in bonds {
            molecule.add_bond(a, b, order).unwrap();
        }
        molecule
    }

    fn types(molecule: &Molecule) -> Vec<&str> {
        molecule.atoms().iter().map(|a| a.tripos_type.as_str()).collect()
    }

    #[test]
    fn acetate_oxygens_are_carboxylate() {
        use BondOrder::*;
        let mut acetate = build(
            &["C", "C", "O", "O"],
            &[(0, 1, Single), (1, 2, Double), (1, 3, Single)],
        );
        assign_tripos_types(&mut acetate);
        assert_eq!(types(&acetate), vec!["C.3", "C.2", "O.co2", "O.co2"]);
    }

    #[test]
    fn protonated_acid_has_carbonyl_and_hydroxyl() {
        use BondOrder::*;
        let mut acid = build(
            &["C", "C", "O", "O", "H"],
            &[(0, 1, Single), (1, 2, Double), (1, 3, Single), (3, 4, Single)],
        );
        assign_tripos_types(&mut acid);
        assert_eq!(types(&acid), vec!["C.3", "C.2", "O.2", "O.3", "H"]);
    }

    #[test]
    fn amide_nitrogen_and_bond_are_labelled() {
        use BondOrder::*;
        // Acetamide heavy atoms.
        let mut amide = build(
            &["C", "C", "O", "N"],
            &[(0, 1, Single), (1, 2, Double), (1, 3, Single)],
        );
        assign_tripos_types(&mut amide);
        assert_eq!(types(&amide)[3], "N.am");
        // Bonds keep insertion order: C-C, C=O, C-N.
        assert_eq!(amide.bonds()[1].tripos_type, "2");
        assert_eq!(amide.bonds()[2].tripos_type, "am");
    }

    #[test]
    fn aromatic_ring_uses_ar_types() {
        use BondOrder::*;
        let mut pyridine = build(
            &["N", "C", "C", "C", "C", "C"],
            &[
                (0, 1, Aromatic),
                (1, 2, Aromatic),
                (2, 3, Aromatic),
                (3, 4, Aromatic),
                (4, 5, Aromatic),
                (5, 0, Aromatic),
            ],
        );
        assign_tripos_types(&mut pyridine);
        assert_eq!(types(&pyridine), vec!["N.ar", "C.ar", "C.ar", "C.ar", "C.ar", "C.ar"]);
        assert!(pyridine.bonds().iter().all(|b| b.tripos_type == "ar"));
    }

    #[test]
    fn nitrogen_hybridization_cases() {
        use BondOrder::*;
        let mut ammonium = build(
            &["N", "C", "H", "H", "H"],
            &[(0, 1, Single), (0, 2, Single), (0, 3, Single), (0, 4, Single)],
        );
        assign_atom_type_names(&mut ammonium);
        assert_eq!(types(&ammonium)[0], "N.4");

        let mut amine = build(&["N", "C"], &[(0, 1, Single)]);
        assign_atom_type_names(&mut amine);
        assert_eq!(types(&amine)[0], "N.3");

        let mut nitrile = build(&["C", "C", "N"], &[(0, 1, Single), (1, 2, Triple)]);
        assign_atom_type_names(&mut nitrile);
        assert_eq!(types(&nitrile), vec!["C.3", "C.1", "N.1"]);

        let mut imine = build(&["C", "N", "H"], &[(0, 1, Double), (1, 2, Single)]);
        assign_atom_type_names(&mut imine);
        assert_eq!(types(&imine)[1], "N.2");
    }

    #[test]
    fn guanidinium_carbon_is_cationic() {
        use BondOrder::*;
        let mut guanidinium = build(
            &["C", "N", "N", "N"],
            &[(0, 1, Double), (0, 2, Single), (0, 3, Single)],
        );
        assign_atom_type_names(&mut guanidinium);
        assert_eq!(types(&guanidinium)[0], "C.cat");
    }

    #[test]
    fn sulfur_and_phosphate_types() {
        use BondOrder::*;
        let mut sulfone = build(
            &["S", "O", "O", "C", "C"],
            &[(0, 1, Double), (0, 2, Double), (0, 3, Single), (0, 4, Single)],
        );
        assign_atom_type_names(&mut sulfone);
        assert_eq!(types(&sulfone)[0], "S.O2");

        let mut thioether = build(&["S", "C", "C"], &[(0, 1, Single), (0, 2, Single)]);
        assign_atom_type_names(&mut thioether);
        assert_eq!(types(&thioether)[0], "S.3");

        let mut phosphate = build(
            &["P", "O", "O", "O", "O", "C"],
            &[
                (0, 1, Double),
                (0, 2, Single),
                (0, 3, Single),
                (0, 4, Single),
                (4, 5, Single),
            ],
        );
        assign_atom_type_names(&mut phosphate);
        assert_eq!(types(&phosphate), vec!["P.3", "O.co2", "O.co2", "O.co2", "O.3", "C.3"]);
    }

    #[test]
    fn unknown_elements_fall_back_to_dummy() {
        let mut molecule = build(&["Xe", "Cl"], &[]);
        assign_atom_type_names(&mut molecule);
        assert_eq!(types(&molecule), vec!["Du", "Cl"]);
    }

    #[test]
    fn typing_is_idempotent() {
        use BondOrder::*;
        let mut molecule = build(
            &["C", "C", "O", "N", "H"],
            &[(0, 1, Single), (1, 2, Double), (1, 3, Single), (3, 4, Single)],
        );
        assign_tripos_types(&mut molecule);
        let first = molecule.clone();
        assign_tripos_types(&mut molecule);
        assert_eq!(first, molecule);
    }

    #[test]
    fn ensure_atom_names_only_renames_when_needed() {
        let mut molecule = build(&["C", "O", "C", "H"], &[]);
        assert!(ensure_atom_names(&mut molecule));
        let names: Vec<_> = molecule.atoms().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["C1", "O1", "C2", "H1"]);

        molecule.atoms_mut()[0].name = "CX".to_string();
        assert!(!ensure_atom_names(&mut molecule));
        assert_eq!(molecule.atoms()[0].name, "CX");
    }
}
