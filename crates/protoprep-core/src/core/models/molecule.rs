use super::atom::Atom;
use super::topology::{Bond, BondOrder};
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoleculeError {
    #[error("Bond references atom index {index}, but the molecule has {atom_count} atoms")]
    AtomIndexOutOfRange { index: usize, atom_count: usize },
    #[error("Atom {0} cannot be bonded to itself")]
    SelfBond(usize),
    #[error("Conformer has {actual} coordinates, expected {expected}")]
    ConformerSizeMismatch { expected: usize, actual: usize },
}

/// A small-molecule record: atoms, bonds, SD data tags and conformers.
///
/// The coordinates stored on the atoms form the first conformer. Additional
/// conformers produced by a charge engine are kept as bare coordinate sets and
/// expanded into separate records only when written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Molecule {
    /// The molecule title (first line of mol2 MOLECULE / SDF header blocks).
    pub title: String,
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
    sd_data: Vec<(String, String)>,
    extra_conformers: Vec<Vec<Point3<f64>>>,
}

impl Molecule {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn bonds_mut(&mut self) -> &mut [Bond] {
        &mut self.bonds
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Appends an atom and returns its index.
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.atoms.push(atom);
        self.atoms.len() - 1
    }

    /// Adds a bond between two existing atoms and returns its index.
    ///
    /// A bond over an atom pair that is already bonded replaces the old order.
    pub fn add_bond(
        &mut self,
        atom1_idx: usize,
        atom2_idx: usize,
        order: BondOrder,
    ) -> Result<usize, MoleculeError> {
        let atom_count = self.atoms.len();
        for index in [atom1_idx, atom2_idx] {
            if index >= atom_count {
                return Err(MoleculeError::AtomIndexOutOfRange { index, atom_count });
            }
        }
        if atom1_idx == atom2_idx {
            return Err(MoleculeError::SelfBond(atom1_idx));
        }

        let bond = Bond::new(atom1_idx, atom2_idx, order);
        match self
            .bonds
            .iter()
            .position(|b| b.atom1_idx == bond.atom1_idx && b.atom2_idx == bond.atom2_idx)
        {
            Some(existing) => {
                self.bonds[existing].order = order;
                Ok(existing)
            }
            None => {
                self.bonds.push(bond);
                Ok(self.bonds.len() - 1)
            }
        }
    }

    /// Builds per-atom neighbour lists in one pass over the bonds.
    pub fn adjacency(&self) -> Vec<Vec<(usize, BondOrder)>> {
        let mut adjacency = vec![Vec::new(); self.atoms.len()];
        for bond in &self.bonds {
            adjacency[bond.atom1_idx].push((bond.atom2_idx, bond.order));
            adjacency[bond.atom2_idx].push((bond.atom1_idx, bond.order));
        }
        adjacency
    }

    pub fn net_formal_charge(&self) -> i32 {
        self.atoms.iter().map(|a| a.formal_charge as i32).sum()
    }

    pub fn total_partial_charge(&self) -> f64 {
        self.atoms.iter().map(|a| a.partial_charge).sum()
    }

    /// Overwrites the residue name of every atom.
    pub fn set_residue_name(&mut self, residue_name: &str) {
        for atom in &mut self.atoms {
            atom.residue_name = residue_name.to_string();
        }
    }

    /// The residue name of the first atom, if the molecule has atoms.
    pub fn residue_name(&self) -> Option<&str> {
        self.atoms.first().map(|a| a.residue_name.as_str())
    }

    pub fn sd_data(&self) -> &[(String, String)] {
        &self.sd_data
    }

    pub fn get_sd_data(&self, tag: &str) -> Option<&str> {
        self.sd_data
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a tag, replacing the value in place if the tag already exists.
    pub fn set_sd_data(&mut self, tag: &str, value: &str) {
        match self.sd_data.iter_mut().find(|(t, _)| t == tag) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.sd_data.push((tag.to_string(), value.to_string())),
        }
    }

    /// Copies every tag of `source` onto this molecule, keeping source order.
    pub fn copy_sd_data_from(&mut self, source: &Molecule) {
        for (tag, value) in &source.sd_data {
            self.set_sd_data(tag, value);
        }
    }

    #[inline]
    pub fn conformer_count(&self) -> usize {
        1 + self.extra_conformers.len()
    }

    /// Adds a conformer given as one coordinate per atom, in atom order.
    pub fn add_conformer(&mut self, positions: Vec<Point3<f64>>) -> Result<(), MoleculeError> {
        if positions.len() != self.atoms.len() {
            return Err(MoleculeError::ConformerSizeMismatch {
                expected: self.atoms.len(),
                actual: positions.len(),
            });
        }
        self.extra_conformers.push(positions);
        Ok(())
    }

    /// Drops conformers beyond the first `count` (at least one is always kept).
    pub fn truncate_conformers(&mut self, count: usize) {
        self.extra_conformers.truncate(count.saturating_sub(1));
    }

    /// Expands the record into one single-conformer molecule per conformer.
    pub fn conformers(&self) -> Vec<Molecule> {
        let mut expanded = Vec::with_capacity(self.conformer_count());
        let mut first = self.clone();
        first.extra_conformers.clear();
        for positions in &self.extra_conformers {
            let mut copy = first.clone();
            for (atom, position) in copy.atoms.iter_mut().zip(positions) {
                atom.position = *position;
            }
            expanded.push(copy);
        }
        expanded.insert(0, first);
        expanded
    }
}
