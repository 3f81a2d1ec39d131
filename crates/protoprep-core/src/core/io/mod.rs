//! Provides input/output functionality for small-molecule file formats.
//!
//! The mol2, SDF and PDB codecs all read and write whole multi-record files
//! through the [`traits::MolecularFile`] interface. [`read_structures`] and
//! [`write_structures`] pick the codec from the file extension. The ligand
//! table reader and the state penalty report writer live here as well, since
//! they are plain file formats without any pipeline logic.

pub mod error;
pub mod ligand_table;
pub mod mol2;
pub mod pdb;
pub mod report;
pub mod sdf;
pub mod traits;

use crate::core::models::molecule::Molecule;
use error::StructureIoError;
use std::fmt;
use std::path::Path;
use traits::MolecularFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructureFormat {
    Pdb,
    Sdf,
    Mol2,
    /// Maestro, the native format of the enumerator. Converted, never parsed.
    Mae,
}

impl StructureFormat {
    /// Infers the format from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "pdb" | "ent" => Some(Self::Pdb),
            "sdf" | "sd" | "mol" => Some(Self::Sdf),
            "mol2" => Some(Self::Mol2),
            "mae" | "maegz" => Some(Self::Mae),
            _ => None,
        }
    }
}

impl fmt::Display for StructureFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureFormat::Pdb => write!(f, "PDB"),
            StructureFormat::Sdf => write!(f, "SDF"),
            StructureFormat::Mol2 => write!(f, "MOL2"),
            StructureFormat::Mae => write!(f, "MAE"),
        }
    }
}

fn format_of(path: &Path) -> Result<StructureFormat, StructureIoError> {
    StructureFormat::from_path(path)
        .ok_or_else(|| StructureIoError::UnknownExtension(path.display().to_string()))
}

/// Reads every record of a structure file, choosing the codec by extension.
pub fn read_structures(path: &Path) -> Result<Vec<Molecule>, StructureIoError> {
    match format_of(path)? {
        StructureFormat::Pdb => pdb::PdbFile::read_all_from_path(path),
        StructureFormat::Sdf => sdf::SdfFile::read_all_from_path(path),
        StructureFormat::Mol2 => mol2::Mol2File::read_all_from_path(path),
        StructureFormat::Mae => Err(StructureIoError::UnsupportedFormat(StructureFormat::Mae)),
    }
}

/// Reads the first record of a structure file, choosing the codec by extension.
pub fn read_structure(path: &Path) -> Result<Molecule, StructureIoError> {
    let format = format_of(path)?;
    read_structures(path)?
        .into_iter()
        .next()
        .ok_or(StructureIoError::NoRecords(format))
}

/// Writes records to a structure file, choosing the codec by extension.
pub fn write_structures(path: &Path, molecules: &[Molecule]) -> Result<(), StructureIoError> {
    match format_of(path)? {
        StructureFormat::Pdb => pdb::PdbFile::write_all_to_path(molecules, path),
        StructureFormat::Sdf => sdf::SdfFile::write_all_to_path(molecules, path),
        StructureFormat::Mol2 => mol2::Mol2File::write_all_to_path(molecules, path),
        StructureFormat::Mae => Err(StructureIoError::UnsupportedFormat(StructureFormat::Mae)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::atom::Atom;
    use crate::core::models::topology::BondOrder;
    use nalgebra::Point3;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[test]
    fn format_is_inferred_from_extension() {
        let cases = [
            ("a.pdb", Some(StructureFormat::Pdb)),
            ("a.SDF", Some(StructureFormat::Sdf)),
            ("a.mol", Some(StructureFormat::Sdf)),
            ("dir/a.mol2", Some(StructureFormat::Mol2)),
            ("a-epik.mae", Some(StructureFormat::Mae)),
            ("a.xyz", None),
            ("noext", None),
        ];
        for (path, expected) in cases {
            assert_eq!(StructureFormat::from_path(&PathBuf::from(path)), expected, "{path}");
        }
    }

    #[test]
    fn dispatch_writes_and_reads_each_codec() {
        let dir = tempdir().unwrap();
        let mut molecule = Molecule::new("MOL");
        let c = molecule.add_atom(Atom::new("C1", "C", Point3::new(0.0, 0.0, 0.0)));
        let o = molecule.add_atom(Atom::new("O1", "O", Point3::new(1.2, 0.0, 0.0)));
        molecule.add_bond(c, o, BondOrder::Double).unwrap();

        for file_name in ["m.pdb", "m.sdf", "m.mol2"] {
            let path = dir.path().join(file_name);
            write_structures(&path, std::slice::from_ref(&molecule)).unwrap();
            let read = read_structure(&path).unwrap();
            assert_eq!(read.atom_count(), 2, "{file_name}");
            assert_eq!(read.bond_count(), 1, "{file_name}");
        }
    }

    #[test]
    fn maestro_and_unknown_files_are_rejected() {
        let dir = tempdir().unwrap();
        let mae = dir.path().join("x.mae");
        std::fs::write(&mae, "{}").unwrap();
        assert!(matches!(
            read_structures(&mae),
            Err(StructureIoError::UnsupportedFormat(StructureFormat::Mae))
        ));
        assert!(matches!(
            read_structures(&dir.path().join("x.xyz")),
            Err(StructureIoError::UnknownExtension(_))
        ));
    }
}
