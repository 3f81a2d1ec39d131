use super::StructureFormat;
use super::error::StructureIoError;
use crate::core::models::molecule::Molecule;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Defines the interface for reading and writing multi-record structure files.
///
/// Every supported format may hold several molecules per file (an enumerated
/// ensemble, for instance). Implementors parse and serialize whole files;
/// single-record helpers are provided on top.
pub trait MolecularFile {
    /// The format handled by the implementor, used in error reports.
    const FORMAT: StructureFormat;

    /// Reads every record from a buffered reader, in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or I/O operations encounter issues.
    fn read_all(reader: &mut impl BufRead) -> Result<Vec<Molecule>, StructureIoError>;

    /// Writes records to a writer, in slice order.
    ///
    /// A molecule holding extra conformers is written as one record per
    /// conformer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_all(molecules: &[Molecule], writer: &mut impl Write) -> Result<(), StructureIoError>;

    /// Reads the first record from a buffered reader.
    ///
    /// # Errors
    ///
    /// Returns [`StructureIoError::NoRecords`] if the input holds no records.
    fn read_first(reader: &mut impl BufRead) -> Result<Molecule, StructureIoError> {
        Self::read_all(reader)?
            .into_iter()
            .next()
            .ok_or(StructureIoError::NoRecords(Self::FORMAT))
    }

    fn read_all_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Molecule>, StructureIoError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_all(&mut reader)
    }

    fn read_first_from_path<P: AsRef<Path>>(path: P) -> Result<Molecule, StructureIoError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_first(&mut reader)
    }

    fn write_all_to_path<P: AsRef<Path>>(
        molecules: &[Molecule],
        path: P,
    ) -> Result<(), StructureIoError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_all(molecules, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Collects all lines of a reader together with their 1-based line numbers.
pub(crate) fn numbered_lines(
    reader: &mut impl BufRead,
) -> Result<Vec<(usize, String)>, StructureIoError> {
    reader
        .lines()
        .enumerate()
        .map(|(i, line)| line.map(|content| (i + 1, content)).map_err(Into::into))
        .collect()
}
