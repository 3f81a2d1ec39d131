use super::StructureFormat;
use super::error::StructureIoError;
use super::traits::{MolecularFile, numbered_lines};
use crate::core::chem::elements::{guess_element_symbol, normalize_symbol};
use crate::core::models::atom::Atom;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;
use std::collections::HashMap;
use std::io::{BufRead, Write};

const FORMAT: StructureFormat = StructureFormat::Pdb;
const CONECT_PARTNERS_PER_LINE: usize = 4;

/// PDB codec for small-molecule records (HETATM/ATOM, CONECT).
///
/// Each record ends at `END` or `ENDMDL`. Bond orders are not representable
/// in PDB, so every CONECT bond is read as single.
pub struct PdbFile;

impl MolecularFile for PdbFile {
    const FORMAT: StructureFormat = FORMAT;

    fn read_all(reader: &mut impl BufRead) -> Result<Vec<Molecule>, StructureIoError> {
        let lines = numbered_lines(reader)?;
        let mut molecules = Vec::new();
        let mut parser = RecordParser::default();

        for (ln, line) in &lines {
            let record_type = slice_and_trim(line, 0, 6);
            match record_type {
                "ATOM" | "HETATM" => parser.atom(line, *ln)?,
                "CONECT" => parser.conect(line, *ln),
                "COMPND" | "HEADER" if parser.title.is_empty() => {
                    parser.title = slice_and_trim(line, 10, 80).to_string();
                }
                "END" | "ENDMDL" => {
                    if let Some(molecule) = std::mem::take(&mut parser).finish()? {
                        molecules.push(molecule);
                    }
                }
                _ => {}
            }
        }
        if let Some(molecule) = parser.finish()? {
            molecules.push(molecule);
        }
        Ok(molecules)
    }

    fn write_all(molecules: &[Molecule], writer: &mut impl Write) -> Result<(), StructureIoError> {
        for molecule in molecules {
            for conformer in molecule.conformers() {
                write_record(&conformer, writer)?;
            }
        }
        Ok(())
    }
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start..end).unwrap_or("").trim()
}

#[derive(Default)]
struct RecordParser {
    title: String,
    molecule: Molecule,
    serial_to_index: HashMap<usize, usize>,
    conect: Vec<(usize, usize, usize)>,
}

impl RecordParser {
    fn atom(&mut self, line: &str, ln: usize) -> Result<(), StructureIoError> {
        let serial = slice_and_trim(line, 6, 11)
            .parse::<usize>()
            .map_err(|_| StructureIoError::parse(FORMAT, ln, "invalid atom serial in columns 7-11"))?;
        let name = slice_and_trim(line, 12, 16);
        let residue_name = slice_and_trim(line, 17, 20);
        let residue_number = match slice_and_trim(line, 22, 26) {
            "" => 1,
            value => value.parse::<isize>().map_err(|_| {
                StructureIoError::parse(FORMAT, ln, "invalid residue number in columns 23-26")
            })?,
        };
        let coord = |start: usize, columns: &str| {
            slice_and_trim(line, start, start + 8)
                .parse::<f64>()
                .map_err(|_| {
                    StructureIoError::parse(FORMAT, ln, format!("invalid coordinate in columns {columns}"))
                })
        };
        let position = Point3::new(coord(30, "31-38")?, coord(38, "39-46")?, coord(46, "47-54")?);

        let element = normalize_symbol(slice_and_trim(line, 76, 78))
            .or_else(|| guess_element_symbol(name))
            .ok_or_else(|| StructureIoError::parse(FORMAT, ln, "unable to infer element"))?;

        let mut atom = Atom::new(name, &element, position);
        if !residue_name.is_empty() {
            atom.residue_name = residue_name.to_string();
        }
        atom.residue_number = residue_number;
        atom.formal_charge = parse_charge_field(slice_and_trim(line, 78, 80));

        if self.serial_to_index.contains_key(&serial) {
            return Err(StructureIoError::parse(
                FORMAT,
                ln,
                format!("duplicate atom serial {serial}"),
            ));
        }
        let index = self.molecule.add_atom(atom);
        self.serial_to_index.insert(serial, index);
        Ok(())
    }

    fn conect(&mut self, line: &str, ln: usize) {
        let mut serials = (0..)
            .map(|n| 6 + 5 * n)
            .take_while(|start| *start < line.len())
            .map(|start| slice_and_trim(line, start, start + 5))
            .filter(|field| !field.is_empty())
            .filter_map(|field| field.parse::<usize>().ok());
        if let Some(origin) = serials.next() {
            for partner in serials {
                self.conect.push((ln, origin, partner));
            }
        }
    }

    fn finish(mut self) -> Result<Option<Molecule>, StructureIoError> {
        if self.molecule.atom_count() == 0 {
            return Ok(None);
        }
        for (ln, a, b) in self.conect {
            let lookup = |serial: usize| {
                self.serial_to_index.get(&serial).copied().ok_or_else(|| {
                    StructureIoError::parse(
                        FORMAT,
                        ln,
                        format!("CONECT references unknown atom serial {serial}"),
                    )
                })
            };
            let (i, j) = (lookup(a)?, lookup(b)?);
            if i != j {
                self.molecule.add_bond(i, j, BondOrder::Single)?;
            }
        }
        self.molecule.title = self.title;
        Ok(Some(self.molecule))
    }
}

fn parse_charge_field(field: &str) -> i8 {
    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (Some(d), Some(sign @ ('+' | '-'))) if d.is_ascii_digit() => {
            let magnitude = d.to_digit(10).unwrap_or(0) as i8;
            if sign == '-' { -magnitude } else { magnitude }
        }
        _ => 0,
    }
}

fn format_charge_field(formal_charge: i8) -> String {
    match formal_charge {
        0 => String::new(),
        c if c > 0 => format!("{c}+"),
        c => format!("{}-", -c),
    }
}

/// Aligns an atom name into columns 13-16: names of single-letter elements
/// shorter than four characters start in column 14.
fn format_atom_name(name: &str, element: &str) -> String {
    if name.len() < 4 && element.len() == 1 {
        format!(" {name:<3}")
    } else {
        format!("{name:<4}")
    }
}

fn write_record(molecule: &Molecule, writer: &mut impl Write) -> Result<(), StructureIoError> {
    if !molecule.title.trim().is_empty() {
        writeln!(writer, "COMPND    {}", molecule.title.trim())?;
    }

    for (idx, atom) in molecule.atoms().iter().enumerate() {
        let name = if atom.name.trim().is_empty() {
            atom.element.as_str()
        } else {
            atom.name.trim()
        };
        writeln!(
            writer,
            "HETATM{:>5} {}{}{:>3} {}{:>4}{}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}{:<2}",
            idx + 1,
            format_atom_name(name, &atom.element),
            ' ',
            atom.residue_name,
            ' ',
            atom.residue_number,
            ' ',
            atom.position.x,
            atom.position.y,
            atom.position.z,
            1.0,
            0.0,
            atom.element.to_ascii_uppercase(),
            format_charge_field(atom.formal_charge)
        )?;
    }

    let adjacency = molecule.adjacency();
    for (idx, partners) in adjacency.iter().enumerate() {
        let mut partners: Vec<usize> = partners.iter().map(|(p, _)| p + 1).collect();
        partners.sort_unstable();
        for chunk in partners.chunks(CONECT_PARTNERS_PER_LINE) {
            write!(writer, "CONECT{:>5}", idx + 1)?;
            for partner in chunk {
                write!(writer, "{partner:>5}")?;
            }
            writeln!(writer)?;
        }
    }
    writeln!(writer, "END")?;
    Ok(())
}
