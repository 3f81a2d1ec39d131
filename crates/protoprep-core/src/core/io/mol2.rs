use super::StructureFormat;
use super::error::StructureIoError;
use super::traits::{MolecularFile, numbered_lines};
use crate::core::chem::elements::guess_element_symbol;
use crate::core::models::atom::{Atom, UNASSIGNED_RESIDUE_NAME};
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;
use std::collections::HashMap;
use std::io::{BufRead, Write};
use std::path::Path;

const MOLECULE_SECTION: &str = "@<TRIPOS>MOLECULE";
const ATOM_SECTION: &str = "@<TRIPOS>ATOM";
const BOND_SECTION: &str = "@<TRIPOS>BOND";
const SUBSTRUCTURE_SECTION: &str = "@<TRIPOS>SUBSTRUCTURE";
const EMPTY_TITLE: &str = "*****";
const UNNAMED_SUBSTRUCTURE: &str = "<0>";

const FORMAT: StructureFormat = StructureFormat::Mol2;

/// Tripos mol2 codec.
///
/// Writes the general force-field flavour: one MOLECULE block per conformer,
/// `SMALL` / `USER_CHARGES` headers, Tripos type names in the ATOM and BOND
/// sections and one SUBSTRUCTURE entry per residue.
pub struct Mol2File;

impl MolecularFile for Mol2File {
    const FORMAT: StructureFormat = FORMAT;

    fn read_all(reader: &mut impl BufRead) -> Result<Vec<Molecule>, StructureIoError> {
        let lines = numbered_lines(reader)?;
        let starts: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, (_, line))| is_section(line, MOLECULE_SECTION))
            .map(|(idx, _)| idx)
            .collect();

        let mut molecules = Vec::with_capacity(starts.len());
        for (n, &start) in starts.iter().enumerate() {
            let end = starts.get(n + 1).copied().unwrap_or(lines.len());
            molecules.push(parse_block(&lines[start..end])?);
        }
        Ok(molecules)
    }

    fn write_all(molecules: &[Molecule], writer: &mut impl Write) -> Result<(), StructureIoError> {
        for molecule in molecules {
            for conformer in molecule.conformers() {
                write_block(&conformer, writer)?;
            }
        }
        Ok(())
    }
}

/// Writes molecules to a mol2 file with their atom names untouched and every
/// residue (substructure) named `residue_name`.
pub fn write_mol2_preserving_atom_names(
    path: &Path,
    molecules: &[Molecule],
    residue_name: &str,
) -> Result<(), StructureIoError> {
    let relabelled: Vec<Molecule> = molecules
        .iter()
        .map(|molecule| {
            let mut copy = molecule.clone();
            copy.set_residue_name(residue_name);
            copy
        })
        .collect();
    Mol2File::write_all_to_path(&relabelled, path)
}

fn is_section(line: &str, name: &str) -> bool {
    line.trim().eq_ignore_ascii_case(name)
}

fn section_body<'a>(block: &'a [(usize, String)], name: &str) -> Option<&'a [(usize, String)]> {
    let start = block.iter().position(|(_, line)| is_section(line, name))? + 1;
    let len = block[start..]
        .iter()
        .position(|(_, line)| line.trim_start().starts_with("@<TRIPOS>"))
        .unwrap_or(block.len() - start);
    Some(&block[start..start + len])
}

fn data_lines(section: &[(usize, String)]) -> impl Iterator<Item = &(usize, String)> {
    section.iter().filter(|(_, line)| {
        let trimmed = line.trim();
        !trimmed.is_empty() && !trimmed.starts_with('#')
    })
}

fn parse_block(block: &[(usize, String)]) -> Result<Molecule, StructureIoError> {
    let header_line = block[0].0;
    let title = block
        .get(1)
        .map(|(_, line)| line.trim())
        .filter(|t| *t != EMPTY_TITLE)
        .unwrap_or("");
    let mut molecule = Molecule::new(title);

    let (count_line_no, count_line) = block
        .iter()
        .skip(2)
        .find(|(_, line)| !line.trim().is_empty())
        .ok_or_else(|| StructureIoError::parse(FORMAT, header_line + 2, "missing counts line"))?;
    let (atom_count, bond_count) = parse_counts(count_line, *count_line_no)?;

    let atom_section = section_body(block, ATOM_SECTION).ok_or_else(|| {
        StructureIoError::parse(FORMAT, header_line, "missing @<TRIPOS>ATOM section")
    })?;
    let id_map = parse_atoms(&mut molecule, atom_section, atom_count, header_line)?;

    if bond_count > 0 {
        let bond_section = section_body(block, BOND_SECTION).ok_or_else(|| {
            StructureIoError::parse(FORMAT, header_line, "missing @<TRIPOS>BOND section")
        })?;
        parse_bonds(&mut molecule, bond_section, bond_count, &id_map, header_line)?;
    }

    Ok(molecule)
}

fn parse_counts(line: &str, line_no: usize) -> Result<(usize, usize), StructureIoError> {
    let parts: Vec<_> = line.split_whitespace().collect();
    let atoms = parts
        .first()
        .and_then(|v| v.parse::<usize>().ok())
        .ok_or_else(|| StructureIoError::parse(FORMAT, line_no, "invalid atom count"))?;
    let bonds = match parts.get(1) {
        Some(v) => v
            .parse::<usize>()
            .map_err(|_| StructureIoError::parse(FORMAT, line_no, "invalid bond count"))?,
        None => 0,
    };
    Ok((atoms, bonds))
}

fn parse_atoms(
    molecule: &mut Molecule,
    section: &[(usize, String)],
    expected: usize,
    header_line: usize,
) -> Result<HashMap<usize, usize>, StructureIoError> {
    let mut id_map = HashMap::with_capacity(expected);
    let mut lines = data_lines(section);

    for _ in 0..expected {
        let (ln, raw) = lines.next().ok_or_else(|| {
            StructureIoError::parse(
                FORMAT,
                section.last().map(|(ln, _)| *ln).unwrap_or(header_line),
                "ATOM section ended before expected atom count",
            )
        })?;
        let ln = *ln;
        let parts: Vec<_> = raw.split_whitespace().collect();
        if parts.len() < 6 {
            return Err(StructureIoError::parse(FORMAT, ln, "invalid ATOM line"));
        }

        let atom_id = parts[0]
            .parse::<usize>()
            .map_err(|_| StructureIoError::parse(FORMAT, ln, "invalid atom id"))?;
        let coord = |i: usize, axis: &str| {
            parts[i].parse::<f64>().map_err(|_| {
                StructureIoError::parse(FORMAT, ln, format!("invalid {axis} coordinate"))
            })
        };
        let position = Point3::new(coord(2, "x")?, coord(3, "y")?, coord(4, "z")?);

        let element = guess_element_symbol(parts[5])
            .or_else(|| guess_element_symbol(parts[1]))
            .ok_or_else(|| StructureIoError::parse(FORMAT, ln, "unable to infer element"))?;

        let mut atom = Atom::new(parts[1], &element, position);
        atom.tripos_type = parts[5].to_string();
        if let Some(subst_id) = parts.get(6) {
            atom.residue_number = subst_id
                .parse::<isize>()
                .map_err(|_| StructureIoError::parse(FORMAT, ln, "invalid substructure id"))?;
        }
        if let Some(subst_name) = parts.get(7).filter(|name| **name != UNNAMED_SUBSTRUCTURE) {
            atom.residue_name = subst_name.to_string();
        } else {
            atom.residue_name = UNASSIGNED_RESIDUE_NAME.to_string();
        }
        if let Some(charge) = parts.get(8) {
            atom.partial_charge = charge
                .parse::<f64>()
                .map_err(|_| StructureIoError::parse(FORMAT, ln, "invalid partial charge"))?;
        }

        id_map.insert(atom_id, molecule.add_atom(atom));
    }

    Ok(id_map)
}

fn parse_bonds(
    molecule: &mut Molecule,
    section: &[(usize, String)],
    expected: usize,
    id_map: &HashMap<usize, usize>,
    header_line: usize,
) -> Result<(), StructureIoError> {
    let mut lines = data_lines(section);

    for _ in 0..expected {
        let (ln, raw) = lines.next().ok_or_else(|| {
            StructureIoError::parse(
                FORMAT,
                section.last().map(|(ln, _)| *ln).unwrap_or(header_line),
                "BOND section ended before expected bond count",
            )
        })?;
        let ln = *ln;
        let parts: Vec<_> = raw.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(StructureIoError::parse(FORMAT, ln, "invalid BOND line"));
        }

        let lookup = |token: &str| {
            token
                .parse::<usize>()
                .ok()
                .and_then(|id| id_map.get(&id).copied())
                .ok_or_else(|| StructureIoError::parse(FORMAT, ln, "bond references unknown atom id"))
        };
        let i = lookup(parts[1])?;
        let j = lookup(parts[2])?;
        let order = BondOrder::from_mol2(parts[3])
            .ok_or_else(|| StructureIoError::parse(FORMAT, ln, "unsupported bond type"))?;

        let bond_idx = molecule.add_bond(i, j, order)?;
        molecule.bonds_mut()[bond_idx].tripos_type = parts[3].to_ascii_lowercase();
    }

    Ok(())
}

/// Residues in order of first appearance, with the 1-based id of their first atom.
fn substructures(molecule: &Molecule) -> Vec<(isize, &str, usize)> {
    let mut seen: Vec<(isize, &str, usize)> = Vec::new();
    for (idx, atom) in molecule.atoms().iter().enumerate() {
        let key = (atom.residue_number, atom.residue_name.as_str());
        if !seen.iter().any(|(n, name, _)| (*n, *name) == key) {
            seen.push((key.0, key.1, idx + 1));
        }
    }
    seen
}

fn write_block(molecule: &Molecule, writer: &mut impl Write) -> Result<(), StructureIoError> {
    let substructures = substructures(molecule);
    let title = if molecule.title.trim().is_empty() {
        EMPTY_TITLE
    } else {
        molecule.title.trim()
    };

    writeln!(writer, "{MOLECULE_SECTION}")?;
    writeln!(writer, "{title}")?;
    writeln!(
        writer,
        "{:>5} {:>5} {:>5} {:>5} {:>5}",
        molecule.atom_count(),
        molecule.bond_count(),
        substructures.len(),
        0,
        0
    )?;
    writeln!(writer, "SMALL")?;
    writeln!(writer, "USER_CHARGES")?;
    writeln!(writer)?;

    writeln!(writer, "{ATOM_SECTION}")?;
    for (idx, atom) in molecule.atoms().iter().enumerate() {
        let name = if atom.name.trim().is_empty() {
            atom.element.as_str()
        } else {
            atom.name.trim()
        };
        let tripos_type = if atom.tripos_type.is_empty() {
            atom.element.as_str()
        } else {
            atom.tripos_type.as_str()
        };
        writeln!(
            writer,
            "{:>7} {:<8} {:>10.4} {:>10.4} {:>10.4} {:<8} {:>3} {:<8} {:>10.4}",
            idx + 1,
            name,
            atom.position.x,
            atom.position.y,
            atom.position.z,
            tripos_type,
            atom.residue_number,
            atom.residue_name,
            atom.partial_charge
        )?;
    }

    writeln!(writer, "{BOND_SECTION}")?;
    for (idx, bond) in molecule.bonds().iter().enumerate() {
        writeln!(
            writer,
            "{:>6}{:>6}{:>6} {}",
            idx + 1,
            bond.atom1_idx + 1,
            bond.atom2_idx + 1,
            bond.mol2_type()
        )?;
    }

    writeln!(writer, "{SUBSTRUCTURE_SECTION}")?;
    for (idx, (_, name, root)) in substructures.iter().enumerate() {
        writeln!(
            writer,
            "{:>6} {:<8} {:>6} TEMP              0 ****  ****    0 ROOT",
            idx + 1,
            name,
            root
        )?;
    }
    writeln!(writer)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const ACETATE: &str = "\
@<TRIPOS>MOLECULE
ACT
    4     3     1     0     0
SMALL
USER_CHARGES

@<TRIPOS>ATOM
      1 C1           0.0000     0.0000     0.0000 C.3        1 ACT        -0.1000
      2 C2           1.5000     0.0000     0.0000 C.2        1 ACT         0.2000
      3 O1           2.1000     1.0000     0.0000 O.co2      1 ACT        -0.5500
      4 O2           2.1000    -1.0000     0.0000 O.co2      1 ACT        -0.5500
@<TRIPOS>BOND
     1     1     2 1
     2     2     3 2
     3     2     4 1
@<TRIPOS>SUBSTRUCTURE
     1 ACT           1 TEMP              0 ****  ****    0 ROOT
";

    #[test]
    fn reads_atoms_bonds_and_substructure_labels() {
        let molecule = Mol2File::read_first(&mut Cursor::new(ACETATE)).unwrap();
        assert_eq!(molecule.title, "ACT");
        assert_eq!(molecule.atom_count(), 4);
        assert_eq!(molecule.bond_count(), 3);
        assert_eq!(molecule.atoms()[2].name, "O1");
        assert_eq!(molecule.atoms()[2].element, "O");
        assert_eq!(molecule.atoms()[2].tripos_type, "O.co2");
        assert!((molecule.atoms()[1].partial_charge - 0.2).abs() < 1e-9);
        assert_eq!(molecule.residue_name(), Some("ACT"));
        assert_eq!(molecule.bonds()[1].order, BondOrder::Double);
        assert!((molecule.total_partial_charge() + 1.0).abs() < 1e-9);
    }

    #[test]
    fn reads_multiple_blocks_in_order() {
        let two = format!("{ACETATE}\n{}", ACETATE.replacen("ACT\n", "ACT2\n", 1));
        let molecules = Mol2File::read_all(&mut Cursor::new(two)).unwrap();
        assert_eq!(molecules.len(), 2);
        assert_eq!(molecules[0].title, "ACT");
        assert_eq!(molecules[1].title, "ACT2");
    }

    #[test]
    fn written_file_preserves_atom_count_and_residue_tag() {
        let original = Mol2File::read_first(&mut Cursor::new(ACETATE)).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acetate.mol2");
        write_mol2_preserving_atom_names(&path, std::slice::from_ref(&original), "NAD").unwrap();

        let reread = Mol2File::read_first_from_path(&path).unwrap();
        assert_eq!(reread.atom_count(), original.atom_count());
        assert!(reread.atoms().iter().all(|a| a.residue_name == "NAD"));
        let names: Vec<_> = reread.atoms().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["C1", "C2", "O1", "O2"]);
        assert_eq!(reread.bonds()[1].order, BondOrder::Double);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("USER_CHARGES"));
        assert!(text.contains("     1 NAD           1 TEMP"));
    }

    #[test]
    fn extra_conformers_become_separate_blocks() {
        let mut molecule = Mol2File::read_first(&mut Cursor::new(ACETATE)).unwrap();
        let shifted: Vec<_> = molecule
            .atoms()
            .iter()
            .map(|a| a.position + nalgebra::Vector3::new(0.0, 0.0, 1.0))
            .collect();
        molecule.add_conformer(shifted).unwrap();

        let mut buffer = Vec::new();
        Mol2File::write_all(&[molecule], &mut buffer).unwrap();
        let reread = Mol2File::read_all(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(reread.len(), 2);
        assert!((reread[1].atoms()[0].position.z - 1.0).abs() < 1e-4);
    }

    #[test]
    fn empty_title_round_trips_as_placeholder() {
        let mut molecule = Molecule::new("");
        molecule.add_atom(Atom::new("", "Na", Point3::origin()));
        let mut buffer = Vec::new();
        Mol2File::write_all(&[molecule], &mut buffer).unwrap();
        let text = String::from_utf8(buffer.clone()).unwrap();
        assert!(text.contains("\n*****\n"));

        let reread = Mol2File::read_first(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(reread.title, "");
        assert_eq!(reread.atoms()[0].name, "Na");
        assert_eq!(reread.atoms()[0].element, "Na");
    }

    #[test]
    fn truncated_atom_section_is_a_parse_error() {
        let broken = ACETATE.replace(
            "      4 O2           2.1000    -1.0000     0.0000 O.co2      1 ACT        -0.5500\n",
            "",
        );
        let err = Mol2File::read_all(&mut Cursor::new(broken)).unwrap_err();
        assert!(matches!(err, StructureIoError::Parse { .. }), "{err}");
    }

    #[test]
    fn unknown_bond_atom_is_a_parse_error() {
        let broken = ACETATE.replace("     3     2     4 1", "     3     2     9 1");
        let err = Mol2File::read_all(&mut Cursor::new(broken)).unwrap_err();
        assert!(err.to_string().contains("unknown atom id"));
    }
}
