use super::StructureFormat;
use super::error::StructureIoError;
use super::traits::{MolecularFile, numbered_lines};
use crate::core::chem::elements::guess_element_symbol;
use crate::core::models::atom::Atom;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;
use nalgebra::Point3;
use std::io::{BufRead, Write};

const FORMAT: StructureFormat = StructureFormat::Sdf;
const RECORD_DELIMITER: &str = "$$$$";
const CHARGES_PER_LINE: usize = 8;

/// MDL SD file codec (V2000 connection tables).
///
/// Formal charges come from the atom block charge field and are overridden by
/// `M  CHG` property lines. Data items (`> <tag>`) are kept as SD data on the
/// molecule, in file order; multi-line values are joined with `\n`.
pub struct SdfFile;

impl MolecularFile for SdfFile {
    const FORMAT: StructureFormat = FORMAT;

    fn read_all(reader: &mut impl BufRead) -> Result<Vec<Molecule>, StructureIoError> {
        let lines = numbered_lines(reader)?;
        let mut molecules = Vec::new();
        let mut record: Vec<(usize, String)> = Vec::new();

        for line in lines {
            if line.1.trim_end() == RECORD_DELIMITER {
                if !record.iter().all(|(_, l)| l.trim().is_empty()) {
                    molecules.push(parse_record(&record)?);
                }
                record.clear();
            } else {
                record.push(line);
            }
        }
        if !record.iter().all(|(_, l)| l.trim().is_empty()) {
            molecules.push(parse_record(&record)?);
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

fn parse_record(lines: &[(usize, String)]) -> Result<Molecule, StructureIoError> {
    if lines.len() < 4 {
        return Err(StructureIoError::parse(
            FORMAT,
            lines.last().map(|(ln, _)| *ln).unwrap_or(1),
            "record must contain a header block and a counts line",
        ));
    }

    let mut molecule = Molecule::new(lines[0].1.trim());

    let (counts_line_no, counts_line) = (&lines[3].0, &lines[3].1);
    if counts_line.contains("V3000") {
        return Err(StructureIoError::parse(FORMAT, *counts_line_no, "V3000 is not supported"));
    }
    let (atom_count, bond_count) = parse_counts(counts_line, *counts_line_no)?;

    let atom_start = 4;
    let bond_start = atom_start + atom_count;
    let props_start = bond_start + bond_count;
    if lines.len() < props_start {
        return Err(StructureIoError::parse(
            FORMAT,
            lines.last().map(|(ln, _)| *ln).unwrap_or(*counts_line_no),
            "record ended before atoms/bonds were fully specified",
        ));
    }

    for (ln, raw) in &lines[atom_start..bond_start] {
        molecule.add_atom(parse_atom(raw, *ln)?);
    }
    for (ln, raw) in &lines[bond_start..props_start] {
        parse_bond(&mut molecule, raw, *ln)?;
    }

    let mut cursor = props_start;
    let mut block_charges_cleared = false;
    while cursor < lines.len() {
        let (ln, raw) = &lines[cursor];
        cursor += 1;
        if raw.starts_with("M  END") {
            break;
        }
        if raw.starts_with("M  CHG") {
            // Any CHG line supersedes every atom-block charge code.
            if !block_charges_cleared {
                molecule
                    .atoms_mut()
                    .iter_mut()
                    .for_each(|atom| atom.formal_charge = 0);
                block_charges_cleared = true;
            }
            apply_charge_property(&mut molecule, raw, *ln)?;
        }
    }

    parse_data_items(&mut molecule, &lines[cursor..]);
    Ok(molecule)
}

fn parse_counts(line: &str, line_no: usize) -> Result<(usize, usize), StructureIoError> {
    let padded = format!("{line:<6}");
    let atoms = padded
        .get(0..3)
        .unwrap_or("")
        .trim()
        .parse::<usize>()
        .map_err(|_| StructureIoError::parse(FORMAT, line_no, "invalid atom count"))?;
    let bonds = padded
        .get(3..6)
        .unwrap_or("")
        .trim()
        .parse::<usize>()
        .map_err(|_| StructureIoError::parse(FORMAT, line_no, "invalid bond count"))?;
    Ok((atoms, bonds))
}

fn parse_atom(raw: &str, ln: usize) -> Result<Atom, StructureIoError> {
    let padded = format!("{raw:<39}");
    let field = |start: usize, end: usize| padded.get(start..end).unwrap_or("").trim();
    let coord = |start: usize, axis: &str| {
        field(start, start + 10).parse::<f64>().map_err(|_| {
            StructureIoError::parse(FORMAT, ln, format!("invalid {axis} coordinate in atom line"))
        })
    };
    let position = Point3::new(coord(0, "x")?, coord(10, "y")?, coord(20, "z")?);

    let element = guess_element_symbol(field(31, 34))
        .ok_or_else(|| StructureIoError::parse(FORMAT, ln, "unable to infer element symbol"))?;

    let mut atom = Atom::new("", &element, position);
    atom.formal_charge = match field(36, 39) {
        "" => 0,
        code => code
            .parse::<u8>()
            .ok()
            .and_then(formal_charge_from_code)
            .ok_or_else(|| StructureIoError::parse(FORMAT, ln, "invalid charge field"))?,
    };
    Ok(atom)
}

fn formal_charge_from_code(code: u8) -> Option<i8> {
    match code {
        0 | 4 => Some(0),
        1 => Some(3),
        2 => Some(2),
        3 => Some(1),
        5 => Some(-1),
        6 => Some(-2),
        7 => Some(-3),
        _ => None,
    }
}

fn parse_bond(molecule: &mut Molecule, raw: &str, ln: usize) -> Result<(), StructureIoError> {
    let padded = format!("{raw:<9}");
    let field = |start: usize| padded.get(start..start + 3).unwrap_or("").trim();
    let index = |start: usize, what: &str| {
        field(start)
            .parse::<usize>()
            .ok()
            .filter(|idx| (1..=molecule.atom_count()).contains(idx))
            .map(|idx| idx - 1)
            .ok_or_else(|| StructureIoError::parse(FORMAT, ln, format!("invalid {what} atom index")))
    };
    let i = index(0, "first")?;
    let j = index(3, "second")?;
    let order = field(6)
        .parse::<u8>()
        .ok()
        .and_then(BondOrder::from_ctfile)
        .ok_or_else(|| StructureIoError::parse(FORMAT, ln, "unsupported bond order"))?;
    molecule.add_bond(i, j, order)?;
    Ok(())
}

fn apply_charge_property(
    molecule: &mut Molecule,
    raw: &str,
    ln: usize,
) -> Result<(), StructureIoError> {
    let tokens: Vec<_> = raw.split_whitespace().skip(2).collect();
    let count = tokens
        .first()
        .and_then(|t| t.parse::<usize>().ok())
        .ok_or_else(|| StructureIoError::parse(FORMAT, ln, "invalid M  CHG entry count"))?;
    if tokens.len() < 1 + 2 * count {
        return Err(StructureIoError::parse(FORMAT, ln, "truncated M  CHG line"));
    }

    let atom_count = molecule.atom_count();
    for pair in tokens[1..1 + 2 * count].chunks(2) {
        let idx = pair[0]
            .parse::<usize>()
            .ok()
            .filter(|idx| (1..=atom_count).contains(idx))
            .ok_or_else(|| StructureIoError::parse(FORMAT, ln, "M  CHG references unknown atom"))?;
        let charge = pair[1]
            .parse::<i8>()
            .map_err(|_| StructureIoError::parse(FORMAT, ln, "invalid M  CHG charge"))?;
        molecule.atoms_mut()[idx - 1].formal_charge = charge;
    }
    Ok(())
}

/// Extracts the tag from a data header such as `> <i_epik_Tot_Q>` or `>  <NAME> (1)`.
fn data_header_tag(line: &str) -> Option<&str> {
    let rest = line.strip_prefix('>')?;
    let start = rest.find('<')? + 1;
    let end = rest[start..].find('>')? + start;
    Some(&rest[start..end])
}

fn parse_data_items(molecule: &mut Molecule, lines: &[(usize, String)]) {
    let mut cursor = 0;
    while cursor < lines.len() {
        let Some(tag) = data_header_tag(&lines[cursor].1) else {
            cursor += 1;
            continue;
        };
        cursor += 1;
        let mut values = Vec::new();
        while cursor < lines.len() && !lines[cursor].1.trim().is_empty() {
            values.push(lines[cursor].1.trim_end());
            cursor += 1;
        }
        molecule.set_sd_data(tag, &values.join("\n"));
    }
}

fn charge_code(formal_charge: i8) -> u8 {
    match formal_charge {
        3 => 1,
        2 => 2,
        1 => 3,
        -1 => 5,
        -2 => 6,
        -3 => 7,
        _ => 0,
    }
}

fn write_record(molecule: &Molecule, writer: &mut impl Write) -> Result<(), StructureIoError> {
    writeln!(writer, "{}", molecule.title.trim())?;
    writeln!(writer, "  protoprep     3D")?;
    writeln!(writer)?;
    writeln!(
        writer,
        "{:>3}{:>3}  0  0  0  0  0  0  0  0999 V2000",
        molecule.atom_count(),
        molecule.bond_count()
    )?;

    for atom in molecule.atoms() {
        writeln!(
            writer,
            "{:>10.4}{:>10.4}{:>10.4} {:<3} 0{:>3}  0  0  0  0  0  0  0  0  0  0",
            atom.position.x,
            atom.position.y,
            atom.position.z,
            atom.element,
            charge_code(atom.formal_charge)
        )?;
    }

    for bond in molecule.bonds() {
        writeln!(
            writer,
            "{:>3}{:>3}{:>3}  0  0  0  0",
            bond.atom1_idx + 1,
            bond.atom2_idx + 1,
            bond.order.to_ctfile()
        )?;
    }

    let charged: Vec<(usize, i8)> = molecule
        .atoms()
        .iter()
        .enumerate()
        .filter(|(_, a)| a.formal_charge != 0)
        .map(|(idx, a)| (idx + 1, a.formal_charge))
        .collect();
    for chunk in charged.chunks(CHARGES_PER_LINE) {
        write!(writer, "M  CHG{:>3}", chunk.len())?;
        for (idx, charge) in chunk {
            write!(writer, " {idx:>3} {charge:>3}")?;
        }
        writeln!(writer)?;
    }
    writeln!(writer, "M  END")?;

    for (tag, value) in molecule.sd_data() {
        writeln!(writer, "> <{tag}>")?;
        writeln!(writer, "{value}")?;
        writeln!(writer)?;
    }
    writeln!(writer, "{RECORD_DELIMITER}")?;
    Ok(())
}
