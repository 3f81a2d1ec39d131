use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One row of the ligand table: a display name, a SMILES string and a
/// secondary identifier that the pipeline carries but never uses.
///
/// Columns are matched by position; header names are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LigandRecord {
    pub name: String,
    pub smiles: String,
    #[serde(default)]
    pub chem_id: String,
}

/// Reads every row of a ligand table with a header line.
pub fn read_ligand_table(path: &Path) -> Result<Vec<LigandRecord>, csv::Error> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    collect_records(reader)
}

/// Reads a ligand table from any reader.
pub fn read_ligand_table_from<R: Read>(source: R) -> Result<Vec<LigandRecord>, csv::Error> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);
    collect_records(reader)
}

fn collect_records<R: Read>(mut reader: csv::Reader<R>) -> Result<Vec<LigandRecord>, csv::Error> {
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.iter().all(str::is_empty) {
            continue;
        }
        records.push(row.deserialize(None)?);
    }
    Ok(records)
}
