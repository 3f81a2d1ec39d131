use crate::error::{CliError, Result};
use protoprep::engine::config::MoleculeRequest;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One `[[molecules]]` entry: a name plus at most one input source.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileMoleculeEntry {
    pub name: String,
    pub structure_file: Option<PathBuf>,
    pub smiles: Option<String>,
    pub reference_code: Option<String>,
}

impl From<FileMoleculeEntry> for MoleculeRequest {
    fn from(entry: FileMoleculeEntry) -> Self {
        Self {
            name: entry.name,
            structure_file: entry.structure_file,
            smiles: entry.smiles,
            reference_code: entry.reference_code,
        }
    }
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileToolchainConfig {
    pub schrodinger: Option<PathBuf>,
    /// Charge engine command line with `{input}`/`{output}` placeholders.
    pub charge_command: Option<String>,
    /// Conformer expansion run before charging, with `{input}`, `{output}`,
    /// `{max_conformers}` and `{strict_stereo}`. An empty line disables it.
    pub expansion_command: Option<String>,
    /// PDB to mol2 conversion with bond perception, `{input}`/`{output}`.
    pub perception_command: Option<String>,
    /// 3D generator command line with `{smiles}`/`{output}` placeholders.
    pub conformer_command: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileEnumerationConfig {
    pub tautomerize: Option<bool>,
    pub max_structures: Option<usize>,
    pub max_energy_penalty: Option<f64>,
    pub retain_input: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileRetrievalConfig {
    pub ligand_expo_url: Option<String>,
}

/// The TOML configuration file. Every field is optional; omitted values fall
/// back to the defaults or must be given on the command line.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct PartialAppConfig {
    pub ligand_table: Option<PathBuf>,
    pub output_root: Option<PathBuf>,
    pub ph_values: Option<Vec<f64>>,
    pub molecules: Option<Vec<FileMoleculeEntry>>,
    pub toolchain: Option<FileToolchainConfig>,
    pub enumeration: Option<FileEnumerationConfig>,
    pub retrieval: Option<FileRetrievalConfig>,
}

impl PartialAppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
