use super::tools::command::CommandTemplate;
use crate::core::io::ligand_table::LigandRecord;
use std::path::PathBuf;
use thiserror::Error;

/// Default base URL of the Ligand Expo chemical component reports.
pub const DEFAULT_LIGAND_EXPO_URL: &str = "http://ligand-expo.rcsb.org/reports";

/// Energy ceiling (in kT) above which enumerated states are discarded.
pub const MAX_ENERGY_PENALTY_KT: f64 = 10.0;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error(
        "Molecule '{name}' must have exactly one of structure file, SMILES or reference code ({provided} given)"
    )]
    AmbiguousInput { name: String, provided: usize },
    #[error("Invalid value for {parameter}: {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

/// Options passed to the protonation-state enumerator.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumerationConfig {
    pub tautomerize: bool,
    pub max_structures: usize,
    /// States whose penalty exceeds this many kT are not reported.
    pub max_energy_penalty: f64,
    /// Keep the input state in the output even if it is above the ceiling.
    pub retain_input: bool,
}

impl EnumerationConfig {
    /// The minimum relative probability of a reported state, `exp(-penalty)`.
    pub fn min_probability(&self) -> f64 {
        (-self.max_energy_penalty).exp()
    }
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            tautomerize: false,
            max_structures: 100,
            max_energy_penalty: MAX_ENERGY_PENALTY_KT,
            retain_input: true,
        }
    }
}

/// Options passed to the charge engine for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeOptions {
    pub max_conformers: usize,
    pub strict_stereo: bool,
    /// Rename atoms Tripos-style when any atom is unnamed.
    pub normalize: bool,
    /// Number of conformers kept on the charged molecule; `None` keeps all.
    pub keep_conformers: Option<usize>,
}

impl ChargeOptions {
    /// Options for charging a freshly prepared input structure.
    pub fn initial() -> Self {
        Self {
            max_conformers: 800,
            strict_stereo: true,
            normalize: true,
            keep_conformers: Some(1),
        }
    }

    /// Options for recharging each enumerated state.
    pub fn recharge() -> Self {
        Self {
            max_conformers: 800,
            strict_stereo: false,
            normalize: true,
            keep_conformers: None,
        }
    }
}

/// Where the input structure of a molecule comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSelector {
    StructureFile(PathBuf),
    Smiles(String),
    ReferenceCode(String),
}

/// A named molecule to prepare, with its candidate input sources.
///
/// Exactly one source must be set by the time the pipeline runs; see
/// [`MoleculeRequest::selector`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoleculeRequest {
    pub name: String,
    pub structure_file: Option<PathBuf>,
    pub smiles: Option<String>,
    pub reference_code: Option<String>,
}

impl MoleculeRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_structure_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.structure_file = Some(path.into());
        self
    }

    pub fn with_smiles(mut self, smiles: impl Into<String>) -> Self {
        self.smiles = Some(smiles.into());
        self
    }

    pub fn with_reference_code(mut self, code: impl Into<String>) -> Self {
        self.reference_code = Some(code.into());
        self
    }

    fn source_count(&self) -> usize {
        [
            self.structure_file.is_some(),
            self.smiles.is_some(),
            self.reference_code.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }

    pub fn has_source(&self) -> bool {
        self.source_count() > 0
    }

    /// Resolves the single configured input source.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AmbiguousInput`] when zero or several sources are set.
    pub fn selector(&self) -> Result<InputSelector, ConfigError> {
        match (&self.structure_file, &self.smiles, &self.reference_code) {
            (Some(path), None, None) => Ok(InputSelector::StructureFile(path.clone())),
            (None, Some(smiles), None) => Ok(InputSelector::Smiles(smiles.clone())),
            (None, None, Some(code)) => Ok(InputSelector::ReferenceCode(code.clone())),
            _ => Err(ConfigError::AmbiguousInput {
                name: self.name.clone(),
                provided: self.source_count(),
            }),
        }
    }
}

/// Which ligand table rows are processed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MoleculeSelection {
    /// Every row, each from its own SMILES string.
    #[default]
    All,
    /// Only the listed names. An entry without its own source uses the SMILES
    /// string of the matching row.
    Only(Vec<MoleculeRequest>),
}

impl MoleculeSelection {
    /// Builds the request for a table row, or `None` when the row is not selected.
    pub fn request_for(&self, record: &LigandRecord) -> Option<MoleculeRequest> {
        match self {
            MoleculeSelection::All => Some(MoleculeRequest::new(&record.name).with_smiles(&record.smiles)),
            MoleculeSelection::Only(entries) => {
                let entry = entries.iter().find(|entry| entry.name == record.name)?;
                if entry.has_source() {
                    Some(entry.clone())
                } else {
                    Some(MoleculeRequest::new(&record.name).with_smiles(&record.smiles))
                }
            }
        }
    }

    /// Names of selected entries that do not occur in `records`.
    pub fn unmatched_names<'a>(&'a self, records: &[LigandRecord]) -> Vec<&'a str> {
        match self {
            MoleculeSelection::All => Vec::new(),
            MoleculeSelection::Only(entries) => entries
                .iter()
                .filter(|entry| !records.iter().any(|r| r.name == entry.name))
                .map(|entry| entry.name.as_str())
                .collect(),
        }
    }
}

/// Settings of the per-molecule pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub enumeration: EnumerationConfig,
    pub ligand_expo_base_url: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            enumeration: EnumerationConfig::default(),
            ligand_expo_base_url: DEFAULT_LIGAND_EXPO_URL.to_string(),
        }
    }
}

/// Settings of a whole batch: the inputs, the pH conditions and the output root.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchConfig {
    pub ligand_table: PathBuf,
    pub output_root: PathBuf,
    pub ph_values: Vec<f64>,
    pub selection: MoleculeSelection,
    pub pipeline: PipelineConfig,
}

#[derive(Default)]
pub struct BatchConfigBuilder {
    ligand_table: Option<PathBuf>,
    output_root: Option<PathBuf>,
    ph_values: Vec<f64>,
    selection: Option<MoleculeSelection>,
    pipeline: Option<PipelineConfig>,
}

impl BatchConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ligand_table(mut self, path: PathBuf) -> Self {
        self.ligand_table = Some(path);
        self
    }
    pub fn output_root(mut self, path: PathBuf) -> Self {
        self.output_root = Some(path);
        self
    }
    pub fn ph_values(mut self, values: Vec<f64>) -> Self {
        self.ph_values = values;
        self
    }
    pub fn ph(mut self, value: f64) -> Self {
        self.ph_values.push(value);
        self
    }
    pub fn selection(mut self, selection: MoleculeSelection) -> Self {
        self.selection = Some(selection);
        self
    }
    pub fn pipeline(mut self, pipeline: PipelineConfig) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    pub fn build(self) -> Result<BatchConfig, ConfigError> {
        if self.ph_values.is_empty() {
            return Err(ConfigError::MissingParameter("ph_values"));
        }
        if let Some(ph) = self.ph_values.iter().find(|ph| !(0.0..=14.0).contains(*ph)) {
            return Err(ConfigError::InvalidValue {
                parameter: "ph_values",
                reason: format!("pH {ph} is outside 0-14"),
            });
        }
        Ok(BatchConfig {
            ligand_table: self
                .ligand_table
                .ok_or(ConfigError::MissingParameter("ligand_table"))?,
            output_root: self
                .output_root
                .ok_or(ConfigError::MissingParameter("output_root"))?,
            ph_values: self.ph_values,
            selection: self.selection.unwrap_or_default(),
            pipeline: self.pipeline.unwrap_or_default(),
        })
    }
}

/// Locations and command lines of the external tools.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolchainConfig {
    /// Installation directory of the Schrodinger suite (`epik`, `utilities/structconvert`).
    pub schrodinger_root: PathBuf,
    pub charge_command: CommandTemplate,
    /// Conformer generation run ahead of `charge_command`; `None` charges the
    /// input conformer only.
    pub expansion_command: Option<CommandTemplate>,
    pub conformer_command: CommandTemplate,
    /// Converts PDB inputs to mol2 with perceived bond orders.
    pub perception_command: CommandTemplate,
}

impl ToolchainConfig {
    pub fn new(schrodinger_root: PathBuf) -> Self {
        Self {
            schrodinger_root,
            charge_command: CommandTemplate::default_charge(),
            expansion_command: Some(CommandTemplate::default_expansion()),
            conformer_command: CommandTemplate::default_conformer(),
            perception_command: CommandTemplate::default_perception(),
        }
    }
}
