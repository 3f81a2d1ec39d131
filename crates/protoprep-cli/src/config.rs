pub mod defaults;
pub mod file;

use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use file::PartialAppConfig;
use protoprep::engine::config::{
    BatchConfig, BatchConfigBuilder, EnumerationConfig, MoleculeRequest, MoleculeSelection,
    PipelineConfig, ToolchainConfig,
};
use protoprep::engine::tools::command::CommandTemplate;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Everything the `run` command needs after all layers are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub batch: BatchConfig,
    pub toolchain: ToolchainConfig,
}

/// Loads the explicit config file, or the per-user default one if it exists,
/// or nothing.
pub fn load_partial_config(explicit: Option<&Path>) -> Result<PartialAppConfig> {
    if let Some(path) = explicit {
        return PartialAppConfig::from_file(path);
    }
    match defaults::default_config_path() {
        Some(path) if path.is_file() => {
            info!("Using configuration file {}", path.display());
            PartialAppConfig::from_file(&path)
        }
        _ => {
            debug!("No configuration file found, using defaults and CLI arguments only.");
            Ok(PartialAppConfig::default())
        }
    }
}

impl PartialAppConfig {
    /// Layers the file values, `--set` overrides and explicit flags (in
    /// increasing priority) over the defaults.
    pub fn merge_with_cli(mut self, args: &RunArgs) -> Result<AppConfig> {
        self.apply_set_values(&args.set_values)?;
        let defaults = DefaultsConfig::default();

        let ligand_table = args
            .ligand_table
            .clone()
            .or(self.ligand_table)
            .ok_or_else(|| {
                CliError::Config(
                    "A ligand table is required either in the config file (`ligand-table`) or via --ligands."
                        .to_string(),
                )
            })?;
        let output_root = args
            .output_root
            .clone()
            .or(self.output_root)
            .unwrap_or(defaults.output_root);
        let ph_values = if args.ph_values.is_empty() {
            self.ph_values.unwrap_or(defaults.ph_values)
        } else {
            args.ph_values.clone()
        };

        let file_molecules = self
            .molecules
            .map(|entries| entries.into_iter().map(MoleculeRequest::from).collect());
        let selection = Self::merge_selection(file_molecules, &args.only);

        let enumeration = Self::merge_enumeration(self.enumeration.unwrap_or_default(), defaults.enumeration);
        let pipeline = PipelineConfig {
            enumeration,
            ligand_expo_base_url: self
                .retrieval
                .and_then(|r| r.ligand_expo_url)
                .unwrap_or(defaults.ligand_expo_url),
        };

        let batch = BatchConfigBuilder::new()
            .ligand_table(ligand_table)
            .output_root(output_root)
            .ph_values(ph_values)
            .selection(selection)
            .pipeline(pipeline)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let toolchain = Self::merge_toolchain(args.schrodinger.clone(), self.toolchain.unwrap_or_default())?;

        Ok(AppConfig { batch, toolchain })
    }

    /// `--only` names restrict the selection. A configured entry with the same
    /// name keeps its source; other names take the SMILES of their table row.
    fn merge_selection(
        file_molecules: Option<Vec<MoleculeRequest>>,
        only: &[String],
    ) -> MoleculeSelection {
        if only.is_empty() {
            return file_molecules.map_or(MoleculeSelection::All, MoleculeSelection::Only);
        }
        let configured = file_molecules.unwrap_or_default();
        MoleculeSelection::Only(
            only.iter()
                .map(|name| {
                    configured
                        .iter()
                        .find(|entry| &entry.name == name)
                        .cloned()
                        .unwrap_or_else(|| MoleculeRequest::new(name))
                })
                .collect(),
        )
    }

    fn merge_enumeration(
        partial: file::FileEnumerationConfig,
        defaults: EnumerationConfig,
    ) -> EnumerationConfig {
        EnumerationConfig {
            tautomerize: partial.tautomerize.unwrap_or(defaults.tautomerize),
            max_structures: partial.max_structures.unwrap_or(defaults.max_structures),
            max_energy_penalty: partial
                .max_energy_penalty
                .unwrap_or(defaults.max_energy_penalty),
            retain_input: partial.retain_input.unwrap_or(defaults.retain_input),
        }
    }

    fn merge_toolchain(
        cli_schrodinger: Option<PathBuf>,
        partial: file::FileToolchainConfig,
    ) -> Result<ToolchainConfig> {
        let root = cli_schrodinger.or(partial.schrodinger).ok_or_else(|| {
            CliError::Config(
                "The Schrodinger installation directory is required via --schrodinger, the SCHRODINGER environment variable or `toolchain.schrodinger`."
                    .to_string(),
            )
        })?;

        let mut toolchain = ToolchainConfig::new(root);
        if let Some(line) = partial.charge_command {
            toolchain.charge_command = parse_command("toolchain.charge-command", &line)?;
        }
        if let Some(line) = partial.expansion_command {
            toolchain.expansion_command = CommandTemplate::parse(&line);
        }
        if let Some(line) = partial.conformer_command {
            toolchain.conformer_command = parse_command("toolchain.conformer-command", &line)?;
        }
        if let Some(line) = partial.perception_command {
            toolchain.perception_command = parse_command("toolchain.perception-command", &line)?;
        }
        Ok(toolchain)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let (key, value_str) = kv_pair.split_once('=').ok_or_else(|| {
                CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                ))
            })?;

            match key {
                "ligand-table" => self.ligand_table = Some(PathBuf::from(value_str)),
                "output-root" => self.output_root = Some(PathBuf::from(value_str)),
                "ph-values" => {
                    self.ph_values = Some(
                        value_str
                            .split(',')
                            .map(|v| parse_value(key, v.trim()))
                            .collect::<Result<_>>()?,
                    );
                }
                "toolchain.schrodinger" => {
                    self.toolchain
                        .get_or_insert_with(Default::default)
                        .schrodinger = Some(PathBuf::from(value_str));
                }
                "toolchain.charge-command" => {
                    self.toolchain
                        .get_or_insert_with(Default::default)
                        .charge_command = Some(value_str.to_string());
                }
                "toolchain.expansion-command" => {
                    self.toolchain
                        .get_or_insert_with(Default::default)
                        .expansion_command = Some(value_str.to_string());
                }
                "toolchain.perception-command" => {
                    self.toolchain
                        .get_or_insert_with(Default::default)
                        .perception_command = Some(value_str.to_string());
                }
                "toolchain.conformer-command" => {
                    self.toolchain
                        .get_or_insert_with(Default::default)
                        .conformer_command = Some(value_str.to_string());
                }
                "enumeration.tautomerize" => {
                    self.enumeration
                        .get_or_insert_with(Default::default)
                        .tautomerize = Some(parse_value(key, value_str)?);
                }
                "enumeration.max-structures" => {
                    self.enumeration
                        .get_or_insert_with(Default::default)
                        .max_structures = Some(parse_value(key, value_str)?);
                }
                "enumeration.max-energy-penalty" => {
                    self.enumeration
                        .get_or_insert_with(Default::default)
                        .max_energy_penalty = Some(parse_value(key, value_str)?);
                }
                "enumeration.retain-input" => {
                    self.enumeration
                        .get_or_insert_with(Default::default)
                        .retain_input = Some(parse_value(key, value_str)?);
                }
                "retrieval.ligand-expo-url" => {
                    self.retrieval
                        .get_or_insert_with(Default::default)
                        .ligand_expo_url = Some(value_str.to_string());
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid value for {}: {}", key, value)))
}

fn parse_command(key: &str, line: &str) -> Result<CommandTemplate> {
    CommandTemplate::parse(line)
        .ok_or_else(|| CliError::Config(format!("`{}` must not be empty", key)))
}
