use directories::ProjectDirs;
use protoprep::engine::config::{DEFAULT_LIGAND_EXPO_URL, EnumerationConfig};
use std::path::PathBuf;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The two conditions of the LDHA cofactor study.
pub const DEFAULT_PH_VALUES: [f64; 2] = [6.6, 7.4];

pub struct DefaultsConfig {
    pub output_root: PathBuf,
    pub ph_values: Vec<f64>,
    pub ligand_expo_url: String,
    pub enumeration: EnumerationConfig,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
            ph_values: DEFAULT_PH_VALUES.to_vec(),
            ligand_expo_url: DEFAULT_LIGAND_EXPO_URL.to_string(),
            enumeration: EnumerationConfig::default(),
        }
    }
}

/// `config.toml` in the per-user configuration directory.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("edu", "caltech", "protoprep")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
