use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu",
    version,
    about = "protoprep CLI - Enumerates protonation states of small-molecule ligands and cofactors and assigns partial charges to every state.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prepare every selected ligand table row at every configured pH.
    Run(RunArgs),
    /// Download the reference PDB and SDF models of a chemical component code.
    Fetch(FetchArgs),
    /// Print the residue tag that would be used for a molecule name or code.
    Tag(TagArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    // --- Inputs ---
    /// Path to the configuration file in TOML format.
    /// Defaults to `config.toml` in the user configuration directory, if present.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the ligand table (CSV with name, SMILES and identifier columns).
    #[arg(short, long = "ligands", value_name = "PATH")]
    pub ligand_table: Option<PathBuf>,

    /// Override the directory under which `output_{pH}` directories are created.
    #[arg(short, long, value_name = "PATH")]
    pub output_root: Option<PathBuf>,

    // --- Batch Overrides ---
    /// Target pH. Can be used multiple times; replaces the configured list.
    #[arg(long = "ph", value_name = "FLOAT")]
    pub ph_values: Vec<f64>,

    /// Process only the named molecule. Can be used multiple times.
    /// Entries configured for the same name keep their input source.
    #[arg(long, value_name = "NAME")]
    pub only: Vec<String>,

    // --- Toolchain Overrides ---
    /// Schrodinger installation directory containing `epik` and `utilities/structconvert`.
    #[arg(long, env = "SCHRODINGER", value_name = "PATH")]
    pub schrodinger: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S enumeration.max-structures=50
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `fetch` subcommand.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Chemical component code (only the first whitespace-separated token is used).
    #[arg(required = true)]
    pub code: String,

    /// Directory to save `{code}_model.pdb` and `{code}_model.sdf` into.
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    pub output_dir: PathBuf,

    /// Override the base URL of the chemical component reports.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
}

/// Arguments for the `tag` subcommand.
#[derive(Args, Debug)]
pub struct TagArgs {
    /// A molecule name, or a reference code with `--code`.
    #[arg(required = true)]
    pub value: String,

    /// Treat the value as a chemical component code instead of a name.
    #[arg(long)]
    pub code: bool,
}
