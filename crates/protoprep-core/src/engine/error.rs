use super::config::ConfigError;
use crate::core::chem::residue::ResidueTagError;
use crate::core::io::error::StructureIoError;
use crate::core::io::report::ReportError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of an external program.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("'{program}' finished but did not produce {path:?}")]
    MissingOutput { program: String, path: PathBuf },

    #[error("'{tool}' cannot handle files like {path:?}")]
    UnsupportedFile { tool: &'static str, path: PathBuf },

    #[error("Failed to exchange structures with '{program}': {source}")]
    Structure {
        program: String,
        #[source]
        source: StructureIoError,
    },

    #[error("Scratch directory error: {0}")]
    Scratch(#[source] std::io::Error),
}

/// Failure to assign charges to one molecule.
///
/// A failure of the chemistry is recoverable at the pipeline level: the
/// molecule (initial charging) or the enumerated state (recharging) is
/// skipped. A toolchain that cannot run at all is not; see
/// [`ChargeError::into_recoverable`].
#[derive(Debug, Error)]
pub enum ChargeError {
    #[error("Charge engine failed: {0}")]
    Tool(#[from] ToolError),

    #[error("Charge engine returned no structures")]
    NoStructures,

    #[error("Charge engine changed the atom count from {expected} to {actual}")]
    AtomCountChanged { expected: usize, actual: usize },
}

impl ChargeError {
    /// Keeps failures caused by the molecule and hands back the tool error of
    /// an engine that could not be launched or fed.
    pub fn into_recoverable(self) -> Result<ChargeError, ToolError> {
        match self {
            ChargeError::Tool(
                source @ (ToolError::Spawn { .. }
                | ToolError::Scratch(_)
                | ToolError::UnsupportedFile { .. }),
            ) => Err(source),
            other => Ok(other),
        }
    }
}

/// Failure to download a remote reference file.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("{url} answered with HTTP status {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to save {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Any fatal failure of the per-molecule pipeline or the batch driver.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    #[error("Structure file {path:?}: {source}")]
    Structure {
        path: PathBuf,
        #[source]
        source: StructureIoError,
    },

    #[error("File system operation on {path:?} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("External tool failed: {0}")]
    Tool(#[from] ToolError),

    #[error("Retrieval failed: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Cannot derive residue tag: {0}")]
    ResidueTag(#[from] ResidueTagError),

    #[error("Failed to read ligand table {path:?}: {source}")]
    LigandTable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Input structure {path:?} has {atoms} atoms but no bonds")]
    NoConnectivity { path: PathBuf, atoms: usize },

    #[error(
        "Converted ensembles disagree: {sdf} SDF entries but {mol2} mol2 entries; refusing to pair them"
    )]
    EnsembleMismatch { sdf: usize, mol2: usize },

    #[error("Report generation failed: {0}")]
    Report(#[from] ReportError),
}

impl PipelineError {
    pub(crate) fn structure(path: impl Into<PathBuf>) -> impl FnOnce(StructureIoError) -> Self {
        let path = path.into();
        move |source| Self::Structure { path, source }
    }

    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
