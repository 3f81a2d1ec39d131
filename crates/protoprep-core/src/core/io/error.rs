use super::StructureFormat;
use crate::core::models::molecule::MoleculeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StructureIoError {
    #[error("I/O operation failed: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse {format} data: {details} (at line ~{line})")]
    Parse {
        format: StructureFormat,
        line: usize,
        details: String,
    },

    #[error("no {0} records found")]
    NoRecords(StructureFormat),

    #[error("the '{0}' format cannot be read or written directly")]
    UnsupportedFormat(StructureFormat),

    #[error("cannot infer a structure format from '{0}'")]
    UnknownExtension(String),

    #[error("inconsistent topology: {0}")]
    Topology(#[from] MoleculeError),
}

impl StructureIoError {
    pub fn parse(format: StructureFormat, line: usize, details: impl Into<String>) -> Self {
        Self::Parse {
            format,
            line,
            details: details.into(),
        }
    }
}
