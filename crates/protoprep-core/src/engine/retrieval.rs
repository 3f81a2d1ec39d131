use super::error::RetrievalError;
use std::path::Path;
use tracing::info;

/// Downloads a remote file and saves the body verbatim.
pub trait Retriever {
    fn retrieve(&self, url: &str, destination: &Path) -> Result<(), RetrievalError>;
}

/// URL scheme of the Ligand Expo chemical component model files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LigandExpo {
    base_url: String,
}

impl LigandExpo {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn model_url(&self, code: &str, extension: &str) -> String {
        let initial = code.chars().next().map(String::from).unwrap_or_default();
        format!("{}/{initial}/{code}/{code}_model.{extension}", self.base_url)
    }

    /// URL of the model coordinates in PDB format (source of atom names).
    pub fn model_pdb_url(&self, code: &str) -> String {
        self.model_url(code, "pdb")
    }

    /// URL of the model structure in SDF format (source of bond orders and charges).
    pub fn model_sdf_url(&self, code: &str) -> String {
        self.model_url(code, "sdf")
    }

    /// Downloads the PDB and SDF model files of `code`.
    pub fn fetch_models(
        &self,
        retriever: &dyn Retriever,
        code: &str,
        pdb_destination: &Path,
        sdf_destination: &Path,
    ) -> Result<(), RetrievalError> {
        for (url, destination) in [
            (self.model_pdb_url(code), pdb_destination),
            (self.model_sdf_url(code), sdf_destination),
        ] {
            info!("Retrieving {} -> {}", url, destination.display());
            retriever.retrieve(&url, destination)?;
        }
        Ok(())
    }
}
