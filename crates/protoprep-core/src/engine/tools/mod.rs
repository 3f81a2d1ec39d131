//! Seams to the external toolkits.
//!
//! The pipeline only talks to the traits below. The subprocess-backed
//! implementations live in the submodules and are bundled by
//! [`SubprocessTools`]; tests substitute in-process fakes.

pub mod charge;
pub mod command;
pub mod conformer;
pub mod perception;
pub mod schrodinger;

use super::config::{ChargeOptions, EnumerationConfig, ToolchainConfig};
use super::error::{ChargeError, ToolError};
use super::retrieval::Retriever;
use crate::core::models::molecule::Molecule;
use std::path::Path;

/// Assigns partial charges, returning a new record with the same atoms.
pub trait ChargeEngine {
    fn assign_charges(
        &self,
        molecule: &Molecule,
        options: &ChargeOptions,
    ) -> Result<Molecule, ChargeError>;
}

/// Enumerates protonation states of the structure in `input` into `output`.
pub trait StateEnumerator {
    fn enumerate(
        &self,
        input: &Path,
        output: &Path,
        ph: f64,
        config: &EnumerationConfig,
    ) -> Result<(), ToolError>;
}

/// Converts a structure file into another format, chosen by extension.
///
/// Also the seam for bond-order perception of PDB inputs.
pub trait StructureConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ToolError>;
}

/// Generates a 3D structure from a SMILES string.
pub trait ConformerGenerator {
    fn generate(&self, smiles: &str) -> Result<Molecule, ToolError>;
}

/// The collaborators one pipeline run needs.
#[derive(Clone, Copy)]
pub struct Toolchain<'a> {
    pub charge_engine: &'a dyn ChargeEngine,
    pub enumerator: &'a dyn StateEnumerator,
    pub converter: &'a dyn StructureConverter,
    pub bond_perceiver: &'a dyn StructureConverter,
    pub conformer_generator: &'a dyn ConformerGenerator,
    pub retriever: &'a dyn Retriever,
}

/// The subprocess-backed tool adapters built from a [`ToolchainConfig`].
#[derive(Debug, Clone)]
pub struct SubprocessTools {
    pub schrodinger: schrodinger::SchrodingerSuite,
    pub charge_engine: charge::CommandChargeEngine,
    pub conformer_generator: conformer::CommandConformerGenerator,
    pub bond_perceiver: perception::CommandBondPerceiver,
}

impl SubprocessTools {
    pub fn new(config: &ToolchainConfig) -> Self {
        Self {
            schrodinger: schrodinger::SchrodingerSuite::new(config.schrodinger_root.clone()),
            charge_engine: charge::CommandChargeEngine::new(config.charge_command.clone())
                .with_expansion(config.expansion_command.clone()),
            conformer_generator: conformer::CommandConformerGenerator::new(
                config.conformer_command.clone(),
            ),
            bond_perceiver: perception::CommandBondPerceiver::new(
                config.perception_command.clone(),
            ),
        }
    }

    pub fn toolchain<'a>(&'a self, retriever: &'a dyn Retriever) -> Toolchain<'a> {
        Toolchain {
            charge_engine: &self.charge_engine,
            enumerator: &self.schrodinger,
            converter: &self.schrodinger,
            bond_perceiver: &self.bond_perceiver,
            conformer_generator: &self.conformer_generator,
            retriever,
        }
    }
}
