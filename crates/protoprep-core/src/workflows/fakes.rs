//! In-process stand-ins for the external tools, shared by the workflow tests.

use crate::core::io::error::StructureIoError;
use crate::core::io::pdb::PdbFile;
use crate::core::io::report::{
    IONIZATION_PENALTY_CHARGING_TAG, IONIZATION_PENALTY_NEUTRAL_TAG, IONIZATION_PENALTY_TAG,
    STATE_PENALTY_TAG, TOTAL_CHARGE_TAG,
};
use crate::core::io::sdf::SdfFile;
use crate::core::io::traits::MolecularFile;
use crate::core::io::{read_structures, write_structures};
use crate::core::models::atom::Atom;
use crate::core::models::molecule::Molecule;
use crate::core::models::topology::BondOrder;
use crate::engine::config::{ChargeOptions, EnumerationConfig};
use crate::engine::error::{ChargeError, RetrievalError, ToolError};
use crate::engine::retrieval::Retriever;
use crate::engine::tools::{
    ChargeEngine, ConformerGenerator, StateEnumerator, StructureConverter, Toolchain,
};
use nalgebra::Point3;
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

/// Heavy-atom acetamide, `CH3-C(=O)-N`.
pub(crate) fn acetamide(title: &str) -> Molecule {
    let mut molecule = Molecule::new(title);
    for (i, (name, element)) in [("CH3", "C"), ("C", "C"), ("O", "O"), ("N", "N")]
        .iter()
        .enumerate()
    {
        molecule.add_atom(Atom::new(
            name,
            element,
            Point3::new(1.2 * i as f64, 0.3 * i as f64, 0.0),
        ));
    }
    molecule.add_bond(0, 1, BondOrder::Single).unwrap();
    molecule.add_bond(1, 2, BondOrder::Double).unwrap();
    molecule.add_bond(1, 3, BondOrder::Single).unwrap();
    molecule
}

/// An enumerated state carrying the tags the enumerator attaches.
pub(crate) fn epik_state(title: &str, state_penalty: &str, total_charge: i32) -> Molecule {
    let mut molecule = acetamide(title);
    molecule.set_sd_data(IONIZATION_PENALTY_TAG, "0.0000");
    molecule.set_sd_data(IONIZATION_PENALTY_CHARGING_TAG, "0.0000");
    molecule.set_sd_data(IONIZATION_PENALTY_NEUTRAL_TAG, "0.0000");
    molecule.set_sd_data(STATE_PENALTY_TAG, state_penalty);
    molecule.set_sd_data(TOTAL_CHARGE_TAG, &total_charge.to_string());
    molecule
}

fn tool_failure(program: &str, stderr: &str) -> ToolError {
    ToolError::Failed {
        program: program.to_string(),
        status: "exit status: 1".to_string(),
        stderr: stderr.to_string(),
    }
}

/// Spreads the net formal charge evenly; fails on the listed call numbers.
#[derive(Default)]
pub(crate) struct FakeChargeEngine {
    calls: Cell<usize>,
    failing_calls: Vec<usize>,
}

impl FakeChargeEngine {
    pub(crate) fn call_count(&self) -> usize {
        self.calls.get()
    }
}

impl ChargeEngine for FakeChargeEngine {
    fn assign_charges(
        &self,
        molecule: &Molecule,
        _options: &ChargeOptions,
    ) -> Result<Molecule, ChargeError> {
        let call = self.calls.get();
        self.calls.set(call + 1);
        if self.failing_calls.contains(&call) {
            return Err(tool_failure("fake-charge", "no charges for you").into());
        }

        let mut charged = molecule.clone();
        let share = charged.net_formal_charge() as f64 / charged.atom_count().max(1) as f64;
        for atom in charged.atoms_mut() {
            atom.partial_charge = share;
        }
        Ok(charged)
    }
}

/// Writes a placeholder native file and records the requested pH values.
#[derive(Default)]
pub(crate) struct FakeEnumerator {
    ph_values: RefCell<Vec<f64>>,
}

impl FakeEnumerator {
    pub(crate) fn ph_values(&self) -> Vec<f64> {
        self.ph_values.borrow().clone()
    }
}

impl StateEnumerator for FakeEnumerator {
    fn enumerate(
        &self,
        input: &Path,
        output: &Path,
        ph: f64,
        _config: &EnumerationConfig,
    ) -> Result<(), ToolError> {
        if !input.exists() {
            return Err(tool_failure("fake-epik", "input structure not found"));
        }
        self.ph_values.borrow_mut().push(ph);
        fs::write(output, "placeholder\n").map_err(ToolError::Scratch)
    }
}

/// Produces a fixed ensemble per output format.
pub(crate) struct FakeConverter {
    sdf_states: Vec<Molecule>,
    mol2_states: Vec<Molecule>,
}

impl StructureConverter for FakeConverter {
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        if !input.exists() {
            return Err(tool_failure("fake-convert", "native file not found"));
        }
        let states = match output.extension().and_then(|e| e.to_str()) {
            Some("sdf") => &self.sdf_states,
            Some("mol2") => &self.mol2_states,
            _ => {
                return Err(ToolError::UnsupportedFile {
                    tool: "fake-convert",
                    path: output.to_path_buf(),
                });
            }
        };
        write_structures(output, states).map_err(|source| ToolError::Structure {
            program: "fake-convert".to_string(),
            source,
        })
    }
}

/// Re-reads the input with the built-in codecs and records every input path.
/// Bonds present in the input survive; nothing is perceived.
#[derive(Default)]
pub(crate) struct FakeBondPerceiver {
    inputs: RefCell<Vec<PathBuf>>,
}

impl FakeBondPerceiver {
    pub(crate) fn inputs(&self) -> Vec<PathBuf> {
        self.inputs.borrow().clone()
    }
}

impl StructureConverter for FakeBondPerceiver {
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        self.inputs.borrow_mut().push(input.to_path_buf());
        let structure_error = |source: StructureIoError| ToolError::Structure {
            program: "fake-perceive".to_string(),
            source,
        };
        let molecules = read_structures(input).map_err(structure_error)?;
        write_structures(output, &molecules).map_err(structure_error)
    }
}

/// Returns an acetamide for any SMILES string.
#[derive(Default)]
pub(crate) struct FakeConformerGenerator {
    requests: RefCell<Vec<String>>,
}

impl FakeConformerGenerator {
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl ConformerGenerator for FakeConformerGenerator {
    fn generate(&self, smiles: &str) -> Result<Molecule, ToolError> {
        self.requests.borrow_mut().push(smiles.to_string());
        Ok(acetamide(""))
    }
}

/// Serves acetamide reference models: names from the PDB, bond orders from the SDF.
pub(crate) struct FakeRetriever {
    pdb: Vec<u8>,
    sdf: Vec<u8>,
    urls: RefCell<Vec<String>>,
}

impl Default for FakeRetriever {
    fn default() -> Self {
        let model = acetamide("REF");
        let mut pdb = Vec::new();
        PdbFile::write_all(std::slice::from_ref(&model), &mut pdb).unwrap();
        let mut sdf = Vec::new();
        SdfFile::write_all(std::slice::from_ref(&model), &mut sdf).unwrap();
        Self {
            pdb,
            sdf,
            urls: RefCell::new(Vec::new()),
        }
    }
}

impl FakeRetriever {
    pub(crate) fn urls(&self) -> Vec<String> {
        self.urls.borrow().clone()
    }
}

impl Retriever for FakeRetriever {
    fn retrieve(&self, url: &str, destination: &Path) -> Result<(), RetrievalError> {
        self.urls.borrow_mut().push(url.to_string());
        let body = if url.ends_with(".pdb") {
            &self.pdb
        } else if url.ends_with(".sdf") {
            &self.sdf
        } else {
            return Err(RetrievalError::Status {
                url: url.to_string(),
                status: 404,
            });
        };
        fs::write(destination, body).map_err(|source| RetrievalError::Io {
            path: destination.to_path_buf(),
            source,
        })
    }
}

/// One of each fake, bundled into a [`Toolchain`].
pub(crate) struct FakeTools {
    pub(crate) charge_engine: FakeChargeEngine,
    pub(crate) enumerator: FakeEnumerator,
    pub(crate) converter: FakeConverter,
    pub(crate) bond_perceiver: FakeBondPerceiver,
    pub(crate) conformer_generator: FakeConformerGenerator,
    pub(crate) retriever: FakeRetriever,
}

impl FakeTools {
    /// Tools whose enumerator yields `states` in both converted formats.
    pub(crate) fn new(states: Vec<Molecule>) -> Self {
        Self::with_streams(states.clone(), states)
    }

    pub(crate) fn with_streams(sdf_states: Vec<Molecule>, mol2_states: Vec<Molecule>) -> Self {
        Self {
            charge_engine: FakeChargeEngine::default(),
            enumerator: FakeEnumerator::default(),
            converter: FakeConverter {
                sdf_states,
                mol2_states,
            },
            bond_perceiver: FakeBondPerceiver::default(),
            conformer_generator: FakeConformerGenerator::default(),
            retriever: FakeRetriever::default(),
        }
    }

    /// Makes the charge engine fail on the given zero-based call numbers.
    pub(crate) fn with_failing_charge_calls(mut self, calls: &[usize]) -> Self {
        self.charge_engine.failing_calls = calls.to_vec();
        self
    }

    pub(crate) fn toolchain(&self) -> Toolchain<'_> {
        Toolchain {
            charge_engine: &self.charge_engine,
            enumerator: &self.enumerator,
            converter: &self.converter,
            bond_perceiver: &self.bond_perceiver,
            conformer_generator: &self.conformer_generator,
            retriever: &self.retriever,
        }
    }
}
