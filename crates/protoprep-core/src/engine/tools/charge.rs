use super::ChargeEngine;
use super::command::{CommandTemplate, run_checked};
use crate::core::chem::tripos::ensure_atom_names;
use crate::core::io::mol2::Mol2File;
use crate::core::io::traits::MolecularFile;
use crate::core::models::molecule::Molecule;
use crate::engine::config::ChargeOptions;
use crate::engine::error::{ChargeError, ToolError};
use std::path::Path;
use tracing::debug;

/// A charge engine driven through a command line that reads and writes mol2.
///
/// The molecule is written to a scratch directory, optionally expanded into
/// conformers by a separate command, and charged by the charge command. The
/// charges and conformer coordinates of the result are copied back onto the
/// input record. Atom names, residue labels, bonds and SD data of the input are
/// kept as they were.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandChargeEngine {
    template: CommandTemplate,
    expansion: Option<CommandTemplate>,
}

impl CommandChargeEngine {
    pub fn new(template: CommandTemplate) -> Self {
        Self {
            template,
            expansion: None,
        }
    }

    /// Runs `expansion` on the input before charging. The conformer count and
    /// stereo options of each call are rendered into this command.
    pub fn with_expansion(mut self, expansion: Option<CommandTemplate>) -> Self {
        self.expansion = expansion;
        self
    }

    fn run(&self, molecule: &Molecule, options: &ChargeOptions) -> Result<Vec<Molecule>, ToolError> {
        let scratch = tempfile::Builder::new()
            .prefix("protoprep-charge")
            .tempdir()
            .map_err(ToolError::Scratch)?;
        let mut input = scratch.path().join("input.mol2");
        let output = scratch.path().join("output.mol2");
        let program = self.template.program.as_str();

        Mol2File::write_all_to_path(std::slice::from_ref(molecule), &input).map_err(|source| {
            ToolError::Structure {
                program: program.to_string(),
                source,
            }
        })?;

        if let Some(expansion) = &self.expansion {
            let conformers = scratch.path().join("conformers.mol2");
            let mut command = expansion.to_command(&command_vars(&input, &conformers, options));
            run_checked(&mut command, &expansion.program, &conformers)?;
            input = conformers;
        }

        let mut command = self.template.to_command(&command_vars(&input, &output, options));
        run_checked(&mut command, program, &output)?;

        Mol2File::read_all_from_path(&output).map_err(|source| ToolError::Structure {
            program: program.to_string(),
            source,
        })
    }
}

impl ChargeEngine for CommandChargeEngine {
    fn assign_charges(
        &self,
        molecule: &Molecule,
        options: &ChargeOptions,
    ) -> Result<Molecule, ChargeError> {
        let mut prepared = molecule.clone();
        if options.normalize && ensure_atom_names(&mut prepared) {
            debug!("Assigned Tripos atom names to '{}'", prepared.title);
        }

        let conformers = self.run(&prepared, options)?;
        let (first, rest) = conformers.split_first().ok_or(ChargeError::NoStructures)?;
        merge_charged_conformers(prepared, first, rest, options.keep_conformers)
    }
}

fn command_vars(input: &Path, output: &Path, options: &ChargeOptions) -> Vec<(&'static str, String)> {
    vec![
        ("input", input.display().to_string()),
        ("output", output.display().to_string()),
        ("max_conformers", options.max_conformers.to_string()),
        ("strict_stereo", options.strict_stereo.to_string()),
    ]
}

/// Copies partial charges and coordinates from the engine output onto the input.
fn merge_charged_conformers(
    mut target: Molecule,
    first: &Molecule,
    rest: &[Molecule],
    keep_conformers: Option<usize>,
) -> Result<Molecule, ChargeError> {
    let expected = target.atom_count();
    for conformer in std::iter::once(first).chain(rest) {
        if conformer.atom_count() != expected {
            return Err(ChargeError::AtomCountChanged {
                expected,
                actual: conformer.atom_count(),
            });
        }
    }

    for (atom, charged) in target.atoms_mut().iter_mut().zip(first.atoms()) {
        atom.partial_charge = charged.partial_charge;
        atom.position = charged.position;
    }
    target.truncate_conformers(1);
    for conformer in rest {
        let positions = conformer.atoms().iter().map(|a| a.position).collect();
        target
            .add_conformer(positions)
            .map_err(|_| ChargeError::AtomCountChanged {
                expected,
                actual: conformer.atom_count(),
            })?;
    }
    if let Some(keep) = keep_conformers {
        target.truncate_conformers(keep);
    }
    Ok(target)
}
