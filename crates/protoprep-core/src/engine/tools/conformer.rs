use super::ConformerGenerator;
use super::command::{CommandTemplate, run_checked};
use crate::core::io::mol2::Mol2File;
use crate::core::io::traits::MolecularFile;
use crate::core::models::molecule::Molecule;
use crate::engine::error::ToolError;
use tracing::info;

/// A 3D structure generator driven through a command line that writes mol2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandConformerGenerator {
    template: CommandTemplate,
}

impl CommandConformerGenerator {
    pub fn new(template: CommandTemplate) -> Self {
        Self { template }
    }
}

impl ConformerGenerator for CommandConformerGenerator {
    fn generate(&self, smiles: &str) -> Result<Molecule, ToolError> {
        info!("Generating 3D structure for {}", smiles);
        let scratch = tempfile::Builder::new()
            .prefix("protoprep-conformer")
            .tempdir()
            .map_err(ToolError::Scratch)?;
        let output = scratch.path().join("conformer.mol2");
        let program = self.template.program.as_str();

        let mut command = self.template.to_command(&[
            ("smiles", smiles.to_string()),
            ("output", output.display().to_string()),
        ]);
        run_checked(&mut command, program, &output)?;

        Mol2File::read_first_from_path(&output).map_err(|source| ToolError::Structure {
            program: program.to_string(),
            source,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    const METHANE: &str = "\
@<TRIPOS>MOLECULE
methane
 5 4 1 0 0
SMALL
NO_CHARGES

@<TRIPOS>ATOM
      1 C          0.0000    0.0000    0.0000 C.3   1  UNL1  0.0000
      2 H          0.6300    0.6300    0.6300 H     1  UNL1  0.0000
      3 H         -0.6300   -0.6300    0.6300 H     1  UNL1  0.0000
      4 H         -0.6300    0.6300   -0.6300 H     1  UNL1  0.0000
      5 H          0.6300   -0.6300   -0.6300 H     1  UNL1  0.0000
@<TRIPOS>BOND
     1     1     2    1
     2     1     3    1
     3     1     4    1
     4     1     5    1
";

    #[test]
    fn generator_reads_the_produced_mol2() {
        let dir = tempfile::tempdir().unwrap();
        let fixture = dir.path().join("methane.mol2");
        std::fs::write(&fixture, METHANE).unwrap();
        let generator = CommandConformerGenerator::new(CommandTemplate::new(
            "cp",
            &[fixture.to_str().unwrap(), "{output}"],
        ));

        let molecule = generator.generate("C").unwrap();
        assert_eq!(molecule.atom_count(), 5);
        assert_eq!(molecule.bond_count(), 4);
        assert_eq!(molecule.atoms()[0].element, "C");
    }

    #[test]
    fn generator_without_output_fails() {
        let generator = CommandConformerGenerator::new(CommandTemplate::new("true", &[]));
        assert!(matches!(
            generator.generate("C"),
            Err(ToolError::MissingOutput { .. })
        ));
    }
}
