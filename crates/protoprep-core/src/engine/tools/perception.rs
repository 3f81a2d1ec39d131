use super::StructureConverter;
use super::command::{CommandTemplate, run_checked};
use crate::engine::error::ToolError;
use std::path::Path;
use tracing::info;

/// A format converter that perceives connectivity and bond orders, driven
/// through a command line. Used for inputs that carry no bond orders (PDB).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBondPerceiver {
    template: CommandTemplate,
}

impl CommandBondPerceiver {
    pub fn new(template: CommandTemplate) -> Self {
        Self { template }
    }
}

impl StructureConverter for CommandBondPerceiver {
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        info!(
            "Perceiving bond orders of {} into {}",
            input.display(),
            output.display()
        );
        let mut command = self.template.to_command(&[
            ("input", input.display().to_string()),
            ("output", output.display().to_string()),
        ]);
        run_checked(&mut command, &self.template.program, output)
    }
}
