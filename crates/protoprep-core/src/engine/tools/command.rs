use crate::engine::error::ToolError;
use std::fs;
use std::io;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// A program plus arguments with `{name}` placeholders filled in per call.
///
/// Recognized placeholders depend on the adapter: `{input}`, `{output}`,
/// `{max_conformers}`, `{strict_stereo}` for the charge engine and its
/// conformer expansion step, `{smiles}`, `{output}` for the conformer
/// generator and `{input}`, `{output}` for bond perception. Unknown
/// placeholders are left as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandTemplate {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Splits a command line on whitespace. Returns `None` for a blank line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut tokens = line.split_whitespace();
        let program = tokens.next()?.to_string();
        Some(Self {
            program,
            args: tokens.map(str::to_string).collect(),
        })
    }

    /// OpenEye `molcharge` with AM1-BCC ELF10 charges.
    pub fn default_charge() -> Self {
        Self::new(
            "molcharge",
            &["-in", "{input}", "-out", "{output}", "-method", "am1bccelf10"],
        )
    }

    /// OpenEye `oeomega` conformer expansion ahead of charging.
    pub fn default_expansion() -> Self {
        Self::new(
            "oeomega",
            &[
                "classic",
                "-in",
                "{input}",
                "-out",
                "{output}",
                "-maxconfs",
                "{max_conformers}",
                "-strictStereo",
                "{strict_stereo}",
            ],
        )
    }

    /// Open Babel conversion, which perceives bonds and bond orders on read.
    pub fn default_perception() -> Self {
        Self::new("obabel", &["{input}", "-O", "{output}"])
    }

    /// Open Babel 3D generation from a SMILES string, hydrogens added.
    pub fn default_conformer() -> Self {
        Self::new(
            "obabel",
            &["-:{smiles}", "--gen3d", "-h", "-omol2", "-O", "{output}"],
        )
    }

    pub fn render(&self, vars: &[(&str, String)]) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                vars.iter().fold(arg.clone(), |acc, (key, value)| {
                    acc.replace(&format!("{{{key}}}"), value)
                })
            })
            .collect()
    }

    pub fn to_command(&self, vars: &[(&str, String)]) -> Command {
        let mut command = Command::new(&self.program);
        command.args(self.render(vars));
        command
    }
}

/// Runs a command to completion and checks its exit status and output file.
///
/// Any file already at `expected_output` is removed first, so only output
/// written by this run counts.
///
/// # Errors
///
/// Returns [`ToolError::Spawn`] if the program cannot be started,
/// [`ToolError::Failed`] on a non-zero exit status (with the captured stderr)
/// and [`ToolError::MissingOutput`] if `expected_output` does not exist afterwards.
/// A stale output that cannot be removed is reported as [`ToolError::Scratch`].
pub fn run_checked(
    command: &mut Command,
    program: &str,
    expected_output: &Path,
) -> Result<(), ToolError> {
    match fs::remove_file(expected_output) {
        Ok(()) => debug!("Removed stale {}", expected_output.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(ToolError::Scratch(e)),
    }

    debug!("Running {:?}", command);
    let output = command.output().map_err(|source| ToolError::Spawn {
        program: program.to_string(),
        source,
    })?;

    if !output.status.success() {
        return Err(ToolError::Failed {
            program: program.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    if !expected_output.exists() {
        return Err(ToolError::MissingOutput {
            program: program.to_string(),
            path: expected_output.to_path_buf(),
        });
    }
    debug!("{} completed, output in {}", program, expected_output.display());
    Ok(())
}
