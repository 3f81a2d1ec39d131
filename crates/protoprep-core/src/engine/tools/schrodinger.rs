use super::command::run_checked;
use super::{StateEnumerator, StructureConverter};
use crate::core::io::StructureFormat;
use crate::engine::config::EnumerationConfig;
use crate::engine::error::ToolError;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

const SCHRODINGER_ENV: &str = "SCHRODINGER";

/// Epik and structconvert from a Schrodinger installation.
///
/// The installation directory is handed to each child process as
/// `SCHRODINGER`; the parent environment is never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchrodingerSuite {
    root: PathBuf,
}

impl SchrodingerSuite {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn epik_path(&self) -> PathBuf {
        self.root.join("epik")
    }

    pub fn structconvert_path(&self) -> PathBuf {
        self.root.join("utilities").join("structconvert")
    }

    fn command(&self, program: PathBuf) -> Command {
        let mut command = Command::new(program);
        command.env(SCHRODINGER_ENV, &self.root);
        command
    }

    /// Builds the Epik argument list for one enumeration.
    pub fn epik_args(
        input: &Path,
        output: &Path,
        ph: f64,
        config: &EnumerationConfig,
    ) -> Result<Vec<OsString>, ToolError> {
        let mut args: Vec<OsString> = vec![
            format!("-i{}", format_flag("epik", input)?).into(),
            input.into(),
            format!("-o{}", format_flag("epik", output)?).into(),
            output.into(),
            "-ph".into(),
            ph.to_string().into(),
            "-p".into(),
            config.min_probability().to_string().into(),
            "-ms".into(),
            config.max_structures.to_string().into(),
        ];
        if !config.tautomerize {
            args.push("-nt".into());
        }
        if config.retain_input {
            args.push("-retain_i".into());
        }
        args.push("-WAIT".into());
        Ok(args)
    }

    pub fn structconvert_args(input: &Path, output: &Path) -> Result<Vec<OsString>, ToolError> {
        Ok(vec![
            format!("-i{}", format_flag("structconvert", input)?).into(),
            input.into(),
            format!("-o{}", format_flag("structconvert", output)?).into(),
            output.into(),
        ])
    }
}

/// The Schrodinger format flag suffix (`-imol2`, `-osd`, ...) of a file.
fn format_flag(tool: &'static str, path: &Path) -> Result<&'static str, ToolError> {
    match StructureFormat::from_path(path) {
        Some(StructureFormat::Mae) => Ok("mae"),
        Some(StructureFormat::Mol2) => Ok("mol2"),
        Some(StructureFormat::Sdf) => Ok("sd"),
        Some(StructureFormat::Pdb) => Ok("pdb"),
        None => Err(ToolError::UnsupportedFile {
            tool,
            path: path.to_path_buf(),
        }),
    }
}

impl StateEnumerator for SchrodingerSuite {
    fn enumerate(
        &self,
        input: &Path,
        output: &Path,
        ph: f64,
        config: &EnumerationConfig,
    ) -> Result<(), ToolError> {
        info!("Running epik on {} at pH {}", input.display(), ph);
        let mut command = self.command(self.epik_path());
        command.args(Self::epik_args(input, output, ph, config)?);
        run_checked(&mut command, "epik", output)
    }
}

impl StructureConverter for SchrodingerSuite {
    fn convert(&self, input: &Path, output: &Path) -> Result<(), ToolError> {
        let mut command = self.command(self.structconvert_path());
        command.args(Self::structconvert_args(input, output)?);
        run_checked(&mut command, "structconvert", output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn tool_paths_live_under_root() {
        let suite = SchrodingerSuite::new("/opt/schrodinger2016-4");
        assert_eq!(suite.epik_path(), PathBuf::from("/opt/schrodinger2016-4/epik"));
        assert_eq!(
            suite.structconvert_path(),
            PathBuf::from("/opt/schrodinger2016-4/utilities/structconvert")
        );
    }

    #[test]
    fn epik_arguments_follow_enumeration_config() {
        let args = strings(
            SchrodingerSuite::epik_args(
                Path::new("NADH-input.mol2"),
                Path::new("NADH-epik.mae"),
                7.0,
                &EnumerationConfig::default(),
            )
            .unwrap(),
        );
        assert_eq!(&args[..4], &["-imol2", "NADH-input.mol2", "-omae", "NADH-epik.mae"]);
        let value_after = |flag: &str| {
            let pos = args.iter().position(|a| a == flag).unwrap();
            args[pos + 1].clone()
        };
        assert_eq!(value_after("-ph"), "7");
        assert_eq!(value_after("-ms"), "100");
        let p: f64 = value_after("-p").parse().unwrap();
        assert!((p - (-10.0f64).exp()).abs() < 1e-15);
        assert!(args.contains(&"-nt".to_string()));
        assert!(args.contains(&"-retain_i".to_string()));
        assert_eq!(args.last().unwrap(), "-WAIT");
    }

    #[test]
    fn tautomerization_flag_is_omitted_when_enabled() {
        let config = EnumerationConfig {
            tautomerize: true,
            retain_input: false,
            ..Default::default()
        };
        let args = strings(
            SchrodingerSuite::epik_args(Path::new("a.mol2"), Path::new("a.mae"), 6.6, &config)
                .unwrap(),
        );
        assert!(!args.contains(&"-nt".to_string()));
        assert!(!args.contains(&"-retain_i".to_string()));
    }

    #[test]
    fn structconvert_flags_come_from_extensions() {
        let args = strings(
            SchrodingerSuite::structconvert_args(Path::new("x-epik.mae"), Path::new("x-epik.sdf"))
                .unwrap(),
        );
        assert_eq!(args, vec!["-imae", "x-epik.mae", "-osd", "x-epik.sdf"]);

        assert!(matches!(
            SchrodingerSuite::structconvert_args(Path::new("x.mae"), Path::new("x.txt")),
            Err(ToolError::UnsupportedFile { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn missing_installation_is_a_spawn_error() {
        let dir = tempfile::tempdir().unwrap();
        let suite = SchrodingerSuite::new(dir.path());
        let err = suite
            .convert(&dir.path().join("a.mae"), &dir.path().join("a.sdf"))
            .unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }
}
