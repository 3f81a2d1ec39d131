use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// The output directory tree: `{root}/output_{ph}/{name}/{name}-*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory of one pH condition. The pH is rendered the shortest way
    /// that keeps a decimal point (`6.6`, `7.0`).
    pub fn ph_dir(&self, ph: f64) -> PathBuf {
        self.root.join(format!("output_{ph:?}"))
    }

    pub fn molecule(&self, ph: f64, name: &str) -> MoleculePaths {
        MoleculePaths {
            dir: self.ph_dir(ph).join(name),
            name: name.to_string(),
        }
    }
}

/// The files written for one molecule at one pH.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoleculePaths {
    dir: PathBuf,
    name: String,
}

impl MoleculePaths {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Creates the molecule directory and its parents.
    pub fn create_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)
    }

    fn file(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}-{}", self.name, suffix))
    }

    pub fn input_pdb(&self) -> PathBuf {
        self.file("input.pdb")
    }
    pub fn input_sdf(&self) -> PathBuf {
        self.file("input.sdf")
    }
    /// A PDB input converted to mol2 with perceived bond orders.
    pub fn perceived_mol2(&self) -> PathBuf {
        self.file("perceived.mol2")
    }
    pub fn debug_mol2(&self) -> PathBuf {
        self.file("debug.mol2")
    }
    pub fn input_mol2(&self) -> PathBuf {
        self.file("input.mol2")
    }
    pub fn epik_mae(&self) -> PathBuf {
        self.file("epik.mae")
    }
    pub fn epik_sdf(&self) -> PathBuf {
        self.file("epik.sdf")
    }
    pub fn epik_mol2(&self) -> PathBuf {
        self.file("epik.mol2")
    }
    pub fn state_penalties(&self) -> PathBuf {
        self.file("state-penalties.out")
    }
    pub fn state_summary(&self) -> PathBuf {
        self.file("state-summary.csv")
    }
    pub fn charged_pdb(&self) -> PathBuf {
        self.file("epik-charged.pdb")
    }
    pub fn charged_mol2(&self) -> PathBuf {
        self.file("epik-charged.mol2")
    }
}
