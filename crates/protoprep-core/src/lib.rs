//! # protoprep Core Library
//!
//! Prepares small-molecule ligands and cofactors for simulation by enumerating
//! their protonation states at a target pH and assigning partial charges to
//! every enumerated state.
//!
//! ## Architectural Philosophy
//!
//! The heavy chemistry (charge assignment, protonation-state enumeration and 3D
//! structure generation) is delegated to external toolkits. This library owns
//! everything around them, split into three layers:
//!
//! - **[`core`]: The Foundation.** Stateless molecule records, the mol2, SDF and
//!   PDB codecs, Tripos atom typing, residue tag rules and report formatting.
//!
//! - **[`engine`]: The Plumbing.** Configuration, error types, progress events,
//!   output layout and the adapters that drive the external tools as
//!   subprocesses behind small traits.
//!
//! - **[`workflows`]: The Public API.** The per-molecule enumeration pipeline
//!   and the batch driver that runs it over a ligand table and a list of pH
//!   conditions.

pub mod core;
pub mod engine;
pub mod workflows;
