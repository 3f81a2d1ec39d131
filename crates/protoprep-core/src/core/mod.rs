//! # Core Module
//!
//! Stateless building blocks shared by every stage of the pipeline.
//!
//! - **Molecular Representation** ([`models`]) - Atoms, bonds and molecule records
//!   carrying SD data tags and optional extra conformers
//! - **File I/O** ([`io`]) - mol2, SDF and PDB codecs, the ligand table reader and
//!   the state penalty report writer
//! - **Chemistry Rules** ([`chem`]) - Element perception, Tripos atom/bond typing,
//!   atom naming and residue tag derivation

pub mod chem;
pub mod io;
pub mod models;
