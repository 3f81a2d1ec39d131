//! Chemistry rules that run locally, without the external toolkits.
//!
//! - [`elements`] - Element symbol perception from atom names and type labels
//! - [`tripos`] - Tripos (SYBYL) atom and bond type assignment, atom naming
//! - [`residue`] - Residue tag derivation from molecule names and ligand codes

pub mod elements;
pub mod residue;
pub mod tripos;
