//! # Workflows Module
//!
//! The top-level entry points of protoprep.
//!
//! ## Overview
//!
//! A workflow owns the order of the pipeline stages, the failure policy between
//! them and the progress events emitted along the way. The chemistry itself is
//! reached only through the [`Toolchain`](crate::engine::tools::Toolchain)
//! seams, so the same code runs against real subprocesses or in-process fakes.
//!
//! ## Architecture
//!
//! - **Enumeration Workflow** ([`enumerate`]) - One molecule at one pH: input
//!   resolution, normalization and initial charging, state enumeration,
//!   reformatting with per-state recharging, and report writing.
//! - **Batch Workflow** ([`batch`]) - Reads the ligand table, applies the
//!   molecule selection and runs the enumeration workflow for every selected
//!   row at every configured pH.

pub mod batch;
pub mod enumerate;

#[cfg(test)]
pub(crate) mod fakes;
