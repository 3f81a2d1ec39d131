//! # Engine Module
//!
//! The plumbing between the stateless core and the public workflows.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Enumeration settings, charge presets, molecule
//!   requests and the batch configuration builder
//! - **Error Handling** ([`error`]) - Tool, charging, retrieval and pipeline errors
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Output Layout** ([`layout`]) - The per-pH, per-molecule output tree
//! - **Retrieval** ([`retrieval`]) - Remote reference files behind a [`retrieval::Retriever`] trait
//! - **External Tools** ([`tools`]) - Traits for the charge engine, the state
//!   enumerator, the format converter and the 3D generator, with subprocess
//!   implementations

pub mod config;
pub mod error;
pub mod layout;
pub mod progress;
pub mod retrieval;
pub mod tools;
