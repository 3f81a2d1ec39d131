//! # Core Models Module
//!
//! Data structures for the molecule records that flow through the pipeline.
//!
//! A [`molecule::Molecule`] is intentionally flat: an ordered list of atoms, a
//! list of bonds referring to atoms by position, and an ordered list of SD data
//! tags. Positional atom order is significant because several pipeline steps
//! (copying reference atom names, pairing converted ensembles) join records by
//! index.
//!
//! - [`atom`] - Atom identity, coordinates, charges and residue labels
//! - [`topology`] - Bonds and bond orders
//! - [`molecule`] - The molecule record itself
//!
//! ```ignore
//! use protoprep::core::models::{atom::Atom, molecule::Molecule, topology::BondOrder};
//! use nalgebra::Point3;
//!
//! let mut molecule = Molecule::new("water");
//! let o = molecule.add_atom(Atom::new("O1", "O", Point3::new(0.0, 0.0, 0.0)));
//! let h = molecule.add_atom(Atom::new("H1", "H", Point3::new(0.96, 0.0, 0.0)));
//! molecule.add_bond(o, h, BondOrder::Single)?;
//! ```

pub mod atom;
pub mod molecule;
pub mod topology;
