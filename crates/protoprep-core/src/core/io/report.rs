//! State penalty report and per-state summary table.

use crate::core::models::molecule::Molecule;
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

pub const STATE_PENALTY_TAG: &str = "r_epik_State_Penalty";
pub const IONIZATION_PENALTY_TAG: &str = "r_epik_Ionization_Penalty";
pub const IONIZATION_PENALTY_CHARGING_TAG: &str = "r_epik_Ionization_Penalty_Charging";
pub const IONIZATION_PENALTY_NEUTRAL_TAG: &str = "r_epik_Ionization_Penalty_Neutral";
pub const TOTAL_CHARGE_TAG: &str = "i_epik_Tot_Q";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("State {index} has no '{tag}' tag")]
    MissingTag { index: usize, tag: &'static str },
    #[error("State {index} has a non-numeric '{tag}' tag: '{value}'")]
    InvalidTag {
        index: usize,
        tag: &'static str,
        value: String,
    },
}

/// The enumerator annotations attached to one enumerated state.
///
/// Only the state penalty is required; the other fields are absent when the
/// enumerator did not emit them.
#[derive(Debug, Clone, PartialEq)]
pub struct StateAnnotations {
    pub state_penalty: f64,
    pub ionization_penalty: Option<f64>,
    pub ionization_penalty_charging: Option<f64>,
    pub ionization_penalty_neutral: Option<f64>,
    pub total_charge: Option<i32>,
}

impl StateAnnotations {
    /// Parses the annotations of the state at position `index` of an ensemble.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::MissingTag`] when the state penalty is absent and
    /// [`ReportError::InvalidTag`] when any present tag is not a number.
    pub fn from_molecule(index: usize, molecule: &Molecule) -> Result<Self, ReportError> {
        let state_penalty = parse_tag::<f64>(index, molecule, STATE_PENALTY_TAG)?
            .ok_or(ReportError::MissingTag {
                index,
                tag: STATE_PENALTY_TAG,
            })?;
        Ok(Self {
            state_penalty,
            ionization_penalty: parse_tag(index, molecule, IONIZATION_PENALTY_TAG)?,
            ionization_penalty_charging: parse_tag(index, molecule, IONIZATION_PENALTY_CHARGING_TAG)?,
            ionization_penalty_neutral: parse_tag(index, molecule, IONIZATION_PENALTY_NEUTRAL_TAG)?,
            total_charge: parse_tag(index, molecule, TOTAL_CHARGE_TAG)?,
        })
    }
}

fn parse_tag<T: std::str::FromStr>(
    index: usize,
    molecule: &Molecule,
    tag: &'static str,
) -> Result<Option<T>, ReportError> {
    molecule
        .get_sd_data(tag)
        .map(|value| {
            value.trim().parse::<T>().map_err(|_| ReportError::InvalidTag {
                index,
                tag,
                value: value.to_string(),
            })
        })
        .transpose()
}

/// Parses the annotations of every state, in ensemble order.
pub fn annotate_ensemble(ensemble: &[Molecule]) -> Result<Vec<StateAnnotations>, ReportError> {
    ensemble
        .iter()
        .enumerate()
        .map(|(index, molecule)| StateAnnotations::from_molecule(index, molecule))
        .collect()
}

/// Formats one report line: the state penalty right-aligned in 16 columns with
/// 8 decimals.
pub fn format_penalty_line(state_penalty: f64) -> String {
    format!("{state_penalty:16.8}")
}

/// Writes one state penalty per line, in ensemble order.
pub fn write_penalty_report(
    path: &Path,
    annotations: &[StateAnnotations],
) -> Result<(), ReportError> {
    let mut writer = BufWriter::new(File::create(path)?);
    for state in annotations {
        writeln!(writer, "{}", format_penalty_line(state.state_penalty))?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    index: usize,
    title: &'a str,
    state_penalty: f64,
    ionization_penalty: Option<f64>,
    ionization_penalty_charging: Option<f64>,
    ionization_penalty_neutral: Option<f64>,
    total_charge: Option<i32>,
}

/// Writes a CSV table with all annotations of every state.
pub fn write_state_summary(
    path: &Path,
    ensemble: &[Molecule],
    annotations: &[StateAnnotations],
) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    for (index, (molecule, state)) in ensemble.iter().zip(annotations).enumerate() {
        writer.serialize(SummaryRow {
            index,
            title: &molecule.title,
            state_penalty: state.state_penalty,
            ionization_penalty: state.ionization_penalty,
            ionization_penalty_charging: state.ionization_penalty_charging,
            ionization_penalty_neutral: state.ionization_penalty_neutral,
            total_charge: state.total_charge,
        })?;
    }
    writer.flush()?;
    Ok(())
}
