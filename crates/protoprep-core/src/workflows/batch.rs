use super::enumerate::{self, EnsembleSummary, MoleculeOutcome};
use crate::core::io::ligand_table::read_ligand_table;
use crate::engine::config::{BatchConfig, MoleculeRequest};
use crate::engine::error::PipelineError;
use crate::engine::layout::OutputLayout;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tools::Toolchain;
use tracing::{info, instrument, warn};

/// Outcomes of every molecule run, in execution order (pH-major).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    pub outcomes: Vec<MoleculeOutcome>,
}

impl BatchReport {
    pub fn completed(&self) -> impl Iterator<Item = &EnsembleSummary> {
        self.outcomes.iter().filter_map(MoleculeOutcome::summary)
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.completed().count()
    }

    /// Enumerated states dropped across all molecules because recharging failed.
    pub fn dropped_states(&self) -> usize {
        self.completed().map(|summary| summary.dropped).sum()
    }
}

/// Runs the enumeration workflow for every selected ligand table row at every
/// configured pH.
///
/// The table is read once up front and every selected request is validated
/// before any molecule is processed. The first fatal error aborts the batch.
#[instrument(skip_all, name = "batch_workflow")]
pub fn run(
    config: &BatchConfig,
    tools: Toolchain<'_>,
    reporter: &ProgressReporter,
) -> Result<BatchReport, PipelineError> {
    let records =
        read_ligand_table(&config.ligand_table).map_err(|source| PipelineError::LigandTable {
            path: config.ligand_table.clone(),
            source,
        })?;
    info!(
        "Read {} ligand table rows from {}",
        records.len(),
        config.ligand_table.display()
    );

    for name in config.selection.unmatched_names(&records) {
        warn!("Selected molecule '{}' does not appear in the ligand table", name);
        reporter.report(Progress::Message(format!(
            "'{name}' is not in the ligand table"
        )));
    }

    let requests: Vec<MoleculeRequest> = records
        .iter()
        .filter_map(|record| config.selection.request_for(record))
        .collect();
    for request in &requests {
        request.selector()?;
    }

    let layout = OutputLayout::new(&config.output_root);
    let mut report = BatchReport::default();
    for &ph in &config.ph_values {
        info!("Processing {} molecules at pH {}", requests.len(), ph);
        for request in &requests {
            let outcome =
                enumerate::run(request, ph, &layout, &config.pipeline, tools, reporter)?;
            report.outcomes.push(outcome);
        }
    }

    info!(
        "Batch complete: {} prepared, {} skipped, {} states dropped",
        report.completed().count(),
        report.skipped_count(),
        report.dropped_states()
    );
    Ok(report)
}
