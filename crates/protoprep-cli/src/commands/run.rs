use crate::cli::RunArgs;
use crate::config::load_partial_config;
use crate::error::Result;
use crate::retrieval::HttpRetriever;
use crate::utils::progress::CliProgressHandler;
use protoprep::engine::progress::ProgressReporter;
use protoprep::engine::tools::SubprocessTools;
use protoprep::workflows::{self, enumerate::MoleculeOutcome};
use tokio::runtime::Handle;
use tracing::{info, warn};

pub async fn run(args: RunArgs) -> Result<()> {
    let partial_config = load_partial_config(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let app_config = partial_config.merge_with_cli(&args)?;

    let tools = SubprocessTools::new(&app_config.toolchain);
    let retriever = HttpRetriever::new(Handle::current());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Preparing ligands from {} at pH {:?}...",
        app_config.batch.ligand_table.display(),
        app_config.batch.ph_values
    );
    info!("Invoking the core batch workflow...");

    let report = tokio::task::block_in_place(|| {
        workflows::batch::run(&app_config.batch, tools.toolchain(&retriever), &reporter)
    })?;

    for outcome in &report.outcomes {
        match outcome {
            MoleculeOutcome::Completed(summary) => {
                println!(
                    "✓ {} @ pH {}: {} of {} states charged ({}), written to {}",
                    summary.name,
                    summary.ph,
                    summary.charged,
                    summary.enumerated,
                    summary.residue_tag,
                    summary.output_dir.display()
                );
            }
            MoleculeOutcome::Skipped { name, ph, reason } => {
                warn!("'{}' at pH {} was skipped: {}", name, ph, reason);
                println!("✗ {} @ pH {}: skipped ({})", name, ph, reason);
            }
        }
    }

    if report.outcomes.is_empty() {
        warn!("No ligand table rows matched the selection.");
        println!("Warning: no molecules were selected.");
    } else if report.dropped_states() > 0 {
        println!(
            "Warning: {} enumerated state(s) were dropped because recharging failed.",
            report.dropped_states()
        );
    }

    Ok(())
}
