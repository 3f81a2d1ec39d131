use crate::cli::FetchArgs;
use crate::error::{CliError, Result};
use crate::retrieval::HttpRetriever;
use indicatif::{ProgressBar, ProgressStyle};
use protoprep::core::chem::residue::first_reference_code;
use protoprep::engine::config::DEFAULT_LIGAND_EXPO_URL;
use protoprep::engine::retrieval::LigandExpo;
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::info;

pub async fn run(args: FetchArgs) -> Result<()> {
    let code = first_reference_code(&args.code)
        .ok_or_else(|| CliError::Argument("The reference code is empty.".to_string()))?;
    let expo = LigandExpo::new(args.base_url.as_deref().unwrap_or(DEFAULT_LIGAND_EXPO_URL));
    tokio::fs::create_dir_all(&args.output_dir).await?;

    let retriever = HttpRetriever::new(Handle::current());
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .map_err(|e| CliError::Other(e.into()))?,
    );
    pb.enable_steady_tick(Duration::from_millis(80));

    for (url, extension) in [(expo.model_pdb_url(code), "pdb"), (expo.model_sdf_url(code), "sdf")] {
        let destination = args.output_dir.join(format!("{code}_model.{extension}"));
        pb.set_message(format!("Downloading {url}"));
        match retriever.download(&url, &destination).await {
            Ok(bytes) => {
                info!("Saved {} ({} bytes)", destination.display(), bytes);
                pb.println(format!("✓ {} -> {}", url, destination.display()));
            }
            Err(e) => {
                pb.finish_with_message("✗ Download failed.");
                return Err(e.into());
            }
        }
    }

    pb.finish_with_message(format!("✓ Reference models of {code} downloaded."));
    Ok(())
}
