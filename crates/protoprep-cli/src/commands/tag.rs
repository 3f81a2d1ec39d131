use crate::cli::TagArgs;
use crate::error::{CliError, Result};
use protoprep::core::chem::residue::ResidueTag;

pub fn run(args: TagArgs) -> Result<()> {
    println!("{}", resolve(&args)?);
    Ok(())
}

fn resolve(args: &TagArgs) -> Result<ResidueTag> {
    let tag = if args.code {
        ResidueTag::from_reference_code(&args.value)
    } else {
        ResidueTag::from_name(&args.value)
    };
    tag.map_err(|e| CliError::Argument(e.to_string()))
}
