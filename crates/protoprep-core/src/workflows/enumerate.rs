use crate::core::chem::residue::ResidueTag;
use crate::core::chem::tripos::assign_tripos_types;
use crate::core::io::mol2::{Mol2File, write_mol2_preserving_atom_names};
use crate::core::io::pdb::PdbFile;
use crate::core::io::{StructureFormat, read_structure};
use crate::core::io::report::{annotate_ensemble, write_penalty_report, write_state_summary};
use crate::core::io::sdf::SdfFile;
use crate::core::io::traits::MolecularFile;
use crate::core::models::molecule::Molecule;
use crate::engine::config::{ChargeOptions, InputSelector, MoleculeRequest, PipelineConfig};
use crate::engine::error::PipelineError;
use crate::engine::layout::{MoleculePaths, OutputLayout};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::retrieval::LigandExpo;
use crate::engine::tools::Toolchain;
use std::path::PathBuf;
use std::slice;
use tracing::{debug, info, instrument, warn};

/// Residue name of the structure written before initial charging.
const DEBUG_RESIDUE_NAME: &str = "debug";

/// What one completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleSummary {
    pub name: String,
    pub ph: f64,
    pub residue_tag: ResidueTag,
    /// Entries produced by the enumerator.
    pub enumerated: usize,
    /// Entries that were recharged and written.
    pub charged: usize,
    /// Entries dropped because recharging failed.
    pub dropped: usize,
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoleculeOutcome {
    Completed(EnsembleSummary),
    /// Initial charging failed. Nothing past the debug structure was written.
    Skipped {
        name: String,
        ph: f64,
        reason: String,
    },
}

impl MoleculeOutcome {
    pub fn name(&self) -> &str {
        match self {
            MoleculeOutcome::Completed(summary) => &summary.name,
            MoleculeOutcome::Skipped { name, .. } => name,
        }
    }

    pub fn summary(&self) -> Option<&EnsembleSummary> {
        match self {
            MoleculeOutcome::Completed(summary) => Some(summary),
            MoleculeOutcome::Skipped { .. } => None,
        }
    }
}

struct ResolvedInput {
    molecule: Molecule,
    tag: ResidueTag,
    /// Reference models already carry charges; generated and local inputs do not.
    needs_charging: bool,
}

enum Normalized {
    Ready(ResolvedInput),
    Skipped(String),
}

struct ChargedEnsemble {
    enumerated: usize,
    members: Vec<Molecule>,
    dropped: usize,
}

/// Runs the full preparation pipeline for one molecule at one pH.
///
/// Every file lands in the molecule directory given by `layout`. Initial
/// charging failures skip the molecule; recharging failures drop single
/// states. Everything else is returned as an error, including a charge
/// engine that cannot be launched.
#[instrument(skip_all, name = "enumeration_workflow", fields(molecule = %request.name, ph = ph))]
pub fn run(
    request: &MoleculeRequest,
    ph: f64,
    layout: &OutputLayout,
    config: &PipelineConfig,
    tools: Toolchain<'_>,
    reporter: &ProgressReporter,
) -> Result<MoleculeOutcome, PipelineError> {
    let selector = request.selector()?;
    let name = request.name.as_str();
    reporter.report(Progress::MoleculeStart {
        name: name.to_string(),
        ph,
    });
    info!("Preparing '{}' at pH {}", name, ph);

    let paths = layout.molecule(ph, name);
    paths
        .create_dir()
        .map_err(PipelineError::io(paths.dir()))?;

    // === Stage 1: Input resolution ===
    reporter.report(Progress::StageStart { name: "Input" });
    let input = resolve_input(name, &selector, &paths, config, tools)?;

    // === Stage 2: Normalization and initial charges ===
    reporter.report(Progress::StageStart {
        name: "Normalization",
    });
    let input = match normalize_input(name, input, &paths, tools)? {
        Normalized::Ready(input) => input,
        Normalized::Skipped(reason) => {
            reporter.report(Progress::MoleculeSkipped {
                reason: reason.clone(),
            });
            return Ok(MoleculeOutcome::Skipped {
                name: name.to_string(),
                ph,
                reason,
            });
        }
    };

    // === Stage 3: Protonation state enumeration ===
    reporter.report(Progress::StageStart { name: "Enumeration" });
    enumerate_states(&input, &paths, ph, config, tools)?;

    // === Stage 4: Reformatting and recharging ===
    reporter.report(Progress::StageStart { name: "Recharging" });
    let ensemble = reformat_results(&paths, tools, reporter)?;
    if ensemble.dropped > 0 {
        warn!(
            "Dropped {} of {} enumerated states of '{}'",
            ensemble.dropped, ensemble.enumerated, name
        );
    }

    // === Stage 5: Reports ===
    reporter.report(Progress::StageStart { name: "Reports" });
    write_reports(&ensemble.members, &input.tag, &paths)?;

    reporter.report(Progress::MoleculeFinish);
    info!(
        "Wrote {} charged states of '{}' to {}",
        ensemble.members.len(),
        name,
        paths.dir().display()
    );
    Ok(MoleculeOutcome::Completed(EnsembleSummary {
        name: name.to_string(),
        ph,
        residue_tag: input.tag,
        enumerated: ensemble.enumerated,
        charged: ensemble.members.len(),
        dropped: ensemble.dropped,
        output_dir: paths.dir().to_path_buf(),
    }))
}

fn resolve_input(
    name: &str,
    selector: &InputSelector,
    paths: &MoleculePaths,
    config: &PipelineConfig,
    tools: Toolchain<'_>,
) -> Result<ResolvedInput, PipelineError> {
    match selector {
        InputSelector::ReferenceCode(field) => {
            let tag = ResidueTag::from_reference_code(field)?;
            let pdb_path = paths.input_pdb();
            let sdf_path = paths.input_sdf();
            LigandExpo::new(config.ligand_expo_base_url.as_str()).fetch_models(
                tools.retriever,
                tag.as_str(),
                &pdb_path,
                &sdf_path,
            )?;

            let named = PdbFile::read_first_from_path(&pdb_path)
                .map_err(PipelineError::structure(&pdb_path))?;
            let mut molecule = SdfFile::read_first_from_path(&sdf_path)
                .map_err(PipelineError::structure(&sdf_path))?;
            copy_atom_names(&named, &mut molecule);
            Ok(ResolvedInput {
                molecule,
                tag,
                needs_charging: false,
            })
        }
        InputSelector::Smiles(smiles) => {
            let tag = ResidueTag::from_name(name)?;
            let mut molecule = tools.conformer_generator.generate(smiles)?;
            molecule.title = tag.to_string();
            Ok(ResolvedInput {
                molecule,
                tag,
                needs_charging: true,
            })
        }
        InputSelector::StructureFile(path) => {
            let tag = ResidueTag::from_name(name)?;
            info!("Reading input structure {}", path.display());
            let source = if StructureFormat::from_path(path) == Some(StructureFormat::Pdb) {
                let perceived = paths.perceived_mol2();
                tools.bond_perceiver.convert(path, &perceived)?;
                perceived
            } else {
                path.clone()
            };
            let molecule = read_structure(&source).map_err(PipelineError::structure(&source))?;
            if molecule.atom_count() > 1 && molecule.bonds().is_empty() {
                return Err(PipelineError::NoConnectivity {
                    path: source,
                    atoms: molecule.atom_count(),
                });
            }
            Ok(ResolvedInput {
                molecule,
                tag,
                needs_charging: true,
            })
        }
    }
}

/// Copies atom names position by position. Extra atoms on either side keep
/// their own names.
fn copy_atom_names(source: &Molecule, target: &mut Molecule) {
    if source.atom_count() != target.atom_count() {
        debug!(
            "Reference models disagree on atom count ({} named, {} bonded)",
            source.atom_count(),
            target.atom_count()
        );
    }
    for (atom, named) in target.atoms_mut().iter_mut().zip(source.atoms()) {
        atom.name = named.name.clone();
    }
}

fn normalize_input(
    name: &str,
    mut input: ResolvedInput,
    paths: &MoleculePaths,
    tools: Toolchain<'_>,
) -> Result<Normalized, PipelineError> {
    assign_tripos_types(&mut input.molecule);
    if !input.needs_charging {
        return Ok(Normalized::Ready(input));
    }

    let debug_path = paths.debug_mol2();
    write_mol2_preserving_atom_names(
        &debug_path,
        slice::from_ref(&input.molecule),
        DEBUG_RESIDUE_NAME,
    )
    .map_err(PipelineError::structure(&debug_path))?;

    match tools
        .charge_engine
        .assign_charges(&input.molecule, &ChargeOptions::initial())
    {
        Ok(charged) => {
            debug!(
                "Charged '{}': net formal charge {}, total partial charge {:.4}",
                name,
                charged.net_formal_charge(),
                charged.total_partial_charge()
            );
            input.molecule = charged;
            Ok(Normalized::Ready(input))
        }
        Err(err) => {
            let err = err.into_recoverable()?;
            warn!("Skipping '{}': initial charging failed: {}", name, err);
            Ok(Normalized::Skipped(err.to_string()))
        }
    }
}

fn enumerate_states(
    input: &ResolvedInput,
    paths: &MoleculePaths,
    ph: f64,
    config: &PipelineConfig,
    tools: Toolchain<'_>,
) -> Result<(), PipelineError> {
    let input_path = paths.input_mol2();
    write_mol2_preserving_atom_names(
        &input_path,
        slice::from_ref(&input.molecule),
        input.tag.as_str(),
    )
    .map_err(PipelineError::structure(&input_path))?;

    tools
        .enumerator
        .enumerate(&input_path, &paths.epik_mae(), ph, &config.enumeration)?;
    Ok(())
}

fn reformat_results(
    paths: &MoleculePaths,
    tools: Toolchain<'_>,
    reporter: &ProgressReporter,
) -> Result<ChargedEnsemble, PipelineError> {
    let native = paths.epik_mae();
    let sdf_path = paths.epik_sdf();
    let mol2_path = paths.epik_mol2();
    tools.converter.convert(&native, &sdf_path)?;
    tools.converter.convert(&native, &mol2_path)?;

    let annotated =
        SdfFile::read_all_from_path(&sdf_path).map_err(PipelineError::structure(&sdf_path))?;
    let structures =
        Mol2File::read_all_from_path(&mol2_path).map_err(PipelineError::structure(&mol2_path))?;
    if annotated.len() != structures.len() {
        return Err(PipelineError::EnsembleMismatch {
            sdf: annotated.len(),
            mol2: structures.len(),
        });
    }

    info!("Recharging {} enumerated states", structures.len());
    reporter.report(Progress::TaskStart {
        total_steps: structures.len() as u64,
    });
    let options = ChargeOptions::recharge();
    let mut members = Vec::with_capacity(structures.len());
    let mut dropped = 0;
    for (index, (tags, structure)) in annotated.iter().zip(&structures).enumerate() {
        match tools.charge_engine.assign_charges(structure, &options) {
            Ok(mut charged) => {
                debug!(
                    "State {} recharged: net formal charge {}, total partial charge {:.4}",
                    index + 1,
                    charged.net_formal_charge(),
                    charged.total_partial_charge()
                );
                assign_tripos_types(&mut charged);
                charged.copy_sd_data_from(tags);
                members.push(charged);
            }
            Err(err) => {
                let err = err.into_recoverable()?;
                warn!("Dropping state {}: recharging failed: {}", index + 1, err);
                dropped += 1;
            }
        }
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);

    Ok(ChargedEnsemble {
        enumerated: structures.len(),
        members,
        dropped,
    })
}

fn write_reports(
    members: &[Molecule],
    tag: &ResidueTag,
    paths: &MoleculePaths,
) -> Result<(), PipelineError> {
    let annotations = annotate_ensemble(members)?;
    write_penalty_report(&paths.state_penalties(), &annotations)?;
    write_state_summary(&paths.state_summary(), members, &annotations)?;

    let labelled: Vec<Molecule> = members
        .iter()
        .cloned()
        .map(|mut member| {
            member.set_residue_name(tag.as_str());
            member
        })
        .collect();
    let pdb_path = paths.charged_pdb();
    PdbFile::write_all_to_path(&labelled, &pdb_path)
        .map_err(PipelineError::structure(&pdb_path))?;

    let mol2_path = paths.charged_mol2();
    write_mol2_preserving_atom_names(&mol2_path, members, tag.as_str())
        .map_err(PipelineError::structure(&mol2_path))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::report::ReportError;
    use crate::engine::config::ConfigError;
    use crate::engine::error::ToolError;
    use crate::engine::tools::charge::CommandChargeEngine;
    use crate::engine::tools::command::CommandTemplate;
    use crate::engine::tools::Toolchain;
    use crate::workflows::fakes::{FakeTools, acetamide, epik_state};
    use std::fs;
    use tempfile::tempdir;

    fn two_states() -> Vec<Molecule> {
        vec![epik_state("state-1", "0.0000", 0), epik_state("state-2", "1.2500", -1)]
    }

    fn run_request(
        request: &MoleculeRequest,
        fakes: &FakeTools,
        layout: &OutputLayout,
    ) -> Result<MoleculeOutcome, PipelineError> {
        run(
            request,
            7.0,
            layout,
            &PipelineConfig::default(),
            fakes.toolchain(),
            &ProgressReporter::new(),
        )
    }

    #[test]
    fn smiles_input_runs_every_stage() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        let fakes = FakeTools::new(two_states());
        let request = MoleculeRequest::new("Pyruvate").with_smiles("CC(=O)C(=O)[O-]");

        let outcome = run_request(&request, &fakes, &layout).unwrap();
        let summary = outcome.summary().unwrap();
        assert_eq!(summary.residue_tag.as_str(), "PYR");
        assert_eq!((summary.enumerated, summary.charged, summary.dropped), (2, 2, 0));
        assert_eq!(fakes.conformer_generator.requests(), vec!["CC(=O)C(=O)[O-]"]);
        assert_eq!(fakes.charge_engine.call_count(), 3);
        assert_eq!(fakes.enumerator.ph_values(), vec![7.0]);

        let paths = layout.molecule(7.0, "Pyruvate");
        assert!(paths.debug_mol2().exists());
        let input = Mol2File::read_first_from_path(paths.input_mol2()).unwrap();
        assert_eq!(input.title, "PYR");
        assert_eq!(input.residue_name(), Some("PYR"));

        let report = fs::read_to_string(paths.state_penalties()).unwrap();
        let lines: Vec<_> = report.lines().collect();
        assert_eq!(lines, vec!["      0.00000000", "      1.25000000"]);

        let charged = Mol2File::read_all_from_path(paths.charged_mol2()).unwrap();
        assert_eq!(charged.len(), 2);
        assert!(charged.iter().all(|m| m.residue_name() == Some("PYR")));
        let pdb = PdbFile::read_all_from_path(paths.charged_pdb()).unwrap();
        assert_eq!(pdb.len(), 2);
        assert!(pdb[0].atoms().iter().all(|a| a.residue_name == "PYR"));

        let summary_csv = fs::read_to_string(paths.state_summary()).unwrap();
        assert_eq!(summary_csv.lines().count(), 3);
    }

    #[test]
    fn initial_charging_failure_skips_after_debug_structure() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        let fakes = FakeTools::new(two_states()).with_failing_charge_calls(&[0]);
        let request = MoleculeRequest::new("Pyruvate").with_smiles("CC(=O)C(=O)O");

        let outcome = run_request(&request, &fakes, &layout).unwrap();
        assert!(matches!(outcome, MoleculeOutcome::Skipped { ref name, .. } if name == "Pyruvate"));

        let paths = layout.molecule(7.0, "Pyruvate");
        let debug = Mol2File::read_first_from_path(paths.debug_mol2()).unwrap();
        assert_eq!(debug.residue_name(), Some("debug"));
        assert!(!paths.input_mol2().exists());
        assert!(fakes.enumerator.ph_values().is_empty());
    }

    #[test]
    fn unlaunchable_charge_engine_is_fatal() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        let fakes = FakeTools::new(two_states());
        let engine = CommandChargeEngine::new(CommandTemplate::new(
            "/nonexistent/molcharge",
            &["-in", "{input}", "-out", "{output}"],
        ));
        let tools = Toolchain {
            charge_engine: &engine,
            ..fakes.toolchain()
        };

        for request in [
            MoleculeRequest::new("Pyruvate").with_smiles("CC(=O)C(=O)O"),
            MoleculeRequest::new("NADH").with_reference_code("NAI"),
        ] {
            let err = run(
                &request,
                7.0,
                &layout,
                &PipelineConfig::default(),
                tools,
                &ProgressReporter::new(),
            )
            .unwrap_err();
            assert!(matches!(err, PipelineError::Tool(ToolError::Spawn { .. })));
        }
        assert!(!layout.molecule(7.0, "Pyruvate").state_penalties().exists());
        assert!(!layout.molecule(7.0, "NADH").state_penalties().exists());
    }

    #[test]
    fn recharging_failure_drops_only_that_state() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        // Call 0 charges the input, calls 1 and 2 recharge the two states.
        let fakes = FakeTools::new(two_states()).with_failing_charge_calls(&[2]);
        let request = MoleculeRequest::new("Pyruvate").with_smiles("CC(=O)C(=O)O");

        let outcome = run_request(&request, &fakes, &layout).unwrap();
        let summary = outcome.summary().unwrap();
        assert_eq!((summary.enumerated, summary.charged, summary.dropped), (2, 1, 1));

        let paths = layout.molecule(7.0, "Pyruvate");
        let report = fs::read_to_string(paths.state_penalties()).unwrap();
        assert_eq!(report.lines().collect::<Vec<_>>(), vec!["      0.00000000"]);
    }

    #[test]
    fn mismatched_streams_are_fatal() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        let mut mol2_states = two_states();
        mol2_states.push(epik_state("state-3", "2.0", 0));
        let fakes = FakeTools::with_streams(two_states(), mol2_states);
        let request = MoleculeRequest::new("Pyruvate").with_smiles("CC(=O)C(=O)O");

        let err = run_request(&request, &fakes, &layout).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::EnsembleMismatch { sdf: 2, mol2: 3 }
        ));
    }

    #[test]
    fn missing_penalty_tag_is_fatal() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        let fakes = FakeTools::new(vec![acetamide("untagged")]);
        let request = MoleculeRequest::new("Pyruvate").with_smiles("CC(=O)C(=O)O");

        let err = run_request(&request, &fakes, &layout).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Report(ReportError::MissingTag { index: 0, .. })
        ));
    }

    #[test]
    fn reference_code_fetches_models_and_keeps_pdb_names() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        let fakes = FakeTools::new(two_states());
        let request = MoleculeRequest::new("NADH").with_reference_code("NAI NAD");

        let outcome = run_request(&request, &fakes, &layout).unwrap();
        assert_eq!(outcome.summary().unwrap().residue_tag.as_str(), "NAI");
        assert_eq!(
            fakes.retriever.urls(),
            vec![
                "http://ligand-expo.rcsb.org/reports/N/NAI/NAI_model.pdb",
                "http://ligand-expo.rcsb.org/reports/N/NAI/NAI_model.sdf",
            ]
        );
        // Reference models are only charged per enumerated state.
        assert_eq!(fakes.charge_engine.call_count(), 2);

        let paths = layout.molecule(7.0, "NADH");
        assert!(!paths.debug_mol2().exists());
        let input = Mol2File::read_first_from_path(paths.input_mol2()).unwrap();
        let names: Vec<_> = input.atoms().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["CH3", "C", "O", "N"]);
        assert_eq!(input.residue_name(), Some("NAI"));
        assert_eq!(input.atoms()[1].tripos_type, "C.2");
    }

    #[test]
    fn local_structure_file_is_read_by_extension() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path().join("out"));
        let structure = dir.path().join("akg.mol2");
        Mol2File::write_all_to_path(&[acetamide("akg")], &structure).unwrap();
        let fakes = FakeTools::new(two_states());
        let request = MoleculeRequest::new("Alpha-ketoglutaric acid").with_structure_file(&structure);

        let outcome = run_request(&request, &fakes, &layout).unwrap();
        assert_eq!(outcome.summary().unwrap().residue_tag.as_str(), "ALP");
        assert!(fakes.conformer_generator.requests().is_empty());
        assert_eq!(fakes.charge_engine.call_count(), 3);
    }

    #[test]
    fn pdb_input_goes_through_bond_perception() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path().join("out"));
        let structure = dir.path().join("nadh.pdb");
        PdbFile::write_all_to_path(&[acetamide("NADH")], &structure).unwrap();
        let fakes = FakeTools::new(two_states());
        let request = MoleculeRequest::new("NADH").with_structure_file(&structure);

        run_request(&request, &fakes, &layout).unwrap();
        assert_eq!(fakes.bond_perceiver.inputs(), vec![structure]);
        let paths = layout.molecule(7.0, "NADH");
        let perceived = Mol2File::read_first_from_path(paths.perceived_mol2()).unwrap();
        assert_eq!(perceived.bonds().len(), 3);
    }

    #[test]
    fn structure_without_bonds_is_fatal() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path().join("out"));
        let structure = dir.path().join("nadh.pdb");
        fs::write(
            &structure,
            "\
HETATM    1  C1  NAD A   1       0.000   0.000   0.000  1.00  0.00           C
HETATM    2  O1  NAD A   1       1.200   0.000   0.000  1.00  0.00           O
HETATM    3  C2  NAD A   1      -1.500   0.000   0.000  1.00  0.00           C
END
",
        )
        .unwrap();
        let fakes = FakeTools::new(two_states());
        let request = MoleculeRequest::new("NADH").with_structure_file(&structure);

        let err = run_request(&request, &fakes, &layout).unwrap_err();
        assert!(matches!(err, PipelineError::NoConnectivity { atoms: 3, .. }));
        assert_eq!(fakes.charge_engine.call_count(), 0);
        assert!(fakes.enumerator.ph_values().is_empty());
    }

    #[test]
    fn request_without_single_source_is_rejected() {
        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        let fakes = FakeTools::new(two_states());
        let request = MoleculeRequest::new("NADH")
            .with_smiles("C")
            .with_reference_code("NAI");

        let err = run_request(&request, &fakes, &layout).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidConfiguration(ConfigError::AmbiguousInput { provided: 2, .. })
        ));
        assert!(!layout.ph_dir(7.0).exists());
    }

    #[test]
    fn progress_events_bracket_the_molecule() {
        use std::sync::Mutex;

        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        let fakes = FakeTools::new(two_states());
        let request = MoleculeRequest::new("Pyruvate").with_smiles("CC(=O)C(=O)O");
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));

        run(
            &request,
            6.6,
            &layout,
            &PipelineConfig::default(),
            fakes.toolchain(),
            &reporter,
        )
        .unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert!(matches!(events.first(), Some(Progress::MoleculeStart { ph, .. }) if *ph == 6.6));
        assert!(matches!(events.last(), Some(Progress::MoleculeFinish)));
        let increments = events
            .iter()
            .filter(|e| matches!(e, Progress::TaskIncrement))
            .count();
        assert_eq!(increments, 2);
    }

    #[test]
    fn skipped_molecule_reports_a_skip_event() {
        use std::sync::Mutex;

        let dir = tempdir().unwrap();
        let layout = OutputLayout::new(dir.path());
        let fakes = FakeTools::new(two_states()).with_failing_charge_calls(&[0]);
        let request = MoleculeRequest::new("Pyruvate").with_smiles("CC(=O)C(=O)O");
        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));

        run(
            &request,
            7.0,
            &layout,
            &PipelineConfig::default(),
            fakes.toolchain(),
            &reporter,
        )
        .unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        assert!(matches!(events.last(), Some(Progress::MoleculeSkipped { .. })));
        assert!(!events.iter().any(|e| matches!(e, Progress::MoleculeFinish)));
    }
}
