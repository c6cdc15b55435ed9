//! Command-line driver for the resqual quality-report pipeline.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use resqual::behavior::QualityReportBehavior;
use resqual::model::{is_pdb_id, mmcif, AtomicHierarchy, StructureModel};
use resqual::options::Options;
use resqual::picking::PickTarget;
use resqual::report::HttpFetcher;

fn resolve_structure_path(input: &str) -> Result<PathBuf, String> {
    let path = Path::new(input);
    if path.exists() {
        return Ok(path.to_path_buf());
    }

    if is_pdb_id(input) {
        let pdb_id = input.to_lowercase();
        let models_dir = Path::new("assets/models");
        let local_path = models_dir.join(format!("{pdb_id}.cif"));

        if local_path.exists() {
            return Ok(local_path);
        }

        if !models_dir.exists() {
            std::fs::create_dir_all(models_dir).map_err(|e| {
                format!("Failed to create models directory: {e}")
            })?;
        }

        let url = format!("https://files.rcsb.org/download/{pdb_id}.cif");
        log::info!("Downloading {} from RCSB...", pdb_id.to_uppercase());

        let content = ureq::get(&url)
            .call()
            .map_err(|e| format!("Failed to download {pdb_id}: {e}"))?
            .into_body()
            .read_to_string()
            .map_err(|e| format!("Failed to read response: {e}"))?;

        std::fs::write(&local_path, &content)
            .map_err(|e| format!("Failed to save CIF file: {e}"))?;

        log::info!("Downloaded to {}", local_path.display());
        return Ok(local_path);
    }

    Err(format!("File not found and not a valid PDB code: {input}"))
}

fn load_model(path: &Path) -> Result<AtomicHierarchy, String> {
    let file = File::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    mmcif::read_hierarchy(BufReader::new(file), None)
        .map_err(|e| e.to_string())
}

fn load_options(path: Option<String>) -> Result<Options, String> {
    match path {
        Some(path) => {
            Options::load(Path::new(&path)).map_err(|e| e.to_string())
        }
        None => Ok(Options::default()),
    }
}

/// One line per residue: chain, number, name, color, label.
fn write_report(
    out: &mut impl Write,
    behavior: &QualityReportBehavior<HttpFetcher>,
    theme_name: &str,
    model: &AtomicHierarchy,
) -> std::io::Result<()> {
    let Some(theme) = behavior.theme(theme_name) else {
        return Ok(());
    };
    let colors = theme.create(model);
    writeln!(out, "# {} ({})", model.entry_id(), theme.label())?;
    for (index, info) in model.residues() {
        let target = PickTarget::Residue {
            model: model.id(),
            residue: index,
        };
        let label = behavior.label(&target).unwrap_or_default();
        writeln!(
            out,
            "{}\t{}{}\t{}\t{}\t{label}",
            info.auth_asym_id,
            info.auth_seq_id,
            info.ins_code,
            info.comp_id,
            colors.color(index),
        )?;
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        log::error!("Usage: resqual <PDB_ID or path> [options.toml]");
        std::process::exit(1);
    };

    let options = match load_options(args.next()) {
        Ok(options) => options,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };

    let model = match resolve_structure_path(&input)
        .and_then(|path| load_model(&path))
    {
        Ok(model) => model,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    log::info!(
        "Loaded {} ({} residues, {} chains)",
        model.entry_id(),
        model.residue_count(),
        model.chain_count()
    );

    let fetcher =
        HttpFetcher::new(Duration::from_secs(options.report.timeout_secs));
    let behavior = QualityReportBehavior::new(fetcher, &options);
    let metric = options.report.metric.unwrap_or_default();
    let Some(theme) = behavior.themes().iter().find(|t| t.metric() == metric)
    else {
        std::process::exit(1);
    };
    let theme_name = theme.name();

    if !theme.is_applicable(Some(&model)) {
        log::error!("{} is not a PDB entry", model.entry_id());
        std::process::exit(1);
    }
    if let Err(e) = theme.ensure_attached(&model) {
        log::error!("{e}");
        std::process::exit(1);
    }

    let stdout = std::io::stdout();
    if let Err(e) = write_report(&mut stdout.lock(), &behavior, theme_name, &model)
    {
        log::error!("{e}");
        std::process::exit(1);
    }
    theme.release(&model);
}
