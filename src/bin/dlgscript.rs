use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dialogue_engine::{
    engine_version, export, ContentPack, DialogueScript, PackManifest, ScriptFormat,
    ScriptParser, ScriptValidator,
};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(author, version, about = "Dialogue script tooling")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a script file, or every script under a directory.
    Validate { path: PathBuf },
    /// Convert a script to another format.
    Convert {
        input: PathBuf,
        #[arg(long)]
        to: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a summary of a script as JSON.
    Inspect { script: PathBuf },
    /// Check a content pack manifest and its scripts against this engine.
    Pack { manifest: PathBuf },
}

#[derive(Serialize)]
struct ScriptSummary<'a> {
    id: &'a str,
    entries: usize,
    labels: Vec<&'a str>,
    characters: Vec<&'a str>,
    choices: usize,
    errors: Vec<String>,
    warnings: Vec<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Validate { path } => validate_path(&path),
        Command::Convert { input, to, output } => convert_script(&input, &to, output.as_deref()),
        Command::Inspect { script } => inspect_script(&script),
        Command::Pack { manifest } => check_pack(&manifest),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn format_of(path: &Path) -> Result<ScriptFormat> {
    ScriptFormat::from_path(path)
        .with_context(|| format!("unknown script format for {}", path.display()))
}

fn load_script(path: &Path) -> Result<DialogueScript> {
    let format = format_of(path)?;
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let script = ScriptParser::new()
        .parse_typed(&raw, format)
        .with_context(|| format!("parse {}", path.display()))?;
    Ok(script)
}

fn validate_path(path: &Path) -> Result<()> {
    let files: Vec<PathBuf> = if path.is_dir() {
        WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(|file| ScriptFormat::from_path(file).is_some())
            .collect()
    } else {
        vec![path.to_path_buf()]
    };

    let validator = ScriptValidator::new();
    let mut failed = 0usize;
    for file in &files {
        let script = match load_script(file) {
            Ok(script) => script,
            Err(error) => {
                eprintln!("{}: {error:#}", file.display());
                failed += 1;
                continue;
            }
        };
        let result = validator.validate(&script);
        for warning in result.warning_messages() {
            eprintln!("{}: warning: {warning}", file.display());
        }
        for error in result.error_messages() {
            eprintln!("{}: error: {error}", file.display());
        }
        if result.is_valid() {
            println!("{}: ok", file.display());
        } else {
            failed += 1;
        }
    }
    info!(files = files.len(), failed, "validation finished");

    if failed > 0 {
        bail!("{failed} of {} script(s) failed validation", files.len());
    }
    Ok(())
}

fn convert_script(input: &Path, to: &str, output: Option<&Path>) -> Result<()> {
    let target = ScriptFormat::parse(to).with_context(|| format!("unknown target format '{to}'"))?;
    let script = load_script(input)?;
    let rendered = match target {
        ScriptFormat::Json => export::to_json(&script)?,
        ScriptFormat::Yaml => export::to_yaml(&script)?,
        ScriptFormat::Dsl => export::to_dsl(&script)?,
    };
    debug!(script = %script.id, format = %target, "converted script");

    match output {
        Some(output) => {
            if let Some(parent) = output.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(output, rendered).with_context(|| format!("write {}", output.display()))?;
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

fn inspect_script(path: &Path) -> Result<()> {
    let script = load_script(path)?;
    let result = ScriptValidator::new().validate(&script);

    let mut characters: Vec<&str> = script
        .entries
        .iter()
        .filter_map(|entry| entry.character_id.as_deref())
        .collect();
    characters.sort_unstable();
    characters.dedup();

    let summary = ScriptSummary {
        id: &script.id,
        entries: script.len(),
        labels: script
            .entries
            .iter()
            .filter_map(|entry| entry.label.as_deref())
            .collect(),
        characters,
        choices: script.entries.iter().map(|entry| entry.choices.len()).sum(),
        errors: result.error_messages(),
        warnings: result.warning_messages(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn check_pack(manifest_path: &Path) -> Result<()> {
    let manifest = PackManifest::load(manifest_path)?;
    let root = manifest_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let engine = engine_version();

    // Dependencies are resolved against sibling pack directories.
    let mut installed = std::collections::BTreeMap::new();
    if let Some(packs_dir) = root.parent() {
        for entry in WalkDir::new(packs_dir)
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name() == dialogue_engine::PACK_MANIFEST_FILE)
        {
            match PackManifest::load(entry.path()) {
                Ok(peer) if peer.id != manifest.id => {
                    installed.insert(peer.id, peer.version);
                }
                Ok(_) => {}
                Err(error) => debug!(path = %entry.path().display(), %error, "skipping peer manifest"),
            }
        }
    }

    let pack = ContentPack::load(manifest, &engine, &installed, |source| {
        fs::read_to_string(root.join(&source.path))
    })?;
    for warning in &pack.warnings {
        eprintln!("warning: {warning}");
    }
    println!(
        "{} {}: {} script(s) ok for engine {engine}",
        pack.manifest.id,
        pack.manifest.version,
        pack.scripts.len()
    );
    Ok(())
}
