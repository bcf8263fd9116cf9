//! usdm-fhir - USDM protocol to FHIR command line
//!
//! `export` writes a protocol bundle for one profile, `soa` writes the
//! schedule of activities bundle for one timeline and `import` reads a
//! protocol bundle back into the profile-independent study description.

mod logging;
mod settings;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use usdm_fhir::{
    Diagnostics, Export, ExportOptions, Extra, Import, JsonAssembler, Profile, Severity, SoaExport,
};
use usdm_model::Wrapper;

use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "usdm-fhir", version, about = "USDM protocol to FHIR mapping")]
struct Cli {
    /// Settings file (TOML, YAML or JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Write the diagnostics as an OperationOutcome to this file
    #[arg(long, global = true)]
    diagnostics: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Export a USDM study as a protocol bundle
    Export {
        /// USDM JSON file
        input: PathBuf,

        /// madrid, prism2 or prism3
        #[arg(short, long)]
        profile: Option<String>,

        /// Extra mapping file (YAML or JSON)
        #[arg(short, long)]
        extra: Option<PathBuf>,

        /// Output file, stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export the schedule of activities of one timeline
    Soa {
        /// USDM JSON file
        input: PathBuf,

        /// Schedule timeline id
        #[arg(short, long)]
        timeline: String,

        /// Bundle identifier, generated when omitted
        #[arg(long)]
        uuid: Option<String>,

        #[arg(short, long)]
        extra: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a protocol bundle
    Import {
        /// FHIR bundle JSON file
        input: PathBuf,

        #[arg(short, long)]
        profile: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the recovered extra mapping (YAML) to this file
        #[arg(long)]
        extra_output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref()).context("Failed to load settings")?;
    let _log_guard =
        logging::init_logging(&settings.logging).context("Failed to initialize logging")?;

    match cli.command {
        Command::Export {
            input,
            profile,
            extra,
            output,
        } => {
            let profile = resolve_profile(profile, &settings)?;
            let study = read_study(&input)?;
            let extra = read_extra(extra.or_else(|| settings.export.extra.clone()))?;
            let outcome = Export::with_options(profile, export_options(&settings))
                .export(&study, &extra);
            report(&outcome.diagnostics, cli.diagnostics.as_deref())?;
            let Some(message) = outcome.message else {
                bail!("Export of '{}' as {} failed", input.display(), profile);
            };
            write_output(output.as_deref(), &message)
        }
        Command::Soa {
            input,
            timeline,
            uuid,
            extra,
            output,
        } => {
            let study = read_study(&input)?;
            let extra = read_extra(extra.or_else(|| settings.export.extra.clone()))?;
            let uuid = uuid.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let outcome = SoaExport::with_options(export_options(&settings))
                .export(&study, &timeline, &uuid, &extra);
            report(&outcome.diagnostics, cli.diagnostics.as_deref())?;
            let Some(message) = outcome.message else {
                bail!("SoA export of timeline '{}' failed", timeline);
            };
            write_output(output.as_deref(), &message)
        }
        Command::Import {
            input,
            profile,
            output,
            extra_output,
        } => {
            let profile = resolve_profile(profile, &settings)?;
            let message = fs::read_to_string(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let outcome = Import::new(profile)
                .from_message(&message, &mut JsonAssembler)
                .await;
            report(&outcome.diagnostics, cli.diagnostics.as_deref())?;
            let Some(value) = outcome.value else {
                bail!("Import of '{}' as {} failed", input.display(), profile);
            };
            if let Some(path) = extra_output {
                let yaml = serde_yaml::to_string(&outcome.extra)?;
                fs::write(&path, yaml)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
            }
            write_output(output.as_deref(), &serde_json::to_string_pretty(&value)?)
        }
    }
}

fn resolve_profile(profile: Option<String>, settings: &Settings) -> anyhow::Result<Profile> {
    let name = profile.unwrap_or_else(|| settings.export.profile.clone());
    Ok(name.parse::<Profile>()?)
}

fn export_options(settings: &Settings) -> ExportOptions {
    let mut options = if settings.export.deterministic {
        ExportOptions::deterministic(chrono::DateTime::UNIX_EPOCH)
    } else {
        ExportOptions::default()
    };
    options.resolve_references = settings.export.resolve_references;
    options
}

fn read_study(path: &Path) -> anyhow::Result<usdm_model::Study> {
    let data =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let wrapper = Wrapper::from_json(&data)
        .with_context(|| format!("{} is not a USDM document", path.display()))?;
    tracing::info!(
        study = %wrapper.study.name,
        usdm_version = %wrapper.usdm_version,
        "Study loaded"
    );
    Ok(wrapper.study)
}

fn read_extra(path: Option<PathBuf>) -> anyhow::Result<Extra> {
    let Some(path) = path else {
        return Ok(Extra::default());
    };
    let data =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let extra = if path.extension().is_some_and(|e| e == "json") {
        Extra::from_json(&data)
    } else {
        Extra::from_yaml(&data)
    };
    extra.with_context(|| format!("Invalid extra mapping in {}", path.display()))
}

/// Summarize the diagnostics and optionally persist them
fn report(diagnostics: &Diagnostics, path: Option<&Path>) -> anyhow::Result<()> {
    let warnings = diagnostics.dump(Severity::Warning);
    if !warnings.is_empty() {
        eprintln!("{}", warnings);
    }
    tracing::info!(
        entries = diagnostics.len(),
        warnings = diagnostics.count(Severity::Warning),
        errors = diagnostics.error_count(),
        "Diagnostics"
    );
    if let Some(path) = path {
        let outcome = diagnostics.to_operation_outcome();
        fs::write(path, serde_json::to_string_pretty(&outcome)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}

fn write_output(path: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), bytes = content.len(), "Output written");
        }
        None => println!("{}", content),
    }
    Ok(())
}
