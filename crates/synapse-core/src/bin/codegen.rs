//! CortexSynapse code generator
//!
//! `generate` turns a whitelist plus per-platform OpenAPI specs into the
//! registry artifacts the server loads; `docs` renders those artifacts as
//! markdown.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use openapi_parser::{OpenApiParser, ParsedSpec};
use synapse_core::{
    generate_docs, generate_platform_tools_file, generate_unified_tools_file, load_generated,
    logging, GenerationReport, Platform, Whitelist,
};

/// CortexSynapse - generate MCP tool registries from OpenAPI specs
#[derive(Parser, Debug)]
#[command(name = "cortexsynapse-codegen")]
#[command(version)]
#[command(about = "Generate CortexSynapse tool registries and documentation")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate registry artifacts from a whitelist and platform specs
    Generate {
        /// Whitelist JSON file
        #[arg(long, env = "CORTEXSYNAPSE_WHITELIST", default_value = "whitelist.json")]
        whitelist: PathBuf,

        /// Directory containing xsiam.{yaml,yml,json} and xsoar.{yaml,yml,json}
        #[arg(long, env = "CORTEXSYNAPSE_SPECS_DIR", default_value = "specs")]
        specs_dir: PathBuf,

        /// Where generated_*_tools.json files are written
        #[arg(long, env = "CORTEXSYNAPSE_GENERATED_DIR", default_value = "generated")]
        output_dir: PathBuf,
    },

    /// Render markdown documentation from generated registries
    Docs {
        #[arg(long, env = "CORTEXSYNAPSE_GENERATED_DIR", default_value = "generated")]
        generated_dir: PathBuf,

        #[arg(long, env = "CORTEXSYNAPSE_DOCS_DIR", default_value = "docs")]
        docs_dir: PathBuf,
    },
}

/// First of `{platform}.yaml`, `.yml`, `.json` that exists
fn find_spec(specs_dir: &Path, platform: Platform) -> Option<PathBuf> {
    ["yaml", "yml", "json"]
        .iter()
        .map(|ext| specs_dir.join(format!("{}.{}", platform.as_str(), ext)))
        .find(|path| path.is_file())
}

fn log_report(report: &GenerationReport) {
    info!(
        "{}: {} tools written to {:?}",
        report.source, report.emitted, report.output
    );
    for skipped in &report.skipped {
        warn!("{}: skipped {}: {}", report.source, skipped.key, skipped.reason);
    }
}

fn generate(whitelist: &Path, specs_dir: &Path, output_dir: &Path) -> anyhow::Result<()> {
    let whitelist = Whitelist::load(whitelist)
        .with_context(|| format!("Failed to load whitelist {:?}", whitelist))?;

    let mut failed = Vec::new();
    let mut xsiam_spec: Option<ParsedSpec> = None;
    let mut xsoar_spec: Option<ParsedSpec> = None;

    for platform in Platform::ALL {
        let Some(spec_path) = find_spec(specs_dir, platform) else {
            error!("No {} spec found in {:?}", platform, specs_dir);
            failed.push(platform);
            continue;
        };

        match generate_platform_tools_file(&spec_path, output_dir, &whitelist, platform) {
            Ok(report) => log_report(&report),
            Err(e) => {
                error!("{} generation failed: {}", platform, e);
                failed.push(platform);
                continue;
            }
        }

        // unified bindings pick up base URLs and parameters from the parsed spec
        if !whitelist.unified.is_empty() {
            let spec = OpenApiParser::from_file(&spec_path)
                .with_context(|| format!("Failed to re-read {:?}", spec_path))?;
            match platform {
                Platform::Xsiam => xsiam_spec = Some(spec),
                Platform::Xsoar => xsoar_spec = Some(spec),
            }
        }
    }

    if whitelist.unified.is_empty() {
        info!("Whitelist has no unified section, skipping unified registry");
    } else {
        let report = generate_unified_tools_file(
            &whitelist,
            xsiam_spec.as_ref(),
            xsoar_spec.as_ref(),
            output_dir,
        )?;
        log_report(&report);
    }

    if !failed.is_empty() {
        let names: Vec<&str> = failed.iter().map(Platform::as_str).collect();
        bail!("Generation failed for: {}", names.join(", "));
    }
    Ok(())
}

fn docs(generated_dir: &Path, docs_dir: &Path) -> anyhow::Result<()> {
    let registries = load_generated(generated_dir)
        .with_context(|| format!("Failed to load registries from {:?}", generated_dir))?;
    let report = generate_docs(&registries, docs_dir)?;

    info!(
        "Documented {} tools in {} pages, index at {:?}",
        report.tools,
        report.pages.len(),
        report.index
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(tracing::Level::INFO);

    match args.command {
        Command::Generate {
            whitelist,
            specs_dir,
            output_dir,
        } => generate(&whitelist, &specs_dir, &output_dir),
        Command::Docs {
            generated_dir,
            docs_dir,
        } => docs(&generated_dir, &docs_dir),
    }
}
