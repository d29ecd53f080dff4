pub mod asset;
pub mod bridge;
pub mod catalog;
mod cli;
pub mod composition;
pub mod report;
pub mod rules;
pub mod settings;
mod utils;
pub mod validator;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;

use cli::{Cli, Commands, StrategyArg};
use settings::GuidelineConfig;
use validator::Validator;

pub use asset::Asset;
pub use report::{ValidationReport, Verdict};

const EXIT_PASS: u8 = 0;
const EXIT_FAIL: u8 = 1;
const EXIT_ERROR: u8 = 2;

fn verdict_exit_code(report: &ValidationReport) -> u8 {
    if report.passed() {
        EXIT_PASS
    } else {
        EXIT_FAIL
    }
}

fn check_asset(
    image: &Path,
    config: Option<&Path>,
    json: bool,
    strategy: Option<StrategyArg>,
) -> Result<u8> {
    let mut guideline = GuidelineConfig::load(config)?;
    if let Some(strategy) = strategy {
        guideline.composition.strategy = strategy.into();
    }
    // Credentials resolve here, before any upload is read.
    let validator = Validator::from_config(guideline)?;

    let bytes = std::fs::read(image)
        .with_context(|| format!("Failed to read image {}", image.display()))?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    let report = runtime.block_on(validator.validate_bytes(&bytes))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(verdict_exit_code(&report))
}

fn show_catalog(config: Option<&Path>) -> Result<u8> {
    let catalog = GuidelineConfig::load(config)?.catalog()?;

    for (idx, spec) in catalog.iter().enumerate() {
        let mut extras = Vec::new();
        if let Some(guide_ref) = &spec.guide_ref {
            extras.push(guide_ref.clone());
        }
        if let Some(limit) = spec.max_text_chars {
            extras.push(format!("text <= {limit} chars"));
        }
        if spec.allows_device_mockup {
            extras.push("mockup allowed".to_string());
        }
        println!(
            "{:>2}. {:<22} {:<14} {:>7}KB  {}",
            idx + 1,
            spec.name,
            spec.dimensions_label(),
            spec.size_limit_kb,
            extras.join(", ")
        );
    }

    for collision in catalog.collisions() {
        println!(
            "warning: '{}' shadows '{}' at {} (first match wins)",
            collision.winner, collision.shadowed, collision.dimensions
        );
    }
    Ok(EXIT_PASS)
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    // RUST_LOG still wins when set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::debug!("creative-check starting up...");

    let result = match cli.command {
        Commands::Check {
            image,
            config,
            json,
            strategy,
        } => check_asset(&image, config.as_deref(), json, strategy),
        Commands::Catalog { config } => show_catalog(config.as_deref()),
    };

    ExitCode::from(result.unwrap_or_else(|err| {
        log::error!("{err:#}");
        eprintln!("error: {err:#}");
        EXIT_ERROR
    }))
}
