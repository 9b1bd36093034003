//! ColorMix CLI - Command-line interface for the colormix library
//!
//! Usage:
//!   colormix-cli apply <input.gcode> -o <output.gcode> [options]
//!   colormix-cli apply <input.gcode> --config mix.json
//!   colormix-cli inspect <input.gcode>

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use colormix::{survey_document, Behavior, ColorMixPipeline, Document, MixConfig, Units};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, LevelFilter};
use std::fs;
use std::path::PathBuf;

/// Color mix and blending for 2-in-1 mixing hotends
#[derive(Parser, Debug)]
#[command(name = "colormix-cli")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Inject mixing commands into sliced G-code
    Apply {
        /// Input G-code file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output G-code file (defaults to <INPUT>.mixed.gcode)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Mix configuration file (JSON format); flags below override it
        #[arg(short, long, value_name = "CONFIG")]
        config: Option<PathBuf>,

        /// Units for start/finish: mm or layer
        #[arg(long)]
        units: Option<String>,

        /// Object to mix under one-at-a-time sequencing (0 = all)
        #[arg(long)]
        object: Option<u32>,

        /// Start position (mm or layer)
        #[arg(long)]
        start: Option<f64>,

        /// Finish position (mm or layer), blend only
        #[arg(long)]
        finish: Option<f64>,

        /// Behavior: fixed or blend
        #[arg(long)]
        behavior: Option<String>,

        /// First extruder percentage at the start (0-100)
        #[arg(long)]
        mix_start: Option<f64>,

        /// First extruder percentage at the finish (0-100)
        #[arg(long)]
        mix_finish: Option<f64>,

        /// Write a JSON report of the pass to this file
        #[arg(long, value_name = "REPORT")]
        stats_json: Option<PathBuf>,
    },

    /// Show layer height, layers, objects and existing mixes in a G-code file
    Inspect {
        /// Input G-code file
        #[arg(value_name = "INPUT")]
        input: PathBuf,
    },
}

/// Settings given on the command line, applied over the base configuration.
#[derive(Debug, Default)]
struct MixOverrides {
    units: Option<String>,
    object: Option<u32>,
    start: Option<f64>,
    finish: Option<f64>,
    behavior: Option<String>,
    mix_start: Option<f64>,
    mix_finish: Option<f64>,
}

impl MixOverrides {
    fn apply_to(self, mut config: MixConfig) -> Result<MixConfig> {
        if let Some(units) = self.units {
            config.units =
                Units::from_name(&units).ok_or_else(|| anyhow!("Unknown units '{}'", units))?;
        }
        if let Some(behavior) = self.behavior {
            config.behavior = Behavior::from_name(&behavior)
                .ok_or_else(|| anyhow!("Unknown behavior '{}'", behavior))?;
        }
        if let Some(object) = self.object {
            config.object_number = object;
        }
        if let Some(start) = self.start {
            config.start_height = start;
        }
        if let Some(finish) = self.finish {
            config.finish_height = finish;
        }
        if let Some(ratio) = self.mix_start {
            config.mix_start = ratio;
        }
        if let Some(ratio) = self.mix_finish {
            config.mix_finish = ratio;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.debug {
        LevelFilter::Debug
    } else if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    match cli.command {
        Commands::Apply {
            input,
            output,
            config,
            units,
            object,
            start,
            finish,
            behavior,
            mix_start,
            mix_finish,
            stats_json,
        } => cmd_apply(
            input,
            output,
            config,
            MixOverrides {
                units,
                object,
                start,
                finish,
                behavior,
                mix_start,
                mix_finish,
            },
            stats_json,
        ),
        Commands::Inspect { input } => cmd_inspect(input),
    }
}

fn cmd_apply(
    input: PathBuf,
    output: Option<PathBuf>,
    config_file: Option<PathBuf>,
    overrides: MixOverrides,
    stats_json: Option<PathBuf>,
) -> Result<()> {
    let output_path = output.unwrap_or_else(|| input.with_extension("mixed.gcode"));

    let base = match config_file {
        Some(path) => {
            info!("Loading mix config from: {}", path.display());
            MixConfig::from_file(&path)
                .with_context(|| format!("Failed to load mix config: {}", path.display()))?
        }
        None => MixConfig::default(),
    };
    let config = overrides.apply_to(base)?;
    info!("Using {}", config);

    info!("Loading G-code file: {}", input.display());
    let mut document = Document::from_file(&input)
        .with_context(|| format!("Failed to read G-code: {}", input.display()))?;
    info!("  {} blocks, {} lines", document.len(), document.line_count());

    let progress = ProgressBar::new(100);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("#>-"),
    );

    let pipeline = ColorMixPipeline::new(config);
    let report = pipeline.process_with_callback(&mut document, |stage, stage_progress| {
        let (base, range, message) = match stage {
            "layer_height" => (0, 5, "Reading layer height..."),
            "range" => (5, 5, "Resolving layer range..."),
            "rewrite" => (10, 85, "Injecting mix commands..."),
            _ => (0, 0, "Processing..."),
        };
        progress.set_position(base + (stage_progress * range as f64) as u64);
        progress.set_message(message);
    })?;

    progress.set_message("Writing output...");
    document
        .write_to_file(&output_path)
        .with_context(|| format!("Failed to write G-code: {}", output_path.display()))?;
    progress.set_position(100);
    progress.finish_with_message("Done!");

    if let Some(report_path) = stats_json {
        let json = report
            .to_json()
            .context("Failed to serialize report to JSON")?;
        fs::write(&report_path, json)
            .with_context(|| format!("Failed to write report to: {}", report_path.display()))?;
        println!("Report written to: {}", report_path.display());
    }

    println!();
    println!("Color mix complete!");
    println!("  Output: {}", output_path.display());
    println!(
        "  Layers {}-{} (zero-based), {} mixed of {} seen",
        report.range.start_layer,
        report.range.end_layer,
        report.stats.layers_mixed,
        report.stats.layers_seen
    );
    println!("  Objects: {}", report.stats.objects_seen);
    if report.stats.stale_blocks_removed > 0 {
        println!(
            "  Replaced {} previous mix block(s)",
            report.stats.stale_blocks_removed
        );
    }

    Ok(())
}

fn cmd_inspect(input: PathBuf) -> Result<()> {
    info!("Loading G-code file: {}", input.display());

    let document = Document::from_file(&input)
        .with_context(|| format!("Failed to read G-code: {}", input.display()))?;
    let survey = survey_document(document.blocks());

    println!("G-code Information:");
    println!("  File: {}", input.display());
    println!("  Blocks: {}", document.len());
    println!("  Lines: {}", document.line_count());
    if survey.layer_height > 0.0 {
        println!("  Layer height: {} mm", survey.layer_height);
    } else {
        println!("  Layer height: not declared (mm positions will map to layer 0)");
    }
    println!("  Layer markers: {}", survey.layer_markers);
    if survey.max_layer >= 0 {
        println!(
            "  Highest layer: {} (layer {} in the slicer preview)",
            survey.max_layer,
            survey.max_layer + 1
        );
    }
    println!("  Objects: {}", survey.objects);
    if survey.mixed_layers.is_empty() {
        println!("  Existing mix blocks: none");
    } else {
        println!(
            "  Existing mix blocks: {} (layers {}..={})",
            survey.mixed_layers.len(),
            survey.mixed_layers.first().copied().unwrap_or_default(),
            survey.mixed_layers.last().copied().unwrap_or_default()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_overrides_replace_config_values() {
        let overrides = MixOverrides {
            units: Some("mm".into()),
            behavior: Some("blend".into()),
            finish: Some(4.0),
            ..Default::default()
        };
        let config = overrides.apply_to(MixConfig::default()).unwrap();
        assert_eq!(config.units, Units::Millimeters);
        assert_eq!(config.behavior, Behavior::Blend);
        assert!((config.finish_height - 4.0).abs() < 1e-9);
        assert!((config.mix_start - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_overrides_reject_unknown_names() {
        let overrides = MixOverrides {
            units: Some("inches".into()),
            ..Default::default()
        };
        assert!(overrides.apply_to(MixConfig::default()).is_err());
    }
}
