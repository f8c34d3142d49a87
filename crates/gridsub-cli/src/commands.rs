//! CLI command implementations

use crate::output::{format_output, OutputFormat};
use gridsub_core::source::LineSource;
use gridsub_core::{
    run, Config, FileSink, Processor, ProcessorStats, ReaderSource, StartPosition, TailSource,
};
use serde::Serialize;
use std::path::Path;
use tokio::io::BufReader;
use tracing::{info, warn};

/// Summary printed after a run
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub input: String,
    pub interrupted: bool,
    #[serde(flatten)]
    pub stats: ProcessorStats,
}

/// Convert a finished grid log
pub async fn convert(input: &Path, config: &Config, format: &str) -> anyhow::Result<()> {
    let mut source: Box<dyn LineSource> = if input == Path::new("-") {
        Box::new(ReaderSource::new(BufReader::new(tokio::io::stdin())))
    } else {
        let file = tokio::fs::File::open(input).await?;
        Box::new(ReaderSource::new(BufReader::new(file)))
    };

    let report = process(input, source.as_mut(), config).await?;
    print_report(&report, format);
    Ok(())
}

/// Follow a grid log until interrupted
pub async fn follow(
    input: &Path,
    from_start: bool,
    config: &Config,
    format: &str,
) -> anyhow::Result<()> {
    let start = if from_start {
        StartPosition::FromStart
    } else {
        StartPosition::FromEnd
    };
    let mut source = TailSource::open(input, start, config.poll_interval()).await?;

    info!(path = %input.display(), "Following, press Ctrl-C to stop");
    let report = process(input, &mut source, config).await?;
    print_report(&report, format);
    Ok(())
}

/// Print the effective configuration
pub fn check_config(config: &Config, format: &str) -> anyhow::Result<()> {
    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
        OutputFormat::Text => {
            println!("Configuration OK");
            println!("  Grid width:      {}", config.grid_width);
            println!("  Blank threshold: {}", config.blank_run_threshold);
            println!("  Encoding:        {}", config.encoding);
            println!("  Counter:         {:?}", config.counter);
            println!("  Merge policy:    {:?}", config.merge_policy);
            println!("  Underline:       {}", config.underline);
            println!("  Font colors:     {}", !config.no_font_color);
            if let Some(dir) = &config.output_dir {
                println!("  Output dir:      {}", dir.display());
            }
        }
    }
    Ok(())
}

/// Drive a source through a file-backed processor, stopping early on Ctrl-C
async fn process(
    input: &Path,
    source: &mut dyn LineSource,
    config: &Config,
) -> anyhow::Result<RunReport> {
    let sink = FileSink::new(config.output_dir.clone());
    let mut processor = Processor::new(sink, config)?;

    let interrupted = tokio::select! {
        result = run(source, &mut processor) => {
            result?;
            false
        }
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, stopping after the last complete block");
            true
        }
    };

    let (_, stats) = processor.finish();
    Ok(RunReport {
        input: input.display().to_string(),
        interrupted,
        stats,
    })
}

fn print_report(report: &RunReport, format: &str) {
    match OutputFormat::from(format) {
        OutputFormat::Json => println!("{}", format_output(report, format)),
        OutputFormat::Text => {
            let stats = &report.stats;
            println!("Converted: {}", report.input);
            if report.interrupted {
                println!("  (interrupted)");
            }
            println!("  Lines read:     {}", stats.lines);
            println!("  Frames:         {}", stats.frames);
            println!("  Blocks written: {}", stats.blocks_written);
            println!("  Empty frames:   {}", stats.empty_frames);
            if stats.rows_rejected + stats.rows_dropped > 0 {
                println!(
                    "  Rows rejected:  {} ({} dropped)",
                    stats.rows_rejected, stats.rows_dropped
                );
            }
            if stats.timing_errors > 0 {
                println!("  Timing errors:  {}", stats.timing_errors);
            }
            for destination in &stats.destinations {
                println!("  -> {}", destination);
            }
        }
    }
}
