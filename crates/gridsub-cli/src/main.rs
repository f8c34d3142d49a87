//! Gridsub CLI - SubRip output from caption decoder grid logs
//!
//! Features:
//! - One-shot conversion of a finished grid log (or stdin)
//! - Follow mode for a log the decoder is still writing
//! - Configuration checking

use clap::{Args, Parser, Subcommand};
use gridsub_core::{CharacterEncoding, Config, CounterMode, LineEnding, MergePolicy};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

/// Gridsub CLI - caption grid logs to SubRip
#[derive(Parser)]
#[command(name = "gridsub")]
#[command(author = "Purple Squirrel Media")]
#[command(version)]
#[command(about = "Convert caption decoder grid logs into SubRip subtitle files", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    format: String,

    /// Log format (text, json)
    #[arg(long, default_value = "text", global = true)]
    log_format: String,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a complete grid log
    Convert {
        /// Grid log to read ("-" for stdin)
        input: PathBuf,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Follow a grid log as the decoder writes it
    Follow {
        /// Grid log to follow
        input: PathBuf,

        /// Process the existing contents before following
        #[arg(long)]
        from_start: bool,

        /// Polling interval in milliseconds
        #[arg(long)]
        poll_ms: Option<u64>,

        #[command(flatten)]
        overrides: Overrides,
    },

    /// Validate and print the effective configuration
    CheckConfig {
        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Command-line overrides for configuration file values
#[derive(Args, Default)]
struct Overrides {
    /// Directory destinations are written to
    #[arg(short = 'd', long)]
    output_dir: Option<PathBuf>,

    /// Destination used until the log names one
    #[arg(short, long)]
    output: Option<String>,

    /// Character encoding of log and output (none, ascii, latin1, utf8 or 0-3)
    #[arg(short, long)]
    encoding: Option<CharacterEncoding>,

    /// Sequence counter source (directive, auto, off)
    #[arg(long, value_parser = parse_counter_mode)]
    counter: Option<CounterMode>,

    /// Drop color markup
    #[arg(long)]
    no_font_color: bool,

    /// Color for the user-defined code, as #rrggbb
    #[arg(long)]
    usercolor: Option<String>,

    /// Emit <u> markup for underlined cells
    #[arg(long)]
    underline: bool,

    /// Keep color and style markup together instead of preferring style
    #[arg(long)]
    nested: bool,

    /// Trim leading spaces from rows
    #[arg(long)]
    trim_leading: bool,

    /// Write CRLF line endings
    #[arg(long)]
    crlf: bool,
}

impl Overrides {
    fn apply(self, config: &mut Config) {
        if let Some(dir) = self.output_dir {
            config.output_dir = Some(dir);
        }
        if let Some(name) = self.output {
            config.default_destination = Some(name);
        }
        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
        if let Some(counter) = self.counter {
            config.counter = counter;
        }
        if let Some(rgb) = self.usercolor {
            config.user_color = Some(rgb);
        }
        config.no_font_color |= self.no_font_color;
        config.underline |= self.underline;
        config.trim_leading |= self.trim_leading;
        if self.nested {
            config.merge_policy = MergePolicy::Nested;
        }
        if self.crlf {
            config.line_ending = LineEnding::CrLf;
        }
    }
}

fn parse_counter_mode(s: &str) -> Result<CounterMode, String> {
    match s.to_lowercase().as_str() {
        "directive" => Ok(CounterMode::Directive),
        "auto" => Ok(CounterMode::Auto),
        "off" | "none" => Ok(CounterMode::Off),
        other => Err(format!("unknown counter mode: {other}")),
    }
}

fn load_config(path: Option<&PathBuf>, overrides: Overrides) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

fn init_tracing(verbose: bool, log_format: &str) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if log_format.eq_ignore_ascii_case("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, &cli.log_format);
    gridsub_core::init();

    match cli.command {
        Commands::Convert { input, overrides } => {
            let config = load_config(cli.config.as_ref(), overrides)?;
            commands::convert(&input, &config, &cli.format).await?;
        }
        Commands::Follow {
            input,
            from_start,
            poll_ms,
            overrides,
        } => {
            let mut config = load_config(cli.config.as_ref(), overrides)?;
            if let Some(ms) = poll_ms {
                config.poll_interval_ms = ms;
                config.validate()?;
            }
            commands::follow(&input, from_start, &config, &cli.format).await?;
        }
        Commands::CheckConfig { overrides } => {
            let config = load_config(cli.config.as_ref(), overrides)?;
            commands::check_config(&config, &cli.format)?;
        }
    }

    Ok(())
}
