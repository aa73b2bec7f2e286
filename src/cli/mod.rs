//! Command-line interface for tsv-export
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Wiring a JSON Lines source, the exporter and the output destination

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::{Config, LogLevel};
use crate::error::{ConfigError, ExportError, Result};
use crate::export::{Exporter, ProgressBarObserver};
use crate::source::{JsonLinesRowSource, Schema};

/// Progress interval used by `--progress` when none is configured
const DEFAULT_PROGRESS_INTERVAL: u64 = 1000;

/// Stream JSON Lines records into tab-separated text for bulk loading
#[derive(Parser, Debug)]
#[command(
    name = "tsv-export",
    version,
    about = "Export rows to delimited text for bulk loading",
    long_about = "Reads one JSON object per line, extracts the columns named by --schema and
writes them as delimited text (PostgreSQL COPY text format by default)."
)]
pub struct CliArgs {
    /// Input file with one JSON object per line ('-' or omitted for stdin)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Columns to export, in order
    ///
    /// Format: name:type,name:type (e.g. id:bigint,name:text,created:timestamp)
    #[arg(short = 's', long, value_name = "COLUMNS")]
    pub schema: Option<String>,

    /// Column separator; escapes like \t are accepted
    #[arg(long, value_name = "CHAR")]
    pub separator: Option<String>,

    /// Row separator; escapes like \r\n are accepted
    #[arg(long, value_name = "TEXT")]
    pub row_separator: Option<String>,

    /// Text written for null fields
    #[arg(long = "null", value_name = "TEXT")]
    pub null: Option<String>,

    /// Do not write a header line
    #[arg(long)]
    pub no_headers: bool,

    /// Report progress every N rows (0 disables)
    #[arg(long, value_name = "ROWS")]
    pub progress_interval: Option<u64>,

    /// Show a progress spinner on stderr
    #[arg(long)]
    pub progress: bool,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for tsv-export
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Create a CLI interface from already-parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// An invalid config file falls back to defaults with a warning;
    /// invalid command-line values are an error.
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;

        if let Err(e) = config.validate() {
            eprintln!("Warning: Configuration validation failed: {}", e);
            eprintln!("Using default configuration instead.");
            config = Config::default();
        }

        Self::apply_args_to_config(&mut config, args)?;
        config.validate()?;

        Ok(config)
    }

    /// Get loaded configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get parsed arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Apply CLI arguments to override config values
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) -> Result<()> {
        Self::apply_export_args(config, args)?;
        Self::apply_logging_args(config, args);
        Ok(())
    }

    /// Apply export-related CLI arguments to configuration
    fn apply_export_args(config: &mut Config, args: &CliArgs) -> Result<()> {
        if let Some(separator) = &args.separator {
            config.export.column_separator = parse_separator_char(separator)?;
        }

        if let Some(row_separator) = &args.row_separator {
            config.export.row_separator = unescape(row_separator);
        }

        if let Some(null) = &args.null {
            config.export.null_representation = unescape(null);
        }

        if args.no_headers {
            config.export.include_headers = false;
        }

        if let Some(interval) = args.progress_interval {
            config.export.progress_interval = interval;
        } else if args.progress && config.export.progress_interval == 0 {
            config.export.progress_interval = DEFAULT_PROGRESS_INTERVAL;
        }

        Ok(())
    }

    /// Apply logging-related CLI arguments to configuration
    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Run the export described by the arguments
    ///
    /// # Returns
    /// * `Result<u64>` - Number of rows exported
    pub fn run_export(&self) -> Result<u64> {
        let spec = self
            .args
            .schema
            .as_deref()
            .ok_or_else(|| ExportError::Generic("--schema is required".to_string()))?;
        let schema = Schema::parse(spec)?;
        info!("Exporting {} columns", schema.len());

        let reader = self.open_input()?;
        let mut source = JsonLinesRowSource::new(reader, schema);

        let mut exporter = Exporter::from_config(&self.config.export);
        let display = self.args.progress.then(|| ProgressBarObserver::new(None));
        if let Some(display) = &display {
            exporter.on_progress(display.observer());
        }

        let result = match &self.args.output {
            Some(path) => exporter.export_to_path(&mut source, path),
            None => {
                let stdout = io::stdout();
                let mut writer = BufWriter::new(stdout.lock());
                exporter.export(&mut source, &mut writer)
            }
        };

        if let Some(display) = &display {
            display.finish();
        }

        let count = result?;
        self.print_summary(count);
        Ok(count)
    }

    /// Open the input file, or stdin for `-` / no input
    fn open_input(&self) -> Result<Box<dyn BufRead>> {
        match self.args.input.as_deref() {
            None => Ok(Box::new(BufReader::new(io::stdin()))),
            Some(path) if path == Path::new("-") => Ok(Box::new(BufReader::new(io::stdin()))),
            Some(path) => {
                let file = File::open(path).map_err(|err| ExportError::Input {
                    path: path.to_path_buf(),
                    source: err,
                })?;
                Ok(Box::new(BufReader::new(file)))
            }
        }
    }

    /// Print export summary to stderr unless quiet
    fn print_summary(&self, count: u64) {
        if self.args.quiet {
            return;
        }
        match &self.args.output {
            Some(path) => eprintln!("Exported {} rows to {}", count, path.display()),
            None => eprintln!("Exported {} rows", count),
        }
    }

    /// Show version information
    fn show_version(&self) {
        println!("tsv-export version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    ///
    /// # Arguments
    /// * `show` - Whether to show configuration
    /// * `validate` - Whether to validate configuration
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file()?;
        }

        if show {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate configuration file
    fn validate_config_file(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("❌ Configuration file does not exist");
            return Ok(());
        }

        match Config::load_from_file(Some(&path)) {
            Ok(config) => match config.validate() {
                Ok(_) => println!("✅ Configuration is valid"),
                Err(e) => println!("❌ Configuration validation failed: {}", e),
            },
            Err(e) => println!("❌ Failed to load configuration: {}", e),
        }

        Ok(())
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("=== Effective Configuration ===");
        println!();

        match self.config.to_toml() {
            Ok(toml_str) => println!("{}", toml_str),
            Err(e) => {
                eprintln!("Error formatting configuration: {}", e);
                println!("{:#?}", self.config);
            }
        }

        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_config_path)
    }
}

/// Expand `\t`, `\n`, `\r` and `\\`; other backslashes are kept as-is.
///
/// `\N` is left alone so the null marker can be typed literally.
pub fn unescape(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.peek() {
            Some('t') => result.push('\t'),
            Some('n') => result.push('\n'),
            Some('r') => result.push('\r'),
            Some('\\') => result.push('\\'),
            _ => {
                result.push('\\');
                continue;
            }
        }
        chars.next();
    }

    result
}

/// Parse a column separator argument into exactly one character
fn parse_separator_char(input: &str) -> Result<char> {
    let unescaped = unescape(input);
    let mut chars = unescaped.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ConfigError::InvalidValue {
            field: "separator".to_string(),
            value: input.to_string(),
        }
        .into()),
    }
}
