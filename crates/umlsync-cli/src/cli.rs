//! Command-line interface for the umlsync utility
//!
//! Formats, validates and resolves PlantUML class diagrams, and applies
//! structured editor commands to a document.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, info};

use umlsync::core::logging::{init_logging, LOG_FORMAT_ENV, LOG_LEVEL_ENV};
use umlsync::core::{Detector, Renderer};
use umlsync::mapping::{
    CardinalityResolver, JsonPlanEmitter, OutlinePlanEmitter, OwnershipHints, PairHint,
};
use umlsync::model::Diagram;
use umlsync::notation::{ClassNotationDetector, NotationParser, NotationPrinter};
use umlsync::sync::{Command, Discard, SyncCoordinator};

/// umlsync - PlantUML class diagrams, models and mapping plans
#[derive(Parser)]
#[command(name = "umlsync")]
#[command(about = "Keep class-diagram models and PlantUML class notation in sync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Set log level (trace|debug|info|warn|error)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Set log format (compact|pretty|json)
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Log level options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format options
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse a document and print it in canonical form
    Format {
        /// Input notation file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Report diagnostics; fails when lines are malformed
    Validate {
        /// Input notation file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Detect whether the input is class notation
    Detect {
        /// Input file to analyze (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Resolve relationship cardinalities into a mapping plan
    Plan {
        /// Input notation file (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit the plan as JSON instead of an outline
        #[arg(long)]
        json: bool,

        /// Foreign-key holder of a one-to-one pair, as A:B=Holder
        #[arg(long = "owner", value_name = "A:B=HOLDER")]
        owners: Vec<PairHint>,

        /// Endpoint that maintains a join-table association, as A:B=Endpoint
        #[arg(long = "maintainer", value_name = "A:B=ENDPOINT")]
        maintainers: Vec<PairHint>,
    },

    /// Apply a JSON command file to a notation document
    Apply {
        /// Notation document to start from (empty diagram when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// JSON file holding one command or an array of commands
        #[arg(short, long)]
        commands: PathBuf,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a JSON model into notation
    Import {
        /// Input JSON model (use - for stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output file (use - for stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Main CLI application
#[derive(Default)]
pub struct UmlsyncApp {
    parser: NotationParser,
    printer: NotationPrinter,
    detector: ClassNotationDetector,
}

impl UmlsyncApp {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run the application with the given CLI arguments
    pub fn run(&mut self, cli: Cli) -> Result<()> {
        // Environment variables take precedence over the flag defaults
        let log_level = std::env::var(LOG_LEVEL_ENV)
            .ok()
            .or_else(|| std::env::var("RUST_LOG").ok())
            .unwrap_or_else(|| cli.log_level.as_str().to_string());
        let log_format = std::env::var(LOG_FORMAT_ENV)
            .ok()
            .unwrap_or_else(|| cli.log_format.as_str().to_string());

        if let Err(e) = init_logging(Some(&log_level), Some(&log_format)) {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        if cli.verbose {
            eprintln!("umlsync v{}", env!("CARGO_PKG_VERSION"));
        }

        match cli.command {
            Commands::Format { input, output } => self.format_command(input, output, cli.verbose),
            Commands::Validate { input, json } => self.validate_command(input, json),
            Commands::Detect { input } => self.detect_command(input),
            Commands::Plan {
                input,
                output,
                json,
                owners,
                maintainers,
            } => self.plan_command(input, output, json, owners, maintainers),
            Commands::Apply {
                input,
                commands,
                output,
            } => self.apply_command(input, commands, output, cli.verbose),
            Commands::Import { input, output } => self.import_command(input, output, cli.verbose),
        }
    }

    fn format_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;
        let report = self.parser.parse_report(&content);
        if verbose {
            for diagnostic in &report.diagnostics {
                eprintln!("{}", diagnostic);
            }
        }
        self.write_output(output, &self.printer.print(&report.diagram))
    }

    fn validate_command(&self, input: Option<PathBuf>, json: bool) -> Result<()> {
        let content = self.read_input(input)?;
        let report = self.parser.parse_report(&content);

        if json {
            println!("{}", serde_json::to_string_pretty(&report.diagnostics)?);
        } else {
            for diagnostic in &report.diagnostics {
                println!("{}", diagnostic);
            }
        }

        let malformed = report.malformed_lines();
        if malformed > 0 {
            if !json {
                println!("✗ {} malformed line(s)", malformed);
            }
            return Err(anyhow!("{} malformed line(s)", malformed));
        }
        if !json {
            println!(
                "✓ Valid class diagram: {} classes, {} relationships, {} associations",
                report.diagram.classes.len(),
                report.diagram.relationships.len(),
                report.diagram.associations.len()
            );
        }
        Ok(())
    }

    fn detect_command(&self, input: Option<PathBuf>) -> Result<()> {
        let content = self.read_input(input)?;
        let confidence = self.detector.confidence(&content);
        if self.detector.detect(&content) {
            println!("{} ({:.1})", self.detector.diagram_type(), confidence);
            Ok(())
        } else {
            eprintln!("Could not detect class notation");
            Err(anyhow!("Unknown diagram type"))
        }
    }

    fn plan_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        json: bool,
        owners: Vec<PairHint>,
        maintainers: Vec<PairHint>,
    ) -> Result<()> {
        let content = self.read_input(input)?;
        let rendered = self.plan_text(&content, json, &owners, &maintainers)?;
        self.write_output(output, &rendered)
    }

    /// Resolve a document and render the plan; diagnostics go to stderr
    pub fn plan_text(
        &self,
        content: &str,
        json: bool,
        owners: &[PairHint],
        maintainers: &[PairHint],
    ) -> Result<String> {
        let hints = build_hints(owners, maintainers);
        let report = self.parser.parse_report(content);
        let resolution = CardinalityResolver::new()
            .with_lexicon(self.parser.lexicon().clone())
            .with_hints(hints)
            .resolve(&report.diagram);

        for diagnostic in report.diagnostics.iter().chain(&resolution.diagnostics) {
            eprintln!("{}", diagnostic);
        }
        info!(
            classes = resolution.plan.classes.len(),
            fields = resolution.plan.field_count(),
            "Plan resolved"
        );

        if json {
            JsonPlanEmitter::new().render(&resolution.plan)
        } else {
            OutlinePlanEmitter::new().render(&resolution.plan)
        }
    }

    fn apply_command(
        &self,
        input: Option<PathBuf>,
        commands: PathBuf,
        output: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let document = match input {
            Some(path) => self.read_input(Some(path))?,
            None => String::new(),
        };
        let commands_json = fs::read_to_string(&commands)
            .with_context(|| format!("Failed to read command file '{}'", commands.display()))?;
        let commands = Command::batch_from_json(&commands_json)?;
        debug!(count = commands.len(), "Loaded commands");

        let result = self.apply_text(&document, &commands)?;
        if verbose {
            eprintln!("Applied {} command(s)", commands.len());
        }
        self.write_output(output, &result)
    }

    /// Load `document`, apply every command in order and print the result
    pub fn apply_text(&self, document: &str, commands: &[Command]) -> Result<String> {
        let mut session = SyncCoordinator::new(Discard, Discard)
            .with_parser(self.parser.clone())
            .with_printer(self.printer.clone());
        session.on_remote_update(document);

        for (index, command) in commands.iter().enumerate() {
            session
                .apply_command(command)
                .with_context(|| format!("Command {} ({}) failed", index + 1, command.action))?;
        }
        Ok(session.document())
    }

    fn import_command(
        &self,
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        verbose: bool,
    ) -> Result<()> {
        let content = self.read_input(input)?;
        let diagram = Diagram::from_json(&content).context("Invalid JSON model")?;
        let (text, diagnostics) = self.printer.print_with_diagnostics(&diagram);
        if verbose {
            for diagnostic in &diagnostics {
                eprintln!("{}", diagnostic);
            }
        }
        self.write_output(output, &text)
    }

    /// Read input from file or stdin
    pub fn read_input(&self, input: Option<PathBuf>) -> Result<String> {
        match input {
            Some(path) if path.to_string_lossy() != "-" => fs::read_to_string(&path)
                .map_err(|e| anyhow!("Failed to read input file '{}': {}", path.display(), e)),
            _ => {
                let mut content = String::new();
                io::stdin().read_to_string(&mut content)?;
                Ok(content)
            }
        }
    }

    /// Write output to file or stdout
    pub fn write_output(&self, output: Option<PathBuf>, content: &str) -> Result<()> {
        let stdout_content = if content.is_empty() || content.ends_with('\n') {
            content.to_string()
        } else {
            format!("{}\n", content)
        };

        match output {
            Some(path) if path.to_string_lossy() != "-" => {
                fs::write(&path, content).map_err(|e| {
                    anyhow!("Failed to write output file '{}': {}", path.display(), e)
                })?;
            }
            _ => {
                print!("{}", stdout_content);
                io::stdout().flush()?;
            }
        }
        Ok(())
    }
}

fn build_hints(owners: &[PairHint], maintainers: &[PairHint]) -> OwnershipHints {
    let hints = owners.iter().fold(OwnershipHints::new(), |hints, hint| {
        hints.with_owner(&hint.class_a, &hint.class_b, &hint.chosen)
    });
    maintainers.iter().fold(hints, |hints, hint| {
        hints.with_maintainer(&hint.class_a, &hint.class_b, &hint.chosen)
    })
}
