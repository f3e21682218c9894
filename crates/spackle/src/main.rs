#![doc = include_str!("../README.md")]

use std::io::Read as _;
use std::process::ExitCode;

use anyhow::Context as _;
use bpaf::{Bpaf, ShellComp};
use tracing_subscriber::prelude::*;

use spackle_repair::{Indent, RepairOptions};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    #[default]
    None,
    Debug,
    Info,
    Warn,
    Error,
}

impl core::str::FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(format!(
                "expected 'none', 'debug', 'info', 'warn', or 'error', got '{s}'"
            )),
        }
    }
}

impl core::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorsArg {
    Off,
    Force,
}

impl core::str::FromStr for ColorsArg {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "force" => Ok(Self::Force),
            _ => Err(format!("expected 'off' or 'force', got '{s}'")),
        }
    }
}

/// Global options applied to all commands
#[derive(Debug, Clone, Bpaf)]
#[bpaf(generate(global_options))]
pub struct GlobalOptions {
    /// Set the formatting mode for markup: "off" prints everything as plain
    /// text, "force" forces ANSI even when the output looks incompatible
    #[bpaf(long("colors"), argument("off|force"))]
    pub colors: Option<ColorsArg>,

    /// The level of logging, from most to least verbose:
    /// debug, info, warn, error.
    #[bpaf(
        long("log-level"),
        argument("none|debug|info|warn|error"),
        fallback(LogLevel::None),
        display_fallback
    )]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Bpaf)]
pub struct FixArgs {
    /// Spaces per indentation level in the repaired output
    #[bpaf(long("indent"), argument("N"), fallback(2), display_fallback)]
    pub indent: usize,

    /// Emit minified output with no whitespace between tokens
    #[bpaf(long("minify"), switch)]
    pub minify: bool,

    /// Escape all non-ASCII characters in strings as \uXXXX
    #[bpaf(long("ensure-ascii"), switch)]
    pub ensure_ascii: bool,

    /// Keep only the first top-level value instead of wrapping extras in an
    /// array
    #[bpaf(long("no-wrap"), switch)]
    pub no_wrap: bool,

    /// Print only the repaired text, not the JSON envelope
    #[bpaf(long("text-only"), switch)]
    pub text_only: bool,

    /// Input file (standard input when omitted)
    #[bpaf(positional("FILE"), complete_shell(ShellComp::File { mask: None }))]
    pub file: Option<String>,
}

impl FixArgs {
    fn options(&self) -> RepairOptions {
        RepairOptions {
            indent: if self.minify {
                Indent::None
            } else {
                Indent::Spaces(self.indent)
            },
            ensure_ascii: self.ensure_ascii,
            wrap_multiple_roots: !self.no_wrap,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReporterKind {
    #[default]
    Pretty,
    Text,
}

impl core::str::FromStr for ReporterKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Self::Pretty),
            "text" => Ok(Self::Text),
            _ => Err(format!("expected 'pretty' or 'text', got '{s}'")),
        }
    }
}

#[derive(Debug, Clone, Bpaf)]
pub struct ValidateArgs {
    /// Output format
    #[bpaf(long("reporter"), argument("pretty|text"), fallback(ReporterKind::Pretty))]
    pub reporter: ReporterKind,

    /// Input file (standard input when omitted)
    #[bpaf(positional("FILE"), complete_shell(ShellComp::File { mask: None }))]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version, fallback_to_usage, generate(cli))]
/// Repair broken JSON and validate it against RFC 8259
struct Cli {
    #[bpaf(external(commands))]
    command: Commands,
}

#[derive(Debug, Clone, Bpaf)]
enum Commands {
    #[bpaf(command("fix"))]
    /// Repair a JSON document and report what changed
    Fix(
        #[bpaf(external(global_options), hide_usage)] GlobalOptions,
        #[bpaf(external(fix_args))] FixArgs,
    ),

    #[bpaf(command("validate"))]
    /// Check a document against RFC 8259 without changing it
    Validate(
        #[bpaf(external(global_options), hide_usage)] GlobalOptions,
        #[bpaf(external(validate_args))] ValidateArgs,
    ),

    #[bpaf(command("version"))]
    /// Print version information
    Version,

    #[bpaf(command("man"), hide)]
    /// Generate man page in roff format
    Man,
}

/// Set up tracing from the CLI `--log-level` flag, falling back to the
/// `SPACKLE_LOG` env var.
fn setup_tracing(global: &GlobalOptions) {
    let filter = match global.log_level {
        LogLevel::None => match tracing_subscriber::EnvFilter::try_from_env("SPACKLE_LOG") {
            Ok(f) => f,
            Err(_) => return,
        },
        LogLevel::Debug => tracing_subscriber::EnvFilter::new("debug"),
        LogLevel::Info => tracing_subscriber::EnvFilter::new("info"),
        LogLevel::Warn => tracing_subscriber::EnvFilter::new("warn"),
        LogLevel::Error => tracing_subscriber::EnvFilter::new("error"),
    };

    tracing_subscriber::registry()
        .with(
            tracing_tree::HierarchicalLayer::new(2)
                .with_targets(true)
                .with_bracketed_fields(true)
                .with_indent_lines(true)
                .with_timer(tracing_tree::time::Uptime::default())
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

/// Set up the miette error handler with the colors config.
fn setup_miette(global: &GlobalOptions) {
    let theme = match global.colors {
        Some(ColorsArg::Off) => miette::GraphicalTheme::none(),
        Some(ColorsArg::Force) => miette::GraphicalTheme::unicode(),
        None => {
            if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
                miette::GraphicalTheme::unicode()
            } else {
                miette::GraphicalTheme::unicode_nocolor()
            }
        }
    };

    miette::set_hook(Box::new(move |_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .context_lines(2)
                .graphical_theme(theme.clone())
                .build(),
        )
    }))
    .ok();
}

/// Read the input file, or standard input when no file was given.
fn read_input(file: Option<&str>) -> anyhow::Result<(String, Vec<u8>)> {
    match file {
        Some(path) => {
            let bytes =
                std::fs::read(path).with_context(|| format!("failed to read {path}"))?;
            Ok((path.to_string(), bytes))
        }
        None => {
            let mut bytes = Vec::new();
            std::io::stdin()
                .read_to_end(&mut bytes)
                .context("failed to read standard input")?;
            Ok(("<stdin>".to_string(), bytes))
        }
    }
}

fn run_fix(args: &FixArgs) -> anyhow::Result<bool> {
    let (_, bytes) = read_input(args.file.as_deref())?;
    let result = spackle_repair::fix(&bytes, &args.options());
    if args.text_only {
        println!("{}", result.text);
    } else {
        let envelope =
            serde_json::to_string_pretty(&result).context("failed to serialize fix result")?;
        println!("{envelope}");
    }
    Ok(false)
}

fn run_validate(args: &ValidateArgs) -> anyhow::Result<bool> {
    let (name, bytes) = read_input(args.file.as_deref())?;
    let diagnostics = spackle_validate::validate(&bytes);
    if diagnostics.is_empty() {
        return Ok(false);
    }

    let source = String::from_utf8_lossy(&bytes);
    for diagnostic in &diagnostics {
        match args.reporter {
            ReporterKind::Pretty => {
                let report = miette::Report::new(diagnostic.to_report(&name, &source));
                eprint!("{report:?}");
            }
            ReporterKind::Text => {
                eprintln!(
                    "{name}:{}:{}: {}",
                    diagnostic.line, diagnostic.column, diagnostic.message
                );
            }
        }
    }
    eprintln!(
        "{name}: {} violation(s) of RFC 8259",
        diagnostics.len()
    );
    Ok(true)
}

fn main() -> ExitCode {
    let opts = cli().run();

    let result = match opts.command {
        Commands::Fix(global, args) => {
            setup_tracing(&global);
            run_fix(&args)
        }
        Commands::Validate(global, args) => {
            setup_tracing(&global);
            setup_miette(&global);
            run_validate(&args)
        }
        Commands::Version => {
            println!("spackle {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Commands::Man => {
            let roff = cli().render_manpage(
                "spackle",
                bpaf::doc::Section::General,
                None,
                None,
                Some("Spackle Manual"),
            );
            print!("{roff}");
            return ExitCode::SUCCESS;
        }
    };

    match result {
        Ok(had_findings) => {
            if had_findings {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}
