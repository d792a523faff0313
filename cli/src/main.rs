use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use framework_core::{
    ExpressionKind, Framework, ResolveMode, ResolveOptions, TagFilter, resolve, validate_framework,
};
use framework_loader::{FrameworkLoader, ResolveConfig};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliExpressionKind {
    Install,
    Uninstall,
}

impl From<CliExpressionKind> for ExpressionKind {
    fn from(kind: CliExpressionKind) -> Self {
        match kind {
            CliExpressionKind::Install => Self::Install,
            CliExpressionKind::Uninstall => Self::Uninstall,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "framework-resolve")]
#[command(about = "Flatten framework definitions into resolved lookup tables")]
struct Cli {
    /// Log debug events to stderr (RUST_LOG takes precedence).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every field with placeholders resolved.
    Fields(SourceArgs),
    /// Print every fully-qualified element name.
    Elements(ElementsArgs),
    /// Print resolved install or uninstall expressions.
    Expressions(ExpressionsArgs),
    /// Print fields, elements, expressions and prefixes in one document.
    Resolve(ResolveArgs),
    /// Check a framework definition for structural problems.
    Validate(ValidateArgs),
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Framework directory or bundle file (YAML or JSON).
    #[arg(long)]
    framework: PathBuf,
    /// Resolution config YAML.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Fail on unresolved references instead of substituting an empty string.
    #[arg(long)]
    strict: bool,
    /// Package traversal threads (0 = sequential).
    #[arg(long)]
    jobs: Option<usize>,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ElementsArgs {
    /// Framework directory or bundle file (YAML or JSON).
    #[arg(long)]
    framework: PathBuf,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct ExpressionsArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Expression kind to generate.
    #[arg(long)]
    kind: CliExpressionKind,
    /// Comma-separated tags to exclude (replaces the config's tag filter).
    #[arg(long)]
    filter: Option<String>,
}

#[derive(Debug, Args)]
struct ResolveArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Comma-separated tags to exclude (replaces the config's tag filter).
    #[arg(long)]
    filter: Option<String>,
}

#[derive(Debug, Args)]
struct ValidateArgs {
    /// Framework directory or bundle file (YAML or JSON).
    #[arg(long)]
    framework: PathBuf,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Fields(args) => run_fields(args),
        Command::Elements(args) => run_elements(args),
        Command::Expressions(args) => run_expressions(args),
        Command::Resolve(args) => run_resolve(args),
        Command::Validate(args) => run_validate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_fields(args: SourceArgs) -> Result<(), String> {
    let framework = load_framework(&args.framework)?;
    let options = build_options(&args, None)?;
    let resolution = resolve(&framework, &options).map_err(|e| e.to_string())?;
    emit(&resolution.fields, args.format)
}

fn run_elements(args: ElementsArgs) -> Result<(), String> {
    let framework = load_framework(&args.framework)?;
    let elements = framework.elements().map_err(|e| e.to_string())?;
    emit(&elements, args.format)
}

fn run_expressions(args: ExpressionsArgs) -> Result<(), String> {
    let framework = load_framework(&args.source.framework)?;
    let options = build_options(&args.source, args.filter)?;
    let resolution = resolve(&framework, &options).map_err(|e| e.to_string())?;
    emit(resolution.expressions(args.kind.into()), args.source.format)
}

fn run_resolve(args: ResolveArgs) -> Result<(), String> {
    let framework = load_framework(&args.source.framework)?;
    let options = build_options(&args.source, args.filter)?;
    let resolution = resolve(&framework, &options).map_err(|e| e.to_string())?;
    emit(&resolution, args.source.format)
}

fn run_validate(args: ValidateArgs) -> Result<(), String> {
    let framework = load_framework(&args.framework)?;
    let errors = validate_framework(&framework);
    if let Some(first) = errors.first() {
        return Err(format!("validation failed: {first}"));
    }
    println!(
        "Validated framework {} with {} package(s).",
        framework.release,
        framework.packages.len()
    );
    Ok(())
}

fn load_framework(path: &PathBuf) -> Result<Framework, String> {
    debug!(path = %path.display(), "Loading framework");
    let framework = FrameworkLoader::load(path).map_err(|e| e.to_string())?;
    debug!(
        release = %framework.release,
        packages = framework.packages.len(),
        "Loaded framework"
    );
    Ok(framework)
}

/// Merges the optional config file with command-line overrides.
fn build_options(args: &SourceArgs, filter: Option<String>) -> Result<ResolveOptions, String> {
    let mut options = match &args.config {
        Some(path) => ResolveConfig::load(path).map_err(|e| e.to_string())?.to_options(),
        None => ResolveOptions::default(),
    };
    if let Some(raw) = filter {
        options.tag_filter = parse_csv_list(Some(raw)).into_iter().collect::<TagFilter>();
    }
    if args.strict {
        options.mode = ResolveMode::Strict;
    }
    if let Some(jobs) = args.jobs {
        options.jobs = jobs;
    }
    debug!(
        mode = ?options.mode,
        jobs = options.jobs,
        filtered_tags = options.tag_filter.iter().count(),
        "Resolution options"
    );
    Ok(options)
}

fn emit<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<(), String> {
    let raw = match format {
        CliOutputFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|err| format!("Failed to serialize output: {err}"))?,
        CliOutputFormat::Yaml => serde_yaml::to_string(value)
            .map_err(|err| format!("Failed to serialize output: {err}"))?,
    };
    println!("{raw}");
    Ok(())
}

fn parse_csv_list(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ToString::to_string)
            .collect()
    })
    .unwrap_or_default()
}
