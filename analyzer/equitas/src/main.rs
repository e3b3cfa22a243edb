use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use equitas::{
    config_template, load_config, load_table, summarize, AnalysisSection, Config,
    DEFAULT_CONFIG_FILE,
};
use equitas_metrics::{Analyzer, ColumnParity, FairnessReport};
use equitas_report::{bar_chart_ascii, bar_chart_svg, render_report, to_json};
use equitas_table::Value;
use log::LevelFilter;

const CHART_WIDTH: u32 = 640;
const CHART_HEIGHT: u32 = 400;
const BAR_WIDTH: usize = 40;

#[derive(Debug, Parser)]
#[command(
    name = "equitas",
    version,
    about = "Group-fairness analysis for tabular datasets",
    long_about = "equitas measures whether a target outcome occurs at similar rates across the\n\
        groups of one or more sensitive columns (statistical parity), optionally\n\
        stratified by a control column or compared on classifier error rates.\n\n\
        EXAMPLES:\n\
        \n  equitas analyze data.ndjson -s gender,age_band -t label --target-value 1\
        \n  equitas analyze -c equitas.toml --json\
        \n  equitas columns data.csv --target label\
        \n  equitas init"
)]
struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Evaluate statistical, conditional and performance parity
    Analyze(AnalyzeArgs),
    /// List the columns of a dataset and the values of a target column
    Columns(ColumnsArgs),
    /// Write a template configuration file
    Init(InitArgs),
}

#[derive(Debug, Args, Clone, Default)]
struct AnalyzeArgs {
    /// Dataset file (.json array, .ndjson / .jsonl records or .csv)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Comma-separated sensitive columns
    #[arg(short, long, value_delimiter = ',', value_name = "COLUMNS")]
    sensitive: Vec<String>,

    /// Target column
    #[arg(short, long, value_name = "COLUMN")]
    target: Option<String>,

    /// Positive target value (integer, float, true/false, otherwise text)
    #[arg(long = "target-value", value_name = "VALUE")]
    target_value: Option<String>,

    /// Control column for conditional parity
    #[arg(long, value_name = "COLUMN")]
    control: Option<String>,

    /// 0/1 prediction column for TPR / FPR parity
    #[arg(long, value_name = "COLUMN")]
    prediction: Option<String>,

    /// Maximum tolerated disparity, in [0, 1]
    #[arg(long, value_name = "T")]
    threshold: Option<f64>,

    /// Configuration file; command-line flags override its settings
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Draw ASCII bar charts under the text report
    #[arg(long)]
    bars: bool,

    /// Write one SVG bar chart per evaluated column into DIR
    #[arg(long = "plot-dir", value_name = "DIR")]
    plot_dir: Option<PathBuf>,

    /// Keep list-valued target cells as they are
    #[arg(long = "no-normalize")]
    no_normalize: bool,

    /// Exit with status 1 when any column is unfair
    #[arg(long = "deny-unfair")]
    deny_unfair: bool,
}

#[derive(Debug, Args, Clone)]
struct ColumnsArgs {
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Also count the values of this column
    #[arg(short, long, value_name = "COLUMN")]
    target: Option<String>,

    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args, Clone)]
struct InitArgs {
    #[arg(value_name = "FILE", default_value = DEFAULT_CONFIG_FILE)]
    path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .try_init();
}

/// Typed TOML value for a command-line literal: integer, float, boolean,
/// otherwise text.
fn parse_target_literal(text: &str) -> toml::Value {
    match Value::parse_literal(text) {
        Value::Int(n) => toml::Value::Integer(n),
        Value::Float(x) => toml::Value::Float(x),
        Value::Bool(b) => toml::Value::Boolean(b),
        _ => toml::Value::String(text.trim().to_string()),
    }
}

fn analysis_from_cli(args: &AnalyzeArgs) -> AnalysisSection {
    AnalysisSection {
        sensitive: args
            .sensitive
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        target: args.target.clone(),
        target_value: args.target_value.as_deref().map(parse_target_literal),
        threshold: args.threshold,
        control: args.control.clone(),
        prediction: args.prediction.clone(),
        normalize_target: args.no_normalize.then_some(false),
    }
}

fn chart_file_name(column: &str) -> String {
    let stem: String = column
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{stem}_parity.svg")
}

/// Write an SVG chart per evaluated column. Columns whose proportions are
/// all 0 get no file.
fn write_plots(dir: &Path, report: &FairnessReport) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for column in &report.columns {
        let ColumnParity::Evaluated { column, report: parity } = column else {
            continue;
        };
        let title = format!("Positive outcome rate by {column}");
        match bar_chart_svg(&title, &parity.proportions, CHART_WIDTH, CHART_HEIGHT) {
            Some(svg) => {
                let path = dir.join(chart_file_name(column));
                fs::write(&path, svg)?;
                log::info!("wrote chart '{}'", path.display());
                written.push(path);
            }
            None => log::info!("no chart for '{column}': every proportion is 0"),
        }
    }
    Ok(written)
}

fn run_analyze(args: &AnalyzeArgs) -> i32 {
    let mut config = match &args.config {
        Some(path) => match load_config(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("error: {e}");
                return 2;
            }
        },
        None => Config::default(),
    };
    config.analysis.overlay(analysis_from_cli(args));

    let Some(path) = args.input.clone().or(config.dataset.path.take()) else {
        eprintln!("error: no dataset given; pass FILE or set [dataset] path in the config");
        return 2;
    };
    let request = match config.analysis.into_request() {
        Ok(request) => request,
        Err(e) => {
            eprintln!("error: {e}");
            return 2;
        }
    };
    let analyzer = match Analyzer::new(request) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            eprintln!("error: {e}");
            return 2;
        }
    };
    let table = match load_table(&path) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("error: {}: {e}", path.display());
            return 2;
        }
    };
    let report = match analyzer.run(table) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("error: {e}");
            return 1;
        }
    };

    if args.json {
        for diagnostic in &report.diagnostics {
            eprintln!("warning: {diagnostic}");
        }
        match to_json(&report) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("error: cannot serialize report: {e}");
                return 1;
            }
        }
    } else {
        print!("{}", render_report(&report));
        if args.bars {
            for (column, parity) in report
                .columns
                .iter()
                .filter_map(|c| c.report().map(|r| (c.column(), r)))
            {
                let lines = bar_chart_ascii(&parity.proportions, BAR_WIDTH);
                if !lines.is_empty() {
                    println!("\n{column}:");
                    for line in lines {
                        println!("  {line}");
                    }
                }
            }
        }
    }

    if let Some(dir) = &args.plot_dir {
        if let Err(e) = write_plots(dir, &report) {
            eprintln!("error: cannot write charts to '{}': {e}", dir.display());
            return 2;
        }
    }

    if args.deny_unfair && !report.all_fair() {
        let unfair: Vec<&str> = report.unfair_columns().collect();
        eprintln!("error: unfair columns: {}", unfair.join(", "));
        return 1;
    }
    0
}

fn run_columns(args: &ColumnsArgs) -> i32 {
    let table = match load_table(&args.input) {
        Ok(table) => table,
        Err(e) => {
            eprintln!("error: {}: {e}", args.input.display());
            return 2;
        }
    };
    let summary = match summarize(&table, args.target.as_deref()) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("error: {e}");
            return 2;
        }
    };
    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("error: cannot serialize summary: {e}");
                return 1;
            }
        }
    } else {
        print!("{}", summary.render());
    }
    0
}

fn run_init(args: &InitArgs) -> i32 {
    if args.path.exists() && !args.force {
        eprintln!(
            "error: '{}' already exists (use --force to overwrite)",
            args.path.display()
        );
        return 2;
    }
    if let Err(e) = fs::write(&args.path, config_template()) {
        eprintln!("error: failed to write '{}': {e}", args.path.display());
        return 2;
    }
    println!("wrote {}", args.path.display());
    0
}

fn run_cli() -> i32 {
    let cli = Cli::parse();
    init_logger(cli.verbose);
    match cli.command {
        Command::Analyze(args) => run_analyze(&args),
        Command::Columns(args) => run_columns(&args),
        Command::Init(args) => run_init(&args),
    }
}

fn main() {
    std::process::exit(run_cli());
}
