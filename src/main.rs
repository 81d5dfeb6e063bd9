use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use results_plotter::filter::FieldFilter;
use results_plotter::plot::{
    DEFAULT_PERCENTILES_RANGE_MAX, DEFAULT_PLOTTER, DEFAULT_UNITS, PlotOptions,
};
use results_plotter::{PlotRequest, parse_group_by};

/// Plot aggregated benchmark results, grouping them by scenario.
///
/// Expects files named `<type>_<scenario>_<parameters>-report.hgrm`, e.g.
/// `echo_java_rate=100000_batch=1_length=1344-report.hgrm`. Generated png
/// files are written to the first directory.
#[derive(Parser)]
#[command(name = "results-plotter", version, verbatim_doc_comment)]
struct Cli {
    /// Directories containing the aggregated results
    #[arg(required = true)]
    directories: Vec<PathBuf>,

    /// Comma-separated fields whose values become series on one graph, e.g. instance,msgsize
    #[arg(long, default_value = "scenario")]
    group_by: String,

    /// Comma-separated field=value pairs to include; repeat a field for several values,
    /// e.g. msgsize=32,msgsize=288,scenario=c-ats
    #[arg(long)]
    filter: Option<String>,

    /// Comma-separated field=value pairs to exclude, e.g. msgsize=1344,scenario=java
    #[arg(long)]
    exclude: Option<String>,

    /// Maximum percentile to display, e.g. 99.999
    #[arg(long, default_value = DEFAULT_PERCENTILES_RANGE_MAX)]
    percentiles_range_max: String,

    /// Custom title for the graphs; `{type}` expands to the benchmark type
    #[arg(long)]
    title: Option<String>,

    /// Look for results in child directories, stopping at the first level that has them
    #[arg(long)]
    recursive: bool,

    /// Hide the field names in series labels
    #[arg(long)]
    hide_field_name: bool,

    /// Hide the summary boxes
    #[arg(long)]
    hide_summaries: bool,

    /// Output time unit
    #[arg(long, default_value = DEFAULT_UNITS)]
    output_units: String,

    /// hdr-plot executable
    #[arg(long, env = "HDR_PLOT", default_value = DEFAULT_PLOTTER)]
    plotter: OsString,

    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn parse_filter(arg: Option<&str>, flag: &str) -> Result<FieldFilter> {
    match arg {
        Some(s) => s
            .parse()
            .with_context(|| format!("invalid {flag} argument: {s}")),
        None => Ok(FieldFilter::new()),
    }
}

fn main() -> Result<()> {
    if std::env::args_os().len() <= 1 {
        Cli::command().print_help()?;
        return Ok(());
    }
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let req = PlotRequest {
        group_by: parse_group_by(&cli.group_by),
        include: parse_filter(cli.filter.as_deref(), "--filter")?,
        exclude: parse_filter(cli.exclude.as_deref(), "--exclude")?,
        recursive: cli.recursive,
        options: PlotOptions {
            plotter: cli.plotter,
            units: cli.output_units,
            percentiles_range_max: cli.percentiles_range_max,
            title: cli.title,
            hide_field_name: cli.hide_field_name,
            hide_summaries: cli.hide_summaries,
        },
        directories: cli.directories,
    };

    results_plotter::run(&req)?;
    Ok(())
}
