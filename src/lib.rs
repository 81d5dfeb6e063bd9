//! Plot HdrHistogram benchmark reports grouped by the fields in their names.
//!
//! Report files are named `<type>_<scenario>_<k1=v1_k2=v2...>-report.hgrm`.
//! The pipeline parses those names, filters on field values, groups the
//! reports into one graph per distinct set of residual fields, and renders
//! each graph with `hdr-plot`.

pub mod discover;
pub mod error;
pub mod filter;
pub mod group;
pub mod plot;
pub mod record;

use std::path::PathBuf;

use tracing::{info, warn};

pub use error::{PlotError, Result};
use filter::{FieldFilter, FilterMode};
use plot::PlotOptions;

/// Everything needed for one run.
#[derive(Debug, Clone)]
pub struct PlotRequest {
    /// Result directories; graphs are written to the first one.
    pub directories: Vec<PathBuf>,
    pub group_by: Vec<String>,
    pub include: FieldFilter,
    pub exclude: FieldFilter,
    pub recursive: bool,
    pub options: PlotOptions,
}

/// Split a comma-separated `--group-by` value into field names.
pub fn parse_group_by(s: &str) -> Vec<String> {
    s.trim()
        .split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

/// Run the whole pipeline and return the paths of the written graphs.
pub fn run(req: &PlotRequest) -> Result<Vec<PathBuf>> {
    let Some(first) = req.directories.first() else {
        return Ok(Vec::new());
    };
    let dirs = discover::result_dirs(&req.directories, req.recursive)?;
    let output_dir = std::path::absolute(first)
        .map_err(|e| PlotError::io(format!("failed to resolve {}", first.display()), e))?;
    if dirs.is_empty() {
        warn!(root = %output_dir.display(), "no directories with report files found");
    }

    let records = discover::discover_records(&dirs)?;
    filter::require_fields(&records, req.include.fields().chain(req.exclude.fields()))?;
    let accepted = req.include.apply(records, FilterMode::Include)?;
    let accepted = req.exclude.apply(accepted, FilterMode::Exclude)?;

    let groups = group::group_records(accepted, &req.group_by)?;
    info!(groups = groups.len(), "plotting");

    let options = PlotOptions {
        plotter: plot::resolve_plotter(&req.options.plotter)?,
        ..req.options.clone()
    };

    let mut written = Vec::with_capacity(groups.len());
    for group in &groups {
        written.push(plot::render_group(
            group,
            &req.group_by,
            &options,
            &output_dir,
        )?);
    }
    Ok(written)
}
