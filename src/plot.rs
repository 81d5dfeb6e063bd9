//! Rendering one graph per group with the external `hdr-plot` tool.
//!
//! Each group is staged into its own temporary directory: every report is
//! copied under a name built from its group-by values (these become the series
//! labels), the plotter runs inside that directory, and the resulting PNG is
//! copied to the output directory. The staging directory is removed when the
//! group is done, whether or not plotting succeeded.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

use crate::error::{PlotError, Result};
use crate::group::{Group, GroupKey};
use crate::record::{ParsedRecord, TYPE_FIELD};

/// Percentiles printed in each series' summary box.
pub const SUMMARY_FIELDS: &str = "min,median,p99,p999,p9999,p99999,max";

pub const DEFAULT_PLOTTER: &str = "hdr-plot";
pub const DEFAULT_UNITS: &str = "us";
pub const DEFAULT_PERCENTILES_RANGE_MAX: &str = "99.9999";

/// Rendering options shared by every group in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlotOptions {
    /// Plotter executable, looked up on `PATH` unless it contains a separator.
    pub plotter: OsString,
    pub units: String,
    pub percentiles_range_max: String,
    /// Title template; `{type}` is replaced by the group's type.
    pub title: Option<String>,
    /// Label series by values only instead of `field=value`.
    pub hide_field_name: bool,
    pub hide_summaries: bool,
}

impl Default for PlotOptions {
    fn default() -> Self {
        PlotOptions {
            plotter: OsString::from(DEFAULT_PLOTTER),
            units: DEFAULT_UNITS.to_string(),
            percentiles_range_max: DEFAULT_PERCENTILES_RANGE_MAX.to_string(),
            title: None,
            hide_field_name: false,
            hide_summaries: false,
        }
    }
}

/// hdr-plot treats `.` in a histogram file name as an extension separator.
fn plot_safe(s: &str) -> String {
    s.replace('.', "-")
}

/// Staging file name of `record`: its group-by values joined with `_`,
/// e.g. `rate=100000_batch=1.hgrm`, or `100000_1.hgrm` with `hide_field_name`.
pub fn staged_file_name(
    record: &ParsedRecord,
    group_by: &[String],
    hide_field_name: bool,
) -> Result<String> {
    let mut labels = Vec::with_capacity(group_by.len());
    for field in group_by {
        let value = plot_safe(record.require(field)?);
        if hide_field_name {
            labels.push(value);
        } else {
            labels.push(format!("{}={}", plot_safe(field), value));
        }
    }
    Ok(format!("{}.hgrm", labels.join("_")))
}

/// Output file name and graph title for a group.
///
/// The type becomes the file name prefix and the first title line; the other
/// residual fields follow as `k-v` (file name) and `k=v` (title).
pub fn plot_file_name_and_title(
    key: &GroupKey,
    custom_title: Option<&str>,
) -> Result<(String, String)> {
    let mut fields = key.fields().clone();
    let kind = fields
        .remove(TYPE_FIELD)
        .ok_or_else(|| PlotError::MissingField {
            field: TYPE_FIELD.to_string(),
            origin: "the group key (is `type` in --group-by?)".to_string(),
        })?;

    let params_title = fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ");
    let params_file = fields
        .iter()
        .map(|(k, v)| format!("{k}-{v}"))
        .collect::<Vec<_>>()
        .join("_");

    let head = match custom_title {
        Some(template) => template.replace("{type}", &kind),
        None => kind.clone(),
    };
    Ok((
        format!("{kind}_{params_file}.png"),
        format!("{head}\n {params_title}"),
    ))
}

/// Make a plotter path with more than one component absolute, so it still
/// resolves once the plotter runs inside a staging directory. Bare program
/// names are left for `PATH` lookup.
pub fn resolve_plotter(program: &OsStr) -> Result<OsString> {
    let path = Path::new(program);
    if path.components().count() <= 1 && !path.is_absolute() {
        return Ok(program.to_os_string());
    }
    std::path::absolute(path)
        .map(PathBuf::into_os_string)
        .map_err(|e| PlotError::io(format!("failed to resolve plotter {}", path.display()), e))
}

/// Build the plotter invocation. `files` must already be sorted.
pub fn plotter_command(opts: &PlotOptions, output: &str, title: &str, files: &[String]) -> Command {
    let mut cmd = Command::new(&opts.plotter);
    cmd.arg("--noversion")
        .arg("--units")
        .arg(&opts.units)
        .arg(format!("--summary-fields={SUMMARY_FIELDS}"))
        .arg(format!(
            "--percentiles-range-max={}",
            opts.percentiles_range_max
        ))
        .arg("--output")
        .arg(output)
        .arg("--title")
        .arg(title);
    if opts.hide_summaries {
        cmd.arg("--nosummary");
    }
    cmd.args(files);
    cmd
}

/// Stage, plot and publish one group. Returns the path of the written graph.
pub fn render_group(
    group: &Group,
    group_by: &[String],
    opts: &PlotOptions,
    output_dir: &Path,
) -> Result<PathBuf> {
    let (file_name, title) = plot_file_name_and_title(&group.key, opts.title.as_deref())?;

    let staging = tempfile::Builder::new()
        .prefix("results-plotter-")
        .tempdir()
        .map_err(|e| PlotError::io("failed to create staging directory", e))?;

    let mut staged = Vec::with_capacity(group.records.len());
    for record in &group.records {
        let name = staged_file_name(record, group_by, opts.hide_field_name)?;
        if staged.contains(&name) {
            warn!(
                file = %record.path().display(),
                staged = %name,
                "duplicate series label in group {file_name}, keeping the later file"
            );
        } else {
            staged.push(name.clone());
        }
        let dest = staging.path().join(&name);
        debug!(from = %record.path().display(), to = %dest.display(), "staging");
        fs::copy(record.path(), &dest).map_err(|e| {
            PlotError::io(format!("failed to stage {}", record.path().display()), e)
        })?;
    }
    staged.sort();

    let mut cmd = plotter_command(opts, &file_name, &title, &staged);
    cmd.current_dir(staging.path());
    let program = opts.plotter.to_string_lossy().into_owned();
    debug!(?cmd, "running plotter");
    let status = cmd.status().map_err(|source| PlotError::PlotterSpawn {
        program: program.clone(),
        source,
    })?;
    if !status.success() {
        return Err(PlotError::PlotterFailed {
            program,
            status,
            output: file_name,
        });
    }

    let artifact = staging.path().join(&file_name);
    if !artifact.is_file() {
        return Err(PlotError::MissingArtifact(artifact));
    }
    let dest = output_dir.join(&file_name);
    fs::copy(&artifact, &dest)
        .map_err(|e| PlotError::io(format!("failed to write {}", dest.display()), e))?;
    info!(output = %dest.display(), series = staged.len(), "wrote graph");
    Ok(dest)
}
