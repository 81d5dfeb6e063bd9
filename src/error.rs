use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Errors produced while discovering, grouping and plotting report files.
#[derive(Debug, Error)]
pub enum PlotError {
    /// A positional directory does not exist.
    #[error("Directory {} does not exist.", .0.display())]
    DirectoryNotFound(PathBuf),

    /// A directory (non-recursive mode) holds no file matching the report grammar.
    #[error(
        "No files in the correct format found in {}, expected files with names like \
         <type>_<scenario>_[p1=v1_p2=v2_...]-report.hgrm",
        .0.display()
    )]
    NoProcessableFiles(PathBuf),

    /// A file name does not match `<type>_<scenario>_<params>-report.hgrm`.
    #[error("file name does not match <type>_<scenario>_<params>-report.hgrm: {0}")]
    MalformedFilename(String),

    /// A field named by `--filter`, `--exclude`, `--group-by` or the title is absent.
    #[error("field `{field}` is not present in {origin}")]
    MissingField { field: String, origin: String },

    /// A filter argument is not of the form `field=value`.
    #[error("malformed filter argument `{0}`, expected field=value")]
    MalformedFilter(String),

    /// The plotter executable could not be started.
    #[error("failed to run plotter `{program}`")]
    PlotterSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The plotter ran but reported failure.
    #[error("plotter `{program}` exited with {status} while rendering {output}")]
    PlotterFailed {
        program: String,
        status: ExitStatus,
        output: String,
    },

    /// The plotter exited successfully without writing its output file.
    #[error("plotter did not produce {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl PlotError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        PlotError::Io {
            context: context.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PlotError>;
