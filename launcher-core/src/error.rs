//! Error types for the BASIC launcher.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while preparing or running a DOS session.
#[derive(Error, Debug)]
pub enum LauncherError {
    #[error("Please specify the location of the basic interpreter ({0})")]
    NoInterpreter(String),

    #[error("Could not find interpreter {path}: {source}")]
    InterpreterNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Please specify the basic program to run")]
    NoProgram,

    #[error("Could not find BASIC file {path}: {source}")]
    ProgramNotFound {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("No common ancestor between {0} and {1}")]
    NoCommonAncestor(PathBuf, PathBuf),

    #[error("{path} is not inside {ancestor}")]
    OutsideAncestor { path: PathBuf, ancestor: PathBuf },

    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    #[error("Could not find a free temp file name in {0}")]
    NameExhausted(PathBuf),

    #[error("Could not start emulator {path}: {source}")]
    EmulatorSpawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for launcher operations.
pub type LauncherResult<T> = Result<T, LauncherError>;
