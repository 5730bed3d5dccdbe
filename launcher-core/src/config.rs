//! Run configuration, resolved from command-line arguments and environment.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::env::Environment;
use crate::error::{LauncherError, LauncherResult};

#[cfg(windows)]
const DEFAULT_DOSBOX: &str = "C:\\Program Files (x86)\\DOSBox-0.74\\DOSBox.exe";
#[cfg(not(windows))]
const DEFAULT_DOSBOX: &str = "dosbox";

/// Directory that `BLR_PROGRAM` is resolved against unless `BLR_SRC_DIR` says otherwise.
pub const DEFAULT_SOURCE_DIR: &str = "/basic/src";

// Environment variable names are prefixed with BLR for basic launcher
pub const EV_DOSBOX: &str = "BLR_DOSBOX";
pub const EV_DOSBOX_CONF: &str = "BLR_DOSBOX_CONF";
pub const EV_GWBASIC: &str = "BLR_GWBASIC";
pub const EV_QBASIC: &str = "BLR_QBASIC";
pub const EV_BASIC_MODE: &str = "BLR_BASIC_MODE";
pub const EV_PROGRAM: &str = "BLR_PROGRAM";
pub const EV_SRC_DIR: &str = "BLR_SRC_DIR";

/// Set by CGI servers when the request has a body.
pub const EV_CONTENT_LENGTH: &str = "CONTENT_LENGTH";

/// BASIC interpreter flavour. Decides the command line used to start a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `GWBASIC.EXE PROGRAM.BAS`
    GwBasic,
    /// `QBASIC.EXE /RUN PROGRAM.BAS`
    QBasic,
}

impl Dialect {
    /// Extra flag placed between the interpreter and the program name.
    pub fn run_flag(self) -> Option<&'static str> {
        match self {
            Dialect::GwBasic => None,
            Dialect::QBasic => Some("/RUN"),
        }
    }

    /// Whether host environment variables are copied into the batch script.
    pub fn forwards_environment(self) -> bool {
        matches!(self, Dialect::GwBasic)
    }
}

/// Arguments taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct LaunchArgs {
    /// Program to run. Falls back to `BLR_PROGRAM` when absent.
    pub program: Option<PathBuf>,
    /// The `-i` flag.
    pub stdin: bool,
}

/// Everything needed for one run. Built once, never partially valid.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Emulator executable, as given (may be a bare name looked up on `PATH`).
    pub emulator: String,
    /// Optional emulator configuration file.
    pub emulator_conf: Option<PathBuf>,
    /// Canonical path of the interpreter executable.
    pub interpreter: PathBuf,
    pub dialect: Dialect,
    /// Canonical path of the BASIC source file.
    pub program: PathBuf,
    /// Whether stdin must be copied into the session.
    pub needs_stdin: bool,
}

impl RunConfig {
    /// Resolve and validate a configuration.
    pub fn resolve(args: &LaunchArgs, env: &Environment) -> LauncherResult<Self> {
        let (interpreter, dialect) = resolve_interpreter(env)?;
        let config = Self {
            emulator: resolve_emulator(env),
            emulator_conf: resolve_emulator_conf(env),
            interpreter,
            dialect,
            program: resolve_program(args, env)?,
            needs_stdin: resolve_needs_stdin(args, env),
        };
        debug!(?config, "resolved run configuration");
        Ok(config)
    }
}

fn resolve_emulator(env: &Environment) -> String {
    let v = env.get_redirected_or_empty(EV_DOSBOX);
    if v.is_empty() {
        DEFAULT_DOSBOX.to_string()
    } else {
        v.to_string()
    }
}

fn resolve_emulator_conf(env: &Environment) -> Option<PathBuf> {
    let v = env.get_redirected_or_empty(EV_DOSBOX_CONF);
    if v.is_empty() {
        None
    } else {
        Some(PathBuf::from(v))
    }
}

/// Pick the interpreter variable by priority, then canonicalize it.
fn resolve_interpreter(env: &Environment) -> LauncherResult<(PathBuf, Dialect)> {
    let (raw, dialect) = interpreter_candidate(env).ok_or_else(|| {
        LauncherError::NoInterpreter(format!("set {} or {}", EV_GWBASIC, EV_QBASIC))
    })?;
    let path = fs::canonicalize(raw).map_err(|source| LauncherError::InterpreterNotFound {
        path: raw.to_string(),
        source,
    })?;
    ensure_file(&path)?;
    Ok((path, dialect))
}

fn interpreter_candidate(env: &Environment) -> Option<(&str, Dialect)> {
    let lookup = |key: &str, dialect: Dialect| {
        let v = env.get_redirected_or_empty(key);
        (!v.is_empty()).then_some((v, dialect))
    };
    let qbasic = || lookup(EV_QBASIC, Dialect::QBasic);

    if env.get_redirected_or_empty(EV_BASIC_MODE) == "qbasic" {
        qbasic()
    } else {
        lookup(EV_GWBASIC, Dialect::GwBasic).or_else(qbasic)
    }
}

fn resolve_program(args: &LaunchArgs, env: &Environment) -> LauncherResult<PathBuf> {
    let program = match &args.program {
        Some(p) => p.clone(),
        None => {
            let name = env.get_redirected_or_empty(EV_PROGRAM);
            if name.is_empty() {
                return Err(LauncherError::NoProgram);
            }
            source_dir(env).join(name)
        }
    };
    if program.as_os_str().is_empty() {
        return Err(LauncherError::NoProgram);
    }
    let path = fs::canonicalize(&program).map_err(|source| LauncherError::ProgramNotFound {
        path: program.display().to_string(),
        source,
    })?;
    ensure_file(&path)?;
    Ok(path)
}

fn source_dir(env: &Environment) -> PathBuf {
    let v = env.get_redirected_or_empty(EV_SRC_DIR);
    PathBuf::from(if v.is_empty() { DEFAULT_SOURCE_DIR } else { v })
}

/// `-i` on the command line, or any request body announced by the web server.
fn resolve_needs_stdin(args: &LaunchArgs, env: &Environment) -> bool {
    args.stdin || env.get_non_empty(EV_CONTENT_LENGTH).is_some()
}

fn ensure_file(path: &Path) -> LauncherResult<()> {
    if fs::metadata(path)?.is_file() {
        Ok(())
    } else {
        Err(LauncherError::NotAFile(path.to_path_buf()))
    }
}
