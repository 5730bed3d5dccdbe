//! DOS emulator backends.
//!
//! The session only needs one thing from an emulator: run a batch script to
//! completion with its console output sent to a log file. `DosBox` does that
//! by spawning the real executable. Tests plug in scripted backends.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{LauncherError, LauncherResult};

/// Environment forced on the emulator process: no display, plain terminal.
pub const FORCED_ENV: [(&str, &str); 2] = [("SDL_VIDEODRIVER", "dummy"), ("TERM", "xterm")];

/// One emulator run.
#[derive(Debug, Clone, Copy)]
pub struct EmulatorInvocation<'a> {
    /// Host path of the batch script to execute.
    pub batch: &'a Path,
    /// Host path receiving the emulator's stdout and stderr.
    pub log: &'a Path,
    /// Optional emulator configuration file.
    pub conf: Option<&'a Path>,
}

impl EmulatorInvocation<'_> {
    /// Command line arguments: `<batch> -exit -noautoexec [-conf <file>]`.
    pub fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            self.batch.into(),
            "-exit".into(),
            "-noautoexec".into(),
        ];
        if let Some(conf) = self.conf {
            args.push("-conf".into());
            args.push(conf.into());
        }
        args
    }
}

/// How the emulator process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmulatorExit {
    /// Exit code, `None` if killed by a signal.
    pub code: Option<i32>,
}

impl EmulatorExit {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Something that can run a batch script under DOS.
pub trait DosEmulator {
    /// Run to completion. Blocks until the emulator exits.
    ///
    /// Only failing to start is an error; a non-zero exit is reported in the
    /// returned `EmulatorExit`.
    fn run(&mut self, invocation: &EmulatorInvocation<'_>) -> LauncherResult<EmulatorExit>;
}

/// The DOSBox executable.
#[derive(Debug, Clone)]
pub struct DosBox {
    executable: String,
}

impl DosBox {
    pub fn new(executable: impl Into<String>) -> Self {
        Self {
            executable: executable.into(),
        }
    }

    pub fn executable(&self) -> &str {
        &self.executable
    }
}

impl DosEmulator for DosBox {
    fn run(&mut self, invocation: &EmulatorInvocation<'_>) -> LauncherResult<EmulatorExit> {
        let log = OpenOptions::new().append(true).create(true).open(invocation.log)?;
        let log_err = log.try_clone()?;
        let args = invocation.args();
        debug!(emulator = %self.executable, ?args, "starting emulator");

        let status = Command::new(&self.executable)
            .args(&args)
            .envs(FORCED_ENV)
            .stdin(Stdio::null())
            .stdout(log)
            .stderr(log_err)
            .status()
            .map_err(|source| LauncherError::EmulatorSpawn {
                path: self.executable.clone(),
                source,
            })?;

        Ok(EmulatorExit {
            code: status.code(),
        })
    }
}
