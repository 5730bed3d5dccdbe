//! One batch run of a BASIC program.
//!
//! Steps, strictly in order:
//! 1. capture stdin into the input file (CRLF line endings)
//! 2. render the batch script
//! 3. run the emulator and wait for it
//! 4. copy the output file to our stdout (native line endings)
//! 5. delete the temp files
//!
//! The first failing step ends the run. Temp files are removed either way:
//! explicitly on success, by `Drop` on failure.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Write};

use tracing::{debug, info, warn};

use crate::batch::BatchScript;
use crate::config::RunConfig;
use crate::emulator::{DosEmulator, EmulatorExit, EmulatorInvocation};
use crate::env::Environment;
use crate::error::LauncherResult;
use crate::path_env::PathEnvironment;

#[cfg(windows)]
pub const NATIVE_EOL: &[u8] = b"\r\n";
#[cfg(not(windows))]
pub const NATIVE_EOL: &[u8] = b"\n";

const DOS_EOL: &[u8] = b"\r\n";

/// Drives one session. Owns the temp files of the run.
pub struct SessionRunner<'a> {
    config: &'a RunConfig,
    paths: PathEnvironment,
    env: &'a Environment,
}

impl<'a> SessionRunner<'a> {
    pub fn new(config: &'a RunConfig, paths: PathEnvironment, env: &'a Environment) -> Self {
        Self { config, paths, env }
    }

    pub fn paths(&self) -> &PathEnvironment {
        &self.paths
    }

    /// Step 1: fill the input file.
    ///
    /// Left empty unless the configuration asks for stdin.
    pub fn capture_input<R: BufRead>(&self, stdin: R) -> LauncherResult<()> {
        let mut out = BufWriter::new(File::create(self.paths.input_path())?);
        if self.config.needs_stdin {
            let lines = copy_lines(stdin, &mut out, DOS_EOL)?;
            debug!(lines, "captured stdin");
        }
        out.flush()?;
        Ok(())
    }

    /// Step 2: write the batch script.
    pub fn render_batch(&self) -> LauncherResult<()> {
        let script = BatchScript::new(self.config.dialect, &self.paths, self.env)?;
        debug!(script = %script.render(), "batch script");
        script.write_file(self.paths.batch_path())?;
        Ok(())
    }

    /// Step 3: run the emulator.
    ///
    /// A non-zero exit is logged but not an error; whatever the program
    /// managed to write is still emitted.
    pub fn execute<E: DosEmulator + ?Sized>(&self, emulator: &mut E) -> LauncherResult<EmulatorExit> {
        let invocation = EmulatorInvocation {
            batch: self.paths.batch_path(),
            log: self.paths.log_path(),
            conf: self.config.emulator_conf.as_deref(),
        };
        let exit = emulator.run(&invocation)?;
        if exit.success() {
            debug!(?exit, "emulator finished");
        } else {
            info!(?exit, log = %self.paths.log_path().display(), "emulator exited abnormally");
        }
        Ok(exit)
    }

    /// Step 4: copy the output file to `out`.
    pub fn emit_output<W: Write>(&self, out: &mut W) -> LauncherResult<()> {
        let file = match File::open(self.paths.output_path()) {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(path = %self.paths.output_path().display(), "output file is gone");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };
        copy_lines(BufReader::new(file), out, NATIVE_EOL)?;
        out.flush()?;
        Ok(())
    }

    /// Step 5: delete the temp files. Failures are only logged.
    pub fn cleanup(self) {
        let failures = self.paths.cleanup();
        if failures > 0 {
            warn!(failures, "some temp files could not be removed");
        }
    }

    /// Run all steps.
    pub fn run<R, W, E>(self, stdin: R, stdout: &mut W, emulator: &mut E) -> LauncherResult<EmulatorExit>
    where
        R: BufRead,
        W: Write,
        E: DosEmulator + ?Sized,
    {
        self.capture_input(stdin)?;
        self.render_batch()?;
        let exit = self.execute(emulator)?;
        self.emit_output(stdout)?;
        self.cleanup();
        Ok(exit)
    }
}

/// Resolve the drive mapping for `config` and run a session.
pub fn run_session<R, W, E>(
    config: &RunConfig,
    env: &Environment,
    stdin: R,
    stdout: &mut W,
    emulator: &mut E,
) -> LauncherResult<EmulatorExit>
where
    R: BufRead,
    W: Write,
    E: DosEmulator + ?Sized,
{
    let paths = PathEnvironment::new(config)?;
    SessionRunner::new(config, paths, env).run(stdin, stdout, emulator)
}

/// Copy `input` line by line, replacing each line terminator with `eol`.
/// `\n`, `\r\n` and a `\r` ending the input all count as terminators. A
/// final line without terminator gets one too.
///
/// Works on bytes, so DOS code page output passes through untouched.
/// Returns the number of lines copied.
pub fn copy_lines<R: BufRead, W: Write>(mut input: R, out: &mut W, eol: &[u8]) -> io::Result<usize> {
    let mut line = Vec::new();
    let mut count = 0;
    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            return Ok(count);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        out.write_all(&line)?;
        out.write_all(eol)?;
        count += 1;
    }
}
