//! DOS batch script that runs the interpreter inside the emulator.
//!
//! Layout (every line ends in CRLF):
//! - `SET NAME=value` for each forwardable variable (GW-BASIC only)
//! - `SET STDIN=C:\...INP`
//! - `C:`
//! - `CD C:\<program dir>`
//! - `C:\<interpreter> [/RUN] PROGRAM.BAS <C:\...INP >C:\...OUT`

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::config::Dialect;
use crate::env::Environment;
use crate::error::LauncherResult;
use crate::fs::DOS_DRIVE;
use crate::path_env::PathEnvironment;

const CRLF: &str = "\r\n";

/// Everything that goes into the batch script, already in DOS notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchScript {
    pub dialect: Dialect,
    /// Variables to `SET`, already filtered.
    pub vars: Vec<(String, String)>,
    pub interpreter: String,
    pub program_dir: String,
    pub program: String,
    pub input: String,
    pub output: String,
}

impl BatchScript {
    /// Collect the script contents for a session.
    pub fn new(dialect: Dialect, paths: &PathEnvironment, env: &Environment) -> LauncherResult<Self> {
        Ok(Self {
            dialect,
            vars: forwarded_vars(dialect, env),
            interpreter: paths.dos_interpreter()?,
            program_dir: paths.dos_program_dir()?,
            program: paths.program_file_name()?.to_string(),
            input: paths.dos_input()?,
            output: paths.dos_output()?,
        })
    }

    /// Write the script to `out`.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (name, value) in &self.vars {
            write!(out, "SET {}={}{}", name, value, CRLF)?;
        }
        write!(out, "SET STDIN={}{}", self.input, CRLF)?;
        write!(out, "{}{}", DOS_DRIVE, CRLF)?;
        write!(out, "CD {}{}", self.program_dir, CRLF)?;

        write!(out, "{}", self.interpreter)?;
        if let Some(flag) = self.dialect.run_flag() {
            write!(out, " {}", flag)?;
        }
        write!(
            out,
            " {} <{} >{}{}",
            self.program, self.input, self.output, CRLF
        )
    }

    /// Write the script to a new file at `path`, replacing its contents.
    pub fn write_file(&self, path: &Path) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_to(&mut out)?;
        out.flush()
    }

    /// The script as a string.
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

fn forwarded_vars(dialect: Dialect, env: &Environment) -> Vec<(String, String)> {
    if !dialect.forwards_environment() {
        return Vec::new();
    }
    env.forwardable()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
