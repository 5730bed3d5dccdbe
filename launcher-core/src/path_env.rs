//! The emulated `C:` drive for one session.
//!
//! A `PathEnvironment` picks the host directory to mount as `C:` and owns the
//! temp files minted inside it. It translates every path the batch script
//! needs into `C:\...` notation.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::RunConfig;
use crate::error::{LauncherError, LauncherResult};
use crate::fs::{common_ancestor, is_8_3, relative_dos_path, TempFiles};

/// Host/DOS path mapping for one run.
#[derive(Debug)]
pub struct PathEnvironment {
    /// Host directory mounted as `C:\`.
    ancestor: PathBuf,
    interpreter: PathBuf,
    program: PathBuf,
    files: TempFiles,
}

impl PathEnvironment {
    /// Build the mapping for a resolved configuration.
    pub fn new(config: &RunConfig) -> LauncherResult<Self> {
        Self::from_paths(&config.interpreter, &config.program)
    }

    /// Build the mapping for an interpreter and program, both absolute file paths.
    ///
    /// The drive root is the common ancestor of their directories. It is
    /// computed before any temp file is created.
    pub fn from_paths(interpreter: &Path, program: &Path) -> LauncherResult<Self> {
        let ancestor = common_ancestor(parent_dir(interpreter)?, parent_dir(program)?)?;
        debug!(ancestor = %ancestor.display(), "mounting as C:");

        let program_name = file_name(program)?;
        if !is_8_3(program_name) {
            warn!(program = program_name, "program name is not 8.3, DOS may not find it");
        }

        let files = TempFiles::create(&ancestor)?;
        Ok(Self {
            ancestor,
            interpreter: interpreter.to_path_buf(),
            program: program.to_path_buf(),
            files,
        })
    }

    /// Host directory mounted as `C:\`.
    pub fn ancestor(&self) -> &Path {
        &self.ancestor
    }

    /// `path` as seen from inside the emulator.
    pub fn dos_path(&self, path: &Path) -> LauncherResult<String> {
        relative_dos_path(path, &self.ancestor)
    }

    pub fn dos_interpreter(&self) -> LauncherResult<String> {
        self.dos_path(&self.interpreter)
    }

    /// Directory containing the program, for `CD`.
    pub fn dos_program_dir(&self) -> LauncherResult<String> {
        self.dos_path(parent_dir(&self.program)?)
    }

    pub fn dos_input(&self) -> LauncherResult<String> {
        self.dos_path(self.files.input.path())
    }

    pub fn dos_output(&self) -> LauncherResult<String> {
        self.dos_path(self.files.output.path())
    }

    /// Bare file name of the program, e.g. `HELLO.BAS`.
    pub fn program_file_name(&self) -> LauncherResult<&str> {
        file_name(&self.program)
    }

    pub fn batch_path(&self) -> &Path {
        self.files.batch.path()
    }

    pub fn input_path(&self) -> &Path {
        self.files.input.path()
    }

    pub fn output_path(&self) -> &Path {
        self.files.output.path()
    }

    pub fn log_path(&self) -> &Path {
        self.files.log.path()
    }

    /// Remove all temp files. Returns how many deletions failed.
    ///
    /// Dropping the environment also removes them, silently.
    pub fn cleanup(self) -> usize {
        self.files.cleanup()
    }
}

fn parent_dir(path: &Path) -> LauncherResult<&Path> {
    path.parent()
        .ok_or_else(|| LauncherError::NotAFile(path.to_path_buf()))
}

fn file_name(path: &Path) -> LauncherResult<&str> {
    path.file_name()
        .ok_or_else(|| LauncherError::NotAFile(path.to_path_buf()))?
        .to_str()
        .ok_or_else(|| LauncherError::NonUtf8Path(path.to_path_buf()))
}
