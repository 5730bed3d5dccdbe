//! Ephemeral files shared between the host and the emulator.
//!
//! Names are random 8.3 names inside the drive root. Each file is created
//! with create-new semantics, so two concurrent runs in the same directory
//! can never end up with the same file, and the four files of one run are
//! distinct from each other.

use std::fs::{self, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{debug, warn};

use super::dos_name::random_base_name;
use crate::error::{LauncherError, LauncherResult};

/// Attempts per file before giving up on a directory.
const MAX_ATTEMPTS: usize = 1024;

pub const BATCH_EXT: &str = "BAT";
pub const INPUT_EXT: &str = "INP";
pub const OUTPUT_EXT: &str = "OUT";
pub const LOG_EXT: &str = "LOG";

/// A file created by this run. Removed on drop unless already removed.
#[derive(Debug)]
pub struct TempFile {
    path: PathBuf,
    removed: bool,
}

impl TempFile {
    /// Create a new empty file `<RANDOM>.<extension>` inside `dir`.
    pub fn mint<R: Rng + ?Sized>(dir: &Path, extension: &str, rng: &mut R) -> LauncherResult<Self> {
        for _ in 0..MAX_ATTEMPTS {
            let path = dir.join(format!("{}.{}", random_base_name(rng), extension));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => {
                    return Ok(Self {
                        path,
                        removed: false,
                    })
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "temp name taken, drawing again");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(LauncherError::NameExhausted(dir.to_path_buf()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now.
    pub fn remove(mut self) -> io::Result<()> {
        self.removed = true;
        fs::remove_file(&self.path)
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "could not remove temp file");
            }
        }
    }
}

/// The four files of one session.
#[derive(Debug)]
pub struct TempFiles {
    /// Batch script run by the emulator.
    pub batch: TempFile,
    /// Captured standard input.
    pub input: TempFile,
    /// Program output, written by the interpreter.
    pub output: TempFile,
    /// Emulator stdout and stderr.
    pub log: TempFile,
}

impl TempFiles {
    /// Mint all four files in `dir`.
    pub fn create(dir: &Path) -> LauncherResult<Self> {
        Self::create_with_rng(dir, &mut rand::thread_rng())
    }

    /// Mint all four files in `dir` with a caller-provided generator.
    ///
    /// If a later file cannot be created, the earlier ones are removed again.
    pub fn create_with_rng<R: Rng + ?Sized>(dir: &Path, rng: &mut R) -> LauncherResult<Self> {
        let files = Self {
            batch: TempFile::mint(dir, BATCH_EXT, rng)?,
            input: TempFile::mint(dir, INPUT_EXT, rng)?,
            output: TempFile::mint(dir, OUTPUT_EXT, rng)?,
            log: TempFile::mint(dir, LOG_EXT, rng)?,
        };
        debug!(
            batch = %files.batch.path().display(),
            input = %files.input.path().display(),
            output = %files.output.path().display(),
            log = %files.log.path().display(),
            "minted temp files"
        );
        Ok(files)
    }

    /// Paths of all four files.
    pub fn paths(&self) -> [&Path; 4] {
        [
            self.batch.path(),
            self.input.path(),
            self.output.path(),
            self.log.path(),
        ]
    }

    /// Delete every file, logging failures. Returns how many deletions failed.
    pub fn cleanup(self) -> usize {
        let Self {
            batch,
            input,
            output,
            log,
        } = self;
        let mut failures = 0;
        for file in [batch, input, output, log] {
            let path = file.path().to_path_buf();
            if let Err(e) = file.remove() {
                warn!(path = %path.display(), error = %e, "could not remove temp file");
                failures += 1;
            }
        }
        failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn file_name(p: &Path) -> String {
        p.file_name().unwrap().to_str().unwrap().to_string()
    }

    #[test]
    fn test_create_makes_four_distinct_8_3_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = TempFiles::create(dir.path()).unwrap();

        let names: HashSet<String> = files.paths().iter().map(|p| file_name(p)).collect();
        assert_eq!(names.len(), 4);

        for (path, ext) in files.paths().iter().zip([BATCH_EXT, INPUT_EXT, OUTPUT_EXT, LOG_EXT]) {
            assert!(path.is_file(), "{} should exist", path.display());
            assert_eq!(path.parent().unwrap(), dir.path());
            let name = file_name(path);
            let (base, e) = name.split_once('.').unwrap();
            assert_eq!(base.len(), 8);
            assert!(base.chars().all(|c| c.is_ascii_uppercase()));
            assert_eq!(e, ext);
        }
    }

    #[test]
    fn test_mint_skips_existing_names() {
        let dir = tempfile::tempdir().unwrap();

        // Replay the same seed so the first draws land on occupied names
        let mut rng = StdRng::seed_from_u64(42);
        let mut existing = HashSet::new();
        for _ in 0..5 {
            let name = format!("{}.{}", random_base_name(&mut rng), BATCH_EXT);
            fs::write(dir.path().join(&name), b"keep me").unwrap();
            existing.insert(name);
        }

        let mut rng = StdRng::seed_from_u64(42);
        let file = TempFile::mint(dir.path(), BATCH_EXT, &mut rng).unwrap();
        let name = file_name(file.path());
        assert!(!existing.contains(&name), "{} collided", name);

        for name in &existing {
            assert_eq!(fs::read(dir.path().join(name)).unwrap(), b"keep me");
        }
    }

    #[test]
    fn test_mint_gives_up_when_every_draw_is_taken() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(format!("AAAAAAAA.{}", BATCH_EXT)), b"").unwrap();

        // Always draws `A`, so every attempt hits the same name
        let mut rng = StepRng::new(0, 0);
        let err = TempFile::mint(dir.path(), BATCH_EXT, &mut rng).unwrap_err();
        match err {
            LauncherError::NameExhausted(d) => assert_eq!(d, dir.path()),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_mint_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = TempFile::mint(&missing, LOG_EXT, &mut rand::thread_rng()).unwrap_err();
        assert!(matches!(err, LauncherError::Io(_)));
    }

    #[test]
    fn test_cleanup_removes_everything() {
        let dir = tempfile::tempdir().unwrap();
        let files = TempFiles::create(dir.path()).unwrap();
        let paths: Vec<PathBuf> = files.paths().iter().map(|p| p.to_path_buf()).collect();

        assert_eq!(files.cleanup(), 0);
        for p in paths {
            assert!(!p.exists());
        }
    }

    #[test]
    fn test_cleanup_reports_already_removed() {
        let dir = tempfile::tempdir().unwrap();
        let files = TempFiles::create(dir.path()).unwrap();
        fs::remove_file(files.output.path()).unwrap();
        assert_eq!(files.cleanup(), 1);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_drop_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        {
            let _files = TempFiles::create(dir.path()).unwrap();
            assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 4);
        }
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
