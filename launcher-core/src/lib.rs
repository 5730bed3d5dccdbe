//! BASIC launcher core
//!
//! Runs a GW-BASIC or QBasic program inside DOSBox as a batch job:
//! stdin goes in through a file, the program's output comes back through a
//! file, and the caller never sees drive letters or 8.3 names.
//!
//! # Architecture
//!
//! - `RunConfig`: interpreter, program and emulator, resolved from arguments
//!   and an `Environment` snapshot
//! - `PathEnvironment`: picks the host directory mounted as `C:` and mints the
//!   session's temp files inside it
//! - `BatchScript`: the DOS commands that start the interpreter
//! - `DosEmulator` trait: runs the script (`DosBox` in production)
//! - `SessionRunner`: capture input, render, execute, emit output, clean up

pub mod batch;
pub mod config;
pub mod emulator;
pub mod env;
pub mod error;
pub mod fs;
pub mod path_env;
pub mod session;

pub use batch::BatchScript;
pub use config::{Dialect, LaunchArgs, RunConfig};
pub use emulator::{DosBox, DosEmulator, EmulatorExit, EmulatorInvocation};
pub use env::{is_forwardable, Environment};
pub use error::{LauncherError, LauncherResult};
pub use fs::{common_ancestor, is_8_3, relative_dos_path, TempFiles};
pub use path_env::PathEnvironment;
pub use session::{run_session, SessionRunner};
