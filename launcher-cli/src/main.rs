//! BASIC launcher CLI - Run GW-BASIC/QBasic programs through DOSBox.
//!
//! Usage:
//!   basic-launcher [PROGRAM] [-i]
//!
//! Examples:
//!   BLR_GWBASIC=bin/GWBASIC.EXE basic-launcher src/HELLO.BAS
//!   cat names.txt | BLR_QBASIC=bin/QBASIC.EXE basic-launcher src/ECHO.BAS -i
//!
//! Run as a CGI script, the program comes from `BLR_PROGRAM` and stdin is
//! captured whenever the request carries a body (`CONTENT_LENGTH`).

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use launcher_core::{run_session, DosBox, Environment, LaunchArgs, RunConfig};

/// Log filter variable, checked before `RUST_LOG`.
const EV_LOG: &str = "BLR_LOG";

/// BASIC launcher CLI
#[derive(Parser, Debug)]
#[command(name = "basic-launcher")]
#[command(about = "Run a BASIC program inside DOSBox")]
struct Args {
    /// BASIC program to run (default: $BLR_PROGRAM inside $BLR_SRC_DIR)
    program: Option<PathBuf>,

    /// Pass standard input to the program
    #[arg(short = 'i', long = "stdin")]
    stdin: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Logs go to stderr; stdout carries the program's output.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = std::env::var(EV_LOG)
        .ok()
        .and_then(|v| EnvFilter::try_new(v).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let env = Environment::from_process();
    let launch = LaunchArgs {
        program: args.program,
        stdin: args.stdin,
    };

    let config = match RunConfig::resolve(&launch, &env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // The session blocks on stdin and on the emulator process
    let session = tokio::task::spawn_blocking(move || {
        let mut emulator = DosBox::new(config.emulator.clone());
        let stdin = io::stdin().lock();
        let mut stdout = io::stdout().lock();
        run_session(&config, &env, stdin, &mut stdout, &mut emulator)
    });

    match session.await {
        Ok(Ok(exit)) => {
            debug!(?exit, "done");
            ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: session task failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
