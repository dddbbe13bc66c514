use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use minikern::interface;
use minikern::kernel::{Kernel, KernelConfig, ShutdownReason};
use minikern::tools::programs::demo_registry;

// how long finished programs get to unwind after the system stops
const THREAD_GRACE: Duration = Duration::from_secs(2);

/// Boot a built-in program as the root process and run until it exits or
/// halts.
#[derive(Parser, Debug)]
#[command(name = "minikern", version)]
struct Args {
    /// JSON kernel configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log verbosity (0 = warnings, 3 = every syscall); overrides the config
    #[arg(short, long)]
    verbosity: Option<isize>,

    /// Program to boot as the root process
    #[arg(short, long, default_value = "exception_test")]
    program: String,

    /// Arguments passed to the root program
    args: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match KernelConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("minikern: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => KernelConfig::default(),
    };
    if let Some(verbosity) = args.verbosity {
        config.verbosity = verbosity;
    }
    if !interface::init_logging(config.verbosity) {
        eprintln!("minikern: a logger is already installed");
    }

    let registry = demo_registry();
    let kernel = Kernel::new(
        config,
        interface::RustRfc::new(registry),
        interface::RustRfc::new(interface::StdConsole),
    );

    let rootargs: Vec<&str> = args.args.iter().map(String::as_str).collect();
    if let Err(e) = kernel.boot(&args.program, &rootargs) {
        eprintln!("minikern: cannot boot {}: {}", args.program, e);
        return ExitCode::FAILURE;
    }

    let reason = kernel.wait_for_shutdown();
    if !kernel.wait_for_threads(THREAD_GRACE) {
        log::warn!("some processes were still running at shutdown");
    }
    kernel.finalize();

    match reason {
        ShutdownReason::Halted => ExitCode::SUCCESS,
        ShutdownReason::RootExited(status) => ExitCode::from(status.clamp(0, 255) as u8),
    }
}
