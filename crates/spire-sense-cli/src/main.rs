//! spire-sense - Game-state stability tooling for Slay the Spire controllers
//!
//! Usage:
//!   spire-sense replay <scenario.json>     Replay a recorded scenario
//!   spire-sense relay <program> [args...]  Run a program, relaying its stderr
//!   spire-sense --help                     Show help

use tracing_subscriber::EnvFilter;

mod cli;
mod scenario;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Only look for --help before a relayed program's own arguments.
    let own_args = match args.iter().position(|a| a == "relay") {
        Some(pos) => &args[..pos],
        None => &args[..],
    };
    if args.is_empty() || own_args.iter().any(|a| a == "--help" || a == "-h") {
        cli::print_help();
        return Ok(());
    }

    init_logging();

    match cli::parse_args(&args) {
        Ok((command, options)) => cli::run(command, options),
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            cli::print_help();
            std::process::exit(1);
        }
    }
}

fn init_logging() {
    // Logs go to stderr so replay output on stdout stays machine-readable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
