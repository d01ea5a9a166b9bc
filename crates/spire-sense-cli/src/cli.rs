//! Command-line interface
//!
//! Usage:
//!   spire-sense replay <scenario.json>     Replay a recorded scenario
//!   spire-sense relay <program> [args...]  Run a program, relaying its stderr
//!
//! Options:
//!   --json             Output replay results as JSON lines
//!   --config <path>    Listener config file (replay only)

use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::Context;
use spire_sense_core::{ListenerConfig, LogRelay};

use crate::scenario::Scenario;

/// CLI command to execute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Replay { scenario: PathBuf },
    Relay { program: String, args: Vec<String> },
}

/// CLI options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub json: bool,
    pub config: Option<PathBuf>,
}

/// Parse CLI arguments and return command + options
pub fn parse_args(args: &[String]) -> Result<(CliCommand, CliOptions), String> {
    let mut options = CliOptions::default();
    let mut command: Option<CliCommand> = None;

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--json" => options.json = true,
            "--config" => {
                i += 1;
                if i >= args.len() {
                    return Err("--config requires a path".to_string());
                }
                options.config = Some(PathBuf::from(&args[i]));
            }
            "replay" if command.is_none() => {
                i += 1;
                if i >= args.len() {
                    return Err("replay requires a scenario file".to_string());
                }
                command = Some(CliCommand::Replay {
                    scenario: PathBuf::from(&args[i]),
                });
            }
            "relay" if command.is_none() => {
                i += 1;
                if i >= args.len() {
                    return Err("relay requires a program to run".to_string());
                }
                // Everything after the program belongs to it.
                command = Some(CliCommand::Relay {
                    program: args[i].clone(),
                    args: args[i + 1..].to_vec(),
                });
                break;
            }
            _ => {
                return Err(format!("Unknown argument: {}", arg));
            }
        }
        i += 1;
    }

    match command {
        Some(command) => Ok((command, options)),
        None => Err("No command specified. Use: replay <file> or relay <program>".to_string()),
    }
}

/// Run a CLI command
pub fn run(command: CliCommand, options: CliOptions) -> anyhow::Result<()> {
    match command {
        CliCommand::Replay { scenario } => run_replay(scenario, &options),
        CliCommand::Relay { program, args } => run_relay(&program, &args),
    }
}

fn run_replay(path: PathBuf, options: &CliOptions) -> anyhow::Result<()> {
    let mut scenario = Scenario::load(&path)?;
    // --config wins over the scenario's own config, which wins over the user's.
    if let Some(config_path) = &options.config {
        scenario.config = Some(ListenerConfig::load_from(config_path)?);
    } else if scenario.config.is_none() {
        scenario.config = Some(ListenerConfig::load());
    }

    let reports = scenario.replay()?;

    if options.json {
        for report in &reports {
            println!("{}", serde_json::to_string(report)?);
        }
    } else {
        println!("Replayed {} ({} sends)", path.display(), reports.len());
        for report in &reports {
            println!("  {}", report);
        }
    }
    Ok(())
}

fn run_relay(program: &str, args: &[String]) -> anyhow::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to start {}", program))?;

    let relay = child.stderr.take().map(LogRelay::spawn);

    let status = child
        .wait()
        .with_context(|| format!("Failed to wait for {}", program))?;

    if let Some(relay) = relay {
        let lines = relay.join();
        tracing::debug!(lines, "Relay drained");
    }

    if !status.success() {
        anyhow::bail!("{} exited with {}", program, status);
    }
    Ok(())
}

/// Print CLI help
pub fn print_help() {
    println!("spire-sense v{}", env!("CARGO_PKG_VERSION"));
    println!("Game-state stability detection for Slay the Spire controllers");
    println!();
    println!("USAGE:");
    println!("    spire-sense <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    replay <scenario.json>     Replay recorded frames and print every send");
    println!("    relay <program> [args...]  Run a program and relay its stderr to the log");
    println!();
    println!("OPTIONS:");
    println!("    --json             Output replay results as JSON lines");
    println!("    --config <path>    Listener config file (replay only)");
    println!("    --help             Show this help message");
    println!();
    println!("Log verbosity is controlled with RUST_LOG (default: info).");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_replay() {
        let (command, options) = parse_args(&args(&["replay", "run.json", "--json"])).unwrap();
        assert_eq!(
            command,
            CliCommand::Replay {
                scenario: PathBuf::from("run.json")
            }
        );
        assert!(options.json);
        assert_eq!(options.config, None);
    }

    #[test]
    fn test_parse_replay_with_config() {
        let (_, options) =
            parse_args(&args(&["--config", "listener.json", "replay", "run.json"])).unwrap();
        assert_eq!(options.config, Some(PathBuf::from("listener.json")));
    }

    #[test]
    fn test_parse_relay_keeps_program_args() {
        let (command, options) =
            parse_args(&args(&["relay", "python", "-m", "pytest", "--json"])).unwrap();
        assert_eq!(
            command,
            CliCommand::Relay {
                program: "python".to_string(),
                args: args(&["-m", "pytest", "--json"]),
            }
        );
        assert!(!options.json);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["replay"])).is_err());
        assert!(parse_args(&args(&["relay"])).is_err());
        assert!(parse_args(&args(&["--config"])).is_err());
        assert!(parse_args(&args(&["sync"])).is_err());
    }

    #[test]
    fn test_replay_runs_scenario_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("menu.json");
        std::fs::write(
            &path,
            r#"{ "steps": [ { "frame": { "game_mode": "CHAR_SELECT", "main_menu_present": true } } ] }"#,
        )
        .unwrap();

        let options = CliOptions {
            json: true,
            config: None,
        };
        run(CliCommand::Replay { scenario: path }, options).unwrap();
    }

    #[test]
    fn test_replay_missing_file() {
        let result = run(
            CliCommand::Replay {
                scenario: PathBuf::from("/nonexistent/scenario.json"),
            },
            CliOptions::default(),
        );
        assert!(result.is_err());
    }
}
