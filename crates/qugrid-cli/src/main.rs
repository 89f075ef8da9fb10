//! qugrid Command-Line Interface
//!
//! The main entry point for the qugrid CLI tool.
//!
//! ```text
//! q0 ──H──●──────M──
//!         │      ║
//! q1 ─────X──X───╫──
//!            ║   ║
//! c  ════════●═══╝
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{common, decompose, gates, run};

/// qugrid - grid circuit simulator with custom gates and classical control
#[derive(Parser)]
#[command(name = "qugrid")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a circuit and print its final state
    Run {
        /// Input file (JSON snapshot)
        #[arg(short, long)]
        input: String,

        /// Initial wire values as a bitstring, wire 0 first (e.g. 0110)
        #[arg(long)]
        initial: Option<String>,

        /// Simulator config file (YAML or JSON)
        #[arg(short, long)]
        config: Option<String>,

        /// Seed for the measurement tie-break
        #[arg(long)]
        seed: Option<u64>,

        /// Maximum number of qubits
        #[arg(long)]
        max_qubits: Option<usize>,

        /// Print every basis state, including impossible ones
        #[arg(long)]
        all_states: bool,

        /// Recompute the collapsed outcome
        #[arg(long)]
        force: bool,
    },

    /// Inline every custom gate and write the primitive circuit
    Decompose {
        /// Input file (JSON snapshot)
        #[arg(short, long)]
        input: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List the primitive gate catalog
    Gates {
        /// Show matrix templates
        #[arg(long)]
        matrices: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Run {
            input,
            initial,
            config,
            seed,
            max_qubits,
            all_states,
            force,
        } => common::load_config(config.as_deref()).and_then(|mut config| {
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }
            if let Some(max_qubits) = max_qubits {
                config = config.with_max_qubits(max_qubits);
            }
            let options = run::RunOptions {
                initial: initial.as_deref(),
                all_states,
                force,
            };
            run::execute(&input, config, &options)
        }),

        Commands::Decompose { input, output } => decompose::execute(&input, output.as_deref()),

        Commands::Gates { matrices } => {
            gates::execute(matrices);
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "qugrid", "run", "-i", "bell.json", "--initial", "10", "--seed", "7", "--all-states",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                input,
                initial,
                seed,
                all_states,
                force,
                ..
            } => {
                assert_eq!(input, "bell.json");
                assert_eq!(initial.as_deref(), Some("10"));
                assert_eq!(seed, Some(7));
                assert!(all_states);
                assert!(!force);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_run_requires_input() {
        assert!(Cli::try_parse_from(["qugrid", "run"]).is_err());
    }

    #[test]
    fn test_parse_decompose() {
        let cli =
            Cli::try_parse_from(["qugrid", "decompose", "-i", "in.json", "-o", "out.json"])
                .unwrap();
        match cli.command {
            Commands::Decompose { input, output } => {
                assert_eq!(input, "in.json");
                assert_eq!(output.as_deref(), Some("out.json"));
            }
            _ => panic!("expected decompose"),
        }
    }

    #[test]
    fn test_verbose_is_global() {
        let cli = Cli::try_parse_from(["qugrid", "gates", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Gates { matrices: false }));
    }

    #[test]
    fn test_unknown_command() {
        assert!(Cli::try_parse_from(["qugrid", "compile"]).is_err());
    }
}
